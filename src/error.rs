use crate::models::EventId;
use reqwest::StatusCode;
use thiserror::Error;

/// A provider call produced no usable payload. The caller skips that payload for the
/// current cycle.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Invalid request URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Provider returned {status} for {url}")]
    Status { url: String, status: StatusCode },

    #[error("Response from {url} is not valid JSON: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },
}

/// A parsed payload is missing the top-level key everything else hangs off.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Key '{key}' is missing in response")]
    MissingKey { key: &'static str },

    #[error("Key '{key}' is not a list")]
    NotAList { key: &'static str },
}

/// One odds event could not be normalized. Only that event is skipped.
#[derive(Debug, Error)]
pub enum EventParseError {
    #[error("Failed to decode event {event}: {source}")]
    Decode {
        event: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Event {event_id} has an invalid start time '{raw}': {source}")]
    StartTime {
        event_id: EventId,
        raw: String,
        #[source]
        source: chrono::ParseError,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Provider credentials are not set")]
    MissingCredentials,

    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),

    #[error("Base URL '{0}' is not an http(s) URL")]
    InvalidBaseUrl(String),
}
