use crate::config::{OddsFormat, ProviderConfig};
use crate::error::FetchError;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Client, Proxy, Url};
use serde_json::Value;
use tracing::{error, info};

const FIXTURES_ENDPOINT: &str = "v1/fixtures";
const ODDS_ENDPOINT: &str = "v1/odds";

/// Client for the Pinnacle line feed. Every call is a single authenticated GET;
/// any failure yields a `FetchError` and no data.
pub struct PinnacleClient {
    client: Client,
    base_url: String,
    username: String,
    password: String,
}

impl PinnacleClient {
    pub fn new(config: &ProviderConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let mut builder = Client::builder()
            .timeout(config.timeout)
            .default_headers(headers);

        // Only the configured proxy is used, never one picked up from the environment
        builder = match &config.proxy {
            Some(proxy) => builder.proxy(Proxy::all(proxy).map_err(FetchError::Client)?),
            None => builder.no_proxy(),
        };

        Ok(Self {
            client: builder.build().map_err(FetchError::Client)?,
            base_url: config.base_url.clone(),
            username: config.username.clone(),
            password: config.password.clone(),
        })
    }

    /// Fetch the fixtures (team names, league, start time) for a sport
    pub async fn fetch_fixtures(
        &self,
        sport_id: i64,
        live_only: bool,
        since: Option<i64>,
    ) -> Result<Value, FetchError> {
        let url = self.build_url(
            FIXTURES_ENDPOINT,
            &[
                ("sportId", Some(sport_id.to_string())),
                ("isLive", Some(live_flag(live_only))),
                ("since", since.map(|s| s.to_string())),
            ],
        )?;
        self.get_json(url).await
    }

    /// Fetch current prices for every event of a sport
    pub async fn fetch_odds(
        &self,
        sport_id: i64,
        live_only: bool,
        odds_format: OddsFormat,
        since: Option<i64>,
    ) -> Result<Value, FetchError> {
        let url = self.build_url(
            ODDS_ENDPOINT,
            &[
                ("sportId", Some(sport_id.to_string())),
                ("isLive", Some(live_flag(live_only))),
                ("oddsFormat", Some(odds_format.as_str().to_string())),
                ("since", since.map(|s| s.to_string())),
            ],
        )?;
        self.get_json(url).await
    }

    /// Join the base URL and endpoint and append every parameter that has a value.
    /// Parameters without a value do not appear in the query string at all.
    pub fn build_url(
        &self,
        endpoint: &str,
        params: &[(&str, Option<String>)],
    ) -> Result<Url, FetchError> {
        let raw = format!("{}/{}", self.base_url.trim_end_matches('/'), endpoint);
        let mut url = Url::parse(&raw).map_err(|e| FetchError::InvalidUrl {
            url: raw.clone(),
            reason: e.to_string(),
        })?;

        let present: Vec<(&str, &str)> = params
            .iter()
            .filter_map(|(key, value)| value.as_deref().map(|v| (*key, v)))
            .collect();
        if !present.is_empty() {
            url.query_pairs_mut().extend_pairs(present);
        }

        Ok(url)
    }

    async fn get_json(&self, url: Url) -> Result<Value, FetchError> {
        info!("Request to URL: {}", url);
        let result = self.query(&url).await;
        if let Err(e) = &result {
            error!("Request to {} failed: {}", url, e);
        }
        result
    }

    async fn query(&self, url: &Url) -> Result<Value, FetchError> {
        let response = self
            .client
            .get(url.clone())
            .basic_auth(&self.username, Some(&self.password))
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;

        let status = response.status();
        info!("Response status: {}", status.as_u16());

        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;

        serde_json::from_str(&body).map_err(|source| FetchError::Decode {
            url: url.to_string(),
            source,
        })
    }
}

fn live_flag(live_only: bool) -> String {
    let flag = if live_only { "1" } else { "0" };
    flag.to_string()
}
