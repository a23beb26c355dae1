use crate::error::SchemaError;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;

/// Provider-assigned identifier of a live event
pub type EventId = i64;

pub const UNKNOWN_TEAM: &str = "Unknown team";
pub const UNKNOWN_LEAGUE: &str = "Unknown league";
pub const UNKNOWN_START_TIME: &str = "unknown";

/// `liveStatus` value of a fixture that is in play right now
pub const LIVE_STATUS_LIVE: i64 = 1;
/// `status` value of a period whose markets are currently offered
pub const PERIOD_STATUS_OFFERED: i64 = 1;

/// Descriptive metadata for one live fixture
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixtureRecord {
    pub home_team: String,
    pub away_team: String,
    pub league: String,
    /// ISO-8601 start time exactly as the provider sent it
    pub starts: Option<String>,
}

/// League entry of the fixtures payload. Events stay raw so one bad event
/// can be skipped without losing the league.
#[derive(Debug, Deserialize)]
pub struct RawFixtureLeague {
    pub id: Option<i64>,
    pub name: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub events: Vec<Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawFixtureEvent {
    pub id: EventId,
    pub home: Option<String>,
    pub away: Option<String>,
    pub starts: Option<String>,
    pub live_status: Option<i64>,
}

impl RawFixtureEvent {
    pub fn is_live(&self) -> bool {
        self.live_status == Some(LIVE_STATUS_LIVE)
    }
}

/// One event of the odds payload
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RawOddsEvent {
    pub id: EventId,
    /// Only periods whose markets are currently offered; the rest are never decoded
    #[serde(default, deserialize_with = "offered_periods")]
    pub periods: Vec<RawPeriod>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPeriod {
    /// 0 = full match, 1 = first half, 2 = second half
    pub number: Option<i32>,
    pub status: Option<i64>,
    pub moneyline: Option<RawMoneyline>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub totals: Vec<RawTotal>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub spreads: Vec<RawSpread>,
    pub team_total: Option<RawTeamTotal>,
}

impl RawPeriod {
    pub fn is_offered(&self) -> bool {
        self.status == Some(PERIOD_STATUS_OFFERED)
    }
}

/// Moneyline block. A block with any key at all counts as quoted, even when every
/// price in it is null.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct RawMoneyline {
    pub home: Option<f64>,
    pub draw: Option<f64>,
    pub away: Option<f64>,
    populated: bool,
}

impl RawMoneyline {
    /// True only for `{}`
    pub fn is_empty(&self) -> bool {
        !self.populated
    }
}

impl TryFrom<Map<String, Value>> for RawMoneyline {
    type Error = serde_json::Error;

    fn try_from(block: Map<String, Value>) -> Result<Self, Self::Error> {
        Ok(Self {
            home: price(&block, "home")?,
            draw: price(&block, "draw")?,
            away: price(&block, "away")?,
            populated: !block.is_empty(),
        })
    }
}

/// Over/under line, shared by totals and team totals
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(try_from = "Map<String, Value>")]
pub struct RawTotal {
    pub points: Option<f64>,
    pub over: Option<f64>,
    pub under: Option<f64>,
    populated: bool,
}

impl RawTotal {
    /// True only for `{}`
    pub fn is_empty(&self) -> bool {
        !self.populated
    }
}

impl TryFrom<Map<String, Value>> for RawTotal {
    type Error = serde_json::Error;

    fn try_from(block: Map<String, Value>) -> Result<Self, Self::Error> {
        Ok(Self {
            points: price(&block, "points")?,
            over: price(&block, "over")?,
            under: price(&block, "under")?,
            populated: !block.is_empty(),
        })
    }
}

fn price(block: &Map<String, Value>, key: &str) -> Result<Option<f64>, serde_json::Error> {
    block
        .get(key)
        .map(Option::<f64>::deserialize)
        .transpose()
        .map(Option::flatten)
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawSpread {
    pub hdp: Option<f64>,
    pub home: Option<f64>,
    pub away: Option<f64>,
}

/// Per-side team totals. Outcomes are always produced home side first, whatever
/// order the keys arrive in.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawTeamTotal {
    pub home: Option<RawTotal>,
    pub away: Option<RawTotal>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MoneylineSide {
    Home,
    Draw,
    Away,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TeamSide {
    Home,
    Away,
}

/// A single priced outcome of a market. Unknown prices stay `None` and are left
/// out of the serialized record.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "market", rename_all = "snake_case")]
pub enum Outcome {
    Moneyline {
        period: i32,
        side: MoneylineSide,
        #[serde(skip_serializing_if = "Option::is_none")]
        price: Option<f64>,
    },
    Total {
        period: i32,
        #[serde(skip_serializing_if = "Option::is_none")]
        line: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        over: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        under: Option<f64>,
    },
    Spread {
        period: i32,
        #[serde(skip_serializing_if = "Option::is_none")]
        line: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        home: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        away: Option<f64>,
    },
    TeamTotal {
        period: i32,
        side: TeamSide,
        #[serde(skip_serializing_if = "Option::is_none")]
        line: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        over: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        under: Option<f64>,
    },
}

impl Outcome {
    pub fn period(&self) -> i32 {
        match self {
            Outcome::Moneyline { period, .. }
            | Outcome::Total { period, .. }
            | Outcome::Spread { period, .. }
            | Outcome::TeamTotal { period, .. } => *period,
        }
    }
}

pub fn period_name(number: i32) -> &'static str {
    match number {
        0 => "Match",
        1 => "1st Half",
        2 => "2nd Half",
        _ => "Other period",
    }
}

struct Price(Option<f64>);

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(value) => write!(f, "{:.2}", value),
            None => write!(f, "n/a"),
        }
    }
}

struct Line(Option<f64>);

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(value) => write!(f, "{:+}", value),
            None => write!(f, "?"),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let period = period_name(self.period());
        match self {
            Outcome::Moneyline { side, price, .. } => {
                write!(f, "Moneyline ({}) - {:?}: {}", period, side, Price(*price))
            }
            Outcome::Total {
                line, over, under, ..
            } => write!(
                f,
                "Total ({}) - Over {}: {}, Under {}: {}",
                period,
                Line(*line),
                Price(*over),
                Line(*line),
                Price(*under)
            ),
            Outcome::Spread {
                line, home, away, ..
            } => write!(
                f,
                "Spread ({}) - Home {}: {}, Away {}: {}",
                period,
                Line(*line),
                Price(*home),
                Line(line.map(|l| -l)),
                Price(*away)
            ),
            Outcome::TeamTotal {
                side,
                line,
                over,
                under,
                ..
            } => write!(
                f,
                "Team Total ({}, {:?}) - Over {}: {}, Under {}: {}",
                period,
                side,
                Line(*line),
                Price(*over),
                Line(*line),
                Price(*under)
            ),
        }
    }
}

/// Flattened view of one live event, handed to the output sink
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormalizedEvent {
    pub event_id: EventId,
    pub match_name: String,
    pub league_name: String,
    pub home_team: String,
    pub away_team: String,
    #[serde(serialize_with = "serialize_start_time")]
    pub start_time: Option<DateTime<FixedOffset>>,
    pub outcomes: Vec<Outcome>,
}

impl NormalizedEvent {
    /// ISO-8601 start time, or the "unknown" marker
    pub fn start_time_display(&self) -> String {
        match &self.start_time {
            Some(start) => start.to_rfc3339(),
            None => UNKNOWN_START_TIME.to_string(),
        }
    }
}

fn serialize_start_time<S>(
    start_time: &Option<DateTime<FixedOffset>>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match start_time {
        Some(start) => serializer.serialize_str(&start.to_rfc3339()),
        None => serializer.serialize_str(UNKNOWN_START_TIME),
    }
}

fn offered_periods<'de, D>(deserializer: D) -> Result<Vec<RawPeriod>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<Vec<Value>>::deserialize(deserializer)?
        .unwrap_or_default()
        .iter()
        .filter(|period| {
            period.get("status").and_then(Value::as_i64) == Some(PERIOD_STATUS_OFFERED)
        })
        .map(|period| RawPeriod::deserialize(period).map_err(serde::de::Error::custom))
        .collect()
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// The list under a required top-level key of a provider payload
pub fn top_level_list<'a>(payload: &'a Value, key: &'static str) -> Result<&'a [Value], SchemaError> {
    match payload.get(key) {
        None | Some(Value::Null) => Err(SchemaError::MissingKey { key }),
        Some(Value::Array(items)) => Ok(items),
        Some(_) => Err(SchemaError::NotAList { key }),
    }
}
