use crate::error::EventParseError;
use crate::models::{
    MoneylineSide, NormalizedEvent, Outcome, RawOddsEvent, RawPeriod, TeamSide,
    UNKNOWN_LEAGUE, UNKNOWN_TEAM,
};
use crate::utils::fixture_cache::FixtureCache;
use chrono::{DateTime, FixedOffset, NaiveDateTime};
use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

/// Decode one raw odds event into its typed form. Periods that are not currently
/// offered are dropped before decoding, so their contents can never fail the event.
pub fn decode_event(raw: &Value) -> Result<RawOddsEvent, EventParseError> {
    RawOddsEvent::deserialize(raw).map_err(|source| EventParseError::Decode {
        event: describe_event_id(raw),
        source,
    })
}

/// Build the normalized record for one odds event, joined with its fixture.
///
/// A fixture missing from the cache is expected (the odds poll can see events the
/// fixtures poll has not) and falls back to placeholder names.
pub fn flatten(
    event: &RawOddsEvent,
    fixtures: &FixtureCache,
) -> Result<NormalizedEvent, EventParseError> {
    let (home_team, away_team, league_name, starts) = match fixtures.lookup(event.id) {
        Some(fixture) => (
            fixture.home_team.clone(),
            fixture.away_team.clone(),
            fixture.league.clone(),
            fixture.starts.as_deref(),
        ),
        None => {
            warn!(event_id = event.id, "Event {} not found in fixture cache", event.id);
            (
                UNKNOWN_TEAM.to_string(),
                UNKNOWN_TEAM.to_string(),
                UNKNOWN_LEAGUE.to_string(),
                None,
            )
        }
    };

    let start_time = starts
        .map(|raw| {
            parse_start_time(raw).map_err(|source| EventParseError::StartTime {
                event_id: event.id,
                raw: raw.to_string(),
                source,
            })
        })
        .transpose()?;

    let outcomes = event
        .periods
        .iter()
        .filter(|period| period.is_offered())
        .flat_map(period_outcomes)
        .collect();

    Ok(NormalizedEvent {
        event_id: event.id,
        match_name: format!("{} vs {}", home_team, away_team),
        league_name,
        home_team,
        away_team,
        start_time,
        outcomes,
    })
}

const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%:z"];
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse an ISO-8601 start time. A trailing `Z` is rewritten to `+00:00` first;
/// date and time may be separated by `T` or a space, and a timestamp without any
/// offset is taken as UTC.
pub fn parse_start_time(raw: &str) -> Result<DateTime<FixedOffset>, chrono::ParseError> {
    let normalized = match raw.strip_suffix('Z') {
        Some(stripped) => format!("{}+00:00", stripped),
        None => raw.to_string(),
    };

    DateTime::parse_from_rfc3339(&normalized).or_else(|err| {
        OFFSET_FORMATS
            .iter()
            .find_map(|format| DateTime::parse_from_str(&normalized, format).ok())
            .or_else(|| {
                NAIVE_FORMATS.iter().find_map(|format| {
                    NaiveDateTime::parse_from_str(&normalized, format)
                        .ok()
                        .map(|naive| naive.and_utc().fixed_offset())
                })
            })
            .ok_or(err)
    })
}

/// Outcomes of one offered period: moneyline, then totals, spreads and team totals,
/// each list in provider order.
fn period_outcomes(period: &RawPeriod) -> Vec<Outcome> {
    let number = period.number.unwrap_or(0);
    let mut outcomes = Vec::new();

    if let Some(moneyline) = period.moneyline.as_ref().filter(|m| !m.is_empty()) {
        outcomes.extend(
            [
                (MoneylineSide::Home, moneyline.home),
                (MoneylineSide::Draw, moneyline.draw),
                (MoneylineSide::Away, moneyline.away),
            ]
            .into_iter()
            .map(|(side, price)| Outcome::Moneyline {
                period: number,
                side,
                price,
            }),
        );
    }

    outcomes.extend(period.totals.iter().map(|total| Outcome::Total {
        period: number,
        line: total.points,
        over: total.over,
        under: total.under,
    }));

    outcomes.extend(period.spreads.iter().map(|spread| Outcome::Spread {
        period: number,
        line: spread.hdp,
        home: spread.home,
        away: spread.away,
    }));

    // Home before away, regardless of key order in the payload
    if let Some(team_total) = &period.team_total {
        for (side, total) in [
            (TeamSide::Home, &team_total.home),
            (TeamSide::Away, &team_total.away),
        ] {
            if let Some(total) = total.as_ref().filter(|t| !t.is_empty()) {
                outcomes.push(Outcome::TeamTotal {
                    period: number,
                    side,
                    line: total.points,
                    over: total.over,
                    under: total.under,
                });
            }
        }
    }

    outcomes
}

fn describe_event_id(raw: &Value) -> String {
    match raw.get("id").and_then(Value::as_i64) {
        Some(id) => id.to_string(),
        None => "<no id>".to_string(),
    }
}
