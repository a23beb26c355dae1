use crate::error::SchemaError;
use crate::models::{
    top_level_list, EventId, FixtureRecord, RawFixtureEvent, RawFixtureLeague, UNKNOWN_LEAGUE,
    UNKNOWN_TEAM,
};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Snapshot of the currently live fixtures, keyed by event id.
///
/// Written once per poll cycle by `refresh` and read afterwards by the flattener.
/// A refresh replaces the whole snapshot; entries are never merged across refreshes.
#[derive(Debug, Clone, Default)]
pub struct FixtureCache {
    records: HashMap<EventId, FixtureRecord>,
}

impl FixtureCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the snapshot with the live events of a fixtures payload.
    ///
    /// Fails with `SchemaError` when the payload has no `league` list, in which case
    /// the previous snapshot is kept. Returns the number of cached fixtures.
    pub fn refresh(&mut self, payload: &Value) -> Result<usize, SchemaError> {
        let leagues = top_level_list(payload, "league")?;

        let mut records = HashMap::new();
        for raw_league in leagues {
            let league = match RawFixtureLeague::deserialize(raw_league) {
                Ok(league) => league,
                Err(e) => {
                    warn!("Skipping malformed fixture league: {}", e);
                    continue;
                }
            };
            let league_name = non_empty(league.name).unwrap_or_else(|| UNKNOWN_LEAGUE.to_string());

            for raw_event in &league.events {
                let event = match RawFixtureEvent::deserialize(raw_event) {
                    Ok(event) => event,
                    Err(e) => {
                        warn!(league_id = ?league.id, "Skipping malformed fixture event: {}", e);
                        continue;
                    }
                };
                if !event.is_live() {
                    continue;
                }

                records.insert(
                    event.id,
                    FixtureRecord {
                        home_team: non_empty(event.home).unwrap_or_else(|| UNKNOWN_TEAM.to_string()),
                        away_team: non_empty(event.away).unwrap_or_else(|| UNKNOWN_TEAM.to_string()),
                        league: league_name.clone(),
                        starts: non_empty(event.starts),
                    },
                );
            }
        }

        self.records = records;
        debug!("Fixture cache holds {} live events", self.records.len());
        Ok(self.records.len())
    }

    pub fn lookup(&self, event_id: EventId) -> Option<&FixtureRecord> {
        self.records.get(&event_id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
