use crate::api::PinnacleClient;
use crate::config::PollerConfig;
use crate::models::top_level_list;
use crate::utils::{decode_event, flatten, EventSink, FixtureCache};
use serde_json::Value;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// What happened during one poll cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub fixtures_refreshed: bool,
    pub fixtures_cached: usize,
    pub odds_fetched: bool,
    pub events_emitted: usize,
    pub events_skipped: usize,
}

/// Drives the fixtures -> odds -> flatten -> sink cycle on a fixed interval.
///
/// Owns the fixture cache: it is the only writer, and the flattener reads it later
/// in the same cycle. Cycles never overlap.
pub struct Poller<S> {
    client: PinnacleClient,
    config: PollerConfig,
    fixtures: FixtureCache,
    sink: S,
}

impl<S: EventSink> Poller<S> {
    pub fn new(client: PinnacleClient, config: PollerConfig, sink: S) -> Self {
        Self {
            client,
            config,
            fixtures: FixtureCache::new(),
            sink,
        }
    }

    pub fn fixtures(&self) -> &FixtureCache {
        &self.fixtures
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Poll until `shutdown` carries `true`. Data and network errors never end the
    /// loop; a stop request ends it between cycles or cancels the cycle in flight.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) {
        info!(
            "Polling sport {} every {:?} (live only: {})",
            self.config.sport_id, self.config.interval, self.config.live_only
        );

        loop {
            tokio::select! {
                report = self.run_cycle() => {
                    info!(
                        "Cycle complete: {} emitted, {} skipped, {} fixtures cached",
                        report.events_emitted, report.events_skipped, report.fixtures_cached
                    );
                }
                _ = stop_requested(&mut shutdown) => {
                    info!("Stop requested, cancelling the cycle in flight");
                    break;
                }
            }

            tokio::select! {
                _ = tokio::time::sleep(self.config.interval) => {}
                _ = stop_requested(&mut shutdown) => {
                    info!("Stop requested, leaving the poll loop");
                    break;
                }
            }
        }
    }

    /// One full cycle. Every failure is logged and absorbed here.
    pub async fn run_cycle(&mut self) -> CycleReport {
        let mut report = CycleReport::default();

        match self
            .client
            .fetch_fixtures(self.config.sport_id, self.config.live_only, self.config.since)
            .await
        {
            Ok(payload) => match self.fixtures.refresh(&payload) {
                Ok(count) => {
                    report.fixtures_refreshed = true;
                    debug!("Fixture cache refreshed with {} live events", count);
                }
                Err(e) => error!(
                    "Fixture refresh skipped, keeping {} cached fixtures: {}",
                    self.fixtures.len(),
                    e
                ),
            },
            Err(e) => warn!("Fixtures unavailable this cycle, keeping previous snapshot: {}", e),
        }
        report.fixtures_cached = self.fixtures.len();

        let payload = match self
            .client
            .fetch_odds(
                self.config.sport_id,
                self.config.live_only,
                self.config.odds_format,
                self.config.since,
            )
            .await
        {
            Ok(payload) => payload,
            Err(e) => {
                warn!("Odds unavailable this cycle: {}", e);
                return report;
            }
        };
        report.odds_fetched = true;

        self.emit_events(&payload, &mut report);
        report
    }

    fn emit_events(&mut self, payload: &Value, report: &mut CycleReport) {
        let leagues = match top_level_list(payload, "leagues") {
            Ok(leagues) => leagues,
            Err(e) => {
                error!("Odds payload rejected: {}", e);
                return;
            }
        };

        for league in leagues {
            let league_id = league.get("id").and_then(Value::as_i64);
            let Some(events) = league.get("events").and_then(Value::as_array) else {
                warn!(?league_id, "League has no events");
                continue;
            };
            debug!(?league_id, "League has {} events", events.len());

            for raw in events {
                let normalized = match decode_event(raw).and_then(|event| flatten(&event, &self.fixtures)) {
                    Ok(normalized) => normalized,
                    Err(e) => {
                        warn!("Skipping event: {}", e);
                        report.events_skipped += 1;
                        continue;
                    }
                };

                match self.sink.emit(&normalized) {
                    Ok(()) => report.events_emitted += 1,
                    Err(e) => {
                        error!(event_id = normalized.event_id, "Output sink failed: {:#}", e);
                        report.events_skipped += 1;
                    }
                }
            }
        }
    }
}

/// Resolves once a stop has been signalled. A dropped sender means no stop can
/// ever arrive, so this then never resolves.
async fn stop_requested(shutdown: &mut watch::Receiver<bool>) {
    loop {
        if *shutdown.borrow_and_update() {
            return;
        }
        if shutdown.changed().await.is_err() {
            std::future::pending::<()>().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_stop_requested_resolves_after_signal() {
        let (tx, mut rx) = watch::channel(false);
        tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(1), stop_requested(&mut rx))
            .await
            .expect("stop should be observed");
    }

    #[tokio::test]
    async fn test_stop_requested_pends_when_sender_dropped() {
        let (tx, mut rx) = watch::channel(false);
        drop(tx);
        let result = tokio::time::timeout(Duration::from_millis(50), stop_requested(&mut rx)).await;
        assert!(result.is_err());
    }
}
