use crate::models::NormalizedEvent;
use anyhow::{Context, Result};
use std::io::{self, Stdout, Write};

/// Destination for normalized events, fed one event at a time
pub trait EventSink {
    fn emit(&mut self, event: &NormalizedEvent) -> Result<()>;
}

/// Collects events in memory
impl EventSink for Vec<NormalizedEvent> {
    fn emit(&mut self, event: &NormalizedEvent) -> Result<()> {
        self.push(event.clone());
        Ok(())
    }
}

/// Human-readable block per event: header lines, one line per outcome, separator
pub struct ConsoleSink<W: Write> {
    out: W,
}

impl ConsoleSink<Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ConsoleSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> EventSink for ConsoleSink<W> {
    fn emit(&mut self, event: &NormalizedEvent) -> Result<()> {
        writeln!(self.out, "Match: {} (#{})", event.match_name, event.event_id)?;
        writeln!(self.out, "League: {}", event.league_name)?;
        writeln!(self.out, "Start time: {}", event.start_time_display())?;
        for outcome in &event.outcomes {
            writeln!(self.out, "  {}", outcome)?;
        }
        writeln!(self.out, "{}", "-".repeat(50))?;
        self.out.flush().context("Failed to flush console output")
    }
}

/// One JSON object per line, for a downstream consumer reading the stream
pub struct JsonLinesSink<W: Write> {
    out: W,
}

impl JsonLinesSink<Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> EventSink for JsonLinesSink<W> {
    fn emit(&mut self, event: &NormalizedEvent) -> Result<()> {
        let line = serde_json::to_string(event).context("Failed to serialize event")?;
        writeln!(self.out, "{}", line)?;
        self.out.flush().context("Failed to flush JSON output")
    }
}
