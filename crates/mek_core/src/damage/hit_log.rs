//! Human-readable hit log.

use std::io::{self, Write};

use tracing::warn;

use super::{DamageEvent, DamageReport, HitData};
use crate::entity::Entity;

/// Destination for one-line hit summaries.
pub trait HitLogSink {
    /// Write one line.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error; callers log it and carry on.
    fn write_line(&mut self, line: &str) -> io::Result<()>;
}

impl HitLogSink for Vec<String> {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        self.push(line.to_owned());
        Ok(())
    }
}

/// Adapter writing lines to any [`Write`].
#[derive(Debug)]
pub struct WriterSink<W: Write>(pub W);

impl<W: Write> HitLogSink for WriterSink<W> {
    fn write_line(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.0, "{line}")
    }
}

fn summarize(entity: &Entity, hit: &HitData, damage: u32, report: &DamageReport) -> String {
    let mut line = format!(
        "{} (#{}) takes {damage} to {}{}",
        entity.name,
        entity.id,
        hit.location,
        if hit.rear { " (rear)" } else { "" }
    );
    if hit.roll > 0 {
        line.push_str(&format!(" [roll {}]", hit.roll));
    }

    let destroyed = report.destroyed_locations();
    if !destroyed.is_empty() {
        let names: Vec<&str> = destroyed.iter().map(|location| location.abbreviation()).collect();
        line.push_str(&format!("; destroyed {}", names.join(", ")));
    }
    let criticals = report
        .events
        .iter()
        .filter(|event| {
            matches!(
                event,
                DamageEvent::CriticalHit { .. } | DamageEvent::VehicleCritical { .. }
            )
        })
        .count();
    if criticals > 0 {
        line.push_str(&format!("; {criticals} critical"));
    }
    if let Some(cause) = entity.destruction_cause().filter(|_| report.unit_destroyed()) {
        line.push_str(&format!("; UNIT DESTROYED ({cause:?})"));
    }
    line
}

/// Write the summary line. Sink failures are logged and dropped.
pub(super) fn write_hit(sink: &mut dyn HitLogSink, entity: &Entity, hit: &HitData, damage: u32, report: &DamageReport) {
    let line = summarize(entity, hit, damage, report);
    if let Err(err) = sink.write_line(&line) {
        warn!(entity = entity.id, error = %err, "Failed to write hit log");
    }
}
