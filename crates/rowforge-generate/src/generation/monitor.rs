//! Run observation hooks.

use std::cell::Cell;
use std::time::Instant;

use tracing::info;

/// Observes the lifecycle of one generation run.
pub trait GenerationMonitor {
    fn generation_starting(&self) {}
    fn row_emitted(&self) {}
    fn generation_ending(&self) {}
}

/// Ignores every event.
#[derive(Debug, Default)]
pub struct NoopGenerationMonitor;

impl GenerationMonitor for NoopGenerationMonitor {}

/// Rows between progress log lines.
const REPORT_INTERVAL: u64 = 1000;

/// Logs row counts and throughput as the run progresses.
#[derive(Debug, Default)]
pub struct VelocityMonitor {
    started: Cell<Option<Instant>>,
    rows: Cell<u64>,
}

impl VelocityMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows_emitted(&self) -> u64 {
        self.rows.get()
    }
}

impl GenerationMonitor for VelocityMonitor {
    fn generation_starting(&self) {
        self.started.set(Some(Instant::now()));
        self.rows.set(0);
        info!("generation started");
    }

    fn row_emitted(&self) {
        let rows = self.rows.get() + 1;
        self.rows.set(rows);
        if rows % REPORT_INTERVAL == 0
            && let Some(started) = self.started.get()
        {
            let elapsed = started.elapsed().as_secs_f64();
            let rows_per_second = if elapsed > 0.0 {
                rows as f64 / elapsed
            } else {
                0.0
            };
            info!(rows, rows_per_second, "generation progressing");
        }
    }

    fn generation_ending(&self) {
        let rows = self.rows.get();
        let duration_ms = self
            .started
            .get()
            .map(|started| started.elapsed().as_millis() as u64)
            .unwrap_or(0);
        info!(rows, duration_ms, "generation finished");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn velocity_monitor_counts_rows() {
        let monitor = VelocityMonitor::new();
        monitor.generation_starting();
        for _ in 0..3 {
            monitor.row_emitted();
        }
        monitor.generation_ending();
        assert_eq!(monitor.rows_emitted(), 3);
    }
}
