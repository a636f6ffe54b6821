//! Wall-clock timing of analysis calls and stage runs.

use std::time::{Duration, Instant};

/// Stopwatch for one labelled piece of work: an analysis call, a stage run
/// over one input file or a whole pipeline run.
#[derive(Debug)]
pub struct SpanTimer {
    label: String,
    started: Instant,
}

impl SpanTimer {
    /// Starts timing `label`.
    #[must_use]
    pub fn start(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            started: Instant::now(),
        }
    }

    /// Time since [`SpanTimer::start`].
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Fractional milliseconds, as carried by events.
    #[must_use]
    pub fn elapsed_ms(&self) -> f64 {
        self.elapsed().as_secs_f64() * 1000.0
    }

    /// Whole milliseconds, the unit of the `time` statistics column.
    #[must_use]
    pub fn elapsed_whole_ms(&self) -> u128 {
        self.elapsed().as_millis()
    }

    /// The label given to [`SpanTimer::start`].
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Stops the timer and logs the measurement at debug level.
    #[must_use]
    pub fn finish(self) -> f64 {
        let elapsed_ms = self.elapsed_ms();
        tracing::debug!(label = %self.label, elapsed_ms, "Timed");
        elapsed_ms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer_measures_sleep() {
        let timer = SpanTimer::start("extraction:Random C1");
        std::thread::sleep(Duration::from_millis(10));

        assert_eq!(timer.label(), "extraction:Random C1");
        assert!(timer.elapsed_whole_ms() >= 10);
        assert!(timer.finish() >= 10.0);
    }
}
