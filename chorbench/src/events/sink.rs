//! Event sink trait and implementations.

use parking_lot::RwLock;
use tracing::{info, warn};

use super::PipelineEvent;

/// Receives pipeline events.
pub trait EventSink: Send + Sync {
    /// Emits an event. Never fails; a sink that cannot deliver drops the event.
    fn emit(&self, event: &PipelineEvent);
}

/// A no-op event sink that discards all events.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpEventSink;

impl EventSink for NoOpEventSink {
    fn emit(&self, _event: &PipelineEvent) {}
}

/// Renders events as human-readable `tracing` lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingEventSink;

impl LoggingEventSink {
    /// Creates a new logging event sink.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LoggingEventSink {
    fn emit(&self, event: &PipelineEvent) {
        let event_type = event.event_type();
        match event {
            PipelineEvent::StageStarted { stage, input } => {
                info!(event_type, %stage, %input, "Running {stage} on {input}");
            }
            PipelineEvent::StageSkipped { stage, artifact } => {
                info!(event_type, %stage, %artifact, "{artifact} is up to date, skipping");
            }
            PipelineEvent::StageCompleted {
                stage,
                artifact,
                cases,
                elapsed_ms,
            } => {
                info!(event_type, %stage, %artifact, cases, elapsed_ms, "Wrote {artifact}");
            }
            PipelineEvent::CaseStarted { stage, input, case } => {
                info!(event_type, %stage, "{stage} {input} {case}");
            }
            PipelineEvent::Unextractable { input, case, strategy } => {
                warn!(event_type, %strategy, "Could not extract {case} of {input} with {strategy}");
            }
            PipelineEvent::GenerationRetry { case, attempt, reason } => {
                warn!(event_type, attempt, %reason, "Refuzzing {case}");
            }
            PipelineEvent::VerdictRecorded {
                file,
                case,
                strategy,
                verdict,
            } => {
                info!(event_type, %file, %strategy, "{case} with {strategy}: {verdict}");
            }
            PipelineEvent::ExtractionMissing { file, case, strategy } => match case {
                Some(case) => warn!(event_type, %file, "{case} not extracted yet with {strategy}"),
                None => warn!(event_type, %file, "{file} not extracted yet with {strategy}"),
            },
            PipelineEvent::SoundnessTotals { tally, skipped } => {
                info!(
                    event_type,
                    skipped,
                    "Ok: {}, Timeout: {}, Fail: {}",
                    tally.ok,
                    tally.maybe,
                    tally.fail
                );
            }
        }
    }
}

/// A collecting event sink for testing purposes.
#[derive(Debug, Default)]
pub struct CollectingEventSink {
    events: RwLock<Vec<PipelineEvent>>,
}

impl CollectingEventSink {
    /// Creates a new collecting sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all collected events.
    #[must_use]
    pub fn events(&self) -> Vec<PipelineEvent> {
        self.events.read().clone()
    }

    /// Returns the number of collected events.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.read().len()
    }

    /// Returns true if no events have been collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.read().is_empty()
    }

    /// Clears all collected events.
    pub fn clear(&self) {
        self.events.write().clear();
    }

    /// Returns events whose type starts with `type_prefix`.
    #[must_use]
    pub fn events_of_type(&self, type_prefix: &str) -> Vec<PipelineEvent> {
        self.events
            .read()
            .iter()
            .filter(|e| e.event_type().starts_with(type_prefix))
            .cloned()
            .collect()
    }
}

impl EventSink for CollectingEventSink {
    fn emit(&self, event: &PipelineEvent) {
        self.events.write().push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{CaseId, Strategy, VerdictTally};

    fn started(input: &str) -> PipelineEvent {
        PipelineEvent::StageStarted {
            stage: "projection".into(),
            input: input.into(),
        }
    }

    #[test]
    fn test_noop_and_logging_sinks() {
        NoOpEventSink.emit(&started("choreography-1"));
        LoggingEventSink::new().emit(&PipelineEvent::SoundnessTotals {
            tally: VerdictTally::new(),
            skipped: 0,
        });
    }

    #[test]
    fn test_collecting_sink() {
        let sink = CollectingEventSink::new();
        assert!(sink.is_empty());

        sink.emit(&started("choreography-1"));
        sink.emit(&PipelineEvent::Unextractable {
            input: "projection-1".into(),
            case: CaseId::new("C1"),
            strategy: Strategy::Random,
        });

        assert_eq!(sink.len(), 2);
        assert_eq!(sink.events()[0], started("choreography-1"));
        assert_eq!(sink.events_of_type("stage.").len(), 1);
        assert_eq!(sink.events_of_type("case.").len(), 1);

        sink.clear();
        assert!(sink.is_empty());
    }
}
