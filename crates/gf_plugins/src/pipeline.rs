use crate::error::PluginError;
use crate::processor::{ItemProcessor, ProcessorStats};
use gf_domain::{Encoding, Item};
use gf_telemetry::PluginEvent;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// What a pipeline does after an item fails in some stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
    /// Drop the failed item and keep feeding the rest.
    #[default]
    Continue,
    /// Stop feeding items and skip finalization.
    Halt,
}

/// Outcome of [`Pipeline::run`].
#[derive(Debug)]
pub struct PipelineReport {
    /// Items that made it through every stage, in input order.
    pub items: Vec<Item>,
    pub errors: Vec<PluginError>,
    pub events: Vec<PluginEvent>,
    pub stats: Vec<(String, ProcessorStats)>,
    pub halted: bool,
    pub elapsed: Duration,
}

impl PipelineReport {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Processors chained in order, like `src().pipe(a).pipe(b)`.
#[derive(Debug, Default)]
pub struct Pipeline {
    stages: Vec<ItemProcessor>,
    policy: ErrorPolicy,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pipe(mut self, stage: ItemProcessor) -> Self {
        self.stages.push(stage);
        self
    }

    pub fn with_policy(mut self, policy: ErrorPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    pub fn stage_names(&self) -> Vec<String> {
        self.stages.iter().map(|s| s.name().to_string()).collect()
    }

    /// Feed every item through all stages, then finish each stage in order.
    pub fn run<I>(mut self, items: I, encoding: Encoding) -> PipelineReport
    where
        I: IntoIterator<Item = Item>,
    {
        let start = Instant::now();
        let mut forwarded = Vec::new();
        let mut errors = Vec::new();
        let mut events = Vec::new();
        let mut halted = false;

        'items: for item in items {
            let mut current = item;
            for stage in &mut self.stages {
                let path = current.path.display().to_string();
                let was_null = current.is_null();
                match stage.offer(current, encoding) {
                    Ok(next) => {
                        events.push(if was_null {
                            PluginEvent::item_passed_through(stage.name(), path)
                        } else {
                            PluginEvent::item_forwarded(stage.name(), path)
                        });
                        current = next;
                    }
                    Err(err) => {
                        events.push(PluginEvent::item_failed(stage.name(), path, err.to_string()));
                        errors.push(err);
                        if self.policy == ErrorPolicy::Halt {
                            warn!("Halting pipeline after first failure");
                            halted = true;
                            break 'items;
                        }
                        continue 'items;
                    }
                }
            }
            forwarded.push(current);
        }

        if !halted {
            for stage in &mut self.stages {
                match stage.finish() {
                    Ok(()) => events.push(PluginEvent::stage_finalized(stage.name())),
                    Err(err) => {
                        events.push(PluginEvent::finalization_failed(stage.name(), err.to_string()));
                        errors.push(err);
                    }
                }
            }
        }

        let elapsed = start.elapsed();
        let failed = events.iter().filter(|e| matches!(e, PluginEvent::ItemFailed { .. })).count();
        events.push(PluginEvent::pipeline_completed(
            forwarded.len(),
            failed,
            elapsed_millis(elapsed),
        ));
        info!(
            stages = self.stages.len(),
            forwarded = forwarded.len(),
            failed,
            "Pipeline completed"
        );

        PipelineReport {
            items: forwarded,
            errors,
            events,
            stats: self
                .stages
                .iter()
                .map(|s| (s.name().to_string(), s.stats()))
                .collect(),
            halted,
            elapsed,
        }
    }
}

/// Whole milliseconds, saturating at `u64::MAX`.
fn elapsed_millis(elapsed: Duration) -> u64 {
    u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX)
}
