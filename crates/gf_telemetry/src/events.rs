use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub enum PluginEvent {
    ItemForwarded { plugin: String, path: String, timestamp: DateTime<Utc> },
    ItemPassedThrough { plugin: String, path: String, timestamp: DateTime<Utc> },
    ItemFailed { plugin: String, path: String, message: String, timestamp: DateTime<Utc> },
    StageFinalized { plugin: String, timestamp: DateTime<Utc> },
    FinalizationFailed { plugin: String, message: String, timestamp: DateTime<Utc> },
    PipelineCompleted { forwarded: usize, failed: usize, elapsed_ms: u64, timestamp: DateTime<Utc> },
}

impl PluginEvent {
    pub fn item_forwarded(plugin: impl Into<String>, path: impl Into<String>) -> Self {
        Self::ItemForwarded { plugin: plugin.into(), path: path.into(), timestamp: Utc::now() }
    }
    pub fn item_passed_through(plugin: impl Into<String>, path: impl Into<String>) -> Self {
        Self::ItemPassedThrough { plugin: plugin.into(), path: path.into(), timestamp: Utc::now() }
    }
    pub fn item_failed(plugin: impl Into<String>, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ItemFailed { plugin: plugin.into(), path: path.into(), message: message.into(), timestamp: Utc::now() }
    }
    pub fn stage_finalized(plugin: impl Into<String>) -> Self {
        Self::StageFinalized { plugin: plugin.into(), timestamp: Utc::now() }
    }
    pub fn finalization_failed(plugin: impl Into<String>, message: impl Into<String>) -> Self {
        Self::FinalizationFailed { plugin: plugin.into(), message: message.into(), timestamp: Utc::now() }
    }
    pub fn pipeline_completed(forwarded: usize, failed: usize, elapsed_ms: u64) -> Self {
        Self::PipelineCompleted { forwarded, failed, elapsed_ms, timestamp: Utc::now() }
    }

    /// Short variant name, used as the CSV `type` column.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ItemForwarded { .. } => "item_forwarded",
            Self::ItemPassedThrough { .. } => "item_passed_through",
            Self::ItemFailed { .. } => "item_failed",
            Self::StageFinalized { .. } => "stage_finalized",
            Self::FinalizationFailed { .. } => "finalization_failed",
            Self::PipelineCompleted { .. } => "pipeline_completed",
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::ItemForwarded { timestamp, .. }
            | Self::ItemPassedThrough { timestamp, .. }
            | Self::ItemFailed { timestamp, .. }
            | Self::StageFinalized { timestamp, .. }
            | Self::FinalizationFailed { timestamp, .. }
            | Self::PipelineCompleted { timestamp, .. } => *timestamp,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::ItemFailed { .. } | Self::FinalizationFailed { .. })
    }
}
