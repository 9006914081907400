pub mod events;
pub mod setup;
pub mod export;

pub use events::PluginEvent;
pub use setup::{TelemetryConfig, TelemetryError, init_telemetry};
pub use export::{ExportFormat, export_log};
