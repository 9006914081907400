use thiserror::Error;

#[derive(Debug, Error)]
pub enum TelemetryError {
    #[error("Failed to initialize telemetry: {0}")]
    Init(String),
}

pub struct TelemetryConfig {
    pub level: tracing::Level,
    pub json_output: bool,
    pub human_output: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            level: tracing::Level::INFO,
            json_output: false,
            human_output: true,
        }
    }
}

/// Install the global subscriber. `RUST_LOG` overrides `config.level`.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<(), TelemetryError> {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.level.as_str()));

    let human = config.human_output.then(|| fmt::layer().with_target(true));
    let json = config.json_output.then(|| fmt::layer().json().with_target(true));

    tracing_subscriber::registry()
        .with(filter)
        .with(human)
        .with(json)
        .try_init()
        .map_err(|e| TelemetryError::Init(e.to_string()))?;

    Ok(())
}
