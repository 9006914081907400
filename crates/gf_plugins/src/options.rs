use crate::error::OptionsError;
use serde::{Deserialize, Serialize};

/// Verbosity of rendered `PluginError`s. No functional effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticFlags {
    pub show_stack: bool,
    pub show_properties: bool,
}

impl Default for DiagnosticFlags {
    fn default() -> Self {
        PluginOptions::default().diagnostics()
    }
}

/// Configuration record for a plugin.
///
/// Keys missing from a parsed record keep their defaults. Both snake_case
/// and camelCase key spellings are accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PluginOptions {
    /// Accept items whose content is a stream
    #[serde(alias = "streamSupport")]
    pub stream_support: bool,

    /// Accept items whose content is buffered
    #[serde(alias = "bufferSupport")]
    pub buffer_support: bool,

    /// Waive the `gulp-` name prefix
    #[serde(alias = "homeMade")]
    pub home_made: bool,

    #[serde(alias = "showStack")]
    pub show_stack: bool,

    #[serde(alias = "showProperties")]
    pub show_properties: bool,
}

impl Default for PluginOptions {
    fn default() -> Self {
        Self {
            stream_support: false,
            buffer_support: true,
            home_made: false,
            show_stack: false,
            show_properties: true,
        }
    }
}

impl PluginOptions {
    /// Parse from TOML string.
    pub fn from_toml(s: &str) -> Result<Self, OptionsError> {
        toml::from_str(s).map_err(|e| OptionsError(e.to_string()))
    }

    /// Parse from a JSON document, which must be an object.
    pub fn from_json(s: &str) -> Result<Self, OptionsError> {
        let value: serde_json::Value =
            serde_json::from_str(s).map_err(|e| OptionsError(e.to_string()))?;
        Self::from_value(value)
    }

    /// Overlay a loosely typed JSON record onto the defaults.
    pub fn from_value(value: serde_json::Value) -> Result<Self, OptionsError> {
        if !value.is_object() {
            return Err(OptionsError(format!(
                "expected a configuration record, got {}",
                json_type_name(&value)
            )));
        }
        serde_json::from_value(value).map_err(|e| OptionsError(e.to_string()))
    }

    /// Overlay a TOML value onto the defaults. The value must be a table.
    pub fn from_toml_value(value: toml::Value) -> Result<Self, OptionsError> {
        if !value.is_table() {
            return Err(OptionsError(format!(
                "expected a configuration record, got {}",
                value.type_str()
            )));
        }
        value.try_into().map_err(|e: toml::de::Error| OptionsError(e.to_string()))
    }

    pub fn with_stream_support(mut self, enabled: bool) -> Self {
        self.stream_support = enabled;
        self
    }

    pub fn with_buffer_support(mut self, enabled: bool) -> Self {
        self.buffer_support = enabled;
        self
    }

    pub fn with_home_made(mut self, enabled: bool) -> Self {
        self.home_made = enabled;
        self
    }

    pub fn with_show_stack(mut self, enabled: bool) -> Self {
        self.show_stack = enabled;
        self
    }

    pub fn with_show_properties(mut self, enabled: bool) -> Self {
        self.show_properties = enabled;
        self
    }

    /// Whether plugin names must carry the `gulp-` prefix.
    pub fn requires_prefix(&self) -> bool {
        !self.home_made
    }

    pub fn diagnostics(&self) -> DiagnosticFlags {
        DiagnosticFlags {
            show_stack: self.show_stack,
            show_properties: self.show_properties,
        }
    }
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}
