//! Declarative plugin construction.
//!
//! A manifest is the options-only form of the factory call: a TOML record
//! naming the plugin, its transform and optional flush function, plus an
//! `[options]` table. Function names are looked up in a
//! [`TransformRegistry`]; the resulting descriptor goes through the same
//! validation as one built in code.
//!
//! ```toml
//! plugin_name = "gulp-banner"
//! plugin_fn = "banner"
//! flush_fn = "report"
//!
//! [options]
//! stream_support = false
//! ```

use crate::descriptor::{Callable, OptionsInput, PluginDescriptor};
use crate::error::{BoxError, PluginError, PluginErrorKind, Result, UNDEFINED_PLUGIN};
use crate::options::DiagnosticFlags;
use crate::plugin_trait::{
    Finalize, SharedFinalize, SharedFinalizeFn, SharedTransform, SharedTransformFn, Transform,
};
use crate::processor::ItemProcessor;
use gf_domain::{Encoding, Item};
use indexmap::IndexMap;
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

/// Named transforms and flush functions that manifests may refer to.
#[derive(Default, Clone)]
pub struct TransformRegistry {
    transforms: IndexMap<String, SharedTransformFn>,
    finalizers: IndexMap<String, SharedFinalizeFn>,
}

impl TransformRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_transform<F>(&mut self, name: impl Into<String>, f: F) -> &mut Self
    where
        F: Fn(&mut Item, Encoding) -> std::result::Result<(), BoxError> + Send + Sync + 'static,
    {
        self.transforms.insert(name.into(), Arc::new(f));
        self
    }

    pub fn register_finalizer<F>(&mut self, name: impl Into<String>, f: F) -> &mut Self
    where
        F: Fn() -> std::result::Result<(), BoxError> + Send + Sync + 'static,
    {
        self.finalizers.insert(name.into(), Arc::new(f));
        self
    }

    pub fn transform_names(&self) -> Vec<String> {
        self.transforms.keys().cloned().collect()
    }

    pub fn finalizer_names(&self) -> Vec<String> {
        self.finalizers.keys().cloned().collect()
    }

    fn transform(&self, name: &str) -> Option<Box<dyn Transform>> {
        self.transforms
            .get(name)
            .map(|f| Box::new(SharedTransform(f.clone())) as Box<dyn Transform>)
    }

    fn finalizer(&self, name: &str) -> Option<Box<dyn Finalize>> {
        self.finalizers
            .get(name)
            .map(|f| Box::new(SharedFinalize(f.clone())) as Box<dyn Finalize>)
    }
}

/// A parsed, not yet validated, plugin manifest.
///
/// Values keep their TOML types so that shape errors are reported by the
/// validation step, in its order, rather than by the parser.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PluginManifest {
    #[serde(default, alias = "pluginName")]
    pub plugin_name: Option<toml::Value>,
    #[serde(default, alias = "pluginFn", alias = "pluginFunction")]
    pub plugin_fn: Option<toml::Value>,
    #[serde(default, alias = "flushFn")]
    pub flush_fn: Option<toml::Value>,
    #[serde(default)]
    pub options: Option<toml::Value>,
}

impl PluginManifest {
    /// Parse from TOML string.
    pub fn from_toml(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| {
            PluginError::new(
                UNDEFINED_PLUGIN,
                PluginErrorKind::InvalidManifest(e.to_string()),
                DiagnosticFlags::default(),
            )
        })
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| {
            PluginError::new(
                UNDEFINED_PLUGIN,
                PluginErrorKind::InvalidManifest(format!(
                    "Failed to read manifest {}: {}",
                    path.display(),
                    e
                )),
                DiagnosticFlags::default(),
            )
        })?;
        Self::from_toml(&source)
    }

    /// Resolve function names against `registry`.
    ///
    /// Never fails: unknown names and mistyped values become descriptor
    /// slots that [`PluginDescriptor::build`] rejects.
    pub fn resolve(self, registry: &TransformRegistry) -> PluginDescriptor {
        let name = match self.plugin_name {
            Some(toml::Value::String(name)) => Some(name),
            _ => None,
        };

        let transform = self.plugin_fn.map(|value| match value {
            toml::Value::String(fn_name) => match registry.transform(&fn_name) {
                Some(transform) => Callable::Provided(transform),
                None => Callable::Unresolved(fn_name),
            },
            other => Callable::Unresolved(other.to_string()),
        });

        let finalizer = self.flush_fn.map(|value| match value {
            toml::Value::String(fn_name) => match registry.finalizer(&fn_name) {
                Some(finalizer) => Callable::Provided(finalizer),
                None => Callable::Unresolved(fn_name),
            },
            other => Callable::Unresolved(other.to_string()),
        });

        let options = match self.options {
            Some(value) => OptionsInput::Toml(value),
            None => OptionsInput::Default,
        };

        debug!(plugin = ?name, "Resolved plugin manifest");

        PluginDescriptor::unnamed()
            .set_name(name)
            .set_transform(transform)
            .set_finalizer(finalizer)
            .set_options_input(options)
    }
}

/// Parse a manifest, resolve it and build the processor.
pub fn load_plugin(source: &str, registry: &TransformRegistry) -> Result<ItemProcessor> {
    PluginManifest::from_toml(source)?.resolve(registry).build()
}
