//! Plugin descriptors and the factory entry points.
//!
//! A [`PluginDescriptor`] collects a name, a transform, an optional
//! finalizer and options, and [`PluginDescriptor::build`] validates them in
//! a fixed order before handing back an [`ItemProcessor`]:
//!
//! 1. options must be a configuration record
//! 2. the name must not be blank
//! 3. the name must start with `gulp-` unless `home_made` is set
//! 4. a transform must be present
//! 5. a finalizer, if named, must be present
//!
//! ```rust
//! use gf_plugins::{PluginDescriptor, PluginOptions};
//!
//! let plugin = PluginDescriptor::new("gulp-gipsum")
//!     .transform(|item, encoding| {
//!         let text = item.contents_string(encoding)?;
//!         item.set_contents_string(&format!("{text} gipsum"), encoding)?;
//!         Ok(())
//!     })
//!     .options(PluginOptions::default())
//!     .build()
//!     .unwrap();
//! assert_eq!(plugin.name(), "gulp-gipsum");
//! ```

use crate::error::{BoxError, OptionsError, PluginError, PluginErrorKind, Result, UNDEFINED_PLUGIN};
use crate::options::{DiagnosticFlags, PluginOptions};
use crate::plugin_trait::{Finalize, Transform};
use crate::processor::ItemProcessor;
use gf_domain::{Encoding, Item};
use tracing::{debug, warn};

/// Prefix every non home-made plugin name must start with.
pub const REQUIRED_PREFIX: &str = "gulp-";

/// A callable slot that may name a function nobody could resolve.
pub(crate) enum Callable<T> {
    Provided(T),
    Unresolved(String),
}

/// Options as supplied, before shape checking.
#[derive(Debug, Default)]
pub(crate) enum OptionsInput {
    #[default]
    Default,
    Typed(PluginOptions),
    Json(serde_json::Value),
    Toml(toml::Value),
}

impl OptionsInput {
    fn resolve(self) -> std::result::Result<PluginOptions, OptionsError> {
        match self {
            Self::Default => Ok(PluginOptions::default()),
            Self::Typed(options) => Ok(options),
            Self::Json(value) => PluginOptions::from_value(value),
            Self::Toml(value) => PluginOptions::from_toml_value(value),
        }
    }
}

/// Everything needed to build one plugin. Consumed by [`build`](Self::build).
pub struct PluginDescriptor {
    name: Option<String>,
    transform: Option<Callable<Box<dyn Transform>>>,
    finalizer: Option<Callable<Box<dyn Finalize>>>,
    options: OptionsInput,
}

/// A descriptor that passed validation.
pub(crate) struct ValidatedPlugin {
    pub(crate) name: String,
    pub(crate) transform: Box<dyn Transform>,
    pub(crate) finalizer: Option<Box<dyn Finalize>>,
    pub(crate) options: PluginOptions,
}

impl PluginDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::unnamed()
        }
    }

    /// A descriptor whose name was missing or not text.
    pub(crate) fn unnamed() -> Self {
        Self {
            name: None,
            transform: None,
            finalizer: None,
            options: OptionsInput::Default,
        }
    }

    /// Set the per-item transform from a closure.
    pub fn transform<F>(self, f: F) -> Self
    where
        F: FnMut(&mut Item, Encoding) -> std::result::Result<(), BoxError> + Send + 'static,
    {
        self.transform_with(f)
    }

    /// Set the per-item transform from any [`Transform`] implementation.
    pub fn transform_with<T: Transform + 'static>(mut self, transform: T) -> Self {
        self.transform = Some(Callable::Provided(Box::new(transform)));
        self
    }

    /// Set the finalizer from a closure.
    pub fn finalizer<F>(self, f: F) -> Self
    where
        F: FnMut() -> std::result::Result<(), BoxError> + Send + 'static,
    {
        self.finalizer_with(f)
    }

    pub fn finalizer_with<T: Finalize + 'static>(mut self, finalizer: T) -> Self {
        self.finalizer = Some(Callable::Provided(Box::new(finalizer)));
        self
    }

    pub fn options(mut self, options: PluginOptions) -> Self {
        self.options = OptionsInput::Typed(options);
        self
    }

    /// Supply options as an untyped JSON record, checked at build time.
    pub fn raw_options(mut self, options: serde_json::Value) -> Self {
        self.options = OptionsInput::Json(options);
        self
    }

    pub(crate) fn set_name(mut self, name: Option<String>) -> Self {
        self.name = name;
        self
    }

    pub(crate) fn set_transform(mut self, transform: Option<Callable<Box<dyn Transform>>>) -> Self {
        self.transform = transform;
        self
    }

    pub(crate) fn set_finalizer(mut self, finalizer: Option<Callable<Box<dyn Finalize>>>) -> Self {
        self.finalizer = finalizer;
        self
    }

    pub(crate) fn set_options_input(mut self, options: OptionsInput) -> Self {
        self.options = options;
        self
    }

    /// Validate the descriptor and create its processor.
    pub fn build(self) -> Result<ItemProcessor> {
        let validated = self.validate()?;
        debug!(plugin = %validated.name, "Created plugin");
        Ok(ItemProcessor::new(validated))
    }

    fn validate(self) -> Result<ValidatedPlugin> {
        let label = match &self.name {
            Some(name) if !name.trim().is_empty() => name.clone(),
            _ => UNDEFINED_PLUGIN.to_string(),
        };

        let options = self
            .options
            .resolve()
            .map_err(|e| reject(&label, e.into(), DiagnosticFlags::default()))?;
        let diagnostics = options.diagnostics();

        let name = match self.name {
            Some(name) if !name.trim().is_empty() => name,
            _ => return Err(reject(&label, PluginErrorKind::InvalidName, diagnostics)),
        };

        if options.requires_prefix() && !name.starts_with(REQUIRED_PREFIX) {
            return Err(reject(
                &label,
                PluginErrorKind::MissingPrefix { name: name.clone() },
                diagnostics,
            ));
        }

        let transform = match self.transform {
            Some(Callable::Provided(transform)) => transform,
            Some(Callable::Unresolved(fn_name)) => {
                warn!(plugin = %label, function = %fn_name, "Unknown transform function");
                return Err(reject(&label, PluginErrorKind::InvalidTransform, diagnostics));
            }
            None => return Err(reject(&label, PluginErrorKind::InvalidTransform, diagnostics)),
        };

        let finalizer = match self.finalizer {
            Some(Callable::Provided(finalizer)) => Some(finalizer),
            Some(Callable::Unresolved(fn_name)) => {
                warn!(plugin = %label, function = %fn_name, "Unknown flush function");
                return Err(reject(&label, PluginErrorKind::InvalidFinalizer, diagnostics));
            }
            None => None,
        };

        Ok(ValidatedPlugin {
            name,
            transform,
            finalizer,
            options,
        })
    }
}

fn reject(label: &str, kind: PluginErrorKind, diagnostics: DiagnosticFlags) -> PluginError {
    let err = PluginError::new(label, kind, diagnostics);
    warn!(plugin = %label, "Rejected plugin descriptor: {}", err);
    err
}

/// Build a plugin from a name, a transform and options.
pub fn create_plugin<F>(name: &str, transform: F, options: PluginOptions) -> Result<ItemProcessor>
where
    F: FnMut(&mut Item, Encoding) -> std::result::Result<(), BoxError> + Send + 'static,
{
    PluginDescriptor::new(name)
        .transform(transform)
        .options(options)
        .build()
}
