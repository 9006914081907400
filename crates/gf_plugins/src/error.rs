use crate::options::DiagnosticFlags;
use gf_domain::ContentForm;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Boxed cause returned by transforms and finalizers.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Label used when the plugin name itself failed validation.
pub const UNDEFINED_PLUGIN: &str = "UNDEFINED";

/// Options that are not a usable configuration record.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct OptionsError(pub String);

#[derive(Debug, Error)]
pub enum PluginErrorKind {
    #[error("Invalid plugin options: {0}")]
    InvalidOptions(#[from] OptionsError),

    #[error("Invalid plugin manifest: {0}")]
    InvalidManifest(String),

    #[error("Pass a valid plugin name")]
    InvalidName,

    #[error("Plugin name must always start with \"gulp-\", got {name:?}")]
    MissingPrefix { name: String },

    #[error("Pass a valid plugin function")]
    InvalidTransform,

    #[error("Pass a valid flush function")]
    InvalidFinalizer,

    #[error("{0} content not supported")]
    UnsupportedContentForm(ContentForm),

    #[error("Transform failed: {0}")]
    TransformFailure(#[source] BoxError),

    #[error("Finalization failed: {0}")]
    FinalizationFailure(#[source] BoxError),

    #[error("Processor is no longer accepting items")]
    ProcessorClosed,
}

impl PluginErrorKind {
    /// Whether this kind is raised while building a processor.
    pub fn is_construction(&self) -> bool {
        matches!(
            self,
            Self::InvalidOptions(_)
                | Self::InvalidManifest(_)
                | Self::InvalidName
                | Self::MissingPrefix { .. }
                | Self::InvalidTransform
                | Self::InvalidFinalizer
        )
    }
}

/// A failure labeled with the plugin that produced it.
///
/// Every error leaving the factory, a processor or a pipeline has this type.
/// The diagnostic flags captured at creation time decide how much `Display`
/// renders: `show_properties` adds the item path, `show_stack` adds the
/// chain of underlying causes.
#[derive(Debug)]
pub struct PluginError {
    plugin: String,
    kind: PluginErrorKind,
    item_path: Option<PathBuf>,
    diagnostics: DiagnosticFlags,
}

impl PluginError {
    pub fn new(plugin: impl Into<String>, kind: PluginErrorKind, diagnostics: DiagnosticFlags) -> Self {
        Self {
            plugin: plugin.into(),
            kind,
            item_path: None,
            diagnostics,
        }
    }

    pub(crate) fn with_item_path(mut self, path: &Path) -> Self {
        self.item_path = Some(path.to_path_buf());
        self
    }

    pub fn plugin(&self) -> &str {
        &self.plugin
    }

    pub fn kind(&self) -> &PluginErrorKind {
        &self.kind
    }

    pub fn into_kind(self) -> PluginErrorKind {
        self.kind
    }

    pub fn item_path(&self) -> Option<&Path> {
        self.item_path.as_deref()
    }

    pub fn diagnostics(&self) -> DiagnosticFlags {
        self.diagnostics
    }

    pub fn is_construction_error(&self) -> bool {
        self.kind.is_construction()
    }
}

impl fmt::Display for PluginError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.plugin, self.kind)?;

        if self.diagnostics.show_properties {
            if let Some(path) = &self.item_path {
                write!(f, " (path: {})", path.display())?;
            }
        }

        if self.diagnostics.show_stack {
            // The kind already renders the direct cause; walk what is below it.
            let mut cause = std::error::Error::source(&self.kind).and_then(|c| c.source());
            while let Some(err) = cause {
                write!(f, "\n  caused by: {}", err)?;
                cause = err.source();
            }
        }

        Ok(())
    }
}

impl std::error::Error for PluginError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        std::error::Error::source(&self.kind)
    }
}

pub type Result<T> = std::result::Result<T, PluginError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Error)]
    #[error("outer failure")]
    struct Outer(#[source] Inner);

    #[derive(Debug, Error)]
    #[error("disk on fire")]
    struct Inner;

    fn flags(show_stack: bool, show_properties: bool) -> DiagnosticFlags {
        DiagnosticFlags {
            show_stack,
            show_properties,
        }
    }

    #[test]
    fn test_display_is_labeled() {
        let err = PluginError::new("gulp-test", PluginErrorKind::InvalidTransform, flags(false, false));
        assert_eq!(err.to_string(), "gulp-test: Pass a valid plugin function");
    }

    #[test]
    fn test_display_with_properties() {
        let err = PluginError::new(
            "gulp-test",
            PluginErrorKind::UnsupportedContentForm(ContentForm::Stream),
            flags(false, true),
        )
        .with_item_path(Path::new("src/a.md"));
        assert_eq!(err.to_string(), "gulp-test: stream content not supported (path: src/a.md)");

        let quiet = PluginError::new(
            "gulp-test",
            PluginErrorKind::UnsupportedContentForm(ContentForm::Stream),
            flags(false, false),
        )
        .with_item_path(Path::new("src/a.md"));
        assert_eq!(quiet.to_string(), "gulp-test: stream content not supported");
    }

    #[test]
    fn test_display_with_stack() {
        let cause: BoxError = Box::new(Outer(Inner));
        let err = PluginError::new("gulp-test", PluginErrorKind::TransformFailure(cause), flags(true, false));
        assert_eq!(
            err.to_string(),
            "gulp-test: Transform failed: outer failure\n  caused by: disk on fire"
        );
    }

    #[test]
    fn test_source_is_wrapped_cause() {
        let cause: BoxError = "Thrown from flush".into();
        let err = PluginError::new("gulp-test", PluginErrorKind::FinalizationFailure(cause), flags(false, true));
        let source = std::error::Error::source(&err).unwrap();
        assert_eq!(source.to_string(), "Thrown from flush");
    }

    #[test]
    fn test_construction_kinds() {
        assert!(PluginErrorKind::InvalidName.is_construction());
        assert!(PluginErrorKind::MissingPrefix { name: "x".into() }.is_construction());
        assert!(!PluginErrorKind::ProcessorClosed.is_construction());
        assert!(!PluginErrorKind::UnsupportedContentForm(ContentForm::Buffer).is_construction());
    }
}
