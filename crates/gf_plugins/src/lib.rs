//! # gulp-factory plugins
//!
//! A factory for build-pipeline transform plugins. Give it a name, a
//! per-item transform and options; get back an [`ItemProcessor`] that
//! validates its inputs once, gates items by content form, runs the
//! transform, and labels every failure with the plugin name.
//!
//! ## Example
//!
//! ```rust
//! use gf_domain::{Encoding, Item};
//! use gf_plugins::{create_plugin, PluginOptions};
//!
//! let mut plugin = create_plugin(
//!     "gulp-gipsum",
//!     |item, encoding| {
//!         let text = item.contents_string(encoding)?;
//!         item.set_contents_string(&format!("{text} gipsum"), encoding)?;
//!         Ok(())
//!     },
//!     PluginOptions::default(),
//! )
//! .unwrap();
//!
//! let item = plugin
//!     .offer(Item::new("lorem.txt").with_buffer("Lorem ipsum"), Encoding::Utf8)
//!     .unwrap();
//! assert_eq!(item.buffer(), Some("Lorem ipsum gipsum".as_bytes()));
//! plugin.finish().unwrap();
//! ```
//!
//! ## Options
//!
//! - `stream_support` (default `false`): accept streaming content
//! - `buffer_support` (default `true`): accept buffered content
//! - `home_made` (default `false`): allow names without the `gulp-` prefix
//! - `show_stack`, `show_properties`: how much a rendered error shows

pub mod descriptor;
pub mod error;
pub mod manifest;
pub mod options;
pub mod pipeline;
pub mod plugin_trait;
pub mod processor;

// Re-export main types
pub use descriptor::{PluginDescriptor, REQUIRED_PREFIX, create_plugin};
pub use error::{BoxError, OptionsError, PluginError, PluginErrorKind, Result, UNDEFINED_PLUGIN};
pub use manifest::{PluginManifest, TransformRegistry, load_plugin};
pub use options::{DiagnosticFlags, PluginOptions};
pub use pipeline::{ErrorPolicy, Pipeline, PipelineReport};
pub use plugin_trait::{Finalize, Transform};
pub use processor::{ItemProcessor, Panicked, ProcessorState, ProcessorStats};
