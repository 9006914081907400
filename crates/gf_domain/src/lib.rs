//! Core item types for gulp-factory-rs.
//!
//! An [`Item`] is what flows through a plugin: a path triple plus a content
//! slot that is absent, buffered, or streaming.

pub mod encoding;
pub mod error;
pub mod fs;
pub mod item;

pub use encoding::{ContentForm, Encoding};
pub use error::{DomainError, Result};
pub use fs::{ReadMode, dest, src};
pub use item::{ContentStream, Contents, Item};
