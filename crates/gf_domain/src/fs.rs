//! Filesystem source and sink for items.
//!
//! `src` reads the files of one directory into items and `dest` writes
//! items back out below another directory, keeping their path relative to
//! `base`.

use crate::error::{DomainError, Result};
use crate::item::{Contents, Item};
use std::fs::File;
use std::io::BufReader;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, info};

/// How `src` fills each item's content slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadMode {
    #[default]
    Buffer,
    Stream,
    /// Leave content absent; only paths are produced.
    Null,
}

/// Read the regular files directly inside `dir`, sorted by path.
///
/// When `extension` is given only files with that extension are read.
pub fn src<P: AsRef<Path>>(dir: P, extension: Option<&str>, mode: ReadMode) -> Result<Vec<Item>> {
    let dir = dir.as_ref();
    let mut paths = Vec::new();

    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        if let Some(wanted) = extension {
            if path.extension().and_then(|e| e.to_str()) != Some(wanted) {
                debug!("Skipping {}: extension filter", path.display());
                continue;
            }
        }
        paths.push(path);
    }
    paths.sort();

    let mut items = Vec::with_capacity(paths.len());
    for path in paths {
        let contents = match mode {
            ReadMode::Buffer => Contents::Buffer(std::fs::read(&path)?),
            ReadMode::Stream => Contents::Stream(crate::item::ContentStream::new(
                BufReader::new(File::open(&path)?),
            )),
            ReadMode::Null => Contents::Null,
        };
        items.push(Item::new(path).with_base(dir).with_contents(contents));
    }

    info!("Read {} items from {}", items.len(), dir.display());
    Ok(items)
}

/// Write items below `out_dir`, returning the paths written.
///
/// Items with absent content are skipped. Streams are drained. An item whose
/// relative path is absolute or climbs out with `..` fails with
/// `DomainError::OutsideOutputDir` before anything is written for it.
pub fn dest<P: AsRef<Path>>(items: Vec<Item>, out_dir: P) -> Result<Vec<PathBuf>> {
    let out_dir = out_dir.as_ref();
    let mut written = Vec::new();

    for item in items {
        let relative = item.relative();
        if !relative.components().all(|c| matches!(c, Component::Normal(_) | Component::CurDir)) {
            return Err(DomainError::OutsideOutputDir(relative.to_path_buf()));
        }
        let target = out_dir.join(relative);
        let bytes = match item.contents {
            Contents::Null => {
                debug!("Skipping {}: no content", item.path.display());
                continue;
            }
            Contents::Buffer(bytes) => bytes,
            Contents::Stream(stream) => stream.read_to_end()?,
        };
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&target, bytes)?;
        written.push(target);
    }

    info!("Wrote {} items to {}", written.len(), out_dir.display());
    Ok(written)
}
