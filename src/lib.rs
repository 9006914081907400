//! gulp-factory-rs: build gulp-style transform plugins and run them over files.
//!
//! The work lives in the member crates; this crate re-exports them and
//! wires the filesystem source and sink around a [`Pipeline`].

pub use gf_domain as domain;
pub use gf_plugins as plugins;
pub use gf_telemetry as telemetry;

use gf_domain::{Encoding, ReadMode};
use gf_plugins::{Pipeline, PipelineReport};
use std::path::{Path, PathBuf};
use tracing::info;

/// Result of [`build_directory`]. The report's items have been written out.
#[derive(Debug)]
pub struct BuildOutput {
    pub report: PipelineReport,
    pub written: Vec<PathBuf>,
}

/// Read `src_dir`, run the items through `pipeline`, write survivors to `out_dir`.
///
/// Plugin failures are collected in the report; only I/O errors abort.
pub fn build_directory(
    pipeline: Pipeline,
    src_dir: &Path,
    extension: Option<&str>,
    out_dir: &Path,
    encoding: Encoding,
) -> gf_domain::Result<BuildOutput> {
    let items = gf_domain::src(src_dir, extension, ReadMode::Buffer)?;
    let mut report = pipeline.run(items, encoding);
    let written = gf_domain::dest(std::mem::take(&mut report.items), out_dir)?;
    info!(
        written = written.len(),
        errors = report.errors.len(),
        "Built {} into {}",
        src_dir.display(),
        out_dir.display()
    );
    Ok(BuildOutput { report, written })
}
