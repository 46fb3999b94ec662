//! Build workspace populator: copies the toolchain's descriptor files.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{BindError, BindResult};
use crate::workspace::WorkspaceLayout;

/// Package manifest required by the toolchain.
pub const PRIMARY_DESCRIPTOR: &str = "Cargo.toml";

/// Lock file; copied when present.
pub const SECONDARY_DESCRIPTOR: &str = "Cargo.lock";

/// What the populator copied into the workspace.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PopulateReport {
    pub copied: Vec<PathBuf>,
    pub skipped: Vec<PathBuf>,
}

/// Copy the descriptors found in `source_dir` into the workspace root.
///
/// The primary descriptor is mandatory. The secondary one is best effort: its
/// absence or a failed copy is recorded in `skipped` and otherwise ignored.
pub fn populate(source_dir: &Path, layout: &WorkspaceLayout) -> BindResult<PopulateReport> {
    let mut report = PopulateReport::default();

    let primary = source_dir.join(PRIMARY_DESCRIPTOR);
    copy_descriptor(&primary, &layout.manifest)
        .map_err(|source| BindError::Metadata { path: primary.clone(), source })?;
    report.copied.push(layout.manifest.clone());

    let secondary = source_dir.join(SECONDARY_DESCRIPTOR);
    if secondary.is_file() {
        match copy_descriptor(&secondary, &layout.lockfile) {
            Ok(()) => report.copied.push(layout.lockfile.clone()),
            Err(e) => {
                debug!(path = %secondary.display(), error = %e, "skipping lock descriptor");
                report.skipped.push(secondary);
            }
        }
    } else {
        debug!(path = %secondary.display(), "no lock descriptor to copy");
        report.skipped.push(secondary);
    }

    Ok(report)
}

fn copy_descriptor(src: &Path, dst: &Path) -> std::io::Result<()> {
    let body = fs::read(src)?;
    fs::write(dst, body)
}
