//! Ephemeral build workspace.
//!
//! A `BuildWorkspace` is created fresh for every bind operation and removed
//! when it goes out of scope, whichever step of the pipeline returns first.
//! `close` removes it explicitly so a removal failure can be reported.

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, info};

use crate::error::{BindError, BindResult};
use crate::metadata::{PRIMARY_DESCRIPTOR, SECONDARY_DESCRIPTOR};
use crate::payload::PayloadId;

/// Prefix of every workspace directory name.
pub const WORKSPACE_PREFIX: &str = "binder-build-";

/// Logical layout of a build workspace on disk.
///
/// This is derived from a chosen root path. It does *not* perform any IO itself.
#[derive(Debug, Clone)]
pub struct WorkspaceLayout {
    /// Root directory of the workspace (the toolchain's build root).
    pub root: PathBuf,
    /// Raw copy of payload A.
    pub payload_a: PathBuf,
    /// Raw copy of payload B.
    pub payload_b: PathBuf,
    /// Directory holding the generated source.
    pub src_dir: PathBuf,
    /// Generated loader entry point.
    pub entry_point: PathBuf,
    /// Primary build descriptor (mandatory).
    pub manifest: PathBuf,
    /// Secondary lock descriptor (optional).
    pub lockfile: PathBuf,
    /// Toolchain output directory.
    pub target_dir: PathBuf,
}

impl WorkspaceLayout {
    /// Compute the layout for a workspace rooted at `root`.
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref().to_path_buf();
        let payload_a = root.join(PayloadId::A.file_name());
        let payload_b = root.join(PayloadId::B.file_name());
        let src_dir = root.join("src");
        let entry_point = src_dir.join("main.rs");
        let manifest = root.join(PRIMARY_DESCRIPTOR);
        let lockfile = root.join(SECONDARY_DESCRIPTOR);
        let target_dir = root.join("target");

        Self { root, payload_a, payload_b, src_dir, entry_point, manifest, lockfile, target_dir }
    }

    pub fn payload_path(&self, id: PayloadId) -> PathBuf {
        match id {
            PayloadId::A => self.payload_a.clone(),
            PayloadId::B => self.payload_b.clone(),
        }
    }
}

/// Exclusively owned, uniquely named temporary directory for one bind.
#[derive(Debug)]
pub struct BuildWorkspace {
    dir: TempDir,
    layout: WorkspaceLayout,
}

impl BuildWorkspace {
    /// Create a fresh workspace under `parent`, or under the system temp
    /// directory when `parent` is `None`.
    pub fn create(parent: Option<&Path>) -> BindResult<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(WORKSPACE_PREFIX);
        let dir = match parent {
            Some(parent) => builder.tempdir_in(parent),
            None => builder.tempdir(),
        }
        .map_err(|source| BindError::WorkspaceCreate { source })?;

        let layout = WorkspaceLayout::new(dir.path());
        info!(workspace = %layout.root.display(), "using temporary build workspace");
        Ok(Self { dir, layout })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn layout(&self) -> &WorkspaceLayout {
        &self.layout
    }

    /// Remove the workspace now, surfacing any removal failure.
    pub fn close(self) -> BindResult<()> {
        let path = self.dir.path().to_path_buf();
        self.dir.close().map_err(|source| BindError::WorkspaceRemove { path: path.clone(), source })?;
        debug!(workspace = %path.display(), "removed build workspace");
        Ok(())
    }
}
