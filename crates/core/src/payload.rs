//! Payload store: the two input executables, read once and copied verbatim.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::{BindError, BindResult};
use crate::workspace::WorkspaceLayout;

/// Identity of a payload within a bind operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PayloadId {
    A,
    B,
}

impl PayloadId {
    pub const ALL: [PayloadId; 2] = [PayloadId::A, PayloadId::B];

    /// Fixed filename the payload is stored under inside the build workspace.
    pub fn file_name(self) -> &'static str {
        match self {
            PayloadId::A => "progA.bin",
            PayloadId::B => "progB.bin",
        }
    }
}

impl fmt::Display for PayloadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PayloadId::A => f.write_str("A"),
            PayloadId::B => f.write_str("B"),
        }
    }
}

/// Check that `path` names a regular file before any workspace exists.
///
/// Missing or unreadable paths are reported as read failures; anything that
/// exists but is not a regular file (directory, socket, ...) is an input error.
pub fn check_input(id: PayloadId, path: &Path) -> BindResult<()> {
    let meta = fs::metadata(path).map_err(|source| BindError::PayloadRead {
        id,
        path: path.to_path_buf(),
        source,
    })?;
    if !meta.is_file() {
        return Err(BindError::Input {
            id,
            path: path.to_path_buf(),
            reason: "not a regular file",
        });
    }
    Ok(())
}

/// An input executable held in memory. Immutable once read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    id: PayloadId,
    source: PathBuf,
    bytes: Vec<u8>,
}

impl Payload {
    /// Read the whole file at `source` into memory.
    pub fn read(id: PayloadId, source: impl AsRef<Path>) -> BindResult<Self> {
        let source = source.as_ref().to_path_buf();
        let bytes = fs::read(&source).map_err(|err| BindError::PayloadRead {
            id,
            path: source.clone(),
            source: err,
        })?;
        debug!(payload = %id, path = %source.display(), size = bytes.len(), "read payload");
        Ok(Self { id, source, bytes })
    }

    pub fn id(&self) -> PayloadId {
        self.id
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn file_name(&self) -> &'static str {
        self.id.file_name()
    }

    /// SHA-256 of the payload bytes as a lowercase hex string.
    pub fn sha256(&self) -> String {
        let digest = Sha256::digest(&self.bytes);
        format!("{:x}", digest)
    }

    /// Write a byte-identical copy into the workspace under its fixed filename.
    pub fn write_into(&self, layout: &WorkspaceLayout) -> BindResult<PathBuf> {
        let dest = layout.payload_path(self.id);
        fs::write(&dest, &self.bytes).map_err(|source| BindError::PayloadWrite {
            id: self.id,
            path: dest.clone(),
            source,
        })?;
        Ok(dest)
    }

    pub fn summary(&self) -> PayloadSummary {
        PayloadSummary {
            id: self.id,
            source: self.source.display().to_string(),
            size: self.bytes.len() as u64,
            sha256: self.sha256(),
        }
    }
}

/// Serializable description of a payload for bind reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadSummary {
    pub id: PayloadId,
    pub source: String,
    pub size: u64,
    pub sha256: String,
}
