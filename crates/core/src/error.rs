use std::io;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::payload::PayloadId;
use crate::template::TemplateError;
use crate::toolchain::ToolchainError;

/// Coarse classification of a [`BindError`], one per pipeline failure class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Input,
    Workspace,
    PayloadRead,
    PayloadWrite,
    Template,
    Metadata,
    OutputPath,
    Build,
}

/// Error type for a bind operation.
///
/// Every variant is fatal to the current operation; nothing is retried.
#[derive(Debug, Error)]
pub enum BindError {
    #[error("Invalid input for payload {id} at {}: {reason}", path.display())]
    Input { id: PayloadId, path: PathBuf, reason: &'static str },

    #[error("Failed to create build workspace: {source}")]
    WorkspaceCreate {
        #[source]
        source: io::Error,
    },

    #[error("Failed to remove build workspace {}: {source}", path.display())]
    WorkspaceRemove {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write loader entry point {}: {source}", path.display())]
    EntryPointWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to read payload {id} from {}: {source}", path.display())]
    PayloadRead {
        id: PayloadId,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write payload {id} to {}: {source}", path.display())]
    PayloadWrite {
        id: PayloadId,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error("Failed to copy build descriptor {}: {source}", path.display())]
    Metadata {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to resolve output path {}: {source}", path.display())]
    OutputPath {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Build(#[from] ToolchainError),
}

impl BindError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BindError::Input { .. } => ErrorKind::Input,
            BindError::WorkspaceCreate { .. }
            | BindError::WorkspaceRemove { .. }
            | BindError::EntryPointWrite { .. } => ErrorKind::Workspace,
            BindError::PayloadRead { .. } => ErrorKind::PayloadRead,
            BindError::PayloadWrite { .. } => ErrorKind::PayloadWrite,
            BindError::Template(_) => ErrorKind::Template,
            BindError::Metadata { .. } => ErrorKind::Metadata,
            BindError::OutputPath { .. } => ErrorKind::OutputPath,
            BindError::Build(_) => ErrorKind::Build,
        }
    }

    /// Human-readable name of the pipeline step that failed.
    pub fn step(&self) -> &'static str {
        match self {
            BindError::Input { .. } => "input validation",
            BindError::WorkspaceCreate { .. } => "workspace creation",
            BindError::WorkspaceRemove { .. } => "workspace removal",
            BindError::EntryPointWrite { .. } => "loader generation",
            BindError::PayloadRead { .. } => "payload read",
            BindError::PayloadWrite { .. } => "payload copy",
            BindError::Template(_) => "loader generation",
            BindError::Metadata { .. } => "descriptor copy",
            BindError::OutputPath { .. } => "output path resolution",
            BindError::Build(_) => "toolchain build",
        }
    }
}

/// Convenience result type for bind operations.
pub type BindResult<T> = Result<T, BindError>;
