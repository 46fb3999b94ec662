//! External toolchain invocation.
//!
//! The orchestrator only depends on the [`Toolchain`] trait: given a populated
//! workspace and an absolute output path, produce an executable at that path
//! or report why not. [`CargoToolchain`] is the real implementation.

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::config::ToolchainConfig;
use crate::workspace::WorkspaceLayout;

#[derive(Debug, Error)]
pub enum ToolchainError {
    #[error("Failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("Build failed: {program} exited with {status}")]
    Failed { program: String, status: String, code: Option<i32> },

    #[error("Invalid build manifest {}: {reason}", path.display())]
    Manifest { path: PathBuf, reason: String },

    #[error("Build produced no executable at {}", path.display())]
    MissingArtifact { path: PathBuf },

    #[error("Failed to install executable at {}: {source}", path.display())]
    Install {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// What a toolchain is asked to build.
#[derive(Debug, Clone, Copy)]
pub struct BuildRequest<'a> {
    /// Populated workspace; its root is the build root.
    pub workspace: &'a WorkspaceLayout,
    /// Absolute path the final executable must be written to.
    pub output: &'a Path,
}

/// Trait implemented by toolchains able to compile the generated loader.
pub trait Toolchain: Send + Sync {
    fn name(&self) -> &'static str;

    /// Version string of the underlying tool, when it can be determined.
    fn version(&self) -> Option<String> {
        None
    }

    /// Build synchronously. Diagnostic output goes straight to the caller's
    /// stdout/stderr. Nothing may be left at `request.output` on failure.
    fn build(&self, request: &BuildRequest<'_>) -> Result<(), ToolchainError>;
}

/// Resolve the cargo executable from the environment.
///
/// Precedence:
/// - `BINDER_CARGO`
/// - `CARGO` (set when running under cargo itself)
/// - `cargo` on `PATH`
pub fn resolve_cargo_path() -> PathBuf {
    env::var_os("BINDER_CARGO")
        .or_else(|| env::var_os("CARGO"))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("cargo"))
}

/// Builds the loader with `cargo build` and installs the resulting binary.
#[derive(Debug, Clone)]
pub struct CargoToolchain {
    pub cargo: PathBuf,
    pub release: bool,
    pub offline: bool,
}

impl CargoToolchain {
    pub fn new(cargo: impl Into<PathBuf>) -> Self {
        Self { cargo: cargo.into(), release: true, offline: false }
    }

    pub fn from_config(config: &ToolchainConfig) -> Self {
        Self {
            cargo: config.cargo.clone().unwrap_or_else(resolve_cargo_path),
            release: config.release,
            offline: config.offline,
        }
    }

    fn profile_dir(&self) -> &'static str {
        if self.release {
            "release"
        } else {
            "debug"
        }
    }

    /// The `cargo build` invocation for a workspace.
    pub fn command(&self, workspace: &WorkspaceLayout) -> Command {
        let mut cmd = Command::new(&self.cargo);
        cmd.arg("build");
        if self.release {
            cmd.arg("--release");
        }
        if self.offline {
            cmd.arg("--offline");
        }
        cmd.arg("--manifest-path")
            .arg(&workspace.manifest)
            .arg("--target-dir")
            .arg(&workspace.target_dir)
            .current_dir(&workspace.root);
        cmd
    }

    /// Where the build leaves the executable for a workspace.
    pub fn artifact_path(&self, workspace: &WorkspaceLayout) -> Result<PathBuf, ToolchainError> {
        let name = artifact_name(&workspace.manifest)?;
        Ok(workspace
            .target_dir
            .join(self.profile_dir())
            .join(format!("{name}{}", env::consts::EXE_SUFFIX)))
    }
}

impl Toolchain for CargoToolchain {
    fn name(&self) -> &'static str {
        "cargo"
    }

    fn version(&self) -> Option<String> {
        Command::new(&self.cargo).arg("--version").output().ok().and_then(|out| {
            if out.status.success() {
                let s = String::from_utf8_lossy(&out.stdout).trim().to_string();
                if s.is_empty() {
                    None
                } else {
                    Some(s)
                }
            } else {
                None
            }
        })
    }

    fn build(&self, request: &BuildRequest<'_>) -> Result<(), ToolchainError> {
        let program = self.cargo.display().to_string();
        let mut cmd = self.command(request.workspace);
        info!(cargo = %program, profile = self.profile_dir(), "compiling final executable");
        debug!(command = ?cmd, "spawning toolchain");

        let status =
            cmd.status().map_err(|source| ToolchainError::Spawn { program: program.clone(), source })?;
        if !status.success() {
            return Err(ToolchainError::Failed {
                program,
                status: status.to_string(),
                code: status.code(),
            });
        }

        let artifact = self.artifact_path(request.workspace)?;
        if !artifact.is_file() {
            return Err(ToolchainError::MissingArtifact { path: artifact });
        }
        install_artifact(&artifact, request.output)
    }
}

#[derive(Debug, Deserialize)]
struct CargoManifest {
    #[serde(default)]
    package: Option<ManifestPackage>,
    #[serde(default)]
    bin: Vec<ManifestBin>,
}

#[derive(Debug, Deserialize)]
struct ManifestPackage {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ManifestBin {
    #[serde(default)]
    name: Option<String>,
}

/// Name of the binary a manifest builds: its first `[[bin]]` name, falling
/// back to the package name.
pub fn artifact_name(manifest: &Path) -> Result<String, ToolchainError> {
    let invalid = |reason: String| ToolchainError::Manifest { path: manifest.to_path_buf(), reason };
    let body = fs::read_to_string(manifest).map_err(|e| invalid(e.to_string()))?;
    let parsed: CargoManifest = toml::from_str(&body).map_err(|e| invalid(e.to_string()))?;

    parsed
        .bin
        .into_iter()
        .find_map(|bin| bin.name)
        .or_else(|| parsed.package.map(|p| p.name))
        .ok_or_else(|| invalid("no [package] name or [[bin]] name".to_string()))
}

/// Copy `artifact` to `output` atomically: the bytes land in a sibling temp
/// file that is renamed over `output` only once complete.
pub fn install_artifact(artifact: &Path, output: &Path) -> Result<(), ToolchainError> {
    let install_err = |source: io::Error| ToolchainError::Install { path: output.to_path_buf(), source };
    let parent = match output.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut staged =
        tempfile::Builder::new().prefix(".binder-").tempfile_in(parent).map_err(install_err)?;
    let mut src = fs::File::open(artifact).map_err(install_err)?;
    io::copy(&mut src, staged.as_file_mut()).map_err(install_err)?;
    staged.as_file().sync_all().map_err(install_err)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        staged.as_file().set_permissions(fs::Permissions::from_mode(0o755)).map_err(install_err)?;
    }

    staged.persist(output).map_err(|e| install_err(e.error))?;
    debug!(output = %output.display(), "installed executable");
    Ok(())
}
