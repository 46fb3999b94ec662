use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::template::TEMPLATE_FILE_NAME;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse config {}: {reason}", path.display())]
    Parse { path: PathBuf, reason: String },
}

/// Directory holding the loader template and its build descriptors.
///
/// `BINDER_LOADER_DIR` wins; then a `loader/` directory next to the running
/// executable; otherwise the `loader/` directory of the source tree this crate
/// was built from.
pub fn default_loader_dir() -> PathBuf {
    let exe = env::current_exe().ok();
    locate_loader_dir(env::var_os("BINDER_LOADER_DIR").map(PathBuf::from), exe.as_deref())
}

/// Resolution behind [`default_loader_dir`], with its inputs made explicit.
///
/// A directory next to `exe` only counts when it holds a loader template.
pub fn locate_loader_dir(explicit: Option<PathBuf>, exe: Option<&Path>) -> PathBuf {
    if let Some(dir) = explicit {
        return dir;
    }
    exe.and_then(Path::parent)
        .map(|dir| dir.join("loader"))
        .filter(|dir| dir.join(TEMPLATE_FILE_NAME).is_file())
        .unwrap_or_else(source_tree_loader_dir)
}

/// The `loader/` directory shipped at the root of this repository.
pub fn source_tree_loader_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../loader")
}

fn default_release() -> bool {
    true
}

/// Settings for the external toolchain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolchainConfig {
    /// Explicit cargo executable. Resolved from the environment when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cargo: Option<PathBuf>,
    /// Build with the release profile.
    #[serde(default = "default_release")]
    pub release: bool,
    /// Forbid network access during the build.
    #[serde(default)]
    pub offline: bool,
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self { cargo: None, release: true, offline: false }
    }
}

/// Serializable configuration for bind operations.
///
/// Every value is resolved once, before the pipeline starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinderConfig {
    /// Source directory for the descriptors copied into each workspace.
    #[serde(default = "default_loader_dir")]
    pub loader_dir: PathBuf,
    /// Loader template. Defaults to `main.rs.tpl` inside `loader_dir`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<PathBuf>,
    /// Parent directory for build workspaces. Defaults to the system temp dir.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspace_parent: Option<PathBuf>,
    #[serde(default)]
    pub toolchain: ToolchainConfig,
}

impl Default for BinderConfig {
    fn default() -> Self {
        Self::new(default_loader_dir())
    }
}

impl BinderConfig {
    pub fn new(loader_dir: impl Into<PathBuf>) -> Self {
        Self {
            loader_dir: loader_dir.into(),
            template: None,
            workspace_parent: None,
            toolchain: ToolchainConfig::default(),
        }
    }

    pub fn template_path(&self) -> PathBuf {
        self.template.clone().unwrap_or_else(|| self.loader_dir.join(TEMPLATE_FILE_NAME))
    }

    pub fn descriptor_dir(&self) -> &Path {
        &self.loader_dir
    }

    /// Load a config file. `.yaml`/`.yml` files are parsed as YAML, anything
    /// else as JSON. Relative paths inside the file are taken relative to the
    /// file's own directory.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let body = fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
        let parsed: Result<Self, String> = if matches!(ext, "yaml" | "yml") {
            serde_yaml::from_str(&body).map_err(|e| e.to_string())
        } else {
            serde_json::from_str(&body).map_err(|e| e.to_string())
        };
        let mut config =
            parsed.map_err(|reason| ConfigError::Parse { path: path.to_path_buf(), reason })?;

        if let Some(base) = path.parent() {
            config.resolve_relative_to(base);
        }
        Ok(config)
    }

    /// Rebase every relative path onto `base`.
    pub fn resolve_relative_to(&mut self, base: &Path) {
        let rebase = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        rebase(&mut self.loader_dir);
        if let Some(template) = self.template.as_mut() {
            rebase(template);
        }
        if let Some(parent) = self.workspace_parent.as_mut() {
            rebase(parent);
        }
        if let Some(cargo) = self.toolchain.cargo.as_mut() {
            // Bare program names are looked up on PATH, not rebased.
            if cargo.components().count() > 1 {
                rebase(cargo);
            }
        }
    }
}
