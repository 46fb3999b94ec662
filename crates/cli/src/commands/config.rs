use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use binder_core::BinderConfig;
use tracing::debug;

use crate::canonicalize_or_current;

/// Command-line overrides applied on top of the config file.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    /// JSON or YAML config file.
    pub config: Option<PathBuf>,
    pub loader_dir: Option<PathBuf>,
    pub template: Option<PathBuf>,
    pub cargo: Option<PathBuf>,
    pub workspace_dir: Option<PathBuf>,
    pub debug: bool,
    pub offline: bool,
}

/// Resolve the effective configuration once, before any bind work starts.
///
/// Precedence: command-line flag, then config file, then environment, then
/// built-in defaults.
pub fn resolve_config(overrides: &ConfigOverrides) -> Result<BinderConfig> {
    let mut config = match &overrides.config {
        Some(path) => {
            let path = canonicalize_or_current(path)?;
            BinderConfig::load(&path)
                .with_context(|| format!("Failed to load config {}", path.display()))?
        }
        None => BinderConfig::default(),
    };

    if let Some(dir) = &overrides.loader_dir {
        config.loader_dir = canonicalize_or_current(dir)?;
    }
    if let Some(template) = &overrides.template {
        config.template = Some(canonicalize_or_current(template)?);
    }
    if let Some(dir) = &overrides.workspace_dir {
        config.workspace_parent = Some(canonicalize_or_current(dir)?);
    }
    if let Some(cargo) = &overrides.cargo {
        config.toolchain.cargo = Some(program_path(cargo)?);
    }
    if overrides.debug {
        config.toolchain.release = false;
    }
    if overrides.offline {
        config.toolchain.offline = true;
    }

    debug!(?config, "resolved configuration");
    Ok(config)
}

/// Bare program names are left for `PATH` lookup; anything with a directory
/// component is made absolute.
fn program_path(program: &Path) -> Result<PathBuf> {
    if program.components().count() > 1 {
        canonicalize_or_current(program)
    } else {
        Ok(program.to_path_buf())
    }
}
