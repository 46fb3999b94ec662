//! Bind orchestration: the single-pass pipeline that turns two payloads into
//! one executable.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::BinderConfig;
use crate::error::{BindError, BindResult};
use crate::metadata;
use crate::payload::{self, Payload, PayloadId, PayloadSummary};
use crate::template::{LoaderParams, LoaderTemplate, RenderedSource};
use crate::toolchain::{BuildRequest, CargoToolchain, Toolchain};
use crate::workspace::{BuildWorkspace, WorkspaceLayout};

/// Inputs of one bind operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindRequest {
    /// Where to write the final executable; may be relative.
    pub output: PathBuf,
    pub prog_a: PathBuf,
    pub prog_b: PathBuf,
}

impl BindRequest {
    pub fn new(
        output: impl Into<PathBuf>,
        prog_a: impl Into<PathBuf>,
        prog_b: impl Into<PathBuf>,
    ) -> Self {
        Self { output: output.into(), prog_a: prog_a.into(), prog_b: prog_b.into() }
    }

    pub fn input(&self, id: PayloadId) -> &Path {
        match id {
            PayloadId::A => &self.prog_a,
            PayloadId::B => &self.prog_b,
        }
    }
}

/// Report of a successful bind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindOutcome {
    /// Absolute path of the executable that was written.
    pub output: PathBuf,
    pub payloads: Vec<PayloadSummary>,
    pub toolchain: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub toolchain_version: Option<String>,
    pub started_at: String,
    pub finished_at: String,
}

/// Coordinator that ties a configuration and a toolchain together.
pub struct Binder<'a> {
    pub config: &'a BinderConfig,
    pub toolchain: &'a dyn Toolchain,
}

impl<'a> Binder<'a> {
    pub fn new(config: &'a BinderConfig, toolchain: &'a dyn Toolchain) -> Self {
        Self { config, toolchain }
    }

    /// Run the pipeline. Aborts on the first failing step; the workspace is
    /// removed on every path.
    pub fn bind(&self, request: &BindRequest) -> BindResult<BindOutcome> {
        let started_at = Utc::now().to_rfc3339();

        for id in PayloadId::ALL {
            payload::check_input(id, request.input(id))?;
        }

        let workspace = BuildWorkspace::create(self.config.workspace_parent.as_deref())?;
        let layout = workspace.layout();

        let mut payloads = Vec::with_capacity(PayloadId::ALL.len());
        for id in PayloadId::ALL {
            let payload = Payload::read(id, request.input(id))?;
            let dest = payload.write_into(layout)?;
            info!(
                payload = %id,
                size = payload.len(),
                sha256 = %payload.sha256(),
                dest = %dest.display(),
                "copied payload into workspace"
            );
            payloads.push(payload.summary());
        }

        let template_path = self.config.template_path();
        let source = generate_loader(&template_path, layout)?;
        info!(template = %template_path.display(), bytes = source.as_str().len(), "generated loader source");

        let report = metadata::populate(self.config.descriptor_dir(), layout)?;
        debug!(copied = report.copied.len(), skipped = report.skipped.len(), "copied build descriptors");

        let output = std::path::absolute(&request.output)
            .map_err(|source| BindError::OutputPath { path: request.output.clone(), source })?;

        let toolchain_version = self.toolchain.version();
        self.toolchain.build(&BuildRequest { workspace: layout, output: &output })?;

        workspace.close()?;
        info!(output = %output.display(), "created executable");

        Ok(BindOutcome {
            output,
            payloads,
            toolchain: self.toolchain.name().to_string(),
            toolchain_version,
            started_at,
            finished_at: Utc::now().to_rfc3339(),
        })
    }
}

/// Render the template at `template_path` with the workspace payload names and
/// write it as the workspace entry point.
pub fn generate_loader(template_path: &Path, layout: &WorkspaceLayout) -> BindResult<RenderedSource> {
    let template = LoaderTemplate::load(template_path)?;
    let source = template.render(&LoaderParams::for_workspace())?;

    fs::create_dir_all(&layout.src_dir)
        .map_err(|source| BindError::EntryPointWrite { path: layout.src_dir.clone(), source })?;
    fs::write(&layout.entry_point, source.as_bytes())
        .map_err(|source| BindError::EntryPointWrite { path: layout.entry_point.clone(), source })?;
    Ok(source)
}

/// Bind with the cargo toolchain described by `config`.
pub fn bind(config: &BinderConfig, request: &BindRequest) -> BindResult<BindOutcome> {
    let toolchain = CargoToolchain::from_config(&config.toolchain);
    Binder::new(config, &toolchain).bind(request)
}
