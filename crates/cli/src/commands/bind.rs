use std::path::Path;

use anyhow::{Context, Result};
use binder_core::{BindOutcome, BindRequest};

use crate::commands::{resolve_config, ConfigOverrides};

/// Bind `prog_a` and `prog_b` into one executable at `output`.
pub fn bind_command(
    output: &Path,
    prog_a: &Path,
    prog_b: &Path,
    overrides: &ConfigOverrides,
    json: bool,
) -> Result<BindOutcome> {
    let config = resolve_config(overrides)?;
    let request = BindRequest::new(output, prog_a, prog_b);

    let outcome = binder_core::bind(&config, &request).map_err(|err| {
        let step = err.step();
        anyhow::Error::new(err).context(format!("{step} failed"))
    })?;

    if json {
        let serialized = serde_json::to_string_pretty(&outcome)
            .context("Failed to serialize bind outcome to JSON")?;
        println!("{}", serialized);
        return Ok(outcome);
    }

    println!("Bound executable:");
    println!("  Output: {}", outcome.output.display());
    for payload in &outcome.payloads {
        println!(
            "  Payload {}: {} ({} bytes, sha256 {})",
            payload.id, payload.source, payload.size, payload.sha256
        );
    }
    let version = outcome.toolchain_version.as_deref().unwrap_or("(unknown version)");
    println!("  Toolchain: {} [{}]", outcome.toolchain, version);

    Ok(outcome)
}
