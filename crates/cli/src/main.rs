use std::path::PathBuf;
use std::process::ExitCode;

use binder::commands::{bind_command, ConfigOverrides};
use binder::init_logging;
use clap::Parser;
use tracing::error;

/// Bind two executables into one self-contained executable.
///
/// This CLI is a thin wrapper around `binder-core` (exposed in code as
/// `binder_core`). The produced executable embeds both programs and runs
/// them side by side when started.
#[derive(Parser, Debug)]
#[command(
    name = "binder",
    version,
    about = "Bind two executables into one self-contained executable",
    long_about = None
)]
struct Cli {
    /// Path of the executable to produce.
    output: PathBuf,

    /// First program to embed.
    prog_a: PathBuf,

    /// Second program to embed.
    prog_b: PathBuf,

    /// Directory holding the loader template and its Cargo descriptors.
    /// Defaults to $BINDER_LOADER_DIR, then a `loader/` directory next to this
    /// executable, then the loader directory of the source tree it was built
    /// from.
    #[arg(long)]
    loader_dir: Option<PathBuf>,

    /// Loader template to render instead of `<loader-dir>/main.rs.tpl`.
    #[arg(long)]
    template: Option<PathBuf>,

    /// JSON or YAML configuration file.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Cargo executable. Defaults to $BINDER_CARGO, then $CARGO, then `cargo`.
    #[arg(long)]
    cargo: Option<PathBuf>,

    /// Parent directory for the temporary build workspace.
    #[arg(long)]
    workspace_dir: Option<PathBuf>,

    /// Build the loader with the dev profile instead of release.
    #[arg(long, default_value_t = false)]
    debug: bool,

    /// Build without network access.
    #[arg(long, default_value_t = false)]
    offline: bool,

    /// Emit the bind report as JSON instead of human-readable text.
    #[arg(long, default_value_t = false)]
    json: bool,

    /// Enable debug logging.
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            // --help and --version land here too; only real usage errors fail.
            let code = if err.use_stderr() { 1 } else { 0 };
            let _ = err.print();
            return ExitCode::from(code);
        }
    };

    init_logging(cli.verbose);

    let overrides = ConfigOverrides {
        config: cli.config,
        loader_dir: cli.loader_dir,
        template: cli.template,
        cargo: cli.cargo,
        workspace_dir: cli.workspace_dir,
        debug: cli.debug,
        offline: cli.offline,
    };

    match bind_command(&cli.output, &cli.prog_a, &cli.prog_b, &overrides, cli.json) {
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}
