//! binder-core
//!
//! Core library for binding two independently compiled executables into one
//! self-contained executable.
//!
//! A bind copies both payloads into an ephemeral workspace, renders a loader
//! source file that embeds them, and hands the workspace to an external
//! toolchain. The workspace never outlives the operation; the compiled loader
//! is the only thing that carries the payloads forward.

pub mod bind;
pub mod config;
pub mod error;
pub mod metadata;
pub mod payload;
pub mod template;
pub mod toolchain;
pub mod workspace;

pub use bind::{bind, BindOutcome, BindRequest, Binder};
pub use config::BinderConfig;
pub use error::{BindError, BindResult, ErrorKind};

/// Returns the library version as encoded at compile time.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
