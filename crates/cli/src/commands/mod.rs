pub mod bind;
pub mod config;

pub use bind::*;
pub use config::*;
