//! Command-line driver: argument parsing and the script runner.
mod app;
mod args;

pub use app::*;
pub use args::*;
