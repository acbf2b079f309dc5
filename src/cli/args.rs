use std::path::PathBuf;

use clap::Parser;

use crate::Commands;

/// Top-level arguments of the notes-service binary
#[derive(Parser, Debug)]
#[clap(
    name = "notes-service",
    version,
    about = "In-memory notes and comments service driven by a command script"
)]
pub struct Cli {
    /// Path to the configuration file
    #[clap(short = 'c', long, value_parser)]
    pub config: Option<PathBuf>,

    /// Verbose output mode
    #[clap(short, long)]
    pub verbose: bool,

    /// Print results as JSON
    #[clap(short, long)]
    pub json: bool,

    /// Write a default configuration file and exit
    #[clap(long)]
    pub init_config: bool,

    /// Script with one command per line; stdin when omitted
    #[clap(value_parser)]
    pub script: Option<PathBuf>,
}

/// One line of a script, parsed without a binary name
#[derive(Parser, Debug)]
#[clap(no_binary_name = true, name = "notes")]
pub struct ShellLine {
    #[clap(subcommand)]
    pub command: Commands,
}
