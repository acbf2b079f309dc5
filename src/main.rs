use std::{
    fs::File,
    io::{self, BufReader},
    process::ExitCode,
};

use clap::Parser;
use log::{error, info};

use notes_service::{App, Cli, Config, NotesService, Result, SharedNotesService};

pub fn initialize_logger(level: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .format_module_path(true)
        .init();

    info!("Logger initialized");
}

fn run(cli: Cli, config: Config) -> Result<bool> {
    let service = SharedNotesService::new(NotesService::new());
    let app = App::new(service, config, cli.json);
    let stdout = io::stdout();

    let summary = match &cli.script {
        Some(path) => {
            info!("Running script {}", path.display());
            let file = File::open(path)?;
            app.run(BufReader::new(file), stdout.lock())?
        }
        None => app.run(io::stdin().lock(), stdout.lock())?,
    };

    Ok(summary.failed == 0)
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.init_config {
        return match Config::init(cli.config.as_deref()) {
            Ok(path) => {
                println!("Configuration written to {}", path.display());
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("error: {}", e);
                ExitCode::FAILURE
            }
        };
    }

    let config = match Config::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let level = if cli.verbose {
        "debug"
    } else {
        config.log_level.as_str()
    };
    initialize_logger(level);

    info!("Application starting up");
    let outcome = run(cli, config);
    info!("Application shutting down");

    match outcome {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("Fatal error: {}", e);
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
