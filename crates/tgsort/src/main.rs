// SPDX-FileCopyrightText: 2026 Tgsort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! tgsort - AI-assisted sorting of Telegram chats into folders.
//!
//! Binary entry point. `tgsort run` (the default) walks the operator
//! through classification, review, confirmation, and apply; `tgsort
//! status` reports on the committed draft and the operations journal.

use clap::{Parser, Subcommand};
use tgsort_config::TgsortConfig;

mod prompts;
mod status;
mod wizard;

/// tgsort - sort Telegram chats into folders with an AI classifier.
#[derive(Parser, Debug)]
#[command(name = "tgsort", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Run log verbosity when RUST_LOG is unset.
    #[arg(long, default_value = "info")]
    log_level: String,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the interactive classification wizard (default).
    Run,
    /// Show the committed classification and journal state.
    Status,
}

/// Run log file name under the configured logs directory.
const LOG_FILE: &str = "tgsort.log";

/// The wizard owns stdout, so the run log goes to a file; stderr is the
/// fallback when the logs directory cannot be opened.
fn init_tracing(config: &TgsortConfig, log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("tgsort={log_level},warn")));

    let logs_dir = config.logs_dir();
    let file = std::fs::create_dir_all(&logs_dir).and_then(|_| {
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(logs_dir.join(LOG_FILE))
    });

    match file {
        Ok(file) => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_ansi(false)
            .with_writer(std::sync::Mutex::new(file))
            .init(),
        Err(_) => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init(),
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match tgsort_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            tgsort_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    init_tracing(&config, &cli.log_level);

    let result = match cli.command {
        Some(Commands::Status) => status::run_status(&config),
        Some(Commands::Run) | None => wizard::run_wizard(&config).await,
    };

    if let Err(err) = result {
        eprintln!("tgsort: {err}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn binary_loads_config_defaults() {
        let config = tgsort_config::load_and_validate_str("")
            .expect("default config should be valid");
        assert_eq!(config.ai.batch_size, 200);
        assert_eq!(config.paths.logs_dir, "logs");
    }
}
