mod app;

use std::{
    fs::{self, OpenOptions},
    path::PathBuf,
};

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{prelude::*, EnvFilter};
use trivia_core::{
    config::{self, AppConfig},
    repository::{QuestionRepository, QuestionSource},
};

/// Terminal trivia party game.
#[derive(Debug, Parser)]
#[command(name = "trivia", version, about)]
struct Cli {
    /// Configuration file to use instead of the default location.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Question dataset path or http(s) URL.
    #[arg(long, value_name = "SOURCE")]
    questions: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging()?;

    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => {
            config::ensure_default_config()?;
            AppConfig::load()?
        }
    };

    let repository = QuestionRepository::from_config(&config);
    if let Some(source) = cli.questions.as_deref() {
        repository.set_source(QuestionSource::parse(source));
    }
    info!(source = %repository.source(), winning_score = config.winning_score, "Starting trivia");

    let mut app = app::TriviaApp::new(repository, &config);
    app.run().await
}

fn init_logging() -> Result<()> {
    let log_dir = std::env::current_dir()?.join("logs");
    fs::create_dir_all(&log_dir)
        .with_context(|| format!("failed to create {}", log_dir.display()))?;
    let log_path = log_dir.join("trivia.log");
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("failed to open {}", log_path.display()))?;

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // Only a file layer: stdout belongs to the terminal UI.
    let file_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_ansi(false)
        .compact()
        .with_writer(std::sync::Mutex::new(log_file));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .init();

    Ok(())
}
