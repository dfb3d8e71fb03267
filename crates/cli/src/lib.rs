pub mod config_report;
pub mod gemini;
pub mod repl;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use adpilot_api::{MockAdsApi, TikTokAdsClient};
use adpilot_core::config::{AppConfig, ConfigOverrides, LoadOptions};

#[derive(Debug, Parser)]
#[command(
    name = "adpilot",
    about = "Conversational TikTok ad campaign assistant",
    long_about = "Create TikTok ad campaigns through a guided chat: field collection, \
                  validation, music resolution, and submission.",
    after_help = "Examples:\n  adpilot\n  adpilot chat --mock\n  adpilot config"
)]
pub struct Cli {
    #[arg(
        long,
        global = true,
        value_name = "PATH",
        help = "Path to the config file (default: adpilot.toml)"
    )]
    config: Option<PathBuf>,
    #[arg(long, global = true, help = "Use the in-process mock ads backend regardless of config")]
    mock: bool,
    #[arg(
        long,
        global = true,
        value_name = "LEVEL",
        help = "Log level override (trace|debug|info|warn|error)"
    )]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Start the interactive campaign chat (default)")]
    Chat,
    #[command(
        about = "Inspect effective configuration values with source attribution and redaction"
    )]
    Config,
}

pub async fn run() -> ExitCode {
    let cli = Cli::parse();

    let options = LoadOptions {
        config_path: cli.config.clone(),
        require_file: cli.config.is_some(),
        overrides: ConfigOverrides {
            mock_mode: cli.mock.then_some(true),
            log_level: cli.log_level.clone(),
        },
    };
    let config = match AppConfig::load(options) {
        Ok(config) => config,
        Err(error) => {
            eprintln!("error: {error}");
            return ExitCode::FAILURE;
        }
    };

    match cli.command.unwrap_or(Command::Chat) {
        Command::Config => {
            println!("{}", config_report::render(&config, cli.config.as_deref()));
            ExitCode::SUCCESS
        }
        Command::Chat => match run_chat(config).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(error) => {
                eprintln!("error: {error:#}");
                ExitCode::FAILURE
            }
        },
    }
}

async fn run_chat(config: AppConfig) -> anyhow::Result<()> {
    init_logging(&config);
    config.validate_for_chat()?;

    let llm = gemini::GeminiClient::new(&config.llm)?;

    if config.tiktok.mock_mode {
        tracing::info!("using the in-process mock ads backend");
        repl::run(llm, MockAdsApi::new()).await
    } else {
        let client = TikTokAdsClient::new(&config.tiktok)?;
        match client.test_connection().await {
            Ok(message) => tracing::info!(%message, "ads backend reachable"),
            Err(error) => tracing::warn!(%error, "ads backend connection check failed"),
        }
        repl::run(llm, client).await
    }
}

fn init_logging(config: &AppConfig) {
    use adpilot_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}
