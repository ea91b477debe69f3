mod platform;

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use ragdesk_logging::LogDestination;

#[derive(Parser)]
#[command(
    name = "ragdesk",
    version,
    about = "Terminal client for a RAG document backend",
    long_about = "Upload documents for ingestion, follow their processing steps and\n\
                  ask questions about them from the terminal."
)]
struct Cli {
    /// Backend base URL
    #[arg(long, env = "RAGDESK_API_URL")]
    api_url: Option<String>,

    /// Retrieval mode sent with every question
    #[arg(long, env = "RAGDESK_MODE")]
    mode: Option<String>,

    /// Settings file; missing files are ignored
    #[arg(long, default_value = "ragdesk.ron")]
    config: PathBuf,

    /// Where log output goes
    #[arg(long, value_enum, default_value_t = LogTarget::File)]
    log: LogTarget,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogTarget {
    File,
    Terminal,
    Both,
}

impl From<LogTarget> for LogDestination {
    fn from(target: LogTarget) -> Self {
        match target {
            LogTarget::File => LogDestination::File,
            LogTarget::Terminal => LogDestination::Terminal,
            LogTarget::Both => LogDestination::Both,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    platform::logging::initialize(cli.log.into());

    let overrides = platform::config::Overrides {
        api_url: cli.api_url,
        mode: cli.mode,
    };
    let settings = platform::config::load_settings(&cli.config, &overrides);
    platform::app::run(settings).await
}
