mod cli;
mod config;
mod discord;
mod error;
mod news;
mod retry;
mod youtube;

use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command};
use config::Config;
use discord::Notifier;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env();

    match cli.command {
        Command::News => {
            let notifier = Notifier::new(config.discord_webhook_url);
            news::run(&notifier).await;
            ExitCode::SUCCESS
        }
        Command::Notify { message } => {
            let notifier = Notifier::new(config.discord_webhook_url);
            notifier.send(&message).await;
            ExitCode::SUCCESS
        }
        Command::Upload(args) => match youtube::upload(args.into(), &config).await {
            Ok(video_id) => {
                info!("Upload completed successfully. Video ID: {video_id}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                error!("{e}");
                ExitCode::FAILURE
            }
        },
    }
}
