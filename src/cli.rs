//! CLI for the Waveshift bot
//!
//! Subcommands pick the transport variant:
//! - `poll`: long-poll Telegram for updates
//! - `webhook`: serve an HTTP endpoint Telegram pushes updates to

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::info;
use waveshift_channels::{TelegramAdapter, TelegramConfig, TransportMode};
use waveshift_core::{Converter, CoreConfig};

/// Waveshift audio conversion bot
#[derive(Parser, Debug)]
#[command(name = "waveshift")]
#[command(about = "Telegram bot that converts audio files between formats")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fetch updates by long polling
    Poll,
    /// Receive updates on a webhook endpoint
    Webhook,
}

/// Run the selected transport variant.
pub async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Some(Commands::Poll) => start(TransportMode::Polling).await,
        Some(Commands::Webhook) => start(TransportMode::Webhook).await,
        None => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            cmd.print_help()?;
            println!();
            Ok(())
        }
    }
}

async fn start(mode: TransportMode) -> Result<()> {
    info!("Starting Waveshift v{}", env!("CARGO_PKG_VERSION"));

    let core_config = CoreConfig::from_env().context("Invalid core configuration")?;
    let converter = Arc::new(Converter::new(core_config));

    let telegram_config = TelegramConfig::from_env()
        .context("Invalid Telegram configuration")?
        .with_mode(mode);
    let adapter = Arc::new(TelegramAdapter::new(telegram_config));

    match mode {
        TransportMode::Polling => adapter.run_polling(converter).await?,
        TransportMode::Webhook => adapter.run_webhook(converter).await?,
    }

    Ok(())
}
