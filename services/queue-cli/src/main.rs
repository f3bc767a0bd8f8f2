//! NeuVue queue command-line client
//!
//! Loads the queue config, resolves credentials, runs one command against
//! the queue and prints the JSON result on stdout. Logs go to stderr.

mod cli;
mod commands;
mod config;
mod error;

use anyhow::{Context, Result};
use clap::Parser;
use neuvue_queue::NeuvueQueue;
use queue_auth::StdinPrompt;
use tracing::info;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Command};
use crate::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // JSON logs on stderr with LOG_LEVEL / RUST_LOG support
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_env("LOG_LEVEL")
                .or_else(|_| EnvFilter::try_from_default_env())
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(std::io::stderr),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::load(&cli.config)
        .with_context(|| format!("failed to load config from {}", cli.config.display()))?;

    info!(
        url = %config.queue.url,
        local = config.queue.local,
        config = %cli.config.display(),
        "connecting to queue"
    );

    let auth = config.auth_options();
    let queue = if cli.command == Command::Login {
        NeuvueQueue::login(auth, &mut StdinPrompt).await.context("login failed")?
    } else {
        NeuvueQueue::connect(auth)
            .await
            .context("no usable credentials; run `neuvue-queue login`")?
    };

    let mut queue = queue
        .with_headers(&config.headers)
        .with_page_size(config.queue.page_size);

    let output = commands::run(&mut queue, cli.command).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
