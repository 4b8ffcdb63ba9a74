use std::{path::PathBuf, sync::Arc};

use anyhow::Result;
use clap::Parser;
use engine::Engine;
use server::{config::DEFAULT_CONFIG_PATH, load_settings_from};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod pages;

#[derive(Parser, Debug)]
struct Args {
    /// Overrides the configured bind address.
    #[arg(long)]
    bind: Option<String>,
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let mut settings = load_settings_from(&args.config, |key| std::env::var(key).ok());
    if let Some(bind) = args.bind {
        settings.server_bind = bind;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.log_filter.as_str()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let engine = Arc::new(Engine::new(pages::registry()));
    info!(pages = ?engine.pages().paths().collect::<Vec<_>>(), "pages registered");
    server::serve(engine, settings).await
}
