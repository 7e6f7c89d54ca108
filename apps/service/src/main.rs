#![warn(clippy::all, clippy::pedantic)]

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod api;
mod config;
mod error;
mod helpers;
mod models;
mod monitoring;
mod notifier;
mod store;

use api::AppState;
use config::Config;
use monitoring::Engine;
use notifier::{Notifier, TwilioNotifier};
use store::{FileStore, Store};

#[derive(Debug, Parser)]
#[command(name = "upwatch", version, about = "Uptime monitoring service")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the configured API port
    #[arg(short, long)]
    port: Option<u16>,
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let config = Config::from_config(cli.config.as_deref())?;
    let port = cli.port.unwrap_or(config.server.port);
    info!("{config}");

    let store: Arc<dyn Store> = Arc::new(FileStore::new(config.storage.data_dir.clone()));
    let notifier: Arc<dyn Notifier> = Arc::new(TwilioNotifier::new(&config.twilio)?);

    // The engine runs autonomously on its own clock for the life of the
    // process; the first cycle fires immediately.
    let engine = Engine::new(
        store.clone(),
        notifier,
        config.monitoring.cycle_interval_seconds,
        config.monitoring.max_probe_timeout_seconds,
    )?;
    tokio::spawn(engine.run());

    let state = web::Data::new(AppState {
        store,
        hashing_secret: config.server.hashing_secret.clone(),
        max_checks: config.server.max_checks,
    });

    let addr: SocketAddr = format!("{}:{}", config.server.bind, port).parse()?;
    run_server(addr, state).await
}

async fn run_server(addr: SocketAddr, state: web::Data<AppState>) -> anyhow::Result<()> {
    info!(%addr, "http api listening");

    HttpServer::new(move || App::new().app_data(state.clone()).configure(api::routes))
        .bind(addr)?
        .run()
        .await?;

    Ok(())
}
