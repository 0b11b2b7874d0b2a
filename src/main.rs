mod app;
mod chart;
mod config;
mod directory;
mod errors;
mod feed;
mod input;
mod models;
mod orderbook;
mod tui;
mod view;

use app::AppRuntime;
use config::{Config, LogFormat};
use directory::HttpDirectory;
use std::fs::File;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // The dashboard owns stdout; logs go to LOG_FILE or stderr
    let writer = match &config.log_file {
        Some(path) => BoxMakeWriter::new(Mutex::new(File::options().create(true).append(true).open(path)?)),
        None => BoxMakeWriter::new(std::io::stderr),
    };
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_ansi(config.log_file.is_none())
        .with_writer(writer);
    match config.log_format {
        LogFormat::Json => subscriber.json().init(),
        LogFormat::Text => subscriber.init(),
    }

    tracing::info!(
        "spreadwatch starting: server {} feed {} pair {} mode {}",
        config.server_url,
        config.feed_url,
        config.symbol,
        config.mode
    );

    let directory = Arc::new(HttpDirectory::new(config.server_url.clone()));
    let runtime = AppRuntime::new(&config, directory);

    let terminal = tui::enter()?;
    let renderer = tui::spawn_renderer(terminal, runtime.frames());

    let (command_tx, command_rx) = mpsc::channel(64);
    input::spawn_key_reader(command_tx);

    let state = runtime.run(command_rx).await;
    let rendered = renderer.await;
    tui::restore()?;
    rendered?;

    tracing::info!(
        "stopped on {} ({}), {} chart points",
        state.selection.symbol,
        state.selection.mode,
        state.chart.len()
    );

    Ok(())
}
