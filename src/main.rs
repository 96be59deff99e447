#![cfg(not(tarpaulin_include))]

use clap::Parser;
use sheetjump::app;
use sheetjump::config::Config;

/// Main entry point for the web application
///
/// Reads the configuration from the command line and environment, sets up
/// logging (`RUST_LOG`, default `info`) and serves until interrupted.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = Config::parse();
    log::info!(
        "Starting web server on {}:{} (session ttl {}s)",
        config.host,
        config.port,
        config.session_ttl_secs
    );

    app::run(config).await
}
