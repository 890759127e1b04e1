use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use webserver::app::ApplicationServer;
use webserver::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::parse();

    config.log.init().context("Failed to initialize logger")?;

    ApplicationServer::serve(Arc::new(config)).await
}
