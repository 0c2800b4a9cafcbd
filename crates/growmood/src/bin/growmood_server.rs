//! Grow Mood REST Server
//!
//! HTTP REST API server answering mood-based food recommendation requests.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{filter::EnvFilter, fmt, prelude::*};

use growmood::config::{Config, ServerArgs};
use growmood::server::start_server;

#[tokio::main]
async fn main() -> Result<()> {
  let args = ServerArgs::parse();

  let filter = if args.verbose {
    EnvFilter::new("growmood=debug,tower_http=debug,info")
  } else {
    EnvFilter::new("growmood=info,tower_http=info,warn")
  };

  tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

  tracing::info!("Starting Grow Mood REST Server v{}", env!("CARGO_PKG_VERSION"));

  let config = Config::from_args(args)?;
  start_server(config).await?;

  Ok(())
}
