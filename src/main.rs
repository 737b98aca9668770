//! pair-relay binary entry point.
//!
//! Usage:
//! ```bash
//! pair-relay --config relay.toml
//! RUST_LOG=debug pair-relay
//! ```

use anyhow::Context;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    pair_relay::server::run(&get_config_path())
        .await
        .context("pair-relay exited with an error")
}

fn get_config_path() -> PathBuf {
    std::env::args()
        .skip_while(|arg| arg != "--config")
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("relay.toml"))
}
