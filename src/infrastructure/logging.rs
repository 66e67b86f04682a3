//! Logging initialization
//!
//! Console tracing with an env-controlled filter (`RUST_LOG`). Defaults to
//! `info` for the crate and `warn` elsewhere.

use anyhow::Result;
use tracing_subscriber::{fmt, EnvFilter};

pub fn init_logging() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,blu_storefront=info"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()
        .map_err(|cause| anyhow::anyhow!("failed to initialize logging: {cause}"))?;

    Ok(())
}
