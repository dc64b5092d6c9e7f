//! dmarcwatch - DMARC checker and registry CLI
//!
//! Checks domains' DMARC records and keeps a registry of the ones that fail.

use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    dmarcwatch_cli::run().await
}
