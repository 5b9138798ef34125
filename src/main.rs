use anyhow::{Context, Result};
use tracing::info;

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    info!("ataxx engine starting");
    ataxx_uai::UaiEngine::new().run().context("UAI event loop failed")?;
    Ok(())
}
