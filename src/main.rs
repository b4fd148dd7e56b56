use anyhow::Result;
use covidscraper::{config::DEFAULT_CONFIG_FILE, pipeline, Config};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // ─── 1) init logging ─────────────────────────────────────────────
    let env = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt::Subscriber::builder()
        .with_env_filter(env)
        .with_span_events(fmt::format::FmtSpan::CLOSE)
        .init();
    info!("startup");

    // ─── 2) load config ──────────────────────────────────────────────
    let config = Config::load_or_default(DEFAULT_CONFIG_FILE)?;

    // ─── 3) fetch, reconcile, write ──────────────────────────────────
    let path = pipeline::run(&config).await?;

    info!(path = %path.display(), "all done");
    Ok(())
}
