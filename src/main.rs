use clap::Parser;
use quake_feed_pipeline::{router, AppState, PipelineConfig};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "quake-feed", about = "USGS earthquake feed service")]
struct Args {
    /// Optional TOML config file; environment overrides apply on top of
    /// defaults when omitted
    #[arg(long, env = "QUAKE_CONFIG")]
    config: Option<std::path::PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let args = Args::parse();
    let config = match args.config {
        Some(path) => PipelineConfig::load(path)?,
        None => PipelineConfig::from_env()?,
    };

    let addr = format!("{}:{}", config.server.host, config.server.port)
        .parse::<std::net::SocketAddr>()?;
    let app = router::create_router(AppState::new(&config));

    info!(%addr, endpoint = %config.catalog.endpoint, "starting quake feed service");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
