use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use themis::agents::llm::create_provider;
use themis::cli::Cli;
use themis::config::Settings;
use tokio::sync::RwLock;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let mut settings = Settings::from_file(&cli.config.to_string_lossy())?;
    settings.apply_cli(&cli);

    let host = settings.server.host.clone();
    let port = settings.server.port;

    info!("Starting Themis HR assistant server on {}:{}", host, port);

    let llm = match create_provider(&settings.llm) {
        Ok(provider) => {
            info!(model = provider.model(), "Generation backend configured");
            Some(provider)
        }
        Err(e) => {
            warn!("No generation backend available: {}", e);
            None
        }
    };

    let settings = Arc::new(RwLock::new(settings));
    let app = themis::create_app(settings, llm).await;

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
