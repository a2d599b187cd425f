use eyre::Context;
use std::io::IsTerminal;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;
use youtube_notion_sync::notion_api::NotionClient;
use youtube_notion_sync::youtube_api::YouTubeClient;
use youtube_notion_sync::{Config, SyncOrchestrator};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with_ansi(std::io::stdout().is_terminal())
        .init();

    let config = Config::from_env().context("load configuration")?;
    tracing::debug!(?config, "loaded configuration");

    let http = config.http_client()?;
    let sync = SyncOrchestrator::new(
        YouTubeClient::new(config.youtube_api_key.clone(), http.clone()),
        NotionClient::new(config.notion_api_key.clone(), http),
        config.sync_settings(),
    );

    let summary = sync.run().await.context("sync videos")?;
    for error in &summary.errors {
        eprintln!("failed: {error}");
    }
    println!("{summary}");

    if !summary.errors.is_empty() {
        eyre::bail!("{} videos failed to sync", summary.errors.len());
    }
    Ok(())
}
