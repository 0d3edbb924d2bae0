use notepad_sync::config::EditorConfig;
use notepad_sync::server::serve;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // stdout carries the protocol
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = EditorConfig::load_or_default(config_path.as_deref()).await;

    serve(tokio::io::stdin(), tokio::io::stdout(), config).await;
}
