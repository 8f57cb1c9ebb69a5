mod client;

use anyhow::Result;
use std::env;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_SERVER_URL: &str = "http://localhost:5000";

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Get server URL from environment or use default
    let server_url = env::var("SERVER_URL").unwrap_or_else(|_| DEFAULT_SERVER_URL.to_string());
    let question = env::args().skip(1).collect::<Vec<_>>().join(" ");

    tracing::debug!("Server URL: {}", server_url);

    client::run(&server_url, &question).await
}
