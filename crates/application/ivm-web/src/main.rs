//! IVM Showroom server
//!
//! ```bash
//! ivm-web                        # bind from config (default 127.0.0.1:3000)
//! ivm-web --bind 0.0.0.0:8080
//! ivm-web --data-dir ./public
//! ```

use anyhow::Context;
use clap::Parser;
use ivm_config::ShowroomConfig;
use ivm_web::{routes, serve, AppState};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "ivm-web", version, about = "IVM showroom HTTP server")]
struct Args {
    /// Address to listen on (overrides config)
    #[arg(short, long)]
    bind: Option<String>,

    /// Directory holding videos/ and storage/ (overrides config)
    #[arg(short, long)]
    data_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ivm_web=info,ivm_vertex=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();

    let mut config = ShowroomConfig::load().context("loading configuration")?;
    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }
    if let Some(dir) = args.data_dir {
        config.storage.data_dir = dir;
    }
    if config.vertex.api_key.is_empty() {
        tracing::warn!("VERTEX_AI_API_KEY is not set; video generation will fall back to scripts");
    }

    let addr = config.server.bind.clone();
    let state = Arc::new(AppState::new(config).context("building HTTP client")?);

    routes::print_routes();
    println!("Server ready at http://{}", addr);
    println!();

    serve(state, &addr).await.context("server error")?;
    Ok(())
}
