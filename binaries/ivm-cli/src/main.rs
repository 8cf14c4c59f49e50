//! IVM CLI
//!
//! ```bash
//! ivm serve --bind 0.0.0.0:3000
//! ivm catalog --filter off-road --sort price
//! ivm generate --kind hero --wait
//! ivm poll --kind showcase <operation-id>
//! ivm text "Describe the G80" --type description
//! ivm check
//! ```

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use ivm_config::ShowroomConfig;
use ivm_core::{Catalog, CategoryFilter, SortOrder};
use ivm_vertex::{
    CachedAsset, PollDriver, PollSource, ServerPollSource, TextProxy, UpstreamClient, VideoKind,
};
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "ivm")]
#[command(about = "IVM showroom - catalog, video generation and server")]
#[command(version)]
struct Cli {
    /// Directory holding videos/ and storage/ (overrides config)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the showroom HTTP server
    Serve {
        /// Address to listen on
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// List catalog models
    Catalog {
        /// Category label or slug (all, luxury, off-road, crossover)
        #[arg(short, long, default_value = "all")]
        filter: CategoryFilter,

        /// default, price, popularity or newest
        #[arg(short, long, default_value = "default")]
        sort: SortOrder,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Ask a running server to generate a video
    Generate {
        /// showcase or hero
        #[arg(short, long, default_value = "showcase")]
        kind: VideoKind,

        /// Prompt override
        #[arg(short, long)]
        prompt: Option<String>,

        /// Poll until the video is ready
        #[arg(short, long)]
        wait: bool,

        /// Server base URL (defaults to the configured bind address)
        #[arg(long)]
        server: Option<String>,
    },

    /// Poll a pending operation once
    Poll {
        /// showcase or hero
        #[arg(short, long, default_value = "showcase")]
        kind: VideoKind,

        operation_id: String,

        #[arg(long)]
        server: Option<String>,
    },

    /// Generate text through the upstream text models
    Text {
        prompt: Option<String>,

        /// description or metadata
        #[arg(short = 't', long = "type")]
        content_type: Option<String>,
    },

    /// Show configuration, cached assets and probe the text upstream
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "ivm=warn,ivm_web=info,ivm_vertex=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let mut config = ShowroomConfig::load().context("loading configuration")?;
    if let Some(dir) = cli.data_dir {
        config.storage.data_dir = dir;
    }

    match cli.command {
        Commands::Serve { bind } => cmd_serve(config, bind).await,
        Commands::Catalog { filter, sort, json } => cmd_catalog(filter, sort, json),
        Commands::Generate {
            kind,
            prompt,
            wait,
            server,
        } => cmd_generate(&config, kind, prompt, wait, server).await,
        Commands::Poll {
            kind,
            operation_id,
            server,
        } => cmd_poll(&config, kind, &operation_id, server).await,
        Commands::Text {
            prompt,
            content_type,
        } => cmd_text(&config, prompt, content_type).await,
        Commands::Check => cmd_check(&config).await,
    }
}

fn server_url(config: &ShowroomConfig, server: Option<String>) -> String {
    server.unwrap_or_else(|| format!("http://{}", config.server.bind))
}

fn http_client(config: &ShowroomConfig) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(config.request_timeout())
        .build()
        .context("building HTTP client")
}

async fn cmd_serve(mut config: ShowroomConfig, bind: Option<String>) -> Result<()> {
    if let Some(bind) = bind {
        config.server.bind = bind;
    }
    if config.vertex.api_key.is_empty() {
        tracing::warn!("VERTEX_AI_API_KEY is not set; video generation will fall back to scripts");
    }
    let addr = config.server.bind.clone();
    let state = Arc::new(ivm_web::AppState::new(config).context("building HTTP client")?);

    ivm_web::routes::print_routes();
    println!("Server ready at http://{}", addr);
    println!();

    ivm_web::serve(state, &addr).await.context("server error")
}

fn cmd_catalog(filter: CategoryFilter, sort: SortOrder, json: bool) -> Result<()> {
    let models = Catalog::default().view(filter, sort);

    if json {
        println!("{}", serde_json::to_string_pretty(&models)?);
        return Ok(());
    }

    println!("{} ({}, sort: {})", filter.label(), models.len(), sort.as_str());
    println!();
    for model in models {
        println!("  {:<22} {:<14} {:>16}", model.name, model.category, model.price);
        println!("    {}", model.tagline);
        println!(
            "    {} | {} | {} | {} seats",
            model.specs.engine, model.specs.power, model.specs.transmission, model.specs.seats
        );
    }
    Ok(())
}

async fn cmd_generate(
    config: &ShowroomConfig,
    kind: VideoKind,
    prompt: Option<String>,
    wait: bool,
    server: Option<String>,
) -> Result<()> {
    let base = server_url(config, server);
    let http = http_client(config)?;
    let (generate_path, _) = kind.endpoints();

    println!("Requesting {} from {}", kind.label().to_lowercase(), base);

    let url = format!("{}{}", base.trim_end_matches('/'), generate_path);
    tracing::debug!("POST {}", url);
    let mut request = http.post(url);
    if let Some(prompt) = prompt {
        request = request.json(&serde_json::json!({ "prompt": prompt }));
    }
    let response = request.send().await.context("contacting server")?;
    let status = response.status();
    let body: Value = response.json().await.context("decoding server response")?;

    match body["status"].as_str() {
        Some("exists") | Some("completed") => {
            println!("Ready: {}", body["videoUrl"].as_str().unwrap_or_default());
            return Ok(());
        }
        Some("processing") => {}
        _ => {
            println!("{}", serde_json::to_string_pretty(&body)?);
            bail!("generation unavailable (HTTP {})", status);
        }
    }

    let Some(operation_id) = body["operationId"].as_str() else {
        bail!("server answered processing without an operation id");
    };
    println!("Operation: {}", operation_id);

    if !wait {
        println!("Run `ivm poll --kind {} {}` to check progress.", kind, operation_id);
        return Ok(());
    }

    let driver = PollDriver::from_config(&config.polling);
    let source = ServerPollSource::new(http, &base, kind);
    let url = driver
        .run(&source, operation_id, |attempt, max| {
            println!("  Generating video... ({}/{})", attempt, max);
        })
        .await?;

    println!("Ready: {}", url);
    Ok(())
}

async fn cmd_poll(
    config: &ShowroomConfig,
    kind: VideoKind,
    operation_id: &str,
    server: Option<String>,
) -> Result<()> {
    let base = server_url(config, server);
    let source = ServerPollSource::new(http_client(config)?, &base, kind);
    let response = source.poll(operation_id).await?;
    tracing::debug!(status = %response.status, retryable = response.retryable, "Poll response");

    match response.status.as_str() {
        "completed" => println!("Ready: {}", response.video_url.unwrap_or_default()),
        "processing" => println!(
            "{}",
            response.message.unwrap_or_else(|| "Still processing".to_string())
        ),
        _ => bail!(
            "{}",
            response
                .error
                .or(response.message)
                .unwrap_or_else(|| "Poll failed".to_string())
        ),
    }
    Ok(())
}

async fn cmd_text(
    config: &ShowroomConfig,
    prompt: Option<String>,
    content_type: Option<String>,
) -> Result<()> {
    let proxy = TextProxy::new(UpstreamClient::new(config)?);
    let content = proxy
        .generate(prompt.as_deref(), content_type.as_deref())
        .await?;
    println!("{}", content);
    Ok(())
}

async fn cmd_check(config: &ShowroomConfig) -> Result<()> {
    let configured = |key: &str| if key.is_empty() { "missing" } else { "set" };

    println!("Configuration");
    println!("  bind:          {}", config.server.bind);
    println!("  data dir:      {}", config.storage.data_dir.display());
    println!("  vertex key:    {}", configured(&config.vertex.api_key));
    println!("  gemini key:    {}", configured(&config.generative.api_key));
    println!("  project:       {}", config.vertex.project_id);
    println!("  region:        {}", config.vertex.region);
    println!("  video models:  {}", config.vertex.video_models.join(", "));
    println!();

    println!("Assets");
    let videos_dir = config.storage.videos_dir();
    for kind in VideoKind::ALL {
        let asset = CachedAsset::new(&videos_dir, kind);
        match asset.probe().await? {
            Some(info) => println!("  {:<10} {} ({} bytes)", kind, asset.public_url(), info.size),
            None => println!("  {:<10} not generated", kind),
        }
    }
    println!();

    let proxy = TextProxy::new(UpstreamClient::new(config)?);
    println!("Text upstream ({})", proxy.models().join(", "));
    println!("  {}", serde_json::to_string_pretty(&proxy.probe().await)?);
    Ok(())
}
