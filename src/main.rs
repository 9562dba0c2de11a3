use ai_seo_rs::{
    config::AppConfig,
    content::{ContentStore, InMemoryContentStore},
    llm::LlmClient,
    logging::{init_logging, LogConfig},
    server::{self, handlers::AnalyzeRequest, AppState},
    SeoOptimizer,
};
use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "ai-seo", version, about = "AI-assisted SEO metadata optimizer")]
struct Cli {
    /// Path to config TOML file
    #[arg(long, global = true, env = "AI_SEO_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP API (default)
    Serve {
        /// Override the bind address, e.g. 0.0.0.0:8080
        #[arg(long)]
        bind: Option<String>,
    },
    /// Analyze one JSON request file and print the result
    Analyze {
        /// File with {"content", "seo"?, "aiSettings"?} as sent to /analyze
        #[arg(long, short)]
        input: PathBuf,
    },
    /// Write a sample configuration file
    InitConfig {
        #[arg(long, short, default_value = "ai-seo.toml.example")]
        output: PathBuf,
    },
}

fn build_optimizer(config: &AppConfig) -> Result<SeoOptimizer> {
    let client = LlmClient::new(config.llm.clone()).context("failed to create LLM client")?;
    Ok(SeoOptimizer::new(client, config.optimizer.clone()))
}

async fn build_store(config: &AppConfig) -> Result<InMemoryContentStore> {
    match &config.store.data_file {
        Some(path) => Ok(InMemoryContentStore::load_from_file(path, config.store.persist).await?),
        None => Ok(InMemoryContentStore::new()),
    }
}

async fn run_serve(mut config: AppConfig, bind: Option<String>) -> Result<()> {
    if let Some(bind) = bind {
        config.server.bind_addr = bind;
    }
    let addr = config.bind_socket_addr()?;

    let optimizer = build_optimizer(&config)?;
    let store = build_store(&config).await?;
    tracing::info!(
        provider = optimizer.provider_name(),
        model = %config.llm.default_model,
        records = store.len().await,
        "Starting ai-seo server"
    );

    let store: Arc<dyn ContentStore> = Arc::new(store);
    server::serve(addr, AppState::new(optimizer, store)).await?;
    Ok(())
}

async fn run_analyze(config: AppConfig, input: &Path) -> Result<()> {
    let text = tokio::fs::read_to_string(input)
        .await
        .with_context(|| format!("failed to read {}", input.display()))?;
    let request: AnalyzeRequest = serde_json::from_str(&text)
        .with_context(|| format!("invalid analyze request in {}", input.display()))?;

    let content = request
        .content
        .ok_or_else(|| anyhow!("Content is required"))?;
    let settings = request.ai_settings.unwrap_or_default();

    let optimizer = build_optimizer(&config)?;
    let analysis = optimizer
        .optimize(&content, request.seo.as_ref(), &settings)
        .await?;

    println!("{}", serde_json::to_string_pretty(&analysis)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(Command::InitConfig { output }) = &cli.command {
        AppConfig::generate_sample(output)?;
        println!("Sample configuration written to {}", output.display());
        return Ok(());
    }

    let config = AppConfig::load(cli.config.as_deref())?;
    let _guard = init_logging(&LogConfig::from_server_config(&config.server))?;

    match cli.command {
        Some(Command::Analyze { input }) => run_analyze(config, &input).await,
        Some(Command::Serve { bind }) => run_serve(config, bind).await,
        None => run_serve(config, None).await,
        Some(Command::InitConfig { .. }) => Ok(()),
    }
}
