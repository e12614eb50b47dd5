use askschema::prelude::*;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SchemaSourceKind {
    /// Pre-fetched `columns-<dataset>.csv` files in the data directory
    Local,
    /// Honeycomb columns API
    Honeycomb,
}

/// Natural-language schema search
#[derive(Parser, Debug)]
#[command(name = "askschema")]
#[command(about = "Ask which columns of a dataset can answer your question", long_about = None)]
struct Args {
    /// Path to the data directory (column lists, embeddings, dataset list)
    #[arg(short, long, default_value = "./data")]
    data_dir: PathBuf,

    /// HTTP API port
    #[arg(long, default_value_t = 8080)]
    http_port: u16,

    /// Log level, or a full tracing filter directive
    #[arg(long, default_value = "info")]
    log_level: String,

    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    openai_api_key: String,

    #[arg(long, default_value = askschema_providers::openai::DEFAULT_BASE_URL)]
    openai_base_url: String,

    #[arg(long, default_value = askschema_providers::openai::DEFAULT_EMBEDDING_MODEL)]
    embedding_model: String,

    #[arg(long, default_value = askschema_providers::openai::DEFAULT_CHAT_MODEL)]
    chat_model: String,

    /// Enables the dataset list and the `honeycomb` schema source
    #[arg(long, env = "HNY_API_KEY", hide_env_values = true)]
    honeycomb_api_key: Option<String>,

    #[arg(long, default_value = askschema_providers::honeycomb::DEFAULT_BASE_URL)]
    honeycomb_base_url: String,

    /// Where column names come from on a cache miss
    #[arg(long, value_enum, default_value_t = SchemaSourceKind::Local)]
    schema_source: SchemaSourceKind,

    /// Number of ranked columns sent to the chat model
    #[arg(long, default_value_t = DEFAULT_TOP_K)]
    top_k: usize,

    /// Column scoring: `dot` or `cosine`
    #[arg(long, default_value = "dot")]
    similarity: Similarity,

    /// Timeout for each provider call, in seconds
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_new(&args.log_level).unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting askschema v{}", env!("CARGO_PKG_VERSION"));
    info!("Data directory: {:?}", args.data_dir);

    let timeout = Duration::from_secs(args.timeout_secs);
    let assistant = Arc::new(build_assistant(&args, timeout)?);
    info!(
        "Assistant ready: top_k={}, similarity={:?}, schema source={:?}",
        args.top_k, args.similarity, args.schema_source
    );

    let http_port = args.http_port;
    let http_handle = std::thread::spawn(move || {
        info!("Starting HTTP server on port {}", http_port);
        let sys = actix_web::rt::System::new();
        sys.block_on(async {
            if let Err(e) = RestApi::start(assistant, http_port).await {
                tracing::error!("HTTP server error: {}", e);
            }
        })
    });

    info!("HTTP API: http://localhost:{}/api/chat", http_port);

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Shutdown signal received");
        }
        _ = tokio::task::spawn_blocking(move || {
            http_handle.join().ok();
        }) => {
            info!("HTTP server stopped");
        }
    }

    info!("Shutting down...");
    Ok(())
}

fn build_assistant(args: &Args, timeout: Duration) -> anyhow::Result<Assistant> {
    let openai = Arc::new(OpenAiClient::new(OpenAiConfig {
        api_key: args.openai_api_key.clone(),
        base_url: args.openai_base_url.clone(),
        embedding_model: args.embedding_model.clone(),
        chat_model: args.chat_model.clone(),
        timeout,
    })?);

    let honeycomb = match &args.honeycomb_api_key {
        Some(key) => Some(Arc::new(HoneycombClient::new(
            key.clone(),
            &args.honeycomb_base_url,
            timeout,
        )?)),
        None => None,
    };

    let local = Arc::new(CsvSchemaSource::new(&args.data_dir));
    let schema: Arc<dyn SchemaSource> = match (args.schema_source, &honeycomb) {
        (SchemaSourceKind::Local, _) => local.clone(),
        (SchemaSourceKind::Honeycomb, Some(client)) => client.clone(),
        (SchemaSourceKind::Honeycomb, None) => {
            anyhow::bail!("--schema-source honeycomb requires --honeycomb-api-key or HNY_API_KEY")
        }
    };

    let catalog: Arc<dyn DatasetCatalog> = match honeycomb {
        Some(client) => Arc::new(CachedCatalog::new(client, DatasetListCache::new(&args.data_dir))),
        None => local,
    };

    let cache = Arc::new(FileCacheStore::new(&args.data_dir)?);
    let resolver = IndexResolver::with_timeout(cache, schema, openai.clone(), timeout);
    let config = AssistantConfig {
        top_k: args.top_k,
        similarity: args.similarity,
        embed_timeout: timeout,
        judge_timeout: timeout,
    };

    Ok(Assistant::new(resolver, openai.clone(), openai, config).with_catalog(catalog))
}
