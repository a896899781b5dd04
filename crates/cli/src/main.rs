use anyhow::{Context as AnyhowContext, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use config::DocqaConfig;
use docqa_indexer::CorpusIndexer;
use docqa_search::{
    ChatMessage, IndexHandle, IntakeService, PromptTemplate, QaRequest, QaService, UserProfile,
    DEFAULT_COLLECT_PROMPT,
};
use docqa_vector_store::{EmbeddingProvider, VectorIndex, VectorStoreError};
use std::path::{Path, PathBuf};
use std::sync::Arc;

mod config;
mod http_api;
mod providers;
mod server_security;

#[derive(Parser)]
#[command(name = "docqa")]
#[command(about = "Build a document index and answer questions over it", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only warnings/errors
    #[arg(long, global = true)]
    quiet: bool,

    /// Override embedding backend in this process
    #[arg(long, global = true, value_enum)]
    embed_mode: Option<EmbedMode>,

    /// Index file (overrides INDEX_PATH)
    #[arg(long, global = true)]
    index: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the index from a directory of documents
    Index(IndexArgs),

    /// Retrieve the chunks most similar to a query
    Search(SearchArgs),

    /// Answer a question from retrieved context
    Ask(AskArgs),

    /// Serve the QA API over HTTP
    Serve(ServeArgs),
}

#[derive(Args)]
struct IndexArgs {
    /// Document directory (overrides DATA_DIR)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Characters per chunk
    #[arg(long)]
    chunk_size: Option<usize>,

    /// Characters shared by consecutive chunks
    #[arg(long)]
    overlap: Option<usize>,

    /// Output JSON format
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct SearchArgs {
    /// Query text
    query: String,

    /// Number of results
    #[arg(short = 'k', long)]
    top_k: Option<usize>,

    /// Output JSON format
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct AskArgs {
    /// Question text
    question: String,

    /// Number of context chunks
    #[arg(short = 'k', long)]
    top_k: Option<usize>,

    /// User profile as a JSON object
    #[arg(long)]
    profile: Option<String>,

    /// Output JSON format
    #[arg(long)]
    json: bool,
}

#[derive(Args)]
struct ServeArgs {
    /// Bind address, e.g. 127.0.0.1:8000
    #[arg(long)]
    bind: Option<String>,
}

#[derive(Copy, Clone, ValueEnum)]
enum EmbedMode {
    Remote,
    Stub,
}

impl EmbedMode {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Remote => "remote",
            Self::Stub => "stub",
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut cli = Cli::parse();

    // Keep stdout clean for JSON parsing
    let json_output = match &cli.command {
        Commands::Index(args) => args.json,
        Commands::Search(args) => args.json,
        Commands::Ask(args) => args.json,
        Commands::Serve(_) => false,
    };
    if json_output {
        cli.quiet = true;
    }

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Warn);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let mut config = DocqaConfig::load(cli.config.as_deref())?;
    if let Some(mode) = cli.embed_mode {
        config.embedding.mode = mode.as_str().to_string();
    }
    if let Some(index) = cli.index {
        config.index_path = index;
    }

    match cli.command {
        Commands::Index(args) => run_index(args, config).await?,
        Commands::Search(args) => run_search(args, config).await?,
        Commands::Ask(args) => run_ask(args, config).await?,
        Commands::Serve(args) => run_serve(args, config).await?,
    }

    Ok(())
}

async fn run_index(args: IndexArgs, mut config: DocqaConfig) -> Result<()> {
    if let Some(dir) = args.data_dir {
        config.data_dir = dir;
    }
    if let Some(size) = args.chunk_size {
        config.chunking.target_size = size;
    }
    if let Some(overlap) = args.overlap {
        config.chunking.overlap = overlap;
    }
    config.validate()?;

    let (embedder, _) = providers::embedder(&config)?;
    let indexer = CorpusIndexer::new(config.indexer_config())
        .with_context(|| format!("Cannot index {}", config.data_dir.display()))?;
    let stats = indexer
        .index(embedder.as_ref())
        .await
        .context("Indexing failed")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        println!(
            "Indexed {} documents into {} chunks in {} ms -> {}",
            stats.documents,
            stats.chunks,
            stats.time_ms,
            config.index_path.display()
        );
        for error in &stats.errors {
            eprintln!("skipped: {error}");
        }
    }
    Ok(())
}

async fn load_index(path: &Path, expected_dimension: Option<usize>) -> Result<VectorIndex> {
    let loaded = match expected_dimension {
        Some(dimension) => VectorIndex::load_expecting(path, dimension).await,
        None => VectorIndex::load(path).await,
    };
    match loaded {
        Ok(index) => Ok(index),
        Err(err @ VectorStoreError::NotFound(_)) => {
            Err(err).context("No index yet; run `docqa index` first")
        }
        Err(err) => Err(err).with_context(|| format!("Failed to load {}", path.display())),
    }
}

fn service(config: &DocqaConfig, providers: providers::Providers, index: IndexHandle) -> QaService {
    QaService::new(
        index,
        providers.embedder,
        providers.chat,
        PromptTemplate::from_file_or_default(&config.prompt_path),
    )
}

async fn run_search(args: SearchArgs, mut config: DocqaConfig) -> Result<()> {
    if let Some(k) = args.top_k {
        config.retrieval.top_k = k;
    }
    config.validate()?;

    let (embedder, expected_dimension) = providers::embedder(&config)?;
    let index = load_index(&config.index_path, expected_dimension).await?;
    let query = embedder.embed_one(&args.query).await?;
    let results = docqa_vector_store::search_raw(&index, &query, config.retrieval.top_k)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else if results.is_empty() {
        println!("No results (index is empty)");
    } else {
        println!("{}", docqa_search::format_context(&results));
    }
    Ok(())
}

async fn run_ask(args: AskArgs, mut config: DocqaConfig) -> Result<()> {
    if let Some(k) = args.top_k {
        config.retrieval.top_k = k;
    }
    config.validate()?;

    let user = args
        .profile
        .as_deref()
        .map(serde_json::from_str::<UserProfile>)
        .transpose()
        .context("--profile must be a JSON object")?;

    let providers = providers::resolve(&config)?;
    let index = load_index(&config.index_path, providers.expected_dimension).await?;
    let qa = service(&config, providers, IndexHandle::new(index));

    let request = QaRequest {
        history: vec![ChatMessage::user(args.question)],
        user,
        top_k: i64::try_from(config.retrieval.top_k).unwrap_or(i64::MAX),
    };
    let response = qa.answer(&request).await?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        println!("{}", response.reply);
        if !response.sources.is_empty() {
            println!();
            println!("Sources:");
            for (idx, source) in response.sources.iter().enumerate() {
                println!(
                    "  [{}] {} #{} (score={:.3})",
                    idx + 1,
                    source.source,
                    source.chunk_id,
                    source.score
                );
            }
        }
    }
    Ok(())
}

async fn run_serve(args: ServeArgs, mut config: DocqaConfig) -> Result<()> {
    if let Some(bind) = args.bind {
        config.server.bind = bind;
    }
    config.validate()?;

    let api_key = server_security::ApiKey::parse(config.server.api_key.as_deref())?;
    if api_key.is_none() {
        log::warn!("No API key configured; /qa and /reload accept unauthenticated requests");
    }

    let cors = server_security::cors_layer(&config.server.cors_origins)?;
    let providers = providers::resolve(&config)?;
    let expected_dimension = providers.expected_dimension;
    let intake = IntakeService::new(
        providers.intake_chat.clone(),
        PromptTemplate::from_file_or(&config.collect_prompt_path, DEFAULT_COLLECT_PROMPT),
    )?;
    let handle = IndexHandle::unloaded();
    if let Err(err) = handle.reload(&config.index_path, expected_dimension).await {
        log::warn!("Starting without an index: {err}");
    }

    let state = Arc::new(http_api::HttpState {
        qa: service(&config, providers, handle),
        intake,
        index_path: config.index_path.clone(),
        expected_dimension,
        api_key,
        cors,
    });

    let listener = tokio::net::TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind))?;
    println!("Serving QA API on http://{}", listener.local_addr()?);
    axum::serve(listener, http_api::router(state)).await?;
    Ok(())
}
