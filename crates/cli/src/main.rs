//! `lexrag`: build and query a hierarchical legal-document retrieval
//! index from the command line.

mod config;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use config::CliConfig;
use lexrag_indexer::{BuildStatus, CorpusIndexer, IndexSet};
use lexrag_search::{FolderOverview, QueryEngine, SearchFilters, SearchResponse};
use lexrag_vector_store::{Embedder, HashingEmbedder};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(
    name = "lexrag",
    version,
    about = "Hierarchical retrieval over a legal document corpus"
)]
struct Cli {
    /// TOML config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Corpus root directory (overrides the config file).
    #[arg(long, global = true)]
    corpus: Option<PathBuf>,

    /// Index snapshot directory (overrides the config file).
    #[arg(long, global = true)]
    snapshots: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Build the folder and chunk indices from the corpus.
    Index {
        /// Rebuild even when snapshots already hold data.
        #[arg(long)]
        force: bool,
    },
    /// Search the corpus for relevant chunks.
    Search {
        query: String,

        /// Number of results to return.
        #[arg(long)]
        top_k: Option<usize>,

        /// Restrict results to one legal category.
        #[arg(long)]
        category: Option<String>,

        /// Emit the raw response as JSON.
        #[arg(long)]
        json: bool,
    },
    /// Assemble a bounded context for answering a question.
    Ask {
        question: String,

        /// Context budget in characters.
        #[arg(long)]
        budget: Option<usize>,

        #[arg(long)]
        json: bool,
    },
    /// Show a folder's metadata and sample chunks.
    Overview {
        /// Folder id or folder name.
        folder: String,

        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let mut config = CliConfig::load(cli.config.as_deref())?;
    if let Some(corpus) = cli.corpus {
        config.corpus_dir = corpus;
    }
    if let Some(snapshots) = cli.snapshots {
        config.snapshot_dir = Some(snapshots);
    }

    match cli.command {
        Command::Index { force } => index(&config, force).await,
        Command::Search {
            query,
            top_k,
            category,
            json,
        } => search(&config, &query, top_k, category, json).await,
        Command::Ask {
            question,
            budget,
            json,
        } => ask(&config, &question, budget, json).await,
        Command::Overview { folder, json } => overview(&config, &folder, json).await,
    }
}

async fn open_indexer(config: &CliConfig) -> Result<CorpusIndexer> {
    let indices = IndexSet::open(config.snapshot_dir())
        .await
        .with_context(|| format!("opening snapshots in {}", config.snapshot_dir().display()))?;
    let embedder: Arc<dyn Embedder> = Arc::new(HashingEmbedder::default());
    let mut indexer = CorpusIndexer::new(config.corpus_dir.clone(), indices, embedder)
        .with_context(|| format!("opening corpus {}", config.corpus_dir.display()))?
        .with_snapshot_dir(config.snapshot_dir());
    indexer.warm_cache();
    Ok(indexer)
}

async fn index(config: &CliConfig, force: bool) -> Result<()> {
    let mut indexer = open_indexer(config).await?;
    let report = indexer.build_index(force).await?;
    match report.status {
        BuildStatus::LoadedExisting => println!(
            "Index up to date: {} folders, {} chunks (use --force to rebuild)",
            report.folders_indexed, report.chunks_indexed
        ),
        BuildStatus::NewlyBuilt => println!(
            "Indexed {} folders, {} chunks",
            report.folders_indexed, report.chunks_indexed
        ),
    }
    Ok(())
}

/// Open the query engine, building the index first if the snapshots are
/// empty.
async fn open_engine(config: &CliConfig) -> Result<QueryEngine> {
    let mut indexer = open_indexer(config).await?;
    if !indexer.has_existing_data() {
        log::info!("No snapshots found, building index first");
        indexer.build_index(false).await?;
    }
    let (indices, folders, embedder) = indexer.into_parts();
    Ok(QueryEngine::new(indices, folders, embedder))
}

async fn search(
    config: &CliConfig,
    query: &str,
    top_k: Option<usize>,
    category: Option<String>,
    json: bool,
) -> Result<()> {
    let engine = open_engine(config).await?;
    let filters = SearchFilters {
        folder_ids: None,
        legal_category: category,
    };
    let response = engine
        .search(query, top_k.unwrap_or(config.top_k), &filters)
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        print_search(&response);
    }
    Ok(())
}

fn print_search(response: &SearchResponse) {
    if response.hits.is_empty() {
        println!("No results for '{}'", response.query);
        return;
    }
    for (rank, hit) in response.hits.iter().enumerate() {
        println!(
            "{}. [{:.3}] {}/{} (chunk {})",
            rank + 1,
            hit.relevance_score,
            hit.source.folder,
            hit.source.file,
            hit.source.chunk_position
        );
        if let Some(folder) = &hit.folder_context {
            println!("   {} - {}", folder.legal_domain, folder.description);
        }
        println!("   {}", preview(&hit.content, 200));
    }
}

async fn ask(
    config: &CliConfig,
    question: &str,
    budget: Option<usize>,
    json: bool,
) -> Result<()> {
    let engine = open_engine(config).await?;
    let context = engine
        .answer_context(question, budget.or(Some(config.context_budget)))
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&context)?);
        return Ok(());
    }

    if context.blocks.is_empty() {
        println!("No context found for '{question}'");
        return Ok(());
    }
    for block in &context.blocks {
        println!("--- {} [{:.3}]", block.source, block.relevance);
        println!("{}", block.text.trim());
        println!();
    }
    println!(
        "{} of {} chunks, {} chars, sources: {}",
        context.results_used,
        context.results_considered,
        context.total_length,
        context.sources.join(", ")
    );
    Ok(())
}

async fn overview(config: &CliConfig, folder: &str, json: bool) -> Result<()> {
    let engine = open_engine(config).await?;

    // Accept either the folder id or the human-readable folder name.
    let folder_id = engine
        .retriever()
        .folder_store()
        .iter()
        .find(|f| f.folder_id == folder || f.folder_name == folder)
        .map(|f| f.folder_id.clone());
    let overview = match folder_id {
        Some(id) => engine.folder_overview(&id)?,
        None => None,
    };
    let Some(overview) = overview else {
        anyhow::bail!("no indexed folder named '{folder}'");
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&overview)?);
    } else {
        print_overview(&overview);
    }
    Ok(())
}

fn print_overview(overview: &FolderOverview) {
    let folder = &overview.folder;
    println!("{} ({})", folder.folder_name, folder.legal_domain);
    println!("  {}", folder.description);
    println!("  keywords: {}", folder.keywords.join(", "));
    println!(
        "  {} documents, last updated {}",
        folder.total_documents, folder.last_updated
    );
    println!("  sample chunks ({}):", overview.sampled);
    for chunk in &overview.samples {
        println!("    {} - {}", chunk.source(), preview(&chunk.text, 120));
    }
}

fn preview(text: &str, max_chars: usize) -> String {
    let flattened: String = text
        .chars()
        .map(|c| if c == '\n' { ' ' } else { c })
        .collect();
    if flattened.chars().count() <= max_chars {
        return flattened;
    }
    let cut: String = flattened.chars().take(max_chars).collect();
    format!("{cut}…")
}
