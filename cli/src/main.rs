//! Leakgraph CLI: command-line interface for the leakgraph retrieval engine
//!
//! Loads a dataset directory, builds the graph and answers queries locally.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use comfy_table::{ContentArrangement, Table};
use leakgraph::graph::GraphStatistics;
use leakgraph::{
    format_context, BuildReport, Config, DatasetLoader, GraphBuilder, HybridRetriever, LoadLimits,
};
use leakgraph::loader::LoadReport;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "leakgraph", version, about = "Graph-augmented retrieval over offshore-leaks data")]
struct Cli {
    /// YAML configuration file
    #[arg(long, global = true, env = "LEAKGRAPH_CONFIG")]
    config: Option<PathBuf>,

    /// Dataset directory (overrides the config file)
    #[arg(long, global = true, env = "LEAKGRAPH_DATA")]
    data_dir: Option<PathBuf>,

    /// Load every row of every category
    #[arg(long, global = true)]
    unlimited: bool,

    /// Maximum entities to load
    #[arg(long, global = true)]
    entity_limit: Option<usize>,

    /// Maximum officers to load
    #[arg(long, global = true)]
    officer_limit: Option<usize>,

    /// Maximum addresses to load
    #[arg(long, global = true)]
    address_limit: Option<usize>,

    /// Maximum relationships to load
    #[arg(long, global = true)]
    relationship_limit: Option<usize>,

    /// Output format
    #[arg(long, default_value = "table", global = true)]
    format: OutputFormat,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, clap::ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Show dataset and graph statistics
    Stats,
    /// Report graph and index readiness
    Health {
        /// Build the document index before reporting
        #[arg(long)]
        build: bool,
    },
    /// Run a hybrid retrieval query
    Query {
        /// Natural-language query
        text: String,

        /// Number of results
        #[arg(short, long)]
        k: Option<usize>,

        /// Print the language-model context block instead of a table
        #[arg(long)]
        context: bool,
    },
    /// List synthesized documents
    Documents {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
}

/// Everything built at startup
struct Session {
    retriever: HybridRetriever,
    load_report: LoadReport,
    build_report: BuildReport,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = resolve_config(&cli)?;
    let session = open_session(&config)?;

    match cli.command {
        Commands::Stats => run_stats(&session, &cli.format).await,
        Commands::Health { build } => run_health(&session, build, &cli.format).await,
        Commands::Query { text, k, context } => {
            let k = k.unwrap_or(config.retrieval.default_k);
            run_query(&session, &text, k, context, &cli.format).await
        }
        Commands::Documents { limit } => run_documents(&session, limit, &cli.format).await,
    }
}

fn resolve_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::load(path).with_context(|| format!("loading {}", path.display()))?,
        None => Config::default(),
    };

    if let Some(dir) = &cli.data_dir {
        config.dataset.path = dir.clone();
    }
    if cli.unlimited {
        config.limits = LoadLimits::unlimited();
    }
    if let Some(n) = cli.entity_limit {
        config.limits.entities = Some(n);
    }
    if let Some(n) = cli.officer_limit {
        config.limits.officers = Some(n);
    }
    if let Some(n) = cli.address_limit {
        config.limits.addresses = Some(n);
    }
    if let Some(n) = cli.relationship_limit {
        config.limits.relationships = Some(n);
    }
    Ok(config)
}

fn open_session(config: &Config) -> Result<Session> {
    let loader = DatasetLoader::open(&config.dataset.path)?;
    let dataset = loader.load_all(&config.limits);
    let (graph, build_report) = GraphBuilder::new().build(&dataset);
    info!("Session ready for {}", loader.data_dir().display());

    let retriever = HybridRetriever::from_config(graph, config)?;
    Ok(Session {
        retriever,
        load_report: dataset.report,
        build_report,
    })
}

async fn run_stats(session: &Session, format: &OutputFormat) -> Result<()> {
    let stats = session.retriever.statistics().await;

    match format {
        OutputFormat::Json => {
            let body = serde_json::json!({
                "load": session.load_report,
                "build": session.build_report,
                "graph": stats,
            });
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
        OutputFormat::Table => {
            let mut totals = new_table(&["Metric", "Count"]);
            let build = &session.build_report;
            for (name, value) in [
                ("Nodes", stats.total_nodes),
                ("Edges", stats.total_edges),
                ("Entities", stats.total_entities),
                ("Officers", stats.total_officers),
                ("Addresses", stats.total_addresses),
                ("Dropped relationships", build.dropped_relationships),
                ("Duplicate nodes", build.duplicate_nodes),
            ] {
                totals.add_row(vec![name.to_string(), value.to_string()]);
            }
            println!("{}", totals);

            print_ranking("Jurisdiction", &stats.entities_by_jurisdiction);
            print_ranking("Company type", &stats.entities_by_type);
            print_ranking("Source", &stats.entities_by_source);
            print_ranking("Officer country", &stats.officers_by_country);
            print_ranking("Officer role", &stats.officers_by_role);
        }
    }

    Ok(())
}

fn print_ranking(label: &str, counts: &BTreeMap<String, usize>) {
    if counts.is_empty() {
        return;
    }
    let mut table = new_table(&[label, "Count"]);
    for (key, count) in GraphStatistics::top(counts, 10) {
        table.add_row(vec![key.to_string(), count.to_string()]);
    }
    println!("{}", table);
}

async fn run_health(session: &Session, build: bool, format: &OutputFormat) -> Result<()> {
    if build {
        session.retriever.rebuild_index().await?;
    }
    let health = session.retriever.health().await;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&health)?);
        }
        OutputFormat::Table => {
            println!("Status:            {:?}", health.status);
            println!("Graph nodes:       {}", health.graph_nodes);
            println!("Graph edges:       {}", health.graph_edges);
            println!("Entities:          {}", health.total_entities);
            println!("Officers:          {}", health.total_officers);
            println!("Indexed documents: {}", health.indexed_documents);
            println!("Index ready:       {}", health.index_ready);
            println!("Index stale:       {}", health.index_stale);
        }
    }

    Ok(())
}

async fn run_query(
    session: &Session,
    text: &str,
    k: usize,
    context: bool,
    format: &OutputFormat,
) -> Result<()> {
    let results = session.retriever.retrieve(text, k).await?;

    if context {
        print!("{}", format_context(&results));
        return Ok(());
    }

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&results)?);
        }
        OutputFormat::Table => {
            if results.is_empty() {
                println!("(no results)");
                return Ok(());
            }

            let mut table = new_table(&["#", "Type", "Title", "Score", "Degree", "Connected To"]);
            for (i, doc) in results.iter().enumerate() {
                table.add_row(vec![
                    (i + 1).to_string(),
                    doc.text("type").unwrap_or("-").to_string(),
                    doc.text("title").unwrap_or("-").to_string(),
                    format!("{:.3}", doc.score),
                    doc.integer("network_degree")
                        .map(|d| d.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                    doc.text("connected_to").unwrap_or("-").to_string(),
                ]);
            }
            println!("{}", table);
            println!("{} result(s)", results.len());
        }
    }

    Ok(())
}

async fn run_documents(session: &Session, limit: usize, format: &OutputFormat) -> Result<()> {
    let documents = session.retriever.documents(limit).await?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&documents)?);
        }
        OutputFormat::Table => {
            let mut table = new_table(&["Type", "Title", "Content"]);
            for doc in &documents {
                let first_line = doc.content.lines().next().unwrap_or_default();
                table.add_row(vec![
                    doc.text("type").unwrap_or("-").to_string(),
                    doc.title().unwrap_or("-").to_string(),
                    first_line.to_string(),
                ]);
            }
            println!("{}", table);
            println!("{} document(s)", documents.len());
        }
    }

    Ok(())
}

fn new_table(header: &[&str]) -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(header.to_vec());
    table
}
