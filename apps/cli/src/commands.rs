//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use tenderlens_core::{AskResult, ProgressReporter, ask};
use tenderlens_llm::GeminiClient;
use tenderlens_shared::{
    AppConfig, Category, DocumentPayload, DocumentSet, init_config, load_config, resolve_path,
    validate_api_key,
};
use tenderlens_storage::Storage;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// tenderlens — answer questions about tender document packages.
#[derive(Parser)]
#[command(
    name = "tenderlens",
    version,
    about = "Answer natural-language questions about stored tender documents.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Database file (overrides the configured path).
    #[arg(long, global = true)]
    pub db: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Ask a question about a stored tender.
    Ask {
        /// Tender identifier.
        tender_id: String,

        /// The question to answer.
        question: String,
    },

    /// Import extracted text files for a tender.
    Import {
        /// Tender identifier.
        tender_id: String,

        /// Text files to import (filename becomes the document name).
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// List stored tenders.
    List,

    /// Show how a tender's documents chunk and classify.
    Chunks {
        /// Tender identifier.
        tender_id: String,

        /// Emit the full chunking result as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "tenderlens=info",
        1 => "tenderlens=debug",
        _ => "tenderlens=trace",
    };

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt()
                .json()
                .with_env_filter(env_filter)
                .init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Ask {
            tender_id,
            question,
        } => cmd_ask(&tender_id, &question, cli.db.as_deref()).await,
        Command::Import { tender_id, files } => {
            cmd_import(&tender_id, &files, cli.db.as_deref()).await
        }
        Command::List => cmd_list(cli.db.as_deref()).await,
        Command::Chunks { tender_id, json } => {
            cmd_chunks(&tender_id, json, cli.db.as_deref()).await
        }
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

/// Resolve the database path from the CLI override or the config.
fn db_path(config: &AppConfig, db_override: Option<&str>) -> Result<PathBuf> {
    let configured = db_override.unwrap_or(&config.storage.db_path);
    resolve_path(configured).map_err(Into::into)
}

// ---------------------------------------------------------------------------
// ask
// ---------------------------------------------------------------------------

async fn cmd_ask(tender_id: &str, question: &str, db_override: Option<&str>) -> Result<()> {
    // Validate API key before doing anything
    let config = load_config()?;
    validate_api_key(&config)?;

    let storage = Storage::open(&db_path(&config, db_override)?).await?;
    let llm = GeminiClient::from_config(&config.gemini)?;

    info!(tender_id, "asking question");

    // Set up progress reporting
    let reporter = CliProgress::new();

    let result = ask(&storage, &llm, &config, tender_id, question, &reporter).await?;
    reporter.done(&result);

    println!();
    println!("{}", result.outcome.message(tender_id));
    println!();

    if result.cache_hit {
        info!("answer served from cache");
    }
    info!(
        context_chars = result.context_chars,
        elapsed_s = format!("{:.1}", result.elapsed.as_secs_f64()),
        "done"
    );

    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }

    fn done(&self, _result: &AskResult) {
        self.spinner.finish_and_clear();
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }
}

// ---------------------------------------------------------------------------
// import / list / chunks
// ---------------------------------------------------------------------------

async fn cmd_import(tender_id: &str, files: &[PathBuf], db_override: Option<&str>) -> Result<()> {
    let config = load_config()?;
    let storage = Storage::open(&db_path(&config, db_override)?).await?;

    let mut documents = DocumentSet::new();
    for path in files {
        let name = path
            .file_name()
            .ok_or_else(|| eyre!("'{}' has no file name", path.display()))?
            .to_string_lossy()
            .to_string();
        let text = std::fs::read_to_string(path)
            .map_err(|e| eyre!("cannot read '{}': {e}", path.display()))?;
        documents.insert(name, text);
    }

    let total_chars: usize = documents.values().map(|t| t.chars().count()).sum();
    storage.upsert_tender(tender_id, &documents).await?;

    info!(tender_id, files = documents.len(), "tender imported");

    println!();
    println!("  Tender imported.");
    println!("  ID:    {tender_id}");
    println!("  Files: {}", documents.len());
    println!("  Chars: {total_chars}");
    println!();

    Ok(())
}

async fn cmd_list(db_override: Option<&str>) -> Result<()> {
    let config = load_config()?;
    let storage = Storage::open(&db_path(&config, db_override)?).await?;

    let tenders = storage.list_tenders().await?;
    if tenders.is_empty() {
        println!("No tenders stored yet. Use `tenderlens import` to add one.");
        return Ok(());
    }

    println!();
    for (tender_id, updated_at) in tenders {
        let detail = match storage.get_tender(&tender_id).await? {
            Some(raw) => match DocumentPayload::from_json(&raw) {
                DocumentPayload::Files(files) => format!("{} file(s)", files.len()),
                DocumentPayload::Combined(_) => "pre-joined text".to_string(),
            },
            None => "missing".to_string(),
        };
        println!("  {tender_id}  {detail}  updated {updated_at}");
    }
    println!();

    Ok(())
}

async fn cmd_chunks(tender_id: &str, as_json: bool, db_override: Option<&str>) -> Result<()> {
    let config = load_config()?;
    let storage = Storage::open(&db_path(&config, db_override)?).await?;

    let Some(raw) = storage.get_tender(tender_id).await? else {
        return Err(eyre!("no tender found with ID '{tender_id}'"));
    };

    let files = match DocumentPayload::from_json(&raw) {
        DocumentPayload::Files(files) => files,
        DocumentPayload::Combined(_) => {
            println!("Tender '{tender_id}' stores pre-joined text; there is nothing to chunk.");
            return Ok(());
        }
    };

    let result = tenderlens_relevance::analyze(&files, config.processing.context_size);

    if as_json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    let meta = &result.metadata;
    println!();
    println!("  Files:             {}", meta.total_files);
    println!("  Text length:       {}", meta.total_text_length);
    println!("  Chunks:            {}", meta.total_chunks);
    println!("  Criteria sections: {}", meta.total_criteria_sections);
    println!();

    if !result.categorized_chunks.is_empty() {
        println!("  Chunks by category:");
        for category in Category::SELECTABLE.into_iter().chain([Category::Other]) {
            if let Some(chunks) = result.categorized_chunks.get(&category) {
                println!("    {category:<20} {}", chunks.len());
            }
        }
        println!();
    }

    if !result.specific_criteria.is_empty() {
        println!("  Criteria sections:");
        for key in &meta.criteria_types_found {
            if let Some(sections) = result.specific_criteria.get(key) {
                println!("    {key:<26} {}", sections.len());
            }
        }
        println!();
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}
