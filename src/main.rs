//! search-adapters CLI - run one query against several search engines.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use search_adapters::{
    EngineCategory, HttpTransport, OptionKind, Registry, Search, SearchQuery, SearchResults,
    TimeRange, TransportConfig,
};

/// Search several sites at once and show each engine's results.
#[derive(Parser)]
#[command(name = "search-adapters")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Search one or more engines
    Search(SearchArgs),

    /// List available search engines
    Engines,
}

#[derive(Parser)]
struct SearchArgs {
    /// Search query
    query: String,

    /// Engines to use, by name or shortcut (comma-separated).
    /// Defaults to every enabled engine.
    #[arg(short, long, value_delimiter = ',')]
    engines: Option<Vec<String>>,

    /// Result page (1-indexed)
    #[arg(short, long, default_value = "1")]
    page: u32,

    /// Restrict results to a recent time window (day, week, month, year)
    #[arg(long)]
    time_range: Option<TimeRange>,

    /// Language tag, e.g. en or zh-CN
    #[arg(long)]
    language: Option<String>,

    /// Vertical to search (general, images, it, science, shopping)
    #[arg(long)]
    category: Option<EngineCategory>,

    /// Maximum number of results to display per engine
    #[arg(short, long, default_value = "10")]
    limit: usize,

    /// Per-engine timeout in seconds (overrides each engine's own)
    #[arg(short, long)]
    timeout: Option<u64>,

    /// Output format
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,

    /// Proxy URL (e.g., http://127.0.0.1:8080 or socks5://127.0.0.1:1080)
    #[arg(long)]
    proxy: Option<String>,

    /// Default User-Agent for engines that do not set their own
    #[arg(long)]
    user_agent: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    /// Human-readable text output
    Text,
    /// JSON output
    Json,
    /// Compact single-line output
    Compact,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins; --verbose raises the default to debug
    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Search(args) => run_search(args).await,
        Commands::Engines => list_engines(),
    }
}

fn list_engines() -> Result<()> {
    let registry = Registry::with_defaults();
    println!("Available search engines:\n");
    for engine in registry.iter() {
        let config = engine.config();
        let categories: Vec<_> = config.categories.iter().map(|c| c.as_str()).collect();
        let options: Vec<_> = config.options.iter().map(OptionKind::to_string).collect();
        println!(
            "  {:<6} - {:<10} [{}]{}{}",
            config.shortcut,
            config.name,
            categories.join(", "),
            if options.is_empty() {
                String::new()
            } else {
                format!(" options: {}", options.join(", "))
            },
            if config.paging { "" } else { " (single page)" },
        );
    }
    println!();
    println!("Usage: search-adapters search \"query\" -e gh,wiki,bing");
    Ok(())
}

async fn run_search(args: SearchArgs) -> Result<()> {
    let mut transport_config = TransportConfig::default();
    if let Some(user_agent) = &args.user_agent {
        transport_config.user_agent = user_agent.clone();
    }
    if let Some(proxy) = &args.proxy {
        url::Url::parse(proxy)?;
        transport_config.proxy = Some(proxy.clone());
        if matches!(args.format, OutputFormat::Text) {
            eprintln!("Using proxy: {}", proxy);
        }
    }

    let transport = HttpTransport::from_config(&transport_config)?;
    let mut search = Search::new(Arc::new(transport));
    if let Some(secs) = args.timeout {
        search.set_timeout(Duration::from_secs(secs));
    }

    let mut query = SearchQuery::new(&args.query).with_page(args.page);
    if let Some(range) = args.time_range {
        query = query.with_time_range(range);
    }
    if let Some(language) = &args.language {
        query = query.with_language(language);
    }
    if let Some(category) = args.category {
        query = query.with_category(category);
    }
    query.validate()?;

    let results = match &args.engines {
        Some(engines) => search.search(&query, engines.as_slice()).await,
        None => search.search_all(&query).await,
    };

    print_results(&args, &results)
}

fn print_results(args: &SearchArgs, results: &SearchResults) -> Result<()> {
    match args.format {
        OutputFormat::Text => {
            println!(
                "\nSearch results for \"{}\" ({} results in {}ms):",
                args.query,
                results.count(),
                results.duration_ms
            );

            for outcome in results.outcomes() {
                println!();
                match &outcome.failure {
                    Some(failure) => {
                        println!("== {} ({}ms): {}", outcome.engine, outcome.duration_ms, failure);
                        continue;
                    }
                    None => println!(
                        "== {} ({} results, {}ms)",
                        outcome.engine,
                        outcome.results.len(),
                        outcome.duration_ms
                    ),
                }

                for (i, result) in outcome.results.iter().take(args.limit).enumerate() {
                    println!("{}. {}", i + 1, result.title);
                    println!("   URL: {}", result.url);
                    if !result.content.is_empty() {
                        println!("   {}", truncate(&result.content, 150));
                    }
                    if let Some(date) = &result.published_date {
                        println!("   Published: {}", date);
                    }
                }
            }
            println!();
        }
        OutputFormat::Json => {
            let outcomes = results
                .outcomes()
                .iter()
                .cloned()
                .map(|mut outcome| {
                    outcome.results.truncate(args.limit);
                    outcome
                })
                .collect();
            let mut limited = SearchResults::from_outcomes(outcomes);
            limited.set_duration(results.duration_ms);
            println!("{}", serde_json::to_string_pretty(&limited)?);
        }
        OutputFormat::Compact => {
            for outcome in results.outcomes() {
                for result in outcome.results.iter().take(args.limit) {
                    println!("{}\t{}\t{}", outcome.engine, result.title, result.url);
                }
            }
        }
    }

    Ok(())
}

/// Shortens text to at most `max` characters, respecting char boundaries.
fn truncate(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
