use anyhow::{bail, Context, Result};
use chaindocs::config::{DEFAULT_ASSETS_BASE, DEFAULT_ROUTE_BASE};
use chaindocs::highlight::segments_text;
use chaindocs::index::build_site_index;
use chaindocs::{
    render_segments_html, DirFetcher, DocsEngine, DocsError, DocsMetrics, EngineConfig,
    ResourceFetcher, TocNode, Tokenizer, UrlOpener,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "chaindocs")]
#[command(about = "Search and navigate integration chain documentation", long_about = None)]
struct Args {
    /// Local site directory serving the documentation assets
    #[arg(long, env = "CHAINDOCS_SITE_DIR", global = true)]
    site_dir: Option<PathBuf>,

    /// Origin the documentation assets are fetched from (e.g. https://ui.example.com)
    #[arg(long, env = "CHAINDOCS_BASE_URL", global = true)]
    base_url: Option<String>,

    /// Path of the documentation assets relative to the site
    #[arg(long, env = "CHAINDOCS_ASSETS_BASE", default_value = DEFAULT_ASSETS_BASE, global = true)]
    assets_base: String,

    /// Route prefix for document links
    #[arg(long, env = "CHAINDOCS_ROUTE_BASE", default_value = DEFAULT_ROUTE_BASE, global = true)]
    route_base: String,

    /// Folder name marking element library documents
    #[arg(long, env = "CHAINDOCS_LIBRARY_MARKER", default_value = "library", global = true)]
    library_marker: String,

    /// Print Prometheus metrics after the command
    #[arg(long, global = true)]
    metrics: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Full-text search with highlighted snippets
    Search {
        query: String,
        /// Maximum number of results shown
        #[arg(long, default_value = "10")]
        limit: usize,
        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },
    /// Highlighted fragments of one document
    Detail {
        doc_ref: u32,
        query: String,
        /// Render fragments as HTML
        #[arg(long)]
        html: bool,
    },
    /// Resolve and open the documentation of an element type
    Element { slug: String },
    /// Resolve and open the documentation of a UI path
    Context { path: String },
    /// Print the table of contents
    Toc,
    /// Check that paths, names and the search index agree
    Check,
    /// Build search-index.json from the site's markdown sources
    BuildIndex {
        /// Output file (defaults to <assets dir>/search-index.json)
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

/// Opener for a terminal: prints the route instead of navigating to it
struct PrintOpener;

impl UrlOpener for PrintOpener {
    fn open(&self, url: &str) -> chaindocs::Result<()> {
        println!("{}", url);
        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let args = Args::parse();
    info!("Starting chaindocs v{}", chaindocs::VERSION);

    let config = EngineConfig::default()
        .with_assets_base(&args.assets_base)
        .with_route_base(&args.route_base)
        .with_library_marker(&args.library_marker);
    let metrics = Arc::new(DocsMetrics::new()?);
    let engine = DocsEngine::new(config, create_fetcher(&args)?, Arc::new(PrintOpener))
        .with_metrics(metrics.clone());

    match &args.command {
        Command::Search { query, limit, json } => {
            let hits = engine.search_hits(query).await?;
            let shown: Vec<_> = hits.into_iter().take(*limit).collect();
            let refs: Vec<u32> = shown.iter().map(|hit| hit.result.doc_ref).collect();
            let details = engine.get_search_details(&refs, query).await;

            if *json {
                let output: Vec<_> = shown
                    .iter()
                    .map(|hit| {
                        serde_json::json!({
                            "hit": hit,
                            "fragments": details.get(&hit.result.doc_ref),
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&output)?);
            } else {
                if shown.is_empty() {
                    println!("No results for {:?}", query);
                }
                for hit in &shown {
                    println!(
                        "{:>8.3}  {}  ({})",
                        hit.result.score,
                        hit.title(),
                        hit.route.as_deref().unwrap_or("?")
                    );
                    for fragment in details.get(&hit.result.doc_ref).into_iter().flatten() {
                        println!("          {}", segments_text(fragment));
                    }
                }
            }
        }
        Command::Detail {
            doc_ref,
            query,
            html,
        } => {
            for fragment in engine.get_search_detail_segments(*doc_ref, query).await? {
                if *html {
                    println!("{}", render_segments_html(&fragment));
                } else {
                    println!("{}", segments_text(&fragment));
                }
            }
        }
        Command::Element { slug } => {
            let report = |e: &DocsError| warn!("Falling back to documentation home: {}", e);
            engine
                .open_chain_element_documentation(slug, Some(&report))
                .await;
        }
        Command::Context { path } => {
            let report = |e: &DocsError| warn!("Falling back to documentation home: {}", e);
            engine.open_context_documentation(path, Some(&report)).await;
        }
        Command::Toc => {
            let toc = engine.load_toc().await?;
            let paths = engine.load_paths().await?;
            for node in toc.iter() {
                print_toc(&engine, &paths, node, 0);
            }
        }
        Command::Check => {
            let summary = engine.check_corpus_consistency().await?;
            println!(
                "OK: {} documents, {} indexed",
                summary.documents, summary.indexed_documents
            );
        }
        Command::BuildIndex { output } => build_index(&args, output.clone())?,
    }

    if args.metrics {
        print!("{}", metrics.encode_text()?);
    }

    Ok(())
}

fn create_fetcher(args: &Args) -> Result<Arc<dyn ResourceFetcher>> {
    if let Some(base_url) = &args.base_url {
        #[cfg(feature = "http")]
        {
            let fetcher = chaindocs::HttpFetcher::with_origin(base_url)
                .with_context(|| format!("invalid base URL {}", base_url))?;
            return Ok(Arc::new(fetcher));
        }
        #[cfg(not(feature = "http"))]
        bail!("--base-url {} requires the `http` feature", base_url);
    }

    match &args.site_dir {
        Some(dir) => Ok(Arc::new(DirFetcher::new(dir))),
        None => bail!("either --site-dir or --base-url must be given"),
    }
}

fn build_index(args: &Args, output: Option<PathBuf>) -> Result<()> {
    let Some(site_dir) = &args.site_dir else {
        bail!("build-index requires --site-dir");
    };
    let assets_dir = site_dir.join(args.assets_base.trim_matches('/'));
    let snapshot = build_site_index(&assets_dir, Arc::new(Tokenizer::default()))
        .with_context(|| format!("failed to index {}", assets_dir.display()))?;

    let output = output.unwrap_or_else(|| assets_dir.join("search-index.json"));
    std::fs::write(&output, snapshot.to_json()?)
        .with_context(|| format!("failed to write {}", output.display()))?;
    println!("Indexed {} documents into {}", snapshot.len(), output.display());
    Ok(())
}

fn print_toc(engine: &DocsEngine, paths: &[String], node: &TocNode, depth: usize) {
    let title = node.title.as_deref().unwrap_or("");
    match node.document_id.and_then(|id| paths.get(id as usize)) {
        Some(path) => println!(
            "{}{}  ({})",
            "  ".repeat(depth),
            title,
            engine.document_route(path)
        ),
        None => println!("{}{}", "  ".repeat(depth), title),
    }
    for child in &node.children {
        print_toc(engine, paths, child, depth + 1);
    }
}
