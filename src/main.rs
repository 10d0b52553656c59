use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::sync::Mutex as TokioMutex;
use tracing::info;
use tracing_subscriber::EnvFilter;

use safequery::answer::generator::{Generator, OllamaGenerator};
use safequery::answer::retriever::Retriever;
use safequery::answer::AnswerPipeline;
use safequery::api::{self, AppState};
use safequery::audit::AuditLog;
use safequery::bootstrap;
use safequery::config::Config;
use safequery::crawler::Crawler;
use safequery::crawler::discovery::{DuckDuckGoProvider, UrlDiscoverer};
use safequery::crawler::extract::{ContentExtractor, HttpPageFetcher};
use safequery::embedder::Embedder;
use safequery::embedder::ollama::OllamaEmbedder;
use safequery::repository::DocumentRepository;
use safequery::store::Db;

#[derive(Parser, Debug)]
#[command(name = "safequery", version, about = "Privacy-first RAG search engine")]
struct Args {
    /// Path to the JSON configuration file
    #[arg(long, default_value = "config.json")]
    config: String,

    /// Override the HTTP port from the config
    #[arg(long)]
    port: Option<u16>,

    /// Run a single crawl pass and exit without serving
    #[arg(long)]
    crawl_once: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    // 1. Load config
    let config = Config::load(&args.config)?;
    config.validate()?;

    // 2. Init store
    let db = Db::open(&config.db_path).context("Failed to open knowledge base")?;
    let db = Arc::new(TokioMutex::new(db));

    // 3. Init embedder + repository
    let embedder: Arc<dyn Embedder> = Arc::new(OllamaEmbedder::new(&config.model)?);
    let repository = Arc::new(DocumentRepository::new(db, embedder.clone()));

    // 4. Init crawler
    let search_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.crawl.request_timeout_secs))
        .build()
        .context("Failed to build search client")?;
    let discoverer = UrlDiscoverer::new(
        Arc::new(DuckDuckGoProvider::new(search_client)),
        config.crawl.blocked_domains.clone(),
    );
    let fetcher = HttpPageFetcher::new(&config.crawl).context("Failed to build page fetcher")?;
    let extractor = ContentExtractor::new(Arc::new(fetcher), &config.crawl);
    let crawler = Arc::new(Crawler::new(
        discoverer,
        extractor,
        repository.clone(),
        config.crawl.topics.clone(),
        config.crawl.max_articles_per_topic,
    ));

    if args.crawl_once {
        crawler.run().await;
        return Ok(());
    }

    // 5. Seed fallback documents, then crawl once before serving so queries
    //    always have something to work with
    bootstrap::seed_if_empty(&repository).await?;
    crawler.run().await;

    // 6. Periodic re-crawl
    let interval_crawler = crawler.clone();
    let interval_hours = config.crawl.interval_hours;
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_secs(interval_hours * 3600));
        // The immediate first tick is covered by the startup crawl
        ticker.tick().await;
        loop {
            ticker.tick().await;
            interval_crawler.run().await;
        }
    });
    info!("Crawler scheduled to run every {interval_hours} hours");

    // 7. Answer pipeline
    let generator: Option<Arc<dyn Generator>> = if config.model.generation_enabled {
        Some(Arc::new(OllamaGenerator::new(&config.model)))
    } else {
        None
    };
    let pipeline = Arc::new(AnswerPipeline::new(
        Retriever::new(repository.clone(), embedder),
        repository.clone(),
        generator,
        config.answer.clone(),
        Duration::from_secs(config.model.generation_timeout_secs),
    ));

    // 8. Serve
    let audit = Arc::new(AuditLog::new(
        PathBuf::from("query_log.txt"),
        PathBuf::from("feedback_log.txt"),
    ));
    let state = AppState {
        pipeline,
        repository,
        audit,
    };
    let app = api::router(state, &config.http.allowed_origins);

    let port = args.port.unwrap_or(config.http.port);
    let addr = format!("0.0.0.0:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Serving on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("Shutdown signal received");
}
