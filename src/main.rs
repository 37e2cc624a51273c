//! Insight monitoring server entrypoint.
//!
//! Warms the caches, starts the background maintenance tasks and serves
//! `/healthz`, `/ready` and `/stats`.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tokio::signal;

use insight::assistant::{AssistantProvider, GenaiAssistant};
use insight::config::Config;
use insight::embedding::{EmbeddingProvider, OpenAiEmbedder, StubEmbedder};
use insight::gateway::create_router;
use insight::service::{InsightServices, ServiceConfig};
use insight::vocabulary::{
    JsonlVocabularySource, StaticVocabularySource, VocabularyEntry, VocabularySource,
};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if std::env::args().any(|arg| arg == "--health-check") {
        std::process::exit(run_health_check());
    }

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    config.validate()?;
    let service_config = ServiceConfig::from_env()?;
    service_config.validate()?;
    let addr: SocketAddr = config.socket_addr().parse()?;

    tracing::info!(
        bind_addr = %config.bind_addr,
        port = config.port,
        "Insight starting"
    );

    let embedder: Arc<dyn EmbeddingProvider> = match &config.openai_api_key {
        Some(key) => Arc::new(OpenAiEmbedder::new(
            config.openai_base_url.clone(),
            key.clone(),
            config.embedding_model.clone(),
            config.embedding_dim,
        )),
        None => {
            tracing::warn!("No INSIGHT_OPENAI_API_KEY configured, running embedder in stub mode");
            Arc::new(StubEmbedder::new(config.embedding_dim))
        }
    };

    let assistant: Option<Arc<dyn AssistantProvider>> = match &config.assistant_model {
        Some(model) => Some(Arc::new(GenaiAssistant::new(model.clone()))),
        None => {
            tracing::info!("No INSIGHT_ASSISTANT_MODEL configured, assistant sub-task disabled");
            None
        }
    };

    let services = Arc::new(InsightServices::new(service_config, embedder, assistant));

    let source = vocabulary_source(&config, &services).await;
    if let Err(e) = services.warm_up(source, config.load_vectors).await {
        tracing::warn!(error = %e, "Warm-up incomplete; serving with fallbacks");
    }

    services.start_background_tasks();

    let app = create_router(Arc::clone(&services));

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!(jobs = services.orchestrator().len(), "Insight shutdown complete");
    Ok(())
}

/// The configured JSONL file, or the built-in word list with vectors fetched
/// through the embedding cache.
async fn vocabulary_source(
    config: &Config,
    services: &InsightServices,
) -> Arc<dyn VocabularySource> {
    if let Some(path) = &config.vocabulary_path {
        return Arc::new(JsonlVocabularySource::new(path.clone()));
    }

    tracing::warn!("No INSIGHT_VOCABULARY_PATH configured, using the built-in word list");
    let fallback = StaticVocabularySource::fallback();
    if !config.load_vectors {
        return Arc::new(fallback);
    }

    let words: Vec<&str> = fallback.entries().iter().map(|e| e.word.as_str()).collect();
    match services.embeddings().embed_batch(&words).await {
        Ok(vectors) => {
            let entries: Vec<VocabularyEntry> = fallback
                .entries()
                .iter()
                .zip(vectors)
                .map(|(entry, vector)| entry.clone().with_vector(vector.to_vec()))
                .collect();
            Arc::new(fallback.with_entries(entries))
        }
        Err(e) => {
            tracing::warn!(error = %e, "Could not embed the built-in word list");
            Arc::new(fallback)
        }
    }
}

fn run_health_check() -> i32 {
    let port = std::env::var("INSIGHT_PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(8080);

    let url = format!("http://127.0.0.1:{}/healthz", port);

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(_) => return 1,
    };

    rt.block_on(async {
        let client = match reqwest::Client::builder()
            .timeout(Duration::from_secs(1))
            .build()
        {
            Ok(client) => client,
            Err(_) => return 1,
        };

        match client.get(&url).send().await {
            Ok(res) if res.status().is_success() => 0,
            _ => 1,
        }
    })
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
