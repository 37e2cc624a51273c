//! JSONL-backed vocabulary loading and refresh through the service container.

mod common;

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use insight::service::{ServiceConfig, refresh_stale};
use insight::vocabulary::VocabularyConfig;
use insight::{
    InsightServices, JsonlVocabularySource, StatsError, StubEmbedder, VocabularyError, stub_vector,
};
use tempfile::NamedTempFile;

use common::{DIM, small_service_config};

fn jsonl(prefix: &str, count: usize) -> String {
    (0..count)
        .map(|i| {
            let word = format!("{prefix}{i}");
            serde_json::json!({
                "word": word,
                "frequency_rank": i + 1,
                "vector": stub_vector(&word, DIM),
            })
            .to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn write_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("temp file");
    file.write_all(content.as_bytes()).expect("write");
    file.flush().expect("flush");
    file
}

fn rewrite(file: &NamedTempFile, content: &str) {
    std::fs::write(file.path(), content).expect("rewrite");
}

fn services(config: ServiceConfig) -> InsightServices {
    InsightServices::new(config, Arc::new(StubEmbedder::new(DIM)), None)
}

#[tokio::test]
async fn test_warm_up_from_jsonl() {
    let file = write_file(&jsonl("alpha", 60));
    let services = services(small_service_config());

    services
        .warm_up(Arc::new(JsonlVocabularySource::new(file.path())), true)
        .await
        .expect("warm up");

    assert!(services.is_ready());
    assert_eq!(services.pool().size(), 60);
    assert!(services.pool().contains("ALPHA7"));
    assert_eq!(services.pool().stats().vector_count, 60);
    assert!(services.stats().table("radiation", 5).is_some());
}

#[tokio::test]
async fn test_refresh_swaps_snapshot_and_keeps_old_readers() {
    let file = write_file(&jsonl("alpha", 60));
    let services = services(small_service_config());
    services
        .warm_up(Arc::new(JsonlVocabularySource::new(file.path())), true)
        .await
        .expect("warm up");

    let before = services.pool().snapshot().expect("snapshot");
    rewrite(&file, &jsonl("beta", 80));
    services.pool().refresh().await.expect("refresh");

    assert_eq!(before.len(), 60);
    assert!(before.contains("alpha1"));
    assert_eq!(services.pool().size(), 80);
    assert!(services.pool().contains("beta1"));
    assert!(!services.pool().contains("alpha1"));
}

#[tokio::test]
async fn test_failed_refresh_keeps_previous_snapshot() {
    let file = write_file(&jsonl("alpha", 60));
    let services = services(small_service_config());
    services
        .warm_up(Arc::new(JsonlVocabularySource::new(file.path())), true)
        .await
        .expect("warm up");

    rewrite(&file, "{\"word\": \"ok\"}\nnot json at all");
    let err = services.pool().refresh().await.expect_err("bad file");

    assert!(matches!(err, VocabularyError::Parse { line: 2, .. }));
    assert_eq!(services.pool().size(), 60);
    assert!(services.pool().stats().last_error.is_some());
    assert!(services.is_ready());
}

#[tokio::test]
async fn test_refresh_stale_rebuilds_statistics_after_reload() {
    let file = write_file(&jsonl("alpha", 60));
    let config = ServiceConfig {
        vocabulary: VocabularyConfig {
            refresh_interval: Duration::from_millis(10),
        },
        ..small_service_config()
    };
    let services = services(config);
    services
        .warm_up(Arc::new(JsonlVocabularySource::new(file.path())), true)
        .await
        .expect("warm up");
    let table_before = services.stats().table("union", 3).expect("table");

    rewrite(&file, &jsonl("gamma", 70));
    tokio::time::sleep(Duration::from_millis(30)).await;
    refresh_stale(services.pool(), services.stats()).await;

    assert!(services.pool().contains("gamma3"));
    let table_after = services.stats().table("union", 3).expect("table");
    assert!(!Arc::ptr_eq(&table_before, &table_after));
}

#[tokio::test]
async fn test_warm_up_with_missing_file_fails() {
    let services = services(small_service_config());

    let err = services
        .warm_up(
            Arc::new(JsonlVocabularySource::new("/nonexistent/vocabulary.jsonl")),
            true,
        )
        .await
        .expect_err("missing file");

    assert!(matches!(err, StatsError::Vocabulary(VocabularyError::Io(_))));
    assert!(!services.is_ready());
}
