//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use insight::service::{InsightServices, ServiceConfig};
use insight::stats::StatsConfig;
use insight::{
    AssistantProvider, MockAssistant, MockEmbedder, StaticVocabularySource, VocabularyEntry,
    stub_vector,
};

pub const DIM: usize = 16;

pub const BRIDGE_REPLY: &str = "1. Tide\n2. Mangrove\n3. Estuary\n4. Coast\n5. Delta";

/// `count` words, each with a deterministic `DIM`-sized vector.
pub fn vocabulary(count: usize) -> Vec<VocabularyEntry> {
    (0..count)
        .map(|i| {
            let word = format!("term{i}");
            let vector = stub_vector(&word, DIM);
            VocabularyEntry::new(word, i as u32 + 1).with_vector(vector)
        })
        .collect()
}

pub fn small_service_config() -> ServiceConfig {
    ServiceConfig {
        stats: StatsConfig::default()
            .with_bootstrap_samples(100)
            .with_sample_sizes(vec![3, 5]),
        ..Default::default()
    }
}

pub struct TestServices {
    pub services: Arc<InsightServices>,
    pub embedder: Arc<MockEmbedder>,
    pub assistant: Arc<MockAssistant>,
}

impl TestServices {
    pub fn new(config: ServiceConfig, embedder: MockEmbedder, assistant: MockAssistant) -> Self {
        let embedder = Arc::new(embedder);
        let assistant = Arc::new(assistant);
        let services = Arc::new(InsightServices::new(
            config,
            embedder.clone(),
            Some(assistant.clone() as Arc<dyn AssistantProvider>),
        ));
        Self {
            services,
            embedder,
            assistant,
        }
    }

    /// Services over a warmed 300-word vocabulary.
    pub async fn warmed() -> Self {
        Self::warmed_with(
            small_service_config(),
            MockEmbedder::new(DIM),
            MockAssistant::new(BRIDGE_REPLY),
        )
        .await
    }

    pub async fn warmed_with(
        config: ServiceConfig,
        embedder: MockEmbedder,
        assistant: MockAssistant,
    ) -> Self {
        let test = Self::new(config, embedder, assistant);
        test.services
            .warm_up(Arc::new(StaticVocabularySource::new(vocabulary(300))), true)
            .await
            .expect("warm up");
        test
    }
}
