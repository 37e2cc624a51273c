//! In-process caches: a generic LRU/TTL [`KeyedCache`], the
//! [`EmbeddingCache`] and the [`NoiseFloorCache`] built on it.

pub mod config;
pub mod embedding;
pub mod error;
pub mod keyed;
pub mod noise_floor;
pub mod types;

#[cfg(test)]
mod embedding_tests;
#[cfg(test)]
mod keyed_tests;

pub use config::{CacheConfig, NoiseFloorConfig};
pub use embedding::EmbeddingCache;
pub use error::NoiseFloorError;
pub use keyed::KeyedCache;
pub use noise_floor::{
    NoiseFloor, NoiseFloorCache, NoiseFloorKey, NoiseFloorWord, compute_noise_floor,
};
pub use types::{CacheEntry, CacheStats};
