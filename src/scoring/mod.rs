//! Submission scoring: cosine helpers, the per-context [`SampleScorer`]s and
//! the lexical baseline.

pub mod lexical;
pub mod scorer;
pub mod similarity;


pub use lexical::{LexicalCandidate, is_morphological_variant, lexical_union, nearest_words};
pub use scorer::{RadiationScorer, SampleScore, SampleScorer, UnionScorer};
pub use similarity::{cosine_similarity, mean_pairwise_distance};
