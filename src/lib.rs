//! Similarity-constrained "kids and cartoons" population generator and a
//! neighbour-aggregation recommender over the resulting social graph.

pub mod config;
pub mod error;
pub mod generator;
pub mod graph;
pub mod matrix;
pub mod names;
pub mod recommend;
pub mod similarity;

pub use config::{Config, GraphConfig, OutputConfig};
pub use error::{Error, Result};
pub use generator::{
    generate, generate_population, sample_feature_set, GeneratorConfig, Population, Stage,
};
pub use graph::{NeighbourGraph, SocialGraph, WeightedEdge};
pub use matrix::FeatureMatrix;
pub use names::{cartoon_names, NameGenerator};
pub use recommend::{
    features_of, neighbours_of, on_focal_node_changed, recommend, recommend_all,
    sorted_neighbours_by_weight, FocalView, Ranking, RecommendOptions, Recommendation,
};
pub use similarity::{jaccard_index, FeatureSet, SimilarityBand};

/// Indicator matrix of a population over `[0, universe_size)`.
pub fn to_feature_matrix(entities: &[FeatureSet], universe_size: usize) -> Result<FeatureMatrix> {
    FeatureMatrix::from_feature_sets(entities, universe_size)
}
