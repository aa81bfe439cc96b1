//! Pipeline configuration loaded from TOML.
//!
//! ```toml
//! [generator]
//! universe_size = 40
//! sample_size = 5
//! seed = 7
//!
//! [[generator.stages]]
//! label = "seed"
//! count = 1
//! band = { kind = "any" }
//!
//! [[generator.stages]]
//! label = "weak"
//! count = 11
//! band = { kind = "weak", threshold = 0.4 }
//!
//! [recommender]
//! top_k = 5
//! ranking = "support"
//! ```

use crate::error::Result;
use crate::generator::GeneratorConfig;
use crate::recommend::RecommendOptions;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub generator: GeneratorConfig,
    pub graph: GraphConfig,
    pub recommender: RecommendOptions,
    pub output: OutputConfig,
}

/// How the social graph is derived from the generated matrix
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// Minimum Jaccard index for two kids to be friends
    pub min_similarity: f64,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self { min_similarity: 0.4 }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub matrix_path: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            matrix_path: PathBuf::from("kids_cartoons.csv"),
        }
    }
}

impl Config {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_toml_str(&std::fs::read_to_string(path)?)
    }

    /// Six kids whose cartoon sets pairwise share four of five titles.
    /// Unlike the default seed/weak/strong stages this one is always satisfiable.
    pub fn strong_ties_demo() -> Result<Self> {
        Self::from_toml_str(STRONG_TIES_DEMO)
    }
}

const STRONG_TIES_DEMO: &str = include_str!("../demos/strong_ties.toml");

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recommend::Ranking;
    use crate::similarity::SimilarityBand;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.generator.population_size(), 23);
        assert_eq!(config.recommender.top_k, None);
    }

    #[test]
    fn test_parse_stages_and_options() {
        let text = r#"
            [generator]
            universe_size = 12
            max_attempts = 500
            seed = 9

            [[generator.stages]]
            label = "seed"
            count = 1
            band = { kind = "any" }

            [[generator.stages]]
            label = "strong"
            count = 2
            band = { kind = "strong", lower = 0.6, upper = 0.9 }

            [recommender]
            top_k = 5
            ranking = "weighted"

            [output]
            matrix_path = "out/matrix.csv"
        "#;
        let config = Config::from_toml_str(text).unwrap();

        assert_eq!(config.generator.universe_size, 12);
        assert_eq!(config.generator.sample_size, 5);
        assert_eq!(config.generator.seed, Some(9));
        assert_eq!(config.generator.stages.len(), 2);
        assert_eq!(config.generator.stages[1].band, SimilarityBand::STRONG_TIE);
        assert_eq!(config.recommender.top_k, Some(5));
        assert_eq!(config.recommender.ranking, Ranking::Weighted);
        assert_eq!(config.output.matrix_path, PathBuf::from("out/matrix.csv"));
        assert_eq!(config.graph.min_similarity, 0.4);
    }

    #[test]
    fn test_strong_ties_demo_generates() {
        let config = Config::strong_ties_demo().unwrap();
        assert_eq!(config.generator.population_size(), 6);

        let population = crate::generator::generate(&config.generator).unwrap();
        assert_eq!(population.len(), 6);
        assert!(population.violations().unwrap().is_empty());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pipeline.toml");
        std::fs::write(&path, "[graph]\nmin_similarity = 0.6\n").unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.graph.min_similarity, 0.6);
        assert!(Config::from_toml_str("[graph]\nmin_similarity = \"high\"").is_err());
    }
}
