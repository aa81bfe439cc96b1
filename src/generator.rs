//! Similarity-constrained population generator.
//!
//! Entities are admitted stage by stage through rejection sampling: a candidate
//! feature set joins the population only if its Jaccard index against *every*
//! entity already admitted satisfies the active stage's [`SimilarityBand`].

use crate::error::{Error, Result};
use crate::similarity::{jaccard_index, FeatureSet, SimilarityBand};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;
use tracing::{debug, info, warn};

/// Draws `sample_size` distinct features uniformly from `[0, universe_size)`.
pub fn sample_feature_set<R: Rng + ?Sized>(
    rng: &mut R,
    universe_size: usize,
    sample_size: usize,
) -> Result<FeatureSet> {
    if sample_size == 0 || sample_size > universe_size {
        return Err(Error::InvalidSampleSize {
            sample_size,
            universe_size,
        });
    }
    Ok(rand::seq::index::sample(rng, universe_size, sample_size)
        .into_iter()
        .collect())
}

/// One generation stage: admit `count` entities under `band`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Stage {
    pub label: String,
    pub count: usize,
    pub band: SimilarityBand,
}

impl Stage {
    pub fn new(label: impl Into<String>, count: usize, band: SimilarityBand) -> Self {
        Self {
            label: label.into(),
            count,
            band,
        }
    }

    pub fn seed(count: usize) -> Self {
        Self::new("seed", count, SimilarityBand::Any)
    }

    pub fn weak(count: usize) -> Self {
        Self::new("weak", count, SimilarityBand::WEAK_TIE)
    }

    pub fn strong(count: usize) -> Self {
        Self::new("strong", count, SimilarityBand::STRONG_TIE)
    }
}

/// Generator configuration
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Size of the feature universe (F)
    pub universe_size: usize,
    /// Features per generated entity (k)
    pub sample_size: usize,
    /// Candidate draws allowed per stage before giving up
    pub max_attempts: usize,
    /// Fixed RNG seed; entropy-seeded when absent
    pub seed: Option<u64>,
    pub stages: Vec<Stage>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            universe_size: 40,
            sample_size: 5,
            max_attempts: 10_000,
            seed: None,
            stages: vec![Stage::seed(1), Stage::weak(11), Stage::strong(11)],
        }
    }
}

impl GeneratorConfig {
    pub fn population_size(&self) -> usize {
        self.stages.iter().map(|s| s.count).sum()
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

/// Accepted entities in admission order, each tagged with the band it was admitted under.
#[derive(Debug, Clone, Default)]
pub struct Population {
    pub entities: Vec<FeatureSet>,
    pub bands: Vec<SimilarityBand>,
}

impl Population {
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// True when `candidate` satisfies `band` against every accepted entity.
    fn admits(&self, candidate: &FeatureSet, band: SimilarityBand) -> Result<bool> {
        for existing in &self.entities {
            if !band.accepts(jaccard_index(candidate, existing)?) {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Pairs `(later, earlier)` where the later entity's band does not hold.
    /// Empty for any population produced by [`generate_population`].
    pub fn violations(&self) -> Result<Vec<(usize, usize)>> {
        let mut out = Vec::new();
        for (i, (entity, band)) in self.entities.iter().zip(&self.bands).enumerate() {
            for (j, earlier) in self.entities[..i].iter().enumerate() {
                if !band.accepts(jaccard_index(entity, earlier)?) {
                    out.push((i, j));
                }
            }
        }
        Ok(out)
    }
}

/// Runs every stage of `config` against `rng`.
pub fn generate_population<R: Rng + ?Sized>(
    config: &GeneratorConfig,
    rng: &mut R,
) -> Result<Population> {
    let mut population = Population::default();

    for (stage_idx, stage) in config.stages.iter().enumerate() {
        info!(stage = stage_idx, label = %stage.label, count = stage.count, band = %stage.band, "generating stage");
        let mut attempts = 0;
        let mut admitted = 0;

        while admitted < stage.count {
            if attempts >= config.max_attempts {
                warn!(stage = stage_idx, attempts, "attempt budget exhausted");
                return Err(Error::ConstraintUnsatisfiable {
                    stage: stage_idx,
                    band: stage.band.to_string(),
                    attempts,
                    accepted: population.len(),
                });
            }
            attempts += 1;

            let candidate = sample_feature_set(rng, config.universe_size, config.sample_size)?;
            if population.admits(&candidate, stage.band)? {
                debug!(entity = population.len(), attempts, features = ?candidate, "accepted");
                population.entities.push(candidate);
                population.bands.push(stage.band);
                admitted += 1;
            }
        }
        info!(stage = stage_idx, attempts, total = population.len(), "stage complete");
    }

    Ok(population)
}

/// [`generate_population`] with an RNG built from `config.seed`.
pub fn generate(config: &GeneratorConfig) -> Result<Population> {
    let mut rng = config.rng();
    generate_population(config, &mut rng)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_feature_set() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..100 {
            let set = sample_feature_set(&mut rng, 40, 5).unwrap();
            assert_eq!(set.len(), 5);
            assert!(set.iter().all(|&f| f < 40));
        }
        assert_eq!(sample_feature_set(&mut rng, 3, 3).unwrap().len(), 3);
    }

    #[test]
    fn test_sample_size_is_validated() {
        let mut rng = StdRng::seed_from_u64(7);
        assert!(matches!(
            sample_feature_set(&mut rng, 40, 0),
            Err(Error::InvalidSampleSize { .. })
        ));
        assert!(matches!(
            sample_feature_set(&mut rng, 4, 5),
            Err(Error::InvalidSampleSize { .. })
        ));
    }

    #[test]
    fn test_weak_stage_holds_over_whole_population() {
        let config = GeneratorConfig {
            seed: Some(11),
            stages: vec![Stage::seed(1), Stage::weak(4)],
            ..Default::default()
        };
        let population = generate(&config).unwrap();

        assert_eq!(population.len(), 5);
        for (i, entity) in population.entities.iter().enumerate().skip(1) {
            for earlier in &population.entities[..i] {
                let j = jaccard_index(entity, earlier).unwrap();
                assert!(j == 0.0 || j > 0.4, "pair jaccard {j}");
            }
        }
        assert!(population.violations().unwrap().is_empty());
    }

    #[test]
    fn test_strong_stage_holds_over_whole_population() {
        // Small universe so that 4-of-5 overlaps are common.
        let config = GeneratorConfig {
            universe_size: 8,
            sample_size: 5,
            seed: Some(3),
            stages: vec![Stage::seed(1), Stage::strong(2)],
            ..Default::default()
        };
        let population = generate(&config).unwrap();

        assert_eq!(population.len(), 3);
        for (i, entity) in population.entities.iter().enumerate().skip(1) {
            for earlier in &population.entities[..i] {
                let j = jaccard_index(entity, earlier).unwrap();
                assert!(0.6 < j && j < 0.9, "pair jaccard {j}");
            }
        }
    }

    #[test]
    fn test_weak_then_strong_stages_hold_over_whole_population() {
        // Any two distinct 5-of-6 sets share exactly four features (jaccard 2/3).
        let config = GeneratorConfig {
            universe_size: 6,
            sample_size: 5,
            seed: Some(21),
            stages: vec![Stage::seed(1), Stage::weak(2), Stage::strong(2)],
            ..Default::default()
        };
        let population = generate(&config).unwrap();

        assert_eq!(population.len(), 5);
        assert_eq!(population.bands[1], SimilarityBand::WEAK_TIE);
        assert_eq!(population.bands[4], SimilarityBand::STRONG_TIE);
        assert!(population.violations().unwrap().is_empty());
        for earlier in &population.entities[..3] {
            for entity in &population.entities[3..] {
                let j = jaccard_index(entity, earlier).unwrap();
                assert!(0.6 < j && j < 0.9, "pair jaccard {j}");
            }
        }
    }

    #[test]
    fn test_exhausted_budget_fails_instead_of_looping() {
        // With k = 5 no two distinct sets can land in (0.99, 1.0).
        let config = GeneratorConfig {
            max_attempts: 1,
            seed: Some(1),
            stages: vec![
                Stage::seed(1),
                Stage::new("impossible", 1, SimilarityBand::Strong { lower: 0.99, upper: 1.0 }),
            ],
            ..Default::default()
        };
        match generate(&config) {
            Err(Error::ConstraintUnsatisfiable {
                stage,
                attempts,
                accepted,
                ..
            }) => {
                assert_eq!(stage, 1);
                assert_eq!(attempts, 1);
                assert_eq!(accepted, 1);
            }
            other => panic!("expected ConstraintUnsatisfiable, got {other:?}"),
        }
    }

    #[test]
    fn test_seeded_generation_is_reproducible() {
        let config = GeneratorConfig {
            seed: Some(42),
            stages: vec![Stage::seed(1), Stage::weak(3)],
            ..Default::default()
        };
        let a = generate(&config).unwrap();
        let b = generate(&config).unwrap();
        assert_eq!(a.entities, b.entities);
    }

    #[test]
    fn test_default_population_size() {
        assert_eq!(GeneratorConfig::default().population_size(), 23);
    }
}
