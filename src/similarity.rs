//! Feature-set similarity and the bands used to admit generated entities.

use crate::error::{Error, Result};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::fmt;

/// Feature indices held by one entity, drawn from `[0, F)`.
pub type FeatureSet = BTreeSet<usize>;

/// `|A ∩ B| / |A ∪ B|`. Two empty sets have no defined similarity.
pub fn jaccard_index(a: &FeatureSet, b: &FeatureSet) -> Result<f64> {
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    if union == 0 {
        return Err(Error::DegenerateSimilarity);
    }
    Ok(intersection as f64 / union as f64)
}

/// Predicate a candidate's similarity to every accepted entity must satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SimilarityBand {
    /// Accepts any similarity. Used for the seed entity.
    Any,
    /// Weak tie: no overlap at all, or overlap strictly above `threshold`.
    Weak { threshold: f64 },
    /// Strong tie: `lower < jaccard < upper`, both bounds excluded.
    Strong { lower: f64, upper: f64 },
}

impl SimilarityBand {
    pub const WEAK_TIE: SimilarityBand = SimilarityBand::Weak { threshold: 0.4 };
    pub const STRONG_TIE: SimilarityBand = SimilarityBand::Strong {
        lower: 0.6,
        upper: 0.9,
    };

    pub fn accepts(&self, jaccard: f64) -> bool {
        match *self {
            SimilarityBand::Any => true,
            SimilarityBand::Weak { threshold } => jaccard == 0.0 || jaccard > threshold,
            SimilarityBand::Strong { lower, upper } => lower < jaccard && jaccard < upper,
        }
    }
}

impl fmt::Display for SimilarityBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimilarityBand::Any => write!(f, "any"),
            SimilarityBand::Weak { threshold } => write!(f, "jaccard == 0 or jaccard > {threshold}"),
            SimilarityBand::Strong { lower, upper } => write!(f, "{lower} < jaccard < {upper}"),
        }
    }
}
