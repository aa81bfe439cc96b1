//! Neighbour-aggregation recommender.
//!
//! Suggests features a focal node does not hold yet but its neighbours do,
//! ranked by how many neighbours (or how much edge weight) back each one.
//! All functions only read their inputs, so calls for different focal nodes
//! can run side by side over the same graph and matrix.

use crate::error::{Error, Result};
use crate::graph::NeighbourGraph;
use crate::matrix::FeatureMatrix;
use crate::similarity::FeatureSet;
use rayon::prelude::*;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ranking {
    /// Number of supporting neighbours
    #[default]
    Support,
    /// Summed edge weight to supporting neighbours; unweighted edges count 1.0
    Weighted,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct RecommendOptions {
    /// Keep only the best `top_k` features; everything ranked when `None`
    pub top_k: Option<usize>,
    pub ranking: Ranking,
}

impl RecommendOptions {
    pub fn top(k: usize) -> Self {
        Self {
            top_k: Some(k),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Recommendation {
    pub feature: usize,
    /// Neighbours holding `feature`, ascending
    pub supporters: Vec<usize>,
    pub score: f64,
}

impl Recommendation {
    pub fn support(&self) -> usize {
        self.supporters.len()
    }
}

fn ensure_node<G: NeighbourGraph + ?Sized>(graph: &G, matrix: &FeatureMatrix, node: usize) -> Result<()> {
    if graph.contains_node(node) && matrix.contains_node(node) {
        Ok(())
    } else {
        Err(Error::NodeNotFound(node))
    }
}

pub fn neighbours_of<G: NeighbourGraph + ?Sized>(graph: &G, node: usize) -> Result<Vec<usize>> {
    graph.neighbours(node)
}

/// Weighted edges leaving `node`, heaviest first; equal weights by neighbour index.
/// Empty when `node` has no weighted edges.
pub fn sorted_neighbours_by_weight<G: NeighbourGraph + ?Sized>(
    graph: &G,
    node: usize,
) -> Result<Vec<(usize, f64)>> {
    if !graph.contains_node(node) {
        return Err(Error::NodeNotFound(node));
    }
    let mut rows: Vec<(usize, f64)> = graph
        .weighted_edges()
        .into_iter()
        .filter(|e| e.source == node && e.target != node)
        .map(|e| (e.target, e.weight))
        .collect();
    rows.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
    Ok(rows)
}

pub fn features_of(matrix: &FeatureMatrix, node: usize) -> Result<FeatureSet> {
    matrix.features_of(node)
}

/// Ranks features held by `node`'s neighbours but not by `node` itself.
///
/// Order: score descending, then support count descending, then feature index
/// ascending. A node without neighbours gets an empty list.
pub fn recommend<G: NeighbourGraph + ?Sized>(
    graph: &G,
    matrix: &FeatureMatrix,
    node: usize,
    options: RecommendOptions,
) -> Result<Vec<Recommendation>> {
    ensure_node(graph, matrix, node)?;
    let own = matrix.features_of(node)?;
    let neighbours = graph.neighbours(node)?;

    let mut candidates: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for &neighbour in &neighbours {
        for feature in matrix.features_of(neighbour)? {
            if !own.contains(&feature) {
                candidates.entry(feature).or_default().push(neighbour);
            }
        }
    }

    let mut ranked: Vec<Recommendation> = candidates
        .into_iter()
        .map(|(feature, supporters)| {
            let score = match options.ranking {
                Ranking::Support => supporters.len() as f64,
                Ranking::Weighted => supporters
                    .iter()
                    .map(|&n| graph.edge_weight(node, n).unwrap_or(1.0))
                    .sum(),
            };
            Recommendation {
                feature,
                supporters,
                score,
            }
        })
        .collect();

    ranked.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| b.support().cmp(&a.support()))
            .then_with(|| a.feature.cmp(&b.feature))
    });
    if let Some(k) = options.top_k {
        ranked.truncate(k);
    }

    debug!(node, neighbours = neighbours.len(), recommended = ranked.len(), "recommendation");
    Ok(ranked)
}

/// [`recommend`] for every node of the graph, computed in parallel.
pub fn recommend_all<G: NeighbourGraph + Sync + ?Sized>(
    graph: &G,
    matrix: &FeatureMatrix,
    options: RecommendOptions,
) -> Result<Vec<Vec<Recommendation>>> {
    (0..graph.node_count())
        .into_par_iter()
        .map(|node| recommend(graph, matrix, node, options))
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct Friend {
    pub node: usize,
    pub name: String,
    pub weight: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NamedRecommendation {
    pub feature: String,
    pub supporters: Vec<String>,
    pub score: f64,
}

/// Everything shown for the focal node.
#[derive(Debug, Clone, PartialEq)]
pub struct FocalView {
    pub node: usize,
    pub name: String,
    pub friends: Vec<Friend>,
    pub features: Vec<String>,
    pub recommendations: Vec<NamedRecommendation>,
}

/// Recomputes the focal node's friends, features and recommendations.
///
/// Friends come weight-sorted first, followed by any unweighted neighbours.
pub fn on_focal_node_changed<G: NeighbourGraph + ?Sized>(
    graph: &G,
    matrix: &FeatureMatrix,
    node: usize,
    options: RecommendOptions,
) -> Result<FocalView> {
    ensure_node(graph, matrix, node)?;

    let mut friends = Vec::new();
    for (neighbour, weight) in sorted_neighbours_by_weight(graph, node)? {
        friends.push(Friend {
            node: neighbour,
            name: matrix.node_name(neighbour)?.to_string(),
            weight: Some(weight),
        });
    }
    for neighbour in graph.neighbours(node)? {
        if !friends.iter().any(|f| f.node == neighbour) {
            friends.push(Friend {
                node: neighbour,
                name: matrix.node_name(neighbour)?.to_string(),
                weight: None,
            });
        }
    }

    let features: Vec<String> = matrix
        .features_of(node)?
        .into_iter()
        .map(|f| matrix.feature_name(f).map(str::to_string))
        .collect::<Result<_>>()?;

    let recommendations: Vec<NamedRecommendation> = recommend(graph, matrix, node, options)?
        .into_iter()
        .map(|rec| {
            Ok(NamedRecommendation {
                feature: matrix.feature_name(rec.feature)?.to_string(),
                supporters: rec
                    .supporters
                    .iter()
                    .map(|&n| matrix.node_name(n).map(str::to_string))
                    .collect::<Result<_>>()?,
                score: rec.score,
            })
        })
        .collect::<Result<_>>()?;

    Ok(FocalView {
        node,
        name: matrix.node_name(node)?.to_string(),
        friends,
        features,
        recommendations,
    })
}

impl fmt::Display for FocalView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.name)?;

        let features = self.features.join(", ");
        writeln!(f, "  Features: {}", if features.is_empty() { "No features" } else { features.as_str() })?;

        let friends: Vec<&str> = self.friends.iter().map(|fr| fr.name.as_str()).collect();
        writeln!(
            f,
            "  Friends: {}",
            if friends.is_empty() { "No friends".to_string() } else { friends.join(", ") }
        )?;

        if self.recommendations.is_empty() {
            return writeln!(f, "  Recommendations: No recommendations");
        }
        writeln!(f, "  Recommendations:")?;
        for rec in &self.recommendations {
            writeln!(f, "    {} ({})", rec.feature, rec.supporters.join(", "))?;
        }
        Ok(())
    }
}
