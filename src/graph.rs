//! Graph collaborator used by the recommender.
//!
//! Nodes are addressed by dense indices `[0, N)` that line up with
//! [`FeatureMatrix`] rows. Edges are undirected and may carry a weight.

use crate::error::{Error, Result};
use crate::matrix::FeatureMatrix;
use crate::similarity::jaccard_index;
use petgraph::graph::{NodeIndex, UnGraph};
use rayon::prelude::*;
use std::collections::{BTreeSet, HashMap};
use std::io::Read;
use tracing::info;

/// A `(source, target, weight)` triple.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightedEdge {
    pub source: usize,
    pub target: usize,
    pub weight: f64,
}

/// Read-only neighbourhood queries over an index-addressed graph.
pub trait NeighbourGraph {
    fn node_count(&self) -> usize;

    /// Distinct neighbours of `node` in ascending order, self excluded.
    fn neighbours(&self, node: usize) -> Result<Vec<usize>>;

    /// Every weighted edge, once per orientation.
    fn weighted_edges(&self) -> Vec<WeightedEdge>;

    fn edge_weight(&self, a: usize, b: usize) -> Option<f64> {
        self.weighted_edges()
            .into_iter()
            .find(|e| e.source == a && e.target == b)
            .map(|e| e.weight)
    }

    fn contains_node(&self, node: usize) -> bool {
        node < self.node_count()
    }
}

/// Undirected social graph; edge payload is `None` for unweighted ties.
#[derive(Debug, Clone, Default)]
pub struct SocialGraph {
    pub graph: UnGraph<String, Option<f64>>,
}

impl SocialGraph {
    pub fn with_nodes<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut graph = UnGraph::default();
        for name in names {
            graph.add_node(name.into());
        }
        SocialGraph { graph }
    }

    fn index(&self, node: usize) -> Result<NodeIndex> {
        if node < self.graph.node_count() {
            Ok(NodeIndex::new(node))
        } else {
            Err(Error::NodeNotFound(node))
        }
    }

    pub fn add_edge(&mut self, a: usize, b: usize) -> Result<()> {
        let (a, b) = (self.index(a)?, self.index(b)?);
        if self.graph.find_edge(a, b).is_none() {
            self.graph.add_edge(a, b, None);
        }
        Ok(())
    }

    /// Adds a weighted edge; an existing edge between the same pair accumulates the weight.
    pub fn add_weighted_edge(&mut self, a: usize, b: usize, weight: f64) -> Result<()> {
        let (a, b) = (self.index(a)?, self.index(b)?);
        if let Some(edge) = self.graph.find_edge(a, b) {
            let existing = &mut self.graph[edge];
            *existing = Some(existing.unwrap_or(0.0) + weight);
        } else {
            self.graph.add_edge(a, b, Some(weight));
        }
        Ok(())
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn node_name(&self, node: usize) -> Result<&str> {
        Ok(self.graph[self.index(node)?].as_str())
    }

    /// Reads a `source,target[,weight]` edge list whose endpoints are node names.
    ///
    /// Node indices follow `node_names`, so the graph lines up with the feature
    /// matrix those names came from. Repeated pairs accumulate their weights.
    pub fn from_edge_csv<R: Read>(reader: R, node_names: &[String]) -> Result<Self> {
        let mut graph = Self::with_nodes(node_names.iter().cloned());
        let node_indices: HashMap<&str, usize> = node_names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.as_str(), i))
            .collect();
        let lookup = |name: &str| {
            node_indices
                .get(name.trim())
                .copied()
                .ok_or_else(|| Error::UnknownNodeName(name.trim().to_string()))
        };

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(reader);

        for record in reader.records() {
            let record = record?;
            let line = record.position().map_or(0, |p| p.line());
            let (Some(user1), Some(user2)) = (record.get(0), record.get(1)) else {
                return Err(Error::MalformedEdge {
                    line,
                    reason: format!("expected two endpoints, found {} field(s)", record.len()),
                });
            };
            let (node1, node2) = (lookup(user1)?, lookup(user2)?);

            // Only a missing or blank weight column means an unweighted tie.
            match record.get(2).map(str::trim).filter(|w| !w.is_empty()) {
                Some(raw) => {
                    let weight = raw.parse::<f64>().map_err(|_| Error::MalformedEdge {
                        line,
                        reason: format!("weight {raw:?} is not a number"),
                    })?;
                    graph.add_weighted_edge(node1, node2, weight)?
                }
                None => graph.add_edge(node1, node2)?,
            }
        }

        info!(nodes = graph.node_count(), edges = graph.edge_count(), "loaded edge list");
        Ok(graph)
    }

    /// Connects every pair of rows whose Jaccard index is at least `min_similarity`,
    /// weighting the edge with that index. Pairs of empty rows stay unconnected.
    pub fn similarity_graph(matrix: &FeatureMatrix, min_similarity: f64) -> Result<Self> {
        let n = matrix.node_count();
        let sets = (0..n)
            .map(|i| matrix.features_of(i))
            .collect::<Result<Vec<_>>>()?;

        let sets = &sets;
        let edges: Vec<(usize, usize, f64)> = (0..n)
            .into_par_iter()
            .flat_map_iter(move |i| {
                ((i + 1)..n).filter_map(move |j| {
                    jaccard_index(&sets[i], &sets[j])
                        .ok()
                        .filter(|&jaccard| jaccard > 0.0 && jaccard >= min_similarity)
                        .map(|jaccard| (i, j, jaccard))
                })
            })
            .collect();

        let mut graph = Self::with_nodes(matrix.node_names().iter().cloned());
        for (i, j, weight) in edges {
            graph.add_weighted_edge(i, j, weight)?;
        }

        info!(nodes = n, edges = graph.edge_count(), min_similarity, "built similarity graph");
        Ok(graph)
    }
}

impl NeighbourGraph for SocialGraph {
    fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    fn neighbours(&self, node: usize) -> Result<Vec<usize>> {
        let idx = self.index(node)?;
        let distinct: BTreeSet<usize> = self
            .graph
            .neighbors(idx)
            .map(|n| n.index())
            .filter(|&n| n != node)
            .collect();
        Ok(distinct.into_iter().collect())
    }

    fn weighted_edges(&self) -> Vec<WeightedEdge> {
        self.graph
            .edge_indices()
            .filter_map(|edge| {
                let (a, b) = self.graph.edge_endpoints(edge)?;
                let weight = self.graph[edge]?;
                Some((a.index(), b.index(), weight))
            })
            .filter(|&(a, b, _)| a != b)
            .flat_map(|(a, b, weight)| {
                [
                    WeightedEdge { source: a, target: b, weight },
                    WeightedEdge { source: b, target: a, weight },
                ]
            })
            .collect()
    }

    fn edge_weight(&self, a: usize, b: usize) -> Option<f64> {
        let (a, b) = (self.index(a).ok()?, self.index(b).ok()?);
        self.graph.find_edge(a, b).and_then(|edge| self.graph[edge])
    }
}
