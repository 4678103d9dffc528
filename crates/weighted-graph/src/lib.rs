//! Sparse non-negative weighted digraph with sorted rows and weighted sampling.
//!
//! This crate provides a generic frequency graph for Markov-style transition
//! models. Edges are keyed by (from, to) state pairs and carry a non-negative
//! `f64` weight that accumulates additively on repeated insertion — inserting
//! the same pair twice counts the transition twice, it never overwrites.
//!
//! The entries of each row are kept sorted by to-state for O(log n) lookup,
//! and — more importantly — so that [`WeightedGraph::sample_next`] maps a
//! uniform draw onto cumulative weights in a stable order. A fixed random
//! seed therefore yields a reproducible draw regardless of insertion order.
//!
//! [`WeightedGraph::stochastic`] rescales every row to sum to 1.0. A row
//! that exists but carries zero total weight is a *dead state*; callers must
//! resolve dead states (absorbing edge, wraparound, ...) before normalizing.

use std::collections::{HashMap, HashSet};

use rand::Rng;
use serde::{Deserialize, Serialize};
use state_core::State;
use thiserror::Error;

/// Errors raised by graph operations.
///
/// States are captured via their `Debug` rendering so the error type stays
/// non-generic and composes across differently-typed graphs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// The queried from-state was never inserted into the graph.
    #[error("state {state} is not present in the graph")]
    UnknownState { state: String },

    /// A from-state reached normalization with zero outgoing weight.
    /// Always a construction bug in the caller, never user-triggerable
    /// through the model APIs.
    #[error("state {state} has no outgoing weight to normalize")]
    DeadState { state: String },
}

/// One outgoing adjacency row: `(to-state, weight)` entries sorted by state.
#[derive(Debug, Clone, PartialEq)]
struct Row<S> {
    entries: Vec<(S, f64)>,
}

impl<S: State> Row<S> {
    fn new() -> Self {
        Row {
            entries: Vec::new(),
        }
    }

    fn accumulate(&mut self, to: S, delta: f64) {
        match self.entries.binary_search_by(|(s, _)| s.cmp(&to)) {
            Ok(idx) => self.entries[idx].1 += delta,
            Err(idx) => self.entries.insert(idx, (to, delta)),
        }
    }

    fn total(&self) -> f64 {
        self.entries.iter().map(|(_, w)| w).sum()
    }
}

/// A sparse non-negative weighted directed graph over arbitrary states.
///
/// # Example
///
/// ```
/// use rand::SeedableRng;
/// use rand::rngs::SmallRng;
/// use weighted_graph::WeightedGraph;
///
/// let mut graph = WeightedGraph::new();
/// graph.add("alice", "bob");
/// graph.add("alice", "bob"); // weight accumulates to 2
/// graph.add("alice", "carol");
/// graph.stochastic().unwrap();
///
/// assert_eq!(graph.weight(&"alice", &"bob"), Some(2.0 / 3.0));
///
/// let mut rng = SmallRng::seed_from_u64(7);
/// let next = graph.sample_next(&"alice", &mut rng).unwrap();
/// assert!(matches!(next, Some(&"bob") | Some(&"carol")));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "EdgeList<S>", into = "EdgeList<S>")]
#[serde(bound(serialize = "S: Serialize", deserialize = "S: Deserialize<'de>"))]
pub struct WeightedGraph<S: State> {
    /// Outgoing adjacency, keyed by from-state.
    rows: HashMap<S, Row<S>>,
    /// Every state ever inserted, as either endpoint. States present here
    /// but absent from `rows` are absorbing: they have no outgoing edges.
    states: HashSet<S>,
}

/// Serialized form of a graph: a flat `(from, to, weight)` edge list,
/// sorted for deterministic output. Every state is an endpoint of some
/// edge, so the list reconstructs the graph completely.
#[derive(Serialize, Deserialize)]
struct EdgeList<S> {
    edges: Vec<(S, S, f64)>,
}

impl<S: State> From<WeightedGraph<S>> for EdgeList<S> {
    fn from(graph: WeightedGraph<S>) -> Self {
        let mut edges: Vec<(S, S, f64)> = graph
            .rows
            .into_iter()
            .flat_map(|(from, row)| {
                row.entries
                    .into_iter()
                    .map(move |(to, weight)| (from.clone(), to, weight))
            })
            .collect();
        edges.sort_by(|a, b| (&a.0, &a.1).cmp(&(&b.0, &b.1)));
        EdgeList { edges }
    }
}

impl<S: State> From<EdgeList<S>> for WeightedGraph<S> {
    fn from(list: EdgeList<S>) -> Self {
        let mut graph = WeightedGraph::new();
        for (from, to, weight) in list.edges {
            graph.add_weighted(from, to, weight);
        }
        graph
    }
}

impl<S: State> WeightedGraph<S> {
    /// Create an empty graph.
    pub fn new() -> Self {
        WeightedGraph {
            rows: HashMap::new(),
            states: HashSet::new(),
        }
    }

    /// Increase the weight of edge `(from, to)` by 1, creating it if absent.
    pub fn add(&mut self, from: S, to: S) {
        self.add_weighted(from, to, 1.0);
    }

    /// Increase the weight of edge `(from, to)` by `delta`, creating it if
    /// absent. Weight accumulates; it is never overwritten.
    ///
    /// # Panics
    /// Panics if `delta` is negative or not finite.
    pub fn add_weighted(&mut self, from: S, to: S, delta: f64) {
        assert!(
            delta >= 0.0 && delta.is_finite(),
            "edge weight delta must be finite and non-negative: {delta}"
        );
        self.states.insert(from.clone());
        self.states.insert(to.clone());
        self.rows
            .entry(from)
            .or_insert_with(Row::new)
            .accumulate(to, delta);
    }

    /// Whether `state` has been inserted as either endpoint of any edge.
    #[inline]
    pub fn contains(&self, state: &S) -> bool {
        self.states.contains(state)
    }

    /// The weight of edge `(from, to)`, if present.
    pub fn weight(&self, from: &S, to: &S) -> Option<f64> {
        let row = self.rows.get(from)?;
        row.entries
            .binary_search_by(|(s, _)| s.cmp(to))
            .ok()
            .map(|idx| row.entries[idx].1)
    }

    /// Total outgoing weight of `from`. Zero for absorbing or unknown states.
    pub fn out_weight(&self, from: &S) -> f64 {
        self.rows.get(from).map_or(0.0, Row::total)
    }

    /// The outgoing entries of `from` in sorted state order.
    pub fn successors(&self, from: &S) -> impl Iterator<Item = (&S, f64)> {
        self.rows
            .get(from)
            .into_iter()
            .flat_map(|row| row.entries.iter().map(|(s, w)| (s, *w)))
    }

    /// Number of distinct states inserted.
    #[inline]
    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.rows.values().map(|row| row.entries.len()).sum()
    }

    /// Whether the graph has no states at all.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Normalize every row to sum to 1.0 (row-stochastic form).
    ///
    /// Fails with [`GraphError::DeadState`] if any row exists with zero
    /// total weight — such rows must be resolved by the caller beforehand,
    /// typically with an explicit absorbing or wraparound edge.
    pub fn stochastic(&mut self) -> Result<(), GraphError> {
        for (from, row) in &mut self.rows {
            let total = row.total();
            if total <= 0.0 {
                return Err(GraphError::DeadState {
                    state: format!("{from:?}"),
                });
            }
            for (_, weight) in &mut row.entries {
                *weight /= total;
            }
        }
        Ok(())
    }

    /// Draw one successor of `from`, with edge weights as probabilities.
    ///
    /// The uniform draw is mapped piecewise onto cumulative weights in
    /// sorted to-state order, so a fixed RNG yields a reproducible result.
    ///
    /// Returns `Ok(None)` when `from` is known but has no positive outgoing
    /// weight — the natural absorbing terminus. Sampling from a state never
    /// inserted fails with [`GraphError::UnknownState`].
    pub fn sample_next<R: Rng + ?Sized>(
        &self,
        from: &S,
        rng: &mut R,
    ) -> Result<Option<&S>, GraphError> {
        if !self.states.contains(from) {
            return Err(GraphError::UnknownState {
                state: format!("{from:?}"),
            });
        }

        let Some(row) = self.rows.get(from) else {
            return Ok(None);
        };
        let total = row.total();
        if total <= 0.0 {
            return Ok(None);
        }

        let draw = rng.random_range(0.0..total);
        let mut cumulative = 0.0;
        for (to, weight) in &row.entries {
            cumulative += weight;
            if draw < cumulative {
                return Ok(Some(to));
            }
        }
        // Floating-point shortfall: the draw landed past the accumulated
        // total. The last entry owns the remainder of the interval.
        Ok(row.entries.last().map(|(to, _)| to))
    }
}

impl<S: State> Default for WeightedGraph<S> {
    fn default() -> Self {
        Self::new()
    }
}
