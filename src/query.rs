//! The query facade: uniform entrypoints over the engines, the algorithm
//! selector and the named graph registry.
use std::collections::BTreeSet;
use std::path::Path;

use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};

use crate::cfg::Cfg;
use crate::cfpq;
use crate::dot;
use crate::error::{Error, Result};
use crate::graph::{two_cycles_graph, Graph, GraphStats};
use crate::rpq::{self, resolve_vertices, BfsRpqResult};
use crate::utils::CancelToken;

/// The context-free path query engine to run.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Algorithm {
    /// The Hellings worklist algorithm.
    Hellings,
    /// Per-nonterminal boolean matrix iteration.
    Matrix,
    /// The RSM-versus-graph tensor product.
    Tensor,
}

/// Facade defaults, serialisable so embedders can ship them as configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryConfig {
    /// The start nonterminal used when a query does not name one.
    pub start_symbol: String,
    /// The engine used when a query does not name one.
    pub algorithm: Algorithm,
}

impl Default for QueryConfig {
    fn default() -> Self {
        QueryConfig {
            start_symbol: "S".to_string(),
            algorithm: Algorithm::Hellings,
        }
    }
}

/// Context-free path query: the pairs `(u, v)` with `u` in `starts`, `v` in
/// `finals`, connected by a path deriving from `start_symbol`.
///
/// `starts`/`finals` default to all vertices.
///
/// # Errors
///
/// [`Error::InvalidInput`] on unknown vertices; engine errors are returned
/// verbatim.
pub fn cfpq(
    cfg: &Cfg,
    graph: &Graph,
    start_symbol: &str,
    starts: Option<&BTreeSet<u32>>,
    finals: Option<&BTreeSet<u32>>,
    algorithm: Algorithm,
) -> Result<AHashSet<(u32, u32)>> {
    cfpq_with_cancel(
        cfg,
        graph,
        start_symbol,
        starts,
        finals,
        algorithm,
        &CancelToken::new(),
    )
}

/// [`cfpq`] with a caller-provided cancellation token.
#[allow(clippy::too_many_arguments)]
pub fn cfpq_with_cancel(
    cfg: &Cfg,
    graph: &Graph,
    start_symbol: &str,
    starts: Option<&BTreeSet<u32>>,
    finals: Option<&BTreeSet<u32>>,
    algorithm: Algorithm,
    cancel: &CancelToken,
) -> Result<AHashSet<(u32, u32)>> {
    let starts = resolve_vertices(graph, starts, "start")?;
    let finals = resolve_vertices(graph, finals, "final")?;
    let triples = match algorithm {
        Algorithm::Hellings => cfpq::hellings(graph, cfg, cancel)?,
        Algorithm::Matrix => cfpq::matrix_cfpq(graph, cfg, cancel)?,
        Algorithm::Tensor => cfpq::tensor_cfpq(graph, cfg, cancel)?,
    };
    Ok(triples
        .into_iter()
        .filter(|(u, var, v)| {
            var.name() == start_symbol && starts.contains(u) && finals.contains(v)
        })
        .map(|(u, _, v)| (u, v))
        .collect())
}

/// Regular-path query by intersection and transitive closure.
pub fn rpq(
    graph: &Graph,
    regex: &str,
    starts: Option<&BTreeSet<u32>>,
    finals: Option<&BTreeSet<u32>>,
) -> Result<AHashSet<(u32, u32)>> {
    rpq::rpq(graph, regex, starts, finals, &CancelToken::new())
}

/// [`rpq`] with a caller-provided cancellation token.
pub fn rpq_with_cancel(
    graph: &Graph,
    regex: &str,
    starts: Option<&BTreeSet<u32>>,
    finals: Option<&BTreeSet<u32>>,
    cancel: &CancelToken,
) -> Result<AHashSet<(u32, u32)>> {
    rpq::rpq(graph, regex, starts, finals, cancel)
}

/// Multi-source BFS regular-path query; see
/// [`rpq::bfs_rpq`](crate::rpq::bfs_rpq) for the result shapes.
pub fn bfs_rpq(
    graph: &Graph,
    regex: &str,
    starts: Option<&BTreeSet<u32>>,
    finals: Option<&BTreeSet<u32>>,
    separated: bool,
) -> Result<BfsRpqResult> {
    rpq::bfs_rpq(graph, regex, starts, finals, separated, &CancelToken::new())
}

/// [`bfs_rpq`] with a caller-provided cancellation token.
pub fn bfs_rpq_with_cancel(
    graph: &Graph,
    regex: &str,
    starts: Option<&BTreeSet<u32>>,
    finals: Option<&BTreeSet<u32>>,
    separated: bool,
    cancel: &CancelToken,
) -> Result<BfsRpqResult> {
    rpq::bfs_rpq(graph, regex, starts, finals, separated, cancel)
}

/// A name-indexed pool of graphs.
///
/// The registry is an explicit value: engines never see names, only the
/// concrete graphs resolved through it.
#[derive(Debug, Clone, Default)]
pub struct GraphRegistry {
    graphs: AHashMap<String, Graph>,
}

impl GraphRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a graph under a name, replacing any previous entry.
    pub fn add(&mut self, name: impl Into<String>, graph: Graph) {
        self.graphs.insert(name.into(), graph);
    }

    /// Resolve a name to its graph.
    ///
    /// # Errors
    ///
    /// [`Error::UnknownName`] when nothing is registered under the name.
    pub fn get_graph(&self, name: &str) -> Result<&Graph> {
        self.graphs
            .get(name)
            .ok_or_else(|| Error::UnknownName(format!("no graph named {name:?}")))
    }

    /// Build and register the two-cycles graph.
    pub fn create_two_cycles(
        &mut self,
        name: impl Into<String>,
        first: u32,
        second: u32,
        labels: (&str, &str),
    ) -> &Graph {
        let name = name.into();
        self.graphs
            .insert(name.clone(), two_cycles_graph(first, second, labels));
        &self.graphs[&name]
    }

    /// Load a DOT file and register it under the name.
    pub fn load_dot(&mut self, name: impl Into<String>, path: impl AsRef<Path>) -> Result<&Graph> {
        let name = name.into();
        let graph = dot::load_dot(path)?;
        self.graphs.insert(name.clone(), graph);
        Ok(&self.graphs[&name])
    }

    /// Save a registered graph to a DOT file.
    pub fn save_dot(&self, name: &str, path: impl AsRef<Path>) -> Result<()> {
        dot::save_dot(self.get_graph(name)?, path)
    }

    /// Vertex/edge counts and the label set of a registered graph.
    pub fn stats(&self, name: &str) -> Result<GraphStats> {
        Ok(self.get_graph(name)?.stats())
    }

    /// The registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.graphs.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
