//! Labelled directed multigraphs and their automaton view.
use std::collections::BTreeSet;

use ahash::AHashSet;

use crate::error::{Error, Result};
use crate::nfa::Nfa;
use crate::symbol::Symbol;

/// A finite labelled directed multigraph.
///
/// Vertices form an ordered set (insertion order is kept); edges form a
/// multiset, so self-loops and parallel edges with distinct labels are fine.
/// Engines treat graphs as read-only.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Graph {
    vertices: Vec<u32>,
    vertex_set: AHashSet<u32>,
    edges: Vec<(u32, String, u32)>,
}

/// Summary of a graph: vertex count, edge count and the label set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphStats {
    /// Number of vertices.
    pub vertices: usize,
    /// Number of edges.
    pub edges: usize,
    /// The labels occurring on edges, sorted.
    pub labels: BTreeSet<String>,
}

impl Graph {
    /// An empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a vertex. Re-adding an existing vertex is a no-op.
    pub fn add_vertex(&mut self, v: u32) {
        if self.vertex_set.insert(v) {
            self.vertices.push(v);
        }
    }

    /// Add a labelled edge, adding its endpoints as vertices.
    pub fn add_edge(&mut self, from: u32, label: &str, to: u32) {
        self.add_vertex(from);
        self.add_vertex(to);
        self.edges.push((from, label.to_string(), to));
    }

    /// The vertices in insertion order.
    pub fn vertices(&self) -> &[u32] {
        &self.vertices
    }

    /// Whether the vertex exists.
    pub fn has_vertex(&self, v: u32) -> bool {
        self.vertex_set.contains(&v)
    }

    /// The edges in insertion order.
    pub fn edges(&self) -> &[(u32, String, u32)] {
        &self.edges
    }

    /// Vertex/edge counts and the label set.
    pub fn stats(&self) -> GraphStats {
        GraphStats {
            vertices: self.vertices.len(),
            edges: self.edges.len(),
            labels: self.edges.iter().map(|(_, l, _)| l.clone()).collect(),
        }
    }

    /// View the graph as an NFA.
    ///
    /// Every vertex becomes a state; every edge a terminal-labelled
    /// transition. `starts`/`finals` select the start and final states; when
    /// absent, every vertex is a start (resp. final) state.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidInput`] if a selected vertex does not exist.
    pub fn to_nfa(
        &self,
        starts: Option<&BTreeSet<u32>>,
        finals: Option<&BTreeSet<u32>>,
    ) -> Result<Nfa> {
        let mut nfa = Nfa::new();
        for &v in &self.vertices {
            nfa.add_state(v);
        }
        for (from, label, to) in &self.edges {
            nfa.add_transition(*from, Symbol::term(label.clone()), *to);
        }
        match starts {
            None => {
                for &v in &self.vertices {
                    nfa.add_start(v);
                }
            }
            Some(set) => {
                for &v in set {
                    if !self.has_vertex(v) {
                        return Err(Error::invalid(format!(
                            "start vertex {v} does not exist in the graph"
                        )));
                    }
                    nfa.add_start(v);
                }
            }
        }
        match finals {
            None => {
                for &v in &self.vertices {
                    nfa.add_final(v);
                }
            }
            Some(set) => {
                for &v in set {
                    if !self.has_vertex(v) {
                        return Err(Error::invalid(format!(
                            "final vertex {v} does not exist in the graph"
                        )));
                    }
                    nfa.add_final(v);
                }
            }
        }
        Ok(nfa)
    }
}

/// Build the classic two-cycles graph: a `first`-cycle and a `second`-cycle
/// sharing vertex 0.
///
/// The first cycle runs `0 → 1 → … → first → 0` with `labels.0`; the second
/// runs `0 → first+1 → … → first+second → 0` with `labels.1`.
pub fn two_cycles_graph(first: u32, second: u32, labels: (&str, &str)) -> Graph {
    let mut graph = Graph::new();
    graph.add_vertex(0);
    if first > 0 {
        for v in 0..first {
            graph.add_edge(v, labels.0, v + 1);
        }
        graph.add_edge(first, labels.0, 0);
    }
    if second > 0 {
        let mut prev = 0;
        for v in first + 1..=first + second {
            graph.add_edge(prev, labels.1, v);
            prev = v;
        }
        graph.add_edge(prev, labels.1, 0);
    }
    graph
}
