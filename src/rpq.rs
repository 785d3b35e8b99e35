//! Regular-path queries: intersect-and-close and multi-source BFS.
use std::collections::BTreeSet;

use ahash::AHashSet;
use fixedbitset_stack::FixedBitSet;

use crate::automaton::MatrixAutomaton;
use crate::error::{Error, Result};
use crate::graph::Graph;
use crate::matrix::{BoolMatrix, CooMatrix};
use crate::regex::regex_to_min_dfa;
use crate::utils::CancelToken;

/// The answer of a BFS regular-path query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BfsRpqResult {
    /// One `(source, reachable vertices)` entry per source.
    Separated(AHashSet<(u32, BTreeSet<u32>)>),
    /// A single `(sources, union of reachable vertices)` pair.
    Merged(BTreeSet<u32>, BTreeSet<u32>),
}

/// Regular-path query by intersection and transitive closure.
///
/// The regex is compiled to its minimal DFA; the graph automaton takes
/// `starts`/`finals` as its start/final states (all vertices when absent).
/// A pair `(u, v)` is reported when some path from `u` to `v` spells a word
/// of the regex language.
///
/// # Errors
///
/// [`Error::InvalidInput`] on malformed regex or unknown vertices;
/// [`Error::Cancelled`] if the token fires between closure iterations.
pub fn rpq(
    graph: &Graph,
    regex: &str,
    starts: Option<&BTreeSet<u32>>,
    finals: Option<&BTreeSet<u32>>,
    cancel: &CancelToken,
) -> Result<AHashSet<(u32, u32)>> {
    let regex_m = MatrixAutomaton::from_nfa(&regex_to_min_dfa(regex)?);
    let graph_m = MatrixAutomaton::from_nfa(&graph.to_nfa(starts, finals)?);
    let intersection = graph_m.intersect(&regex_m);
    let closure = intersection.transitive_closure(cancel)?;
    let r = regex_m.num_states();
    let mut pairs = AHashSet::new();
    for (i, j) in closure.iter() {
        let (i, j) = (i as usize, j as usize);
        if intersection.is_start(i) && intersection.is_final(j) {
            pairs.insert((*graph_m.state(i / r), *graph_m.state(j / r)));
        }
    }
    Ok(pairs)
}

pub(crate) fn resolve_vertices(
    graph: &Graph,
    wanted: Option<&BTreeSet<u32>>,
    role: &str,
) -> Result<BTreeSet<u32>> {
    match wanted {
        None => Ok(graph.vertices().iter().copied().collect()),
        Some(set) => {
            for &v in set {
                if !graph.has_vertex(v) {
                    return Err(Error::invalid(format!(
                        "{role} vertex {v} does not exist in the graph"
                    )));
                }
            }
            Ok(set.clone())
        }
    }
}

/// One BFS sweep: the set of graph-vertex indices reached from the seeds
/// through label words of the query automaton's language fragments.
///
/// The front is an `r×(r+g)` matrix whose left block is the identity; every
/// row carries the seed columns on the right. Each pass multiplies the front
/// by every shared-label direct sum, re-normalises the left block to an
/// identity (a non-zero left entry `(i, j)` moves row `i`'s right half into
/// row `j`), ORs the normalised product into the front and accumulates its
/// right halves. Termination: the front's `nnz` is monotone and bounded.
fn bfs_reach(
    sums: &[(crate::symbol::Symbol, BoolMatrix)],
    r: usize,
    g: usize,
    seeds: &[usize],
    cancel: &CancelToken,
) -> Result<FixedBitSet> {
    let mut seed_block = CooMatrix::new(r, g);
    for row in 0..r {
        for &s in seeds {
            seed_block.set(row as u32, s as u32);
        }
    }
    let mut front = BoolMatrix::identity(r).hstack(&seed_block.finalize())?;
    let mut reached = FixedBitSet::with_capacity(g);
    loop {
        cancel.checkpoint()?;
        let before = front.nnz();
        for (_, sum) in sums {
            let product = front.matmul(sum)?;
            let mut normalised = CooMatrix::new(r, r + g);
            for i in 0..r {
                let row = product.row(i);
                let split = row.partition_point(|&c| (c as usize) < r);
                let (left, right) = row.split_at(split);
                for &target in left {
                    normalised.set(target, target);
                    for &c in right {
                        normalised.set(target, c);
                        reached.insert(c as usize - r);
                    }
                }
            }
            if !normalised.is_empty() {
                front = front.or(&normalised.finalize())?;
            }
        }
        if front.nnz() == before {
            break;
        }
        log::trace!("bfs front grew to {} entries", front.nnz());
    }
    Ok(reached)
}

/// Multi-source BFS regular-path query.
///
/// `separated` selects the result shape: one `(source, reachable)` entry per
/// source, or a single merged `(sources, reachable)` pair. `finals`, when
/// given, filters the reachable sets; enlarging the source set never removes
/// answers.
///
/// # Errors
///
/// Same conditions as [`rpq`].
pub fn bfs_rpq(
    graph: &Graph,
    regex: &str,
    starts: Option<&BTreeSet<u32>>,
    finals: Option<&BTreeSet<u32>>,
    separated: bool,
    cancel: &CancelToken,
) -> Result<BfsRpqResult> {
    let regex_m = MatrixAutomaton::from_nfa(&regex_to_min_dfa(regex)?);
    let graph_m = MatrixAutomaton::from_nfa(&graph.to_nfa(None, None)?);
    let sources = resolve_vertices(graph, starts, "start")?;
    let finals = resolve_vertices(graph, finals, "final")?;
    let sums = regex_m.direct_sum(&graph_m)?;
    let r = regex_m.num_states();
    let g = graph_m.num_states();
    let to_vertices = |reached: &FixedBitSet| -> BTreeSet<u32> {
        reached
            .ones()
            .map(|i| *graph_m.state(i))
            .filter(|v| finals.contains(v))
            .collect()
    };
    if separated {
        let mut result = AHashSet::new();
        for &source in &sources {
            let seed = graph_m
                .index_of(&source)
                .ok_or_else(|| Error::internal(format!("vertex {source} lost its index")))?;
            let reached = bfs_reach(&sums, r, g, &[seed], cancel)?;
            result.insert((source, to_vertices(&reached)));
        }
        Ok(BfsRpqResult::Separated(result))
    } else {
        let seeds: Vec<usize> = sources
            .iter()
            .map(|v| {
                graph_m
                    .index_of(v)
                    .ok_or_else(|| Error::internal(format!("vertex {v} lost its index")))
            })
            .collect::<Result<_>>()?;
        let reached = bfs_reach(&sums, r, g, &seeds, cancel)?;
        Ok(BfsRpqResult::Merged(sources, to_vertices(&reached)))
    }
}
