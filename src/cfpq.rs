//! Context-free path queries: Hellings, matrix iteration and the RSM tensor.
//!
//! All three engines share one preamble: the grammar is normalised to weak
//! Chomsky normal form and split into ε, terminal and binary production
//! tables over interned nonterminal ids; ids are resolved back to variables
//! only when the answer triples are built.
use std::collections::VecDeque;

use ahash::{AHashMap, AHashSet};
use string_interner::symbol::SymbolU32;
use string_interner::{DefaultStringInterner, Symbol as _};

use crate::automaton::MatrixAutomaton;
use crate::cfg::{Cfg, CfgObject};
use crate::ecfg::Ecfg;
use crate::error::{Error, Result};
use crate::graph::Graph;
use crate::matrix::{BoolMatrix, CooMatrix};
use crate::rsm::Rsm;
use crate::symbol::{Symbol, Variable};
use crate::utils::CancelToken;

struct WcnfTables {
    vars: DefaultStringInterner,
    eps_heads: Vec<SymbolU32>,
    term_heads: AHashMap<String, Vec<SymbolU32>>,
    bin_prods: Vec<(SymbolU32, SymbolU32, SymbolU32)>,
}

fn wcnf_tables(cfg: &Cfg) -> WcnfTables {
    let wcnf = cfg.to_weak_cnf();
    let mut vars = DefaultStringInterner::default();
    let mut eps_heads = Vec::new();
    let mut term_heads: AHashMap<String, Vec<SymbolU32>> = AHashMap::default();
    let mut bin_prods = Vec::new();
    for p in wcnf.productions() {
        let head = vars.get_or_intern(p.head.name());
        match p.body.as_slice() {
            [] => eps_heads.push(head),
            [CfgObject::Term(t)] => term_heads.entry(t.name().to_string()).or_default().push(head),
            [CfgObject::Var(b), CfgObject::Var(c)] => {
                let b = vars.get_or_intern(b.name());
                let c = vars.get_or_intern(c.name());
                bin_prods.push((head, b, c));
            }
            other => {
                debug_assert!(false, "weak CNF produced body {other:?}");
            }
        }
    }
    WcnfTables {
        vars,
        eps_heads,
        term_heads,
        bin_prods,
    }
}

fn resolve(vars: &DefaultStringInterner, id: SymbolU32) -> Result<Variable> {
    vars.resolve(id)
        .map(Variable::new)
        .ok_or_else(|| Error::internal("nonterminal id lost its name".to_string()))
}

/// Constrained transitive closure by the Hellings worklist algorithm.
///
/// Returns every triple `(u, A, v)` such that some path from `u` to `v`
/// derives from nonterminal `A` of the grammar's weak CNF. The worklist is
/// FIFO and seeded in sorted order, so runs are reproducible; the answer set
/// itself is closed under the derivation rules and independent of ordering.
pub fn hellings(
    graph: &Graph,
    cfg: &Cfg,
    cancel: &CancelToken,
) -> Result<AHashSet<(u32, Variable, u32)>> {
    let tables = wcnf_tables(cfg);
    let mut by_body: AHashMap<(SymbolU32, SymbolU32), Vec<SymbolU32>> = AHashMap::default();
    for &(a, b, c) in &tables.bin_prods {
        by_body.entry((b, c)).or_default().push(a);
    }

    let mut result: AHashSet<(u32, SymbolU32, u32)> = AHashSet::default();
    for (u, label, v) in graph.edges() {
        if let Some(heads) = tables.term_heads.get(label) {
            for &head in heads {
                result.insert((*u, head, *v));
            }
        }
    }
    for &v in graph.vertices() {
        for &head in &tables.eps_heads {
            result.insert((v, head, v));
        }
    }
    let mut seed: Vec<(u32, SymbolU32, u32)> = result.iter().copied().collect();
    seed.sort_by_key(|&(u, a, v)| (u, a.to_usize(), v));
    let mut queue: VecDeque<(u32, SymbolU32, u32)> = seed.into();

    while let Some((s, b, f)) = queue.pop_front() {
        cancel.checkpoint()?;
        let mut fresh = Vec::new();
        for &(s2, c, f2) in &result {
            if f2 == s {
                if let Some(heads) = by_body.get(&(c, b)) {
                    for &a in heads {
                        let triple = (s2, a, f);
                        if !result.contains(&triple) {
                            fresh.push(triple);
                        }
                    }
                }
            }
            if f == s2 {
                if let Some(heads) = by_body.get(&(b, c)) {
                    for &a in heads {
                        let triple = (s, a, f2);
                        if !result.contains(&triple) {
                            fresh.push(triple);
                        }
                    }
                }
            }
        }
        for triple in fresh {
            if result.insert(triple) {
                queue.push_back(triple);
            }
        }
    }

    let mut resolved = AHashSet::with_capacity(result.len());
    for (u, a, v) in result {
        resolved.insert((u, resolve(&tables.vars, a)?, v));
    }
    Ok(resolved)
}

/// Constrained transitive closure by per-nonterminal matrix iteration.
///
/// One n×n boolean matrix per nonterminal, seeded from terminal and ε
/// productions, then `M[A] ← M[A] + M[B]·M[C]` for every binary production
/// until no matrix grows in a full pass.
pub fn matrix_cfpq(
    graph: &Graph,
    cfg: &Cfg,
    cancel: &CancelToken,
) -> Result<AHashSet<(u32, Variable, u32)>> {
    let tables = wcnf_tables(cfg);
    let vertices = graph.vertices();
    let n = vertices.len();
    let index: AHashMap<u32, usize> = vertices.iter().enumerate().map(|(i, &v)| (v, i)).collect();

    let num_vars = tables.vars.len();
    let mut staging: Vec<CooMatrix> = (0..num_vars).map(|_| CooMatrix::new(n, n)).collect();
    for (u, label, v) in graph.edges() {
        if let Some(heads) = tables.term_heads.get(label) {
            for &head in heads {
                staging[head.to_usize()].set(index[u] as u32, index[v] as u32);
            }
        }
    }
    for i in 0..n {
        for &head in &tables.eps_heads {
            staging[head.to_usize()].set(i as u32, i as u32);
        }
    }
    let mut matrices: Vec<BoolMatrix> = staging.into_iter().map(CooMatrix::finalize).collect();

    loop {
        cancel.checkpoint()?;
        let before: usize = matrices.iter().map(BoolMatrix::nnz).sum();
        for &(a, b, c) in &tables.bin_prods {
            let update = matrices[b.to_usize()].matmul(&matrices[c.to_usize()])?;
            let merged = matrices[a.to_usize()].or(&update)?;
            matrices[a.to_usize()] = merged;
        }
        let after: usize = matrices.iter().map(BoolMatrix::nnz).sum();
        if after == before {
            break;
        }
        log::trace!("matrix cfpq grew to {after} entries");
    }

    let mut result = AHashSet::default();
    for (id, matrix) in matrices.iter().enumerate() {
        let var = resolve(
            &tables.vars,
            SymbolU32::try_from_usize(id)
                .ok_or_else(|| Error::internal("nonterminal id overflow".to_string()))?,
        )?;
        for (i, j) in matrix.iter() {
            result.insert((vertices[i as usize], var.clone(), vertices[j as usize]));
        }
    }
    Ok(result)
}

/// Constrained transitive closure by the RSM-versus-graph tensor product.
///
/// The grammar becomes a recursive state machine (one minimal-DFA box per
/// nonterminal); nullable nonterminals contribute diagonal edges up front.
/// Each round intersects the RSM automaton with the current graph automaton,
/// closes it, and promotes every closure entry that connects a box start to
/// the same box's final state into an `A`-labelled graph edge; the round
/// fixpoint is witnessed by the closure's `nnz`.
pub fn tensor_cfpq(
    graph: &Graph,
    cfg: &Cfg,
    cancel: &CancelToken,
) -> Result<AHashSet<(u32, Variable, u32)>> {
    let rsm = Rsm::from_ecfg(&Ecfg::from_cfg(cfg)).minimize();
    let rsm_m = MatrixAutomaton::from_rsm(&rsm);
    let mut graph_m = MatrixAutomaton::from_nfa(&graph.to_nfa(None, None)?);
    let g = graph_m.num_states();
    let diagonal = BoolMatrix::identity(g);
    for var in cfg.nullables() {
        graph_m.or_into_matrix(&Symbol::Var(var), &diagonal)?;
    }

    let mut previous_nnz: Option<usize> = None;
    loop {
        cancel.checkpoint()?;
        let intersection = rsm_m.intersect(&graph_m);
        let closure = intersection.transitive_closure(cancel)?;
        if previous_nnz == Some(closure.nnz()) {
            break;
        }
        previous_nnz = Some(closure.nnz());
        let mut staging: AHashMap<Variable, CooMatrix> = AHashMap::default();
        for (i, j) in closure.iter() {
            let (i, j) = (i as usize, j as usize);
            let (rsm_i, graph_i) = (i / g, i % g);
            let (rsm_j, graph_j) = (j / g, j % g);
            if !rsm_m.is_start(rsm_i) || !rsm_m.is_final(rsm_j) {
                continue;
            }
            let (var_from, _) = rsm_m.state(rsm_i);
            let (var_to, _) = rsm_m.state(rsm_j);
            if var_from != var_to {
                continue;
            }
            staging
                .entry(var_from.clone())
                .or_insert_with(|| CooMatrix::new(g, g))
                .set(graph_i as u32, graph_j as u32);
        }
        for (var, coo) in staging {
            graph_m.or_into_matrix(&Symbol::Var(var), &coo.finalize())?;
        }
    }

    let mut result = AHashSet::default();
    for label in graph_m.labels() {
        let Symbol::Var(var) = label else {
            continue;
        };
        let matrix = graph_m
            .matrix(&Symbol::Var(var.clone()))
            .ok_or_else(|| Error::internal("promoted label lost its matrix".to_string()))?;
        for (i, j) in matrix.iter() {
            result.insert((
                *graph_m.state(i as usize),
                var.clone(),
                *graph_m.state(j as usize),
            ));
        }
    }
    Ok(result)
}
