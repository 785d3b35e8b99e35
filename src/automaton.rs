//! Boolean-matrix decomposition of finite automata and its operators:
//! Kronecker intersection, label-agnostic transitive closure and the direct
//! sum driving the multi-source BFS engine.
use std::collections::BTreeSet;
use std::hash::Hash;

use ahash::AHashMap;
use fixedbitset_stack::FixedBitSet;

use crate::error::Result;
use crate::matrix::{BoolMatrix, CooMatrix};
use crate::nfa::Nfa;
use crate::rsm::Rsm;
use crate::symbol::{Symbol, Variable};
use crate::utils::CancelToken;

/// A state of a recursive state machine flattened into one automaton: the box
/// nonterminal plus the state inside the box.
pub type BoxState = (Variable, u32);

/// An automaton as a set of per-label boolean matrices.
///
/// `S` is the caller-facing state type; internally every state has a dense
/// index and all operators work on indices. Labels without a matrix are the
/// zero matrix; lookups of missing labels never allocate or fail.
#[derive(Debug, Clone)]
pub struct MatrixAutomaton<S> {
    num_states: usize,
    states: Vec<S>,
    index: AHashMap<S, usize>,
    start: FixedBitSet,
    finals: FixedBitSet,
    matrices: AHashMap<Symbol, BoolMatrix>,
}

impl<S: Clone + Eq + Hash> MatrixAutomaton<S> {
    fn with_states(states: Vec<S>) -> Self {
        let num_states = states.len();
        let index = states
            .iter()
            .cloned()
            .enumerate()
            .map(|(i, s)| (s, i))
            .collect();
        MatrixAutomaton {
            num_states,
            states,
            index,
            start: FixedBitSet::with_capacity(num_states),
            finals: FixedBitSet::with_capacity(num_states),
            matrices: AHashMap::default(),
        }
    }

    /// Number of states.
    pub fn num_states(&self) -> usize {
        self.num_states
    }

    /// The state at the given index.
    pub fn state(&self, index: usize) -> &S {
        &self.states[index]
    }

    /// The index of a state.
    pub fn index_of(&self, state: &S) -> Option<usize> {
        self.index.get(state).copied()
    }

    /// Whether the state at `index` is a start state.
    pub fn is_start(&self, index: usize) -> bool {
        self.start.contains(index)
    }

    /// Whether the state at `index` is a final state.
    pub fn is_final(&self, index: usize) -> bool {
        self.finals.contains(index)
    }

    /// Indices of start states, ascending.
    pub fn start_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.start.ones()
    }

    /// Indices of final states, ascending.
    pub fn final_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.finals.ones()
    }

    /// The labels with a materialised matrix, sorted.
    pub fn labels(&self) -> BTreeSet<Symbol> {
        self.matrices.keys().cloned().collect()
    }

    /// The matrix of a label, if materialised. A missing label means the zero
    /// matrix.
    pub fn matrix(&self, label: &Symbol) -> Option<&BoolMatrix> {
        self.matrices.get(label)
    }

    /// Total number of transitions over all labels.
    pub fn nnz(&self) -> usize {
        self.matrices.values().map(BoolMatrix::nnz).sum()
    }

    /// OR a matrix into the label's matrix, materialising it on first touch.
    pub(crate) fn or_into_matrix(&mut self, label: &Symbol, m: &BoolMatrix) -> Result<()> {
        match self.matrices.get_mut(label) {
            Some(existing) => {
                *existing = existing.or(m)?;
            }
            None => {
                self.matrices.insert(label.clone(), m.clone());
            }
        }
        Ok(())
    }

    /// The transition-list view: one `(i, label, j)` transition per non-zero
    /// entry, with start/final states re-attached through the index bijection.
    pub fn to_nfa(&self) -> Nfa {
        let mut nfa = Nfa::new();
        let labels = self.labels();
        for label in labels {
            let m = &self.matrices[&label];
            for (i, j) in m.iter() {
                nfa.add_transition(i, label.clone(), j);
            }
        }
        for i in self.start.ones() {
            nfa.add_start(i as u32);
        }
        for i in self.finals.ones() {
            nfa.add_final(i as u32);
        }
        nfa
    }

    /// The Kronecker-product intersection.
    ///
    /// The result has `self.num_states() * other.num_states()` states; the
    /// pair `(a, b)` sits at index `a * other.num_states() + b`. A state is a
    /// start (final) state iff both components are.
    pub fn intersect<T: Clone + Eq + Hash>(
        &self,
        other: &MatrixAutomaton<T>,
    ) -> MatrixAutomaton<usize> {
        let n = self.num_states;
        let m = other.num_states;
        let mut result = MatrixAutomaton::with_states((0..n * m).collect());
        let mut labels: BTreeSet<&Symbol> = self.matrices.keys().collect();
        labels.extend(other.matrices.keys());
        let self_zero = BoolMatrix::zero(n, n);
        let other_zero = BoolMatrix::zero(m, m);
        for label in labels {
            let a = self.matrices.get(label).unwrap_or(&self_zero);
            let b = other.matrices.get(label).unwrap_or(&other_zero);
            result.matrices.insert(label.clone(), a.kron(b));
        }
        for ia in self.start.ones() {
            for ib in other.start.ones() {
                result.start.insert(ia * m + ib);
            }
        }
        for ia in self.finals.ones() {
            for ib in other.finals.ones() {
                result.finals.insert(ia * m + ib);
            }
        }
        result
    }

    /// The transitive closure of the label-agnostic reachability relation:
    /// the union of all label matrices, squared and accumulated until `nnz`
    /// stalls. Reflexivity is not added.
    ///
    /// # Errors
    ///
    /// [`Error::Cancelled`](crate::Error::Cancelled) if the token fires
    /// between iterations.
    pub fn transitive_closure(&self, cancel: &CancelToken) -> Result<BoolMatrix> {
        let mut closure = BoolMatrix::zero(self.num_states, self.num_states);
        for label in self.labels() {
            closure = closure.or(&self.matrices[&label])?;
        }
        loop {
            cancel.checkpoint()?;
            let before = closure.nnz();
            closure = closure.or(&closure.matmul(&closure)?)?;
            if closure.nnz() == before {
                break;
            }
            log::trace!("transitive closure grew to {} entries", closure.nnz());
        }
        Ok(closure)
    }

    /// The per-label direct sums `[[A, 0], [0, B]]` for the labels shared by
    /// both automata, in sorted label order. Unshared labels contribute
    /// nothing: no path can extend through them in lockstep.
    pub fn direct_sum<T: Clone + Eq + Hash>(
        &self,
        other: &MatrixAutomaton<T>,
    ) -> Result<Vec<(Symbol, BoolMatrix)>> {
        let n = self.num_states;
        let m = other.num_states;
        let mut out = Vec::new();
        for label in self.labels() {
            let Some(b) = other.matrices.get(&label) else {
                continue;
            };
            let a = &self.matrices[&label];
            let top = a.hstack(&BoolMatrix::zero(n, m))?;
            let bottom = BoolMatrix::zero(m, n).hstack(b)?;
            out.push((label, top.vstack(&bottom)?));
        }
        Ok(out)
    }
}

impl MatrixAutomaton<u32> {
    /// Decompose a transition-list automaton into per-label matrices.
    ///
    /// States are enumerated in ascending order, which fixes the index
    /// bijection deterministically. ε transitions are kept under the ε label.
    pub fn from_nfa(nfa: &Nfa) -> Self {
        let states: Vec<u32> = nfa.states().iter().copied().collect();
        let mut automaton = MatrixAutomaton::with_states(states);
        let n = automaton.num_states;
        let mut staging: AHashMap<Symbol, CooMatrix> = AHashMap::default();
        for (from, label, to) in nfa.transitions() {
            let i = automaton.index[from];
            let j = automaton.index[to];
            staging
                .entry(label.clone())
                .or_insert_with(|| CooMatrix::new(n, n))
                .set(i as u32, j as u32);
        }
        for (label, coo) in staging {
            automaton.matrices.insert(label, coo.finalize());
        }
        for s in nfa.starts() {
            automaton.start.insert(automaton.index[s]);
        }
        for s in nfa.finals() {
            automaton.finals.insert(automaton.index[s]);
        }
        automaton
    }
}

impl MatrixAutomaton<BoxState> {
    /// Flatten a recursive state machine into one automaton whose states are
    /// `(box nonterminal, box state)` pairs, ordered lexicographically. The
    /// start/final sets are the unions of the per-box sets.
    pub fn from_rsm(rsm: &Rsm) -> Self {
        let mut states: Vec<BoxState> = Vec::new();
        for (var, nfa) in rsm.boxes() {
            for &q in nfa.states() {
                states.push((var.clone(), q));
            }
        }
        states.sort();
        let mut automaton = MatrixAutomaton::with_states(states);
        let n = automaton.num_states;
        let mut staging: AHashMap<Symbol, CooMatrix> = AHashMap::default();
        for (var, nfa) in rsm.boxes() {
            for (from, label, to) in nfa.transitions() {
                let i = automaton.index[&(var.clone(), *from)];
                let j = automaton.index[&(var.clone(), *to)];
                staging
                    .entry(label.clone())
                    .or_insert_with(|| CooMatrix::new(n, n))
                    .set(i as u32, j as u32);
            }
            for &q in nfa.starts() {
                let i = automaton.index[&(var.clone(), q)];
                automaton.start.insert(i);
            }
            for &q in nfa.finals() {
                let i = automaton.index[&(var.clone(), q)];
                automaton.finals.insert(i);
            }
        }
        for (label, coo) in staging {
            automaton.matrices.insert(label, coo.finalize());
        }
        automaton
    }
}
