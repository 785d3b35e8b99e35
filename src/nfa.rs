//! Transition-list finite automata over symbolic labels.
//!
//! This is the "list" view of an automaton; the algebraic engines work on the
//! boolean-matrix view in [`crate::automaton`] and convert back and forth.
//! States are plain numbers kept in ordered sets so that index assignment in
//! the matrix view is deterministic.
use std::collections::BTreeSet;

use ahash::AHashMap;

use crate::symbol::Symbol;

/// A nondeterministic finite automaton with ε transitions.
///
/// Self-loops and parallel transitions with distinct labels are permitted.
/// Deterministic automata are represented by the same type; determinism is a
/// property [`Nfa::determinize`] establishes, not a separate type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Nfa {
    states: BTreeSet<u32>,
    transitions: BTreeSet<(u32, Symbol, u32)>,
    starts: BTreeSet<u32>,
    finals: BTreeSet<u32>,
}

impl Nfa {
    /// An automaton with no states.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a state without any transitions.
    pub fn add_state(&mut self, s: u32) {
        self.states.insert(s);
    }

    /// Add a transition, adding its endpoints as states.
    pub fn add_transition(&mut self, from: u32, label: Symbol, to: u32) {
        self.states.insert(from);
        self.states.insert(to);
        self.transitions.insert((from, label, to));
    }

    /// Mark a state as a start state, adding it if unknown.
    pub fn add_start(&mut self, s: u32) {
        self.states.insert(s);
        self.starts.insert(s);
    }

    /// Mark a state as a final state, adding it if unknown.
    pub fn add_final(&mut self, s: u32) {
        self.states.insert(s);
        self.finals.insert(s);
    }

    /// Replace the start set.
    pub fn replace_starts(&mut self, starts: impl IntoIterator<Item = u32>) {
        self.starts = starts.into_iter().collect();
        self.states.extend(self.starts.iter().copied());
    }

    /// Replace the final set.
    pub fn replace_finals(&mut self, finals: impl IntoIterator<Item = u32>) {
        self.finals = finals.into_iter().collect();
        self.states.extend(self.finals.iter().copied());
    }

    /// The ordered state set.
    pub fn states(&self) -> &BTreeSet<u32> {
        &self.states
    }

    /// The transition set, ordered by (source, label, target).
    pub fn transitions(&self) -> &BTreeSet<(u32, Symbol, u32)> {
        &self.transitions
    }

    /// The start states.
    pub fn starts(&self) -> &BTreeSet<u32> {
        &self.starts
    }

    /// The final states.
    pub fn finals(&self) -> &BTreeSet<u32> {
        &self.finals
    }

    /// The non-ε labels appearing on transitions.
    pub fn symbols(&self) -> BTreeSet<Symbol> {
        self.transitions
            .iter()
            .filter(|(_, l, _)| !l.is_eps())
            .map(|(_, l, _)| l.clone())
            .collect()
    }

    fn eps_closure(&self, seed: &BTreeSet<u32>) -> BTreeSet<u32> {
        let mut reached = seed.clone();
        let mut todo: Vec<u32> = seed.iter().copied().collect();
        while let Some(s) = todo.pop() {
            for (from, label, to) in self.transitions.iter() {
                if *from == s && label.is_eps() && reached.insert(*to) {
                    todo.push(*to);
                }
            }
        }
        reached
    }

    fn step(&self, from: &BTreeSet<u32>, label: &Symbol) -> BTreeSet<u32> {
        let mut out = BTreeSet::new();
        for (f, l, t) in self.transitions.iter() {
            if from.contains(f) && l == label {
                out.insert(*t);
            }
        }
        out
    }

    /// Whether the automaton accepts the given label word.
    pub fn accepts(&self, word: &[Symbol]) -> bool {
        let mut current = self.eps_closure(&self.starts);
        for label in word {
            current = self.eps_closure(&self.step(&current, label));
            if current.is_empty() {
                return false;
            }
        }
        current.iter().any(|s| self.finals.contains(s))
    }

    /// Subset construction. The result has no ε transitions, a single start
    /// state `0`, and only states reachable from it.
    pub fn determinize(&self) -> Nfa {
        let mut dfa = Nfa::new();
        if self.starts.is_empty() {
            return dfa;
        }
        let alphabet: Vec<Symbol> = self.symbols().into_iter().collect();
        let start = self.eps_closure(&self.starts);
        let mut ids: AHashMap<BTreeSet<u32>, u32> = AHashMap::default();
        ids.insert(start.clone(), 0);
        dfa.add_start(0);
        if start.iter().any(|s| self.finals.contains(s)) {
            dfa.add_final(0);
        }
        let mut queue = vec![start];
        while let Some(set) = queue.pop() {
            let from = ids[&set];
            for label in &alphabet {
                let next = self.eps_closure(&self.step(&set, label));
                if next.is_empty() {
                    continue;
                }
                let to = match ids.get(&next) {
                    Some(&id) => id,
                    None => {
                        let id = ids.len() as u32;
                        ids.insert(next.clone(), id);
                        if next.iter().any(|s| self.finals.contains(s)) {
                            dfa.add_final(id);
                        }
                        queue.push(next.clone());
                        id
                    }
                };
                dfa.add_transition(from, label.clone(), to);
            }
        }
        dfa
    }

    /// The language-equivalent minimal DFA (Moore partition refinement with
    /// an implicit dead state).
    pub fn minimize(&self) -> Nfa {
        let dfa = self.determinize();
        if dfa.states.is_empty() {
            return dfa;
        }
        let states: Vec<u32> = dfa.states.iter().copied().collect();
        let index: AHashMap<u32, usize> = states.iter().enumerate().map(|(i, &s)| (s, i)).collect();
        let alphabet: Vec<Symbol> = dfa.symbols().into_iter().collect();
        let n = states.len();
        let sink = n;
        let mut delta = vec![vec![sink; alphabet.len()]; n + 1];
        delta[sink] = vec![sink; alphabet.len()];
        for (from, label, to) in dfa.transitions.iter() {
            let a = alphabet.iter().position(|l| l == label).unwrap();
            delta[index[from]][a] = index[to];
        }

        // Initial split: accepting vs not; the sink is non-accepting.
        let mut class = vec![0usize; n + 1];
        for (i, s) in states.iter().enumerate() {
            class[i] = usize::from(dfa.finals.contains(s));
        }
        loop {
            let mut signatures: AHashMap<(usize, Vec<usize>), usize> = AHashMap::default();
            let mut next_class = vec![0usize; n + 1];
            for s in 0..=n {
                let sig = (
                    class[s],
                    delta[s].iter().map(|&t| class[t]).collect::<Vec<_>>(),
                );
                let fresh = signatures.len();
                let id = *signatures.entry(sig).or_insert(fresh);
                next_class[s] = id;
            }
            if next_class == class {
                break;
            }
            class = next_class;
        }

        let dead = class[sink];
        let start_state = *dfa.starts.iter().next().unwrap();
        let start_class = class[index[&start_state]];
        let mut min = Nfa::new();
        if start_class == dead {
            // Empty language: a lone non-final start state.
            min.add_start(0);
            return min;
        }
        // Dense ids per live class, in first-state order.
        let mut renumber: AHashMap<usize, u32> = AHashMap::default();
        for s in 0..n {
            if class[s] != dead && !renumber.contains_key(&class[s]) {
                renumber.insert(class[s], renumber.len() as u32);
            }
        }
        min.add_start(renumber[&start_class]);
        for s in 0..n {
            let from = renumber[&class[s]];
            if dfa.finals.contains(&states[s]) {
                min.add_final(from);
            }
            for (a, label) in alphabet.iter().enumerate() {
                let t = delta[s][a];
                if class[t] != dead {
                    min.add_transition(from, label.clone(), renumber[&class[t]]);
                }
            }
        }
        min
    }

    fn renumber_into(&self, out: &mut Nfa, offset: u32) -> AHashMap<u32, u32> {
        let map: AHashMap<u32, u32> = self
            .states
            .iter()
            .enumerate()
            .map(|(i, &s)| (s, offset + i as u32))
            .collect();
        for &s in self.states.iter() {
            out.add_state(map[&s]);
        }
        for (from, label, to) in self.transitions.iter() {
            out.add_transition(map[from], label.clone(), map[to]);
        }
        map
    }

    /// The union automaton: accepts a word iff either operand does.
    pub fn union(&self, other: &Nfa) -> Nfa {
        let mut out = Nfa::new();
        let left = self.renumber_into(&mut out, 0);
        let right = other.renumber_into(&mut out, self.states.len() as u32);
        for s in self.starts.iter() {
            out.add_start(left[s]);
        }
        for s in other.starts.iter() {
            out.add_start(right[s]);
        }
        for s in self.finals.iter() {
            out.add_final(left[s]);
        }
        for s in other.finals.iter() {
            out.add_final(right[s]);
        }
        out
    }

    /// The concatenation automaton: `self`'s finals chain into `other`'s
    /// starts by ε moves.
    pub fn concat(&self, other: &Nfa) -> Nfa {
        let mut out = Nfa::new();
        let left = self.renumber_into(&mut out, 0);
        let right = other.renumber_into(&mut out, self.states.len() as u32);
        for s in self.starts.iter() {
            out.add_start(left[s]);
        }
        for f in self.finals.iter() {
            for s in other.starts.iter() {
                out.add_transition(left[f], Symbol::Eps, right[s]);
            }
        }
        for s in other.finals.iter() {
            out.add_final(right[s]);
        }
        out
    }

    /// The Kleene-star automaton.
    pub fn star(&self) -> Nfa {
        let mut out = Nfa::new();
        let map = self.renumber_into(&mut out, 1);
        out.add_start(0);
        out.add_final(0);
        for s in self.starts.iter() {
            out.add_transition(0, Symbol::Eps, map[s]);
        }
        for f in self.finals.iter() {
            out.add_final(map[f]);
            out.add_transition(map[f], Symbol::Eps, 0);
        }
        out
    }

    /// The complement with respect to the automaton's own alphabet.
    pub fn complement(&self) -> Nfa {
        let dfa = self.determinize();
        let alphabet: Vec<Symbol> = dfa.symbols().into_iter().collect();
        let mut out = dfa.clone();
        // Complete with an explicit sink so that rejection becomes acceptance.
        let sink = out.states.iter().next_back().map_or(0, |&m| m + 1);
        let states: Vec<u32> = out.states.iter().copied().collect();
        let mut needs_sink = false;
        for &s in states.iter() {
            for label in &alphabet {
                let covered = out
                    .transitions
                    .iter()
                    .any(|(f, l, _)| *f == s && l == label);
                if !covered {
                    out.add_transition(s, label.clone(), sink);
                    needs_sink = true;
                }
            }
        }
        if needs_sink {
            for label in &alphabet {
                out.add_transition(sink, label.clone(), sink);
            }
        }
        if out.starts.is_empty() {
            out.add_start(sink);
        }
        let finals: BTreeSet<u32> = out
            .states
            .iter()
            .copied()
            .filter(|s| !out.finals.contains(s))
            .collect();
        out.finals = finals;
        out
    }
}
