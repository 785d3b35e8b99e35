//! Recursive state machines: one automaton box per nonterminal.
use std::collections::BTreeMap;

use crate::ecfg::Ecfg;
use crate::nfa::Nfa;
use crate::symbol::Variable;

/// A recursive state machine. Box alphabets range over both terminals and
/// nonterminals; a nonterminal transition stands for a recursive call into
/// that nonterminal's box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rsm {
    start: Variable,
    boxes: BTreeMap<Variable, Nfa>,
}

impl Rsm {
    /// Compile each ECFG body to an ε-NFA box.
    pub fn from_ecfg(ecfg: &Ecfg) -> Rsm {
        Rsm {
            start: ecfg.start_symbol().clone(),
            boxes: ecfg
                .productions()
                .iter()
                .map(|(head, body)| (head.clone(), body.to_nfa()))
                .collect(),
        }
    }

    /// Replace every box with a language-equivalent minimal DFA. Idempotent.
    pub fn minimize(mut self) -> Rsm {
        for nfa in self.boxes.values_mut() {
            *nfa = nfa.minimize();
        }
        self
    }

    /// The start nonterminal.
    pub fn start_symbol(&self) -> &Variable {
        &self.start
    }

    /// The boxes, ordered by nonterminal.
    pub fn boxes(&self) -> &BTreeMap<Variable, Nfa> {
        &self.boxes
    }

    /// The box of a nonterminal, if any.
    pub fn box_of(&self, var: &Variable) -> Option<&Nfa> {
        self.boxes.get(var)
    }
}
