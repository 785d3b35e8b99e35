//! Cocke–Younger–Kasami membership over strict Chomsky normal form.
use ahash::{AHashMap, AHashSet};

use crate::cfg::{Cfg, CfgObject};
use crate::symbol::Variable;

/// Decide whether the grammar generates the word (given as a sequence of
/// terminal names).
///
/// The empty word is answered by the ε-generation check; otherwise the
/// grammar is converted to strict Chomsky normal form and the classic
/// substring table is filled: `table[i][j]` holds the nonterminals deriving
/// `word[i..=j]`.
pub fn cyk(cfg: &Cfg, word: &[&str]) -> bool {
    if word.is_empty() {
        return cfg.generates_epsilon();
    }
    let cnf = cfg.to_cnf();
    let mut term_heads: AHashMap<&str, Vec<&Variable>> = AHashMap::default();
    let mut bin_prods: Vec<(&Variable, &Variable, &Variable)> = Vec::new();
    for p in cnf.productions() {
        match p.body.as_slice() {
            [CfgObject::Term(t)] => term_heads.entry(t.name()).or_default().push(&p.head),
            [CfgObject::Var(b), CfgObject::Var(c)] => bin_prods.push((&p.head, b, c)),
            _ => {}
        }
    }
    let n = word.len();
    let mut table: Vec<Vec<AHashSet<&Variable>>> = vec![vec![AHashSet::new(); n]; n];
    for (i, letter) in word.iter().enumerate() {
        if let Some(heads) = term_heads.get(letter) {
            table[i][i].extend(heads.iter().copied());
        }
    }
    for width in 1..n {
        for i in 0..n - width {
            let j = i + width;
            let mut cell = AHashSet::new();
            for k in i..j {
                for (a, b, c) in &bin_prods {
                    if table[i][k].contains(b) && table[k + 1][j].contains(c) {
                        cell.insert(*a);
                    }
                }
            }
            table[i][j] = cell;
        }
    }
    table[0][n - 1].contains(cfg.start_symbol())
}
