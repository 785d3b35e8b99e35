//! Context-free grammars: text ingestion, normal forms and membership.
use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;

use ahash::{AHashMap, AHashSet};
use nom::bytes::complete::{tag, take_while1};
use nom::character::complete::{char as nom_char, space0};
use nom::multi::{many0, separated_list1};
use nom::sequence::{delimited, preceded};
use nom::Finish;
use nom::IResult;

use crate::error::{Error, Result};
use crate::nfa::Nfa;
use crate::symbol::{Symbol, Terminal, Variable};

/// One body symbol of a production.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CfgObject {
    /// A nonterminal occurrence.
    Var(Variable),
    /// A terminal occurrence.
    Term(Terminal),
}

impl fmt::Display for CfgObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CfgObject::Var(v) => v.fmt(f),
            CfgObject::Term(t) => t.fmt(f),
        }
    }
}

/// A production `head → body`; the empty body derives ε.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Production {
    /// The head nonterminal.
    pub head: Variable,
    /// The body symbols; empty means ε.
    pub body: Vec<CfgObject>,
}

impl Production {
    /// Build a production.
    pub fn new(head: Variable, body: Vec<CfgObject>) -> Self {
        Production { head, body }
    }
}

/// An immutable context-free grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cfg {
    variables: BTreeSet<Variable>,
    terminals: BTreeSet<Terminal>,
    start: Variable,
    productions: Vec<Production>,
}

fn grammar_token(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_alphanumeric() || c == '_' || c == '#' || c == '$')(input)
}

type TextAlternative<'a> = Vec<&'a str>;

fn grammar_line(input: &str) -> IResult<&str, (&str, Vec<TextAlternative<'_>>)> {
    let (input, head) = preceded(space0, grammar_token)(input)?;
    let (input, _) = delimited(space0, tag("->"), space0)(input)?;
    let (input, alternatives) = separated_list1(
        delimited(space0, nom_char('|'), space0),
        many0(delimited(space0, grammar_token, space0)),
    )(input)?;
    let (input, _) = space0(input)?;
    Ok((input, (head, alternatives)))
}

impl Cfg {
    /// Build a grammar from a start symbol and productions. Variable and
    /// terminal sets are collected from the productions; duplicates are
    /// dropped while the first-seen production order is kept.
    pub fn new(start: Variable, productions: impl IntoIterator<Item = Production>) -> Self {
        let mut variables = BTreeSet::new();
        variables.insert(start.clone());
        let mut terminals = BTreeSet::new();
        let mut seen = AHashSet::new();
        let mut kept = Vec::new();
        for p in productions {
            variables.insert(p.head.clone());
            for o in &p.body {
                match o {
                    CfgObject::Var(v) => {
                        variables.insert(v.clone());
                    }
                    CfgObject::Term(t) => {
                        terminals.insert(t.clone());
                    }
                }
            }
            if seen.insert(p.clone()) {
                kept.push(p);
            }
        }
        Cfg {
            variables,
            terminals,
            start,
            productions: kept,
        }
    }

    /// Parse a grammar from its textual form: one production per line, head
    /// and body separated by `->`, alternatives by `|`, `$` (or `epsilon`)
    /// denoting ε. Tokens starting with a capital letter, and tokens that
    /// occur as heads, are nonterminals; the rest are terminals.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidInput`] on malformed lines.
    pub fn from_text(text: &str, start: &str) -> Result<Cfg> {
        let mut lines = Vec::new();
        for raw in text.lines() {
            if raw.trim().is_empty() {
                continue;
            }
            let (rest, parsed) = grammar_line(raw)
                .finish()
                .map_err(|_| Error::invalid(format!("malformed grammar line {raw:?}")))?;
            if !rest.is_empty() {
                return Err(Error::invalid(format!(
                    "trailing content {rest:?} in grammar line {raw:?}"
                )));
            }
            lines.push(parsed);
        }
        let heads: AHashSet<&str> = lines.iter().map(|(head, _)| *head).collect();
        let classify = |token: &str| -> Option<CfgObject> {
            if token == "$" || token == "epsilon" {
                None
            } else if heads.contains(token) || token.starts_with(|c: char| c.is_uppercase()) {
                Some(CfgObject::Var(Variable::new(token)))
            } else {
                Some(CfgObject::Term(Terminal::new(token)))
            }
        };
        let mut productions = Vec::new();
        for (head, alternatives) in lines {
            for alternative in alternatives {
                let body: Vec<CfgObject> =
                    alternative.iter().filter_map(|t| classify(t)).collect();
                productions.push(Production::new(Variable::new(head), body));
            }
        }
        Ok(Cfg::new(Variable::new(start), productions))
    }

    /// Parse a grammar from a file, in the same textual form.
    pub fn from_file(path: impl AsRef<Path>, start: &str) -> Result<Cfg> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::invalid(format!("cannot read {}: {e}", path.display())))?;
        Cfg::from_text(&text, start)
    }

    /// The start nonterminal.
    pub fn start_symbol(&self) -> &Variable {
        &self.start
    }

    /// The nonterminal set.
    pub fn variables(&self) -> &BTreeSet<Variable> {
        &self.variables
    }

    /// The terminal set.
    pub fn terminals(&self) -> &BTreeSet<Terminal> {
        &self.terminals
    }

    /// The productions, in first-seen order.
    pub fn productions(&self) -> &[Production] {
        &self.productions
    }

    /// The textual form of the grammar.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for p in &self.productions {
            out.push_str(p.head.name());
            out.push_str(" ->");
            if p.body.is_empty() {
                out.push_str(" $");
            } else {
                for o in &p.body {
                    out.push(' ');
                    out.push_str(&o.to_string());
                }
            }
            out.push('\n');
        }
        out
    }

    /// The nonterminals that derive ε.
    pub fn nullables(&self) -> BTreeSet<Variable> {
        let mut nullable = BTreeSet::new();
        loop {
            let mut changed = false;
            for p in &self.productions {
                if nullable.contains(&p.head) {
                    continue;
                }
                let all_nullable = p.body.iter().all(|o| match o {
                    CfgObject::Var(v) => nullable.contains(v),
                    CfgObject::Term(_) => false,
                });
                if all_nullable {
                    nullable.insert(p.head.clone());
                    changed = true;
                }
            }
            if !changed {
                return nullable;
            }
        }
    }

    /// Whether the grammar generates the empty word.
    pub fn generates_epsilon(&self) -> bool {
        self.nullables().contains(&self.start)
    }

    /// Drop non-generating and unreachable symbols (and their productions).
    /// The start symbol is always kept.
    pub fn remove_useless_symbols(&self) -> Cfg {
        // Generating symbols first, then reachability over what is left.
        let mut generating: BTreeSet<Variable> = BTreeSet::new();
        loop {
            let mut changed = false;
            for p in &self.productions {
                if generating.contains(&p.head) {
                    continue;
                }
                let ok = p.body.iter().all(|o| match o {
                    CfgObject::Var(v) => generating.contains(v),
                    CfgObject::Term(_) => true,
                });
                if ok {
                    generating.insert(p.head.clone());
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        }
        let generating_prods: Vec<&Production> = self
            .productions
            .iter()
            .filter(|p| {
                generating.contains(&p.head)
                    && p.body.iter().all(|o| match o {
                        CfgObject::Var(v) => generating.contains(v),
                        CfgObject::Term(_) => true,
                    })
            })
            .collect();
        let mut reachable: BTreeSet<Variable> = BTreeSet::new();
        reachable.insert(self.start.clone());
        loop {
            let mut changed = false;
            for p in &generating_prods {
                if !reachable.contains(&p.head) {
                    continue;
                }
                for o in &p.body {
                    if let CfgObject::Var(v) = o {
                        if reachable.insert(v.clone()) {
                            changed = true;
                        }
                    }
                }
            }
            if !changed {
                break;
            }
        }
        let kept = generating_prods
            .into_iter()
            .filter(|p| reachable.contains(&p.head))
            .cloned();
        Cfg::new(self.start.clone(), kept)
    }

    /// Replace unit productions `A → B` by the non-unit productions of every
    /// nonterminal reachable from `A` through unit chains.
    pub fn eliminate_unit_productions(&self) -> Cfg {
        let is_unit = |p: &Production| matches!(p.body.as_slice(), [CfgObject::Var(_)]);
        // Unit pairs (A, B): B reachable from A via unit productions.
        let mut pairs: BTreeSet<(Variable, Variable)> = self
            .variables
            .iter()
            .map(|v| (v.clone(), v.clone()))
            .collect();
        loop {
            let mut changed = false;
            for p in &self.productions {
                if let [CfgObject::Var(b)] = p.body.as_slice() {
                    let sources: Vec<Variable> = pairs
                        .iter()
                        .filter(|(_, to)| to == &p.head)
                        .map(|(from, _)| from.clone())
                        .collect();
                    for a in sources {
                        if pairs.insert((a, b.clone())) {
                            changed = true;
                        }
                    }
                }
            }
            if !changed {
                break;
            }
        }
        let mut productions = Vec::new();
        for (a, b) in pairs {
            for p in &self.productions {
                if p.head == b && !is_unit(p) {
                    productions.push(Production::new(a.clone(), p.body.clone()));
                }
            }
        }
        Cfg::new(self.start.clone(), productions)
    }

    fn fresh_variable(&self, base: &str, used: &mut BTreeSet<Variable>) -> Variable {
        let mut candidate = Variable::new(base);
        let mut counter = 1;
        while used.contains(&candidate) {
            counter += 1;
            candidate = Variable::new(format!("{base}#{counter}"));
        }
        used.insert(candidate.clone());
        candidate
    }

    /// Convert to weak Chomsky normal form: every production becomes `A → ε`,
    /// `A → t` or `A → B C`, and the generated language is unchanged.
    pub fn to_weak_cnf(&self) -> Cfg {
        let cleaned = self
            .remove_useless_symbols()
            .eliminate_unit_productions()
            .remove_useless_symbols();
        let mut used = cleaned.variables.clone();
        let mut productions = Vec::new();
        let mut terminal_vars: AHashMap<Terminal, Variable> = AHashMap::default();
        // Isolate terminals occurring in long bodies.
        let mut isolated = Vec::new();
        for p in &cleaned.productions {
            if p.body.len() < 2 {
                isolated.push(p.clone());
                continue;
            }
            let body = p
                .body
                .iter()
                .map(|o| match o {
                    CfgObject::Var(v) => CfgObject::Var(v.clone()),
                    CfgObject::Term(t) => {
                        let var = terminal_vars.entry(t.clone()).or_insert_with(|| {
                            cleaned.fresh_variable(&format!("T#{}", t.name()), &mut used)
                        });
                        CfgObject::Var(var.clone())
                    }
                })
                .collect();
            isolated.push(Production::new(p.head.clone(), body));
        }
        for (t, var) in terminal_vars {
            productions.push(Production::new(var, vec![CfgObject::Term(t)]));
        }
        // Binarise long bodies.
        let mut counter = 0usize;
        for p in isolated {
            if p.body.len() <= 2 {
                productions.push(p);
                continue;
            }
            let mut head = p.head.clone();
            let last = p.body.len() - 2;
            for o in p.body.iter().take(last).cloned() {
                counter += 1;
                let rest = cleaned.fresh_variable(&format!("C#{counter}"), &mut used);
                productions.push(Production::new(head, vec![o, CfgObject::Var(rest.clone())]));
                head = rest;
            }
            productions.push(Production::new(head, p.body[last..].to_vec()));
        }
        Cfg::new(cleaned.start.clone(), productions)
    }

    /// Convert to strict Chomsky normal form: only `A → t` and `A → B C`
    /// productions remain. The empty word is dropped from the language; use
    /// [`Cfg::generates_epsilon`] alongside.
    pub fn to_cnf(&self) -> Cfg {
        let wcnf = self.to_weak_cnf();
        let nullable = wcnf.nullables();
        let mut productions = Vec::new();
        for p in &wcnf.productions {
            match p.body.as_slice() {
                [] => {}
                [CfgObject::Term(_)] => productions.push(p.clone()),
                [CfgObject::Var(b), CfgObject::Var(c)] => {
                    productions.push(p.clone());
                    if nullable.contains(c) {
                        productions
                            .push(Production::new(p.head.clone(), vec![CfgObject::Var(b.clone())]));
                    }
                    if nullable.contains(b) {
                        productions
                            .push(Production::new(p.head.clone(), vec![CfgObject::Var(c.clone())]));
                    }
                }
                other => {
                    debug_assert!(false, "weak CNF produced body {other:?}");
                }
            }
        }
        Cfg::new(wcnf.start.clone(), productions)
            .eliminate_unit_productions()
            .remove_useless_symbols()
    }

    /// Whether the grammar generates the given word (sequence of terminal
    /// names). Decided by a nullable-aware CYK over the weak CNF.
    pub fn contains(&self, word: &[&str]) -> bool {
        let wcnf = self.to_weak_cnf();
        if word.is_empty() {
            return wcnf.generates_epsilon();
        }
        let nullable = wcnf.nullables();
        let mut term_heads: AHashMap<&str, Vec<&Variable>> = AHashMap::default();
        let mut bin_prods: Vec<(&Variable, &Variable, &Variable)> = Vec::new();
        for p in &wcnf.productions {
            match p.body.as_slice() {
                [CfgObject::Term(t)] => term_heads.entry(t.name()).or_default().push(&p.head),
                [CfgObject::Var(b), CfgObject::Var(c)] => bin_prods.push((&p.head, b, c)),
                _ => {}
            }
        }
        let saturate = |cell: &mut AHashSet<Variable>| loop {
            let mut changed = false;
            for (a, b, c) in &bin_prods {
                if cell.contains(*a) {
                    continue;
                }
                if (cell.contains(*b) && nullable.contains(*c))
                    || (nullable.contains(*b) && cell.contains(*c))
                {
                    cell.insert((*a).clone());
                    changed = true;
                }
            }
            if !changed {
                break;
            }
        };
        let n = word.len();
        let mut table: Vec<Vec<AHashSet<Variable>>> = vec![vec![AHashSet::new(); n]; n];
        for (i, letter) in word.iter().enumerate() {
            let mut cell: AHashSet<Variable> = term_heads
                .get(letter)
                .map(|heads| heads.iter().map(|v| (*v).clone()).collect())
                .unwrap_or_default();
            saturate(&mut cell);
            table[i][i] = cell;
        }
        for width in 1..n {
            for i in 0..n - width {
                let j = i + width;
                let mut cell = AHashSet::new();
                for k in i..j {
                    for (a, b, c) in &bin_prods {
                        if table[i][k].contains(*b) && table[k + 1][j].contains(*c) {
                            cell.insert((*a).clone());
                        }
                    }
                }
                saturate(&mut cell);
                table[i][j] = cell;
            }
        }
        table[0][n - 1].contains(&self.start)
    }

    /// The Bar-Hillel product with a finite automaton: a grammar generating
    /// exactly the words of this grammar that the automaton accepts.
    ///
    /// The automaton is determinised first so that ε transitions cannot leak
    /// into the product. Triple variables are written `q#A#q'`; the result is
    /// trimmed of useless symbols.
    pub fn intersect_with_nfa(&self, nfa: &Nfa) -> Cfg {
        let dfa = nfa.determinize();
        let wcnf = self.to_weak_cnf();
        let states: Vec<u32> = dfa.states().iter().copied().collect();
        let triple = |q: u32, a: &Variable, r: u32| Variable::new(format!("{q}#{}#{r}", a.name()));
        let mut productions = Vec::new();
        for p in &wcnf.productions {
            match p.body.as_slice() {
                [] => {
                    for &q in &states {
                        productions.push(Production::new(triple(q, &p.head, q), vec![]));
                    }
                }
                [CfgObject::Term(t)] => {
                    for (from, label, to) in dfa.transitions() {
                        if let Symbol::Term(edge) = label {
                            if edge == t {
                                productions.push(Production::new(
                                    triple(*from, &p.head, *to),
                                    vec![CfgObject::Term(t.clone())],
                                ));
                            }
                        }
                    }
                }
                [CfgObject::Var(b), CfgObject::Var(c)] => {
                    for &q in &states {
                        for &q1 in &states {
                            for &q2 in &states {
                                productions.push(Production::new(
                                    triple(q, &p.head, q2),
                                    vec![
                                        CfgObject::Var(triple(q, b, q1)),
                                        CfgObject::Var(triple(q1, c, q2)),
                                    ],
                                ));
                            }
                        }
                    }
                }
                _ => {}
            }
        }
        let mut used: BTreeSet<Variable> = productions
            .iter()
            .map(|p| p.head.clone())
            .collect();
        let start = wcnf.fresh_variable(&format!("{}#product", wcnf.start.name()), &mut used);
        for &q0 in dfa.starts() {
            for &qf in dfa.finals() {
                productions.push(Production::new(
                    start.clone(),
                    vec![CfgObject::Var(triple(q0, &wcnf.start, qf))],
                ));
            }
        }
        Cfg::new(start, productions).remove_useless_symbols()
    }
}
