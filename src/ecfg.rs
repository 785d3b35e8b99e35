//! Extended context-free grammars: one regex body per nonterminal.
use std::collections::{BTreeMap, BTreeSet};

use crate::cfg::{Cfg, CfgObject};
use crate::error::{Error, Result};
use crate::regex::Regex;
use crate::symbol::{Symbol, Variable};

/// A grammar with exactly one regular-expression body per head. Bodies of
/// several plain productions with the same head are merged by union.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ecfg {
    variables: BTreeSet<Variable>,
    start: Variable,
    productions: BTreeMap<Variable, Regex>,
}

impl Ecfg {
    /// Build an ECFG from a plain grammar, merging bodies per head.
    pub fn from_cfg(cfg: &Cfg) -> Ecfg {
        let mut variables = cfg.variables().clone();
        variables.insert(cfg.start_symbol().clone());
        let mut productions: BTreeMap<Variable, Regex> = BTreeMap::new();
        for p in cfg.productions() {
            let mut body: Option<Regex> = None;
            for o in &p.body {
                let token = Regex::Token(match o {
                    CfgObject::Var(v) => Symbol::Var(v.clone()),
                    CfgObject::Term(t) => Symbol::Term(t.clone()),
                });
                body = Some(match body {
                    None => token,
                    Some(prefix) => Regex::Concat(Box::new(prefix), Box::new(token)),
                });
            }
            let body = body.unwrap_or(Regex::Epsilon);
            productions
                .entry(p.head.clone())
                .and_modify(|existing| {
                    *existing = existing.clone().union(body.clone());
                })
                .or_insert(body);
        }
        Ecfg {
            variables,
            start: cfg.start_symbol().clone(),
            productions,
        }
    }

    /// Parse the textual ECFG form: one `head -> regex` production per line.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidInput`] on malformed lines, repeated heads or regex
    /// syntax errors.
    pub fn from_text(text: &str, start: &str) -> Result<Ecfg> {
        let mut variables = BTreeSet::new();
        let mut productions = BTreeMap::new();
        for raw in text.lines() {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            let Some((head, body)) = line.split_once("->") else {
                return Err(Error::invalid(format!(
                    "expected one `head -> body` production per line, got {line:?}"
                )));
            };
            let head = Variable::new(head.trim());
            if !variables.insert(head.clone()) {
                return Err(Error::invalid(format!(
                    "variable {head} has more than one production"
                )));
            }
            productions.insert(head, Regex::parse_grammar_body(body.trim())?);
        }
        let start = Variable::new(start);
        variables.insert(start.clone());
        Ok(Ecfg {
            variables,
            start,
            productions,
        })
    }

    /// The textual form, one production per line in head order.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        for (head, body) in &self.productions {
            out.push_str(&format!("{head} -> {body}\n"));
        }
        out
    }

    /// The start nonterminal.
    pub fn start_symbol(&self) -> &Variable {
        &self.start
    }

    /// The nonterminal set.
    pub fn variables(&self) -> &BTreeSet<Variable> {
        &self.variables
    }

    /// The per-head bodies, ordered by head.
    pub fn productions(&self) -> &BTreeMap<Variable, Regex> {
        &self.productions
    }
}
