//! Tagged automaton-like values backing the embedded query DSL.
//!
//! The DSL's dynamically-overloaded operators (one `intersect` that works on
//! whatever operands it gets) become explicit arms per combination here;
//! ill-typed combinations report [`Error::TypeMismatch`] and defined-but-
//! meaningless ones report [`Error::Unsupported`].
use std::collections::BTreeSet;

use crate::automaton::MatrixAutomaton;
use crate::cfg::Cfg;
use crate::error::{Error, Result};
use crate::nfa::Nfa;
use crate::utils::CancelToken;

/// A set value with a consistent element type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetValue {
    /// The empty set, compatible with either element type.
    Empty,
    /// A set of integers (vertices).
    Ints(BTreeSet<i64>),
    /// A set of strings (labels, names).
    Strs(BTreeSet<String>),
}

/// One element of a DSL set literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Element {
    /// An integer element.
    Int(i64),
    /// A string element.
    Str(String),
}

impl SetValue {
    /// Build a set from elements, requiring one consistent element type.
    ///
    /// # Errors
    ///
    /// [`Error::TypeMismatch`] when integers and strings are mixed.
    pub fn from_elements(elements: impl IntoIterator<Item = Element>) -> Result<SetValue> {
        let mut ints = BTreeSet::new();
        let mut strs = BTreeSet::new();
        for e in elements {
            match e {
                Element::Int(i) => {
                    ints.insert(i);
                }
                Element::Str(s) => {
                    strs.insert(s);
                }
            }
        }
        match (ints.is_empty(), strs.is_empty()) {
            (true, true) => Ok(SetValue::Empty),
            (false, true) => Ok(SetValue::Ints(ints)),
            (true, false) => Ok(SetValue::Strs(strs)),
            (false, false) => Err(Error::TypeMismatch {
                expected: "set elements of one type".to_string(),
                actual: "a mix of integers and strings".to_string(),
            }),
        }
    }

    fn intersect(&self, other: &SetValue) -> Result<SetValue> {
        match (self, other) {
            (SetValue::Empty, _) | (_, SetValue::Empty) => Ok(SetValue::Empty),
            (SetValue::Ints(a), SetValue::Ints(b)) => {
                Ok(SetValue::Ints(a.intersection(b).cloned().collect()))
            }
            (SetValue::Strs(a), SetValue::Strs(b)) => {
                Ok(SetValue::Strs(a.intersection(b).cloned().collect()))
            }
            _ => Err(Error::TypeMismatch {
                expected: "sets with matching element types".to_string(),
                actual: "an integer set and a string set".to_string(),
            }),
        }
    }

    fn union(&self, other: &SetValue) -> Result<SetValue> {
        match (self, other) {
            (SetValue::Empty, x) | (x, SetValue::Empty) => Ok(x.clone()),
            (SetValue::Ints(a), SetValue::Ints(b)) => {
                Ok(SetValue::Ints(a.union(b).cloned().collect()))
            }
            (SetValue::Strs(a), SetValue::Strs(b)) => {
                Ok(SetValue::Strs(a.union(b).cloned().collect()))
            }
            _ => Err(Error::TypeMismatch {
                expected: "sets with matching element types".to_string(),
                actual: "an integer set and a string set".to_string(),
            }),
        }
    }

    fn as_vertices(&self) -> Result<BTreeSet<u32>> {
        match self {
            SetValue::Empty => Ok(BTreeSet::new()),
            SetValue::Ints(ints) => ints
                .iter()
                .map(|&i| {
                    u32::try_from(i)
                        .map_err(|_| Error::invalid(format!("{i} is not a valid vertex")))
                })
                .collect(),
            SetValue::Strs(_) => Err(Error::TypeMismatch {
                expected: "a set of vertices".to_string(),
                actual: "a set of strings".to_string(),
            }),
        }
    }
}

/// An automaton-like DSL value.
#[derive(Debug, Clone)]
pub enum Value {
    /// A finite automaton.
    Fa(Nfa),
    /// A context-free grammar.
    Cfg(Cfg),
    /// A set.
    Set(SetValue),
    /// A boolean.
    Bool(bool),
}

impl Value {
    fn kind(&self) -> &'static str {
        match self {
            Value::Fa(_) => "a finite automaton",
            Value::Cfg(_) => "a context-free grammar",
            Value::Set(_) => "a set",
            Value::Bool(_) => "a boolean",
        }
    }

    /// Intersect two values. FA∩FA runs through the matrix algebra; FA∩CFG
    /// (either order) is the Bar-Hillel product; CFG∩CFG is ill-typed.
    pub fn intersect(&self, other: &Value) -> Result<Value> {
        match (self, other) {
            (Value::Fa(a), Value::Fa(b)) => {
                let am = MatrixAutomaton::from_nfa(a);
                let bm = MatrixAutomaton::from_nfa(b);
                Ok(Value::Fa(am.intersect(&bm).to_nfa()))
            }
            (Value::Fa(fa), Value::Cfg(cfg)) | (Value::Cfg(cfg), Value::Fa(fa)) => {
                Ok(Value::Cfg(cfg.intersect_with_nfa(fa)))
            }
            (Value::Cfg(_), Value::Cfg(_)) => Err(Error::TypeMismatch {
                expected: "a finite automaton on one side".to_string(),
                actual: "two context-free grammars".to_string(),
            }),
            (Value::Set(a), Value::Set(b)) => Ok(Value::Set(a.intersect(b)?)),
            (Value::Bool(a), Value::Bool(b)) => Ok(Value::Bool(*a && *b)),
            (a, b) => Err(Error::TypeMismatch {
                expected: format!("operands of matching kinds, left was {}", a.kind()),
                actual: b.kind().to_string(),
            }),
        }
    }

    /// Union of two values.
    pub fn union(&self, other: &Value) -> Result<Value> {
        match (self, other) {
            (Value::Fa(a), Value::Fa(b)) => Ok(Value::Fa(a.union(b))),
            (Value::Set(a), Value::Set(b)) => Ok(Value::Set(a.union(b)?)),
            (Value::Bool(a), Value::Bool(b)) => Ok(Value::Bool(*a || *b)),
            (Value::Cfg(_), Value::Cfg(_)) => Err(Error::Unsupported(
                "union of context-free grammars".to_string(),
            )),
            (a, b) => Err(Error::TypeMismatch {
                expected: format!("operands of matching kinds, left was {}", a.kind()),
                actual: b.kind().to_string(),
            }),
        }
    }

    /// Concatenation of two automata.
    pub fn concat(&self, other: &Value) -> Result<Value> {
        match (self, other) {
            (Value::Fa(a), Value::Fa(b)) => Ok(Value::Fa(a.concat(b))),
            (a, b) => Err(Error::Unsupported(format!(
                "concatenation of {} and {}",
                a.kind(),
                b.kind()
            ))),
        }
    }

    /// Kleene star of an automaton.
    pub fn kleene(&self) -> Result<Value> {
        match self {
            Value::Fa(a) => Ok(Value::Fa(a.star())),
            other => Err(Error::Unsupported(format!(
                "Kleene star on {}",
                other.kind()
            ))),
        }
    }

    /// Complement of an automaton (with respect to its own alphabet) or
    /// negation of a boolean.
    pub fn complement(&self) -> Result<Value> {
        match self {
            Value::Fa(a) => Ok(Value::Fa(a.complement())),
            Value::Bool(b) => Ok(Value::Bool(!b)),
            other => Err(Error::Unsupported(format!(
                "complement of {}",
                other.kind()
            ))),
        }
    }

    fn expect_fa(&self) -> Result<&Nfa> {
        match self {
            Value::Fa(fa) => Ok(fa),
            other => Err(Error::TypeMismatch {
                expected: "a finite automaton".to_string(),
                actual: other.kind().to_string(),
            }),
        }
    }

    /// Replace the automaton's start states.
    pub fn set_start(&self, starts: &SetValue) -> Result<Value> {
        let mut fa = self.expect_fa()?.clone();
        fa.replace_starts(starts.as_vertices()?);
        Ok(Value::Fa(fa))
    }

    /// Replace the automaton's final states.
    pub fn set_final(&self, finals: &SetValue) -> Result<Value> {
        let mut fa = self.expect_fa()?.clone();
        fa.replace_finals(finals.as_vertices()?);
        Ok(Value::Fa(fa))
    }

    /// Add start states to the automaton.
    pub fn add_start(&self, starts: &SetValue) -> Result<Value> {
        let mut fa = self.expect_fa()?.clone();
        for v in starts.as_vertices()? {
            fa.add_start(v);
        }
        Ok(Value::Fa(fa))
    }

    /// Add final states to the automaton.
    pub fn add_final(&self, finals: &SetValue) -> Result<Value> {
        let mut fa = self.expect_fa()?.clone();
        for v in finals.as_vertices()? {
            fa.add_final(v);
        }
        Ok(Value::Fa(fa))
    }

    /// The states reachable from a start state that are also final, via the
    /// closure of the automaton's transition matrices.
    pub fn reachable(&self) -> Result<Value> {
        let fa = self.expect_fa()?;
        let m = MatrixAutomaton::from_nfa(fa);
        let closure = m.transitive_closure(&CancelToken::new())?;
        let mut out = BTreeSet::new();
        for (i, j) in closure.iter() {
            if m.is_start(i as usize) && m.is_final(j as usize) {
                out.insert(i64::from(*m.state(j as usize)));
            }
        }
        if out.is_empty() {
            Ok(Value::Set(SetValue::Empty))
        } else {
            Ok(Value::Set(SetValue::Ints(out)))
        }
    }

    /// The automaton's start states as a set value.
    pub fn starts(&self) -> Result<Value> {
        let fa = self.expect_fa()?;
        Ok(Value::Set(SetValue::from_elements(
            fa.starts().iter().map(|&s| Element::Int(i64::from(s))),
        )?))
    }

    /// The automaton's final states as a set value.
    pub fn finals(&self) -> Result<Value> {
        let fa = self.expect_fa()?;
        Ok(Value::Set(SetValue::from_elements(
            fa.finals().iter().map(|&s| Element::Int(i64::from(s))),
        )?))
    }

    /// The automaton's transition labels as a set value.
    pub fn labels(&self) -> Result<Value> {
        let fa = self.expect_fa()?;
        Ok(Value::Set(SetValue::from_elements(
            fa.symbols()
                .into_iter()
                .map(|s| Element::Str(s.to_string())),
        )?))
    }

    /// The automaton's states as a set value.
    pub fn vertices(&self) -> Result<Value> {
        let fa = self.expect_fa()?;
        Ok(Value::Set(SetValue::from_elements(
            fa.states().iter().map(|&s| Element::Int(i64::from(s))),
        )?))
    }

    /// Edge enumeration is defined but not provided at the DSL level.
    pub fn edges(&self) -> Result<Value> {
        let _ = self.expect_fa()?;
        Err(Error::Unsupported(
            "edge enumeration on a finite automaton".to_string(),
        ))
    }
}
