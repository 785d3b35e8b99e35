//! The query regex dialect: concatenation by space (or `.`), union by `|`,
//! Kleene star by `*`, grouping by `(...)`, `$`/`epsilon` for the empty word,
//! literal tokens otherwise.
use std::fmt;

use nom::branch::alt;
use nom::bytes::complete::take_while1;
use nom::character::complete::{char, multispace0};
use nom::combinator::opt;
use nom::error::ErrorKind;
use nom::sequence::pair;
use nom::Finish;
use nom::IResult;

use crate::error::{Error, Result};
use crate::nfa::Nfa;
use crate::symbol::Symbol;

/// A parsed regular expression over symbolic tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Regex {
    /// The empty word.
    Epsilon,
    /// A single label.
    Token(Symbol),
    /// Left followed by right.
    Concat(Box<Regex>, Box<Regex>),
    /// Left or right.
    Union(Box<Regex>, Box<Regex>),
    /// Zero or more repetitions.
    Star(Box<Regex>),
}

fn token(input: &str) -> IResult<&str, Regex> {
    alt((
        nom::combinator::map(char('$'), |_| Regex::Epsilon),
        nom::combinator::map(
            take_while1(|c: char| c.is_alphanumeric() || c == '_'),
            |t: &str| {
                if t == "epsilon" {
                    Regex::Epsilon
                } else {
                    Regex::Token(Symbol::term(t))
                }
            },
        ),
    ))(input)
}

fn atom(input: &str) -> IResult<&str, Regex> {
    alt((
        nom::sequence::delimited(pair(char('('), multispace0), expr, pair(multispace0, char(')'))),
        token,
    ))(input)
}

fn starred(input: &str) -> IResult<&str, Regex> {
    let (mut input, mut node) = atom(input)?;
    loop {
        let (rest, _) = multispace0(input)?;
        match char::<_, nom::error::Error<&str>>('*')(rest) {
            Ok((rest, _)) => {
                node = Regex::Star(Box::new(node));
                input = rest;
            }
            Err(_) => break,
        }
    }
    Ok((input, node))
}

fn concat(input: &str) -> IResult<&str, Regex> {
    let (mut input, mut node) = starred(input)?;
    loop {
        let (rest, _) = multispace0(input)?;
        let (rest, dot) = opt(char('.'))(rest)?;
        let (rest, _) = multispace0(rest)?;
        match starred(rest) {
            Ok((rest, rhs)) => {
                node = Regex::Concat(Box::new(node), Box::new(rhs));
                input = rest;
            }
            Err(e) => {
                if dot.is_some() {
                    return Err(e);
                }
                break;
            }
        }
    }
    Ok((input, node))
}

fn expr(input: &str) -> IResult<&str, Regex> {
    let (mut input, mut node) = concat(input)?;
    loop {
        let (rest, _) = multispace0(input)?;
        match char::<_, nom::error::Error<&str>>('|')(rest) {
            Ok((rest, _)) => {
                let (rest, _) = multispace0(rest)?;
                let (rest, rhs) = concat(rest)?;
                node = Regex::Union(Box::new(node), Box::new(rhs));
                input = rest;
            }
            Err(_) => break,
        }
    }
    Ok((input, node))
}

fn parse_complete(input: &str) -> IResult<&str, Regex> {
    let (input, _) = multispace0(input)?;
    let (input, node) = expr(input)?;
    let (input, _) = multispace0(input)?;
    if input.is_empty() {
        Ok((input, node))
    } else {
        Err(nom::Err::Error(nom::error::Error::new(input, ErrorKind::Eof)))
    }
}

impl Regex {
    /// Parse a plain query regex. Every token is read as a terminal.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidInput`] on malformed syntax.
    pub fn parse(input: &str) -> Result<Regex> {
        match parse_complete(input).finish() {
            Ok((_, node)) => Ok(node),
            Err(e) => Err(Error::invalid(format!(
                "regex syntax error near {:?}",
                e.input
            ))),
        }
    }

    /// Parse an ECFG production body: capitalised tokens are read as
    /// nonterminals, the rest as terminals.
    pub fn parse_grammar_body(input: &str) -> Result<Regex> {
        Ok(Self::parse(input)?.capitalized_as_variables())
    }

    fn capitalized_as_variables(self) -> Regex {
        match self {
            Regex::Token(Symbol::Term(t)) => {
                if t.name().starts_with(|c: char| c.is_uppercase()) {
                    Regex::Token(Symbol::var(t.0))
                } else {
                    Regex::Token(Symbol::Term(t))
                }
            }
            Regex::Concat(a, b) => Regex::Concat(
                Box::new(a.capitalized_as_variables()),
                Box::new(b.capitalized_as_variables()),
            ),
            Regex::Union(a, b) => Regex::Union(
                Box::new(a.capitalized_as_variables()),
                Box::new(b.capitalized_as_variables()),
            ),
            Regex::Star(a) => Regex::Star(Box::new(a.capitalized_as_variables())),
            other => other,
        }
    }

    /// Thompson construction to an ε-NFA with a single start and a single
    /// final state.
    pub fn to_nfa(&self) -> Nfa {
        let mut nfa = Nfa::new();
        let mut next = 0u32;
        let (start, end) = self.build(&mut nfa, &mut next);
        nfa.add_start(start);
        nfa.add_final(end);
        nfa
    }

    fn build(&self, nfa: &mut Nfa, next: &mut u32) -> (u32, u32) {
        fn fresh(next: &mut u32) -> u32 {
            let id = *next;
            *next += 1;
            id
        }
        match self {
            Regex::Epsilon => {
                let (s, f) = (fresh(next), fresh(next));
                nfa.add_transition(s, Symbol::Eps, f);
                (s, f)
            }
            Regex::Token(label) => {
                let (s, f) = (fresh(next), fresh(next));
                nfa.add_transition(s, label.clone(), f);
                (s, f)
            }
            Regex::Concat(a, b) => {
                let (sa, fa) = a.build(nfa, next);
                let (sb, fb) = b.build(nfa, next);
                nfa.add_transition(fa, Symbol::Eps, sb);
                (sa, fb)
            }
            Regex::Union(a, b) => {
                let (sa, fa) = a.build(nfa, next);
                let (sb, fb) = b.build(nfa, next);
                let (s, f) = (fresh(next), fresh(next));
                nfa.add_transition(s, Symbol::Eps, sa);
                nfa.add_transition(s, Symbol::Eps, sb);
                nfa.add_transition(fa, Symbol::Eps, f);
                nfa.add_transition(fb, Symbol::Eps, f);
                (s, f)
            }
            Regex::Star(a) => {
                let (sa, fa) = a.build(nfa, next);
                let (s, f) = (fresh(next), fresh(next));
                nfa.add_transition(s, Symbol::Eps, sa);
                nfa.add_transition(s, Symbol::Eps, f);
                nfa.add_transition(fa, Symbol::Eps, sa);
                nfa.add_transition(fa, Symbol::Eps, f);
                (s, f)
            }
        }
    }

    /// Union with another regex, used when merging grammar bodies per head.
    pub fn union(self, other: Regex) -> Regex {
        Regex::Union(Box::new(self), Box::new(other))
    }
}

impl fmt::Display for Regex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn atomic(node: &Regex) -> bool {
            matches!(node, Regex::Epsilon | Regex::Token(_) | Regex::Star(_))
        }
        match self {
            Regex::Epsilon => f.write_str("$"),
            Regex::Token(s) => write!(f, "{s}"),
            Regex::Concat(a, b) => {
                for (i, part) in [a, b].into_iter().enumerate() {
                    if i > 0 {
                        f.write_str(" ")?;
                    }
                    if matches!(part.as_ref(), Regex::Union(..)) {
                        write!(f, "({part})")?;
                    } else {
                        write!(f, "{part}")?;
                    }
                }
                Ok(())
            }
            Regex::Union(a, b) => write!(f, "{a} | {b}"),
            Regex::Star(a) => {
                if atomic(a) && !matches!(a.as_ref(), Regex::Star(_)) {
                    write!(f, "{a}*")
                } else {
                    write!(f, "({a})*")
                }
            }
        }
    }
}

/// Compile a query regex to its language-equivalent minimal DFA.
///
/// # Errors
///
/// [`Error::InvalidInput`] on malformed regex syntax.
pub fn regex_to_min_dfa(input: &str) -> Result<Nfa> {
    Ok(Regex::parse(input)?.to_nfa().minimize())
}
