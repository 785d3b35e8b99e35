//! DOT export and import for labelled graphs.
//!
//! Only the fragment this crate produces is understood: a `digraph` whose
//! edges carry a `label` attribute and whose node names are numeric.
use std::io::Write;
use std::path::Path;

use nom::branch::alt;
use nom::bytes::complete::{tag, take_while1};
use nom::character::complete::{char, multispace0, multispace1};
use nom::combinator::opt;
use nom::multi::separated_list0;
use nom::sequence::{delimited, preceded};
use nom::Finish;
use nom::IResult;

use crate::error::{Error, Result};
use crate::graph::Graph;

/// Render the graph in DOT form.
pub fn to_dot(graph: &Graph) -> String {
    let mut out = String::from("digraph {\n");
    for &v in graph.vertices() {
        out.push_str(&format!("    {v};\n"));
    }
    for (from, label, to) in graph.edges() {
        out.push_str(&format!("    {from} -> {to} [label={label}];\n"));
    }
    out.push_str("}\n");
    out
}

/// Write the graph to a DOT file.
///
/// # Errors
///
/// [`Error::InvalidInput`] when the file cannot be written.
pub fn save_dot(graph: &Graph, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let mut file = std::fs::File::create(path)
        .map_err(|e| Error::invalid(format!("cannot create {}: {e}", path.display())))?;
    file.write_all(to_dot(graph).as_bytes())
        .map_err(|e| Error::invalid(format!("cannot write {}: {e}", path.display())))
}

/// Read a graph from a DOT file.
pub fn load_dot(path: impl AsRef<Path>) -> Result<Graph> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)
        .map_err(|e| Error::invalid(format!("cannot read {}: {e}", path.display())))?;
    from_dot(&text)
}

enum Stmt {
    Node(u32),
    Edge(u32, u32, Option<String>),
}

fn ident(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_alphanumeric() || c == '_')(input)
}

fn quoted(input: &str) -> IResult<&str, &str> {
    delimited(char('"'), take_while1(|c| c != '"'), char('"'))(input)
}

fn value(input: &str) -> IResult<&str, &str> {
    alt((quoted, ident))(input)
}

fn attrs(input: &str) -> IResult<&str, Vec<(&str, &str)>> {
    delimited(
        preceded(char('['), multispace0),
        separated_list0(
            delimited(multispace0, alt((char(','), char(';'))), multispace0),
            nom::sequence::separated_pair(
                ident,
                delimited(multispace0, char('='), multispace0),
                value,
            ),
        ),
        preceded(multispace0, char(']')),
    )(input)
}

fn stmt(input: &str) -> IResult<&str, Stmt> {
    let (input, from) = value(input)?;
    let (input, _) = multispace0(input)?;
    let (input, arrow) = opt(tag("->"))(input)?;
    let from_id = match from.parse::<u32>() {
        Ok(id) => id,
        Err(_) => {
            return Err(nom::Err::Error(nom::error::Error::new(
                input,
                nom::error::ErrorKind::Digit,
            )))
        }
    };
    match arrow {
        None => {
            let (input, _) = opt(preceded(multispace0, attrs))(input)?;
            Ok((input, Stmt::Node(from_id)))
        }
        Some(_) => {
            let (input, _) = multispace0(input)?;
            let (input, to) = value(input)?;
            let to_id = match to.parse::<u32>() {
                Ok(id) => id,
                Err(_) => {
                    return Err(nom::Err::Error(nom::error::Error::new(
                        input,
                        nom::error::ErrorKind::Digit,
                    )))
                }
            };
            let (input, attributes) = opt(preceded(multispace0, attrs))(input)?;
            let label = attributes
                .unwrap_or_default()
                .into_iter()
                .find(|(k, _)| *k == "label")
                .map(|(_, v)| v.to_string());
            Ok((input, Stmt::Edge(from_id, to_id, label)))
        }
    }
}

fn document(input: &str) -> IResult<&str, Vec<Stmt>> {
    let (input, _) = multispace0(input)?;
    let (input, _) = opt(tag("strict"))(input)?;
    let (input, _) = multispace0(input)?;
    let (input, _) = tag("digraph")(input)?;
    let (input, _) = opt(preceded(multispace1, ident))(input)?;
    let (input, _) = multispace0(input)?;
    let (input, _) = char('{')(input)?;
    let mut statements = Vec::new();
    let mut rest = input;
    loop {
        let (input, _) = multispace0(rest)?;
        if let Ok((input, _)) = char::<_, nom::error::Error<&str>>('}')(input) {
            let (input, _) = multispace0(input)?;
            return Ok((input, statements));
        }
        let (input, s) = stmt(input)?;
        let (input, _) = multispace0(input)?;
        let (input, _) = opt(char(';'))(input)?;
        statements.push(s);
        rest = input;
    }
}

/// Parse a graph from DOT text. Edges without a `label` attribute are skipped
/// with a warning.
///
/// # Errors
///
/// [`Error::InvalidInput`] on malformed DOT or non-numeric node names.
pub fn from_dot(text: &str) -> Result<Graph> {
    let (rest, statements) = document(text)
        .finish()
        .map_err(|e| Error::invalid(format!("DOT syntax error near {:?}", e.input)))?;
    if !rest.is_empty() {
        return Err(Error::invalid(format!(
            "trailing content after DOT graph: {rest:?}"
        )));
    }
    let mut graph = Graph::new();
    for s in statements {
        match s {
            Stmt::Node(v) => graph.add_vertex(v),
            Stmt::Edge(from, to, Some(label)) => graph.add_edge(from, &label, to),
            Stmt::Edge(from, to, None) => {
                log::warn!("skipping unlabelled edge {from} -> {to} in DOT input");
                graph.add_vertex(from);
                graph.add_vertex(to);
            }
        }
    }
    Ok(graph)
}
