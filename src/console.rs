//! A line-oriented REPL over the query facade and the graph registry.
//!
//! One statement per line; results go to the output stream, errors to the
//! error stream, and `quit` ends the session. The REPL is an environmental
//! collaborator: everything it does routes through [`crate::query`].
use std::io::{BufRead, Write};
use std::str::FromStr;

use crate::cfg::Cfg;
use crate::error::{Error, Result};
use crate::query::{self, Algorithm, GraphRegistry, QueryConfig};
use crate::utils::get_deterministic_form_from_hash_set;

fn io_error(e: std::io::Error) -> Error {
    Error::invalid(format!("io error: {e}"))
}

/// Evaluate one statement against the registry, writing results to `out`.
/// Returns `false` when the statement asks the session to end.
///
/// # Errors
///
/// [`Error::InvalidInput`] on unknown or malformed statements; facade errors
/// are passed through verbatim.
pub fn eval_line(registry: &mut GraphRegistry, line: &str, out: &mut dyn Write) -> Result<bool> {
    let mut words = line.split_whitespace();
    let Some(command) = words.next() else {
        return Ok(true);
    };
    let rest: Vec<&str> = words.collect();
    match command {
        "quit" => {
            writeln!(out, "Quit...").map_err(io_error)?;
            Ok(false)
        }
        "graph-info" => {
            let [name] = rest.as_slice() else {
                return Err(Error::invalid("usage: graph-info <name>"));
            };
            let stats = registry.stats(name)?;
            writeln!(out, "Number of nodes: {}", stats.vertices).map_err(io_error)?;
            writeln!(out, "Number of edges: {}", stats.edges).map_err(io_error)?;
            let labels: Vec<&str> = stats.labels.iter().map(String::as_str).collect();
            writeln!(out, "Labels: {}", labels.join(" ")).map_err(io_error)?;
            Ok(true)
        }
        "create-two-cycles" => {
            let (name, first, second, labels) = match rest.as_slice() {
                [name, first, second] => (*name, *first, *second, ("a", "b")),
                [name, first, second, l1, l2] => (*name, *first, *second, (*l1, *l2)),
                _ => {
                    return Err(Error::invalid(
                        "usage: create-two-cycles <name> <first> <second> [<label1> <label2>]",
                    ))
                }
            };
            let first: u32 = first
                .parse()
                .map_err(|_| Error::invalid(format!("{first:?} is not a cycle size")))?;
            let second: u32 = second
                .parse()
                .map_err(|_| Error::invalid(format!("{second:?} is not a cycle size")))?;
            registry.create_two_cycles(name, first, second, labels);
            writeln!(out, "Graph {name:?} has been created.").map_err(io_error)?;
            Ok(true)
        }
        "save-dot" => {
            let [name, path] = rest.as_slice() else {
                return Err(Error::invalid("usage: save-dot <name> <path>"));
            };
            registry.save_dot(name, path)?;
            writeln!(out, "Graph was saved in {path}").map_err(io_error)?;
            Ok(true)
        }
        "load-dot" => {
            let [name, path] = rest.as_slice() else {
                return Err(Error::invalid("usage: load-dot <name> <path>"));
            };
            registry.load_dot(*name, path)?;
            writeln!(out, "Graph {name:?} has been loaded.").map_err(io_error)?;
            Ok(true)
        }
        "rpq" => {
            let Some((name, regex_words)) = rest.split_first() else {
                return Err(Error::invalid("usage: rpq <name> <regex>"));
            };
            if regex_words.is_empty() {
                return Err(Error::invalid("usage: rpq <name> <regex>"));
            }
            let regex = regex_words.join(" ");
            let graph = registry.get_graph(name)?;
            let pairs = query::rpq(graph, &regex, None, None)?;
            for (u, v) in get_deterministic_form_from_hash_set(&pairs, |&p| p) {
                writeln!(out, "{u} {v}").map_err(io_error)?;
            }
            Ok(true)
        }
        "cfpq" => {
            let config = QueryConfig::default();
            let (name, path, algorithm, start) = match rest.as_slice() {
                [name, path] => (*name, *path, config.algorithm, config.start_symbol.clone()),
                [name, path, algorithm] => (
                    *name,
                    *path,
                    Algorithm::from_str(algorithm).map_err(|_| {
                        Error::invalid(format!("{algorithm:?} is not an algorithm name"))
                    })?,
                    config.start_symbol.clone(),
                ),
                [name, path, algorithm, start] => (
                    *name,
                    *path,
                    Algorithm::from_str(algorithm).map_err(|_| {
                        Error::invalid(format!("{algorithm:?} is not an algorithm name"))
                    })?,
                    (*start).to_string(),
                ),
                _ => {
                    return Err(Error::invalid(
                        "usage: cfpq <name> <grammar-file> [<algorithm>] [<start-symbol>]",
                    ))
                }
            };
            let cfg = Cfg::from_file(path, &start)?;
            let graph = registry.get_graph(name)?;
            let pairs = query::cfpq(&cfg, graph, &start, None, None, algorithm)?;
            for (u, v) in get_deterministic_form_from_hash_set(&pairs, |&p| p) {
                writeln!(out, "{u} {v}").map_err(io_error)?;
            }
            Ok(true)
        }
        unknown => Err(Error::invalid(format!("unknown statement {unknown:?}"))),
    }
}

/// Read statements line by line until end of input or `quit`.
///
/// Statement errors are reported on `err` and do not end the session.
pub fn run(
    registry: &mut GraphRegistry,
    input: impl BufRead,
    mut out: impl Write,
    mut err: impl Write,
) -> std::io::Result<()> {
    for line in input.lines() {
        let line = line?;
        match eval_line(registry, &line, &mut out) {
            Ok(true) => {}
            Ok(false) => break,
            Err(e) => writeln!(err, "error: {e}")?,
        }
    }
    Ok(())
}
