/*!
# pathlang

This crate answers *path queries* over labelled directed multigraphs: given a
graph whose edges carry symbolic labels and a query language — a regular
expression or a context-free grammar — it computes the pairs of vertices
connected by a path that spells a word of the language. It is a batch
analytics engine: inputs are finite and in-memory, and results come back as
sets of pairs or triples.

The core is an algebraic closure engine. Automata are decomposed into
per-label boolean CSR matrices ([`automaton::MatrixAutomaton`]); Kronecker
products intersect them, a monotone-`nnz` loop closes them, and direct sums
drive a multi-source BFS. Three context-free engines (Hellings worklist,
matrix iteration, RSM tensor product) share one normalisation stage: weak
Chomsky normal form and recursive state machines ([`cfg`], [`ecfg`],
[`rsm`]).

## Regular-path queries

```rust
use pathlang::{query, Graph};

let mut graph = Graph::new();
graph.add_edge(0, "a", 1);
graph.add_edge(1, "a", 2);
let pairs = query::rpq(&graph, "a a", None, None).unwrap();
assert!(pairs.contains(&(0, 2)));
assert_eq!(pairs.len(), 1);
```

The regex dialect: concatenation by space (or `.`), union by `|`, Kleene star
by `*`, grouping by `(...)`, `$` (or `epsilon`) for the empty word, literal
tokens otherwise.

## Context-free path queries

```rust
use pathlang::graph::two_cycles_graph;
use pathlang::query::{cfpq, Algorithm};
use pathlang::Cfg;

let cfg = Cfg::from_text("S -> a S b | $", "S").unwrap();
let graph = two_cycles_graph(1, 1, ("a", "b"));
let hellings = cfpq(&cfg, &graph, "S", None, None, Algorithm::Hellings).unwrap();
let tensor = cfpq(&cfg, &graph, "S", None, None, Algorithm::Tensor).unwrap();
assert_eq!(hellings, tensor);
```

Grammars use one production per line, `->` between head and body, `|` between
alternatives and `$` for ε. Tokens starting with a capital letter (and tokens
appearing as heads) are nonterminals.

## Multi-source BFS

```rust
use std::collections::BTreeSet;
use pathlang::query::bfs_rpq;
use pathlang::rpq::BfsRpqResult;
use pathlang::Graph;

let mut graph = Graph::new();
graph.add_edge(0, "a", 1);
graph.add_edge(1, "a", 2);
let sources = BTreeSet::from([0, 1]);
match bfs_rpq(&graph, "a*", Some(&sources), None, true).unwrap() {
    BfsRpqResult::Separated(entries) => assert_eq!(entries.len(), 2),
    BfsRpqResult::Merged(..) => unreachable!(),
}
```

## Membership

```rust
use pathlang::{cyk::cyk, Cfg};

let cfg = Cfg::from_text("S -> a S b | $", "S").unwrap();
assert!(cyk(&cfg, &["a", "a", "b", "b"]));
assert!(!cyk(&cfg, &["a", "b", "a"]));
```

Long-running queries accept a [`CancelToken`]; engines check it once per
fixpoint iteration and abort with [`Error::Cancelled`]. Results are
deterministic: the same inputs always produce the same answer set.
*/
#![warn(missing_docs)]
#![warn(rustdoc::broken_intra_doc_links)]
pub mod automaton;
pub mod cfg;
pub mod cfpq;
pub mod console;
pub mod cyk;
pub mod dot;
pub mod ecfg;
pub mod error;
pub mod graph;
pub mod matrix;
pub mod nfa;
pub mod query;
pub mod regex;
pub mod rpq;
pub mod rsm;
pub mod symbol;
pub mod utils;
pub mod value;
pub use cfg::Cfg;
pub use ecfg::Ecfg;
pub use error::Error;
pub use error::Result;
pub use graph::Graph;
pub use nfa::Nfa;
pub use query::Algorithm;
pub use query::GraphRegistry;
pub use query::QueryConfig;
pub use regex::Regex;
pub use rsm::Rsm;
pub use symbol::{Symbol, Terminal, Variable};
pub use utils::CancelToken;
