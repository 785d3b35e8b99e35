#[cfg(test)]

mod tests {
    use std::collections::BTreeSet;
    use std::str::FromStr;

    use ahash::AHashSet;
    use pathlang::automaton::MatrixAutomaton;
    use pathlang::cfg::CfgObject;
    use pathlang::cyk::cyk;
    use pathlang::dot;
    use pathlang::graph::two_cycles_graph;
    use pathlang::matrix::{BoolMatrix, CooMatrix};
    use pathlang::query::{self, Algorithm, GraphRegistry, QueryConfig};
    use pathlang::rpq::BfsRpqResult;
    use pathlang::value::{Element, SetValue, Value};
    use pathlang::{CancelToken, Cfg, Ecfg, Error, Graph, Nfa, Regex, Rsm, Symbol};

    fn graph_from_edges(edges: &[(u32, &str, u32)]) -> Graph {
        let mut graph = Graph::new();
        for &(u, label, v) in edges {
            graph.add_edge(u, label, v);
        }
        graph
    }

    fn vertex_set(vertices: &[u32]) -> BTreeSet<u32> {
        vertices.iter().copied().collect()
    }

    fn pairs(expected: &[(u32, u32)]) -> AHashSet<(u32, u32)> {
        expected.iter().copied().collect()
    }

    fn words_over<'a>(alphabet: &[&'a str], max_len: usize) -> Vec<Vec<&'a str>> {
        let mut words: Vec<Vec<&str>> = vec![vec![]];
        let mut frontier: Vec<Vec<&str>> = vec![vec![]];
        for _ in 0..max_len {
            let mut next = Vec::new();
            for word in &frontier {
                for &letter in alphabet {
                    let mut longer = word.clone();
                    longer.push(letter);
                    next.push(longer);
                }
            }
            words.extend(next.iter().cloned());
            frontier = next;
        }
        words
    }

    fn symbols(word: &[&str]) -> Vec<Symbol> {
        word.iter().map(|&t| Symbol::term(t)).collect()
    }

    #[test]
    fn matrix_primitives() {
        let mut coo = CooMatrix::new(2, 3);
        coo.set(0, 1);
        coo.set(1, 2);
        coo.set(0, 1);
        let m = coo.finalize();
        assert_eq!(m.nnz(), 2);
        assert!(m.get(0, 1) && m.get(1, 2) && !m.get(0, 0));

        let id = BoolMatrix::identity(3);
        assert_eq!(id.nnz(), 3);

        let mut a = CooMatrix::new(2, 2);
        a.set(0, 1);
        let a = a.finalize();
        let mut b = CooMatrix::new(2, 2);
        b.set(1, 0);
        let b = b.finalize();
        let prod = a.matmul(&b).unwrap();
        assert!(prod.get(0, 0) && prod.nnz() == 1);
        let sum = a.or(&b).unwrap();
        assert_eq!(sum.nnz(), 2);

        let kron = a.kron(&b);
        assert_eq!(kron.rows(), 4);
        assert_eq!(kron.cols(), 4);
        assert!(kron.get(1, 2));
        assert_eq!(kron.nnz(), 1);

        let stacked = a.hstack(&b).unwrap();
        assert_eq!(stacked.cols(), 4);
        assert!(stacked.get(0, 1) && stacked.get(1, 2));
        let tall = a.vstack(&b).unwrap();
        assert_eq!(tall.rows(), 4);
        assert!(tall.get(0, 1) && tall.get(3, 0));

        assert!(matches!(
            a.matmul(&BoolMatrix::zero(3, 3)),
            Err(Error::Internal(_))
        ));
        assert!(matches!(
            a.or(&BoolMatrix::zero(3, 3)),
            Err(Error::Internal(_))
        ));
    }

    #[test]
    fn transitive_closure_saturates_strongly_connected() {
        let mut nfa = Nfa::new();
        for (u, label, v) in [
            (0, "a", 1),
            (0, "a", 2),
            (2, "d", 3),
            (1, "c", 1),
            (1, "b", 2),
            (3, "d", 0),
        ] {
            nfa.add_transition(u, Symbol::term(label), v);
        }
        let m = MatrixAutomaton::from_nfa(&nfa);
        let closure = m.transitive_closure(&CancelToken::new()).unwrap();
        assert_eq!(closure.nnz(), 16);
    }

    #[test]
    fn transitive_closure_is_idempotent() {
        let graph = two_cycles_graph(3, 2, ("a", "b"));
        let m = MatrixAutomaton::from_nfa(&graph.to_nfa(None, None).unwrap());
        let once = m.transitive_closure(&CancelToken::new()).unwrap();
        let mut again = Nfa::new();
        for (i, j) in once.iter() {
            again.add_transition(i, Symbol::term("t"), j);
        }
        let twice = MatrixAutomaton::from_nfa(&again)
            .transitive_closure(&CancelToken::new())
            .unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn intersection_matches_classical_product() {
        let mut first = Nfa::new();
        for (u, label, v) in [
            (0, "a", 1),
            (0, "c", 1),
            (0, "c", 0),
            (1, "b", 1),
            (1, "c", 2),
            (2, "d", 0),
        ] {
            first.add_transition(u, Symbol::term(label), v);
        }
        first.add_start(0);
        first.add_final(0);
        first.add_final(1);
        first.add_final(2);

        let mut second = Nfa::new();
        for (u, label, v) in [(0, "a", 1), (0, "a", 0), (1, "b", 1), (1, "e", 2)] {
            second.add_transition(u, Symbol::term(label), v);
        }
        second.add_start(0);
        second.add_final(1);

        let fm = MatrixAutomaton::from_nfa(&first);
        let sm = MatrixAutomaton::from_nfa(&second);
        let product = fm.intersect(&sm).to_nfa();
        let swapped = sm.intersect(&fm).to_nfa();
        for word in words_over(&["a", "b", "c", "d", "e"], 3) {
            let word = symbols(&word);
            let both = first.accepts(&word) && second.accepts(&word);
            assert_eq!(product.accepts(&word), both, "product differs on {word:?}");
            assert_eq!(swapped.accepts(&word), both, "swapped product differs on {word:?}");
        }
    }

    #[test]
    fn rpq_two_cycles() {
        let graph = two_cycles_graph(3, 2, ("x", "y"));
        let cases: &[(&str, &[u32], &[u32], &[(u32, u32)])] = &[
            ("x* | y", &[0], &[1, 2, 3, 4], &[(0, 1), (0, 2), (0, 3), (0, 4)]),
            ("x* | y", &[4], &[4, 5], &[(4, 5)]),
            (
                "x x",
                &[0, 1, 2, 3],
                &[0, 1, 2, 3],
                &[(0, 2), (1, 3), (2, 0), (3, 1)],
            ),
            ("y", &[0], &[0, 1, 2, 3], &[]),
            ("y*", &[0], &[5, 4], &[(0, 5), (0, 4)]),
        ];
        for (regex, starts, finals, expected) in cases {
            let actual = query::rpq(
                &graph,
                regex,
                Some(&vertex_set(starts)),
                Some(&vertex_set(finals)),
            )
            .unwrap();
            assert_eq!(actual, pairs(expected), "rpq({regex})");
        }
    }

    #[test]
    fn rpq_boundary_cases() {
        let empty = Graph::new();
        assert!(query::rpq(&empty, "a*", None, None).unwrap().is_empty());

        let loop_graph = graph_from_edges(&[(7, "a", 7)]);
        assert_eq!(
            query::rpq(&loop_graph, "a*", None, None).unwrap(),
            pairs(&[(7, 7)])
        );

        let graph = two_cycles_graph(3, 2, ("x", "y"));
        assert!(query::rpq(&graph, "z", None, None).unwrap().is_empty());

        let unknown = vertex_set(&[99]);
        assert!(matches!(
            query::rpq(&graph, "x", Some(&unknown), None),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn bfs_rpq_cases() {
        let single = graph_from_edges(&[(0, "a", 1)]);
        let result = query::bfs_rpq(&single, "a*", Some(&vertex_set(&[0])), None, true).unwrap();
        assert_eq!(
            result,
            BfsRpqResult::Separated([(0, vertex_set(&[1]))].into_iter().collect())
        );

        let cycles = two_cycles_graph(2, 1, ("a", "b"));
        let result = query::bfs_rpq(&cycles, "b.a", Some(&vertex_set(&[0])), None, true).unwrap();
        assert_eq!(
            result,
            BfsRpqResult::Separated([(0, vertex_set(&[1, 3]))].into_iter().collect())
        );

        let path = graph_from_edges(&[(0, "a", 1), (1, "a", 2)]);
        let result = query::bfs_rpq(
            &path,
            "a*",
            Some(&vertex_set(&[0, 1])),
            Some(&vertex_set(&[2])),
            true,
        )
        .unwrap();
        assert_eq!(
            result,
            BfsRpqResult::Separated(
                [(0, vertex_set(&[2])), (1, vertex_set(&[2]))]
                    .into_iter()
                    .collect()
            )
        );

        let chain = graph_from_edges(&[(0, "a", 1), (1, "b", 2)]);
        let result = query::bfs_rpq(&chain, "a.b", Some(&vertex_set(&[0])), None, false).unwrap();
        assert_eq!(
            result,
            BfsRpqResult::Merged(vertex_set(&[0]), vertex_set(&[1, 2]))
        );

        let result = query::bfs_rpq(&path, "a*", Some(&vertex_set(&[0, 1])), None, false).unwrap();
        assert_eq!(
            result,
            BfsRpqResult::Merged(vertex_set(&[0, 1]), vertex_set(&[1, 2]))
        );
    }

    #[test]
    fn bfs_rpq_monotone_in_sources() {
        let graph = two_cycles_graph(3, 2, ("x", "y"));
        let small = match query::bfs_rpq(&graph, "x* | y", Some(&vertex_set(&[0])), None, false)
            .unwrap()
        {
            BfsRpqResult::Merged(_, reached) => reached,
            other => panic!("expected merged shape, got {other:?}"),
        };
        let large =
            match query::bfs_rpq(&graph, "x* | y", Some(&vertex_set(&[0, 1])), None, false)
                .unwrap()
            {
                BfsRpqResult::Merged(_, reached) => reached,
                other => panic!("expected merged shape, got {other:?}"),
            };
        assert!(small.is_subset(&large));
    }

    #[test]
    fn rpq_agrees_with_bfs_rpq() {
        let graph = two_cycles_graph(3, 2, ("x", "y"));
        for regex in ["x*", "y", "y*", "x* | y"] {
            let from_rpq = query::rpq(&graph, regex, None, None).unwrap();
            let separated = match query::bfs_rpq(&graph, regex, None, None, true).unwrap() {
                BfsRpqResult::Separated(entries) => entries,
                other => panic!("expected separated shape, got {other:?}"),
            };
            let mut from_bfs = AHashSet::new();
            for (source, reached) in separated {
                for v in reached {
                    from_bfs.insert((source, v));
                }
            }
            assert_eq!(from_rpq, from_bfs, "rpq vs bfs_rpq on {regex}");
        }
    }

    fn cfpq_all(cfg: &Cfg, graph: &Graph, start: &str) -> Vec<AHashSet<(u32, u32)>> {
        [Algorithm::Hellings, Algorithm::Matrix, Algorithm::Tensor]
            .into_iter()
            .map(|algorithm| query::cfpq(cfg, graph, start, None, None, algorithm).unwrap())
            .collect()
    }

    #[test]
    fn cfpq_algorithms_agree_on_dyck_pairs() {
        let cfg = Cfg::from_text("S -> a S b | $", "S").unwrap();
        let graph = two_cycles_graph(3, 2, ("a", "b"));
        let results = cfpq_all(&cfg, &graph, "S");
        assert_eq!(results[0], results[1], "hellings vs matrix");
        assert_eq!(results[0], results[2], "hellings vs tensor");
        let answer = &results[0];
        for v in 0..=5 {
            assert!(answer.contains(&(v, v)), "missing epsilon pair ({v},{v})");
        }
        for hit in [(3, 4), (2, 5), (1, 0), (0, 4)] {
            assert!(answer.contains(&hit), "missing matched pair {hit:?}");
        }
        assert!(!answer.contains(&(0, 1)));
    }

    #[test]
    fn cfpq_algorithms_agree_on_ambiguous_grammar() {
        let cfg = Cfg::from_text("S -> S S | a S b | $", "S").unwrap();
        let graph = two_cycles_graph(2, 2, ("a", "b"));
        let results = cfpq_all(&cfg, &graph, "S");
        assert_eq!(results[0], results[1]);
        assert_eq!(results[0], results[2]);
    }

    #[test]
    fn cfpq_epsilon_grammar_gives_diagonal() {
        let cfg = Cfg::from_text("S -> $", "S").unwrap();
        let graph = graph_from_edges(&[(5, "a", 7), (7, "b", 9)]);
        let expected = pairs(&[(5, 5), (7, 7), (9, 9)]);
        for result in cfpq_all(&cfg, &graph, "S") {
            assert_eq!(result, expected);
        }
    }

    #[test]
    fn cfpq_empty_graph_is_empty() {
        let cfg = Cfg::from_text("S -> a S b | $", "S").unwrap();
        let graph = Graph::new();
        for result in cfpq_all(&cfg, &graph, "S") {
            assert!(result.is_empty());
        }
    }

    #[test]
    fn cfpq_filters_start_and_final_sets() {
        let cfg = Cfg::from_text("S -> a S b | $", "S").unwrap();
        let graph = two_cycles_graph(3, 2, ("a", "b"));
        let starts = vertex_set(&[3]);
        let finals = vertex_set(&[4]);
        for algorithm in [Algorithm::Hellings, Algorithm::Matrix, Algorithm::Tensor] {
            let result =
                query::cfpq(&cfg, &graph, "S", Some(&starts), Some(&finals), algorithm).unwrap();
            assert_eq!(result, pairs(&[(3, 4)]));
        }
    }

    #[test]
    fn wcnf_preserves_language() {
        let samples: &[(&str, &[&[&str]], &[&[&str]])] = &[
            ("S -> S S | $", &[&[]], &[&["a"]]),
            (
                "S -> a S b N c\nS -> $\nN -> $\nN -> N N\nN -> d e f g h",
                &[
                    &[],
                    &["a", "b", "c"],
                    &["a", "a", "b", "c", "b", "c"],
                    &["a", "a", "b", "c", "b", "d", "e", "f", "g", "h", "c"],
                ],
                &[&["a", "b"], &["b", "b"], &["d", "e", "f", "g", "h"]],
            ),
            (
                "S -> A\nA -> B\nB -> b",
                &[&["b"]],
                &[&[], &["a"], &["b", "b"]],
            ),
        ];
        for (text, accepted, rejected) in samples {
            let cfg = Cfg::from_text(text, "S").unwrap();
            let wcnf = cfg.to_weak_cnf();
            for p in wcnf.productions() {
                let valid = match p.body.as_slice() {
                    [] | [CfgObject::Term(_)] | [CfgObject::Var(_), CfgObject::Var(_)] => true,
                    _ => false,
                };
                assert!(valid, "non-normal production in {text:?}: {p:?}");
            }
            for word in *accepted {
                assert!(cfg.contains(word), "{text:?} should accept {word:?}");
                assert!(wcnf.contains(word), "wcnf of {text:?} should accept {word:?}");
            }
            for word in *rejected {
                assert!(!cfg.contains(word), "{text:?} should reject {word:?}");
                assert!(!wcnf.contains(word), "wcnf of {text:?} should reject {word:?}");
            }
        }
    }

    #[test]
    fn wcnf_epsilon_heads() {
        let cases: &[(&str, &[&str])] = &[
            ("S -> S S | $", &["S"]),
            ("S -> S S | A\nA -> B | $\nB -> $", &["S"]),
            ("S -> A a | S a\nA -> $\nB -> $", &["A"]),
        ];
        for (text, expected) in cases {
            let wcnf = Cfg::from_text(text, "S").unwrap().to_weak_cnf();
            let eps_heads: BTreeSet<&str> = wcnf
                .productions()
                .iter()
                .filter(|p| p.body.is_empty())
                .map(|p| p.head.name())
                .collect();
            let expected: BTreeSet<&str> = expected.iter().copied().collect();
            assert_eq!(eps_heads, expected, "epsilon heads of {text:?}");
        }
    }

    #[test]
    fn cyk_agrees_with_contains() {
        let grammars = [
            "S -> a S b | $",
            "S -> S S | a S b | $",
            "S -> A\nA -> B\nB -> b",
        ];
        let words = words_over(&["a", "b"], 4);
        for text in grammars {
            let cfg = Cfg::from_text(text, "S").unwrap();
            for word in &words {
                assert_eq!(
                    cyk(&cfg, word),
                    cfg.contains(word),
                    "cyk vs contains on {text:?} / {word:?}"
                );
            }
        }
    }

    #[test]
    fn cyk_scenarios() {
        let cfg = Cfg::from_text("S -> a S b | $", "S").unwrap();
        assert!(cyk(&cfg, &["a", "a", "b", "b"]));
        assert!(!cyk(&cfg, &["a", "b", "a"]));
        assert!(cyk(&cfg, &[]));

        let chain = Cfg::from_text("S -> A\nA -> B\nB -> b", "S").unwrap();
        assert!(cyk(&chain, &["b"]));
        assert!(!cyk(&chain, &["b", "b"]));
        assert!(!cyk(&chain, &[]));
    }

    #[test]
    fn regex_parsing_and_acceptance() {
        let nfa = Regex::parse("a b | c*").unwrap().to_nfa();
        assert!(nfa.accepts(&symbols(&["a", "b"])));
        assert!(nfa.accepts(&symbols(&["c", "c"])));
        assert!(nfa.accepts(&[]));
        assert!(!nfa.accepts(&symbols(&["a"])));

        let dotted = Regex::parse("a.b").unwrap().to_nfa();
        assert!(dotted.accepts(&symbols(&["a", "b"])));

        let eps = Regex::parse("$").unwrap().to_nfa();
        assert!(eps.accepts(&[]) && !eps.accepts(&symbols(&["a"])));

        for bad in ["a |", "(a", "a )", "", "a ."] {
            assert!(
                matches!(Regex::parse(bad), Err(Error::InvalidInput(_))),
                "{bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn minimal_dfa_is_language_equivalent() {
        for text in ["a b | c*", "(a | b)* c", "a a | a"] {
            let nfa = Regex::parse(text).unwrap().to_nfa();
            let dfa = nfa.minimize();
            let again = dfa.minimize();
            assert_eq!(dfa.states().len(), again.states().len());
            for word in words_over(&["a", "b", "c"], 3) {
                let word = symbols(&word);
                assert_eq!(nfa.accepts(&word), dfa.accepts(&word), "{text:?} on {word:?}");
                assert_eq!(dfa.accepts(&word), again.accepts(&word));
            }
        }
    }

    #[test]
    fn ecfg_merges_bodies_per_head() {
        let cfg = Cfg::from_text("S -> a S b\nS -> $", "S").unwrap();
        let ecfg = Ecfg::from_cfg(&cfg);
        assert_eq!(ecfg.productions().len(), 1);
        assert!(ecfg.variables().contains(&pathlang::Variable::new("S")));

        let duplicated = "S -> a\nS -> b";
        assert!(matches!(
            Ecfg::from_text(duplicated, "S"),
            Err(Error::InvalidInput(_))
        ));

        let round_trip = Ecfg::from_text(&ecfg.to_text(), "S").unwrap();
        assert_eq!(round_trip.productions().len(), 1);
    }

    #[test]
    fn rsm_minimize_is_idempotent() {
        let cfg = Cfg::from_text("S -> a S b | $", "S").unwrap();
        let rsm = Rsm::from_ecfg(&Ecfg::from_cfg(&cfg)).minimize();
        let again = rsm.clone().minimize();
        for (var, nfa) in rsm.boxes() {
            let other = again.box_of(var).unwrap();
            assert_eq!(nfa.states().len(), other.states().len());
        }
        let sbox = rsm.box_of(&pathlang::Variable::new("S")).unwrap();
        assert!(sbox.accepts(&[]));
        assert!(sbox.accepts(&[
            Symbol::term("a"),
            Symbol::var("S"),
            Symbol::term("b"),
        ]));
        assert!(!sbox.accepts(&[Symbol::term("a")]));
    }

    #[test]
    fn dot_round_trip() {
        let graph = two_cycles_graph(2, 1, ("a", "b"));
        let text = dot::to_dot(&graph);
        let parsed = dot::from_dot(&text).unwrap();
        assert_eq!(parsed, graph);

        let path = std::env::temp_dir().join("pathlang_dot_round_trip.dot");
        dot::save_dot(&graph, &path).unwrap();
        let loaded = dot::load_dot(&path).unwrap();
        assert_eq!(loaded, graph);
        std::fs::remove_file(&path).ok();

        assert!(matches!(
            dot::from_dot("graph { 0 -- 1 }"),
            Err(Error::InvalidInput(_))
        ));
    }

    #[test]
    fn graph_stats() {
        let graph = two_cycles_graph(3, 2, ("a", "b"));
        let stats = graph.stats();
        assert_eq!(stats.vertices, 6);
        assert_eq!(stats.edges, 7);
        assert_eq!(
            stats.labels,
            ["a", "b"].iter().map(|s| s.to_string()).collect()
        );
    }

    #[test]
    fn value_arms_dispatch_per_combination() {
        let a = Value::Fa(Regex::parse("a").unwrap().to_nfa());
        let ab = Value::Fa(Regex::parse("a | b").unwrap().to_nfa());
        let product = a.intersect(&ab).unwrap();
        match &product {
            Value::Fa(nfa) => {
                assert!(nfa.accepts(&symbols(&["a"])));
                assert!(!nfa.accepts(&symbols(&["b"])));
            }
            other => panic!("expected an automaton, got {other:?}"),
        }

        let cfg = Value::Cfg(Cfg::from_text("S -> a S b | $", "S").unwrap());
        assert!(matches!(
            cfg.intersect(&cfg),
            Err(Error::TypeMismatch { .. })
        ));

        match cfg.intersect(&Value::Fa(Regex::parse("a b").unwrap().to_nfa())) {
            Ok(Value::Cfg(product)) => {
                assert!(product.contains(&["a", "b"]));
                assert!(!product.contains(&[]));
                assert!(!product.contains(&["a", "a", "b", "b"]));
            }
            other => panic!("expected a grammar, got {other:?}"),
        }

        assert!(matches!(
            Value::Bool(true).kleene(),
            Err(Error::Unsupported(_))
        ));
        assert!(matches!(
            SetValue::from_elements([Element::Int(1), Element::Str("a".to_string())]),
            Err(Error::TypeMismatch { .. })
        ));

        let fa = Value::Fa(
            graph_from_edges(&[(0, "a", 1), (1, "a", 2)])
                .to_nfa(None, None)
                .unwrap(),
        );
        match fa.reachable().unwrap() {
            Value::Set(SetValue::Ints(reached)) => {
                assert_eq!(reached, [1, 2].into_iter().collect());
            }
            other => panic!("expected an integer set, got {other:?}"),
        }
    }

    #[test]
    fn cancellation_aborts_between_iterations() {
        let token = CancelToken::new();
        token.cancel();
        let graph = two_cycles_graph(3, 2, ("a", "b"));
        let cfg = Cfg::from_text("S -> a S b | $", "S").unwrap();
        assert_eq!(
            query::rpq_with_cancel(&graph, "a*", None, None, &token),
            Err(Error::Cancelled)
        );
        assert_eq!(
            query::bfs_rpq_with_cancel(&graph, "a*", None, None, false, &token),
            Err(Error::Cancelled)
        );
        for algorithm in [Algorithm::Hellings, Algorithm::Matrix, Algorithm::Tensor] {
            assert_eq!(
                query::cfpq_with_cancel(&cfg, &graph, "S", None, None, algorithm, &token),
                Err(Error::Cancelled)
            );
        }
    }

    #[test]
    fn registry_resolves_names() {
        let mut registry = GraphRegistry::new();
        assert!(matches!(
            registry.get_graph("missing"),
            Err(Error::UnknownName(_))
        ));
        registry.create_two_cycles("cycles", 3, 2, ("a", "b"));
        assert_eq!(registry.get_graph("cycles").unwrap().vertices().len(), 6);
        assert_eq!(registry.stats("cycles").unwrap().edges, 7);
        assert_eq!(registry.names(), vec!["cycles"]);
    }

    #[test]
    fn console_statements() {
        let mut registry = GraphRegistry::new();
        let mut out = Vec::new();

        assert!(pathlang::console::eval_line(
            &mut registry,
            "create-two-cycles g 3 2 x y",
            &mut out
        )
        .unwrap());
        assert!(pathlang::console::eval_line(&mut registry, "graph-info g", &mut out).unwrap());
        let printed = String::from_utf8(out.clone()).unwrap();
        assert!(printed.contains("Number of nodes: 6"));
        assert!(printed.contains("Labels: x y"));

        out.clear();
        assert!(pathlang::console::eval_line(&mut registry, "rpq g x x", &mut out).unwrap());
        let printed = String::from_utf8(out.clone()).unwrap();
        assert_eq!(printed, "0 2\n1 3\n2 0\n3 1\n");

        let grammar_path = std::env::temp_dir().join("pathlang_console_grammar.txt");
        std::fs::write(&grammar_path, "S -> x S y | $\n").unwrap();
        out.clear();
        let statement = format!("cfpq g {} tensor", grammar_path.display());
        assert!(pathlang::console::eval_line(&mut registry, &statement, &mut out).unwrap());
        std::fs::remove_file(&grammar_path).ok();
        let printed = String::from_utf8(out.clone()).unwrap();
        assert!(printed.contains("0 0\n"));

        out.clear();
        assert!(!pathlang::console::eval_line(&mut registry, "quit", &mut out).unwrap());
        assert!(matches!(
            pathlang::console::eval_line(&mut registry, "nonsense", &mut out),
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            pathlang::console::eval_line(&mut registry, "graph-info missing", &mut out),
            Err(Error::UnknownName(_))
        ));
    }

    #[test]
    fn query_config_defaults() {
        let config = QueryConfig::default();
        assert_eq!(config.start_symbol, "S");
        assert_eq!(config.algorithm, Algorithm::Hellings);
        assert_eq!(Algorithm::from_str("tensor").unwrap(), Algorithm::Tensor);
        assert_eq!(Algorithm::from_str("Matrix").unwrap(), Algorithm::Matrix);
        assert_eq!(Algorithm::Hellings.to_string(), "hellings");
        assert!(Algorithm::from_str("dijkstra").is_err());
    }
}
