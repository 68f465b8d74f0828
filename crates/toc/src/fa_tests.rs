use crate::{
    alphabet::Alphabet,
    dfa::Dfa,
    nfa::Nfa,
    regex::{RegexError, RegularExpression},
};

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn postfix(alphabet: &str, re_str: &str) -> Result<String, RegexError> {
    RegularExpression::new(alphabet, re_str)
        .expect("expression should be valid")
        .postfix()
}

#[test]
fn postfix_inserts_implicit_concatenation() {
    init();
    let test_vectors = vec![
        ("a", "a"),
        ("ab", "ab⋅"),
        ("abc", "ab⋅c⋅"),
        ("a*b", "a*b⋅"),
        ("(ab)*", "ab⋅*"),
        ("a∪bb", "abb⋅∪"),
        ("a∪b∪c", "ab∪c∪"),
        ("a∪b⋅c", "abc⋅∪"),
        ("(a∪b)c", "ab∪c⋅"),
        ("a(a∪ε)", "aaε∪⋅"),
        ("∅*ε", "∅*ε⋅"),
        ("(a)(b)", "ab⋅"),
    ];

    for (re_str, expected) in test_vectors {
        let actual = postfix("abc", re_str).expect("should convert");
        assert_eq!(actual, expected, "postfix of '{}'", re_str);
    }
}

#[test]
fn postfix_rejects_mismatched_parentheses() {
    for re_str in ["a(b", "a)b", "ab)", "((a)", ")(", "("] {
        assert_eq!(
            postfix("ab", re_str),
            Err(RegexError::MismatchedParentheses),
            "expression '{}'",
            re_str
        );
    }
}

#[test]
fn malformed_expressions() {
    let test_vectors = vec![
        ("", RegexError::Malformed),
        ("()", RegexError::Malformed),
        ("*", RegexError::MissingOperand('*')),
        ("a∪", RegexError::MissingOperand('∪')),
        ("∪a", RegexError::MissingOperand('∪')),
        ("a⋅", RegexError::MissingOperand('⋅')),
        ("()a", RegexError::MissingOperand('⋅')),
    ];

    for (re_str, expected) in test_vectors {
        let re = RegularExpression::new("ab", re_str).expect("characters are valid");
        let actual = re.derive_automaton().map(|_| ());
        assert_eq!(actual, Err(expected), "expression '{}'", re_str);
    }
}

fn ends_with_a_with_unreachable_state() -> Dfa {
    Dfa::builder()
        .alphabet("ab")
        .states(["q0", "q1", "q2", "q3"])
        .start_state("q0")
        .transitions([
            ("q0", 'a', "q1"),
            ("q0", 'b', "q2"),
            ("q1", 'a', "q1"),
            ("q1", 'b', "q0"),
            ("q2", 'a', "q1"),
            ("q2", 'b', "q2"),
            ("q3", 'a', "q2"),
            ("q3", 'b', "q0"),
        ])
        .accept_states(["q1"])
        .build()
        .expect("valid DFA")
}

#[test]
fn equivalence_classes_in_first_seen_order() {
    let dfa = ends_with_a_with_unreachable_state();
    let classes = dfa.equivalence_classes();
    assert_eq!(
        classes,
        vec![
            vec!["q0".to_string(), "q2".to_string()],
            vec!["q1".to_string()],
            vec!["q3".to_string()],
        ]
    );
}

#[test]
fn equivalence_classes_all_accepting() {
    let dfa = Dfa::builder()
        .alphabet("a")
        .states(["p", "q"])
        .start_state("p")
        .transitions([("p", 'a', "q"), ("q", 'a', "p")])
        .accept_states(["p", "q"])
        .build()
        .expect("valid DFA");

    assert_eq!(dfa.equivalence_classes(), vec![vec!["p".to_string(), "q".to_string()]]);
    assert_eq!(dfa.minimize().num_states(), 1);
}

#[test]
fn union_renames_colliding_states() {
    let alphabet = Alphabet::from("ab");
    let a = Nfa::symbol(alphabet.clone(), 'a');
    let b = Nfa::symbol(alphabet, 'b');

    let union = a.union_with(&b);
    assert_eq!(union.states().collect::<Vec<_>>(), vec!["s0", "s1", "s2", "s3"]);
    assert_eq!(union.start_states().collect::<Vec<_>>(), vec!["s0", "s2"]);
    assert_eq!(union.accept_states().collect::<Vec<_>>(), vec!["s1", "s3"]);
    assert_eq!(union.transition("s2", 'b').collect::<Vec<_>>(), vec!["s3"]);

    // operands are untouched
    assert_eq!(b.states().collect::<Vec<_>>(), vec!["s0", "s1"]);
    assert_eq!(b.transition("s0", 'b').collect::<Vec<_>>(), vec!["s1"]);
}

#[test]
fn concat_renames_consistently() {
    let alphabet = Alphabet::from("ab");
    let a = Nfa::symbol(alphabet.clone(), 'a');
    let b = Nfa::symbol(alphabet, 'b');

    let ab = a.concat_with(&b);
    assert_eq!(ab.start_states().collect::<Vec<_>>(), vec!["s0"]);
    assert_eq!(ab.accept_states().collect::<Vec<_>>(), vec!["s3"]);
    // the accept state of `a` continues like the start state of `b`
    assert_eq!(ab.transition("s1", 'b').collect::<Vec<_>>(), vec!["s3"]);
    assert!(ab.transitions().all(|(from, _, to)| {
        ab.states().any(|x| x == from) && ab.states().any(|x| x == to)
    }));
}

#[test]
fn repeating_adds_single_empty_word_state() {
    let a = Nfa::symbol(Alphabet::from("a"), 'a');
    let star = a.repeating();
    assert_eq!(star.num_states(), 3);
    assert!(star.accepts_empty_word());

    // already accepts the empty word, nothing to add
    let star_star = star.repeating();
    assert_eq!(star_star.num_states(), 3);
}

#[test]
fn subset_names_are_sorted() {
    let nfa = Nfa::builder()
        .alphabet("a")
        .states(["q1", "q0"])
        .start_states(["q1", "q0"])
        .transition("q0", 'a', ["q1"])
        .accept_states(["q1"])
        .build()
        .expect("valid NFA");

    let dfa = nfa.derive_deterministic();
    assert_eq!(dfa.start_state(), "{q0,q1}");
    assert_eq!(dfa.transition("{q0,q1}", 'a'), Some("{q1}"));
    assert_eq!(dfa.transition("{q1}", 'a'), Some("{}"));
    assert_eq!(dfa.transition("{}", 'a'), Some("{}"));
    assert_eq!(dfa.num_states(), 3);
}

#[test]
fn alphabets_are_shared_by_derived_automata() {
    let re = RegularExpression::new("ab", "(ab)*").expect("valid regex");
    let nfa = re.derive_automaton().expect("should compile");
    let dfa = nfa.derive_deterministic();
    let minimal = dfa.minimize();

    assert!(nfa.alphabet().is_shared_with(re.alphabet()));
    assert!(dfa.alphabet().is_shared_with(re.alphabet()));
    assert!(minimal.alphabet().is_shared_with(re.alphabet()));
}
