use toc::{
    Acceptance, Automaton, Move, PushdownAutomaton, PushdownAutomatonBuilder, RunError, ValidationError,
    DEFAULT_STEP_LIMIT,
};

fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn run_vectors(automaton: &impl Automaton, tests: &[(&str, bool)], name: &str) {
    for (test, expected_result) in tests {
        let result = automaton.run(test).expect("run should finish");
        assert_eq!(
            result, *expected_result,
            "'{}' failed on input '{}', expect match: {}, actual match: {}",
            name, test, expected_result, result
        );
    }
}

const AN_BN_VECTORS: [(&str, bool); 12] = [
    ("ab", true),
    ("aabb", true),
    ("aaabbb", true),
    ("aaaaaaabbbbbbb", true),
    ("", false),
    ("abb", false),
    ("bbaa", false),
    ("a", false),
    ("aa", false),
    ("bbb", false),
    ("aaabba", false),
    ("aaabab", false),
];

const PALINDROME_VECTORS: [(&str, bool); 11] = [
    ("asa", true),
    ("absba", true),
    ("ababbbasabbbaba", true),
    ("", false),
    ("s", false),
    ("asaa", false),
    ("asbb", false),
    ("asb", false),
    ("aas", false),
    ("abba", false),
    ("abbsa", false),
];

// S -> ab | aSb, expanded on the stack; '$' marks the bottom
fn an_bn() -> PushdownAutomatonBuilder {
    PushdownAutomaton::builder()
        .alphabet("ab")
        .stack_alphabet("$abS")
        .initial_stack_item('$')
        .states(["sStart", "sAB", "sEnd"])
        .start_state("sStart")
        .transition("sStart", None, '$', "sAB", "$S")
        .transition("sAB", None, 'S', "sAB", "ba")
        .transition("sAB", None, 'S', "sAB", "bSa")
        .transition("sAB", Some('a'), 'a', "sAB", "")
        .transition("sAB", Some('b'), 'b', "sAB", "")
}

// w s reverse(w) for non-empty w over {a, b}
fn centred_palindrome() -> PushdownAutomatonBuilder {
    PushdownAutomaton::builder()
        .alphabet("abs")
        .stack_alphabet("$ab")
        .initial_stack_item('$')
        .states(["sStart", "sBef", "sAft", "sEnd"])
        .start_state("sStart")
        .transition("sStart", Some('a'), '$', "sBef", "$a")
        .transition("sStart", Some('b'), '$', "sBef", "$b")
        .transition("sBef", Some('a'), 'a', "sBef", "aa")
        .transition("sBef", Some('a'), 'b', "sBef", "ba")
        .transition("sBef", Some('b'), 'a', "sBef", "ab")
        .transition("sBef", Some('b'), 'b', "sBef", "bb")
        .transition("sBef", Some('s'), 'a', "sAft", "a")
        .transition("sBef", Some('s'), 'b', "sAft", "b")
        .transition("sAft", Some('a'), 'a', "sAft", "")
        .transition("sAft", Some('b'), 'b', "sAft", "")
}

#[test]
fn an_bn_final_state() {
    init();
    let pda = an_bn()
        .transition("sAB", None, '$', "sEnd", "")
        .accept_states(["sEnd"])
        .build()
        .expect("valid PDA");

    assert!(!pda.is_deterministic());
    run_vectors(&pda, &AN_BN_VECTORS, "aⁿbⁿ");
}

#[test]
fn an_bn_empty_stack() {
    init();
    let pda = an_bn()
        .transition("sAB", None, '$', "sAB", "")
        .accept_on_empty_stack()
        .build()
        .expect("valid PDA");

    assert_eq!(pda.acceptance(), &Acceptance::EmptyStack);
    run_vectors(&pda, &AN_BN_VECTORS, "aⁿbⁿ by empty stack");
}

#[test]
fn an_bn_is_not_deterministic() {
    let result = an_bn()
        .transition("sAB", None, '$', "sEnd", "")
        .accept_states(["sEnd"])
        .build_deterministic();

    assert_eq!(
        result.map(|_| ()),
        Err(ValidationError::NondeterministicTransition {
            state: "sAB".to_string(),
            symbol: None,
            pop: 'S'
        })
    );
}

#[test]
fn centred_palindrome_final_state() {
    init();
    let pda = centred_palindrome()
        .transition("sAft", None, '$', "sEnd", "")
        .accept_states(["sEnd"])
        .build_deterministic()
        .expect("valid PDA");

    assert!(pda.is_deterministic());
    run_vectors(&pda, &PALINDROME_VECTORS, "w s reverse(w)");
}

#[test]
fn centred_palindrome_empty_stack() {
    init();
    let pda = centred_palindrome()
        .transition("sAft", None, '$', "sAft", "")
        .accept_on_empty_stack()
        .build_deterministic()
        .expect("valid PDA");

    run_vectors(&pda, &PALINDROME_VECTORS, "w s reverse(w) by empty stack");
}

#[test]
fn symbol_outside_alphabet() {
    let an_bn = an_bn()
        .transition("sAB", None, '$', "sEnd", "")
        .accept_states(["sEnd"])
        .build()
        .expect("valid PDA");
    assert_eq!(an_bn.run("abc"), Err(RunError::SymbolNotInAlphabet('c')));
    // every branch dies before reaching the 'c'
    assert_eq!(an_bn.run("bbc"), Err(RunError::SymbolNotInAlphabet('c')));

    let palindrome = centred_palindrome()
        .transition("sAft", None, '$', "sEnd", "")
        .accept_states(["sEnd"])
        .build_deterministic()
        .expect("valid PDA");
    assert_eq!(palindrome.run("abc"), Err(RunError::SymbolNotInAlphabet('c')));
    assert_eq!(palindrome.run("x"), Err(RunError::SymbolNotInAlphabet('x')));
}

#[test]
fn last_pushed_symbol_is_on_top() {
    let pda = centred_palindrome()
        .transition("sAft", None, '$', "sEnd", "")
        .accept_states(["sEnd"])
        .build()
        .expect("valid PDA");

    assert_eq!(pda.moves("sBef", Some('a'), 'b'), &[Move::new("sBef", "ba")]);
    assert!(pda.moves("sBef", None, 'b').is_empty());
    assert!(pda.moves("sNowhere", Some('a'), '$').is_empty());
}

fn growing_epsilon_loop() -> PushdownAutomatonBuilder {
    PushdownAutomaton::builder()
        .alphabet("a")
        .stack_alphabet("X")
        .initial_stack_item('X')
        .states(["q", "f"])
        .start_state("q")
        .transition("q", None, 'X', "q", "XX")
        .accept_states(["f"])
}

#[test]
fn epsilon_loop_hits_step_limit() {
    init();
    let pda = growing_epsilon_loop()
        .step_limit(Some(100))
        .build()
        .expect("valid PDA");

    assert_eq!(pda.step_limit(), Some(100));
    assert_eq!(pda.run(""), Err(RunError::StepLimitExceeded(100)));
    assert_eq!(pda.run("a"), Err(RunError::StepLimitExceeded(100)));
    assert_eq!(pda.run_with_limit("", Some(10)), Err(RunError::StepLimitExceeded(10)));
}

#[test]
fn default_step_limit() {
    let pda = growing_epsilon_loop().build().expect("valid PDA");
    assert_eq!(pda.step_limit(), Some(DEFAULT_STEP_LIMIT));
}

#[test]
fn invalid_construction() {
    let missing = PushdownAutomaton::builder()
        .alphabet("a")
        .initial_stack_item('$')
        .states(["q"])
        .start_state("q")
        .no_transitions()
        .accept_on_empty_stack()
        .build();
    assert_eq!(missing.map(|_| ()), Err(ValidationError::MissingArgument("stack_alphabet")));

    let no_acceptance = PushdownAutomaton::builder()
        .alphabet("a")
        .stack_alphabet("$")
        .initial_stack_item('$')
        .states(["q"])
        .start_state("q")
        .no_transitions()
        .build();
    assert_eq!(
        no_acceptance.map(|_| ()),
        Err(ValidationError::MissingArgument("accept_states"))
    );

    let bad_initial_item = an_bn().initial_stack_item('#').accept_on_empty_stack().build();
    assert_eq!(
        bad_initial_item.map(|_| ()),
        Err(ValidationError::InitialStackItemNotInStackAlphabet('#'))
    );

    let bad_start = an_bn().start_state("sNowhere").accept_on_empty_stack().build();
    assert_eq!(
        bad_start.map(|_| ()),
        Err(ValidationError::StartStateNotInStates("sNowhere".to_string()))
    );

    let bad_accept = an_bn().accept_states(["sEnd", "sLost"]).build();
    assert_eq!(
        bad_accept.map(|_| ()),
        Err(ValidationError::AcceptStateNotInStates("sLost".to_string()))
    );

    let bad_push = an_bn()
        .transition("sAB", None, '$', "sEnd", "#")
        .accept_states(["sEnd"])
        .build();
    assert_eq!(bad_push.map(|_| ()), Err(ValidationError::UnknownStackSymbol('#')));

    let bad_target = an_bn()
        .transition("sAB", None, '$', "sGone", "")
        .accept_states(["sEnd"])
        .build();
    assert_eq!(
        bad_target.map(|_| ()),
        Err(ValidationError::UnknownState("sGone".to_string()))
    );

    let bad_symbol = an_bn()
        .transition("sAB", Some('z'), '$', "sEnd", "")
        .accept_states(["sEnd"])
        .build();
    assert_eq!(bad_symbol.map(|_| ()), Err(ValidationError::UnknownSymbol('z')));
}
