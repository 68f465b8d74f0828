use thiserror::Error;

/// Structural problems detected while constructing an automaton.
///
/// Construction is all-or-nothing: when one of these is returned no automaton
/// exists.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("required argument `{0}` was not provided")]
    MissingArgument(&'static str),
    #[error(
        "start state `{0}` not contained in the set of states, \
        either add it to the states or choose a different start state"
    )]
    StartStateNotInStates(String),
    #[error(
        "accept state `{0}` not contained in the set of states, \
        either add it to the states or choose different accept states"
    )]
    AcceptStateNotInStates(String),
    #[error("transition table does not contain an entry for state `{state}` and symbol '{symbol}'")]
    MissingTransition { state: String, symbol: char },
    #[error("transition table refers to state `{0}`, which is not contained in the set of states")]
    UnknownState(String),
    #[error("transition table uses symbol '{0}', which is not contained in the alphabet")]
    UnknownSymbol(char),
    #[error("initial stack item '{0}' not contained in the stack alphabet")]
    InitialStackItemNotInStackAlphabet(char),
    #[error("transition table uses stack symbol '{0}', which is not contained in the stack alphabet")]
    UnknownStackSymbol(char),
    #[error("deterministic automaton has more than one move for state `{state}`, input {symbol:?} and stack top '{pop}'")]
    NondeterministicTransition {
        state: String,
        symbol: Option<char>,
        pop: char,
    },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RunError {
    #[error(
        "input character '{0}' not found in alphabet, \
        either add '{0}' to the alphabet or remove it from the input"
    )]
    SymbolNotInAlphabet(char),
    #[error("gave up after exploring {0} configurations")]
    StepLimitExceeded(usize),
}
