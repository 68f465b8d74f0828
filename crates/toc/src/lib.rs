mod alphabet;
mod dfa;
mod error;
mod graph;
mod nfa;
mod pda;
mod regex;

#[cfg(test)]
mod fa_tests;

pub use alphabet::Alphabet;
pub use dfa::{Dfa, DfaBuilder, DfaTransitions};
pub use error::{RunError, ValidationError};
pub use graph::{StateNode, SymbolEdge};
pub use nfa::{Nfa, NfaBuilder, NfaTransitions};
pub use pda::{Acceptance, Move, PushdownAutomaton, PushdownAutomatonBuilder, DEFAULT_STEP_LIMIT};
pub use regex::{RegexError, RegularExpression, RESERVED_SYMBOLS};

/// Anything that accepts or rejects words over an alphabet.
pub trait Automaton {
    fn alphabet(&self) -> &Alphabet;

    /// Fails with [`RunError::SymbolNotInAlphabet`] once a symbol outside the
    /// alphabet is actually read.
    fn run(&self, input: &str) -> Result<bool, RunError>;
}
