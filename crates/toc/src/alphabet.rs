use std::{collections::BTreeSet, fmt::Debug, rc::Rc};

use crate::error::RunError;

/// Immutable set of input symbols.
///
/// Cloning is cheap: automata derived from one another (determinized,
/// minimized, composed over the same alphabet) share a single allocation.
/// Iteration order is the ordering of `char`, which is what minimization
/// relies on for its fixed symbol order.
#[derive(Clone, PartialEq, Eq)]
pub struct Alphabet {
    symbols: Rc<BTreeSet<char>>,
}

impl Alphabet {
    pub fn new<I>(symbols: I) -> Alphabet
    where
        I: IntoIterator<Item = char>,
    {
        Alphabet {
            symbols: Rc::new(symbols.into_iter().collect()),
        }
    }

    pub fn contains(&self, symbol: char) -> bool {
        self.symbols.contains(&symbol)
    }

    // run-time check, raised lazily as symbols are consumed
    pub fn check(&self, symbol: char) -> Result<(), RunError> {
        if self.contains(symbol) {
            Ok(())
        } else {
            Err(RunError::SymbolNotInAlphabet(symbol))
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = char> + '_ {
        self.symbols.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Whether both alphabets point at the same storage.
    pub fn is_shared_with(&self, other: &Alphabet) -> bool {
        Rc::ptr_eq(&self.symbols, &other.symbols)
    }

    // used when composing automata; equal alphabets keep sharing storage
    pub(crate) fn merged(&self, other: &Alphabet) -> Alphabet {
        if self == other {
            self.clone()
        } else {
            Alphabet::new(self.iter().chain(other.iter()))
        }
    }
}

impl Debug for Alphabet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.symbols.iter()).finish()
    }
}

impl FromIterator<char> for Alphabet {
    fn from_iter<T: IntoIterator<Item = char>>(iter: T) -> Self {
        Alphabet::new(iter)
    }
}

impl From<&str> for Alphabet {
    fn from(value: &str) -> Self {
        Alphabet::new(value.chars())
    }
}

impl<const N: usize> From<[char; N]> for Alphabet {
    fn from(value: [char; N]) -> Self {
        Alphabet::new(value)
    }
}
