use std::collections::{BTreeMap, BTreeSet};

use log::trace;

use crate::{
    alphabet::Alphabet,
    error::{RunError, ValidationError},
    Automaton,
};

/// Upper bound on the configurations explored by a single run, unless configured otherwise.
pub const DEFAULT_STEP_LIMIT: usize = 1_000_000;

/// Target of a transition: the next state and the string that replaces the
/// popped stack top. The last character of `push` ends up on top of the stack.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Move {
    pub state: String,
    pub push: String,
}

impl Move {
    pub fn new(state: impl Into<String>, push: impl Into<String>) -> Move {
        Move {
            state: state.into(),
            push: push.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Acceptance {
    /// Accept when the input is consumed in one of these states.
    FinalState(BTreeSet<String>),
    /// Accept when the input is consumed with an empty stack.
    EmptyStack,
}

// (input symbol or None for ε, stack top)
type Key = (Option<char>, char);

/// A pushdown automaton, deterministic or not, accepting by final state or by
/// empty stack.
///
/// Runs are a depth-first search over configurations with an explicit work
/// stack: symbol-consuming moves are tried before ε-moves, each in table order.
/// ε-loops that grow the stack forever are cut off by the step limit.
#[derive(Debug, Clone)]
pub struct PushdownAutomaton {
    alphabet: Alphabet,
    stack_alphabet: Alphabet,
    initial_stack_item: char,
    states: BTreeSet<String>,
    start_state: String,
    delta: BTreeMap<String, BTreeMap<Key, Vec<Move>>>,
    acceptance: Acceptance,
    deterministic: bool,
    step_limit: Option<usize>,
}

#[derive(Debug)]
pub struct PushdownAutomatonBuilder {
    alphabet: Option<Alphabet>,
    stack_alphabet: Option<Alphabet>,
    initial_stack_item: Option<char>,
    states: Option<BTreeSet<String>>,
    start_state: Option<String>,
    delta: Option<BTreeMap<(String, Option<char>, char), Vec<Move>>>,
    acceptance: Option<Acceptance>,
    step_limit: Option<usize>,
}

impl Default for PushdownAutomatonBuilder {
    fn default() -> Self {
        Self {
            alphabet: None,
            stack_alphabet: None,
            initial_stack_item: None,
            states: None,
            start_state: None,
            delta: None,
            acceptance: None,
            step_limit: Some(DEFAULT_STEP_LIMIT),
        }
    }
}

impl PushdownAutomatonBuilder {
    pub fn alphabet(mut self, alphabet: impl Into<Alphabet>) -> Self {
        self.alphabet = Some(alphabet.into());
        self
    }

    pub fn stack_alphabet(mut self, alphabet: impl Into<Alphabet>) -> Self {
        self.stack_alphabet = Some(alphabet.into());
        self
    }

    pub fn initial_stack_item(mut self, item: char) -> Self {
        self.initial_stack_item = Some(item);
        self
    }

    pub fn states<I, S>(mut self, states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.states = Some(states.into_iter().map(Into::into).collect());
        self
    }

    pub fn start_state(mut self, state: impl Into<String>) -> Self {
        self.start_state = Some(state.into());
        self
    }

    /// Adds a move; `symbol == None` makes it an ε-move. Adding several moves
    /// for one key makes the automaton nondeterministic.
    pub fn transition(
        mut self,
        from: impl Into<String>,
        symbol: Option<char>,
        pop: char,
        to: impl Into<String>,
        push: impl Into<String>,
    ) -> Self {
        let moves = self
            .delta
            .get_or_insert_with(BTreeMap::new)
            .entry((from.into(), symbol, pop))
            .or_default();
        let new_move = Move::new(to, push);
        if !moves.contains(&new_move) {
            moves.push(new_move);
        }
        self
    }

    pub fn no_transitions(mut self) -> Self {
        self.delta.get_or_insert_with(BTreeMap::new);
        self
    }

    pub fn accept_states<I, S>(mut self, states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.acceptance = Some(Acceptance::FinalState(
            states.into_iter().map(Into::into).collect(),
        ));
        self
    }

    pub fn accept_on_empty_stack(mut self) -> Self {
        self.acceptance = Some(Acceptance::EmptyStack);
        self
    }

    /// `None` disables the limit.
    pub fn step_limit(mut self, limit: Option<usize>) -> Self {
        self.step_limit = limit;
        self
    }

    /// Builds a deterministic automaton: at most one move per
    /// `(state, input symbol or ε, stack top)`.
    pub fn build_deterministic(self) -> Result<PushdownAutomaton, ValidationError> {
        self.build_checked(true)
    }

    pub fn build(self) -> Result<PushdownAutomaton, ValidationError> {
        self.build_checked(false)
    }

    fn build_checked(self, deterministic: bool) -> Result<PushdownAutomaton, ValidationError> {
        let alphabet = self.alphabet.ok_or(ValidationError::MissingArgument("alphabet"))?;
        let stack_alphabet = self
            .stack_alphabet
            .ok_or(ValidationError::MissingArgument("stack_alphabet"))?;
        let initial_stack_item = self
            .initial_stack_item
            .ok_or(ValidationError::MissingArgument("initial_stack_item"))?;
        let states = self.states.ok_or(ValidationError::MissingArgument("states"))?;
        let start_state = self
            .start_state
            .ok_or(ValidationError::MissingArgument("start_state"))?;
        let transitions = self.delta.ok_or(ValidationError::MissingArgument("delta"))?;
        let acceptance = self
            .acceptance
            .ok_or(ValidationError::MissingArgument("accept_states"))?;

        if !states.contains(&start_state) {
            return Err(ValidationError::StartStateNotInStates(start_state));
        }

        if !stack_alphabet.contains(initial_stack_item) {
            return Err(ValidationError::InitialStackItemNotInStackAlphabet(initial_stack_item));
        }

        if let Acceptance::FinalState(accept_states) = &acceptance {
            if let Some(state) = accept_states.iter().find(|x| !states.contains(*x)) {
                return Err(ValidationError::AcceptStateNotInStates(state.clone()));
            }
        }

        let mut delta: BTreeMap<String, BTreeMap<Key, Vec<Move>>> = BTreeMap::new();
        for ((from, symbol, pop), moves) in transitions {
            if !states.contains(&from) {
                return Err(ValidationError::UnknownState(from));
            }
            if let Some(symbol) = symbol.filter(|x| !alphabet.contains(*x)) {
                return Err(ValidationError::UnknownSymbol(symbol));
            }
            if !stack_alphabet.contains(pop) {
                return Err(ValidationError::UnknownStackSymbol(pop));
            }
            for next in &moves {
                if !states.contains(&next.state) {
                    return Err(ValidationError::UnknownState(next.state.clone()));
                }
                if let Some(item) = next.push.chars().find(|x| !stack_alphabet.contains(*x)) {
                    return Err(ValidationError::UnknownStackSymbol(item));
                }
            }
            if deterministic && moves.len() > 1 {
                return Err(ValidationError::NondeterministicTransition { state: from, symbol, pop });
            }

            delta.entry(from).or_default().insert((symbol, pop), moves);
        }

        Ok(PushdownAutomaton {
            alphabet,
            stack_alphabet,
            initial_stack_item,
            states,
            start_state,
            delta,
            acceptance,
            deterministic,
            step_limit: self.step_limit,
        })
    }
}

// one node of the search
#[derive(Debug)]
struct Configuration<'a> {
    state: &'a str,
    stack: Vec<char>,
    position: usize,
}

impl PushdownAutomaton {
    pub fn builder() -> PushdownAutomatonBuilder {
        PushdownAutomatonBuilder::default()
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    pub fn stack_alphabet(&self) -> &Alphabet {
        &self.stack_alphabet
    }

    pub fn initial_stack_item(&self) -> char {
        self.initial_stack_item
    }

    pub fn states(&self) -> impl Iterator<Item = &str> {
        self.states.iter().map(String::as_str)
    }

    pub fn start_state(&self) -> &str {
        &self.start_state
    }

    pub fn acceptance(&self) -> &Acceptance {
        &self.acceptance
    }

    pub fn is_deterministic(&self) -> bool {
        self.deterministic
    }

    pub fn step_limit(&self) -> Option<usize> {
        self.step_limit
    }

    /// Moves for `(state, symbol, stack top)`; `symbol == None` looks up ε-moves.
    pub fn moves(&self, state: &str, symbol: Option<char>, pop: char) -> &[Move] {
        self.delta
            .get(state)
            .and_then(|row| row.get(&(symbol, pop)))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    fn is_accepting(&self, configuration: &Configuration, input_len: usize) -> bool {
        if configuration.position != input_len {
            return false;
        }

        match &self.acceptance {
            Acceptance::FinalState(accept_states) => accept_states.contains(configuration.state),
            Acceptance::EmptyStack => configuration.stack.is_empty(),
        }
    }

    pub fn run(&self, input: &str) -> Result<bool, RunError> {
        self.run_with_limit(input, self.step_limit)
    }

    pub fn run_with_limit(&self, input: &str, step_limit: Option<usize>) -> Result<bool, RunError> {
        let input: Vec<char> = input.chars().collect();

        let mut pending: Vec<Configuration> = vec![Configuration {
            state: &self.start_state,
            stack: vec![self.initial_stack_item],
            position: 0,
        }];
        let mut steps: usize = 0;

        while let Some(configuration) = pending.pop() {
            steps += 1;
            if step_limit.is_some_and(|limit| steps > limit) {
                return Err(RunError::StepLimitExceeded(steps - 1));
            }

            if self.is_accepting(&configuration, input.len()) {
                trace!("accepted after {} steps", steps);
                return Ok(true);
            }

            // nothing to pop, this branch is dead
            let Some(&top) = configuration.stack.last() else {
                continue;
            };

            let mut successors: Vec<Configuration> = Vec::new();

            if let Some(&symbol) = input.get(configuration.position) {
                self.alphabet.check(symbol)?;
                for next in self.moves(configuration.state, Some(symbol), top) {
                    successors.push(configuration.apply(next, configuration.position + 1));
                }
            }

            for next in self.moves(configuration.state, None, top) {
                successors.push(configuration.apply(next, configuration.position));
            }

            // reversed so the first successor is explored first
            pending.extend(successors.into_iter().rev());
        }

        trace!("rejected after {} steps", steps);
        // a rejected word with a foreign symbol is an error, not a plain "no"
        input.iter().try_for_each(|x| self.alphabet.check(*x))?;
        Ok(false)
    }
}

impl<'a> Configuration<'a> {
    fn apply(&self, next: &'a Move, position: usize) -> Configuration<'a> {
        let mut stack = self.stack[..self.stack.len() - 1].to_vec();
        stack.extend(next.push.chars());
        Configuration {
            state: &next.state,
            stack,
            position,
        }
    }
}

impl Automaton for PushdownAutomaton {
    fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    fn run(&self, input: &str) -> Result<bool, RunError> {
        PushdownAutomaton::run(self, input)
    }
}
