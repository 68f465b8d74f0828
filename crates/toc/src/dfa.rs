use std::{
    collections::{BTreeMap, BTreeSet, HashMap},
    fmt::Display,
};

use log::{debug, trace};

use crate::{
    alphabet::Alphabet,
    error::{RunError, ValidationError},
    Automaton,
};

/// Flat form of a DFA transition table: `(state, symbol) -> state`.
pub type DfaTransitions = BTreeMap<(String, char), String>;

/// A deterministic finite state automaton over named states.
///
/// The transition table is total: every `(state, symbol)` pair has exactly one
/// target. This is checked when the automaton is built, so `run` never has to
/// deal with a missing entry.
#[derive(Debug, Clone)]
pub struct Dfa {
    alphabet: Alphabet,
    states: BTreeSet<String>,
    start_state: String,
    // state -> symbol -> next state
    delta: BTreeMap<String, BTreeMap<char, String>>,
    accept_states: BTreeSet<String>,
}

#[derive(Debug, Default)]
pub struct DfaBuilder {
    alphabet: Option<Alphabet>,
    states: Option<BTreeSet<String>>,
    start_state: Option<String>,
    delta: Option<DfaTransitions>,
    accept_states: Option<BTreeSet<String>>,
}

impl DfaBuilder {
    pub fn alphabet(mut self, alphabet: impl Into<Alphabet>) -> Self {
        self.alphabet = Some(alphabet.into());
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

    pub fn transition(mut self, from: impl Into<String>, symbol: char, to: impl Into<String>) -> Self {
        self.delta
            .get_or_insert_with(BTreeMap::new)
            .insert((from.into(), symbol), to.into());
        self
    }

    pub fn transitions<I, S, T>(mut self, transitions: I) -> Self
    where
        I: IntoIterator<Item = (S, char, T)>,
        S: Into<String>,
        T: Into<String>,
    {
        let delta = self.delta.get_or_insert_with(BTreeMap::new);
        for (from, symbol, to) in transitions {
            delta.insert((from.into(), symbol), to.into());
        }
        self
    }

    pub fn accept_states<I, S>(mut self, states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.accept_states = Some(states.into_iter().map(Into::into).collect());
        self
    }

    pub fn build(self) -> Result<Dfa, ValidationError> {
        let alphabet = self.alphabet.ok_or(ValidationError::MissingArgument("alphabet"))?;
        let states = self.states.ok_or(ValidationError::MissingArgument("states"))?;
        let start_state = self
            .start_state
            .ok_or(ValidationError::MissingArgument("start_state"))?;
        let delta = self.delta.ok_or(ValidationError::MissingArgument("delta"))?;
        let accept_states = self
            .accept_states
            .ok_or(ValidationError::MissingArgument("accept_states"))?;

        Dfa::new(alphabet, states, start_state, delta, accept_states)
    }
}

impl Dfa {
    pub fn builder() -> DfaBuilder {
        DfaBuilder::default()
    }

    pub fn new(
        alphabet: Alphabet,
        states: BTreeSet<String>,
        start_state: String,
        transitions: DfaTransitions,
        accept_states: BTreeSet<String>,
    ) -> Result<Dfa, ValidationError> {
        if !states.contains(&start_state) {
            return Err(ValidationError::StartStateNotInStates(start_state));
        }

        if let Some(state) = accept_states.iter().find(|x| !states.contains(*x)) {
            return Err(ValidationError::AcceptStateNotInStates(state.clone()));
        }

        let mut delta: BTreeMap<String, BTreeMap<char, String>> = BTreeMap::new();
        for ((from, symbol), to) in transitions {
            delta.entry(from).or_default().insert(symbol, to);
        }

        // every combination of state and symbol must be in the table
        for state in &states {
            for symbol in alphabet.iter() {
                let present = delta.get(state).is_some_and(|row| row.contains_key(&symbol));
                if !present {
                    return Err(ValidationError::MissingTransition {
                        state: state.clone(),
                        symbol,
                    });
                }
            }
        }

        for (from, row) in &delta {
            if !states.contains(from) {
                return Err(ValidationError::UnknownState(from.clone()));
            }
            for (symbol, to) in row {
                if !alphabet.contains(*symbol) {
                    return Err(ValidationError::UnknownSymbol(*symbol));
                }
                if !states.contains(to) {
                    return Err(ValidationError::UnknownState(to.clone()));
                }
            }
        }

        Ok(Dfa {
            alphabet,
            states,
            start_state,
            delta,
            accept_states,
        })
    }

    // for constructions that are complete by design (subset construction)
    pub(crate) fn from_parts(
        alphabet: Alphabet,
        states: BTreeSet<String>,
        start_state: String,
        delta: BTreeMap<String, BTreeMap<char, String>>,
        accept_states: BTreeSet<String>,
    ) -> Dfa {
        debug_assert!(states.contains(&start_state));
        debug_assert!(accept_states.is_subset(&states));
        debug_assert!(states
            .iter()
            .all(|x| alphabet.iter().all(|c| delta.get(x).is_some_and(|row| row.contains_key(&c)))));

        Dfa {
            alphabet,
            states,
            start_state,
            delta,
            accept_states,
        }
    }

    pub fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    pub fn states(&self) -> impl Iterator<Item = &str> {
        self.states.iter().map(String::as_str)
    }

    pub fn num_states(&self) -> usize {
        self.states.len()
    }

    pub fn contains_state(&self, state: &str) -> bool {
        self.states.contains(state)
    }

    pub fn start_state(&self) -> &str {
        &self.start_state
    }

    pub fn accept_states(&self) -> impl Iterator<Item = &str> {
        self.accept_states.iter().map(String::as_str)
    }

    pub fn is_accepting(&self, state: &str) -> bool {
        self.accept_states.contains(state)
    }

    pub fn transition(&self, state: &str, symbol: char) -> Option<&str> {
        self.delta
            .get(state)
            .and_then(|row| row.get(&symbol))
            .map(String::as_str)
    }

    /// All `(from, symbol, to)` entries of the transition table.
    pub fn transitions(&self) -> impl Iterator<Item = (&str, char, &str)> {
        self.delta.iter().flat_map(|(from, row)| {
            row.iter()
                .map(move |(symbol, to)| (from.as_str(), *symbol, to.as_str()))
        })
    }

    pub fn num_transitions(&self) -> usize {
        self.delta.values().map(BTreeMap::len).sum()
    }

    fn next_state(&self, state: &str, symbol: char) -> &str {
        self.transition(state, symbol)
            .expect("transition table is total over states and alphabet")
    }

    pub fn run(&self, input: &str) -> Result<bool, RunError> {
        let mut state = self.start_state.as_str();
        for symbol in input.chars() {
            self.alphabet.check(symbol)?;
            state = self.next_state(state, symbol);
        }

        Ok(self.accept_states.contains(state))
    }

    pub fn minimize(&self) -> Dfa {
        let mut copy = self.clone();
        copy.minimize_in_place();
        copy
    }

    /// Removes unreachable states, then merges states that belong to the same
    /// Nerode equivalence class. The start state always survives.
    pub fn minimize_in_place(&mut self) {
        let before = self.states.len();

        self.states = self.reachable_states();
        let states = &self.states;
        self.delta.retain(|from, _| states.contains(from));
        self.accept_states.retain(|x| states.contains(x));

        for class in self.equivalence_classes() {
            if class.len() > 1 {
                self.collapse(class);
            }
        }

        debug!("minimized DFA from {} to {} states", before, self.states.len());
    }

    // iterative DFS over delta
    fn reachable_states(&self) -> BTreeSet<String> {
        let mut reachable: BTreeSet<String> = BTreeSet::new();
        let mut pending: Vec<&str> = vec![self.start_state.as_str()];

        while let Some(state) = pending.pop() {
            if !reachable.insert(state.to_string()) {
                continue;
            }

            for symbol in self.alphabet.iter() {
                let next = self.next_state(state, symbol);
                if !reachable.contains(next) {
                    pending.push(next);
                }
            }
        }

        reachable
    }

    // states grouped by equivalence class, each group in state order
    // new class numbers are handed out in first-seen order of that same iteration
    pub(crate) fn equivalence_classes(&self) -> Vec<Vec<String>> {
        let states: Vec<&str> = self.states().collect();
        let symbols: Vec<char> = self.alphabet.iter().collect();
        let index: HashMap<&str, usize> = states
            .iter()
            .enumerate()
            .map(|(i, x)| (*x, i))
            .collect();

        // successors[i][j] = index of delta(states[i], symbols[j])
        let successors: Vec<Vec<usize>> = states
            .iter()
            .map(|state| {
                symbols
                    .iter()
                    .map(|symbol| index[self.next_state(state, *symbol)])
                    .collect()
            })
            .collect();

        // 0 = non-accepting, 1 = accepting
        let mut classes: Vec<usize> = states
            .iter()
            .map(|x| usize::from(self.accept_states.contains(*x)))
            .collect();
        let mut num_classes = classes.iter().collect::<BTreeSet<_>>().len();

        loop {
            let mut numbering: HashMap<Box<[usize]>, usize> = HashMap::new();
            let refined: Vec<usize> = (0..states.len())
                .map(|i| {
                    let signature: Box<[usize]> = std::iter::once(classes[i])
                        .chain(successors[i].iter().map(|next| classes[*next]))
                        .collect();
                    let next_id = numbering.len();
                    *numbering.entry(signature).or_insert(next_id)
                })
                .collect();

            trace!("equivalence classes: {:?}", refined);

            classes = refined;
            if numbering.len() == num_classes {
                break;
            }
            num_classes = numbering.len();
        }

        let mut groups: Vec<Vec<String>> = vec![Vec::new(); num_classes];
        for (state, class) in states.iter().zip(classes) {
            groups[class].push(state.to_string());
        }
        groups
    }

    // keeps one representative of `class`, redirects everything else to it
    fn collapse(&mut self, class: Vec<String>) {
        let representative = if class.contains(&self.start_state) {
            self.start_state.clone()
        } else {
            class[0].clone()
        };
        let eliminated: BTreeSet<String> = class
            .into_iter()
            .filter(|x| *x != representative)
            .collect();

        trace!("merging {:?} into {}", eliminated, representative);

        for row in self.delta.values_mut() {
            for to in row.values_mut() {
                if eliminated.contains(to) {
                    *to = representative.clone();
                }
            }
        }

        self.delta.retain(|from, _| !eliminated.contains(from));
        self.states.retain(|x| !eliminated.contains(x));
        self.accept_states.retain(|x| !eliminated.contains(x));
    }
}

impl Automaton for Dfa {
    fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    fn run(&self, input: &str) -> Result<bool, RunError> {
        Dfa::run(self, input)
    }
}

impl Display for Dfa {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "start: {}", self.start_state)?;
        writeln!(f, "accept: {:?}", self.accept_states)?;
        for (from, symbol, to) in self.transitions() {
            writeln!(f, "  {} -{}-> {}", from, symbol, to)?;
        }
        Ok(())
    }
}
