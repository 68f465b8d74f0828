use std::{
    collections::{BTreeMap, BTreeSet, HashMap},
    fmt::Display,
};

use bit_set::BitSet;
use log::{debug, trace};
use toc_util::fresh_name;

use crate::{
    alphabet::Alphabet,
    dfa::Dfa,
    error::{RunError, ValidationError},
    Automaton,
};

/// Flat form of an NFA transition table: `(state, symbol) -> {states}`.
/// Missing entries mean "no successor".
pub type NfaTransitions = BTreeMap<(String, char), BTreeSet<String>>;

type Delta = BTreeMap<String, BTreeMap<char, BTreeSet<String>>>;

/// A nondeterministic finite state automaton without ε-transitions.
///
/// Several start states are allowed; that is what lets the Kleene closure
/// accept the empty word without ε-moves.
#[derive(Debug, Clone)]
pub struct Nfa {
    alphabet: Alphabet,
    states: BTreeSet<String>,
    start_states: BTreeSet<String>,
    delta: Delta,
    accept_states: BTreeSet<String>,
}

#[derive(Debug, Default)]
pub struct NfaBuilder {
    alphabet: Option<Alphabet>,
    states: Option<BTreeSet<String>>,
    start_states: Option<BTreeSet<String>>,
    delta: Option<NfaTransitions>,
    accept_states: Option<BTreeSet<String>>,
}

fn collect_names<I, S>(names: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    names.into_iter().map(Into::into).collect()
}

impl NfaBuilder {
    pub fn alphabet(mut self, alphabet: impl Into<Alphabet>) -> Self {
        self.alphabet = Some(alphabet.into());
        self
    }

    pub fn states<I, S>(mut self, states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.states = Some(collect_names(states));
        self
    }

    pub fn start_states<I, S>(mut self, states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.start_states = Some(collect_names(states));
        self
    }

    pub fn transition<I, S>(mut self, from: impl Into<String>, symbol: char, to: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.delta
            .get_or_insert_with(BTreeMap::new)
            .entry((from.into(), symbol))
            .or_default()
            .extend(to.into_iter().map(Into::into));
        self
    }

    /// Marks the transition table as given, even if no entry is added.
    pub fn no_transitions(mut self) -> Self {
        self.delta.get_or_insert_with(BTreeMap::new);
        self
    }

    pub fn accept_states<I, S>(mut self, states: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.accept_states = Some(collect_names(states));
        self
    }

    pub fn build(self) -> Result<Nfa, ValidationError> {
        let alphabet = self.alphabet.ok_or(ValidationError::MissingArgument("alphabet"))?;
        let states = self.states.ok_or(ValidationError::MissingArgument("states"))?;
        let start_states = self
            .start_states
            .ok_or(ValidationError::MissingArgument("start_states"))?;
        let delta = self.delta.ok_or(ValidationError::MissingArgument("delta"))?;
        let accept_states = self
            .accept_states
            .ok_or(ValidationError::MissingArgument("accept_states"))?;

        Nfa::new(alphabet, states, start_states, delta, accept_states)
    }
}

impl Nfa {
    pub fn builder() -> NfaBuilder {
        NfaBuilder::default()
    }

    pub fn new(
        alphabet: Alphabet,
        states: BTreeSet<String>,
        start_states: BTreeSet<String>,
        transitions: NfaTransitions,
        accept_states: BTreeSet<String>,
    ) -> Result<Nfa, ValidationError> {
        if let Some(state) = start_states.iter().find(|x| !states.contains(*x)) {
            return Err(ValidationError::StartStateNotInStates(state.clone()));
        }

        if let Some(state) = accept_states.iter().find(|x| !states.contains(*x)) {
            return Err(ValidationError::AcceptStateNotInStates(state.clone()));
        }

        let mut delta: Delta = BTreeMap::new();
        for ((from, symbol), to) in transitions {
            if !states.contains(&from) {
                return Err(ValidationError::UnknownState(from));
            }
            if !alphabet.contains(symbol) {
                return Err(ValidationError::UnknownSymbol(symbol));
            }
            if let Some(state) = to.iter().find(|x| !states.contains(*x)) {
                return Err(ValidationError::UnknownState(state.clone()));
            }

            delta.entry(from).or_default().entry(symbol).or_default().extend(to);
        }

        Ok(Nfa {
            alphabet,
            states,
            start_states,
            delta,
            accept_states,
        })
    }

    /// Two states, accepting exactly the one-symbol word `symbol`.
    pub fn symbol(alphabet: Alphabet, symbol: char) -> Nfa {
        let mut delta: Delta = BTreeMap::new();
        delta
            .entry("s0".to_string())
            .or_default()
            .insert(symbol, BTreeSet::from(["s1".to_string()]));

        Nfa {
            alphabet,
            states: BTreeSet::from(["s0".to_string(), "s1".to_string()]),
            start_states: BTreeSet::from(["s0".to_string()]),
            delta,
            accept_states: BTreeSet::from(["s1".to_string()]),
        }
    }

    /// No states at all, so nothing is accepted.
    pub fn empty_set(alphabet: Alphabet) -> Nfa {
        Nfa {
            alphabet,
            states: BTreeSet::new(),
            start_states: BTreeSet::new(),
            delta: BTreeMap::new(),
            accept_states: BTreeSet::new(),
        }
    }

    /// One state that is both start and accept state, accepting only the empty word.
    pub fn empty_word(alphabet: Alphabet) -> Nfa {
        let state = BTreeSet::from(["s0".to_string()]);
        Nfa {
            alphabet,
            states: state.clone(),
            start_states: state.clone(),
            delta: BTreeMap::new(),
            accept_states: state,
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

    pub fn start_states(&self) -> impl Iterator<Item = &str> {
        self.start_states.iter().map(String::as_str)
    }

    pub fn accept_states(&self) -> impl Iterator<Item = &str> {
        self.accept_states.iter().map(String::as_str)
    }

    pub fn is_accepting(&self, state: &str) -> bool {
        self.accept_states.contains(state)
    }

    /// Successors of `state` on `symbol`; empty when there is no entry.
    pub fn transition(&self, state: &str, symbol: char) -> impl Iterator<Item = &str> {
        self.successors(state, symbol)
            .into_iter()
            .flatten()
            .map(String::as_str)
    }

    pub fn transitions(&self) -> impl Iterator<Item = (&str, char, &str)> {
        self.delta.iter().flat_map(|(from, row)| {
            row.iter().flat_map(move |(symbol, targets)| {
                targets
                    .iter()
                    .map(move |to| (from.as_str(), *symbol, to.as_str()))
            })
        })
    }

    fn successors(&self, state: &str, symbol: char) -> Option<&BTreeSet<String>> {
        self.delta.get(state).and_then(|row| row.get(&symbol))
    }

    pub fn accepts_empty_word(&self) -> bool {
        !self.start_states.is_disjoint(&self.accept_states)
    }

    pub fn run(&self, input: &str) -> Result<bool, RunError> {
        let mut frontier: BTreeSet<&str> = self.start_states().collect();

        let mut symbols = input.chars();
        while let Some(symbol) = symbols.next() {
            self.alphabet.check(symbol)?;

            let next: BTreeSet<&str> = frontier
                .iter()
                .flat_map(|state| self.transition(state, symbol))
                .collect();

            // without ε-moves an empty frontier can never recover,
            // but foreign symbols later in the input are still reported
            if next.is_empty() {
                symbols.try_for_each(|x| self.alphabet.check(x))?;
                return Ok(false);
            }
            frontier = next;
        }

        Ok(frontier.iter().any(|x| self.is_accepting(x)))
    }

    /// Subset construction. Every DFA state is a set of NFA states named like
    /// `{q0,q1}`; the empty set `{}` is the dead state. A name already given to
    /// another subset gets a number appended, e.g. `{x,y}1`.
    pub fn derive_deterministic(&self) -> Dfa {
        let names: Vec<&str> = self.states().collect();
        let index: HashMap<&str, usize> = names.iter().enumerate().map(|(i, x)| (*x, i)).collect();
        let symbols: Vec<char> = self.alphabet.iter().collect();

        let subset_name = |subset: &BitSet| -> String {
            let members: Vec<&str> = subset.iter().map(|i| names[i]).collect();
            format!("{{{}}}", members.join(","))
        };

        // all subsets share one capacity so equal sets compare and hash equal
        let to_subset = |states: &BTreeSet<String>| -> BitSet {
            let mut subset = BitSet::with_capacity(names.len());
            subset.extend(states.iter().map(|x| index[x.as_str()]));
            subset
        };

        let start = to_subset(&self.start_states);
        let accepting = to_subset(&self.accept_states);

        // subset -> name in the DFA
        let mut known: HashMap<BitSet, String> = HashMap::new();
        // member names may contain ',' or braces, so two subsets can render alike
        let mut issued: BTreeSet<String> = BTreeSet::new();
        let start_name = subset_name(&start);
        issued.insert(start_name.clone());
        known.insert(start.clone(), start_name.clone());

        let mut delta: BTreeMap<String, BTreeMap<char, String>> = BTreeMap::new();
        let mut frontier: Vec<BitSet> = vec![start.clone()];

        while !frontier.is_empty() {
            let mut discovered: Vec<BitSet> = Vec::new();

            for subset in &frontier {
                let from = known[subset].clone();
                for symbol in &symbols {
                    let mut next = BitSet::with_capacity(names.len());
                    for i in subset.iter() {
                        if let Some(targets) = self.successors(names[i], *symbol) {
                            next.extend(targets.iter().map(|x| index[x.as_str()]));
                        }
                    }

                    let to = match known.get(&next) {
                        Some(name) => name.clone(),
                        None => {
                            let name = fresh_name(&issued, &subset_name(&next));
                            issued.insert(name.clone());
                            known.insert(next.clone(), name.clone());
                            discovered.push(next);
                            name
                        }
                    };
                    delta.entry(from.clone()).or_default().insert(*symbol, to);
                }
            }

            trace!("subset construction discovered {} new states", discovered.len());
            frontier = discovered;
        }

        let accept_states: BTreeSet<String> = known
            .iter()
            .filter(|(subset, _)| !subset.is_disjoint(&accepting))
            .map(|(_, name)| name.clone())
            .collect();
        let states: BTreeSet<String> = known.into_values().collect();

        // every combined state is processed once, so the table is total
        for state in &states {
            delta.entry(state.clone()).or_default();
        }

        debug!(
            "derived DFA with {} states from NFA with {} states",
            states.len(),
            self.states.len()
        );

        Dfa::from_parts(
            self.alphabet.clone(),
            states,
            start_name,
            delta,
            accept_states,
        )
    }

    /// L(self) ∪ L(other).
    pub fn union_with(&self, other: &Nfa) -> Nfa {
        let other = self.disjoint_copy_of(other);

        let mut delta = self.delta.clone();
        delta.extend(other.delta);

        let result = Nfa {
            alphabet: self.alphabet.merged(&other.alphabet),
            states: self.states.union(&other.states).cloned().collect(),
            start_states: self.start_states.union(&other.start_states).cloned().collect(),
            delta,
            accept_states: self.accept_states.union(&other.accept_states).cloned().collect(),
        };
        trace!("union:\n{}", result);
        result
    }

    /// L(self)·L(other).
    ///
    /// Accept states of `self` get the outgoing transitions of the start states
    /// of `other`. They stay accepting only when `other` accepts the empty word.
    pub fn concat_with(&self, other: &Nfa) -> Nfa {
        let other = self.disjoint_copy_of(other);
        let alphabet = self.alphabet.merged(&other.alphabet);

        let mut delta = self.delta.clone();
        delta.extend(other.delta.clone());

        for accept_state in &self.accept_states {
            for start_state in &other.start_states {
                for symbol in alphabet.iter() {
                    if let Some(targets) = other.successors(start_state, symbol) {
                        delta
                            .entry(accept_state.clone())
                            .or_default()
                            .entry(symbol)
                            .or_default()
                            .extend(targets.iter().cloned());
                    }
                }
            }
        }

        let mut accept_states = other.accept_states.clone();
        if other.accepts_empty_word() {
            accept_states.extend(self.accept_states.iter().cloned());
        }

        let result = Nfa {
            alphabet,
            states: self.states.union(&other.states).cloned().collect(),
            start_states: self.start_states.clone(),
            delta,
            accept_states,
        };
        trace!("concatenation:\n{}", result);
        result
    }

    /// L(self)*.
    pub fn repeating(&self) -> Nfa {
        let mut states = self.states.clone();
        let mut start_states = self.start_states.clone();
        let mut accept_states = self.accept_states.clone();

        // an extra start + accept state for the empty word, unless it is already accepted
        if !self.accepts_empty_word() {
            let empty_word_state = fresh_name(&states, "e");
            states.insert(empty_word_state.clone());
            start_states.insert(empty_word_state.clone());
            accept_states.insert(empty_word_state);
        }

        // from any accept state, continue as if at a start state again
        let mut delta = self.delta.clone();
        for accept_state in &self.accept_states {
            for start_state in &self.start_states {
                for symbol in self.alphabet.iter() {
                    if let Some(targets) = self.successors(start_state, symbol) {
                        delta
                            .entry(accept_state.clone())
                            .or_default()
                            .entry(symbol)
                            .or_default()
                            .extend(targets.iter().cloned());
                    }
                }
            }
        }

        let result = Nfa {
            alphabet: self.alphabet.clone(),
            states,
            start_states,
            delta,
            accept_states,
        };
        trace!("repetition:\n{}", result);
        result
    }

    // copy of `other` whose state names do not collide with ours
    fn disjoint_copy_of(&self, other: &Nfa) -> Nfa {
        let mut taken: BTreeSet<String> = self.states.union(&other.states).cloned().collect();
        let mut renames: HashMap<&str, String> = HashMap::new();

        for state in self.states.intersection(&other.states) {
            let new_name = fresh_name(&taken, state);
            taken.insert(new_name.clone());
            renames.insert(state.as_str(), new_name);
        }

        if renames.is_empty() {
            return other.clone();
        }

        trace!("renaming states to avoid collisions: {:?}", renames);
        other.renamed(&renames)
    }

    fn renamed(&self, renames: &HashMap<&str, String>) -> Nfa {
        let rename = |state: &String| -> String {
            renames
                .get(state.as_str())
                .cloned()
                .unwrap_or_else(|| state.clone())
        };
        let rename_all =
            |states: &BTreeSet<String>| -> BTreeSet<String> { states.iter().map(|x| rename(x)).collect() };

        let delta: Delta = self
            .delta
            .iter()
            .map(|(from, row)| {
                let row = row
                    .iter()
                    .map(|(symbol, targets)| (*symbol, rename_all(targets)))
                    .collect();
                (rename(from), row)
            })
            .collect();

        Nfa {
            alphabet: self.alphabet.clone(),
            states: rename_all(&self.states),
            start_states: rename_all(&self.start_states),
            delta,
            accept_states: rename_all(&self.accept_states),
        }
    }
}

impl Automaton for Nfa {
    fn alphabet(&self) -> &Alphabet {
        &self.alphabet
    }

    fn run(&self, input: &str) -> Result<bool, RunError> {
        Nfa::run(self, input)
    }
}

impl Display for Nfa {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "start: {:?}", self.start_states)?;
        writeln!(f, "accept: {:?}", self.accept_states)?;
        for (from, row) in &self.delta {
            for (symbol, targets) in row {
                writeln!(f, "  {} -{}-> {:?}", from, symbol, targets)?;
            }
        }
        Ok(())
    }
}
