// graph views of automata, mostly for dumping them as dot
use std::{collections::BTreeMap, fmt::Display};

use petgraph::{
    dot::Dot,
    graph::{DiGraph, NodeIndex},
};

use crate::{dfa::Dfa, nfa::Nfa};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateNode {
    pub name: String,
    pub start: bool,
    pub accept: bool,
}

impl Display for StateNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.start {
            write!(f, "-> ")?;
        }
        if self.accept {
            write!(f, "({})", self.name)
        } else {
            write!(f, "{}", self.name)
        }
    }
}

// edges between the same pair of states are merged, labelled "a,b"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SymbolEdge(pub Vec<char>);

impl Display for SymbolEdge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let symbols: Vec<String> = self.0.iter().map(char::to_string).collect();
        write!(f, "{}", symbols.join(","))
    }
}

fn build_graph<'a>(
    states: impl Iterator<Item = &'a str>,
    is_start: impl Fn(&str) -> bool,
    is_accept: impl Fn(&str) -> bool,
    transitions: impl Iterator<Item = (&'a str, char, &'a str)>,
) -> DiGraph<StateNode, SymbolEdge> {
    let mut graph: DiGraph<StateNode, SymbolEdge> = DiGraph::new();
    let mut nodes: BTreeMap<&str, NodeIndex> = BTreeMap::new();

    for state in states {
        let node = graph.add_node(StateNode {
            name: state.to_string(),
            start: is_start(state),
            accept: is_accept(state),
        });
        nodes.insert(state, node);
    }

    let mut edges: BTreeMap<(&str, &str), Vec<char>> = BTreeMap::new();
    for (from, symbol, to) in transitions {
        edges.entry((from, to)).or_default().push(symbol);
    }

    for ((from, to), symbols) in edges {
        graph.add_edge(nodes[from], nodes[to], SymbolEdge(symbols));
    }

    graph
}

impl Dfa {
    pub fn to_graph(&self) -> DiGraph<StateNode, SymbolEdge> {
        build_graph(
            self.states(),
            |x| x == self.start_state(),
            |x| self.is_accepting(x),
            self.transitions(),
        )
    }

    /// Graphviz rendering of [`Dfa::to_graph`].
    pub fn to_dot(&self) -> String {
        format!("{}", Dot::new(&self.to_graph()))
    }
}

impl Nfa {
    pub fn to_graph(&self) -> DiGraph<StateNode, SymbolEdge> {
        build_graph(
            self.states(),
            |x| self.start_states().any(|s| s == x),
            |x| self.is_accepting(x),
            self.transitions(),
        )
    }

    pub fn to_dot(&self) -> String {
        format!("{}", Dot::new(&self.to_graph()))
    }
}
