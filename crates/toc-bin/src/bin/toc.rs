use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use log::info;
use toc::{Automaton, RegularExpression};

#[derive(Debug, Parser)]
#[command(name = "toc", about = "Compile regular expressions to finite automata and run them")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print accept/reject for every input
    Match {
        #[command(flatten)]
        regex: RegexArgs,
        inputs: Vec<String>,
    },
    /// Print the automaton as a Graphviz digraph
    Dot {
        #[command(flatten)]
        regex: RegexArgs,
    },
}

#[derive(Debug, clap::Args)]
struct RegexArgs {
    /// Input symbols, e.g. "ab"
    #[arg(short, long)]
    alphabet: String,
    /// Expression over the alphabet using ( ) * ⋅ ∪ ∅ ε
    #[arg(short, long)]
    regex: String,
    #[arg(short, long, value_enum, default_value_t = Engine::Minimal)]
    engine: Engine,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Engine {
    Nfa,
    Dfa,
    Minimal,
}

enum Compiled {
    Nfa(toc::Nfa),
    Dfa(toc::Dfa),
}

impl Compiled {
    fn automaton(&self) -> &dyn Automaton {
        match self {
            Compiled::Nfa(nfa) => nfa,
            Compiled::Dfa(dfa) => dfa,
        }
    }
}

fn compile(args: &RegexArgs) -> anyhow::Result<Compiled> {
    let regex = RegularExpression::new(args.alphabet.as_str(), args.regex.as_str())
        .with_context(|| format!("invalid regex '{}'", args.regex))?;
    let nfa = regex
        .derive_automaton()
        .with_context(|| format!("unable to compile '{}'", args.regex))?;
    info!("nfa has {} states", nfa.num_states());

    let compiled = match args.engine {
        Engine::Nfa => Compiled::Nfa(nfa),
        Engine::Dfa => Compiled::Dfa(nfa.derive_deterministic()),
        Engine::Minimal => Compiled::Dfa(nfa.derive_deterministic().minimize()),
    };
    Ok(compiled)
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Match { regex, inputs } => {
            let compiled = compile(&regex)?;
            for input in inputs {
                let accepted = compiled
                    .automaton()
                    .run(&input)
                    .with_context(|| format!("unable to run on '{}'", input))?;
                println!("{}\t{}", if accepted { "accept" } else { "reject" }, input);
            }
        }
        Command::Dot { regex } => {
            let dot = match compile(&regex)? {
                Compiled::Nfa(nfa) => nfa.to_dot(),
                Compiled::Dfa(dfa) => dfa.to_dot(),
            };
            println!("{}", dot);
        }
    }

    Ok(())
}
