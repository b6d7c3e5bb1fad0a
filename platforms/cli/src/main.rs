use clap::{Parser, ValueEnum};
use lfa::{Automaton, Catalog, Kind, Limits, Loader, Verdict};
use log::{debug, info};
use serde::Serialize;
use std::io::{self, Read};
use std::path::Path;
use std::process;

/// Runs words through a DFA, epsilon-NFA, pushdown automaton or Turing machine.
#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
#[clap(after_help = "EXAMPLES:
  lfa-cli -m machines/anbn.pda aabb aab
  lfa-cli --sample unary-addition 111+1111
  cat machines/even-zeros.dfa | lfa-cli -k dfa 1010")]
struct Cli {
    /// The definition file to load (.dfa, .nfa, .pda, .tm)
    #[clap(short, long, conflicts_with = "sample")]
    machine: Option<String>,

    /// Use a built-in sample instead of a file
    #[clap(long)]
    sample: Option<String>,

    /// Automaton class, required for piped input or unknown extensions
    #[clap(short, long, value_enum)]
    kind: Option<KindArg>,

    /// Maximum number of Turing machine steps
    #[clap(short, long, default_value_t = lfa::MAX_EXECUTION_STEPS)]
    steps: usize,

    /// Maximum number of pending pushdown configurations, and of input-free moves in a row
    #[clap(short, long, default_value_t = lfa::MAX_SEARCH_DEPTH)]
    limit: usize,

    /// Print the states visited for each word
    #[clap(short, long)]
    trace: bool,

    /// Print one JSON object per word
    #[clap(long)]
    json: bool,

    /// List the built-in samples and exit
    #[clap(long)]
    list: bool,

    /// The words to check
    words: Vec<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum KindArg {
    Dfa,
    Nfa,
    Pda,
    Tm,
}

impl From<KindArg> for Kind {
    fn from(arg: KindArg) -> Self {
        match arg {
            KindArg::Dfa => Kind::Dfa,
            KindArg::Nfa => Kind::Nfa,
            KindArg::Pda => Kind::Pda,
            KindArg::Tm => Kind::Turing,
        }
    }
}

#[derive(Serialize)]
struct Report<'a> {
    word: &'a str,
    #[serde(flatten)]
    verdict: &'a Verdict,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if cli.list {
        for sample in Catalog::samples() {
            println!("{:<16} {}", sample.name, sample.automaton.kind());
        }
        return;
    }

    let automaton = match load_automaton(&cli) {
        Ok(automaton) => automaton,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };
    info!("loaded {}", automaton.kind());

    let limits = Limits {
        search_depth: cli.limit,
        max_steps: cli.steps,
    };

    for word in &cli.words {
        let verdict = automaton.evaluate(word, limits);
        debug!("{word:?} -> {verdict:?}");

        if cli.json {
            let report = Report {
                word,
                verdict: &verdict,
            };
            match serde_json::to_string(&report) {
                Ok(line) => println!("{}", line),
                Err(e) => eprintln!("Error: {}", e),
            }
        } else {
            println!("{}: {}", word, verdict);
        }

        if cli.trace {
            print_trace(&automaton, word, limits);
        }
    }
}

/// Loads the automaton from a sample, a file, or stdin, in that order.
fn load_automaton(cli: &Cli) -> Result<Automaton, String> {
    if let Some(name) = &cli.sample {
        return Catalog::automaton(name).map_err(|e| e.to_string());
    }

    if let Some(path) = &cli.machine {
        let path = Path::new(path);
        let result = match cli.kind {
            Some(kind) => Loader::load_as(kind.into(), path),
            None => Loader::load(path),
        };
        return result.map_err(|e| e.to_string());
    }

    if atty::isnt(atty::Stream::Stdin) {
        let kind = cli
            .kind
            .ok_or("--kind is required when reading a definition from stdin")?;
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|e| format!("Failed to read from stdin: {}", e))?;
        return Loader::load_from_string(kind.into(), &buffer).map_err(|e| e.to_string());
    }

    Err("No automaton given, use --machine, --sample or pipe a definition".to_string())
}

/// Prints how `word` moves through the automaton.
fn print_trace(automaton: &Automaton, word: &str, limits: Limits) {
    match automaton {
        Automaton::Dfa(dfa) => println!("  {}", dfa.run(word).join(" -> ")),
        Automaton::Nfa(nfa) => {
            for (i, states) in nfa.trace(word).iter().enumerate() {
                let states: Vec<&str> = states.iter().map(String::as_str).collect();
                println!("  {i}: {{{}}}", states.join(", "));
            }
        }
        Automaton::Pda(pda) => {
            // the search has no single path to show, list the first moves instead
            let start = pda.initial_configuration();
            let input: Vec<char> = word.chars().collect();
            for next in pda.successors(&start, &input) {
                let stack: String = next.stack.iter().rev().collect();
                println!("  {} -> {} at {} stack {}", start.state, next.state, next.cursor, stack);
            }
        }
        Automaton::Turing(tm) => {
            let mut execution = tm.load(word);
            while execution.steps() < limits.max_steps
                && tm.step(&mut execution) == lfa::Step::Continue
            {
                println!(
                    "  step {}: {} head {} tape {}",
                    execution.steps(),
                    execution.state(),
                    execution.head(),
                    execution.output()
                );
            }
        }
    }
}
