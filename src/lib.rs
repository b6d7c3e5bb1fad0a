//! This crate provides formal-language recognizers: deterministic and nondeterministic
//! (epsilon) finite automata, pushdown automata and single-tape Turing Machines.
//! It includes modules for parsing automaton definitions, validating them, simulating their
//! execution, and a small catalog of built-in samples.

pub mod analyzer;
pub mod automaton;
pub mod catalog;
pub mod dfa;
pub mod loader;
pub mod machine;
pub mod nfa;
pub mod parser;
pub mod pda;
pub mod types;

/// Re-exports the `Rule` enum from the parser module, used by the `pest` grammar.
pub use crate::parser::Rule;
/// Re-exports the `AnalysisError` enum from the analyzer module.
pub use analyzer::AnalysisError;
/// Re-exports the class-agnostic wrapper and its verdicts.
pub use automaton::{Automaton, Limits, Verdict};
/// Re-exports the built-in sample catalog.
pub use catalog::{Catalog, Sample};
pub use dfa::Dfa;
/// Re-exports the `Loader` struct from the loader module.
pub use loader::Loader;
pub use machine::{Execution, TuringMachine};
pub use nfa::Nfa;
/// Re-exports the parse functions from the parser module.
pub use parser::{parse, parse_dfa, parse_nfa, parse_pda, parse_turing};
pub use pda::{Configuration, Pda};
/// Re-exports the shared types.
pub use types::{
    AutomatonError, Direction, Halt, Kind, Outcome, PdaTransition, State, StateSet, Step,
    TmTransition, Transition, EPSILON, MAX_EXECUTION_STEPS, MAX_SEARCH_DEPTH,
};
