//! This module defines the core data structures and types shared by every automaton class,
//! including reserved markers, execution limits, transition records and error types.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

use crate::Rule;

/// The reserved marker for a transition that consumes no input, pops nothing, or pushes nothing.
pub const EPSILON: char = '$';
/// The default blank symbol used on the Turing Machine tape.
pub const DEFAULT_BLANK_SYMBOL: char = '_';
/// The maximum allowed size for a definition file in bytes.
pub const MAX_DEFINITION_SIZE: usize = 65536; // 64KB
/// The maximum number of pending configurations a pushdown search may hold, and the
/// maximum number of input-free moves a single path may make in a row.
pub const MAX_SEARCH_DEPTH: usize = 10000;
/// The maximum number of steps a Turing Machine executes before it is cut off.
pub const MAX_EXECUTION_STEPS: usize = 10000;
/// Number of blank cells appended after the input when a tape is created.
pub const TAPE_PADDING: usize = 50;

/// A control state label. Engines never inspect its content.
pub type State = String;

/// A set of states with a stable iteration order.
pub type StateSet = BTreeSet<State>;

/// The automaton classes understood by the parser and the loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Kind {
    Dfa,
    Nfa,
    Pda,
    Turing,
}

impl Kind {
    /// Guesses the automaton class from a file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "dfa" => Some(Kind::Dfa),
            "nfa" => Some(Kind::Nfa),
            "pda" => Some(Kind::Pda),
            "tm" | "lfa" => Some(Kind::Turing),
            _ => None,
        }
    }

    /// Number of whitespace-separated fields a rule line has for this class.
    pub fn rule_arity(self) -> usize {
        match self {
            Kind::Dfa | Kind::Nfa => 3,
            Kind::Pda | Kind::Turing => 5,
        }
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Kind::Dfa => "DFA",
            Kind::Nfa => "NFA",
            Kind::Pda => "PDA",
            Kind::Turing => "Turing machine",
        };
        f.write_str(name)
    }
}

/// A finite-automaton edge. `symbol` is `None` for an epsilon transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    pub from: State,
    pub symbol: Option<char>,
    pub to: State,
}

/// A pushdown rule: `(from, input, pop) -> (to, push)`.
///
/// `input` and `pop` are `None` for epsilon. The first character of `push`
/// ends up on top of the stack.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PdaTransition {
    pub from: State,
    pub input: Option<char>,
    pub pop: Option<char>,
    pub to: State,
    pub push: Vec<char>,
}

/// A Turing Machine rule: in `state` reading `read`, write `write`, move in `direction`
/// and switch to `next_state`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TmTransition {
    pub state: State,
    pub read: char,
    pub next_state: State,
    pub write: char,
    pub direction: Direction,
}

/// Represents the possible directions a Turing Machine head can move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    /// Move the head one position to the left.
    Left,
    /// Move the head one position to the right.
    Right,
    /// Keep the head in the same position.
    Stay,
}

/// Represents the outcome of a Turing Machine execution step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Step {
    /// The machine performed a step and continues execution.
    Continue,
    /// The machine stopped.
    Halt(Halt),
}

/// Why a Turing Machine run stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Halt {
    /// The accepting state was reached.
    Accepted,
    /// No rule exists for the current state and symbol. This is the ordinary halt.
    NoRule,
    /// The step bound was reached before the machine halted on its own.
    StepLimit,
}

/// The verdict of a pushdown search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    Accepted,
    Rejected,
    /// The worklist outgrew `limit`; the rule set probably loops.
    Exhausted { limit: usize },
}

impl Outcome {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Outcome::Accepted)
    }
}

/// Represents the errors that can occur while loading or running an automaton.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AutomatonError {
    /// Indicates a syntax error in a definition, with its source location.
    #[error("Definition parsing error: {0}")]
    ParseError(#[from] Box<pest::error::Error<Rule>>),
    /// Indicates that a parsed definition violates a model invariant.
    #[error("Definition validation error: {0}")]
    ValidationError(String),
    /// Indicates an error related to file system operations.
    #[error("File error: {0}")]
    FileError(String),
    /// The pushdown search exceeded its depth guard, the rules likely never terminate.
    #[error(
        "Search too deep: more than {limit} pending configurations or input-free moves (possible infinite loop)"
    )]
    SearchExhausted { limit: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_serialization() {
        let left_json = serde_json::to_string(&Direction::Left).unwrap();
        let stay_json = serde_json::to_string(&Direction::Stay).unwrap();

        assert_eq!(left_json, "\"Left\"");
        assert_eq!(stay_json, "\"Stay\"");

        let stay: Direction = serde_json::from_str(&stay_json).unwrap();
        assert_eq!(stay, Direction::Stay);
    }

    #[test]
    fn test_kind_from_extension() {
        assert_eq!(Kind::from_extension("dfa"), Some(Kind::Dfa));
        assert_eq!(Kind::from_extension("NFA"), Some(Kind::Nfa));
        assert_eq!(Kind::from_extension("pda"), Some(Kind::Pda));
        assert_eq!(Kind::from_extension("lfa"), Some(Kind::Turing));
        assert_eq!(Kind::from_extension("txt"), None);
    }

    #[test]
    fn test_outcome_serialization() {
        let json = serde_json::to_string(&Outcome::Exhausted { limit: 3 }).unwrap();
        assert_eq!(json, r#"{"Exhausted":{"limit":3}}"#);
    }

    #[test]
    fn test_error_display() {
        let error = AutomatonError::SearchExhausted { limit: 10 };
        let msg = error.to_string();
        assert!(msg.contains("Search too deep"));
        assert!(msg.contains("10"));
    }
}
