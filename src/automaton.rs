//! A class-agnostic wrapper over the four automaton models, used by the loader,
//! the catalog and the command-line front end.

use crate::dfa::Dfa;
use crate::machine::{Execution, TuringMachine};
use crate::nfa::Nfa;
use crate::pda::Pda;
use crate::types::{Halt, Kind, Outcome};
use serde::Serialize;

/// Any validated automaton.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", content = "model")]
pub enum Automaton {
    Dfa(Dfa),
    Nfa(Nfa),
    Pda(Pda),
    Turing(TuringMachine),
}

/// The result of feeding one word to an [`Automaton`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", rename_all = "snake_case")]
pub enum Verdict {
    Accepted,
    Rejected,
    /// The pushdown search hit its depth guard.
    Exhausted { limit: usize },
    /// A Turing Machine run, with the final tape.
    Halted {
        halt: Halt,
        steps: usize,
        tape: String,
        output: String,
    },
}

/// Bounds applied when running an [`Automaton`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub search_depth: usize,
    pub max_steps: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            search_depth: crate::types::MAX_SEARCH_DEPTH,
            max_steps: crate::types::MAX_EXECUTION_STEPS,
        }
    }
}

impl Automaton {
    pub fn kind(&self) -> Kind {
        match self {
            Automaton::Dfa(_) => Kind::Dfa,
            Automaton::Nfa(_) => Kind::Nfa,
            Automaton::Pda(_) => Kind::Pda,
            Automaton::Turing(_) => Kind::Turing,
        }
    }

    /// Runs `word` through the automaton.
    ///
    /// A Turing Machine accepts when it halts in its accepting state; the other
    /// classes accept by final state.
    pub fn evaluate(&self, word: &str, limits: Limits) -> Verdict {
        match self {
            Automaton::Dfa(dfa) => Verdict::from_bool(dfa.accepts(word)),
            Automaton::Nfa(nfa) => Verdict::from_bool(nfa.accepts(word)),
            Automaton::Pda(pda) => match pda.run(word, limits.search_depth) {
                Outcome::Accepted => Verdict::Accepted,
                Outcome::Rejected => Verdict::Rejected,
                Outcome::Exhausted { limit } => Verdict::Exhausted { limit },
            },
            Automaton::Turing(tm) => {
                Verdict::from_execution(&tm.run(word, limits.max_steps))
            }
        }
    }
}

impl Verdict {
    fn from_bool(accepted: bool) -> Self {
        if accepted {
            Verdict::Accepted
        } else {
            Verdict::Rejected
        }
    }

    fn from_execution(execution: &Execution) -> Self {
        Verdict::Halted {
            // a finished run always carries its halt reason
            halt: execution.halt().unwrap_or(Halt::NoRule),
            steps: execution.steps(),
            tape: execution.tape_string(),
            output: execution.output(),
        }
    }

    /// Returns `true` for an accepting verdict, including a Turing Machine that
    /// halted in its accepting state.
    pub fn is_accepted(&self) -> bool {
        matches!(
            self,
            Verdict::Accepted
                | Verdict::Halted {
                    halt: Halt::Accepted,
                    ..
                }
        )
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Accepted => write!(f, "ACCEPTED"),
            Verdict::Rejected => write!(f, "REJECTED"),
            Verdict::Exhausted { limit } => {
                write!(f, "EXHAUSTED (search went past {limit})")
            }
            Verdict::Halted {
                halt, steps, output, ..
            } => {
                let reason = match halt {
                    Halt::Accepted => "accepted",
                    Halt::NoRule => "halted",
                    Halt::StepLimit => "step limit reached",
                };
                write!(f, "{output} ({reason} after {steps} steps)")
            }
        }
    }
}
