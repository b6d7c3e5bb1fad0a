//! Pushdown automaton decided by an exhaustive depth-first search over configurations.
//!
//! Acceptance is by final state: a configuration that has consumed the whole word
//! in an accepting state accepts, whatever is left on the stack.

use crate::analyzer::analyze_pda;
use crate::types::{AutomatonError, Outcome, PdaTransition, State, StateSet, MAX_SEARCH_DEPTH};
use log::{debug, trace};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

/// An instantaneous snapshot of a pushdown run.
///
/// The top of the stack is the last element of `stack`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Configuration {
    pub state: State,
    pub cursor: usize,
    pub stack: Vec<char>,
    /// Moves in a row that consumed no input.
    pub stalled: usize,
}

/// A validated pushdown automaton.
#[derive(Debug, Clone, Serialize)]
pub struct Pda {
    states: StateSet,
    alphabet: BTreeSet<char>,
    stack_alphabet: BTreeSet<char>,
    start: State,
    initial_stack: char,
    accepting: StateSet,
    transitions: Vec<PdaTransition>,
    /// source state -> indices into `transitions`
    #[serde(skip)]
    by_state: HashMap<State, Vec<usize>>,
}

impl Pda {
    /// Builds a pushdown automaton and validates it.
    pub fn new(
        states: Vec<State>,
        alphabet: BTreeSet<char>,
        stack_alphabet: BTreeSet<char>,
        start: State,
        initial_stack: char,
        accepting: Vec<State>,
        transitions: Vec<PdaTransition>,
    ) -> Result<Self, AutomatonError> {
        let mut by_state: HashMap<State, Vec<usize>> = HashMap::new();
        for (i, t) in transitions.iter().enumerate() {
            by_state.entry(t.from.clone()).or_default().push(i);
        }

        let pda = Self {
            states: states.into_iter().collect(),
            alphabet,
            stack_alphabet,
            start,
            initial_stack,
            accepting: accepting.into_iter().collect(),
            transitions,
            by_state,
        };

        analyze_pda(&pda)?;

        Ok(pda)
    }

    /// Decides `word` with the default depth guard.
    ///
    /// # Returns
    ///
    /// * `Ok(true)` / `Ok(false)` for an accepted or rejected word.
    /// * `Err(AutomatonError::SearchExhausted)` if the search outgrew the guard.
    pub fn accepts(&self, word: &str) -> Result<bool, AutomatonError> {
        match self.run(word, MAX_SEARCH_DEPTH) {
            Outcome::Accepted => Ok(true),
            Outcome::Rejected => Ok(false),
            Outcome::Exhausted { limit } => Err(AutomatonError::SearchExhausted { limit }),
        }
    }

    /// Searches for an accepting configuration.
    ///
    /// Configurations are explored last-in first-out, so the most recently generated
    /// successor is expanded first. The search gives up with `Outcome::Exhausted` as
    /// soon as more than `limit` configurations are pending, or a path makes more than
    /// `limit` moves in a row without reading input.
    pub fn run(&self, word: &str, limit: usize) -> Outcome {
        let input: Vec<char> = word.chars().collect();
        let mut worklist = vec![self.initial_configuration()];
        let mut explored = 0usize;

        while let Some(config) = worklist.pop() {
            explored += 1;

            if config.cursor == input.len() && self.accepting.contains(&config.state) {
                debug!("pda: accepted after exploring {explored} configurations");
                return Outcome::Accepted;
            }

            // A single epsilon loop never grows the worklist, only its own path.
            if worklist.len() > limit || config.stalled > limit {
                debug!("pda: search exceeded {limit} after {explored} configurations");
                return Outcome::Exhausted { limit };
            }

            trace!("pda: expanding {config:?}");
            worklist.extend(self.successors(&config, &input));
        }

        debug!("pda: rejected after exploring {explored} configurations");
        Outcome::Rejected
    }

    /// Generates every configuration reachable from `config` in one move.
    pub fn successors(&self, config: &Configuration, input: &[char]) -> Vec<Configuration> {
        let lookahead = input.get(config.cursor).copied();
        let top = config.stack.last().copied();

        self.rules_from(&config.state)
            .filter(|t| t.input.is_none() || t.input == lookahead)
            .filter(|t| t.pop.is_none() || t.pop == top)
            .map(|t| {
                let mut stack = config.stack.clone();
                if t.pop.is_some() {
                    stack.pop();
                }
                // the first push symbol ends on top
                stack.extend(t.push.iter().rev());

                let (cursor, stalled) = match t.input {
                    Some(_) => (config.cursor + 1, 0),
                    None => (config.cursor, config.stalled + 1),
                };

                Configuration {
                    state: t.to.clone(),
                    cursor,
                    stack,
                    stalled,
                }
            })
            .collect()
    }

    /// The configuration every search starts from.
    pub fn initial_configuration(&self) -> Configuration {
        Configuration {
            state: self.start.clone(),
            cursor: 0,
            stack: vec![self.initial_stack],
            stalled: 0,
        }
    }

    fn rules_from<'a>(&'a self, state: &str) -> impl Iterator<Item = &'a PdaTransition> + 'a {
        self.by_state
            .get(state)
            .into_iter()
            .flatten()
            .map(move |&i| &self.transitions[i])
    }

    pub fn states(&self) -> &StateSet {
        &self.states
    }

    pub fn alphabet(&self) -> &BTreeSet<char> {
        &self.alphabet
    }

    pub fn stack_alphabet(&self) -> &BTreeSet<char> {
        &self.stack_alphabet
    }

    pub fn start(&self) -> &str {
        &self.start
    }

    pub fn initial_stack(&self) -> char {
        self.initial_stack
    }

    pub fn accepting(&self) -> &StateSet {
        &self.accepting
    }

    pub fn transitions(&self) -> &[PdaTransition] {
        &self.transitions
    }
}
