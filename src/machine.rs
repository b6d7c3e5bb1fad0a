//! This module defines the single-tape `TuringMachine` and its `Execution`. The machine is the
//! immutable rule table; an execution owns the tape, the head position, the current state and
//! the step count of one run.

use crate::analyzer::analyze_turing;
use crate::types::{
    AutomatonError, Direction, Halt, State, StateSet, Step, TmTransition, MAX_EXECUTION_STEPS,
    TAPE_PADDING,
};
use log::{debug, trace};
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

/// A validated, deterministic single-tape Turing Machine.
#[derive(Debug, Clone, Serialize)]
pub struct TuringMachine {
    states: StateSet,
    alphabet: BTreeSet<char>,
    start: State,
    accept: Option<State>,
    blank: char,
    transitions: Vec<TmTransition>,
    /// state -> symbol read -> index into `transitions`
    #[serde(skip)]
    delta: HashMap<State, HashMap<char, usize>>,
}

/// The mutable side of one Turing Machine run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Execution {
    tape: Vec<char>,
    head: usize,
    state: State,
    steps: usize,
    halt: Option<Halt>,
    blank: char,
}

impl TuringMachine {
    /// Builds a Turing Machine and validates it.
    ///
    /// # Arguments
    ///
    /// * `accept` - The state that stops the machine as soon as it is entered, if any.
    /// * `blank` - The symbol of an unwritten tape cell.
    pub fn new(
        states: Vec<State>,
        alphabet: BTreeSet<char>,
        start: State,
        accept: Option<State>,
        blank: char,
        transitions: Vec<TmTransition>,
    ) -> Result<Self, AutomatonError> {
        let mut delta: HashMap<State, HashMap<char, usize>> = HashMap::new();
        for (i, t) in transitions.iter().enumerate() {
            delta.entry(t.state.clone()).or_default().insert(t.read, i);
        }

        let machine = Self {
            states: states.into_iter().collect(),
            alphabet,
            start,
            accept,
            blank,
            transitions,
            delta,
        };

        analyze_turing(&machine)?;

        Ok(machine)
    }

    /// Creates a fresh execution for `input`.
    ///
    /// The tape holds the input followed by `TAPE_PADDING` blanks, and the head
    /// starts on the first cell.
    pub fn load(&self, input: &str) -> Execution {
        let mut tape: Vec<char> = input.chars().collect();
        tape.resize(tape.len() + TAPE_PADDING, self.blank);

        Execution {
            tape,
            head: 0,
            state: self.start.clone(),
            steps: 0,
            halt: None,
            blank: self.blank,
        }
    }

    /// Executes a single step of `execution`.
    ///
    /// # Returns
    ///
    /// * `Step::Continue` if a rule fired.
    /// * `Step::Halt(Halt::Accepted)` if the execution is in the accepting state.
    /// * `Step::Halt(Halt::NoRule)` if no rule matches the state and the symbol under the head.
    pub fn step(&self, execution: &mut Execution) -> Step {
        if let Some(halt) = execution.halt {
            return Step::Halt(halt);
        }

        if self.accept.as_deref() == Some(execution.state.as_str()) {
            return execution.stop(Halt::Accepted);
        }

        let Some(transition) = self.transition(&execution.state, execution.symbol()) else {
            return execution.stop(Halt::NoRule);
        };

        trace!(
            "tm: step {} in {} reading {:?}",
            execution.steps,
            execution.state,
            execution.symbol()
        );

        execution.tape[execution.head] = transition.write;

        match transition.direction {
            // The tape does not extend to the left
            Direction::Left => execution.head = execution.head.saturating_sub(1),
            Direction::Right => {
                execution.head += 1;
                if execution.head >= execution.tape.len() {
                    execution.tape.push(execution.blank);
                }
            }
            Direction::Stay => {}
        }

        execution.state = transition.next_state.clone();
        execution.steps += 1;

        Step::Continue
    }

    /// Runs the machine on `input` until it halts or `max_steps` rules have fired.
    ///
    /// Running out of steps is reported as `Halt::StepLimit`, not as an error.
    pub fn run(&self, input: &str, max_steps: usize) -> Execution {
        let mut execution = self.load(input);

        loop {
            if execution.steps >= max_steps && execution.halt.is_none() {
                // A machine already sitting in its accepting state has halted, not run out.
                if self.accept.as_deref() == Some(execution.state.as_str()) {
                    execution.stop(Halt::Accepted);
                } else {
                    execution.stop(Halt::StepLimit);
                }
            }

            if let Step::Halt(halt) = self.step(&mut execution) {
                debug!("tm: halted with {halt:?} after {} steps", execution.steps);
                return execution;
            }
        }
    }

    /// Runs the machine with the default `MAX_EXECUTION_STEPS` bound.
    pub fn execute(&self, input: &str) -> Execution {
        self.run(input, MAX_EXECUTION_STEPS)
    }

    /// Finds the rule for `state` reading `symbol`.
    pub fn transition(&self, state: &str, symbol: char) -> Option<&TmTransition> {
        let i = *self.delta.get(state)?.get(&symbol)?;
        Some(&self.transitions[i])
    }

    pub fn states(&self) -> &StateSet {
        &self.states
    }

    pub fn alphabet(&self) -> &BTreeSet<char> {
        &self.alphabet
    }

    /// Returns the initial state of the Turing Machine.
    pub fn start(&self) -> &str {
        &self.start
    }

    pub fn accept_state(&self) -> Option<&str> {
        self.accept.as_deref()
    }

    /// Returns the blank symbol used by this Turing Machine.
    pub fn blank(&self) -> char {
        self.blank
    }

    pub fn transitions(&self) -> &[TmTransition] {
        &self.transitions
    }
}

impl Execution {
    fn stop(&mut self, halt: Halt) -> Step {
        self.halt = Some(halt);
        Step::Halt(halt)
    }

    /// The symbol under the head.
    pub fn symbol(&self) -> char {
        self.tape[self.head]
    }

    pub fn tape(&self) -> &[char] {
        &self.tape
    }

    /// The whole materialized tape, blanks included.
    pub fn tape_string(&self) -> String {
        self.tape.iter().collect()
    }

    /// The leading region of the tape up to the first blank cell.
    pub fn output(&self) -> String {
        self.tape.iter().take_while(|&&c| c != self.blank).collect()
    }

    /// The blank symbol of the machine this execution was loaded from.
    pub fn blank(&self) -> char {
        self.blank
    }

    pub fn head(&self) -> usize {
        self.head
    }

    pub fn state(&self) -> &str {
        &self.state
    }

    /// Returns the number of rules fired so far.
    pub fn steps(&self) -> usize {
        self.steps
    }

    /// Why the execution stopped, or `None` while it is still running.
    pub fn halt(&self) -> Option<Halt> {
        self.halt
    }
}
