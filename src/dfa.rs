//! Deterministic finite automaton: a total, single-valued transition function walked once
//! over the input.

use crate::analyzer::analyze_dfa;
use crate::types::{AutomatonError, State, StateSet, Transition};
use log::trace;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

/// A validated deterministic finite automaton.
///
/// Construction guarantees that every `(state, symbol)` pair over the declared
/// alphabet has exactly one successor.
#[derive(Debug, Clone, Serialize)]
pub struct Dfa {
    states: StateSet,
    alphabet: BTreeSet<char>,
    start: State,
    accepting: StateSet,
    transitions: Vec<Transition>,
    /// source -> symbol -> destination
    #[serde(skip)]
    delta: HashMap<State, HashMap<char, State>>,
}

impl Dfa {
    /// Builds a DFA and validates it.
    ///
    /// # Returns
    ///
    /// * `Ok(Dfa)` if every state and symbol is declared and the rules are total and deterministic.
    /// * `Err(AutomatonError::ValidationError)` describing the first violation otherwise.
    pub fn new(
        states: Vec<State>,
        alphabet: BTreeSet<char>,
        start: State,
        accepting: Vec<State>,
        transitions: Vec<Transition>,
    ) -> Result<Self, AutomatonError> {
        let mut delta: HashMap<State, HashMap<char, State>> = HashMap::new();
        for t in &transitions {
            if let Some(c) = t.symbol {
                delta.entry(t.from.clone()).or_default().insert(c, t.to.clone());
            }
        }

        let dfa = Self {
            states: states.into_iter().collect(),
            alphabet,
            start,
            accepting: accepting.into_iter().collect(),
            transitions,
            delta,
        };

        analyze_dfa(&dfa)?;

        Ok(dfa)
    }

    /// Returns `true` if the automaton ends in an accepting state after reading `word`.
    ///
    /// A character outside the alphabet has no successor and rejects the word.
    pub fn accepts(&self, word: &str) -> bool {
        let mut state = &self.start;

        for c in word.chars() {
            match self.next(state, c) {
                Some(next) => state = next,
                None => {
                    trace!("dfa: no transition for ({state}, {c:?}), rejecting");
                    return false;
                }
            }
        }

        self.accepting.contains(state)
    }

    /// Returns the states visited while reading `word`, starting with the start state.
    ///
    /// The path stops early at a character outside the alphabet.
    pub fn run(&self, word: &str) -> Vec<State> {
        let mut path = vec![self.start.clone()];
        let mut state = &self.start;

        for c in word.chars() {
            let Some(next) = self.next(state, c) else {
                break;
            };
            path.push(next.clone());
            state = next;
        }

        path
    }

    /// The unique successor of `state` on `symbol`.
    pub fn next(&self, state: &str, symbol: char) -> Option<&State> {
        self.delta.get(state)?.get(&symbol)
    }

    pub fn states(&self) -> &StateSet {
        &self.states
    }

    pub fn alphabet(&self) -> &BTreeSet<char> {
        &self.alphabet
    }

    pub fn start(&self) -> &str {
        &self.start
    }

    pub fn accepting(&self) -> &StateSet {
        &self.accepting
    }

    /// The rules in declaration order.
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(from: &str, symbol: char, to: &str) -> Transition {
        Transition {
            from: from.to_string(),
            symbol: Some(symbol),
            to: to.to_string(),
        }
    }

    /// Accepts binary words with an even number of zeros.
    fn even_zeros() -> Dfa {
        Dfa::new(
            vec!["even".into(), "odd".into()],
            ['0', '1'].into_iter().collect(),
            "even".into(),
            vec!["even".into()],
            vec![
                rule("even", '0', "odd"),
                rule("even", '1', "even"),
                rule("odd", '0', "even"),
                rule("odd", '1', "odd"),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_even_zeros() {
        let dfa = even_zeros();

        assert!(dfa.accepts("1010"));
        assert!(!dfa.accepts("101"));
        assert!(dfa.accepts(""));
        assert!(dfa.accepts("00"));
        assert!(!dfa.accepts("0111"));
    }

    #[test]
    fn test_undeclared_input_symbol_rejects() {
        let dfa = even_zeros();
        assert!(!dfa.accepts("1a1"));
    }

    #[test]
    fn test_run_path() {
        let dfa = even_zeros();
        assert_eq!(dfa.run("01"), vec!["even", "odd", "odd"]);
        assert_eq!(dfa.run("0x0"), vec!["even", "odd"]);
    }

    #[test]
    fn test_next() {
        let dfa = even_zeros();
        let state = String::from("odd");

        assert_eq!(dfa.next(&state, '0').map(String::as_str), Some("even"));
        assert_eq!(dfa.next("odd", '2'), None);
        assert_eq!(dfa.next("nowhere", '0'), None);
    }

    #[test]
    fn test_missing_pair_fails_construction() {
        let result = Dfa::new(
            vec!["even".into(), "odd".into()],
            ['0', '1'].into_iter().collect(),
            "even".into(),
            vec!["even".into()],
            vec![
                rule("even", '0', "odd"),
                rule("even", '1', "even"),
                rule("odd", '0', "even"),
            ],
        );

        let error = result.unwrap_err();
        assert!(matches!(error, AutomatonError::ValidationError(_)));
        assert!(error.to_string().contains("(odd, '1')"));
    }

    #[test]
    fn test_duplicate_pair_fails_construction() {
        let result = Dfa::new(
            vec!["q".into()],
            ['a'].into_iter().collect(),
            "q".into(),
            vec![],
            vec![rule("q", 'a', "q"), rule("q", 'a', "q")],
        );

        let error = result.unwrap_err();
        assert!(error.to_string().contains("must be deterministic"));
    }

    #[test]
    fn test_serialize_skips_index() {
        let json = serde_json::to_value(even_zeros()).unwrap();
        assert_eq!(json["start"], "even");
        assert!(json.get("delta").is_none());
        assert_eq!(json["transitions"].as_array().unwrap().len(), 4);
    }
}
