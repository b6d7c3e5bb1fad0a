//! Nondeterministic finite automaton with epsilon transitions, simulated on the fly by
//! tracking the set of live states instead of building a DFA.

use crate::analyzer::analyze_nfa;
use crate::types::{AutomatonError, State, StateSet, Transition};
use log::trace;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};

/// A validated epsilon-NFA.
#[derive(Debug, Clone, Serialize)]
pub struct Nfa {
    states: StateSet,
    alphabet: BTreeSet<char>,
    start: State,
    accepting: StateSet,
    transitions: Vec<Transition>,
    /// source -> symbol -> destinations, with `None` standing for epsilon
    #[serde(skip)]
    delta: HashMap<State, HashMap<Option<char>, StateSet>>,
}

impl Nfa {
    /// Builds an NFA and validates that every referenced state and symbol is declared.
    pub fn new(
        states: Vec<State>,
        alphabet: BTreeSet<char>,
        start: State,
        accepting: Vec<State>,
        transitions: Vec<Transition>,
    ) -> Result<Self, AutomatonError> {
        let mut delta: HashMap<State, HashMap<Option<char>, StateSet>> = HashMap::new();
        for t in &transitions {
            delta
                .entry(t.from.clone())
                .or_default()
                .entry(t.symbol)
                .or_default()
                .insert(t.to.clone());
        }

        let nfa = Self {
            states: states.into_iter().collect(),
            alphabet,
            start,
            accepting: accepting.into_iter().collect(),
            transitions,
            delta,
        };

        analyze_nfa(&nfa)?;

        Ok(nfa)
    }

    /// Computes the epsilon closure of `states`: the smallest superset closed under
    /// epsilon transitions.
    pub fn epsilon_closure(&self, states: &StateSet) -> StateSet {
        let mut closure = states.clone();
        let mut stack: Vec<&State> = states.iter().collect();

        while let Some(state) = stack.pop() {
            let Some(targets) = self.targets(state, None) else {
                continue;
            };
            for next in targets {
                if closure.insert(next.clone()) {
                    stack.push(next);
                }
            }
        }

        closure
    }

    /// Returns the states reachable from `states` by exactly one transition on `symbol`.
    ///
    /// Epsilon transitions are not followed.
    pub fn step(&self, states: &StateSet, symbol: char) -> StateSet {
        states
            .iter()
            .filter_map(|state| self.targets(state, Some(symbol)))
            .flatten()
            .cloned()
            .collect()
    }

    /// The live state set before any input is read.
    pub fn initial(&self) -> StateSet {
        self.epsilon_closure(&StateSet::from([self.start.clone()]))
    }

    /// Returns `true` if some run over `word` ends in an accepting state.
    ///
    /// The word is rejected as soon as the live state set becomes empty.
    pub fn accepts(&self, word: &str) -> bool {
        let mut current = self.initial();

        for c in word.chars() {
            current = self.epsilon_closure(&self.step(&current, c));
            trace!("nfa: after {c:?} live states are {current:?}");

            if current.is_empty() {
                return false;
            }
        }

        self.is_accepting(&current)
    }

    /// Returns the live state set after each prefix of `word`, beginning with the
    /// initial closure. Stops after the first empty set.
    pub fn trace(&self, word: &str) -> Vec<StateSet> {
        let mut current = self.initial();
        let mut sets = vec![current.clone()];

        for c in word.chars() {
            if current.is_empty() {
                break;
            }
            current = self.epsilon_closure(&self.step(&current, c));
            sets.push(current.clone());
        }

        sets
    }

    /// Returns `true` if `states` contains an accepting state.
    pub fn is_accepting(&self, states: &StateSet) -> bool {
        !self.accepting.is_disjoint(states)
    }

    fn targets(&self, state: &str, symbol: Option<char>) -> Option<&StateSet> {
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

    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(from: &str, symbol: Option<char>, to: &str) -> Transition {
        Transition {
            from: from.to_string(),
            symbol,
            to: to.to_string(),
        }
    }

    fn set(states: &[&str]) -> StateSet {
        states.iter().map(|s| s.to_string()).collect()
    }

    /// Accepts words over {a, b} ending in "ab", with an epsilon chain q3 -> q4 -> q0.
    fn ends_with_ab() -> Nfa {
        Nfa::new(
            vec!["q0".into(), "q1".into(), "q2".into(), "q3".into(), "q4".into()],
            ['a', 'b'].into_iter().collect(),
            "q3".into(),
            vec!["q2".into()],
            vec![
                rule("q3", None, "q4"),
                rule("q4", None, "q0"),
                rule("q0", Some('a'), "q0"),
                rule("q0", Some('b'), "q0"),
                rule("q0", Some('a'), "q1"),
                rule("q1", Some('b'), "q2"),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_accepts() {
        let nfa = ends_with_ab();

        assert!(nfa.accepts("ab"));
        assert!(nfa.accepts("babab"));
        assert!(!nfa.accepts("ba"));
        assert!(!nfa.accepts(""));
    }

    #[test]
    fn test_epsilon_start_accepts_empty_word() {
        let nfa = Nfa::new(
            vec!["s".into(), "f".into()],
            ['a'].into_iter().collect(),
            "s".into(),
            vec!["f".into()],
            vec![rule("s", None, "f")],
        )
        .unwrap();

        assert!(nfa.accepts(""));
        assert!(!nfa.accepts("a"));
    }

    #[test]
    fn test_epsilon_closure() {
        let nfa = ends_with_ab();

        assert_eq!(nfa.epsilon_closure(&set(&["q3"])), set(&["q0", "q3", "q4"]));
        assert_eq!(nfa.epsilon_closure(&set(&["q1"])), set(&["q1"]));
        assert_eq!(nfa.epsilon_closure(&StateSet::new()), StateSet::new());
    }

    #[test]
    fn test_epsilon_closure_idempotent() {
        let nfa = ends_with_ab();

        for start in [set(&["q3"]), set(&["q4", "q1"]), set(&["q2"]), set(&[])] {
            let once = nfa.epsilon_closure(&start);
            assert_eq!(nfa.epsilon_closure(&once), once);
        }
    }

    #[test]
    fn test_epsilon_closure_monotone() {
        let nfa = ends_with_ab();
        let small = set(&["q4"]);
        let large = set(&["q4", "q1"]);

        let closed_small = nfa.epsilon_closure(&small);
        let closed_large = nfa.epsilon_closure(&large);
        assert!(closed_small.is_subset(&closed_large));
    }

    #[test]
    fn test_epsilon_cycle_terminates() {
        let nfa = Nfa::new(
            vec!["a".into(), "b".into()],
            BTreeSet::new(),
            "a".into(),
            vec!["b".into()],
            vec![rule("a", None, "b"), rule("b", None, "a")],
        )
        .unwrap();

        assert_eq!(nfa.initial(), set(&["a", "b"]));
        assert!(nfa.accepts(""));
    }

    #[test]
    fn test_step_ignores_epsilon() {
        let nfa = ends_with_ab();
        assert_eq!(nfa.step(&set(&["q3"]), 'a'), StateSet::new());
        assert_eq!(nfa.step(&set(&["q0"]), 'a'), set(&["q0", "q1"]));
        assert_eq!(nfa.step(&set(&["q0", "q1"]), 'b'), set(&["q0", "q2"]));
    }

    #[test]
    fn test_unknown_states_have_no_successors() {
        let nfa = ends_with_ab();

        assert_eq!(nfa.step(&set(&["nowhere"]), 'a'), StateSet::new());
        assert_eq!(nfa.epsilon_closure(&set(&["nowhere"])), set(&["nowhere"]));
    }

    #[test]
    fn test_prefix_rejection() {
        // only "a" then anything dies
        let nfa = Nfa::new(
            vec!["q0".into(), "q1".into()],
            ['a', 'b'].into_iter().collect(),
            "q0".into(),
            vec!["q1".into()],
            vec![rule("q0", Some('a'), "q1")],
        )
        .unwrap();

        let sets = nfa.trace("ab");
        assert!(sets.last().unwrap().is_empty());

        for suffix in ["", "a", "b", "ab", "ba"] {
            assert!(!nfa.accepts(&format!("ab{suffix}")));
        }
    }

    #[test]
    fn test_trace() {
        let nfa = ends_with_ab();
        let sets = nfa.trace("ab");

        assert_eq!(sets.len(), 3);
        assert_eq!(sets[1], set(&["q0", "q1"]));
        assert!(nfa.is_accepting(&sets[2]));
    }
}
