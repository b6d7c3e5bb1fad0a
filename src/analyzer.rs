//! This module provides the construction-time checks for every automaton class. A model that
//! fails any check is never handed out: the constructors return the first error found.

use crate::dfa::Dfa;
use crate::machine::TuringMachine;
use crate::nfa::Nfa;
use crate::pda::Pda;
use crate::types::{AutomatonError, State, StateSet, EPSILON};
use std::collections::{BTreeSet, HashSet};

/// Represents the defects that can be found in an automaton model.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum AnalysisError {
    /// No states were declared.
    NoStates,
    /// Rules, the start state or the accepting set reference undeclared states.
    UndeclaredStates(Vec<String>),
    /// Rules use input or tape symbols missing from the alphabet.
    UndeclaredSymbols(Vec<char>),
    /// Rules use stack symbols missing from the stack alphabet.
    UndeclaredStackSymbols(Vec<char>),
    /// A reserved marker is used as an ordinary symbol.
    ReservedSymbol(char),
    /// A DFA contains an epsilon transition out of the given state.
    EpsilonTransition(String),
    /// More than one rule exists for the same (state, symbol) key.
    Nondeterministic(Vec<(String, char)>),
    /// A DFA is missing rules for these (state, symbol) pairs.
    Incomplete(Vec<(String, char)>),
}

impl From<AnalysisError> for AutomatonError {
    /// Converts an `AnalysisError` into an `AutomatonError::ValidationError`.
    fn from(error: AnalysisError) -> Self {
        let message = match error {
            AnalysisError::NoStates => "No states declared".to_string(),
            AnalysisError::UndeclaredStates(states) => {
                format!("States not declared in [States]: {:?}", states)
            }
            AnalysisError::UndeclaredSymbols(symbols) => {
                format!("Symbols not declared in [Symbols]: {:?}", symbols)
            }
            AnalysisError::UndeclaredStackSymbols(symbols) => {
                format!("Symbols not declared in [StackSymbols]: {:?}", symbols)
            }
            AnalysisError::ReservedSymbol(symbol) => {
                format!("Reserved symbol {:?} cannot be used here", symbol)
            }
            AnalysisError::EpsilonTransition(state) => {
                format!("A DFA cannot have epsilon transitions (from state {})", state)
            }
            AnalysisError::Nondeterministic(keys) => format!(
                "Transitions must be deterministic, duplicated: {}",
                format_keys(&keys)
            ),
            AnalysisError::Incomplete(keys) => {
                format!("Missing transitions: {}", format_keys(&keys))
            }
        };

        AutomatonError::ValidationError(message)
    }
}

/// Runs every check and converts the first failure.
fn first_error(checks: &[Result<(), AnalysisError>]) -> Result<(), AutomatonError> {
    match checks.iter().find_map(|check| check.clone().err()) {
        Some(error) => Err(error.into()),
        None => Ok(()),
    }
}

/// Validates a DFA: declared states and symbols, no epsilon, deterministic and total.
pub fn analyze_dfa(dfa: &Dfa) -> Result<(), AutomatonError> {
    let rules = dfa.transitions();
    let referenced = rules
        .iter()
        .flat_map(|t| [&t.from, &t.to])
        .chain([&dfa.start().to_string()])
        .chain(dfa.accepting())
        .cloned()
        .collect::<Vec<_>>();

    first_error(&[
        check_not_empty(dfa.states()),
        check_states(dfa.states(), referenced.iter()),
        check_symbols(dfa.alphabet(), rules.iter().filter_map(|t| t.symbol)),
        check_no_epsilon(rules.iter().filter(|t| t.symbol.is_none()).map(|t| &t.from)),
        check_deterministic(rules.iter().filter_map(|t| t.symbol.map(|c| (&t.from, c)))),
        check_total(dfa),
    ])
}

/// Validates an NFA: declared states and symbols.
pub fn analyze_nfa(nfa: &Nfa) -> Result<(), AutomatonError> {
    let rules = nfa.transitions();
    let referenced = rules
        .iter()
        .flat_map(|t| [&t.from, &t.to])
        .chain([&nfa.start().to_string()])
        .chain(nfa.accepting())
        .cloned()
        .collect::<Vec<_>>();

    first_error(&[
        check_not_empty(nfa.states()),
        check_states(nfa.states(), referenced.iter()),
        check_symbols(nfa.alphabet(), rules.iter().filter_map(|t| t.symbol)),
    ])
}

/// Validates a pushdown automaton: declared states, input symbols and stack symbols.
pub fn analyze_pda(pda: &Pda) -> Result<(), AutomatonError> {
    let rules = pda.transitions();
    let referenced = rules
        .iter()
        .flat_map(|t| [&t.from, &t.to])
        .chain([&pda.start().to_string()])
        .chain(pda.accepting())
        .cloned()
        .collect::<Vec<_>>();

    let stack_symbols = rules
        .iter()
        .flat_map(|t| t.pop.into_iter().chain(t.push.iter().copied()))
        .chain([pda.initial_stack()]);

    first_error(&[
        check_not_empty(pda.states()),
        check_states(pda.states(), referenced.iter()),
        check_symbols(pda.alphabet(), rules.iter().filter_map(|t| t.input)),
        check_stack_symbols(pda.stack_alphabet(), stack_symbols),
    ])
}

/// Validates a Turing Machine: declared states, tape symbols within the alphabet plus
/// blank, and at most one rule per (state, symbol).
pub fn analyze_turing(machine: &TuringMachine) -> Result<(), AutomatonError> {
    let rules = machine.transitions();
    let referenced = rules
        .iter()
        .flat_map(|t| [&t.state, &t.next_state])
        .cloned()
        .chain([machine.start().to_string()])
        .chain(machine.accept_state().map(str::to_string))
        .collect::<Vec<_>>();

    let mut tape_alphabet = machine.alphabet().clone();
    tape_alphabet.insert(machine.blank());

    first_error(&[
        check_not_empty(machine.states()),
        check_states(machine.states(), referenced.iter()),
        check_reserved_blank(machine.blank()),
        check_symbols(
            &tape_alphabet,
            rules.iter().flat_map(|t| [t.read, t.write]),
        ),
        check_deterministic(rules.iter().map(|t| (&t.state, t.read))),
    ])
}

fn check_not_empty(states: &StateSet) -> Result<(), AnalysisError> {
    if states.is_empty() {
        return Err(AnalysisError::NoStates);
    }
    Ok(())
}

/// Checks that every referenced state is declared.
fn check_states<'a>(
    declared: &StateSet,
    referenced: impl Iterator<Item = &'a State>,
) -> Result<(), AnalysisError> {
    let missing: BTreeSet<String> = referenced
        .filter(|state| !declared.contains(*state))
        .cloned()
        .collect();

    if !missing.is_empty() {
        return Err(AnalysisError::UndeclaredStates(missing.into_iter().collect()));
    }

    Ok(())
}

/// Checks that every used input (or tape) symbol is declared.
fn check_symbols(
    alphabet: &BTreeSet<char>,
    used: impl Iterator<Item = char>,
) -> Result<(), AnalysisError> {
    let missing = undeclared(alphabet, used);
    if !missing.is_empty() {
        return Err(AnalysisError::UndeclaredSymbols(missing));
    }
    Ok(())
}

/// Checks that every popped, pushed or initial stack symbol is declared.
fn check_stack_symbols(
    alphabet: &BTreeSet<char>,
    used: impl Iterator<Item = char>,
) -> Result<(), AnalysisError> {
    let missing = undeclared(alphabet, used);
    if !missing.is_empty() {
        return Err(AnalysisError::UndeclaredStackSymbols(missing));
    }
    Ok(())
}

fn undeclared(alphabet: &BTreeSet<char>, used: impl Iterator<Item = char>) -> Vec<char> {
    used.filter(|c| !alphabet.contains(c))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn check_reserved_blank(blank: char) -> Result<(), AnalysisError> {
    if blank == EPSILON {
        return Err(AnalysisError::ReservedSymbol(blank));
    }
    Ok(())
}

fn check_no_epsilon<'a>(
    mut sources: impl Iterator<Item = &'a State>,
) -> Result<(), AnalysisError> {
    match sources.next() {
        Some(state) => Err(AnalysisError::EpsilonTransition(state.clone())),
        None => Ok(()),
    }
}

/// Checks that no (state, symbol) key is used by more than one rule.
fn check_deterministic<'a>(
    keys: impl Iterator<Item = (&'a State, char)>,
) -> Result<(), AnalysisError> {
    let mut seen = HashSet::new();
    let mut duplicates = BTreeSet::new();

    for (state, symbol) in keys {
        if !seen.insert((state, symbol)) {
            duplicates.insert((state.clone(), symbol));
        }
    }

    if !duplicates.is_empty() {
        return Err(AnalysisError::Nondeterministic(
            duplicates.into_iter().collect(),
        ));
    }

    Ok(())
}

/// Checks that a DFA has a successor for every declared (state, symbol) pair.
fn check_total(dfa: &Dfa) -> Result<(), AnalysisError> {
    let missing: Vec<(String, char)> = dfa
        .states()
        .iter()
        .flat_map(|state| dfa.alphabet().iter().map(move |&c| (state, c)))
        .filter(|(state, c)| dfa.next(state, *c).is_none())
        .map(|(state, c)| (state.clone(), c))
        .collect();

    if !missing.is_empty() {
        return Err(AnalysisError::Incomplete(missing));
    }

    Ok(())
}

/// Formats (state, symbol) keys for error messages.
fn format_keys(keys: &[(String, char)]) -> String {
    keys.iter()
        .map(|(state, symbol)| format!("({state}, {symbol:?})"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{parse_dfa, parse_nfa, parse_pda, parse_turing};

    #[test]
    fn test_analysis_error_conversion() {
        let error: AutomatonError =
            AnalysisError::Incomplete(vec![("q0".to_string(), 'a')]).into();
        assert_eq!(
            error.to_string(),
            "Definition validation error: Missing transitions: (q0, 'a')"
        );
    }

    #[test]
    fn test_dfa_undeclared_symbol() {
        let input = "[States]\nq0\n[Symbols]\na\n[Rules]\nq0 a q0\nq0 b q0\n";
        let error = parse_dfa(input).unwrap_err();
        assert!(matches!(error, AutomatonError::ValidationError(_)));
        assert!(error.to_string().contains("['b']"));
    }

    #[test]
    fn test_dfa_undeclared_state() {
        let input = "[States]\nq0\n[Symbols]\na\n[Final]\nq9\n[Rules]\nq0 a q0\n";
        let error = parse_dfa(input).unwrap_err();
        assert!(error.to_string().contains("[\"q9\"]"));
    }

    #[test]
    fn test_dfa_rejects_epsilon() {
        let input = "[States]\nq0\n[Symbols]\na\n[Rules]\nq0 a q0\nq0 $ q0\n";
        let error = parse_dfa(input).unwrap_err();
        assert!(error.to_string().contains("cannot have epsilon transitions"));
    }

    #[test]
    fn test_dfa_nondeterministic() {
        let input = "[States]\nq0\nq1\n[Symbols]\na\n[Rules]\nq0 a q0\nq0 a q1\nq1 a q1\n";
        let error = parse_dfa(input).unwrap_err();
        assert_eq!(
            error.to_string(),
            "Definition validation error: Transitions must be deterministic, duplicated: (q0, 'a')"
        );
    }

    #[test]
    fn test_dfa_incomplete() {
        let input = "[States]\nq0\nq1\n[Symbols]\na\nb\n[Rules]\nq0 a q1\nq0 b q0\nq1 a q1\n";
        let error = parse_dfa(input).unwrap_err();
        assert_eq!(
            error.to_string(),
            "Definition validation error: Missing transitions: (q1, 'b')"
        );
    }

    #[test]
    fn test_nfa_allows_partial_and_multiple() {
        let input = "[States]\nq0\nq1\n[Symbols]\na\nb\n[Rules]\nq0 a q0\nq0 a q1\nq0 $ q1\n";
        assert!(parse_nfa(input).is_ok());
    }

    #[test]
    fn test_nfa_undeclared_start() {
        let input = "[States]\nq0\n[Start]\nstart\n";
        let error = parse_nfa(input).unwrap_err();
        assert!(error.to_string().contains("start"));
    }

    #[test]
    fn test_pda_undeclared_stack_symbol() {
        let input = r#"
[States]
q0
[Symbols]
a
[StackSymbols]
Z
[Start]
q0
[StackStart]
Z
[Rules]
q0 a Z q0 XZ
"#;
        let error = parse_pda(input).unwrap_err();
        assert!(error.to_string().contains("[StackSymbols]: ['X']"));
    }

    #[test]
    fn test_pda_initial_stack_must_be_declared() {
        let input = "[States]\nq0\n[StackSymbols]\nA\n[Start]\nq0\n[StackStart]\nZ\n";
        let error = parse_pda(input).unwrap_err();
        assert!(error.to_string().contains("['Z']"));
    }

    #[test]
    fn test_turing_duplicate_rule() {
        let input = "[States]\nq0\n[Symbols]\n1\n[Rules]\nq0 1 q0 1 R\nq0 1 q0 _ L\n";
        let error = parse_turing(input).unwrap_err();
        assert!(error.to_string().contains("must be deterministic"));
    }

    #[test]
    fn test_turing_blank_is_in_tape_alphabet() {
        let input = "[States]\nq0\n[Symbols]\n1\n[Rules]\nq0 _ q0 1 R\n";
        assert!(parse_turing(input).is_ok());

        let input = "[States]\nq0\n[Symbols]\n1\n[Rules]\nq0 2 q0 1 R\n";
        let error = parse_turing(input).unwrap_err();
        assert!(error.to_string().contains("['2']"));
    }

    #[test]
    fn test_no_states() {
        let input = "[Symbols]\na\n[Start]\nq0\n";
        let error = parse_nfa(input).unwrap_err();
        assert_eq!(
            error.to_string(),
            "Definition validation error: No states declared"
        );
    }
}
