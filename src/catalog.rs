//! Built-in sample automata, embedded at compile time and parsed once on first use.

use crate::automaton::Automaton;
use crate::parser::parse;
use crate::types::{AutomatonError, Kind};
use log::warn;

// Embedded sample definitions: (name, class, text)
const SAMPLE_TEXTS: [(&str, Kind, &str); 6] = [
    (
        "even-zeros",
        Kind::Dfa,
        include_str!("../machines/even-zeros.dfa"),
    ),
    (
        "ends-with-ab",
        Kind::Nfa,
        include_str!("../machines/ends-with-ab.nfa"),
    ),
    (
        "optional-a",
        Kind::Nfa,
        include_str!("../machines/optional-a.nfa"),
    ),
    ("anbn", Kind::Pda, include_str!("../machines/anbn.pda")),
    (
        "even-palindrome",
        Kind::Pda,
        include_str!("../machines/even-palindrome.pda"),
    ),
    (
        "unary-addition",
        Kind::Turing,
        include_str!("../machines/unary-addition.tm"),
    ),
];

/// A parsed built-in sample.
#[derive(Debug, Clone)]
pub struct Sample {
    pub name: &'static str,
    pub text: &'static str,
    pub automaton: Automaton,
}

lazy_static::lazy_static! {
    static ref SAMPLES: Vec<Sample> = SAMPLE_TEXTS
        .iter()
        .filter_map(|&(name, kind, text)| match parse(kind, text) {
            Ok(automaton) => Some(Sample { name, text, automaton }),
            Err(e) => {
                warn!("failed to parse sample {name}: {e}");
                None
            }
        })
        .collect();
}

pub struct Catalog;

impl Catalog {
    /// All samples that parsed successfully, in declaration order.
    pub fn samples() -> &'static [Sample] {
        &SAMPLES
    }

    /// List all sample names
    pub fn names() -> Vec<&'static str> {
        SAMPLES.iter().map(|sample| sample.name).collect()
    }

    /// Get a sample by its name
    pub fn get(name: &str) -> Result<&'static Sample, AutomatonError> {
        SAMPLES
            .iter()
            .find(|sample| sample.name == name)
            .ok_or_else(|| {
                AutomatonError::ValidationError(format!("Sample '{}' not found", name))
            })
    }

    /// Get the automaton of a sample by its name
    pub fn automaton(name: &str) -> Result<Automaton, AutomatonError> {
        Self::get(name).map(|sample| sample.automaton.clone())
    }
}
