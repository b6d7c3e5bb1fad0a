//! This module provides the parser for automaton definitions, utilizing the `pest` crate.
//! The grammar in `grammar.pest` only knows about section headers and data lines; this module
//! maps header names onto the [`Section`] tags each automaton class accepts, collects the data
//! lines into a typed [`Definition`], and finally builds the validated model.

use crate::{
    automaton::Automaton,
    dfa::Dfa,
    machine::TuringMachine,
    nfa::Nfa,
    pda::Pda,
    types::{
        AutomatonError, Direction, Kind, PdaTransition, State, TmTransition, Transition,
        DEFAULT_BLANK_SYMBOL, EPSILON, MAX_DEFINITION_SIZE,
    },
};
use pest::{
    error::{Error, ErrorVariant},
    iterators::Pair,
    Parser as PestParser, Span,
};
use pest_derive::Parser as PestParser;
use std::collections::BTreeSet;

/// Derives a `PestParser` for the definition grammar in `grammar.pest`.
#[derive(PestParser)]
#[grammar = "grammar.pest"]
pub struct DefinitionParser;

/// The section tags a definition may contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Section {
    States,
    Symbols,
    StackSymbols,
    Start,
    StackStart,
    Final,
    Blank,
    Rules,
}

impl Section {
    /// Resolves a header name for the given automaton class.
    ///
    /// Returns `None` for unknown names and for sections the class does not use.
    pub fn resolve(name: &str, kind: Kind) -> Option<Self> {
        let section = match name {
            "States" => Section::States,
            "Symbols" | "InputSymbols" | "Sigma" => Section::Symbols,
            "StackSymbols" => Section::StackSymbols,
            "Start" => Section::Start,
            "StackStart" => Section::StackStart,
            "Final" | "Accept" => Section::Final,
            "Blank" => Section::Blank,
            "Rules" => Section::Rules,
            _ => return None,
        };

        section.allowed_in(kind).then_some(section)
    }

    fn allowed_in(self, kind: Kind) -> bool {
        match self {
            Section::States
            | Section::Symbols
            | Section::Start
            | Section::Final
            | Section::Rules => true,
            Section::StackSymbols | Section::StackStart => kind == Kind::Pda,
            Section::Blank => kind == Kind::Turing,
        }
    }
}

/// One data line: its whitespace-separated fields and where it came from.
#[derive(Debug, Clone)]
pub struct Item<'i> {
    pub fields: Vec<&'i str>,
    pub span: Span<'i>,
}

/// The typed intermediate record produced from definition text.
///
/// Data lines are grouped per section in source order. A section header that
/// appears twice keeps collecting into the same group.
#[derive(Debug, Clone)]
pub struct Definition<'i> {
    pub kind: Kind,
    pub states: Vec<Item<'i>>,
    pub symbols: Vec<Item<'i>>,
    pub stack_symbols: Vec<Item<'i>>,
    pub start: Vec<Item<'i>>,
    pub stack_start: Vec<Item<'i>>,
    pub finals: Vec<Item<'i>>,
    pub blank: Vec<Item<'i>>,
    pub rules: Vec<Item<'i>>,
}

impl<'i> Definition<'i> {
    fn new(kind: Kind) -> Self {
        Self {
            kind,
            states: Vec::new(),
            symbols: Vec::new(),
            stack_symbols: Vec::new(),
            start: Vec::new(),
            stack_start: Vec::new(),
            finals: Vec::new(),
            blank: Vec::new(),
            rules: Vec::new(),
        }
    }

    fn section_mut(&mut self, section: Section) -> &mut Vec<Item<'i>> {
        match section {
            Section::States => &mut self.states,
            Section::Symbols => &mut self.symbols,
            Section::StackSymbols => &mut self.stack_symbols,
            Section::Start => &mut self.start,
            Section::StackStart => &mut self.stack_start,
            Section::Final => &mut self.finals,
            Section::Blank => &mut self.blank,
            Section::Rules => &mut self.rules,
        }
    }
}

/// Parses definition text into a [`Definition`] for the given class.
///
/// This only checks the shape of the text: known section headers, no data
/// before the first header, and the rule arity of the class.
pub fn parse_definition(kind: Kind, input: &str) -> Result<Definition<'_>, AutomatonError> {
    if input.len() > MAX_DEFINITION_SIZE {
        return Err(AutomatonError::ValidationError(format!(
            "Definition is {} bytes, the limit is {} bytes",
            input.len(),
            MAX_DEFINITION_SIZE
        )));
    }

    let root = DefinitionParser::parse(Rule::definition, input)
        .map_err(|e| AutomatonError::ParseError(e.into()))?
        .next()
        .ok_or_else(|| AutomatonError::ValidationError("Empty definition".to_string()))?;

    let mut definition = Definition::new(kind);
    let mut current: Option<Section> = None;

    for pair in root.into_inner() {
        match pair.as_rule() {
            Rule::header => current = Some(parse_header(pair, kind)?),
            Rule::item => {
                let span = pair.as_span();
                let section = current.ok_or_else(|| {
                    parse_error("Data line appears before any section header", span.clone())
                })?;
                let item = parse_item(pair);

                if section == Section::Rules && item.fields.len() != kind.rule_arity() {
                    return Err(parse_error(
                        &format!(
                            "{} rule needs {} fields, found {}",
                            kind,
                            kind.rule_arity(),
                            item.fields.len()
                        ),
                        span,
                    ));
                }

                definition.section_mut(section).push(item);
            }
            _ => {} // EOI
        }
    }

    Ok(definition)
}

/// Parses a [`Section`] tag from a `Pair<Rule::header>`.
fn parse_header(pair: Pair<Rule>, kind: Kind) -> Result<Section, AutomatonError> {
    let span = pair.as_span();
    let name = pair
        .into_inner()
        .next()
        .map(|p| p.as_str())
        .unwrap_or_default();

    Section::resolve(name, kind)
        .ok_or_else(|| parse_error(&format!("Unknown section [{name}] for a {kind}"), span))
}

/// Collects the fields of a `Pair<Rule::item>`.
fn parse_item(pair: Pair<Rule>) -> Item<'_> {
    let span = pair.as_span();
    let fields = pair
        .into_inner()
        .filter(|p| p.as_rule() == Rule::token)
        .map(|p| p.as_str())
        .collect();

    Item { fields, span }
}

/// Parses a DFA definition into a validated [`Dfa`].
pub fn parse_dfa(input: &str) -> Result<Dfa, AutomatonError> {
    let def = parse_definition(Kind::Dfa, input)?;
    let (states, alphabet, start, accepting) = parse_common(&def)?;
    let transitions = parse_finite_rules(&def)?;

    Dfa::new(states, alphabet, start, accepting, transitions)
}

/// Parses an NFA definition into a validated [`Nfa`].
pub fn parse_nfa(input: &str) -> Result<Nfa, AutomatonError> {
    let def = parse_definition(Kind::Nfa, input)?;
    let (states, alphabet, start, accepting) = parse_common(&def)?;
    let transitions = parse_finite_rules(&def)?;

    Nfa::new(states, alphabet, start, accepting, transitions)
}

/// Parses a pushdown automaton definition into a validated [`Pda`].
pub fn parse_pda(input: &str) -> Result<Pda, AutomatonError> {
    let def = parse_definition(Kind::Pda, input)?;
    let (states, alphabet, _, accepting) = parse_common(&def)?;

    // Unlike the finite automata, a pushdown automaton must name its start explicitly.
    let start = check_required_value(&def.start, "Start")?.to_string();
    let stack_alphabet = parse_symbols(&def.stack_symbols)?;
    let initial = parse_symbol_field(
        check_required_value(&def.stack_start, "StackStart")?,
        first_span(&def.stack_start),
    )?;

    let mut transitions = Vec::with_capacity(def.rules.len());
    for item in &def.rules {
        let f = &item.fields;
        transitions.push(PdaTransition {
            from: f[0].to_string(),
            input: parse_label(f[1], item.span.clone())?,
            pop: parse_label(f[2], item.span.clone())?,
            to: f[3].to_string(),
            push: parse_push(f[4]),
        });
    }

    Pda::new(
        states,
        alphabet,
        stack_alphabet,
        start,
        initial,
        accepting,
        transitions,
    )
}

/// Parses a Turing Machine definition into a validated [`TuringMachine`].
pub fn parse_turing(input: &str) -> Result<TuringMachine, AutomatonError> {
    let def = parse_definition(Kind::Turing, input)?;
    let (states, alphabet, start, accepting) = parse_common(&def)?;

    if accepting.len() > 1 {
        return Err(AutomatonError::ValidationError(format!(
            "A Turing machine has at most one accepting state, found {}",
            accepting.len()
        )));
    }
    let accept = accepting.into_iter().next();

    let blank = match check_optional_value(&def.blank, "Blank")? {
        Some(field) => parse_symbol_field(field, first_span(&def.blank))?,
        None => DEFAULT_BLANK_SYMBOL,
    };

    let mut transitions = Vec::with_capacity(def.rules.len());
    for item in &def.rules {
        let f = &item.fields;
        transitions.push(TmTransition {
            state: f[0].to_string(),
            read: parse_symbol_field(f[1], item.span.clone())?,
            next_state: f[2].to_string(),
            write: parse_symbol_field(f[3], item.span.clone())?,
            direction: parse_direction(f[4], item.span.clone())?,
        });
    }

    TuringMachine::new(states, alphabet, start, accept, blank, transitions)
}

/// Parses a definition of any class into an [`Automaton`].
pub fn parse(kind: Kind, input: &str) -> Result<Automaton, AutomatonError> {
    Ok(match kind {
        Kind::Dfa => Automaton::Dfa(parse_dfa(input)?),
        Kind::Nfa => Automaton::Nfa(parse_nfa(input)?),
        Kind::Pda => Automaton::Pda(parse_pda(input)?),
        Kind::Turing => Automaton::Turing(parse_turing(input)?),
    })
}

type Common = (Vec<State>, BTreeSet<char>, State, Vec<State>);

/// Extracts the sections every class shares: states, input alphabet, start and accepting states.
///
/// Without a `[Start]` section the first declared state is the start state.
fn parse_common(def: &Definition) -> Result<Common, AutomatonError> {
    let states: Vec<State> = flatten(&def.states)
        .into_iter()
        .map(str::to_string)
        .collect();
    let alphabet = parse_symbols(&def.symbols)?;

    let start = match check_optional_value(&def.start, "Start")? {
        Some(start) => start.to_string(),
        None => states.first().cloned().ok_or_else(|| {
            AutomatonError::ValidationError("Missing 'States' section".to_string())
        })?,
    };

    let accepting = flatten(&def.finals)
        .into_iter()
        .map(str::to_string)
        .collect();

    Ok((states, alphabet, start, accepting))
}

/// Parses `src sym dst` lines. The epsilon marker becomes `None`.
fn parse_finite_rules(def: &Definition) -> Result<Vec<Transition>, AutomatonError> {
    def.rules
        .iter()
        .map(|item| {
            Ok(Transition {
                from: item.fields[0].to_string(),
                symbol: parse_label(item.fields[1], item.span.clone())?,
                to: item.fields[2].to_string(),
            })
        })
        .collect()
}

/// Parses an alphabet section. Every field must be a single, non-reserved character.
fn parse_symbols(items: &[Item]) -> Result<BTreeSet<char>, AutomatonError> {
    let mut symbols = BTreeSet::new();

    for item in items {
        for field in &item.fields {
            let symbol = parse_symbol_field(field, item.span.clone())?;
            if symbol == EPSILON {
                return Err(parse_error(
                    &format!("'{EPSILON}' is reserved for epsilon and cannot be declared"),
                    item.span.clone(),
                ));
            }
            symbols.insert(symbol);
        }
    }

    Ok(symbols)
}

/// Parses a field that must hold exactly one character.
fn parse_symbol_field(field: &str, span: Span) -> Result<char, AutomatonError> {
    let mut chars = field.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(parse_error(
            &format!("Symbol '{field}' must be a single character"),
            span,
        )),
    }
}

/// Parses an input or stack label, mapping the epsilon marker to `None`.
fn parse_label(field: &str, span: Span) -> Result<Option<char>, AutomatonError> {
    let symbol = parse_symbol_field(field, span)?;
    Ok((symbol != EPSILON).then_some(symbol))
}

/// Parses a push string. A lone epsilon marker pushes nothing.
fn parse_push(field: &str) -> Vec<char> {
    if field.chars().all(|c| c == EPSILON) {
        return Vec::new();
    }
    field.chars().collect()
}

/// Parses a head direction.
///
/// Supports 'L' or '<' for Left, 'R' or '>' for Right, and 'S', 'N' or '-' for Stay.
fn parse_direction(field: &str, span: Span) -> Result<Direction, AutomatonError> {
    match field {
        "L" | "<" => Ok(Direction::Left),
        "R" | ">" => Ok(Direction::Right),
        "S" | "N" | "-" => Ok(Direction::Stay),
        _ => Err(parse_error(&format!("Unsupported direction: {field}"), span)),
    }
}

/// Collects every field of every line in a section.
fn flatten<'i>(items: &[Item<'i>]) -> Vec<&'i str> {
    items
        .iter()
        .flat_map(|item| item.fields.iter().copied())
        .collect()
}

fn first_span<'i>(items: &[Item<'i>]) -> Span<'i> {
    items[0].span.clone()
}

/// Returns the single value of a section, or `None` if the section is absent.
fn check_optional_value<'i>(
    items: &[Item<'i>],
    name: &str,
) -> Result<Option<&'i str>, AutomatonError> {
    let values = flatten(items);
    let first = values.first().copied();

    if values.len() > 1 {
        return Err(parse_error(
            &format!("Section '{name}' takes a single value"),
            items[0].span.clone(),
        ));
    }

    Ok(first)
}

/// Returns the single value of a section that must be present.
fn check_required_value<'i>(items: &[Item<'i>], name: &str) -> Result<&'i str, AutomatonError> {
    check_optional_value(items, name)?.ok_or_else(|| {
        AutomatonError::ValidationError(format!("Missing '{name}' section"))
    })
}

/// Creates an `AutomatonError::ParseError` from a message and a `Span`.
fn parse_error(msg: &str, span: Span) -> AutomatonError {
    AutomatonError::ParseError(Box::new(Error::new_from_span(
        ErrorVariant::CustomError {
            message: msg.to_string(),
        },
        span,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;

    const EVEN_ZEROS: &str = r#"
# even number of zeros
[States]
even
odd
[Symbols]
0
1
[Start]
even
[Final]
even
[Rules]
even 0 odd   # flip
even 1 even
odd 0 even
odd 1 odd
"#;

    #[test]
    fn test_parse_definition_sections() {
        let def = parse_definition(Kind::Dfa, EVEN_ZEROS).unwrap();

        assert_eq!(def.states.len(), 2);
        assert_eq!(def.symbols.len(), 2);
        assert_eq!(def.start[0].fields, vec!["even"]);
        assert_eq!(def.rules.len(), 4);
        assert_eq!(def.rules[0].fields, vec!["even", "0", "odd"]);
    }

    #[test]
    fn test_parse_without_trailing_newline() {
        let def = parse_definition(Kind::Nfa, "[States]\nq0\n[Rules]\nq0 a q0").unwrap();
        assert_eq!(def.rules.len(), 1);
    }

    #[test]
    fn test_parse_crlf_and_indentation() {
        let input = "[States]\r\n  q0\r\n\r\n[Symbols]\r\n\ta\r\n";
        let def = parse_definition(Kind::Dfa, input).unwrap();
        assert_eq!(def.states[0].fields, vec!["q0"]);
        assert_eq!(def.symbols[0].fields, vec!["a"]);
    }

    #[test]
    fn test_parse_dfa() {
        let dfa = parse_dfa(EVEN_ZEROS).unwrap();
        assert_eq!(dfa.start(), "even");
        assert!(dfa.accepting().contains("even"));
        assert_eq!(dfa.alphabet().len(), 2);
    }

    #[test]
    fn test_default_start_is_first_state() {
        let input = EVEN_ZEROS.replace("[Start]\neven\n", "");
        let dfa = parse_dfa(&input).unwrap();
        assert_eq!(dfa.start(), "even");
    }

    #[test]
    fn test_unknown_section() {
        let input = "[States]\nq0\n[Colors]\nred\n";
        let error = parse_dfa(input).unwrap_err();
        assert!(matches!(error, AutomatonError::ParseError(_)));
        assert!(error.to_string().contains("Unknown section [Colors]"));
    }

    #[test]
    fn test_section_not_allowed_for_class() {
        let input = "[States]\nq0\n[StackSymbols]\nZ\n";
        let error = parse_nfa(input).unwrap_err();
        assert!(error.to_string().contains("Unknown section [StackSymbols]"));
    }

    #[test]
    fn test_data_before_header() {
        let error = parse_dfa("q0\n[States]\nq0\n").unwrap_err();
        assert!(matches!(error, AutomatonError::ParseError(_)));
        assert!(error.to_string().contains("before any section header"));
    }

    #[test]
    fn test_wrong_rule_arity() {
        let input = "[States]\nq0\n[Symbols]\na\n[Rules]\nq0 a\n";
        let error = parse_dfa(input).unwrap_err();
        assert!(matches!(error, AutomatonError::ParseError(_)));
        assert!(error.to_string().contains("needs 3 fields, found 2"));

        let input = "[States]\nq0\n[Start]\nq0\n[StackStart]\nZ\n[Rules]\nq0 a Z q0\n";
        let error = parse_pda(input).unwrap_err();
        assert!(error.to_string().contains("needs 5 fields, found 4"));
    }

    #[test]
    fn test_malformed_header() {
        let error = parse_dfa("[States\nq0\n").unwrap_err();
        assert!(matches!(error, AutomatonError::ParseError(_)));
    }

    #[test]
    fn test_multi_char_symbol() {
        let error = parse_dfa("[States]\nq0\n[Symbols]\nab\n").unwrap_err();
        assert!(error.to_string().contains("must be a single character"));
    }

    #[test]
    fn test_epsilon_cannot_be_declared() {
        let error = parse_nfa("[States]\nq0\n[Symbols]\n$\n").unwrap_err();
        assert!(error.to_string().contains("reserved for epsilon"));
    }

    #[test]
    fn test_duplicate_start_value() {
        let input = "[States]\nq0\nq1\n[Start]\nq0\nq1\n";
        let error = parse_nfa(input).unwrap_err();
        assert!(error.to_string().contains("takes a single value"));
    }

    #[test]
    fn test_pda_requires_stack_start() {
        let input = "[States]\nq0\n[Start]\nq0\n[Rules]\nq0 $ $ q0 $\n";
        let error = parse_pda(input).unwrap_err();
        assert_eq!(
            error.to_string(),
            "Definition validation error: Missing 'StackStart' section"
        );
    }

    #[test]
    fn test_parse_pda_push_strings() {
        let input = r#"
[States]
q0
q1
[InputSymbols]
a
[StackSymbols]
Z
A
[Start]
q0
[StackStart]
Z
[Final]
q1
[Rules]
q0 a Z q0 AZ
q0 $ $ q1 $
"#;
        let pda = parse_pda(input).unwrap();
        let rules = pda.transitions();
        assert_eq!(rules[0].input, Some('a'));
        assert_eq!(rules[0].pop, Some('Z'));
        assert_eq!(rules[0].push, vec!['A', 'Z']);
        assert_eq!(rules[1].input, None);
        assert_eq!(rules[1].pop, None);
        assert!(rules[1].push.is_empty());
    }

    #[test]
    fn test_parse_turing_directions_and_blank() {
        let input = r#"
[States]
q0
q1
[Symbols]
1
[Blank]
B
[Final]
q1
[Rules]
q0 1 q0 1 R
q0 B q1 B N
"#;
        let tm = parse_turing(input).unwrap();
        assert_eq!(tm.blank(), 'B');
        assert_eq!(tm.accept_state(), Some("q1"));
        assert_eq!(tm.transitions()[1].direction, Direction::Stay);
    }

    #[test]
    fn test_unsupported_direction() {
        let input = "[States]\nq0\n[Symbols]\n1\n[Rules]\nq0 1 q0 1 X\n";
        let error = parse_turing(input).unwrap_err();
        assert!(matches!(error, AutomatonError::ParseError(_)));
        assert!(error.to_string().contains("Unsupported direction: X"));
    }

    #[test]
    fn test_turing_single_accept_state() {
        let input = "[States]\nq0\nq1\n[Final]\nq0\nq1\n";
        let error = parse_turing(input).unwrap_err();
        assert!(error.to_string().contains("at most one accepting state"));
    }

    #[test]
    fn test_error_carries_location() {
        let input = "[States]\nq0\n[Symbols]\na\n[Rules]\nq0 a q0 extra\n";
        let error = parse_dfa(input).unwrap_err();
        // pest renders the offending line and column
        assert!(error.to_string().contains("6:1"));
    }
}
