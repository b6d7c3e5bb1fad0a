//! This module provides the `Loader` struct, responsible for loading automaton definitions
//! from files and strings. Every entry point takes its source explicitly; nothing is resolved
//! against an implicit base directory.

use crate::automaton::Automaton;
use crate::parser::parse;
use crate::types::{AutomatonError, Kind};
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};

/// `Loader` is a utility struct for loading automata.
/// It provides methods to load a definition from a file, from string content,
/// and to discover and load every definition within a directory.
pub struct Loader;

impl Loader {
    /// Loads an automaton from `path`, picking its class from the file extension.
    ///
    /// # Returns
    ///
    /// * `Ok(Automaton)` if the file is read, parsed and validated.
    /// * `Err(AutomatonError::FileError)` if the file cannot be read or its extension is unknown.
    /// * `Err(AutomatonError::ParseError)` / `Err(AutomatonError::ValidationError)` for a bad definition.
    pub fn load(path: &Path) -> Result<Automaton, AutomatonError> {
        let kind = Self::kind_of(path)?;
        Self::load_as(kind, path)
    }

    /// Loads an automaton of the given class from `path`, whatever its extension.
    pub fn load_as(kind: Kind, path: &Path) -> Result<Automaton, AutomatonError> {
        let content = fs::read_to_string(path).map_err(|e| {
            AutomatonError::FileError(format!("Failed to read file {}: {}", path.display(), e))
        })?;

        debug!("loading {} from {}", kind, path.display());
        parse(kind, &content)
    }

    /// Loads an automaton of the given class from string content.
    ///
    /// This is useful for definitions that are not stored in files, e.g. piped input.
    pub fn load_from_string(kind: Kind, content: &str) -> Result<Automaton, AutomatonError> {
        parse(kind, content)
    }

    /// Loads every definition with a known extension from `directory`.
    ///
    /// Directories and files with other extensions are skipped. Each element of the
    /// result is either the loaded automaton with its path, or the error for one file,
    /// naming that file. Results are ordered by path.
    pub fn load_dir(directory: &Path) -> Vec<Result<(PathBuf, Automaton), AutomatonError>> {
        let entries = match fs::read_dir(directory) {
            Ok(entries) => entries,
            Err(e) => {
                return vec![Err(AutomatonError::FileError(format!(
                    "Failed to read directory {}: {}",
                    directory.display(),
                    e
                )))]
            }
        };

        let mut results = Vec::new();
        let mut paths = Vec::new();
        for entry in entries {
            match entry {
                Ok(entry) => paths.push(entry.path()),
                Err(e) => results.push(Err(AutomatonError::FileError(format!(
                    "Failed to read directory entry: {}",
                    e
                )))),
            }
        }

        paths.retain(|path| !path.is_dir() && Self::kind_of(path).is_ok());
        // read_dir order is platform dependent
        paths.sort();

        results.extend(paths.into_iter().map(|path| match Self::load(&path) {
            Ok(automaton) => Ok((path, automaton)),
            Err(e) => Err(AutomatonError::FileError(format!(
                "Failed to load automaton from {}: {}",
                path.display(),
                e
            ))),
        }));

        results
    }

    /// Determines the automaton class from the extension of `path`.
    pub fn kind_of(path: &Path) -> Result<Kind, AutomatonError> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Kind::from_extension)
            .ok_or_else(|| {
                AutomatonError::FileError(format!(
                    "Cannot tell the automaton class of {} (expected .dfa, .nfa, .pda or .tm)",
                    path.display()
                ))
            })
    }
}
