//! Mask and unmask substitution
//!
//! A [`SubstitutionMap`] pairs every distinct original substring with its
//! synthetic replacement, in insertion order. Masking rewrites originals to
//! replacements; unmasking rewrites replacements in any derived text back to
//! originals.

use crate::error::{Error, Result};
use crate::matcher::Category;
use aho_corasick::{AhoCorasick, MatchKind};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// How substitutions are applied to a text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubstitutionStrategy {
    /// One pass over the text replacing every key at once. Overlapping keys
    /// resolve leftmost first, then longest, and replaced text is never
    /// scanned again.
    #[default]
    Simultaneous,

    /// Literal find-and-replace of each pair in map order, each pass running
    /// over the output of the previous one.
    Sequential,
}

/// Replacement recorded for one original substring
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Substitution {
    pub replacement: String,

    /// Category whose generator produced the replacement
    pub category: Category,
}

/// Insertion-ordered mapping from original substring to replacement
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubstitutionMap {
    entries: IndexMap<String, Substitution>,
}

impl SubstitutionMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, original: &str) -> bool {
        self.entries.contains_key(original)
    }

    pub fn get(&self, original: &str) -> Option<&Substitution> {
        self.entries.get(original)
    }

    pub fn replacement_for(&self, original: &str) -> Option<&str> {
        self.entries.get(original).map(|s| s.replacement.as_str())
    }

    pub fn original_for(&self, replacement: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(_, s)| s.replacement == replacement)
            .map(|(original, _)| original.as_str())
    }

    /// Insert a pair unless `original` is already keyed
    ///
    /// The first category to claim a substring keeps it. Returns `false` when
    /// the existing entry was left in place.
    pub fn insert_first(
        &mut self,
        original: impl Into<String>,
        replacement: impl Into<String>,
        category: Category,
    ) -> bool {
        let original = original.into();
        if self.entries.contains_key(&original) {
            return false;
        }
        self.entries.insert(
            original,
            Substitution {
                replacement: replacement.into(),
                category,
            },
        );
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Substitution)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn originals(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn replacements(&self) -> impl Iterator<Item = &str> {
        self.entries.values().map(|s| s.replacement.as_str())
    }

    /// Replace every original in `text` with its replacement
    pub fn mask(&self, text: &str, strategy: SubstitutionStrategy) -> Result<String> {
        let pairs = self
            .entries
            .iter()
            .map(|(original, s)| (original.as_str(), s.replacement.as_str()));
        apply(text, pairs, strategy)
    }

    /// Replace every replacement in `text` with its original
    pub fn unmask(&self, text: &str, strategy: SubstitutionStrategy) -> Result<String> {
        let pairs = self
            .entries
            .iter()
            .map(|(original, s)| (s.replacement.as_str(), original.as_str()));
        apply(text, pairs, strategy)
    }
}

fn apply<'a>(
    text: &str,
    pairs: impl Iterator<Item = (&'a str, &'a str)>,
    strategy: SubstitutionStrategy,
) -> Result<String> {
    // An empty needle would match between every character
    let pairs: Vec<(&str, &str)> = pairs.filter(|(from, _)| !from.is_empty()).collect();
    if pairs.is_empty() {
        return Ok(text.to_string());
    }

    match strategy {
        SubstitutionStrategy::Simultaneous => {
            let (needles, replacements): (Vec<&str>, Vec<&str>) = pairs.into_iter().unzip();
            let automaton = AhoCorasick::builder()
                .match_kind(MatchKind::LeftmostLongest)
                .build(&needles)?;
            automaton
                .try_replace_all(text, &replacements)
                .map_err(|e| Error::Substitution(e.to_string()))
        }
        SubstitutionStrategy::Sequential => Ok(pairs
            .into_iter()
            .fold(text.to_string(), |acc, (from, to)| acc.replace(from, to))),
    }
}
