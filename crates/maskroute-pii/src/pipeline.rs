//! Detection pipeline
//!
//! Runs every registered matcher over a text, filters the candidates of each
//! category and builds the two per-text maps: matches by category and the
//! substitution map. Both are created fresh on every run and returned by
//! value, so concurrent runs never share state.

use crate::error::{Error, Result};
use crate::matcher::{Category, Match, PatternMatcher};
use crate::substitution::SubstitutionMap;
use crate::synthetic::{GenerateFn, SyntheticGenerator};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// Filtered matches per category, in discovery order
///
/// Lists keep every occurrence, duplicates included.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MatchesByCategory {
    entries: IndexMap<Category, Vec<Match>>,
}

impl MatchesByCategory {
    /// Record the list for `category`, replacing any previous one
    pub fn insert(&mut self, category: Category, matches: Vec<Match>) {
        self.entries.insert(category, matches);
    }

    pub fn get(&self, category: Category) -> Option<&[Match]> {
        self.entries.get(&category).map(Vec::as_slice)
    }

    /// Matched substrings for `category`; empty when it was not scanned
    pub fn texts(&self, category: Category) -> Vec<&str> {
        self.get(category)
            .map(|matches| matches.iter().map(|m| m.text.as_str()).collect())
            .unwrap_or_default()
    }

    /// Categories that were scanned, in scan order
    pub fn categories(&self) -> impl Iterator<Item = Category> + '_ {
        self.entries.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, &[Match])> {
        self.entries.iter().map(|(c, m)| (*c, m.as_slice()))
    }

    /// Total number of matches across categories
    pub fn total(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }
}

/// Output of one pipeline run
#[derive(Debug, Clone, Default)]
pub struct Detection {
    pub matches: MatchesByCategory,
    pub substitutions: SubstitutionMap,
}

/// Orchestrates the registered matchers
pub struct DetectionPipeline {
    matchers: Vec<PatternMatcher>,
    max_generation_attempts: usize,
}

impl DetectionPipeline {
    pub fn new(matchers: Vec<PatternMatcher>) -> Self {
        Self {
            matchers,
            max_generation_attempts: 32,
        }
    }

    pub fn with_max_generation_attempts(mut self, attempts: usize) -> Self {
        self.max_generation_attempts = attempts.max(1);
        self
    }

    pub fn matchers(&self) -> &[PatternMatcher] {
        &self.matchers
    }

    /// Categories in registration order
    pub fn categories(&self) -> Vec<Category> {
        self.matchers.iter().flat_map(|m| m.categories()).collect()
    }

    /// Detect PII in `text` and generate a replacement for every distinct match
    ///
    /// A substring matched under several categories keeps the replacement of
    /// the first category, in registration order, that matched it.
    pub fn run(&self, text: &str, generator: &mut dyn SyntheticGenerator) -> Result<Detection> {
        let (matches, generators) = self.scan(text)?;
        let substitutions = self.build_substitutions(text, &matches, &generators, generator)?;

        debug!(
            matches = matches.total(),
            substitutions = substitutions.len(),
            "Detection complete"
        );

        Ok(Detection {
            matches,
            substitutions,
        })
    }

    /// Detect PII in `text` without generating replacements
    pub fn detect(&self, text: &str) -> Result<MatchesByCategory> {
        self.scan(text).map(|(matches, _)| matches)
    }

    fn scan(&self, text: &str) -> Result<(MatchesByCategory, Vec<(Category, GenerateFn)>)> {
        let mut matches = MatchesByCategory::default();
        let mut generators: Vec<(Category, GenerateFn)> = Vec::new();

        for matcher in &self.matchers {
            for scan in matcher.scan(text)? {
                let candidates = scan.candidates.len();
                let filter = scan.filter;
                let survivors: Vec<Match> = scan
                    .candidates
                    .into_iter()
                    .filter(|c| !c.text.is_empty() && filter.accepts(&c.text))
                    .map(|c| c.into_match(scan.category))
                    .collect();

                debug!(
                    matcher = matcher.name(),
                    category = %scan.category,
                    candidates,
                    matches = survivors.len(),
                    "Filtered candidates"
                );

                matches.insert(scan.category, survivors);
                generators.push((scan.category, scan.generate));
            }
        }

        Ok((matches, generators))
    }

    fn build_substitutions(
        &self,
        text: &str,
        matches: &MatchesByCategory,
        generators: &[(Category, GenerateFn)],
        generator: &mut dyn SyntheticGenerator,
    ) -> Result<SubstitutionMap> {
        let originals: Vec<&str> = {
            let mut seen = indexmap::IndexSet::new();
            for (_, list) in matches.iter() {
                for m in list {
                    seen.insert(m.text.as_str());
                }
            }
            seen.into_iter().collect()
        };

        let mut substitutions = SubstitutionMap::new();

        for &(category, generate) in generators {
            for m in matches.get(category).unwrap_or_default() {
                if substitutions.contains(&m.text) {
                    continue;
                }

                let replacement =
                    self.generate_replacement(category, generate, text, &originals, &substitutions, generator)?;
                substitutions.insert_first(m.text.clone(), replacement, category);
            }
        }

        Ok(substitutions)
    }

    fn generate_replacement(
        &self,
        category: Category,
        generate: GenerateFn,
        text: &str,
        originals: &[&str],
        substitutions: &SubstitutionMap,
        generator: &mut dyn SyntheticGenerator,
    ) -> Result<String> {
        for attempt in 1..=self.max_generation_attempts {
            let candidate = generate(generator);
            if is_acceptable(&candidate, text, originals, substitutions) {
                return Ok(candidate);
            }
            trace!(category = %category, attempt, "Rejected colliding replacement");
        }

        Err(Error::SyntheticExhausted {
            category,
            attempts: self.max_generation_attempts,
        })
    }
}

/// Originals with fewer digits than this and no letters are short numbers
/// (quantities, list indices) that replacements are allowed to contain.
const SHORT_NUMBER_DIGITS: usize = 7;

/// A replacement must be unambiguous in both directions: it may not occur in
/// the input, overlap any original, or overlap another replacement.
///
/// Containing a short numeric original is tolerated. Any digit-bearing value
/// would otherwise be rejected in number-dense text, and unmasking only ever
/// searches for replacements.
fn is_acceptable(
    candidate: &str,
    text: &str,
    originals: &[&str],
    substitutions: &SubstitutionMap,
) -> bool {
    !candidate.is_empty()
        && !text.contains(candidate)
        && !originals.iter().any(|o| {
            o.contains(candidate) || (!is_short_number(o) && candidate.contains(o))
        })
        && !substitutions
            .replacements()
            .any(|r| candidate.contains(r) || r.contains(candidate))
}

fn is_short_number(original: &str) -> bool {
    !original.chars().any(char::is_alphabetic)
        && original.chars().filter(char::is_ascii_digit).count() < SHORT_NUMBER_DIGITS
}
