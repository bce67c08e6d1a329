//! Pattern matchers
//!
//! A matcher scans a text and reports, for every category it owns, the raw
//! candidate spans together with the filter that decides which candidates are
//! real matches and the generator that fabricates their replacements.

mod entity_matcher;
mod regex_matcher;

pub use entity_matcher::EntityMatcher;
pub use regex_matcher::{DEFAULT_PHONE_MAX_DIGITS, RegexMatcher};

use crate::error::Result;
use crate::synthetic::GenerateFn;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kinds of PII handled by the masking engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Email address
    Email,

    /// Credit card number
    CreditCard,

    /// Phone number in international or loose format
    PhoneNumber,

    /// Person name
    Name,

    /// Organization or company name
    Organization,
}

impl Category {
    /// All categories in registration order
    pub const ALL: [Category; 5] = [
        Category::Email,
        Category::CreditCard,
        Category::PhoneNumber,
        Category::Name,
        Category::Organization,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Email => "email",
            Category::CreditCard => "credit_card",
            Category::PhoneNumber => "phone_number",
            Category::Name => "name",
            Category::Organization => "organization",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw span reported by a matcher, before filtering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    /// The matched text
    pub text: String,

    /// Start byte offset in the scanned text
    pub start: usize,

    /// End byte offset in the scanned text
    pub end: usize,
}

impl Candidate {
    pub fn new(text: impl Into<String>, start: usize, end: usize) -> Self {
        Self {
            text: text.into(),
            start,
            end,
        }
    }

    /// Promote a candidate that passed its filter
    pub fn into_match(self, category: Category) -> Match {
        Match {
            category,
            text: self.text,
            start: self.start,
            end: self.end,
        }
    }
}

/// A candidate that survived its category's filter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub category: Category,
    pub text: String,
    pub start: usize,
    pub end: usize,
}

/// Filter predicate applied to the candidates of one category
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CandidateFilter {
    /// Every candidate is a match
    AcceptAll,

    /// Reject candidates with more than this many ASCII digits
    MaxDigits(usize),
}

impl CandidateFilter {
    pub fn accepts(&self, candidate: &str) -> bool {
        match self {
            CandidateFilter::AcceptAll => true,
            CandidateFilter::MaxDigits(max) => {
                candidate.chars().filter(|c| c.is_ascii_digit()).count() <= *max
            }
        }
    }
}

/// Everything one matcher reports about one category
pub struct CategoryScan {
    pub category: Category,
    pub candidates: Vec<Candidate>,
    pub filter: CandidateFilter,
    pub generate: GenerateFn,
}

impl fmt::Debug for CategoryScan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CategoryScan")
            .field("category", &self.category)
            .field("candidates", &self.candidates.len())
            .field("filter", &self.filter)
            .finish()
    }
}

/// The closed set of matcher variants run by the detection pipeline
pub enum PatternMatcher {
    /// Universal formats found with regular expressions
    Regex(RegexMatcher),

    /// Names and organizations found by an entity recognizer
    Entity(EntityMatcher),
}

impl PatternMatcher {
    /// Scan `text` and report candidates for every owned category
    pub fn scan(&self, text: &str) -> Result<Vec<CategoryScan>> {
        match self {
            PatternMatcher::Regex(matcher) => Ok(matcher.scan(text)),
            PatternMatcher::Entity(matcher) => matcher.scan(text),
        }
    }

    /// Categories this matcher reports, in scan order
    pub fn categories(&self) -> Vec<Category> {
        match self {
            PatternMatcher::Regex(matcher) => matcher.categories(),
            PatternMatcher::Entity(matcher) => matcher.categories(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PatternMatcher::Regex(_) => "regex",
            PatternMatcher::Entity(_) => "entity",
        }
    }
}

impl From<RegexMatcher> for PatternMatcher {
    fn from(matcher: RegexMatcher) -> Self {
        PatternMatcher::Regex(matcher)
    }
}

impl From<EntityMatcher> for PatternMatcher {
    fn from(matcher: EntityMatcher) -> Self {
        PatternMatcher::Entity(matcher)
    }
}
