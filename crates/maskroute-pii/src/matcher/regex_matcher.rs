//! Regex-based matcher for universally formatted PII

use crate::config::MaskerConfig;
use crate::error::Result;
use crate::matcher::{Candidate, CandidateFilter, Category, CategoryScan};
use crate::synthetic::{generate_credit_card, generate_email, generate_phone_number};
use regex::Regex;
use std::sync::Arc;

/// `local@domain.tld`; the domain never ends in a dot so a sentence-ending
/// period stays outside the match.
const EMAIL_PATTERN: &str = r"[a-zA-Z0-9_.+-]+@[a-zA-Z0-9-]+(?:\.[a-zA-Z0-9-]+)+";

/// 13 to 16 digits with optional spaces or hyphens between them
const CREDIT_CARD_PATTERN: &str = r"\b(?:[0-9][ -]*?){13,16}\b";

/// Groups of an optional `+` and 1-4 digits, optionally separated, with an
/// optional `|` between two runs of groups.
const PHONE_PATTERN: &str = r"(?:\+?[0-9]{1,4}[ -]?){1,11}\|?(?:\+?[0-9]{1,4}[ -]?){1,11}";

/// E.164 caps international numbers at 15 digits
pub const DEFAULT_PHONE_MAX_DIGITS: usize = 15;

/// Regex-based matcher for email, credit card and phone number candidates
pub struct RegexMatcher {
    email_regex: Option<Arc<Regex>>,
    credit_card_regex: Option<Arc<Regex>>,
    phone_regex: Option<Arc<Regex>>,
    phone_max_digits: usize,
}

impl RegexMatcher {
    /// Matcher for every regex category with the default phone filter
    pub fn new() -> Result<Self> {
        Self::from_config(&MaskerConfig::default())
    }

    /// Create a matcher for the categories enabled in `config`
    pub fn from_config(config: &MaskerConfig) -> Result<Self> {
        let compile = |enabled: bool, pattern: &str| -> Result<Option<Arc<Regex>>> {
            if enabled {
                Ok(Some(Arc::new(Regex::new(pattern)?)))
            } else {
                Ok(None)
            }
        };

        Ok(Self {
            email_regex: compile(config.detect_email, EMAIL_PATTERN)?,
            credit_card_regex: compile(config.detect_credit_card, CREDIT_CARD_PATTERN)?,
            phone_regex: compile(config.detect_phone_number, PHONE_PATTERN)?,
            phone_max_digits: config.phone_max_digits,
        })
    }

    /// Whether any category is enabled
    pub fn is_active(&self) -> bool {
        self.email_regex.is_some() || self.credit_card_regex.is_some() || self.phone_regex.is_some()
    }

    pub fn categories(&self) -> Vec<Category> {
        let mut categories = Vec::new();

        if self.email_regex.is_some() {
            categories.push(Category::Email);
        }
        if self.credit_card_regex.is_some() {
            categories.push(Category::CreditCard);
        }
        if self.phone_regex.is_some() {
            categories.push(Category::PhoneNumber);
        }

        categories
    }

    pub fn scan(&self, text: &str) -> Vec<CategoryScan> {
        let mut scans = Vec::with_capacity(3);

        if let Some(regex) = &self.email_regex {
            scans.push(CategoryScan {
                category: Category::Email,
                candidates: find_candidates(regex, text),
                filter: CandidateFilter::AcceptAll,
                generate: generate_email,
            });
        }

        if let Some(regex) = &self.credit_card_regex {
            scans.push(CategoryScan {
                category: Category::CreditCard,
                candidates: find_candidates(regex, text),
                filter: CandidateFilter::AcceptAll,
                generate: generate_credit_card,
            });
        }

        if let Some(regex) = &self.phone_regex {
            scans.push(CategoryScan {
                category: Category::PhoneNumber,
                candidates: find_candidates(regex, text),
                filter: CandidateFilter::MaxDigits(self.phone_max_digits),
                generate: generate_phone_number,
            });
        }

        scans
    }
}

fn find_candidates(regex: &Regex, text: &str) -> Vec<Candidate> {
    regex
        .find_iter(text)
        .map(|m| Candidate::new(m.as_str(), m.start(), m.end()))
        .collect()
}
