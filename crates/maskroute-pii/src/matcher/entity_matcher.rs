//! Named-entity matcher for person and organization names

use crate::error::Result;
use crate::matcher::{Candidate, CandidateFilter, Category, CategoryScan};
use crate::recognizer::{EntityLabel, EntityRecognizer};
use crate::synthetic::{generate_company, generate_name};
use std::sync::Arc;
use tracing::trace;

/// Matcher backed by an [`EntityRecognizer`]
///
/// The recognizer runs once per scan; its person spans become `name`
/// candidates and its organization spans become `organization` candidates.
/// Recognizer failures propagate so names are never silently left unmasked.
pub struct EntityMatcher {
    recognizer: Arc<dyn EntityRecognizer>,
    detect_name: bool,
    detect_organization: bool,
}

impl EntityMatcher {
    pub fn new(recognizer: Arc<dyn EntityRecognizer>) -> Self {
        Self {
            recognizer,
            detect_name: true,
            detect_organization: true,
        }
    }

    /// Restrict the categories this matcher reports
    pub fn with_categories(mut self, detect_name: bool, detect_organization: bool) -> Self {
        self.detect_name = detect_name;
        self.detect_organization = detect_organization;
        self
    }

    pub fn is_active(&self) -> bool {
        self.detect_name || self.detect_organization
    }

    pub fn categories(&self) -> Vec<Category> {
        let mut categories = Vec::new();
        if self.detect_name {
            categories.push(Category::Name);
        }
        if self.detect_organization {
            categories.push(Category::Organization);
        }
        categories
    }

    pub fn scan(&self, text: &str) -> Result<Vec<CategoryScan>> {
        if !self.is_active() {
            return Ok(Vec::new());
        }

        let entities = self.recognizer.recognize(text)?;
        trace!(
            recognizer = self.recognizer.name(),
            entities = entities.len(),
            "Entity recognition complete"
        );

        let mut names = Vec::new();
        let mut organizations = Vec::new();

        for entity in entities {
            if entity.text.is_empty() {
                continue;
            }
            let candidate = Candidate::new(entity.text, entity.start, entity.end);
            match entity.label {
                EntityLabel::Person => names.push(candidate),
                EntityLabel::Organization => organizations.push(candidate),
                EntityLabel::Other(_) => {}
            }
        }

        let mut scans = Vec::with_capacity(2);

        if self.detect_name {
            scans.push(CategoryScan {
                category: Category::Name,
                candidates: names,
                filter: CandidateFilter::AcceptAll,
                generate: generate_name,
            });
        }

        if self.detect_organization {
            scans.push(CategoryScan {
                category: Category::Organization,
                candidates: organizations,
                filter: CandidateFilter::AcceptAll,
                generate: generate_company,
            });
        }

        Ok(scans)
    }
}
