//! Named-entity recognition capability
//!
//! The masking engine only needs spans labelled as people or organizations.
//! Any NER backend can be plugged in by implementing [`EntityRecognizer`];
//! [`RuleBasedRecognizer`] is the built-in fallback.

mod rule_based;

pub use rule_based::{Gazetteer, RuleBasedRecognizer};

use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Label attached to a recognized span
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityLabel {
    Person,
    Organization,

    /// Any other label a backend emits (locations, dates, ...)
    Other(String),
}

impl EntityLabel {
    /// Map a backend tag such as `PERSON` or `ORG` to a label
    pub fn from_tag(tag: &str) -> Self {
        match tag.to_ascii_uppercase().as_str() {
            "PERSON" | "PER" => EntityLabel::Person,
            "ORG" | "ORGANIZATION" | "ORGANISATION" => EntityLabel::Organization,
            _ => EntityLabel::Other(tag.to_string()),
        }
    }
}

/// A labelled span of the recognized text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecognizedEntity {
    pub text: String,
    pub start: usize,
    pub end: usize,
    pub label: EntityLabel,
}

/// Trait for labelling named entities in text
pub trait EntityRecognizer: Send + Sync {
    /// Label the entities in `text`
    ///
    /// Fails with [`crate::Error::ModelUnavailable`] when the backend cannot
    /// be loaded or queried.
    fn recognize(&self, text: &str) -> Result<Vec<RecognizedEntity>>;

    /// Short backend name for logs
    fn name(&self) -> &str {
        "custom"
    }
}
