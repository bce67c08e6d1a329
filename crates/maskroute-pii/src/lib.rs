//! MaskRoute reversible PII masking
//!
//! This crate replaces personal data in text with realistic synthetic values
//! and restores it afterwards:
//! - Email, credit card and phone number detection by regular expression
//! - Person and organization detection through a pluggable entity recognizer
//! - Format-compatible synthetic replacements (Luhn-valid cards, `example.*` emails)
//! - Per-text substitution maps for unmasking downstream responses

pub mod config;
pub mod error;
pub mod masker;
pub mod matcher;
pub mod pipeline;
pub mod recognizer;
pub mod substitution;
pub mod synthetic;

pub use config::{MaskerConfig, RecognizerConfig};
pub use error::{Error, Result};
pub use masker::{MaskedDocument, PiiMasker};
pub use matcher::{Category, EntityMatcher, Match, PatternMatcher, RegexMatcher};
pub use pipeline::{Detection, DetectionPipeline, MatchesByCategory};
pub use recognizer::{
    EntityLabel, EntityRecognizer, Gazetteer, RecognizedEntity, RuleBasedRecognizer,
};
pub use substitution::{Substitution, SubstitutionMap, SubstitutionStrategy};
pub use synthetic::{FakeDataGenerator, SyntheticGenerator, luhn_valid};
