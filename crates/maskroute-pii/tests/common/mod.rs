//! Shared fixtures for masking integration tests.

#![allow(dead_code)]

use maskroute_pii::{
    EntityLabel, EntityRecognizer, Error, MaskerConfig, PiiMasker, RecognizedEntity,
    RecognizerConfig, Result,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Recognizer double that labels every occurrence of a fixed set of phrases.
#[derive(Default)]
pub struct ScriptedRecognizer {
    phrases: Vec<(String, EntityLabel)>,
    calls: AtomicUsize,
}

impl ScriptedRecognizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn person(mut self, phrase: &str) -> Self {
        self.phrases.push((phrase.to_string(), EntityLabel::Person));
        self
    }

    pub fn organization(mut self, phrase: &str) -> Self {
        self.phrases
            .push((phrase.to_string(), EntityLabel::Organization));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl EntityRecognizer for ScriptedRecognizer {
    fn recognize(&self, text: &str) -> Result<Vec<RecognizedEntity>> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let mut entities = Vec::new();
        for (phrase, label) in &self.phrases {
            for (start, found) in text.match_indices(phrase.as_str()) {
                entities.push(RecognizedEntity {
                    text: found.to_string(),
                    start,
                    end: start + found.len(),
                    label: label.clone(),
                });
            }
        }
        entities.sort_by_key(|e| e.start);
        Ok(entities)
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

/// Recognizer whose backend is always down.
pub struct UnavailableRecognizer;

impl EntityRecognizer for UnavailableRecognizer {
    fn recognize(&self, _text: &str) -> Result<Vec<RecognizedEntity>> {
        Err(Error::ModelUnavailable("backend offline".to_string()))
    }
}

/// Configuration without entity recognition.
pub fn regex_only_config() -> MaskerConfig {
    MaskerConfig {
        recognizer: RecognizerConfig {
            enabled: false,
            gazetteer: None,
        },
        ..MaskerConfig::default()
    }
}

pub fn scripted_masker(recognizer: ScriptedRecognizer) -> PiiMasker {
    PiiMasker::with_recognizer(MaskerConfig::default(), Arc::new(recognizer))
        .expect("masker should build")
}

/// Sentence carrying every category, with the entities the recognizer should find.
pub const PROFILE_TEXT: &str = "Hello, my email is radek.lejba@gmail.com, my credit card number is \
     1234-5678-1234-5678, my phone number is +48 123 456 789, my name is \
     Radek Lejba and I work for AI Supremacy Inc.";

pub fn profile_recognizer() -> ScriptedRecognizer {
    ScriptedRecognizer::new()
        .person("Radek Lejba")
        .organization("AI Supremacy Inc.")
}
