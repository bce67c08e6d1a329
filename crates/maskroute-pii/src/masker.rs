//! Reversible PII masking
//!
//! [`PiiMasker`] is the entry point: it builds the matchers from a
//! [`MaskerConfig`], masks a text and hands back a [`MaskedDocument`] that
//! owns everything needed to unmask text derived from it later.

use crate::config::MaskerConfig;
use crate::error::{Error, Result};
use crate::matcher::{EntityMatcher, PatternMatcher, RegexMatcher};
use crate::pipeline::{Detection, DetectionPipeline, MatchesByCategory};
use crate::recognizer::{EntityRecognizer, RuleBasedRecognizer};
use crate::substitution::{SubstitutionMap, SubstitutionStrategy};
use crate::synthetic::{FakeDataGenerator, SyntheticGenerator};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// Result of masking one text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaskedDocument {
    masked_text: String,
    matches: MatchesByCategory,
    substitutions: SubstitutionMap,
    #[serde(default)]
    strategy: SubstitutionStrategy,
}

impl MaskedDocument {
    pub fn masked_text(&self) -> &str {
        &self.masked_text
    }

    pub fn matches(&self) -> &MatchesByCategory {
        &self.matches
    }

    pub fn substitutions(&self) -> &SubstitutionMap {
        &self.substitutions
    }

    pub fn strategy(&self) -> SubstitutionStrategy {
        self.strategy
    }

    /// Restore originals in `text`, typically a downstream response to the
    /// masked text
    pub fn unmask(&self, text: &str) -> Result<String> {
        self.substitutions.unmask(text, self.strategy)
    }

    pub fn into_parts(self) -> (String, MatchesByCategory, SubstitutionMap) {
        (self.masked_text, self.matches, self.substitutions)
    }
}

/// Detects PII and replaces it with synthetic values
pub struct PiiMasker {
    pipeline: DetectionPipeline,
    config: MaskerConfig,
}

impl PiiMasker {
    /// Build a masker
    ///
    /// Without a `recognizer`, names and organizations are found by the
    /// built-in [`RuleBasedRecognizer`]. A gazetteer that fails to load makes
    /// construction fail with [`Error::ModelUnavailable`].
    pub fn new(
        config: MaskerConfig,
        recognizer: Option<Arc<dyn EntityRecognizer>>,
    ) -> Result<Self> {
        config.validate()?;

        let mut matchers: Vec<PatternMatcher> = Vec::new();

        if config.regex_enabled() {
            matchers.push(RegexMatcher::from_config(&config)?.into());
        }

        if config.entities_enabled() {
            let recognizer: Arc<dyn EntityRecognizer> = match recognizer {
                Some(recognizer) => recognizer,
                None => Arc::new(RuleBasedRecognizer::from_config(&config.recognizer)?),
            };
            let matcher = EntityMatcher::new(recognizer)
                .with_categories(config.detect_name, config.detect_organization);
            matchers.push(matcher.into());
        }

        let pipeline = DetectionPipeline::new(matchers)
            .with_max_generation_attempts(config.max_generation_attempts);

        info!(
            categories = ?pipeline.categories(),
            strategy = ?config.substitution,
            "PII masker initialized"
        );

        Ok(Self { pipeline, config })
    }

    pub fn from_config(config: MaskerConfig) -> Result<Self> {
        Self::new(config, None)
    }

    pub fn with_recognizer(
        config: MaskerConfig,
        recognizer: Arc<dyn EntityRecognizer>,
    ) -> Result<Self> {
        Self::new(config, Some(recognizer))
    }

    pub fn config(&self) -> &MaskerConfig {
        &self.config
    }

    pub fn pipeline(&self) -> &DetectionPipeline {
        &self.pipeline
    }

    /// Mask `text` with a fresh generator
    ///
    /// The generator is seeded from the configuration when a seed is set,
    /// otherwise from the OS.
    pub fn mask(&self, text: &str) -> Result<MaskedDocument> {
        let mut generator = match self.config.seed {
            Some(seed) => FakeDataGenerator::seeded(seed),
            None => FakeDataGenerator::new(),
        };
        self.mask_with(text, &mut generator)
    }

    /// Report what `mask` would replace, without generating replacements
    pub fn detect(&self, text: &str) -> Result<MatchesByCategory> {
        self.check_input(text)?;
        self.pipeline.detect(text)
    }

    /// Mask raw bytes, which must be UTF-8
    pub fn mask_bytes(&self, bytes: &[u8]) -> Result<MaskedDocument> {
        let text = std::str::from_utf8(bytes)
            .map_err(|e| Error::MalformedInput(format!("input is not valid UTF-8: {}", e)))?;
        self.mask(text)
    }

    /// Mask `text` drawing replacements from `generator`
    pub fn mask_with(
        &self,
        text: &str,
        generator: &mut dyn SyntheticGenerator,
    ) -> Result<MaskedDocument> {
        self.check_input(text)?;

        let Detection {
            matches,
            substitutions,
        } = self.pipeline.run(text, generator)?;

        let masked_text = substitutions.mask(text, self.config.substitution)?;

        debug!(
            input_bytes = text.len(),
            output_bytes = masked_text.len(),
            substitutions = substitutions.len(),
            "Masked text"
        );

        Ok(MaskedDocument {
            masked_text,
            matches,
            substitutions,
            strategy: self.config.substitution,
        })
    }

    /// Mask on the blocking thread pool
    ///
    /// Entity recognition can be slow on long inputs; this keeps it off the
    /// async executor.
    #[cfg(feature = "tokio")]
    pub async fn mask_offloaded(self: Arc<Self>, text: String) -> Result<MaskedDocument> {
        tokio::task::spawn_blocking(move || self.mask(&text))
            .await
            .map_err(|e| Error::Internal(format!("masking task failed: {}", e)))?
    }

    fn check_input(&self, text: &str) -> Result<()> {
        if text.len() > self.config.max_input_bytes {
            return Err(Error::MalformedInput(format!(
                "input is {} bytes, limit is {}",
                text.len(),
                self.config.max_input_bytes
            )));
        }
        if text.contains('\0') {
            return Err(Error::MalformedInput(
                "input contains NUL characters".to_string(),
            ));
        }
        Ok(())
    }
}
