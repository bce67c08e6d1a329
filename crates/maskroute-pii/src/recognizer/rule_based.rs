//! Gazetteer and capitalisation rules for names and organizations

use crate::config::RecognizerConfig;
use crate::error::{Error, Result};
use crate::recognizer::{EntityLabel, EntityRecognizer, RecognizedEntity};
use aho_corasick::{AhoCorasick, MatchKind};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

/// Words that close an organization name
static ORGANIZATION_SUFFIXES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "inc", "incorporated", "ltd", "limited", "llc", "corp", "corporation", "co", "company",
        "industries", "group", "gmbh", "plc", "ag", "holdings", "technologies", "labs",
        "systems", "bank", "university", "foundation", "institute", "association", "partners",
        "solutions", "enterprises", "agency", "studios", "ventures",
    ]
    .into_iter()
    .collect()
});

/// Titles may precede a name without ending the run
static TITLES: Lazy<HashSet<&'static str>> =
    Lazy::new(|| ["mr", "mrs", "ms", "miss", "dr", "prof", "sir"].into_iter().collect());

/// Abbreviations whose trailing period belongs to the word
static ABBREVIATIONS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "inc", "ltd", "llc", "corp", "co", "plc", "jr", "sr", "mr", "mrs", "ms", "dr", "prof",
    ]
    .into_iter()
    .collect()
});

/// Capitalised words that start sentences or greetings, not names
static LEADING_STOPWORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "hello", "hi", "hey", "dear", "contact", "call", "ask", "email", "thanks", "thank",
        "please", "my", "our", "your", "his", "her", "their", "the", "a", "an", "this", "that",
        "these", "those", "i", "we", "you", "he", "she", "it", "they", "yes", "no", "when",
        "where", "what", "why", "how", "if", "and", "but", "or", "so", "then", "today",
        "tomorrow", "yesterday", "meet", "from", "to", "question", "context", "mr", "mrs",
        "ms", "miss", "dr", "prof", "sir", "madam",
    ]
    .into_iter()
    .collect()
});

/// Capitalised words that never appear in a person name
static NON_NAME_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "monday", "tuesday", "wednesday", "thursday", "friday", "saturday", "sunday",
        "january", "february", "march", "april", "july", "august", "september", "october",
        "november", "december", "new", "north", "south", "east", "west", "san", "los", "las",
        "saint", "street", "avenue", "road", "city", "state", "county", "river", "lake",
        "mount", "ocean", "english", "french", "german", "spanish", "american", "european",
    ]
    .into_iter()
    .collect()
});

const WORD_PATTERN: &str = r"[A-Za-z][A-Za-z'&-]*\.?";

/// Known entity names
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Gazetteer {
    #[serde(default)]
    pub persons: Vec<String>,

    #[serde(default)]
    pub organizations: Vec<String>,
}

impl Gazetteer {
    /// Load a JSON gazetteer
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            Error::ModelUnavailable(format!("cannot read gazetteer {}: {}", path.display(), e))
        })?;

        serde_json::from_str(&contents).map_err(|e| {
            Error::ModelUnavailable(format!("invalid gazetteer {}: {}", path.display(), e))
        })
    }

    pub fn is_empty(&self) -> bool {
        self.persons.is_empty() && self.organizations.is_empty()
    }
}

struct CompiledGazetteer {
    automaton: AhoCorasick,
    labels: Vec<EntityLabel>,
}

/// Recognizer combining an optional gazetteer with capitalisation rules
///
/// Gazetteer entries always win. Outside them, runs of capitalised words are
/// labelled as organizations when they end in a corporate suffix
/// (`Acme Mining Industries`, `Initech Inc.`) and as persons when they are two
/// or three title-case words (`Sarah Connor`).
pub struct RuleBasedRecognizer {
    word_regex: Regex,
    gazetteer: Option<CompiledGazetteer>,
}

impl RuleBasedRecognizer {
    pub fn new() -> Result<Self> {
        Ok(Self {
            word_regex: Regex::new(WORD_PATTERN)?,
            gazetteer: None,
        })
    }

    pub fn with_gazetteer(gazetteer: Gazetteer) -> Result<Self> {
        let mut recognizer = Self::new()?;
        recognizer.gazetteer = compile_gazetteer(gazetteer)?;
        Ok(recognizer)
    }

    pub fn from_gazetteer_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::with_gazetteer(Gazetteer::from_file(path)?)
    }

    pub fn from_config(config: &RecognizerConfig) -> Result<Self> {
        match &config.gazetteer {
            Some(path) => Self::from_gazetteer_file(path),
            None => Self::new(),
        }
    }

    fn gazetteer_entities(&self, text: &str) -> Vec<RecognizedEntity> {
        let Some(gazetteer) = &self.gazetteer else {
            return Vec::new();
        };

        gazetteer
            .automaton
            .find_iter(text)
            .filter(|m| is_word_bounded(text, m.start(), m.end()))
            .map(|m| RecognizedEntity {
                text: text[m.start()..m.end()].to_string(),
                start: m.start(),
                end: m.end(),
                label: gazetteer.labels[m.pattern().as_usize()].clone(),
            })
            .collect()
    }

    fn rule_entities(&self, text: &str) -> Vec<RecognizedEntity> {
        let mut entities = Vec::new();
        let mut run: Vec<Token<'_>> = Vec::new();

        for m in self.word_regex.find_iter(text) {
            let token = Token::new(m.as_str(), m.start());
            let joins = run
                .last()
                .is_none_or(|prev| prev.continues_run() && is_inline_gap(&text[prev.raw_end..token.start]));

            if token.is_capitalised() && joins {
                run.push(token);
                continue;
            }

            classify_run(text, &run, &mut entities);
            run.clear();
            if token.is_capitalised() {
                run.push(token);
            }
        }
        classify_run(text, &run, &mut entities);

        entities
    }
}

impl EntityRecognizer for RuleBasedRecognizer {
    fn recognize(&self, text: &str) -> Result<Vec<RecognizedEntity>> {
        let mut entities = self.gazetteer_entities(text);
        let known: Vec<(usize, usize)> = entities.iter().map(|e| (e.start, e.end)).collect();

        entities.extend(
            self.rule_entities(text)
                .into_iter()
                .filter(|e| !known.iter().any(|&(s, end)| e.start < end && s < e.end)),
        );
        entities.sort_by_key(|e| e.start);

        Ok(entities)
    }

    fn name(&self) -> &str {
        "rule_based"
    }
}

fn compile_gazetteer(gazetteer: Gazetteer) -> Result<Option<CompiledGazetteer>> {
    let mut patterns = Vec::new();
    let mut labels = Vec::new();

    let entries = gazetteer
        .persons
        .into_iter()
        .map(|p| (p, EntityLabel::Person))
        .chain(
            gazetteer
                .organizations
                .into_iter()
                .map(|o| (o, EntityLabel::Organization)),
        );

    for (entry, label) in entries {
        let entry = entry.trim().to_string();
        if !entry.is_empty() {
            patterns.push(entry);
            labels.push(label);
        }
    }

    if patterns.is_empty() {
        return Ok(None);
    }

    let automaton = AhoCorasick::builder()
        .match_kind(MatchKind::LeftmostLongest)
        .build(&patterns)
        .map_err(|e| Error::ModelUnavailable(format!("cannot build gazetteer: {}", e)))?;

    Ok(Some(CompiledGazetteer { automaton, labels }))
}

struct Token<'a> {
    /// Word without a sentence-ending period
    word: &'a str,
    start: usize,
    /// End of the entity text; includes the period of an abbreviation
    end: usize,
    /// End including any period
    raw_end: usize,
    has_period: bool,
}

impl<'a> Token<'a> {
    fn new(raw: &'a str, start: usize) -> Self {
        let has_period = raw.ends_with('.');
        let word = raw.strip_suffix('.').unwrap_or(raw);
        let keeps_period = has_period && ABBREVIATIONS.contains(word.to_lowercase().as_str());

        Self {
            word,
            start,
            end: if has_period && !keeps_period {
                start + word.len()
            } else {
                start + raw.len()
            },
            raw_end: start + raw.len(),
            has_period,
        }
    }

    fn lower(&self) -> String {
        self.word.to_lowercase()
    }

    fn is_capitalised(&self) -> bool {
        self.word.chars().next().is_some_and(|c| c.is_ascii_uppercase())
    }

    /// `Sarah`, `McDonald`, `O'Neil`; not `AI` or `NASA`
    fn is_title_case(&self) -> bool {
        self.is_capitalised() && self.word.chars().skip(1).any(|c| c.is_ascii_lowercase())
    }

    /// A period ends the run unless it follows a title such as `Dr.`
    fn continues_run(&self) -> bool {
        !self.has_period || TITLES.contains(self.lower().as_str())
    }
}

fn classify_run(text: &str, run: &[Token<'_>], entities: &mut Vec<RecognizedEntity>) {
    let skip = run
        .iter()
        .take_while(|t| LEADING_STOPWORDS.contains(t.lower().as_str()))
        .count();
    let tokens = &run[skip..];

    let (Some(first), Some(last)) = (tokens.first(), tokens.last()) else {
        return;
    };

    let label = if tokens.len() >= 2 && ORGANIZATION_SUFFIXES.contains(last.lower().as_str()) {
        EntityLabel::Organization
    } else if (2..=3).contains(&tokens.len())
        && tokens.iter().all(|t| t.is_title_case())
        && !tokens.iter().any(|t| NON_NAME_WORDS.contains(t.lower().as_str()))
    {
        EntityLabel::Person
    } else {
        return;
    };

    entities.push(RecognizedEntity {
        text: text[first.start..last.end].to_string(),
        start: first.start,
        end: last.end,
        label,
    });
}

fn is_inline_gap(gap: &str) -> bool {
    !gap.is_empty() && gap.chars().all(|c| c == ' ' || c == '\t')
}

fn is_word_bounded(text: &str, start: usize, end: usize) -> bool {
    let before = text[..start].chars().next_back();
    let after = text[end..].chars().next();
    !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
}
