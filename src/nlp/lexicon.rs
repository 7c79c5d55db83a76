use std::collections::HashMap;
use std::path::Path;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{attach_modifiers, tokenize, Analysis, LanguageAnalyzer};
use crate::error::{AgentError, Result};

const EMBEDDED_LEXICON: &str = include_str!("lexicon_es.json");

/// Polarity lexicon keyed by lemma.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lexicon {
    pub name: String,
    pub words: HashMap<String, f32>,
}

impl Lexicon {
    pub fn from_json(json: &str) -> Result<Self> {
        let lexicon: Lexicon = serde_json::from_str(json)?;
        lexicon.validate()?;
        Ok(lexicon)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn embedded() -> Result<Self> {
        Self::from_json(EMBEDDED_LEXICON)
    }

    fn validate(&self) -> Result<()> {
        if self.words.is_empty() {
            return Err(AgentError::Config(format!("lexicon '{}' has no entries", self.name)));
        }
        if let Some((word, polarity)) = self
            .words
            .iter()
            .find(|(_, p)| !(-1.0..=1.0).contains(*p))
        {
            return Err(AgentError::Config(format!(
                "lexicon '{}': polarity {} for '{}' is outside [-1, 1]",
                self.name, polarity, word
            )));
        }
        Ok(())
    }

    pub fn polarity(&self, lemma: &str) -> Option<f32> {
        self.words.get(lemma).copied()
    }

    /// First inflection candidate present in the lexicon, else the token itself.
    pub fn lemma(&self, token: &str) -> String {
        inflection_candidates(token)
            .into_iter()
            .find(|candidate| self.words.contains_key(candidate))
            .unwrap_or_else(|| token.to_string())
    }
}

/// Token, de-pluralized forms, then masculine forms of each.
fn inflection_candidates(token: &str) -> Vec<String> {
    let len = token.chars().count();
    let mut forms = vec![token.to_string()];

    if len > 4 {
        if let Some(stem) = token.strip_suffix("ces") {
            forms.push(format!("{}z", stem));
        }
        if let Some(stem) = token.strip_suffix("es") {
            forms.push(stem.to_string());
        }
    }
    if len > 3 {
        if let Some(stem) = token.strip_suffix('s') {
            forms.push(stem.to_string());
        }
    }

    let masculine: Vec<String> = forms
        .iter()
        .filter_map(|form| form.strip_suffix('a').map(|stem| format!("{}o", stem)))
        .collect();
    forms.extend(masculine);
    forms
}

pub struct LexiconAnalyzer {
    lexicon: Lexicon,
}

impl LexiconAnalyzer {
    pub fn new(lexicon: Lexicon) -> Self {
        LexiconAnalyzer { lexicon }
    }

    /// Loads the preferred lexicon, falling back to the embedded one.
    /// Fails only when no usable lexicon remains.
    pub fn load(preferred: Option<&Path>) -> Result<Self> {
        if let Some(path) = preferred {
            match Lexicon::from_file(path) {
                Ok(lexicon) => {
                    info!("Loaded lexicon '{}' ({} entries) from {}", lexicon.name, lexicon.words.len(), path.display());
                    return Ok(Self::new(lexicon));
                }
                Err(e) => {
                    warn!("Lexicon at {} unusable ({}), falling back to embedded lexicon", path.display(), e);
                }
            }
        }

        let lexicon = Lexicon::embedded()
            .map_err(|e| AgentError::dependency_unavailable(format!("embedded lexicon is invalid: {}", e)))?;
        info!("Loaded embedded lexicon '{}' ({} entries)", lexicon.name, lexicon.words.len());
        Ok(Self::new(lexicon))
    }
}

impl LanguageAnalyzer for LexiconAnalyzer {
    fn analyze(&self, text: &str) -> Analysis {
        let tokens = tokenize(text);
        let lemmas = tokens.iter().map(|t| self.lexicon.lemma(t)).collect();
        let dependencies = attach_modifiers(&tokens);

        Analysis { tokens, lemmas, dependencies }
    }

    fn sentiment(&self, text: &str) -> f32 {
        let scores: Vec<f32> = tokenize(text)
            .iter()
            .filter_map(|token| self.lexicon.polarity(&self.lexicon.lemma(token)))
            .collect();

        if scores.is_empty() {
            return 0.0;
        }

        let polarity = scores.iter().sum::<f32>() / scores.len() as f32;
        debug!("sentiment over {} scored tokens: {:.3}", scores.len(), polarity);
        polarity.clamp(-1.0, 1.0)
    }

    fn name(&self) -> &str {
        &self.lexicon.name
    }
}
