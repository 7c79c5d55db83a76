use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AgentError;
use crate::nlp::{normalize, LanguageAnalyzer, Relation};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoodCategory {
    #[serde(rename = "motivado")]
    Motivated,
    #[serde(rename = "normal")]
    Neutral,
    #[serde(rename = "cansado")]
    Tired,
}

impl MoodCategory {
    /// Keyword ties resolve in this order.
    pub const ALL: [MoodCategory; 3] = [MoodCategory::Motivated, MoodCategory::Neutral, MoodCategory::Tired];

    pub fn label(&self) -> &'static str {
        match self {
            MoodCategory::Motivated => "motivado",
            MoodCategory::Neutral => "normal",
            MoodCategory::Tired => "cansado",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            MoodCategory::Motivated => "😊",
            MoodCategory::Neutral => "😐",
            MoodCategory::Tired => "😫",
        }
    }

    pub fn from_polarity(polarity: f32) -> Self {
        if polarity > 0.3 {
            MoodCategory::Motivated
        } else if polarity < -0.2 {
            MoodCategory::Tired
        } else {
            MoodCategory::Neutral
        }
    }

    /// Motivated -> Tired -> Neutral, fixed at Neutral.
    pub fn negated(self) -> Self {
        match self {
            MoodCategory::Motivated => MoodCategory::Tired,
            MoodCategory::Tired => MoodCategory::Neutral,
            MoodCategory::Neutral => MoodCategory::Neutral,
        }
    }
}

impl fmt::Display for MoodCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for MoodCategory {
    type Err = AgentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "motivado" | "motivated" => Ok(MoodCategory::Motivated),
            "normal" | "neutral" => Ok(MoodCategory::Neutral),
            "cansado" | "tired" => Ok(MoodCategory::Tired),
            other => Err(AgentError::UnknownCategory(other.to_string())),
        }
    }
}

/// Keyword stems per mood. Matching is substring containment.
#[derive(Debug, Clone)]
pub struct KeywordTable {
    entries: Vec<(MoodCategory, Vec<String>)>,
}

impl KeywordTable {
    pub fn new(entries: Vec<(MoodCategory, Vec<String>)>) -> Self {
        KeywordTable { entries }
    }

    pub fn fragments(&self, category: MoodCategory) -> &[String] {
        self.entries
            .iter()
            .find(|(c, _)| *c == category)
            .map(|(_, fragments)| fragments.as_slice())
            .unwrap_or(&[])
    }

    /// Category with the strictly greatest hit count, walking `MoodCategory::ALL`.
    pub fn best_match(&self, normalized: &str) -> Option<(MoodCategory, usize)> {
        let mut best: Option<(MoodCategory, usize)> = None;

        for category in MoodCategory::ALL {
            let hits = self
                .fragments(category)
                .iter()
                .filter(|fragment| normalized.contains(fragment.as_str()))
                .count();
            let leading = best.map_or(0, |(_, count)| count);
            if hits > leading {
                best = Some((category, hits));
            }
        }

        best
    }
}

impl Default for KeywordTable {
    fn default() -> Self {
        let table = |words: &[&str]| words.iter().map(|w| w.to_string()).collect::<Vec<_>>();

        KeywordTable::new(vec![
            (MoodCategory::Motivated, table(&[
                "motiva", "anima", "energia", "entusiasmo", "ganas", "alegr",
                "positiv", "bien", "excelente", "dispuesto", "list",
            ])),
            (MoodCategory::Neutral, table(&[
                "normal", "regular", "mas o menos", "neutral", "tranquil",
                "ordinario", "comun", "usual", "tipico", "okay", "ok",
            ])),
            (MoodCategory::Tired, table(&[
                "cansa", "agota", "fatiga", "sueno", "dormir", "pesad",
                "agobia", "exhaust", "mal", "desanima", "triste", "deprimi",
            ])),
        ])
    }
}

/// Degree adverbs and the multiplier each one carries.
#[derive(Debug, Clone)]
pub struct IntensityTable {
    modifiers: Vec<(String, f32)>,
    repeated_muy: f32,
}

impl IntensityTable {
    pub fn new(modifiers: Vec<(String, f32)>, repeated_muy: f32) -> Self {
        IntensityTable { modifiers, repeated_muy }
    }

    /// A repeated "muy" wins; otherwise the first modifier token in the text.
    pub fn multiplier(&self, tokens: &[String]) -> f32 {
        if tokens.iter().filter(|t| t.as_str() == "muy").count() >= 2 {
            return self.repeated_muy;
        }

        tokens
            .iter()
            .find_map(|token| {
                self.modifiers
                    .iter()
                    .find(|(word, _)| word == token)
                    .map(|(_, factor)| *factor)
            })
            .unwrap_or(1.0)
    }
}

impl Default for IntensityTable {
    fn default() -> Self {
        let modifiers = [
            ("muy", 1.5),
            ("super", 2.0),
            ("súper", 2.0),
            ("demasiado", 1.8),
            ("extremadamente", 2.0),
            ("bastante", 1.3),
            ("algo", 0.8),
            ("poco", 0.7),
        ];
        IntensityTable::new(
            modifiers.iter().map(|(w, f)| (w.to_string(), *f)).collect(),
            2.0,
        )
    }
}

const NEGATION_TOKENS: &[&str] = &["no", "ni", "tampoco", "nunca"];
const NEGATION_PHRASES: &[&str] = &["para nada", "en absoluto", "ya no", "ni siquiera"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MoodSource {
    Keywords,
    Sentiment,
}

#[derive(Debug, Clone, Serialize)]
pub struct MoodResult {
    pub category: MoodCategory,
    pub confidence: f32,
    pub description: String,
    pub source: MoodSource,
    pub keyword_hits: usize,
    pub polarity: f32,
    pub negated: bool,
    /// Degree multiplier. Not used for the category.
    pub intensity: f32,
}

impl MoodResult {
    pub fn scaled_confidence(&self) -> f32 {
        (self.confidence * self.intensity).clamp(0.0, 1.0)
    }
}

pub struct MoodClassifier {
    keywords: KeywordTable,
    intensity: IntensityTable,
    analyzer: Arc<dyn LanguageAnalyzer>,
}

impl MoodClassifier {
    pub fn new(keywords: KeywordTable, intensity: IntensityTable, analyzer: Arc<dyn LanguageAnalyzer>) -> Self {
        MoodClassifier { keywords, intensity, analyzer }
    }

    pub fn with_defaults(analyzer: Arc<dyn LanguageAnalyzer>) -> Self {
        Self::new(KeywordTable::default(), IntensityTable::default(), analyzer)
    }

    /// `None` when nothing is left after normalization.
    pub fn classify(&self, text: &str) -> Option<MoodResult> {
        let normalized = normalize(text);
        if normalized.trim().is_empty() {
            return None;
        }

        let keyword_match = self.keywords.best_match(&normalized);

        let polarity = self.analyzer.sentiment(&normalized);
        let analysis = self.analyzer.analyze(&normalized);

        let negated = self.is_negated(&normalized, &analysis.tokens, analysis.has_relation(Relation::Neg));
        let sentiment_category = if negated {
            MoodCategory::from_polarity(polarity).negated()
        } else {
            MoodCategory::from_polarity(polarity)
        };

        let intensity = self.intensity.multiplier(&analysis.tokens);

        let (category, source, keyword_hits) = match keyword_match {
            Some((category, hits)) => (category, MoodSource::Keywords, hits),
            None => (sentiment_category, MoodSource::Sentiment, 0),
        };

        let confidence = match category {
            MoodCategory::Neutral => 0.5,
            _ => polarity.abs(),
        };

        debug!(
            "mood: {:?} via {:?} (hits={}, polarity={:.2}, negated={}, intensity={})",
            category, source, keyword_hits, polarity, negated, intensity
        );

        Some(MoodResult {
            category,
            confidence,
            description: describe(category, source, keyword_hits, negated),
            source,
            keyword_hits,
            polarity,
            negated,
            intensity,
        })
    }

    fn is_negated(&self, normalized: &str, tokens: &[String], has_neg_relation: bool) -> bool {
        if has_neg_relation || tokens.iter().any(|t| NEGATION_TOKENS.contains(&t.as_str())) {
            return true;
        }

        let padded = format!(" {} ", normalized.split_whitespace().collect::<Vec<_>>().join(" "));
        NEGATION_PHRASES
            .iter()
            .any(|phrase| padded.contains(&format!(" {} ", phrase)))
    }
}

fn describe(category: MoodCategory, source: MoodSource, hits: usize, negated: bool) -> String {
    match source {
        MoodSource::Keywords => format!(
            "{} (detectado por {} palabra{} clave)",
            category,
            hits,
            if hits == 1 { "" } else { "s" }
        ),
        MoodSource::Sentiment if negated => format!("{} (por el tono, con negación)", category),
        MoodSource::Sentiment => format!("{} (por el tono del mensaje)", category),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::nlp::LexiconAnalyzer;

    fn classifier() -> MoodClassifier {
        MoodClassifier::with_defaults(Arc::new(LexiconAnalyzer::load(None).unwrap()))
    }

    #[test]
    fn test_two_keywords_from_one_category() {
        let classifier = classifier();
        let cases = [
            ("motiva ganas", MoodCategory::Motivated),
            ("excelente, con energia", MoodCategory::Motivated),
            ("normal y tranquilo", MoodCategory::Neutral),
            ("agotado y con sueno", MoodCategory::Tired),
        ];

        for (text, expected) in cases {
            let result = classifier.classify(text).unwrap();
            assert_eq!(result.category, expected, "text: {}", text);
            assert_eq!(result.source, MoodSource::Keywords);
            assert!(result.keyword_hits >= 2);
        }
    }

    #[test]
    fn test_single_keyword_wins_over_sentiment() {
        // "mal" fires once; sentiment of "feliz" alone would say Motivated.
        let result = classifier().classify("feliz pero me fue mal").unwrap();
        assert_eq!(result.category, MoodCategory::Tired);
        assert_eq!(result.keyword_hits, 1);
    }

    #[test]
    fn test_keyword_tie_prefers_priority_order() {
        // "normal" also contains "mal": one hit each, Neutral comes first.
        let result = classifier().classify("normal").unwrap();
        assert_eq!(result.category, MoodCategory::Neutral);
        assert_eq!(result.confidence, 0.5);
    }

    #[test]
    fn test_sentiment_without_keywords() {
        let classifier = classifier();

        let happy = classifier.classify("me siento feliz").unwrap();
        assert_eq!(happy.category, MoodCategory::Motivated);
        assert_eq!(happy.source, MoodSource::Sentiment);
        assert!((happy.confidence - 0.8).abs() < 1e-6);

        let plain = classifier.classify("xyz qwerty").unwrap();
        assert_eq!(plain.category, MoodCategory::Neutral);
        assert_eq!(plain.confidence, 0.5);
    }

    #[test]
    fn test_negation_inverts_positive_sentiment() {
        let result = classifier().classify("No estoy feliz").unwrap();
        assert!(result.negated);
        assert_eq!(result.category, MoodCategory::Tired);
        assert!(result.confidence > 0.0);
    }

    #[test]
    fn test_sin_does_not_negate() {
        let classifier = classifier();
        for text in ["estoy feliz sin dudas", "me siento feliz sin problemas", "feliz sin prisa"] {
            let result = classifier.classify(text).unwrap();
            assert!(!result.negated, "text: {}", text);
            assert_eq!(result.category, MoodCategory::Motivated, "text: {}", text);
        }
    }

    #[test]
    fn test_negation_phrase_and_cycle() {
        let classifier = classifier();

        // "jamás" is only caught through the dependency relation.
        let result = classifier.classify("jamás me siento contento").unwrap();
        assert!(result.negated);
        assert_eq!(result.category, MoodCategory::Tired);

        let result = classifier.classify("para nada estoy aburrido").unwrap();
        assert!(result.negated);
        assert_eq!(result.category, MoodCategory::Neutral);

        assert_eq!(MoodCategory::Neutral.negated(), MoodCategory::Neutral);
    }

    #[test]
    fn test_intensity_multiplier() {
        let classifier = classifier();
        assert_eq!(classifier.classify("muy feliz").unwrap().intensity, 1.5);
        assert_eq!(classifier.classify("muy muy feliz").unwrap().intensity, 2.0);
        assert_eq!(classifier.classify("algo feliz").unwrap().intensity, 0.8);
        assert_eq!(classifier.classify("feliz").unwrap().intensity, 1.0);

        let result = classifier.classify("super feliz").unwrap();
        assert_eq!(result.category, MoodCategory::Motivated);
        assert_eq!(result.scaled_confidence(), 1.0);
    }

    #[test]
    fn test_empty_input_is_no_match() {
        let classifier = classifier();
        assert!(classifier.classify("").is_none());
        assert!(classifier.classify("  ¡¿?! ").is_none());
    }

    #[test]
    fn test_parse_category_names() {
        assert_eq!("Motivado".parse::<MoodCategory>().unwrap(), MoodCategory::Motivated);
        assert_eq!("tired".parse::<MoodCategory>().unwrap(), MoodCategory::Tired);
        assert!("feliz".parse::<MoodCategory>().is_err());
    }
}
