//! Linguistic analysis used by the mood classifier.
//!
//! The classifier only sees the [`LanguageAnalyzer`] trait: tokens, lemmas,
//! a shallow dependency list and a polarity score. [`LexiconAnalyzer`] is the
//! implementation shipped with the binary.

mod lexicon;

pub use lexicon::{Lexicon, LexiconAnalyzer};

/// Words that negate the word that follows them.
pub const NEGATION_MARKERS: &[&str] = &["no", "nunca", "jamás", "jamas", "tampoco", "ni"];

/// Degree adverbs attached to the following word.
pub const DEGREE_ADVERBS: &[&str] = &[
    "muy", "super", "súper", "demasiado", "extremadamente", "bastante", "algo", "poco", "tan",
    "más", "mas",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Relation {
    Neg,
    Advmod,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    pub relation: Relation,
    /// Token index of the modified word.
    pub head: usize,
    /// Token index of the modifier.
    pub dependent: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Analysis {
    pub tokens: Vec<String>,
    pub lemmas: Vec<String>,
    pub dependencies: Vec<Dependency>,
}

impl Analysis {
    pub fn has_relation(&self, relation: Relation) -> bool {
        self.dependencies.iter().any(|dep| dep.relation == relation)
    }
}

pub trait LanguageAnalyzer: Send + Sync {
    fn analyze(&self, text: &str) -> Analysis;

    /// Polarity in [-1, 1]. Negation is not applied here.
    fn sentiment(&self, text: &str) -> f32;

    fn name(&self) -> &str;
}

/// Lowercases and drops everything that is not a letter, digit or whitespace.
/// Accented letters are letters and survive.
pub fn normalize(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect()
}

pub fn tokenize(text: &str) -> Vec<String> {
    normalize(text).split_whitespace().map(str::to_string).collect()
}

/// Attaches negation markers and degree adverbs to the next content word.
pub(crate) fn attach_modifiers(tokens: &[String]) -> Vec<Dependency> {
    let mut dependencies = Vec::new();

    for (i, token) in tokens.iter().enumerate() {
        let relation = if NEGATION_MARKERS.contains(&token.as_str()) {
            Relation::Neg
        } else if DEGREE_ADVERBS.contains(&token.as_str()) {
            Relation::Advmod
        } else {
            continue;
        };

        let head = tokens
            .iter()
            .enumerate()
            .skip(i + 1)
            .find(|(_, t)| {
                !NEGATION_MARKERS.contains(&t.as_str()) && !DEGREE_ADVERBS.contains(&t.as_str())
            })
            .map(|(j, _)| j);

        if let Some(head) = head {
            dependencies.push(Dependency { relation, head, dependent: i });
        }
    }

    dependencies
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_keeps_accents_and_digits() {
        assert_eq!(normalize("¡Estoy MUY cansado, sin energía! 2h"), "estoy muy cansado sin energía 2h");
        assert_eq!(normalize("¿...?"), "");
    }

    #[test]
    fn test_negation_attaches_to_next_content_word() {
        let tokens = tokenize("no estoy nada bien");
        let deps = attach_modifiers(&tokens);
        assert_eq!(deps, vec![Dependency { relation: Relation::Neg, head: 1, dependent: 0 }]);
    }

    #[test]
    fn test_stacked_modifiers_share_head() {
        let tokens = tokenize("no muy motivado");
        let deps = attach_modifiers(&tokens);
        assert_eq!(deps.len(), 2);
        assert!(deps.iter().all(|d| d.head == 2));
    }

    #[test]
    fn test_preposition_sin_is_not_negation() {
        let tokens = tokenize("feliz sin prisa");
        assert!(attach_modifiers(&tokens).is_empty());
    }

    #[test]
    fn test_trailing_marker_has_no_head() {
        let tokens = tokenize("creo que no");
        assert!(attach_modifiers(&tokens).is_empty());
    }
}
