use tracing::debug;

use crate::config::Config;
use crate::history::SessionRecord;
use crate::mood::{MoodCategory, MoodClassifier, MoodResult};
use crate::recommend::{time_specific, RecommendationSelector};
use crate::time::TimeParser;

const MOOD_QUESTION: &str = "¿Cómo te sientes ahora?";
const TIME_QUESTION: &str = "¿Cuánto tiempo tienes para estudiar?";

#[derive(Debug, Clone, Copy)]
pub struct DialogueSettings {
    pub max_session_minutes: u32,
    /// Scaled mood confidence above which the emphatic acknowledgement is used.
    pub high_confidence: f32,
}

impl Default for DialogueSettings {
    fn default() -> Self {
        DialogueSettings {
            max_session_minutes: 24 * 60,
            high_confidence: 0.6,
        }
    }
}

impl From<&Config> for DialogueSettings {
    fn from(config: &Config) -> Self {
        DialogueSettings {
            max_session_minutes: config.max_session_minutes,
            high_confidence: config.high_confidence,
        }
    }
}

#[derive(Debug, Clone)]
pub enum DialogueState {
    AwaitingMood,
    AwaitingTime { mood: MoodResult },
}

/// Agent output for one user line.
#[derive(Debug, Default)]
pub struct Turn {
    pub lines: Vec<String>,
    /// Set when the line completed a mood + time exchange.
    pub record: Option<SessionRecord>,
}

impl Turn {
    fn say(lines: &[&str]) -> Self {
        Turn {
            lines: lines.iter().map(|l| l.to_string()).collect(),
            record: None,
        }
    }
}

pub struct Dialogue {
    classifier: MoodClassifier,
    parser: TimeParser,
    selector: RecommendationSelector,
    settings: DialogueSettings,
    state: DialogueState,
}

impl Dialogue {
    pub fn new(
        classifier: MoodClassifier,
        parser: TimeParser,
        selector: RecommendationSelector,
        settings: DialogueSettings,
    ) -> Self {
        Dialogue {
            classifier,
            parser,
            selector,
            settings,
            state: DialogueState::AwaitingMood,
        }
    }

    pub fn greeting() -> Vec<String> {
        vec![
            "¡Hola! Soy tu Agente de Estudio 🎓".to_string(),
            "Cuéntame, ¿cómo te sientes hoy?".to_string(),
        ]
    }

    pub fn state(&self) -> &DialogueState {
        &self.state
    }

    pub fn handle(&mut self, input: &str) -> Turn {
        let input = input.trim();
        if input.is_empty() {
            return Turn::default();
        }

        match &self.state {
            DialogueState::AwaitingMood => self.handle_mood(input),
            DialogueState::AwaitingTime { mood } => {
                let mood = mood.category;
                self.handle_time(mood, input)
            }
        }
    }

    fn handle_mood(&mut self, input: &str) -> Turn {
        let Some(result) = self.classifier.classify(input) else {
            return Turn::say(&[
                "Disculpa, no pude entender bien cómo te sientes. ¿Podrías decirlo de otra forma?",
                "Puedes decirme si te sientes motivado, normal, cansado, o describir tu estado en tus propias palabras.",
            ]);
        };

        debug!("mood turn: {}", result.description);
        let ack = acknowledgement(
            result.category,
            result.scaled_confidence() > self.settings.high_confidence,
        );
        self.state = DialogueState::AwaitingTime { mood: result };

        Turn {
            lines: vec![format!("{}{}", ack, TIME_QUESTION)],
            record: None,
        }
    }

    fn handle_time(&mut self, mood: MoodCategory, input: &str) -> Turn {
        let Some(time) = self.parser.parse(input) else {
            return Turn::say(&[
                "Disculpa, no pude entender bien cuánto tiempo tienes. ¿Podrías decirlo de otra forma?",
                "Puedes decirlo en minutos (ej: 30 minutos) o en horas (ej: 1:30, 2 horas)",
            ]);
        };

        debug!("time turn: {}", time.description);
        if time.minutes > self.settings.max_session_minutes {
            return Turn::say(&[
                "¡Wow! Ese es mucho tiempo. Te sugiero dividirlo en sesiones más cortas para ser más efectivo.",
                "¿Qué te parece si empezamos con una sesión más corta?",
            ]);
        }

        let recommendations = self.selector.recommend(mood, time.category).to_vec();
        let mut lines = vec!["🎯 Basado en tu estado de ánimo y tiempo disponible, te recomiendo:".to_string()];
        lines.extend(
            recommendations
                .iter()
                .cloned()
                .chain(time_specific(time.minutes))
                .enumerate()
                .map(|(i, rec)| format!("   {}. {}", i + 1, rec)),
        );
        lines.push(self.selector.random_tip().to_string());
        lines.push(MOOD_QUESTION.to_string());

        self.state = DialogueState::AwaitingMood;
        Turn {
            lines,
            record: Some(SessionRecord::new(mood, time.category, recommendations)),
        }
    }
}

fn acknowledgement(mood: MoodCategory, emphatic: bool) -> &'static str {
    match (mood, emphatic) {
        (MoodCategory::Motivated, true) => "¡Excelente! Me alegra mucho ver que estás tan motivado. ",
        (MoodCategory::Neutral, true) => "Entiendo, estás en un estado neutral y equilibrado. ",
        (MoodCategory::Tired, true) => "Comprendo perfectamente que estés cansado, es normal sentirse así. ",
        (MoodCategory::Motivated, false) => "¡Me alegro que tengas algo de motivación! ",
        (MoodCategory::Neutral, false) => "Entiendo que te sientas así. ",
        (MoodCategory::Tired, false) => "Comprendo que no estés en tu mejor momento. ",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use crate::nlp::LexiconAnalyzer;
    use crate::recommend::DEFAULT_TIPS;
    use crate::time::TimeCategory;

    fn dialogue() -> Dialogue {
        let analyzer = Arc::new(LexiconAnalyzer::load(None).unwrap());
        Dialogue::new(
            MoodClassifier::with_defaults(analyzer),
            TimeParser::builtin().unwrap(),
            RecommendationSelector::seeded(7),
            DialogueSettings::default(),
        )
    }

    #[test]
    fn test_blank_input_is_ignored() {
        let mut dialogue = dialogue();
        let turn = dialogue.handle("   ");
        assert!(turn.lines.is_empty());
        assert!(matches!(dialogue.state(), DialogueState::AwaitingMood));
    }

    #[test]
    fn test_unclassified_mood_reprompts() {
        let mut dialogue = dialogue();
        let turn = dialogue.handle("¿¡...!?");
        assert_eq!(turn.lines.len(), 2);
        assert!(turn.lines[0].starts_with("Disculpa"));
        assert!(matches!(dialogue.state(), DialogueState::AwaitingMood));
    }

    #[test]
    fn test_acknowledgement_strength() {
        let mut dialogue = dialogue();
        let turn = dialogue.handle("Estoy muy motivado y con ganas");
        assert!(turn.lines[0].starts_with("¡Excelente!"));
        assert!(turn.lines[0].ends_with(TIME_QUESTION));

        let mut dialogue = self::dialogue();
        let turn = dialogue.handle("estoy cansado");
        assert!(turn.lines[0].starts_with("Comprendo que no estés"));
    }

    #[test]
    fn test_full_exchange_produces_record() {
        let mut dialogue = dialogue();
        dialogue.handle("estoy cansado");
        assert!(matches!(dialogue.state(), DialogueState::AwaitingTime { .. }));

        let turn = dialogue.handle("30 minutos");
        let record = turn.record.expect("completed exchange");
        assert_eq!(record.estado_animo, MoodCategory::Tired);
        assert_eq!(record.tiempo, TimeCategory::Short);
        assert_eq!(record.recomendaciones.len(), 2);

        assert!(turn.lines[1].starts_with("   1. "));
        assert!(turn.lines.iter().any(|l| l.contains("30 minutos son ideales")));
        let tip = &turn.lines[turn.lines.len() - 2];
        assert!(DEFAULT_TIPS.contains(&tip.as_str()));
        assert_eq!(turn.lines.last().unwrap(), MOOD_QUESTION);
        assert!(matches!(dialogue.state(), DialogueState::AwaitingMood));
    }

    #[test]
    fn test_excessive_time_keeps_state() {
        let mut dialogue = dialogue();
        dialogue.handle("normal");

        let turn = dialogue.handle("5 dias");
        assert!(turn.record.is_none());
        assert!(turn.lines[0].starts_with("¡Wow!"));
        assert!(matches!(dialogue.state(), DialogueState::AwaitingTime { .. }));

        let turn = dialogue.handle("1:30");
        assert_eq!(turn.record.unwrap().tiempo, TimeCategory::Medium);
    }

    #[test]
    fn test_excessive_time_boundary() {
        let mut dialogue = dialogue();
        dialogue.handle("normal");

        let turn = dialogue.handle("24:01");
        assert!(turn.record.is_none());
        assert!(turn.lines[0].starts_with("¡Wow!"));

        let turn = dialogue.handle("1 dia");
        assert_eq!(turn.record.unwrap().tiempo, TimeCategory::Long);
        assert!(matches!(dialogue.state(), DialogueState::AwaitingMood));
    }

    #[test]
    fn test_huge_counts_take_excessive_path() {
        let mut dialogue = dialogue();
        dialogue.handle("normal");

        for text in ["99999999999 minutos", "5000000 dias"] {
            let turn = dialogue.handle(text);
            assert!(turn.record.is_none(), "text: {}", text);
            assert!(turn.lines[0].starts_with("¡Wow!"), "text: {}", text);
        }
    }

    #[test]
    fn test_unparsed_time_reprompts() {
        let mut dialogue = dialogue();
        dialogue.handle("motivado");

        let turn = dialogue.handle("xyz qwerty");
        assert!(turn.record.is_none());
        assert!(turn.lines[1].contains("1:30"));
        assert!(matches!(dialogue.state(), DialogueState::AwaitingTime { .. }));
    }
}
