use std::collections::HashMap;
use rand::rngs::StdRng;
use rand::seq::IndexedRandom;
use rand::SeedableRng;

use crate::error::{AgentError, Result};
use crate::mood::MoodCategory;
use crate::time::TimeCategory;

/// Suggestions for every (mood, time) pair.
#[derive(Debug, Clone)]
pub struct RecommendationTable {
    entries: HashMap<(MoodCategory, TimeCategory), Vec<String>>,
}

impl RecommendationTable {
    /// Rejects tables with a missing or empty cell.
    pub fn new(entries: HashMap<(MoodCategory, TimeCategory), Vec<String>>) -> Result<Self> {
        for mood in MoodCategory::ALL {
            for time in TimeCategory::ALL {
                if entries.get(&(mood, time)).map_or(true, |list| list.is_empty()) {
                    return Err(AgentError::Config(format!(
                        "no recommendations for ({}, {})",
                        mood, time
                    )));
                }
            }
        }
        Ok(RecommendationTable { entries })
    }

    pub fn builtin() -> Self {
        let rows: [(MoodCategory, TimeCategory, [&str; 2]); 9] = [
            (MoodCategory::Motivated, TimeCategory::Short, [
                "Repasa un tema complejo durante 30 minutos",
                "Haz 3 ejercicios de práctica",
            ]),
            (MoodCategory::Motivated, TimeCategory::Medium, [
                "Estudia un tema nuevo durante 1 hora",
                "Completa una tarea pendiente",
            ]),
            (MoodCategory::Motivated, TimeCategory::Long, [
                "Prepara una presentación completa",
                "Realiza un proyecto práctico",
            ]),
            (MoodCategory::Neutral, TimeCategory::Short, [
                "Lee un artículo corto",
                "Revisa tus apuntes",
            ]),
            (MoodCategory::Neutral, TimeCategory::Medium, [
                "Haz un resumen de un tema",
                "Practica con ejercicios básicos",
            ]),
            (MoodCategory::Neutral, TimeCategory::Long, [
                "Estudia dos temas relacionados",
                "Prepara un ensayo",
            ]),
            (MoodCategory::Tired, TimeCategory::Short, [
                "Toma un descanso de 15 minutos y luego repasa algo ligero",
                "Escucha una clase grabada",
            ]),
            (MoodCategory::Tired, TimeCategory::Medium, [
                "Alterna entre estudio y descansos",
                "Haz ejercicios sencillos",
            ]),
            (MoodCategory::Tired, TimeCategory::Long, [
                "Divide tu estudio en bloques de 30 minutos",
                "Combina teoría con práctica ligera",
            ]),
        ];

        let entries = rows
            .into_iter()
            .map(|(mood, time, items)| ((mood, time), items.iter().map(|s| s.to_string()).collect()))
            .collect();
        RecommendationTable { entries }
    }

    pub fn get(&self, mood: MoodCategory, time: TimeCategory) -> &[String] {
        self.entries
            .get(&(mood, time))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

pub const DEFAULT_TIPS: &[&str] = &[
    "💡 Recuerda tomar descansos cortos cada 25-30 minutos",
    "💪 La constancia es más importante que la intensidad",
    "🎯 Establece metas pequeñas y alcanzables",
    "📚 Alterna entre diferentes materias para mantener el interés",
    "🌟 Celebra tus pequeños logros",
];

pub struct RecommendationSelector {
    table: RecommendationTable,
    tips: Vec<String>,
    rng: StdRng,
}

impl RecommendationSelector {
    pub fn new(table: RecommendationTable, tips: Vec<String>, rng: StdRng) -> Result<Self> {
        if tips.is_empty() {
            return Err(AgentError::Config("tip list is empty".to_string()));
        }
        Ok(RecommendationSelector { table, tips, rng })
    }

    fn builtin(rng: StdRng) -> Self {
        RecommendationSelector {
            table: RecommendationTable::builtin(),
            tips: DEFAULT_TIPS.iter().map(|s| s.to_string()).collect(),
            rng,
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self::builtin(StdRng::seed_from_u64(seed))
    }

    pub fn from_os_rng() -> Self {
        Self::builtin(StdRng::from_os_rng())
    }

    /// Seeded when a seed is configured, OS entropy otherwise.
    pub fn from_seed_option(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::from_os_rng(),
        }
    }

    pub fn recommend(&self, mood: MoodCategory, time: TimeCategory) -> &[String] {
        self.table.get(mood, time)
    }

    pub fn random_tip(&mut self) -> &str {
        self.tips
            .choose(&mut self.rng)
            .map(String::as_str)
            .unwrap_or_default()
    }
}

/// Advice tied to the exact number of minutes, not just the category.
pub fn time_specific(minutes: u32) -> Vec<String> {
    if minutes <= 30 {
        vec![
            format!("💡 {} minutos son ideales para una sesión de repaso rápido", minutes),
            "🔍 Enfócate en un solo tema específico".to_string(),
        ]
    } else if minutes <= 90 {
        vec![
            format!("💡 Con {} minutos puedes hacer una sesión completa", minutes),
            "⏱️ Considera tomar un descanso de 5 minutos a la mitad".to_string(),
        ]
    } else {
        let hours = minutes as f64 / 60.0;
        vec![
            format!("💡 {:.1} horas te permiten cubrir varios temas", hours),
            "⏱️ Recuerda tomar descansos de 10-15 minutos cada hora".to_string(),
            "📋 Haz una lista de temas para aprovechar mejor el tiempo".to_string(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_total() {
        let selector = RecommendationSelector::seeded(1);
        for mood in MoodCategory::ALL {
            for time in TimeCategory::ALL {
                assert!(!selector.recommend(mood, time).is_empty(), "({}, {})", mood, time);
            }
        }
    }

    #[test]
    fn test_lookup_matches_table() {
        let selector = RecommendationSelector::seeded(1);
        let recs = selector.recommend(MoodCategory::Tired, TimeCategory::Short);
        assert_eq!(recs[0], "Toma un descanso de 15 minutos y luego repasa algo ligero");
    }

    #[test]
    fn test_partial_table_is_rejected() {
        let mut entries = HashMap::new();
        entries.insert(
            (MoodCategory::Motivated, TimeCategory::Short),
            vec!["Algo".to_string()],
        );
        assert!(RecommendationTable::new(entries).is_err());
    }

    #[test]
    fn test_seeded_tips_are_reproducible() {
        let mut a = RecommendationSelector::seeded(42);
        let mut b = RecommendationSelector::seeded(42);

        let from_a: Vec<String> = (0..10).map(|_| a.random_tip().to_string()).collect();
        let from_b: Vec<String> = (0..10).map(|_| b.random_tip().to_string()).collect();
        assert_eq!(from_a, from_b);
        assert!(from_a.iter().all(|tip| DEFAULT_TIPS.contains(&tip.as_str())));
    }

    #[test]
    fn test_empty_tip_list_is_rejected() {
        let result = RecommendationSelector::new(
            RecommendationTable::builtin(),
            Vec::new(),
            StdRng::seed_from_u64(0),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_time_specific_advice() {
        assert!(time_specific(20)[0].contains("20 minutos"));
        assert_eq!(time_specific(60).len(), 2);

        let long = time_specific(150);
        assert_eq!(long.len(), 3);
        assert!(long[0].contains("2.5 horas"));
    }
}
