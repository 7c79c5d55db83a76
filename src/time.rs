use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AgentError, Result};

static CLOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9]{1,2}):([0-9]{1,2})").expect("valid regex"));
static DAYS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9]+)\s*(?:días|dias|día|dia|d)\b").expect("valid regex"));
static HOURS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9]+)\s*(?:horas|hora|h)\b").expect("valid regex"));
static MINUTES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9]+)\s*(?:minutos|minuto|min)\b").expect("valid regex"));
static NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[0-9]+").expect("valid regex"));
static DAY_WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?:días|dias|día|dia|d)\b").expect("valid regex"));
static HOUR_WORD_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\bhoras?\b|\b[0-9]+\s*h\b").expect("valid regex"));

const SHORT_WORDS: &[&str] = &["poco", "breve", "corto", "rapido", "rápido"];
const MEDIUM_WORDS: &[&str] = &["medio", "regular", "moderado"];
const LONG_WORDS: &[&str] = &["mucho", "bastante", "largo"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TimeCategory {
    #[serde(rename = "poco")]
    Short,
    #[serde(rename = "medio")]
    Medium,
    #[serde(rename = "mucho")]
    Long,
}

impl TimeCategory {
    pub const ALL: [TimeCategory; 3] = [TimeCategory::Short, TimeCategory::Medium, TimeCategory::Long];

    /// The one threshold rule: <=30 Short, <=90 Medium, otherwise Long.
    pub fn from_minutes(minutes: u32) -> Self {
        if minutes <= 30 {
            TimeCategory::Short
        } else if minutes <= 90 {
            TimeCategory::Medium
        } else {
            TimeCategory::Long
        }
    }

    pub fn default_minutes(&self) -> u32 {
        match self {
            TimeCategory::Short => 25,
            TimeCategory::Medium => 60,
            TimeCategory::Long => 120,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TimeCategory::Short => "poco",
            TimeCategory::Medium => "medio",
            TimeCategory::Long => "mucho",
        }
    }

    fn estimate_description(&self) -> &'static str {
        match self {
            TimeCategory::Short => "poco tiempo (estimado)",
            TimeCategory::Medium => "tiempo medio (estimado)",
            TimeCategory::Long => "mucho tiempo (estimado)",
        }
    }
}

impl fmt::Display for TimeCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for TimeCategory {
    type Err = AgentError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "poco" | "short" => Ok(TimeCategory::Short),
            "medio" | "medium" => Ok(TimeCategory::Medium),
            "mucho" | "long" => Ok(TimeCategory::Long),
            other => Err(AgentError::UnknownCategory(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeResult {
    pub category: TimeCategory,
    /// Always >= 1.
    pub minutes: u32,
    pub description: String,
}

impl TimeResult {
    fn from_minutes(minutes: u32, description: String) -> Option<Self> {
        if minutes == 0 {
            return None;
        }
        Some(TimeResult {
            category: TimeCategory::from_minutes(minutes),
            minutes,
            description,
        })
    }

    fn estimate(category: TimeCategory, description: String) -> Self {
        TimeResult {
            category,
            minutes: category.default_minutes(),
            description,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TimePattern {
    regex: Regex,
    minutes: u32,
}

impl TimePattern {
    pub fn new(pattern: &str, minutes: u32) -> Result<Self> {
        let regex = Regex::new(pattern)
            .map_err(|e| AgentError::Config(format!("invalid time pattern '{}': {}", pattern, e)))?;
        Ok(TimePattern { regex, minutes })
    }

    pub fn minutes(&self) -> u32 {
        self.minutes
    }
}

/// Digit-free phrases, tried Short, Medium, Long and in order within each.
#[derive(Debug, Clone)]
pub struct TimePatternTable {
    entries: Vec<(TimeCategory, Vec<TimePattern>)>,
}

impl TimePatternTable {
    pub fn new(mut entries: Vec<(TimeCategory, Vec<TimePattern>)>) -> Self {
        entries.sort_by_key(|(category, _)| *category);
        TimePatternTable { entries }
    }

    pub fn builtin() -> Result<Self> {
        let table = [
            (TimeCategory::Short, vec![
                (r"\bmedia\s+hora\b", 30),
                (r"\bcuarto\s+de\s+hora\b", 15),
            ]),
            (TimeCategory::Medium, vec![
                (r"\bhora\s+y\s+media\b", 90),
                (r"\buna\s+hora\b", 60),
            ]),
            (TimeCategory::Long, vec![
                (r"\bun\s+par\s+de\s+horas\b", 120),
                (r"\btoda\s+la\s+(?:tarde|mañana|noche)\b", 240),
                (r"\btodo\s+el\s+d[ií]a\b", 480),
            ]),
        ];

        let mut entries = Vec::new();
        for (category, patterns) in table {
            let compiled = patterns
                .into_iter()
                .map(|(pattern, minutes)| TimePattern::new(pattern, minutes))
                .collect::<Result<Vec<_>>>()?;
            entries.push((category, compiled));
        }
        Ok(Self::new(entries))
    }

    pub fn entries(&self) -> &[(TimeCategory, Vec<TimePattern>)] {
        &self.entries
    }

    fn find(&self, text: &str) -> Option<TimeResult> {
        self.entries.iter().find_map(|(category, patterns)| {
            patterns.iter().find_map(|pattern| {
                pattern.regex.find(text).map(|m| TimeResult {
                    category: *category,
                    minutes: pattern.minutes,
                    description: format!("{} minutos ('{}')", pattern.minutes, m.as_str()),
                })
            })
        })
    }
}

/// ASCII digit run as a count, saturating at `u32::MAX`.
fn count(digits: &str) -> u32 {
    digits.parse().unwrap_or(u32::MAX)
}

pub struct TimeParser {
    patterns: TimePatternTable,
}

impl TimeParser {
    pub fn new(patterns: TimePatternTable) -> Self {
        TimeParser { patterns }
    }

    pub fn builtin() -> Result<Self> {
        Ok(Self::new(TimePatternTable::builtin()?))
    }

    /// First matching rule wins. `None` when nothing usable was found or
    /// the winning rule produced zero minutes.
    pub fn parse(&self, text: &str) -> Option<TimeResult> {
        let original = text;
        let text = text.trim().to_lowercase();

        let result = self.parse_lowered(&text, original);
        debug!("time: {:?} from {:?}", result, original);
        result
    }

    fn parse_lowered(&self, text: &str, original: &str) -> Option<TimeResult> {
        // Category words typed on their own
        if let Some(category) = TimeCategory::ALL.into_iter().find(|c| c.label() == text) {
            let minutes = category.default_minutes();
            return Some(TimeResult::estimate(
                category,
                format!("{} minutos (estimado para '{}')", minutes, text),
            ));
        }

        if let Some(caps) = CLOCK_RE.captures(text) {
            let hours = count(&caps[1]);
            let mins = count(&caps[2]);
            let minutes = hours.saturating_mul(60).saturating_add(mins);
            return TimeResult::from_minutes(minutes, format!("{}h {}m", hours, mins));
        }

        if let Some(caps) = DAYS_RE.captures(text) {
            let days = count(&caps[1]);
            let minutes = days.saturating_mul(24 * 60);
            return TimeResult::from_minutes(minutes, format!("{} día(s)", days));
        }

        if let Some(caps) = HOURS_RE.captures(text) {
            let hours = count(&caps[1]);
            let minutes = hours.saturating_mul(60);
            return TimeResult::from_minutes(minutes, format!("{} hora(s)", hours));
        }

        if let Some(caps) = MINUTES_RE.captures(text) {
            let minutes = count(&caps[1]);
            return TimeResult::from_minutes(minutes, format!("{} minutos", minutes));
        }

        if let Some(m) = NUMBER_RE.find(text) {
            let value = count(m.as_str());
            let minutes = if DAY_WORD_RE.is_match(text) {
                value.saturating_mul(24 * 60)
            } else if HOUR_WORD_RE.is_match(text) {
                value.saturating_mul(60)
            } else {
                value
            };
            return TimeResult::from_minutes(
                minutes,
                format!("{} minutos (interpretado de '{}')", minutes, original),
            );
        }

        if let Some(result) = self.patterns.find(text) {
            return Some(result);
        }

        let keyword_groups = [
            (TimeCategory::Short, SHORT_WORDS),
            (TimeCategory::Medium, MEDIUM_WORDS),
            (TimeCategory::Long, LONG_WORDS),
        ];
        keyword_groups
            .iter()
            .find(|(_, words)| words.iter().any(|word| text.contains(word)))
            .map(|(category, _)| TimeResult::estimate(*category, category.estimate_description().to_string()))
    }
}
