use std::collections::HashMap;
use std::path::{Path, PathBuf};
use chrono::{Local, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{AgentError, Result};
use crate::mood::MoodCategory;
use crate::time::TimeCategory;

/// One completed mood + time exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    #[serde(with = "fecha_format")]
    pub fecha: NaiveDateTime,
    pub estado_animo: MoodCategory,
    pub tiempo: TimeCategory,
    pub recomendaciones: Vec<String>,
}

impl SessionRecord {
    pub fn new(mood: MoodCategory, time: TimeCategory, recommendations: Vec<String>) -> Self {
        let now = Local::now().naive_local();
        let fecha = now
            .with_second(0)
            .and_then(|t| t.with_nanosecond(0))
            .unwrap_or(now);

        SessionRecord {
            fecha,
            estado_animo: mood,
            tiempo: time,
            recomendaciones: recommendations,
        }
    }
}

mod fecha_format {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d %H:%M";

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, FORMAT).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct HistoryFile {
    historial: Vec<SessionRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryStats {
    pub total_sesiones: usize,
    pub estados_animo: HashMap<MoodCategory, usize>,
    pub tiempos_estudio: HashMap<TimeCategory, usize>,
}

impl HistoryStats {
    pub fn mood_count(&self, mood: MoodCategory) -> usize {
        self.estados_animo.get(&mood).copied().unwrap_or(0)
    }

    pub fn time_count(&self, time: TimeCategory) -> usize {
        self.tiempos_estudio.get(&time).copied().unwrap_or(0)
    }
}

/// Append-only session log persisted as `{ "historial": [...] }`.
pub struct SessionHistory {
    path: PathBuf,
    records: Vec<SessionRecord>,
}

impl SessionHistory {
    /// A missing file is an empty history. A corrupt one is logged and
    /// discarded; it is overwritten on the next append.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let records = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            match serde_json::from_str::<HistoryFile>(&content) {
                Ok(file) => file.historial,
                Err(source) => {
                    let err = AgentError::MalformedState { path: path.clone(), source };
                    warn!("{}; starting with an empty history", err);
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };

        info!("Loaded {} session records from {}", records.len(), path.display());
        Ok(SessionHistory { path, records })
    }

    /// The record is kept only if the file was written.
    pub fn append(&mut self, record: SessionRecord) -> Result<()> {
        self.records.push(record);
        if let Err(e) = self.save() {
            self.records.pop();
            return Err(e);
        }
        Ok(())
    }

    fn save(&self) -> Result<()> {
        #[derive(Serialize)]
        struct Data<'a> {
            historial: &'a [SessionRecord],
        }

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(&Data { historial: &self.records })?;
        std::fs::write(&self.path, content)?;
        info!("Saved {} session records to {}", self.records.len(), self.path.display());
        Ok(())
    }

    pub fn records(&self) -> &[SessionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn stats(&self) -> Option<HistoryStats> {
        if self.records.is_empty() {
            return None;
        }

        let mut estados_animo = HashMap::new();
        let mut tiempos_estudio = HashMap::new();
        for record in &self.records {
            *estados_animo.entry(record.estado_animo).or_insert(0) += 1;
            *tiempos_estudio.entry(record.tiempo).or_insert(0) += 1;
        }

        Some(HistoryStats {
            total_sesiones: self.records.len(),
            estados_animo,
            tiempos_estudio,
        })
    }
}
