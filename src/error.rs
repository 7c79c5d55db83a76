use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AgentError {
    /// The language analyzer could not be initialized. Fatal at startup.
    #[error("Language analyzer unavailable: {reason}\n{remediation}")]
    DependencyUnavailable { reason: String, remediation: String },

    #[error("Malformed session file {}: {source}", path.display())]
    MalformedState {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown category: {0}")]
    UnknownCategory(String),
}

impl AgentError {
    pub fn dependency_unavailable(reason: impl Into<String>) -> Self {
        AgentError::DependencyUnavailable {
            reason: reason.into(),
            remediation: "Reinstall study-agent, or point `lexicon_path` in config.json \
                          to a valid sentiment lexicon file."
                .to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AgentError>;
