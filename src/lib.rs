pub mod cli;
pub mod config;
pub mod dialogue;
pub mod error;
pub mod history;
pub mod logging;
pub mod mood;
pub mod nlp;
pub mod recommend;
pub mod shell;
pub mod time;

pub use error::{AgentError, Result};
