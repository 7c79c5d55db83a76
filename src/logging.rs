use tracing_subscriber::{fmt, EnvFilter};

pub const LOG_ENV: &str = "STUDY_AGENT_LOG";

/// Logs go to stderr; stdout belongs to the dialogue.
pub fn init() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));

    // A second init (tests, embedding) keeps the first subscriber.
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
