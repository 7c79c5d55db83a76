use clap::Parser;
use colored::*;

use study_agent::cli::{self, Args};
use study_agent::{logging, AgentError};

fn main() {
    let args = Args::parse();
    logging::init();

    if let Err(e) = cli::run(args) {
        match e.downcast_ref::<AgentError>() {
            Some(AgentError::DependencyUnavailable { reason, remediation }) => {
                eprintln!("{} {}", "❌ No se pudo iniciar el analizador:".red().bold(), reason);
                eprintln!("{}", remediation.yellow());
            }
            _ => eprintln!("{}: {:#}", "Error".red().bold(), e),
        }
        std::process::exit(1);
    }
}
