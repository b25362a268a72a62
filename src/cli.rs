use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::warn;

use crate::answers::{load_photo, AnswerSheet};
use crate::config::Config;
use crate::core::{FormEngine, ValidationError};
use crate::transport::HttpTransport;

#[derive(Parser)]
#[command(name = "sentia")]
#[command(about = "Employee wellbeing survey intake")]
#[command(version)]
pub struct Args {
    /// Configuration directory (defaults to the user config dir)
    #[arg(long, global = true)]
    pub config_dir: Option<PathBuf>,

    /// Debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print an empty answers file
    Template,
    /// Load answers, validate them and show the payload without sending it
    Validate {
        /// Answers file (JSON object keyed by field name)
        #[arg(long)]
        answers: PathBuf,
        /// Identification photo
        #[arg(long)]
        photo: Option<PathBuf>,
    },
    /// Load answers and submit them to the intake endpoint
    Submit {
        /// Answers file (JSON object keyed by field name)
        #[arg(long)]
        answers: PathBuf,
        /// Identification photo
        #[arg(long)]
        photo: Option<PathBuf>,
        /// Intake URL, overrides the configuration
        #[arg(long)]
        endpoint: Option<String>,
    },
    /// Show the resolved configuration
    Config,
}

/// Build an engine from an answers file and an optional photo, printing
/// every answer that was dropped.
fn load_form(config: &Config, answers: &Path, photo: Option<&Path>) -> Result<FormEngine> {
    let sheet = AnswerSheet::load(answers)?;
    let mut engine = FormEngine::new().enforce_required_fields(config.enforce_required_fields);

    for ignored in sheet.apply(&mut engine) {
        warn!(field = %ignored.key, reason = %ignored.reason, "answer ignored");
        println!("⚠️  Ignorado {}: {}", ignored.key, ignored.reason);
    }

    if let Some(path) = photo {
        let handle = engine.set_photo(load_photo(path)?);
        println!("🖼️  Foto seleccionada: {}", handle.url());
    }

    Ok(engine)
}

pub fn handle_template() -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&AnswerSheet::template())?);
    Ok(())
}

/// Returns whether the answers would be accepted for submission.
pub fn handle_validate(config_dir: Option<PathBuf>, answers: PathBuf, photo: Option<PathBuf>) -> Result<bool> {
    let config = Config::new(config_dir)?;
    let engine = load_form(&config, &answers, photo.as_deref())?;

    if let Some(age) = engine.record().age() {
        println!("🎂 Edad: {}", age);
    }

    let valid = report_validation(engine.validate());
    println!("{}", serde_json::to_string_pretty(&engine.build_payload().summary())?);
    Ok(valid)
}

fn report_validation(result: std::result::Result<(), ValidationError>) -> bool {
    match result {
        Ok(()) => {
            println!("✅ Formulario listo para enviar");
            true
        }
        Err(error) => {
            println!("❌ {}", error);
            false
        }
    }
}

/// Returns whether the intake service accepted the form.
pub async fn handle_submit(
    config_dir: Option<PathBuf>,
    answers: PathBuf,
    photo: Option<PathBuf>,
    endpoint: Option<String>,
) -> Result<bool> {
    let mut config = Config::new(config_dir)?;
    config.apply_endpoint_override(endpoint);

    let mut engine = load_form(&config, &answers, photo.as_deref())?;
    let transport = HttpTransport::from_config(&config)?;

    println!("📤 Enviando a {}", transport.endpoint());
    let outcome = engine.submit(&transport).await;

    if outcome.is_success() {
        println!("✅ {}", outcome);
    } else {
        println!("❌ {}", outcome);
    }
    Ok(outcome.is_success())
}

pub fn handle_config(config_dir: Option<PathBuf>) -> Result<()> {
    let config = Config::new(config_dir)?;
    println!("📁 {}", config.config_file().display());
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_parse_submit() {
        let args = Args::parse_from([
            "sentia",
            "--verbose",
            "submit",
            "--answers",
            "answers.json",
            "--photo",
            "id.jpg",
            "--endpoint",
            "http://localhost:5678/webhook",
        ]);
        assert!(args.verbose);
        match args.command {
            Commands::Submit { answers, photo, endpoint } => {
                assert_eq!(answers, PathBuf::from("answers.json"));
                assert_eq!(photo, Some(PathBuf::from("id.jpg")));
                assert_eq!(endpoint.as_deref(), Some("http://localhost:5678/webhook"));
            }
            _ => panic!("expected submit"),
        }
    }

    #[test]
    fn test_validate_requires_answers() {
        assert!(Args::try_parse_from(["sentia", "validate"]).is_err());
    }

    #[test]
    fn test_report_validation() {
        assert!(report_validation(Ok(())));
        assert!(!report_validation(Err(ValidationError::ConsentNotGiven)));
    }
}
