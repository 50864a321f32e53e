//! Entry point: prints one translation from a configured workspace.

use std::fmt::Display;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

use thiserror::Error;
use tracing_subscriber::EnvFilter;
use translation_hub::config::{
    ConfigError,
    ConfigManager,
};
use translation_hub::{
    Translator,
    TranslatorError,
};

/// Command-line usage
const USAGE: &str = "Usage: translation-hub <workspace> <locale> <key> [args...]";

/// Errors that end the command.
#[derive(Error, Debug)]
enum CliError {
    /// Invalid workspace configuration
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Runtime construction failure
    #[error("Failed to start runtime: {0}")]
    Runtime(#[from] std::io::Error),

    /// Initial load failure
    #[error(transparent)]
    Translator(#[from] TranslatorError),
}

fn main() -> ExitCode {
    // stdout is reserved for the translated text
    let (writer, _guard) = tracing_appender::non_blocking(std::io::stderr());
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(writer)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let [workspace, locale, key, substitutions @ ..] = args.as_slice() else {
        tracing::error!("{USAGE}");
        return ExitCode::from(2);
    };

    match run(PathBuf::from(workspace), locale, key, substitutions) {
        Ok(text) => {
            if let Err(e) = writeln!(std::io::stdout().lock(), "{text}") {
                tracing::error!("Failed to write output: {e}");
                return ExitCode::FAILURE;
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// Loads the workspace and translates `key`.
fn run(
    workspace: PathBuf,
    locale: &str,
    key: &str,
    substitutions: &[String],
) -> Result<String, CliError> {
    let mut config_manager = ConfigManager::new();
    config_manager.load_settings(Some(workspace))?;

    let worker_threads = config_manager.get_settings().loading.worker_threads();
    tracing::debug!(worker_threads, "Starting runtime");
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(worker_threads)
        .enable_all()
        .build()?;

    let source = config_manager.build_source()?;
    let translator =
        runtime.block_on(Translator::create(source, config_manager.translator_options()))?;

    let substitutions: Vec<&dyn Display> =
        substitutions.iter().map(|substitution| substitution as &dyn Display).collect();
    Ok(translator.translate(locale, key, &substitutions))
}
