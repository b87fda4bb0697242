//! askdata CLI - Main entry point.
//!
//! Exit codes:
//! - 0: Success
//! - 1: General error
//! - 2: Invalid arguments or configuration
//! - 3: Query failure

use std::process::ExitCode;

use clap::Parser;
use tracing::debug;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use askdata_chat::ChatError;

mod commands;
mod display;

use commands::{Cli, Commands};

/// CI-friendly exit codes
pub struct ExitCodes;

impl ExitCodes {
    pub const SUCCESS: u8 = 0;
    pub const GENERAL_ERROR: u8 = 1;
    pub const INVALID_ARGS: u8 = 2;
    pub const QUERY_FAILURE: u8 = 3;
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = if cli.global.verbose {
        "askdata=debug,askdata_chat=debug"
    } else if cli.global.quiet {
        "error"
    } else {
        "askdata=info,askdata_chat=info"
    };

    let mut filter = EnvFilter::from_default_env().add_directive("warn".parse().unwrap());
    for directive in level.split(',') {
        filter = filter.add_directive(directive.parse().unwrap());
    }

    // Logging goes to stderr so answers on stdout stay clean.
    let log_result = tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .try_init();

    if log_result.is_err() {
        // Logging already initialized, continue
    }

    let result = match cli.command {
        Commands::Ask(args) => commands::ask::execute(&cli.global, args).await,
        Commands::Chat(args) => commands::chat::execute(&cli.global, args).await,
    };

    match result {
        Ok(()) => ExitCode::from(ExitCodes::SUCCESS),
        Err(e) => {
            let exit_code = categorize_error(&e);
            eprintln!("{}", error_line(&e));
            ExitCode::from(exit_code)
        }
    }
}

/// Line printed for a failed command. Query failures carry only their
/// kind; the backend's own text goes to the log.
fn error_line(e: &anyhow::Error) -> String {
    match e.chain().find_map(|c| c.downcast_ref::<ChatError>()) {
        Some(chat_error) if chat_error.is_query_failure() => {
            debug!(error = %format!("{:#}", e), "Query failure detail");
            format!("❌ Error: Query failed ({})", chat_error.kind())
        }
        _ => format!("❌ Error: {:#}", e),
    }
}

/// Categorize error to determine exit code
fn categorize_error(e: &anyhow::Error) -> u8 {
    if let Some(chat_error) = e.chain().find_map(|c| c.downcast_ref::<ChatError>()) {
        return match chat_error {
            err if err.is_query_failure() => ExitCodes::QUERY_FAILURE,
            ChatError::Config(_) => ExitCodes::INVALID_ARGS,
            _ => ExitCodes::GENERAL_ERROR,
        };
    }

    let msg = e.to_string().to_lowercase();
    if msg.contains("argument") || msg.contains("settings") {
        ExitCodes::INVALID_ARGS
    } else {
        ExitCodes::GENERAL_ERROR
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categorize_error() {
        let err = anyhow::Error::from(ChatError::BackendRejected("nope".into()));
        assert_eq!(categorize_error(&err), ExitCodes::QUERY_FAILURE);

        let err = anyhow::Error::from(ChatError::Config("bad".into())).context("Failed to load settings");
        assert_eq!(categorize_error(&err), ExitCodes::INVALID_ARGS);

        let err = anyhow::anyhow!("Invalid argument: the question is empty");
        assert_eq!(categorize_error(&err), ExitCodes::INVALID_ARGS);

        let err = anyhow::anyhow!("something else");
        assert_eq!(categorize_error(&err), ExitCodes::GENERAL_ERROR);
    }

    #[test]
    fn test_error_line_hides_backend_text() {
        let err = anyhow::Error::from(ChatError::BackendRejected(
            "table users_secret does not exist".into(),
        ));
        let line = error_line(&err);
        assert_eq!(line, "❌ Error: Query failed (backend_rejected)");
        assert!(!line.contains("users_secret"));
        assert_eq!(categorize_error(&err), ExitCodes::QUERY_FAILURE);

        let err = anyhow::Error::from(ChatError::NetworkFailure("connect 10.0.0.7:8000".into()));
        assert!(!error_line(&err).contains("10.0.0.7"));
    }

    #[test]
    fn test_error_line_keeps_local_errors() {
        let err = anyhow::Error::from(ChatError::Config("bad endpoint".into()));
        assert!(error_line(&err).contains("bad endpoint"));
    }
}
