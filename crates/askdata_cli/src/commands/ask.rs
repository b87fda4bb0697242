//! Ask command - Ask a single question.

use anyhow::{bail, Result};
use clap::Args;
use tracing::info;

use askdata_chat::{SubmitOutcome, ViewMode};

use super::GlobalArgs;
use crate::display;

#[derive(Args)]
pub struct AskArgs {
    /// The question, in plain language
    query: String,

    /// How to show a tabular answer (table, line, bar, pie)
    #[arg(long, default_value = "table")]
    view: ViewMode,

    /// Comma-separated numeric columns to plot
    #[arg(long, value_delimiter = ',')]
    columns: Vec<String>,

    /// Print the answer as JSON
    #[arg(long)]
    json: bool,
}

pub async fn execute(global: &GlobalArgs, args: AskArgs) -> Result<()> {
    info!("Asking: {}", args.query);
    let orchestrator = global.orchestrator()?;

    if !global.quiet && !args.json {
        println!("⏳ Running query...");
    }

    let answer = match orchestrator.submit(&args.query).await {
        SubmitOutcome::Answered(message) => message,
        SubmitOutcome::Failed(err) => return Err(err.into()),
        SubmitOutcome::Skipped => bail!("Invalid argument: the question is empty"),
        SubmitOutcome::Discarded => bail!("Answer was superseded"),
    };

    let store = orchestrator.store();
    let mut store = store.write();
    store.set_view_mode(answer.id, args.view);
    if !args.columns.is_empty() && !store.set_selected_columns(answer.id, &args.columns) {
        eprintln!(
            "⚠️  None of the requested columns can be plotted: {}",
            args.columns.join(", ")
        );
    }

    let Some(message) = store.get(answer.id) else {
        bail!("Answer disappeared from history");
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(message)?);
    } else {
        println!("{}", display::render_message(message));
    }

    Ok(())
}
