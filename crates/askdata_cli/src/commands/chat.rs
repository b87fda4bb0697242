//! Chat command - Interactive session.

use std::io::Write;

use anyhow::Result;
use clap::Args;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use askdata_chat::{Message, MessageId, Orchestrator, StoreHandle, SubmitOutcome, ViewMode};

use super::GlobalArgs;
use crate::display;

#[derive(Args)]
pub struct ChatArgs {
    /// Prompt shown before each question
    #[arg(long, default_value = "askdata> ")]
    prompt: String,
}

/// A line typed at the prompt.
#[derive(Debug, PartialEq)]
pub enum Input {
    Quit,
    Help,
    Clear,
    History,
    View(MessageId, ViewMode),
    Toggle(MessageId, String),
    Columns(MessageId, Vec<String>),
    Query(String),
    Invalid(String),
}

const HELP: &str = "\
Commands:
  :view <id> <table|line|bar|pie>  Switch how an answer is shown
  :toggle <id> <column>            Plot or hide one series
  :columns <id> <a,b,...>          Choose the plotted series
  :history                         Show the conversation
  :clear                           Clear the conversation
  :quit                            Exit
Anything else is sent as a question.";

/// Parse one line of input.
pub fn parse_input(line: &str) -> Input {
    let line = line.trim();
    let Some(command) = line.strip_prefix(':') else {
        return Input::Query(line.to_string());
    };

    let mut parts = command.split_whitespace();
    let name = parts.next().unwrap_or_default().to_lowercase();
    let id = parts.next().map(str::parse::<MessageId>);
    let rest: Vec<&str> = parts.collect();

    match (name.as_str(), id, rest.as_slice()) {
        ("quit" | "exit" | "q", None, []) => Input::Quit,
        ("help" | "h", None, []) => Input::Help,
        ("clear", None, []) => Input::Clear,
        ("history", None, []) => Input::History,
        ("view", Some(Ok(id)), [mode]) => match mode.parse() {
            Ok(mode) => Input::View(id, mode),
            Err(e) => Input::Invalid(e),
        },
        ("toggle", Some(Ok(id)), [column]) => Input::Toggle(id, column.to_string()),
        ("columns", Some(Ok(id)), [list]) => Input::Columns(
            id,
            list.split(',')
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(String::from)
                .collect(),
        ),
        _ => Input::Invalid(format!("unrecognized command ':{}', type :help", command)),
    }
}

pub async fn execute(global: &GlobalArgs, args: ChatArgs) -> Result<()> {
    let orchestrator = global.orchestrator()?;
    info!("Starting interactive session");

    if !global.quiet {
        println!("askdata - ask questions about your data. Type :help for commands.");
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("{}", args.prompt);
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };

        match parse_input(&line) {
            Input::Quit => break,
            Input::Help => println!("{}", HELP),
            Input::Clear => {
                orchestrator.clear();
                println!("Conversation cleared.");
            }
            Input::History => print_history(&orchestrator.store()),
            Input::View(id, mode) => {
                let store = orchestrator.store();
                let updated = store.write().set_view_mode(id, mode);
                report_update(&store, id, updated);
            }
            Input::Toggle(id, column) => {
                let store = orchestrator.store();
                let updated = store.write().toggle_column(id, &column);
                report_update(&store, id, updated);
            }
            Input::Columns(id, columns) => {
                let store = orchestrator.store();
                let updated = store.write().set_selected_columns(id, &columns);
                report_update(&store, id, updated);
            }
            Input::Query(query) => ask(&orchestrator, &query, global.quiet).await,
            Input::Invalid(reason) => println!("⚠️  {}", reason),
        }
    }

    Ok(())
}

async fn ask(orchestrator: &Orchestrator, query: &str, quiet: bool) {
    if query.is_empty() {
        return;
    }
    if !quiet {
        println!("⏳ Running query...");
    }

    // Failures were already reported by the notifier.
    if let SubmitOutcome::Answered(message) = orchestrator.submit(query).await {
        println!("{}", display::render_message(&message));
    }
}

fn report_update(store: &StoreHandle, id: MessageId, updated: bool) {
    let store = store.read();
    println!("{}", update_notice(store.get(id), id, updated));
}

/// What to print after a view command targeting message `id`.
fn update_notice(message: Option<&Message>, id: MessageId, updated: bool) -> String {
    match message {
        Some(message) if updated => display::render_message(message),
        Some(message) if message.table().is_some() => {
            "⚠️  Unchanged: at least one numeric column must stay plotted".to_string()
        }
        Some(_) => format!("⚠️  Unchanged: #{} is not a table answer", id),
        None => format!("⚠️  No answer #{}", id),
    }
}

fn print_history(store: &StoreHandle) {
    let store = store.read();
    if store.is_empty() {
        println!("(no messages)");
        return;
    }
    for message in store.messages() {
        println!(
            "{}  {}",
            message.timestamp.format("%H:%M:%S"),
            display::render_message(message)
        );
    }
}
