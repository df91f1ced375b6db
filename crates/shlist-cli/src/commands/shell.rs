//! Interactive shell
//!
//! Keeps an active and a history view open over one store, the way two
//! screens of an app would. Completing a list from the active view makes the
//! history view refetch in the background.

use std::io::{self, Write};
use std::sync::Arc;

use anyhow::Result;

use shlist_core::{ActiveLists, HistoryLists, NewList, ServerId, ShlistError, SyncStore};

use crate::commands::lists::report;
use crate::editor;
use crate::output::Output;

const HELP: &str = "\
Commands:
  lists                            Show active lists
  history                          Show completed lists
  more [history]                   Load the next page
  refresh [history]                Reload the first page
  show <ID>                        Show a loaded list with its items
  create <NAME>: <ITEM>, ...       Create a list
  update <ID> <NAME>: <ITEM>, ...  Replace a list's name and items
  complete <ID>                    Mark a list as completed
  delete <ID>                      Delete a completed list
  help                             Show this help
  quit                             Leave the shell";

/// Which view a command applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    Active,
    History,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum ShellCommand {
    Show(Screen),
    More(Screen),
    Refresh(Screen),
    ShowList(ServerId),
    Create(NewList),
    Update(ServerId, NewList),
    Complete(ServerId),
    Delete(ServerId),
    Help,
    Quit,
}

/// Run the shell until `quit` or end of input
pub async fn run(store: Arc<SyncStore>, output: &Output) -> Result<()> {
    let active = ActiveLists::new(Arc::clone(&store));
    let history = Arc::new(HistoryLists::new(Arc::clone(&store)));
    let listener = history.spawn_refresh_listener();

    output.message("shlist shell - type 'help' for commands");
    for result in [active.refresh().await, history.refresh().await] {
        if let Err(e) = result {
            output.notify_error(&e);
        }
    }
    output.print_snapshot(&active.snapshot().await);

    // Read line by line without holding the stdin lock; delete prompts read it too
    let mut line = String::new();
    loop {
        if output.should_prompt() {
            print!("shlist> ");
            io::stdout().flush()?;
        }

        line.clear();
        if io::stdin().read_line(&mut line)? == 0 {
            break;
        }
        if line.trim().is_empty() {
            continue;
        }

        let command = match parse(&line) {
            Ok(command) => command,
            Err(message) => {
                output.warn(&message);
                continue;
            }
        };
        if command == ShellCommand::Quit {
            break;
        }

        // Each line is its own operation: report its failure and keep going
        if let Err(e) = execute(command, &active, &history, output).await {
            output.notify_error(&e);
        }
    }

    listener.abort();
    Ok(())
}

async fn execute(
    command: ShellCommand,
    active: &ActiveLists,
    history: &HistoryLists,
    output: &Output,
) -> Result<(), ShlistError> {
    match command {
        ShellCommand::Show(Screen::Active) => output.print_snapshot(&active.snapshot().await),
        ShellCommand::Show(Screen::History) => output.print_snapshot(&history.snapshot().await),
        ShellCommand::More(Screen::Active) => {
            if active.load_more().await?.is_none() {
                output.message("Nothing more to load.");
            }
            output.print_snapshot(&active.snapshot().await);
        }
        ShellCommand::More(Screen::History) => {
            if history.load_more().await?.is_none() {
                output.message("Nothing more to load.");
            }
            output.print_snapshot(&history.snapshot().await);
        }
        ShellCommand::Refresh(Screen::Active) => {
            active.refresh().await?;
            output.print_snapshot(&active.snapshot().await);
        }
        ShellCommand::Refresh(Screen::History) => {
            history.refresh().await?;
            output.print_snapshot(&history.snapshot().await);
        }
        ShellCommand::ShowList(id) => {
            let list = match active.find(id).await {
                Some(list) => Some(list),
                None => history.find(id).await,
            };
            match list {
                Some(list) => output.print_list(&list),
                None => output.warn(&format!("List {} is not loaded.", id)),
            }
        }
        ShellCommand::Create(list) => report(active.create(&list).await?, output),
        ShellCommand::Update(id, list) => report(active.update(id, &list).await?, output),
        ShellCommand::Complete(id) => report(active.complete(id).await?, output),
        ShellCommand::Delete(id) => {
            let outcome = history
                .delete(id, |prompt| editor::confirm(prompt).unwrap_or(false))
                .await?;
            match outcome {
                Some(outcome) => report(outcome, output),
                None => output.message("Cancelled."),
            }
        }
        ShellCommand::Help => println!("{}", HELP),
        ShellCommand::Quit => {}
    }
    Ok(())
}

fn parse(line: &str) -> Result<ShellCommand, String> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    match word {
        "lists" | "ls" | "active" => Ok(ShellCommand::Show(Screen::Active)),
        "history" => Ok(ShellCommand::Show(Screen::History)),
        "more" => Ok(ShellCommand::More(parse_screen(rest)?)),
        "refresh" => Ok(ShellCommand::Refresh(parse_screen(rest)?)),
        "show" => Ok(ShellCommand::ShowList(parse_id(rest)?)),
        "create" | "add" => Ok(ShellCommand::Create(parse_list(rest)?)),
        "update" | "edit" => {
            let (id, list) = rest
                .split_once(char::is_whitespace)
                .ok_or_else(|| "Usage: update <ID> <NAME>: <ITEM>, ...".to_string())?;
            Ok(ShellCommand::Update(parse_id(id)?, parse_list(list)?))
        }
        "complete" | "done" => Ok(ShellCommand::Complete(parse_id(rest)?)),
        "delete" | "rm" => Ok(ShellCommand::Delete(parse_id(rest)?)),
        "help" | "?" => Ok(ShellCommand::Help),
        "quit" | "exit" | "q" => Ok(ShellCommand::Quit),
        other => Err(format!("Unknown command '{}'. Type 'help' for commands.", other)),
    }
}

fn parse_screen(arg: &str) -> Result<Screen, String> {
    match arg {
        "" | "lists" | "active" => Ok(Screen::Active),
        "history" => Ok(Screen::History),
        other => Err(format!("Unknown view '{}'. Use 'active' or 'history'.", other)),
    }
}

fn parse_id(arg: &str) -> Result<ServerId, String> {
    arg.trim()
        .parse()
        .map_err(|_| format!("Expected a list ID, got '{}'", arg.trim()))
}

/// `NAME: item, item` into a list; validation happens in the core
fn parse_list(arg: &str) -> Result<NewList, String> {
    let (name, items) = arg
        .split_once(':')
        .ok_or_else(|| "Separate the name from the items with ':'".to_string())?;
    let items = items
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty());
    Ok(NewList::new(name.trim(), items))
}
