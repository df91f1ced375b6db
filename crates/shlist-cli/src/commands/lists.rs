//! List command handlers

use std::sync::Arc;

use anyhow::{bail, Result};

use shlist_core::{
    ActiveLists, HistoryLists, ListItem, MutationOutcome, NewList, ServerId, ShlistError,
    SyncStore,
};

use crate::editor;
use crate::output::Output;

/// Show active lists
pub async fn active(store: Arc<SyncStore>, all: bool, output: &Output) -> Result<()> {
    let view = ActiveLists::new(store);
    view.refresh().await?;
    if all {
        while view.load_more().await?.is_some() {}
    }
    output.print_snapshot(&view.snapshot().await);
    Ok(())
}

/// Show completed lists
pub async fn history(store: Arc<SyncStore>, all: bool, output: &Output) -> Result<()> {
    let view = HistoryLists::new(store);
    view.refresh().await?;
    if all {
        while view.load_more().await?.is_some() {}
    }
    output.print_snapshot(&view.snapshot().await);
    Ok(())
}

/// Create a new list
pub async fn create(
    store: Arc<SyncStore>,
    name: String,
    items: Vec<String>,
    dry_run: bool,
    output: &Output,
) -> Result<()> {
    let list = NewList::new(name, items);

    if dry_run {
        let draft = list.preview()?;
        output.print_list(&draft);
        if !output.is_json() {
            output.message("(dry run - nothing was sent)");
        }
        return Ok(());
    }

    let view = ActiveLists::new(store);
    let outcome = view.create(&list).await?;
    report(outcome, output);
    Ok(())
}

/// Mark an active list as completed
pub async fn complete(store: Arc<SyncStore>, id: ServerId, output: &Output) -> Result<()> {
    let view = ActiveLists::new(store);
    let outcome = view.complete(id).await?;
    report(outcome, output);
    Ok(())
}

/// Replace a list's name and items
///
/// Without a name, the current list is opened in the editor.
pub async fn update(
    store: Arc<SyncStore>,
    id: ServerId,
    name: Option<String>,
    items: Vec<String>,
    output: &Output,
) -> Result<()> {
    let view = ActiveLists::new(store);

    let update = match name {
        Some(name) => NewList::new(name, items),
        None => {
            if !items.is_empty() {
                bail!("--item requires --name; an update replaces the whole list.");
            }
            let current = find_active(&view, id).await?;
            editor::edit_list(&current)?
        }
    };

    let outcome = view.update(id, &update).await?;
    report(outcome, output);
    Ok(())
}

/// Delete a completed list
pub async fn delete(store: Arc<SyncStore>, id: ServerId, yes: bool, output: &Output) -> Result<()> {
    let view = HistoryLists::new(store);

    if !yes {
        if !output.should_prompt() {
            bail!("Refusing to delete list {} without --yes in non-interactive mode.", id);
        }
        // Load history so the prompt can name the list
        if let Err(e) = view.refresh().await {
            output.warn(&e.user_message());
        }
    }

    let mut prompt_error = None;
    let outcome = view
        .delete(id, |prompt| {
            if yes {
                return true;
            }
            editor::confirm(prompt).unwrap_or_else(|e| {
                prompt_error = Some(e);
                false
            })
        })
        .await?;

    if let Some(e) = prompt_error {
        return Err(e);
    }

    match outcome {
        Some(outcome) => report(outcome, output),
        None => output.message("Cancelled."),
    }
    Ok(())
}

/// Page through active lists until `id` is loaded
async fn find_active(view: &ActiveLists, id: ServerId) -> Result<ListItem> {
    view.refresh().await?;
    loop {
        if let Some(list) = view.find(id).await {
            return Ok(list);
        }
        if view.load_more().await?.is_none() {
            return Err(ShlistError::NotFound {
                message: format!("No active list with id {}", id),
            }
            .into());
        }
    }
}

/// Print a mutation's acknowledgement and any follow-up refresh failure
pub fn report(outcome: MutationOutcome, output: &Output) {
    if outcome.ack.message.is_empty() {
        output.success("Done.");
    } else {
        output.success(&outcome.ack.message);
    }
    if let Err(e) = outcome.refresh {
        output.warn(&format!("Could not refresh lists: {}", e.user_message()));
    }
}
