//! One subcommand per catalog view.

use std::future::Future;
use std::ops::ControlFlow;

use clap::{Args, Subcommand};
use tokio_util::sync::CancellationToken;

use crate::api::{CatalogClient, ClientError};
use crate::console::Console;
use crate::form::BookForm;
use crate::views::{self, Layout, Notice, ViewState};

const LIST_FAILED: &str = "Failed to fetch books.";
const SHOW_FAILED: &str = "Failed to load book details. Please try again later.";
const EDIT_LOAD_FAILED: &str = "Failed to load book details. Please try again.";
const CREATE_FAILED: &str = "Error creating the book";
const EDIT_FAILED: &str = "Failed to edit the book. Please try again.";
const DELETE_FAILED: &str = "An error occurred while deleting the book.";

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List every book in the catalog
    List {
        /// Render as a table or as cards
        #[arg(long, value_enum, default_value_t = Layout::Table)]
        view: Layout,
    },

    /// Show every field of one book
    Show {
        /// Book id
        id: String,
    },

    /// Add a book
    Create {
        #[command(flatten)]
        fields: BookFields,
    },

    /// Change a book; fields left out keep their stored values
    Edit {
        /// Book id
        id: String,

        #[command(flatten)]
        fields: BookFields,
    },

    /// Remove a book
    Delete {
        /// Book id
        id: String,

        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
}

#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct BookFields {
    #[arg(long)]
    pub title: Option<String>,

    #[arg(long)]
    pub author: Option<String>,

    /// Kept as text so bad input gets the form's own warning
    #[arg(long, allow_hyphen_values = true)]
    pub publish_year: Option<String>,
}

/// How a command ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Done,
    Failed,
    Cancelled,
}

impl Outcome {
    pub fn exit_code(self) -> i32 {
        match self {
            Outcome::Done => 0,
            Outcome::Failed => 1,
            Outcome::Cancelled => 130,
        }
    }
}

pub async fn run(
    command: Command,
    client: &CatalogClient,
    console: &mut Console,
    cancel: &CancellationToken,
) -> anyhow::Result<Outcome> {
    match command {
        Command::List { view } => list(client, console, cancel, view).await,
        Command::Show { id } => show(client, console, cancel, &id).await,
        Command::Create { fields } => create(client, console, cancel, fields).await,
        Command::Edit { id, fields } => edit(client, console, cancel, &id, fields).await,
        Command::Delete { id, yes } => delete(client, console, cancel, &id, yes).await,
    }
}

async fn list(
    client: &CatalogClient,
    console: &mut Console,
    cancel: &CancellationToken,
    layout: Layout,
) -> anyhow::Result<Outcome> {
    let books = match load(console, LIST_FAILED, move || client.list(cancel)).await? {
        ControlFlow::Continue(list) => list.data,
        ControlFlow::Break(outcome) => return Ok(outcome),
    };

    console.show(&views::render_books(&books, layout))?;
    Ok(Outcome::Done)
}

async fn show(
    client: &CatalogClient,
    console: &mut Console,
    cancel: &CancellationToken,
    id: &str,
) -> anyhow::Result<Outcome> {
    let book = match load(console, SHOW_FAILED, move || client.get(id, cancel)).await? {
        ControlFlow::Continue(book) => book,
        ControlFlow::Break(outcome) => return Ok(outcome),
    };

    console.show(&views::render_detail(&book))?;
    Ok(Outcome::Done)
}

async fn create(
    client: &CatalogClient,
    console: &mut Console,
    cancel: &CancellationToken,
    fields: BookFields,
) -> anyhow::Result<Outcome> {
    let form = BookForm::default().apply(fields.title, fields.author, fields.publish_year);
    let book = match form.validate() {
        Ok(book) => book,
        Err(err) => {
            console.notify(&Notice::warning(err.to_string()))?;
            return Ok(Outcome::Failed);
        }
    };

    console.loading()?;
    match client.create(&book, cancel).await {
        Ok(created) => {
            tracing::info!(id = %created.id, "book created");
            console.notify(&Notice::success("Book Created Successfully."))?;
            console.show(&views::render_detail(&created))?;
            Ok(Outcome::Done)
        }
        Err(err) => submit_failed(console, err, CREATE_FAILED),
    }
}

async fn edit(
    client: &CatalogClient,
    console: &mut Console,
    cancel: &CancellationToken,
    id: &str,
    fields: BookFields,
) -> anyhow::Result<Outcome> {
    let current = match load(console, EDIT_LOAD_FAILED, move || client.get(id, cancel)).await? {
        ControlFlow::Continue(book) => book,
        ControlFlow::Break(outcome) => return Ok(outcome),
    };

    let form = BookForm::from(&current).apply(fields.title, fields.author, fields.publish_year);
    let book = match form.validate() {
        Ok(book) => book,
        Err(err) => {
            console.notify(&Notice::warning(err.to_string()))?;
            return Ok(Outcome::Failed);
        }
    };

    console.loading()?;
    match client.update(id, &book, cancel).await {
        Ok(updated) => {
            tracing::info!(id = %updated.id, "book edited");
            console.notify(&Notice::success("Book Edited Successfully"))?;
            console.show(&views::render_detail(&updated))?;
            Ok(Outcome::Done)
        }
        Err(err) => submit_failed(console, err, EDIT_FAILED),
    }
}

async fn delete(
    client: &CatalogClient,
    console: &mut Console,
    cancel: &CancellationToken,
    id: &str,
    yes: bool,
) -> anyhow::Result<Outcome> {
    if !yes && !console.confirm("Are you sure you want to delete this book?")? {
        console.notify(&Notice::warning("Delete cancelled"))?;
        return Ok(Outcome::Done);
    }

    console.loading()?;
    match client.delete(id, cancel).await {
        Ok(deleted) => {
            tracing::info!(id = %deleted.id, "book deleted");
            console.notify(&Notice::success("Book Deleted Successfully."))?;
            Ok(Outcome::Done)
        }
        Err(err) => submit_failed(console, err, DELETE_FAILED),
    }
}

/// Drive a view load through its states, offering a retry on interactive
/// terminals when the failure is worth retrying.
async fn load<T, F, Fut>(
    console: &mut Console,
    fallback: &str,
    mut fetch: F,
) -> anyhow::Result<ControlFlow<Outcome, T>>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ClientError>>,
{
    let mut state = ViewState::Loading;
    loop {
        match state {
            ViewState::Loading => {
                console.status(&state.render(|_| String::new()))?;
                state = match fetch().await {
                    Ok(value) => ViewState::Ready(value),
                    Err(ClientError::Cancelled) => return Ok(ControlFlow::Break(Outcome::Cancelled)),
                    Err(err) => {
                        tracing::warn!(error = %err, "view load failed");
                        ViewState::Failed {
                            message: err.user_message(fallback),
                            retryable: !err.is_not_found(),
                        }
                    }
                };
            }
            ViewState::Failed { message, retryable } => {
                console.notify(&Notice::error(message))?;
                if !(retryable && console.is_interactive() && console.confirm("Retry?")?) {
                    return Ok(ControlFlow::Break(Outcome::Failed));
                }
                state = ViewState::Loading;
            }
            ViewState::Ready(value) => return Ok(ControlFlow::Continue(value)),
        }
    }
}

fn submit_failed(console: &mut Console, err: ClientError, fallback: &str) -> anyhow::Result<Outcome> {
    if matches!(err, ClientError::Cancelled) {
        return Ok(Outcome::Cancelled);
    }
    tracing::warn!(error = %err, "request failed");
    console.notify(&Notice::error(err.user_message(fallback)))?;
    Ok(Outcome::Failed)
}
