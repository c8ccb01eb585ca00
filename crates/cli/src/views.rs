//! Text renderings of the catalog views.

use std::fmt;

use bookstore_model::Book;
use tabled::{settings::Style, Table, Tabled};
use time::{format_description::well_known::Rfc2822, OffsetDateTime};

/// How the list view lays books out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum Layout {
    #[default]
    Table,
    Card,
}

pub const LOADING: &str = "Loading...";

/// The three mutually exclusive states every view goes through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState<T> {
    Loading,
    Failed { message: String, retryable: bool },
    Ready(T),
}

impl<T> ViewState<T> {
    /// Render with `ready` for the success state.
    pub fn render(&self, ready: impl FnOnce(&T) -> String) -> String {
        match self {
            ViewState::Loading => LOADING.to_string(),
            ViewState::Failed { message, .. } => message.clone(),
            ViewState::Ready(value) => ready(value),
        }
    }
}

/// Transient notification, the terminal stand-in for a toast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Warning,
    Error,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.level {
            NoticeLevel::Success => "success",
            NoticeLevel::Warning => "warning",
            NoticeLevel::Error => "error",
        };
        write!(f, "[{label}] {}", self.message)
    }
}

#[derive(Tabled)]
struct BookRow<'a> {
    #[tabled(rename = "No")]
    number: usize,
    #[tabled(rename = "Title")]
    title: &'a str,
    #[tabled(rename = "Author")]
    author: &'a str,
    #[tabled(rename = "Publish Year")]
    publish_year: i32,
    #[tabled(rename = "ID")]
    id: &'a str,
}

pub fn render_books(books: &[Book], layout: Layout) -> String {
    if books.is_empty() {
        return "No books available".to_string();
    }
    match layout {
        Layout::Table => render_table(books),
        Layout::Card => render_cards(books),
    }
}

fn render_table(books: &[Book]) -> String {
    let rows = books.iter().enumerate().map(|(index, book)| BookRow {
        number: index + 1,
        title: &book.title,
        author: &book.author,
        publish_year: book.publish_year,
        id: &book.id,
    });

    let mut table = Table::new(rows);
    table.with(Style::modern());
    table.to_string()
}

fn render_cards(books: &[Book]) -> String {
    books
        .iter()
        .map(|book| {
            format!(
                "┌ {year} ─ {id}\n│ {title}\n│ {author}\n└",
                year = book.publish_year,
                id = book.id,
                title = book.title,
                author = book.author,
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn timestamp(value: OffsetDateTime) -> String {
    value
        .format(&Rfc2822)
        .unwrap_or_else(|_| value.to_string())
}

pub fn render_detail(book: &Book) -> String {
    let fields = [
        ("ID", book.id.clone()),
        ("Title", book.title.clone()),
        ("Author", book.author.clone()),
        ("Publish Year", book.publish_year.to_string()),
        ("Create Time", timestamp(book.created_at)),
        ("Last Update Time", timestamp(book.updated_at)),
    ];

    let width = fields.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
    fields
        .iter()
        .map(|(label, value)| format!("{label:<width$}  {value}"))
        .collect::<Vec<_>>()
        .join("\n")
}
