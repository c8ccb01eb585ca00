//! Terminal client for the bookstore catalog service.

pub mod api;
pub mod commands;
pub mod console;
pub mod form;
pub mod views;

pub use api::{CatalogClient, ClientError};
pub use commands::{Command, Outcome};
pub use console::Console;
