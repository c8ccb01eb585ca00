//! Bookstore catalog service
//!
//! Wires the document store, the module registry, and the HTTP server
//! together, and hosts the `books` module.

pub mod app;
pub mod modules;

pub use app::{shutdown_signal, App};
pub use modules::*;
