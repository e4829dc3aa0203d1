//! minidoc - a document server for trees of slide decks, articles and HTML pages
//!
//! Requests are dispatched in order: presentation documents are parsed and rendered
//! through their kind's template, directories are listed (or their `index.html`
//! rendered), other `.html` files are rendered against the shared layout, and
//! everything else is served as a static file.

pub mod config;
pub mod errors;
pub mod handlers;
pub mod logger;
pub mod present;
pub mod services;
pub mod types;
pub mod utils;

pub use config::Config;
pub use errors::DocError;
pub use handlers::router;
pub use present::{Doc, ParseMode};
pub use services::{DirService, DocService, HtmlService, Templates};
pub use types::{AppState, DirEntry, DirListing, DocKind, ListOutcome};

// Re-export utility functions
pub use utils::{escape_attr, escape_html, resolve_request_path};
