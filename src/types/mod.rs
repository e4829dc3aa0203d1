use std::sync::Arc;

use serde::Serialize;

use crate::config::Config;
use crate::services::Templates;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub templates: Arc<Templates>,
}

impl AppState {
    pub fn new(config: Config, templates: Templates) -> Self {
        Self { config: Arc::new(config), templates: Arc::new(templates) }
    }
}

/// The presentation document kinds the server knows how to render
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocKind {
    Slide,
    Article,
}

impl DocKind {
    pub const ALL: [DocKind; 2] = [DocKind::Slide, DocKind::Article];

    /// File extension, without the dot
    pub fn extension(self) -> &'static str {
        match self {
            DocKind::Slide => "slide",
            DocKind::Article => "article",
        }
    }

    /// Name of the content template rendering this kind
    pub fn template_file(self) -> &'static str {
        match self {
            DocKind::Slide => "slides.tmpl",
            DocKind::Article => "article.tmpl",
        }
    }
}

/// A single row of a directory listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirEntry {
    pub name: String,
    /// Slash-separated path relative to the serving root
    pub path: String,
    /// Document title; empty for anything that is not a document
    pub title: String,
}

/// Data handed to the directory listing template
#[derive(Debug, Default, Serialize)]
pub struct DirListing {
    pub path: String,
    pub dirs: Vec<DirEntry>,
    pub slides: Vec<DirEntry>,
    pub articles: Vec<DirEntry>,
    pub other: Vec<DirEntry>,
}

impl DirListing {
    pub fn sort(&mut self) {
        for entries in [&mut self.dirs, &mut self.slides, &mut self.articles, &mut self.other] {
            entries.sort_by(|a, b| a.name.cmp(&b.name));
        }
    }
}

/// What the directory lister did with a path
#[derive(Debug)]
pub enum ListOutcome {
    /// The path does not name a directory; nothing was rendered
    NotADirectory,
    /// The directory holds an index page, which was rendered instead of a listing
    Rendered(String),
    /// The listing template was rendered
    Listed(String),
}
