//! Parser for presentation documents (`.slide` and `.article` files).
//!
//! A document starts with a header (title, optional subtitle, date and tags),
//! followed by author blocks and a sequence of sections. Sections hold text,
//! lists, preformatted blocks and dot-commands such as `.code` or `.image`.
//! A title written as `# Title` switches the document to Markdown mode, where
//! sections are introduced with `##` and text runs are rendered as Markdown.

mod parse;
mod style;

use std::io::{self, Read};
use std::path::{Path, PathBuf};

use serde::Serialize;

pub use style::{markdown_to_html, style};

/// How much of a document to parse
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseMode {
    /// Parse header, authors and all sections
    Full,
    /// Stop after the header; used when only the title is needed
    TitlesOnly,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Doc {
    pub title: String,
    pub subtitle: String,
    /// Presentation date, formatted for display
    pub time: Option<String>,
    pub authors: Vec<Author>,
    pub tags: Vec<String>,
    pub summary: String,
    pub old_url: Vec<String>,
    pub sections: Vec<Section>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Author {
    /// Name first, then any contact lines
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Section {
    /// Hierarchical section number, e.g. `[2, 1]` for 2.1
    pub number: Vec<usize>,
    pub title: String,
    pub elem: Vec<Elem>,
    pub notes: Vec<String>,
    pub background: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Elem {
    Text { lines: Vec<String>, pre: bool },
    List { bullet: Vec<String> },
    Code {
        text: String,
        file: String,
        /// Extension of the source file including the dot, e.g. `.go`
        ext: String,
        play: bool,
        edit: bool,
        numbers: bool,
    },
    Image { url: String, height: Option<u32>, width: Option<u32> },
    Iframe { url: String, height: Option<u32>, width: Option<u32> },
    Link { url: String, label: String },
    Html { html: String },
    Caption { text: String },
}

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("{name}: {source}")]
    Read {
        name: String,
        #[source]
        source: io::Error,
    },
    #[error("{name}: unexpected EOF")]
    UnexpectedEof { name: String },
    #[error("{name}:{line}: {message}")]
    Syntax { name: String, line: usize, message: String },
    #[error("{name}: reading {}: {source}", path.display())]
    Include {
        name: String,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Parse a document read from `reader`.
///
/// `name` is the document's path on disk; files pulled in by `.code`, `.play` and
/// `.html` are resolved relative to its directory.
pub fn parse<R: Read>(mut reader: R, name: &Path, mode: ParseMode) -> Result<Doc, ParseError> {
    let mut src = String::new();
    reader
        .read_to_string(&mut src)
        .map_err(|source| ParseError::Read { name: name.display().to_string(), source })?;
    parse::Parser::new(&src, name).parse(mode)
}
