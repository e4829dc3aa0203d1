use std::fs;
use std::io;
use std::path::Path;

use log::{debug, error};

use crate::errors::DocError;
use crate::present::ParseMode;
use crate::types::{DirEntry, DirListing, DocKind, ListOutcome};
use crate::utils::{extension, join_rel};

use super::doc_service::DocService;
use super::html_service::HtmlService;
use super::templates::Templates;

/// Served in place of a listing when present
pub const INDEX_PAGE: &str = "index.html";

/// Hidden from the root listing only
const ROOT_EXCLUDED: &str = "pkg";
/// Never listed, at any depth
const RESERVED_DIR: &str = "present";
/// Extensions listed under "Files" besides the document kinds
const LISTED_EXTENSIONS: [&str; 3] = ["pdf", "html", "go"];

struct Child {
    name: String,
    is_dir: bool,
}

/// Builds directory listings grouped by document kind
pub struct DirService<'a> {
    root: &'a Path,
    templates: &'a Templates,
}

impl<'a> DirService<'a> {
    pub fn new(root: &'a Path, templates: &'a Templates) -> Self {
        Self { root, templates }
    }

    /// List the directory at `rel`, or render its index page if it has one
    pub fn list(&self, rel: &str) -> Result<ListOutcome, DocError> {
        let full = self.root.join(rel);
        let metadata = match fs::metadata(&full) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(ListOutcome::NotADirectory),
            Err(e) => return Err(DocError::io(&full, e)),
        };
        if !metadata.is_dir() {
            return Ok(ListOutcome::NotADirectory);
        }

        let children = read_children(&full)?;
        if children.iter().any(|child| !child.is_dir && child.name == INDEX_PAGE) {
            debug!("Directory '{}' has an index page", rel);
            let page = HtmlService::new(self.root, self.templates).render(&join_rel(rel, INDEX_PAGE))?;
            return Ok(ListOutcome::Rendered(page));
        }

        let listing = self.build_listing(rel, children);
        debug!(
            "Listing '{}': {} dirs, {} slides, {} articles, {} files",
            rel,
            listing.dirs.len(),
            listing.slides.len(),
            listing.articles.len(),
            listing.other.len()
        );
        Ok(ListOutcome::Listed(self.templates.render_listing(&listing)?))
    }

    fn build_listing(&self, rel: &str, children: Vec<Child>) -> DirListing {
        let docs = DocService::new(self.root);
        let mut listing = DirListing { path: rel.to_string(), ..DirListing::default() };

        for child in children {
            if rel.is_empty() && child.name == ROOT_EXCLUDED {
                continue;
            }
            let mut entry = DirEntry {
                path: join_rel(rel, &child.name),
                name: child.name,
                title: String::new(),
            };

            if child.is_dir {
                if self.show_dir(&entry) {
                    listing.dirs.push(entry);
                }
            } else if let Some(content) = self.templates.content_for(&entry.name) {
                // A document that fails to parse is still listed, just without a title
                match docs.parse(&entry.path, ParseMode::TitlesOnly) {
                    Ok(doc) => entry.title = doc.title,
                    Err(err) => error!("{}", err),
                }
                match content.kind() {
                    DocKind::Slide => listing.slides.push(entry),
                    DocKind::Article => listing.articles.push(entry),
                }
            } else if self.show_file(&entry.name) {
                listing.other.push(entry);
            }
        }

        listing.sort();
        listing
    }

    /// A directory is listed when its name is not hidden or reserved and it
    /// directly contains at least one listable file
    fn show_dir(&self, entry: &DirEntry) -> bool {
        if entry.name.starts_with(['.', '_']) || entry.name == RESERVED_DIR {
            return false;
        }
        match fs::read_dir(self.root.join(&entry.path)) {
            Ok(children) => children
                .filter_map(Result::ok)
                .any(|child| self.show_file(&child.file_name().to_string_lossy())),
            Err(err) => {
                debug!("Skipping unreadable directory '{}': {}", entry.path, err);
                false
            }
        }
    }

    fn show_file(&self, name: &str) -> bool {
        extension(name).is_some_and(|ext| LISTED_EXTENSIONS.contains(&ext))
            || self.templates.content_for(name).is_some()
    }
}

fn read_children(dir: &Path) -> Result<Vec<Child>, DocError> {
    let mut children = Vec::new();
    for entry in fs::read_dir(dir).map_err(|e| DocError::io(dir, e))? {
        let entry = entry.map_err(|e| DocError::io(dir, e))?;
        let is_dir = entry.file_type().map_err(|e| DocError::io(&entry.path(), e))?.is_dir();
        children.push(Child { name: entry.file_name().to_string_lossy().into_owned(), is_dir });
    }
    Ok(children)
}
