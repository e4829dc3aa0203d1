use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use log::{debug, info};

use crate::errors::DocError;
use crate::present::{self, Doc, ParseMode};

use super::templates::ContentTemplate;

/// Parses and renders presentation documents under the serving root
pub struct DocService<'a> {
    root: &'a Path,
}

impl<'a> DocService<'a> {
    pub fn new(root: &'a Path) -> Self {
        Self { root }
    }

    /// Parse the document at `rel`, a path relative to the root
    pub fn parse(&self, rel: &str, mode: ParseMode) -> Result<Doc, DocError> {
        let path = self.root.join(rel);
        let file = File::open(&path).map_err(|e| DocError::io(&path, e))?;
        Ok(present::parse(BufReader::new(file), &path, mode)?)
    }

    /// Parse the full document and execute its kind's template
    pub fn render(&self, content: &ContentTemplate, rel: &str) -> Result<String, DocError> {
        info!("Rendering {:?} document: '{}'", content.kind(), rel);
        let doc = self.parse(rel, ParseMode::Full)?;
        debug!("Parsed '{}' with {} sections", rel, doc.sections.len());
        content.render(&doc)
    }
}
