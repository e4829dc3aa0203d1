use std::fs;
use std::path::Path;

use log::info;
use minijinja::context;

use crate::errors::DocError;

use super::templates::Templates;

/// Renders `.html` files under the root as templates.
///
/// A page picks up the shared layout only by starting with `{% extends "layout.tmpl" %}`
/// and filling its blocks. A page without `extends` is rendered on its own.
pub struct HtmlService<'a> {
    root: &'a Path,
    templates: &'a Templates,
}

impl<'a> HtmlService<'a> {
    pub fn new(root: &'a Path, templates: &'a Templates) -> Self {
        Self { root, templates }
    }

    /// Read the page from disk and render it.
    ///
    /// The page is compiled into a private copy of the layout environment on every
    /// call, so edits show up without a restart and the shared layout stays untouched.
    pub fn render(&self, rel: &str) -> Result<String, DocError> {
        info!("Rendering HTML page: '{}'", rel);
        let path = self.root.join(rel);
        let source = fs::read_to_string(&path).map_err(|e| DocError::io(&path, e))?;

        let mut env = self.templates.layout().clone();
        env.add_template_owned(rel.to_string(), source)?;
        Ok(env.get_template(rel)?.render(context! {})?)
    }
}
