use std::collections::HashMap;
use std::fs;
use std::path::Path;

use log::{debug, info};
use minijinja::value::Value;
use minijinja::{AutoEscape, Environment, context};

use crate::errors::DocError;
use crate::present::{self, Doc};
use crate::types::{DirListing, DocKind};
use crate::utils::extension;

/// Macros shared by every content template
pub const ACTION_TEMPLATE: &str = "action.tmpl";
/// Page shell that listings and HTML pages extend
pub const LAYOUT_TEMPLATE: &str = "layout.tmpl";
pub const DIR_TEMPLATE: &str = "dir.tmpl";

/// Compiled template for one document kind
pub struct ContentTemplate {
    kind: DocKind,
    env: Environment<'static>,
}

impl ContentTemplate {
    pub fn kind(&self) -> DocKind {
        self.kind
    }

    /// Execute the template against a parsed document
    pub fn render(&self, doc: &Doc) -> Result<String, DocError> {
        let template = self.env.get_template(self.kind.template_file())?;
        Ok(template.render(context! { doc => doc })?)
    }
}

/// Every template the server renders, compiled once at startup and read-only afterwards
pub struct Templates {
    content: HashMap<&'static str, ContentTemplate>,
    layout: Environment<'static>,
    dir: Environment<'static>,
}

impl Templates {
    /// Load and compile all templates from `base`.
    ///
    /// Each document kind gets its own environment holding `action.tmpl` and the kind's
    /// template, together with the `style` filter and the `playable` function. The
    /// listing environment holds `dir.tmpl` next to `layout.tmpl` so it can extend it.
    pub fn load(base: &Path, play_enabled: bool) -> Result<Self, DocError> {
        info!("Loading templates from {:?}", base);
        let action = read_template(base, ACTION_TEMPLATE)?;

        let mut content = HashMap::new();
        for kind in DocKind::ALL {
            let mut env = new_environment();
            env.add_filter("style", style_filter);
            env.add_function("playable", move |code: Value| playable(&code, play_enabled));
            env.add_global("play_enabled", play_enabled);
            env.add_template_owned(ACTION_TEMPLATE, action.clone())?;
            env.add_template_owned(kind.template_file(), read_template(base, kind.template_file())?)?;
            debug!("Registered .{} documents with {}", kind.extension(), kind.template_file());
            content.insert(kind.extension(), ContentTemplate { kind, env });
        }

        let mut layout = new_environment();
        layout.add_template_owned(LAYOUT_TEMPLATE, read_template(base, LAYOUT_TEMPLATE)?)?;

        let mut dir = layout.clone();
        dir.add_template_owned(DIR_TEMPLATE, read_template(base, DIR_TEMPLATE)?)?;

        Ok(Self { content, layout, dir })
    }

    /// Content template registered for the extension of `name`, if any
    pub fn content_for(&self, name: &str) -> Option<&ContentTemplate> {
        extension(name).and_then(|ext| self.content.get(ext))
    }

    /// The shared layout environment. Callers that add templates must clone it first.
    pub fn layout(&self) -> &Environment<'static> {
        &self.layout
    }

    pub fn render_listing(&self, listing: &DirListing) -> Result<String, DocError> {
        Ok(self.dir.get_template(DIR_TEMPLATE)?.render(listing)?)
    }
}

fn new_environment() -> Environment<'static> {
    let mut env = Environment::new();
    env.set_auto_escape_callback(|_| AutoEscape::Html);
    env
}

fn read_template(base: &Path, name: &str) -> Result<String, DocError> {
    let path = base.join(name);
    fs::read_to_string(&path).map_err(|e| DocError::io(&path, e))
}

fn style_filter(text: &str) -> Value {
    Value::from_safe_string(present::style(text))
}

/// Whether a code element can be run in the playground
fn playable(code: &Value, play_enabled: bool) -> bool {
    let attr = |name: &str| code.get_attr(name).unwrap_or(Value::UNDEFINED);
    play_enabled && attr("play").is_true() && attr("ext").as_str() == Some(".go")
}
