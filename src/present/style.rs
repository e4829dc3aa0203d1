use pulldown_cmark::{Options, Parser, html};

use crate::utils::{escape_attr, escape_html};

/// Render a line of document text as HTML.
///
/// Words wrapped in `*` become bold, `_` italic and `` ` `` code; underscores inside
/// bold and italic words turn into spaces. `[[url][label]]` and `[[url]]` become links.
/// Everything else is escaped.
pub fn style(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find("[[") {
        let Some(len) = rest[start..].find("]]") else {
            break;
        };
        out.push_str(&style_words(&rest[..start]));
        out.push_str(&link(&rest[start + 2..start + len]));
        rest = &rest[start + len + 2..];
    }
    out.push_str(&style_words(rest));
    out
}

fn style_words(text: &str) -> String {
    text.split(' ').map(style_word).collect::<Vec<_>>().join(" ")
}

fn style_word(word: &str) -> String {
    let core = word
        .trim_start_matches('(')
        .trim_end_matches(['.', ',', ';', ':', '!', '?', ')']);
    let lead = &word[..word.len() - word.trim_start_matches('(').len()];
    let tail = &word[lead.len() + core.len()..];

    let marker = core.chars().next();
    let wrapped = core.len() >= 3 && marker == core.chars().last();
    let (open, close) = match marker {
        Some('*') if wrapped => ("<b>", "</b>"),
        Some('_') if wrapped => ("<i>", "</i>"),
        Some('`') if wrapped => ("<code>", "</code>"),
        _ => return escape_html(word),
    };
    let inner = &core[1..core.len() - 1];
    let inner = if open == "<code>" { inner.to_string() } else { inner.replace('_', " ") };
    format!("{}{}{}{}{}", escape_html(lead), open, escape_html(&inner), close, escape_html(tail))
}

fn link(target: &str) -> String {
    let (url, label) = match target.split_once("][") {
        Some((url, label)) => (url, label.to_string()),
        None => (target, shorten_url(target)),
    };
    format!(
        "<a href=\"{}\" target=\"_blank\">{}</a>",
        escape_attr(url),
        escape_html(&label)
    )
}

/// Drop the scheme from a bare link so it reads like a host name
fn shorten_url(url: &str) -> String {
    url.split_once("://")
        .map_or(url, |(_, rest)| rest)
        .trim_end_matches('/')
        .to_string()
}

/// Render a Markdown text run with pulldown-cmark
pub fn markdown_to_html(src: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let mut out = String::new();
    html::push_html(&mut out, Parser::new_ext(src, options));
    out
}
