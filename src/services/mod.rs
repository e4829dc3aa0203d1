pub mod dir_service;
pub mod doc_service;
pub mod html_service;
pub mod templates;

pub use dir_service::DirService;
pub use doc_service::DocService;
pub use html_service::HtmlService;
pub use templates::{ContentTemplate, Templates};

#[cfg(test)]
pub(crate) mod fixtures {
    use std::fs;

    use tempfile::TempDir;

    const ACTION: &str = "{% macro elem(e) %}\
        {% if e.kind == \"text\" %}{% for line in e.lines %}{{ line|style }}{% endfor %}\
        {% elif e.kind == \"code\" %}<code playable=\"{{ playable(e) }}\">{{ e.text }}</code>\
        {% endif %}{% endmacro %}";
    const SLIDES: &str = "{% import \"action.tmpl\" as action %}slides:{{ doc.title }}\
        {% for s in doc.sections %}[{{ s.title }}:{% for e in s.elem %}{{ action.elem(e) }}{% endfor %}]{% endfor %}";
    const ARTICLE: &str = "{% import \"action.tmpl\" as action %}article:{{ doc.title }}";
    const LAYOUT: &str = "<main>{% block content %}{% endblock %}</main>";
    const DIR: &str = "{% extends \"layout.tmpl\" %}{% block content %}path={{ path }};\
        dirs={% for e in dirs %}{{ e.name }},{% endfor %};\
        slides={% for e in slides %}{{ e.name }}({{ e.title }}),{% endfor %};\
        articles={% for e in articles %}{{ e.name }}({{ e.title }}),{% endfor %};\
        other={% for e in other %}{{ e.name }},{% endfor %}{% endblock %}";

    /// A template directory with minimal, whitespace-free templates
    pub(crate) fn template_dir() -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        for (name, body) in [
            ("action.tmpl", ACTION),
            ("slides.tmpl", SLIDES),
            ("article.tmpl", ARTICLE),
            ("layout.tmpl", LAYOUT),
            ("dir.tmpl", DIR),
        ] {
            fs::write(dir.path().join(name), body).unwrap();
        }
        dir
    }
}
