use std::fs;
use std::path::{Path, PathBuf};

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use tempfile::TempDir;
use tower::ServiceExt;

use minidoc::{AppState, Config, Templates, router};

struct Site {
    root: TempDir,
}

struct Reply {
    status: StatusCode,
    location: Option<String>,
    body: String,
}

impl Site {
    fn new() -> Self {
        Self { root: tempfile::tempdir().unwrap() }
    }

    fn write(&self, rel: &str, contents: &str) -> &Self {
        let path = self.root.path().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
        self
    }

    fn app(&self) -> Router {
        let template_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("templates");
        let templates = Templates::load(&template_dir, true).unwrap();
        router(AppState::new(Config::new(self.root.path().to_path_buf(), template_dir), templates))
    }

    async fn get(&self, uri: &str) -> Reply {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = self.app().oneshot(request).await.unwrap();
        let status = response.status();
        let location = response
            .headers()
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok())
            .map(String::from);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        Reply { status, location, body: String::from_utf8_lossy(&bytes).into_owned() }
    }

    fn path(&self) -> &Path {
        self.root.path()
    }
}

#[tokio::test]
async fn legacy_repository_paths_redirect() {
    let site = Site::new();
    let reply = site.get("/minimega.git/info/refs?service=git-upload-pack").await;
    assert_eq!(reply.status, StatusCode::MOVED_PERMANENTLY);
    assert_eq!(
        reply.location.as_deref(),
        Some("https://github.com/sandia-minimega/minimega.git/info/refs?service=git-upload-pack")
    );
}

#[tokio::test]
async fn favicon_is_not_served() {
    let site = Site::new();
    site.write("favicon.ico", "icon");
    let reply = site.get("/favicon.ico").await;
    assert_eq!(reply.status, StatusCode::NOT_FOUND);
    assert_eq!(reply.body, "not found");
}

#[tokio::test]
async fn renders_slide_deck() {
    let site = Site::new();
    site.write("talks/intro.slide", "Intro Talk\n2 Jan 2006\n\nAda\n\n* Welcome\n\nHello *there*\n");
    let reply = site.get("/talks/intro.slide").await;
    assert_eq!(reply.status, StatusCode::OK);
    assert!(reply.body.contains("<title>Intro Talk</title>"));
    assert!(reply.body.contains("<h3>2 January 2006</h3>"));
    assert!(reply.body.contains("<p>Hello <b>there</b></p>"));
}

#[tokio::test]
async fn marks_go_snippets_playable() {
    let site = Site::new();
    site.write("talks/hello.go", "package main\n")
        .write("talks/demo.slide", "Demo\n\n* Code\n\n.play hello.go\n.code hello.go\n");
    let reply = site.get("/talks/demo.slide").await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body.matches("class=\"code playground\"").count(), 1);
    assert!(reply.body.contains("package main"));
}

#[tokio::test]
async fn renders_markdown_article() {
    let site = Site::new();
    site.write("paper.article", "# A Paper\n\n## Background\n\nSome **strong** claims.\n");
    let reply = site.get("/paper.article").await;
    assert_eq!(reply.status, StatusCode::OK);
    assert!(reply.body.contains("Background"));
    assert!(reply.body.contains("<strong>strong</strong>"));
}

#[tokio::test]
async fn broken_document_is_a_server_error() {
    let site = Site::new();
    site.write("talks/broken.slide", "");
    let reply = site.get("/talks/broken.slide").await;
    assert_eq!(reply.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(reply.body.contains("unexpected EOF"));
}

#[tokio::test]
async fn lists_directory_by_kind() {
    let site = Site::new();
    site.write("talks/c.slide", "C Deck\n")
        .write("talks/b.slide", "B Deck\n")
        .write("talks/a.article", "A Article\n")
        .write("talks/z.pdf", "%PDF")
        .write("talks/notes.txt", "private")
        .write("talks/broken.slide", "")
        .write("talks/.git/config", "");

    let reply = site.get("/talks").await;
    assert_eq!(reply.status, StatusCode::OK);
    let body = reply.body;
    assert!(body.contains("<title>Index of /talks</title>"));
    assert!(body.contains("b.slide</a>: B Deck"));
    assert!(body.contains("a.article</a>: A Article"));
    assert!(body.contains("z.pdf</a>"));
    assert!(body.contains("broken.slide</a>: </dd>"));
    assert!(!body.contains("notes.txt"));
    assert!(!body.contains(".git"));
    assert!(!body.contains("Sub-directories"));

    let b = body.find("b.slide</a>").unwrap();
    let c = body.find("c.slide</a>").unwrap();
    assert!(b < c);
}

#[tokio::test]
async fn root_listing_hides_pkg_and_empty_dirs() {
    let site = Site::new();
    site.write("pkg/lib.go", "")
        .write("tools/main.go", "")
        .write("scratch/todo.txt", "")
        .write("_drafts/wip.slide", "WIP\n");

    let reply = site.get("/").await;
    assert_eq!(reply.status, StatusCode::OK);
    assert!(reply.body.contains("tools</a>"));
    assert!(!reply.body.contains("pkg"));
    assert!(!reply.body.contains("scratch"));
    assert!(!reply.body.contains("_drafts"));
}

#[tokio::test]
async fn index_page_replaces_listing() {
    let site = Site::new();
    site.write(
        "site/index.html",
        "{% extends \"layout.tmpl\" %}{% block title %}Home{% endblock %}{% block content %}Welcome{% endblock %}",
    )
    .write("site/a.slide", "A\n");

    let reply = site.get("/site").await;
    assert_eq!(reply.status, StatusCode::OK);
    assert!(reply.body.contains("<title>Home</title>"));
    assert!(reply.body.contains("Welcome"));
    assert!(!reply.body.contains("Index of"));
}

#[tokio::test]
async fn html_pages_reflect_edits() {
    let site = Site::new();
    let app = site.app();
    let fetch = |app: Router| async move {
        let request = Request::builder().uri("/news.html").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        to_bytes(response.into_body(), usize::MAX).await.unwrap()
    };

    site.write("news.html", "{% extends \"layout.tmpl\" %}{% block content %}first{% endblock %}");
    assert!(String::from_utf8_lossy(&fetch(app.clone()).await).contains("first"));

    fs::write(
        site.path().join("news.html"),
        "{% extends \"layout.tmpl\" %}{% block content %}second{% endblock %}",
    )
    .unwrap();
    let body = fetch(app).await;
    assert!(String::from_utf8_lossy(&body).contains("second"));
    assert!(!String::from_utf8_lossy(&body).contains("first"));
}

#[tokio::test]
async fn html_page_without_extends_is_rendered_alone() {
    let site = Site::new();
    site.write("raw.html", "<p>raw {{ 1 + 1 }}</p>");
    let reply = site.get("/raw.html").await;
    assert_eq!(reply.status, StatusCode::OK);
    assert_eq!(reply.body, "<p>raw 2</p>");
}

#[tokio::test]
async fn serves_static_files() {
    let site = Site::new();
    site.write("data/notes.txt", "plain text");

    let found = site.get("/data/notes.txt").await;
    assert_eq!(found.status, StatusCode::OK);
    assert_eq!(found.body, "plain text");

    let missing = site.get("/data/missing.txt").await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn path_below_a_file_is_a_server_error() {
    let site = Site::new();
    site.write("talks/a.pdf", "%PDF");
    let reply = site.get("/talks/a.pdf/x").await;
    assert_eq!(reply.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(reply.body.contains("talks/a.pdf/x"));
}

#[tokio::test]
async fn rejects_parent_traversal() {
    let site = Site::new();
    let reply = site.get("/talks/%2e%2e/%2e%2e/etc/passwd").await;
    assert_eq!(reply.status, StatusCode::BAD_REQUEST);
}
