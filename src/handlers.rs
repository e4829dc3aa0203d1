use std::convert::Infallible;

use axum::{
    Router,
    extract::{Request, State},
    http::{StatusCode, Uri, header},
    response::{Html, IntoResponse, Response},
};
use log::{debug, error, info, warn};
use tower::ServiceExt;
use tower_http::services::ServeDir;

use crate::errors::DocError;
use crate::services::{DirService, DocService, HtmlService};
use crate::types::{AppState, ListOutcome};
use crate::utils::{extension, resolve_request_path};

pub const FAVICON_PATH: &str = "/favicon.ico";

/// What the blocking dispatcher decided to do with a request
enum Dispatch {
    Page(String),
    Static,
}

/// Build the application router. Every path goes through a single handler.
pub fn router(state: AppState) -> Router {
    Router::new().fallback(handle_request).with_state(state)
}

/// Handle any request under the serving root
pub async fn handle_request(State(state): State<AppState>, req: Request) -> Response {
    let path = req.uri().path().to_string();
    debug!("{} {}", req.method(), path);

    if path.starts_with(&state.config.legacy_prefix) {
        return redirect_legacy(&state.config.redirect_base, req.uri());
    }
    if path == FAVICON_PATH {
        return DocError::NotFound.into_response();
    }

    let rel = match resolve_request_path(&path) {
        Ok(rel) => rel,
        Err(err) => {
            warn!("Rejected request path {:?}: {}", path, err);
            return err.into_response();
        }
    };

    let blocking_state = state.clone();
    let dispatched = tokio::task::spawn_blocking(move || dispatch(&blocking_state, &rel)).await;
    match dispatched {
        Ok(Ok(Dispatch::Page(page))) => Html(page).into_response(),
        Ok(Ok(Dispatch::Static)) => serve_static(&state, req).await,
        Ok(Err(err)) => {
            error!("{}: {}", path, err);
            err.into_response()
        }
        Err(err) => {
            error!("{}: render task failed: {}", path, err);
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
        }
    }
}

/// Documents first, then directories, then HTML pages. Anything else is a static file.
fn dispatch(state: &AppState, rel: &str) -> Result<Dispatch, DocError> {
    let root = state.config.root.as_path();
    let templates = state.templates.as_ref();

    if let Some(content) = templates.content_for(rel) {
        return DocService::new(root).render(content, rel).map(Dispatch::Page);
    }

    match DirService::new(root, templates).list(rel)? {
        ListOutcome::Rendered(page) | ListOutcome::Listed(page) => return Ok(Dispatch::Page(page)),
        ListOutcome::NotADirectory => {}
    }

    if extension(rel) == Some("html") {
        return HtmlService::new(root, templates).render(rel).map(Dispatch::Page);
    }
    Ok(Dispatch::Static)
}

fn redirect_legacy(base: &str, uri: &Uri) -> Response {
    let target = uri.path_and_query().map_or(uri.path(), |pq| pq.as_str());
    let location = format!("{}{}", base.trim_end_matches('/'), target);
    info!("Redirecting {} to {}", target, location);
    (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, location)]).into_response()
}

async fn serve_static(state: &AppState, req: Request) -> Response {
    debug!("Serving static file: {}", req.uri().path());
    let served: Result<_, Infallible> = ServeDir::new(&state.config.root).oneshot(req).await;
    match served {
        Ok(response) => response.into_response(),
        Err(never) => match never {},
    }
}
