use std::io;
use std::path::{Path, PathBuf};

use axum::{http::StatusCode, response::{IntoResponse, Response}};

use crate::present::ParseError;

/// Errors produced while dispatching and rendering a request
#[derive(Debug, thiserror::Error)]
pub enum DocError {
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error("template error: {0}")]
    Template(#[from] minijinja::Error),
    #[error("not found")]
    NotFound,
    #[error("invalid path")]
    InvalidPath,
    #[error("server error: {0}")]
    Serve(io::Error),
}

impl DocError {
    pub fn io(path: &Path, source: io::Error) -> Self {
        DocError::Io { path: path.to_path_buf(), source }
    }
}

impl IntoResponse for DocError {
    fn into_response(self) -> Response {
        let status = match self {
            DocError::NotFound => StatusCode::NOT_FOUND,
            DocError::InvalidPath => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_mentions_path() {
        let err = DocError::io(
            Path::new("talks/missing.slide"),
            io::Error::new(io::ErrorKind::NotFound, "no such file"),
        );
        assert_eq!(err.to_string(), "talks/missing.slide: no such file");
    }

    #[test]
    fn status_codes() {
        assert_eq!(DocError::NotFound.into_response().status(), StatusCode::NOT_FOUND);
        assert_eq!(DocError::InvalidPath.into_response().status(), StatusCode::BAD_REQUEST);
        let parse = DocError::Parse(ParseError::UnexpectedEof { name: "a.slide".into() });
        assert_eq!(parse.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn serve_errors_keep_their_message() {
        let err = DocError::Serve(io::Error::new(io::ErrorKind::AddrInUse, "address in use"));
        assert_eq!(err.to_string(), "server error: address in use");
        assert_eq!(err.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
