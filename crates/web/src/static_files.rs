//! Console UI static files
//!
//! Serves the built single-page app from a directory. Paths that do not
//! resolve to a file fall back to `index.html` so client-side routes work.

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use std::path::PathBuf;
use tracing::warn;

/// Static UI directory, if one is configured
#[derive(Debug, Clone, Default)]
pub struct UiStatic {
    dir: Option<PathBuf>,
}

impl UiStatic {
    pub fn new(dir: Option<PathBuf>) -> Self {
        Self { dir }
    }

    /// Serve a request path, falling back to `index.html`
    pub async fn serve(&self, path: &str) -> Response {
        let rel = path.trim_start_matches('/');
        if !rel.is_empty() {
            let res = self.serve_file(rel).await;
            if res.status() != StatusCode::NOT_FOUND {
                return res;
            }
        }
        self.serve_file("index.html").await
    }

    async fn serve_file(&self, rel: &str) -> Response {
        let Some(dir) = self.dir.as_ref() else {
            return (StatusCode::NOT_FOUND, "Not found").into_response();
        };

        let Ok(canon_dir) = dir.canonicalize() else {
            warn!("Static UI directory {} is not readable", dir.display());
            return (StatusCode::NOT_FOUND, "Not found").into_response();
        };
        let Ok(canon_req) = dir.join(rel).canonicalize() else {
            return (StatusCode::NOT_FOUND, "Not found").into_response();
        };
        // Keep lookups inside the UI directory.
        if !canon_req.starts_with(&canon_dir) {
            return (StatusCode::FORBIDDEN, "Forbidden").into_response();
        }
        if !canon_req.is_file() {
            return (StatusCode::NOT_FOUND, "Not found").into_response();
        }

        match tokio::fs::read(&canon_req).await {
            Ok(bytes) => {
                let mime = mime_guess::from_path(&canon_req).first_or_octet_stream();
                (
                    StatusCode::OK,
                    [(header::CONTENT_TYPE, mime.essence_str().to_string())],
                    bytes,
                )
                    .into_response()
            }
            Err(e) => {
                warn!("Failed to read {}: {}", canon_req.display(), e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Read error").into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ui_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<html>console</html>").unwrap();
        std::fs::create_dir(dir.path().join("assets")).unwrap();
        std::fs::write(dir.path().join("assets/app.js"), "console.log(1)").unwrap();
        dir
    }

    #[tokio::test]
    async fn test_unconfigured_is_404() {
        let ui = UiStatic::default();
        assert_eq!(ui.serve("/").await.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_serves_files_with_mime() {
        let dir = ui_dir();
        let ui = UiStatic::new(Some(dir.path().to_path_buf()));

        let res = ui.serve("/assets/app.js").await;
        assert_eq!(res.status(), StatusCode::OK);
        let ct = res.headers().get(header::CONTENT_TYPE).unwrap().to_str().unwrap();
        assert!(ct.contains("javascript"), "{ct}");
    }

    #[tokio::test]
    async fn test_spa_fallback() {
        let dir = ui_dir();
        let ui = UiStatic::new(Some(dir.path().to_path_buf()));

        for path in ["/", "/firewall/chains", "/assets"] {
            let res = ui.serve(path).await;
            assert_eq!(res.status(), StatusCode::OK, "{path}");
            let ct = res.headers().get(header::CONTENT_TYPE).unwrap().to_str().unwrap();
            assert_eq!(ct, "text/html", "{path}");
        }
    }

    #[tokio::test]
    async fn test_traversal_is_refused() {
        let outer = tempfile::tempdir().unwrap();
        std::fs::write(outer.path().join("secret.txt"), "x").unwrap();
        let inner = outer.path().join("ui");
        std::fs::create_dir(&inner).unwrap();

        let ui = UiStatic::new(Some(inner));
        let res = ui.serve_file("../secret.txt").await;
        assert_eq!(res.status(), StatusCode::FORBIDDEN);
    }
}
