//! Static-file collaborator: existence probe plus `ServeDir` delivery.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use axum::{
    body::Body,
    extract::Request,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tower_http::services::ServeDir;

/// Outcome of an existence check.
#[derive(Debug)]
pub enum Probe {
    Found,
    Missing,
    Failed(io::Error),
}

/// File-serving backend wrapped by the instrumented dispatcher.
#[async_trait]
pub trait FileServer: Send + Sync {
    /// Check that the asset at `path` can be opened, without reading it.
    async fn probe(&self, path: &str) -> Probe;
    /// Stream the response for `req` (content type, ranges, conditionals).
    async fn serve(&self, req: Request) -> Response;
}

/// Normal segments of a decoded virtual path; `None` when any segment is
/// `..`.
pub fn segments(virtual_path: &str) -> Option<Vec<&str>> {
    let mut parts = Vec::new();
    for seg in virtual_path.split('/') {
        match seg {
            "" | "." => {}
            ".." => return None,
            s => parts.push(s),
        }
    }
    Some(parts)
}

/// Canonical form of a virtual path (`//a/./b/` => `/a/b`), used as the
/// metrics key so one file is counted under one name.
pub fn clean(virtual_path: &str) -> Option<String> {
    segments(virtual_path).map(|parts| format!("/{}", parts.join("/")))
}

/// Serves a directory tree from disk.
#[derive(Clone)]
pub struct DirServer {
    root: PathBuf,
    serve_dir: ServeDir,
}

impl DirServer {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            serve_dir: ServeDir::new(&root),
            root,
        }
    }

    /// Map a decoded virtual path onto the root, with the same rules
    /// `ServeDir` applies: empty and `.` segments are skipped, and any `..`
    /// segment rejects the path (`None`).
    pub fn resolve(&self, virtual_path: &str) -> Option<PathBuf> {
        let mut full = self.root.clone();
        full.extend(segments(virtual_path)?);
        Some(full)
    }

    /// An open failing because some prefix of the path is a regular file
    /// means the asset does not exist.
    async fn under_regular_file(&self, full: &Path) -> bool {
        for dir in full.ancestors().skip(1) {
            if !dir.starts_with(&self.root) {
                break;
            }
            match tokio::fs::metadata(dir).await {
                Ok(meta) if !meta.is_dir() => return true,
                Ok(_) => {}
                Err(_) => return false,
            }
        }
        false
    }
}

#[async_trait]
impl FileServer for DirServer {
    async fn probe(&self, path: &str) -> Probe {
        let Some(full) = self.resolve(path) else {
            return Probe::Missing;
        };
        match tokio::fs::File::open(&full).await {
            // dropping the handle closes it
            Ok(_) => Probe::Found,
            Err(e) if e.kind() == io::ErrorKind::NotFound => Probe::Missing,
            Err(e) if e.kind() == io::ErrorKind::PermissionDenied => Probe::Failed(e),
            Err(e) => {
                if self.under_regular_file(&full).await {
                    Probe::Missing
                } else {
                    Probe::Failed(e)
                }
            }
        }
    }

    async fn serve(&self, req: Request) -> Response {
        let mut serve_dir = self.serve_dir.clone();
        match serve_dir.try_call(req).await {
            Ok(res) => res.map(Body::new),
            Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_skips_empty_and_current_segments() {
        let s = DirServer::new("/srv/assets");
        let full = |p: &str| s.resolve(p).unwrap();
        assert_eq!(full("/logo.png"), PathBuf::from("/srv/assets/logo.png"));
        assert_eq!(full("//img/./logo.png/"), PathBuf::from("/srv/assets/img/logo.png"));
        assert_eq!(full("/"), PathBuf::from("/srv/assets"));
    }

    #[test]
    fn resolve_rejects_parent_segments() {
        let s = DirServer::new("/srv/assets");
        assert_eq!(s.resolve("/../../etc/passwd"), None);
        assert_eq!(s.resolve("/sub/../logo.png"), None);
        // only whole segments count
        assert!(s.resolve("/a..b/c").is_some());
    }

    #[test]
    fn clean_collapses_equivalent_spellings() {
        for p in ["/logo.png", "//logo.png", "/./logo.png", "/logo.png/"] {
            assert_eq!(clean(p).as_deref(), Some("/logo.png"));
        }
        assert_eq!(clean("/").as_deref(), Some("/"));
        assert_eq!(clean("/sub/../logo.png"), None);
    }

    #[tokio::test]
    async fn parent_segment_is_missing_even_when_target_exists() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("logo.png"), b"png").unwrap();
        let s = DirServer::new(dir.path());

        assert!(matches!(s.probe("/logo.png").await, Probe::Found));
        assert!(matches!(s.probe("/sub/../logo.png").await, Probe::Missing));
    }
}
