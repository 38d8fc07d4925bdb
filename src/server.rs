//! Listing endpoints served by `cardflow-server`.
//!
//! - GET /list?path=      directory contents (files and folders)
//! - GET /cwd             startup probe: initial path + permission status
//! - GET /permissions     elevated-grant probe with guidance text
//!
//! Permission and not-found failures come back as HTTP 200 with an empty
//! `items` array and a `warning`/`solution` pair, so the client always
//! receives a renderable listing; only unexpected I/O maps to HTTP 500.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

use crate::entry::{self, EntryKind};
use crate::source::PermissionHint;
use crate::wire::{CwdResponse, ErrorResponse, ListItem, ListResponse, PermissionsResponse};

pub struct ServerState {
    /// Canonicalized root the server refuses to escape.
    pub root: PathBuf,
    pub home: PathBuf,
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("i/o error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let ServerError::Io { path, source } = self;
        let body = ErrorResponse {
            success: false,
            error: source.to_string(),
            code: io_code(&source).to_string(),
            path,
        };
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

fn io_code(error: &std::io::Error) -> &'static str {
    match error.kind() {
        std::io::ErrorKind::PermissionDenied => "EACCES",
        std::io::ErrorKind::NotFound => "ENOENT",
        std::io::ErrorKind::InvalidInput => "EINVAL",
        _ => "EIO",
    }
}

pub fn router(state: Arc<ServerState>) -> Router {
    Router::new()
        .route("/list", get(list_directory))
        .route("/cwd", get(cwd))
        .route("/permissions", get(permissions))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct ListParams {
    path: Option<String>,
}

async fn list_directory(
    State(state): State<Arc<ServerState>>,
    Query(params): Query<ListParams>,
) -> Result<Json<ListResponse>, ServerError> {
    let requested = match params.path.filter(|p| !p.is_empty()) {
        Some(p) => PathBuf::from(p),
        None => state.home.clone(),
    };

    let resolved = match std::fs::canonicalize(&requested) {
        Ok(resolved) => resolved,
        Err(e) => return Ok(Json(advisory_for(&requested, e)?)),
    };

    if !resolved.starts_with(&state.root) {
        tracing::warn!(requested = %resolved.display(), root = %state.root.display(), "refused path outside served root");
        return Ok(Json(ListResponse::advisory(
            resolved.to_string_lossy().to_string(),
            "Path is outside the served root".to_string(),
            Some("Request a folder under the served root.".to_string()),
            None,
        )));
    }

    let items = match build_items(&resolved) {
        Ok(items) => items,
        Err(e) => return Ok(Json(advisory_for(&resolved, e)?)),
    };

    tracing::debug!(path = %resolved.display(), count = items.len(), "served listing");
    Ok(Json(ListResponse::ok(
        resolved.to_string_lossy().to_string(),
        items,
    )))
}

async fn cwd(State(state): State<Arc<ServerState>>) -> Json<CwdResponse> {
    let cwd = std::env::current_dir()
        .unwrap_or_else(|_| state.home.clone())
        .to_string_lossy()
        .to_string();
    Json(CwdResponse {
        success: true,
        cwd,
        home: state.home.to_string_lossy().to_string(),
        has_full_disk_access: probe_full_disk_access(&state.home),
    })
}

async fn permissions(State(state): State<Arc<ServerState>>) -> Json<PermissionsResponse> {
    let has_full_disk_access = probe_full_disk_access(&state.home);
    let guidance = if has_full_disk_access {
        "All folders are readable.".to_string()
    } else {
        PermissionHint::RequiresElevatedGrant.solution().to_string()
    };
    Json(PermissionsResponse {
        success: true,
        has_full_disk_access,
        guidance,
    })
}

/// Normalize a permission/not-found failure into the renderable empty
/// listing; anything else is a genuine server error.
fn advisory_for(path: &Path, error: std::io::Error) -> Result<ListResponse, ServerError> {
    let path_str = path.to_string_lossy().to_string();
    match error.kind() {
        std::io::ErrorKind::PermissionDenied => {
            let hint = PermissionHint::classify(&path_str);
            Ok(ListResponse::advisory(
                path_str.clone(),
                format!("Permission denied: {path_str}"),
                Some(hint.solution().to_string()),
                hint.wire_code().map(str::to_string),
            ))
        }
        std::io::ErrorKind::NotFound => Ok(ListResponse::advisory(
            path_str.clone(),
            format!("No such folder: {path_str}"),
            Some("Check the path and try again.".to_string()),
            None,
        )),
        _ => Err(ServerError::Io {
            path: path_str,
            source: error,
        }),
    }
}

/// Read one directory into wire items: hidden entries dropped, folders before
/// files, case-insensitive numeric-aware order within each group.
fn build_items(path: &Path) -> Result<Vec<ListItem>, std::io::Error> {
    let mut items = Vec::new();
    for dir_entry in std::fs::read_dir(path)?.flatten() {
        let name = dir_entry.file_name().to_string_lossy().to_string();
        if entry::is_hidden(&name) {
            continue;
        }
        let Ok(metadata) = dir_entry.metadata() else {
            continue;
        };
        let kind = if metadata.is_dir() {
            EntryKind::Folder
        } else {
            EntryKind::File
        };
        items.push(ListItem {
            name,
            kind,
            size: (kind == EntryKind::File).then(|| metadata.len()),
            path: dir_entry.path().to_string_lossy().to_string(),
            modified: metadata.modified().ok().map(DateTime::<Utc>::from),
        });
    }

    items.sort_by(|a, b| match (a.kind, b.kind) {
        (EntryKind::Folder, EntryKind::File) => std::cmp::Ordering::Less,
        (EntryKind::File, EntryKind::Folder) => std::cmp::Ordering::Greater,
        _ => entry::natural_cmp(&a.name, &b.name),
    });
    Ok(items)
}

/// Whether the guarded parts of the home directory are readable. A missing
/// guard directory counts as readable (nothing on this platform needs the
/// elevated grant).
pub fn probe_full_disk_access(home: &Path) -> bool {
    let guarded = home.join("Library").join("Mail");
    match std::fs::read_dir(&guarded) {
        Ok(_) => true,
        Err(e) => e.kind() == std::io::ErrorKind::NotFound,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(tag: &str) -> PathBuf {
        let root = std::env::temp_dir().join(format!("cardflow-srv-{tag}-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&root);
        std::fs::create_dir_all(&root).unwrap();
        root
    }

    #[test]
    fn test_build_items_filters_and_sorts() {
        let root = scratch_dir("items");
        std::fs::create_dir(root.join("src")).unwrap();
        std::fs::create_dir(root.join(".git")).unwrap();
        std::fs::write(root.join("README.md"), b"hi").unwrap();
        std::fs::write(root.join("notes2.txt"), b"a").unwrap();
        std::fs::write(root.join("notes10.txt"), b"b").unwrap();

        let items = build_items(&root).unwrap();
        let names: Vec<&str> = items.iter().map(|i| i.name.as_str()).collect();
        // Case-insensitive within each group, so "notes" sorts before "README".
        assert_eq!(names, vec!["src", "notes2.txt", "notes10.txt", "README.md"]);
        assert_eq!(items[0].kind, EntryKind::Folder);
        assert_eq!(items[0].size, None);
        assert_eq!(items[1].size, Some(1));
        assert!(items[1].modified.is_some());
        assert_eq!(items[3].size, Some(2));

        std::fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn test_advisory_for_not_found() {
        let err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let response = advisory_for(Path::new("/nope"), err).unwrap();
        assert!(response.success);
        assert!(response.items.is_empty());
        assert!(response.warning.unwrap().contains("No such folder"));
        assert!(response.permission_type.is_none());
    }

    #[test]
    fn test_advisory_for_sensitive_permission_denied() {
        let err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let response = advisory_for(Path::new("/Library/Mail"), err).unwrap();
        assert!(response.success);
        assert!(response.items.is_empty());
        assert_eq!(
            response.permission_type.as_deref(),
            Some(crate::wire::PERMISSION_TYPE_FULL_DISK)
        );
        assert!(response.solution.unwrap().contains("Full Disk Access"));
    }

    #[test]
    fn test_unexpected_io_is_a_server_error() {
        let err = std::io::Error::new(std::io::ErrorKind::Other, "disk on fire");
        assert!(advisory_for(Path::new("/x"), err).is_err());
    }

    #[test]
    fn test_io_code_mapping() {
        let denied = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "x");
        assert_eq!(io_code(&denied), "EACCES");
        let missing = std::io::Error::new(std::io::ErrorKind::NotFound, "x");
        assert_eq!(io_code(&missing), "ENOENT");
    }
}
