//! JSON bodies of the listing endpoints, shared by the `cardflow-server`
//! binary and the remote provider client.
//!
//! - `GET /list?path=` → `ListResponse` (permission/not-found failures are
//!   normalized to a 200 with empty `items` plus `warning`/`solution`, so the
//!   caller always gets a renderable listing)
//! - `GET /cwd` → `CwdResponse`
//! - `GET /permissions` → `PermissionsResponse`
//! - transport-level failures → HTTP 500 with `ErrorResponse`

use crate::entry::EntryKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Wire value of `permissionType` when a sensitive path needs an elevated
/// grant (Full Disk Access or equivalent).
pub const PERMISSION_TYPE_FULL_DISK: &str = "full_disk_access_required";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListItem {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: EntryKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    pub path: String,
    pub modified: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse {
    pub success: bool,
    /// Resolved absolute path that was listed.
    pub path: String,
    pub items: Vec<ListItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub solution: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permission_type: Option<String>,
}

impl ListResponse {
    pub fn ok(path: String, items: Vec<ListItem>) -> Self {
        Self {
            success: true,
            path,
            items,
            warning: None,
            solution: None,
            permission_type: None,
        }
    }

    /// Empty-but-renderable listing carrying an advisory instead of an error.
    pub fn advisory(
        path: String,
        warning: String,
        solution: Option<String>,
        permission_type: Option<String>,
    ) -> Self {
        Self {
            success: true,
            path,
            items: Vec::new(),
            warning: Some(warning),
            solution,
            permission_type,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub code: String,
    pub path: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CwdResponse {
    pub success: bool,
    pub cwd: String,
    pub home: String,
    pub has_full_disk_access: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionsResponse {
    pub success: bool,
    pub has_full_disk_access: bool,
    pub guidance: String,
}
