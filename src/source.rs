use crate::entry::{self, Entry};
use crate::wire::{CwdResponse, ErrorResponse, ListResponse, PERMISSION_TYPE_FULL_DISK};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Remote request budget; a hung listing server fails the request instead of
/// stalling a drill-down forever.
const REMOTE_TIMEOUT: Duration = Duration::from_secs(10);
/// Shorter budget for the startup availability probe.
const PROBE_TIMEOUT: Duration = Duration::from_secs(2);

/// Environment variable selecting the remote provider, e.g.
/// `CARDFLOW_SERVER=http://127.0.0.1:3001`.
pub const SERVER_ENV: &str = "CARDFLOW_SERVER";

/// Path substrings that typically sit behind an elevated permission grant
/// (system, library, cloud, mail, contacts storage).
const SENSITIVE_PATH_MARKERS: [&str; 6] = [
    "/Library",
    "/System",
    "Mobile Documents",
    "CloudStorage",
    "Mail",
    "Contacts",
];

/// Remediation class attached to a permission failure. Advisory only; it
/// never changes control flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionHint {
    Generic,
    RequiresElevatedGrant,
}

impl PermissionHint {
    pub fn classify(path: &str) -> Self {
        if SENSITIVE_PATH_MARKERS.iter().any(|m| path.contains(m)) {
            Self::RequiresElevatedGrant
        } else {
            Self::Generic
        }
    }

    pub fn solution(&self) -> &'static str {
        match self {
            Self::Generic => "Check that you have permission to read this folder.",
            Self::RequiresElevatedGrant => {
                "Grant Full Disk Access to this app in your system privacy settings."
            }
        }
    }

    /// `permissionType` wire value, when one applies.
    pub fn wire_code(&self) -> Option<&'static str> {
        match self {
            Self::Generic => None,
            Self::RequiresElevatedGrant => Some(PERMISSION_TYPE_FULL_DISK),
        }
    }
}

/// Non-blocking notice shown alongside an empty-or-partial listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advisory {
    pub message: String,
    pub solution: Option<String>,
}

/// One directory's worth of entries, plus an optional advisory. Cloned
/// wholesale onto the navigation stack; snapshots are values, never shared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Listing {
    pub path: PathBuf,
    pub entries: Vec<Entry>,
    pub advisory: Option<Advisory>,
}

impl Listing {
    pub fn new(path: PathBuf, entries: Vec<Entry>) -> Self {
        Self {
            path,
            entries,
            advisory: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum ListingError {
    #[error("permission denied: {path}")]
    PermissionDenied { path: String, hint: PermissionHint },
    #[error("not found: {0}")]
    NotFound(String),
    #[error("listing request failed: {0}")]
    Transport(String),
}

/// The one capability the rest of the system needs: list a directory.
/// Two interchangeable providers exist; everything downstream is
/// provider-agnostic.
pub trait DirectorySource: Send + Sync {
    fn list(&self, path: &Path) -> Result<Listing, ListingError>;
    fn describe(&self) -> &'static str;
}

/// Lists directories straight off the local filesystem.
pub struct LocalSource;

impl DirectorySource for LocalSource {
    fn list(&self, path: &Path) -> Result<Listing, ListingError> {
        let read_dir = std::fs::read_dir(path).map_err(|e| map_io_error(e, path))?;

        let mut entries = Vec::new();
        for dir_entry in read_dir.flatten() {
            let name = dir_entry.file_name().to_string_lossy().to_string();
            if entry::is_hidden(&name) {
                continue;
            }
            // Entries whose metadata cannot be read are skipped; the listing
            // continues with whatever was readable.
            let Ok(metadata) = dir_entry.metadata() else {
                continue;
            };
            let entry_path = dir_entry.path();
            if metadata.is_dir() {
                entries.push(Entry::folder(name, entry_path));
            } else {
                entries.push(Entry::file(name, entry_path, metadata.len()));
            }
        }

        entry::sort_entries(&mut entries);
        if let Some(sentinel) = Entry::parent_sentinel(path) {
            entries.insert(0, sentinel);
        }

        tracing::debug!(path = %path.display(), count = entries.len(), "listed local directory");
        Ok(Listing::new(path.to_path_buf(), entries))
    }

    fn describe(&self) -> &'static str {
        "local"
    }
}

fn map_io_error(error: std::io::Error, path: &Path) -> ListingError {
    let path_str = path.to_string_lossy().to_string();
    match error.kind() {
        std::io::ErrorKind::PermissionDenied => ListingError::PermissionDenied {
            hint: PermissionHint::classify(&path_str),
            path: path_str,
        },
        std::io::ErrorKind::NotFound => ListingError::NotFound(path_str),
        _ => ListingError::Transport(format!("{path_str}: {error}")),
    }
}

/// Lists directories through the `cardflow-server` JSON endpoints.
pub struct RemoteSource {
    base_url: String,
    agent: ureq::Agent,
}

impl RemoteSource {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            agent: ureq::AgentBuilder::new().timeout(REMOTE_TIMEOUT).build(),
        }
    }

    /// Startup availability probe; also yields the server's suggested
    /// starting directory.
    pub fn probe(&self) -> Result<CwdResponse, ListingError> {
        let agent = ureq::AgentBuilder::new().timeout(PROBE_TIMEOUT).build();
        let response = agent
            .get(&format!("{}/cwd", self.base_url))
            .call()
            .map_err(|e| ListingError::Transport(e.to_string()))?;
        response
            .into_json::<CwdResponse>()
            .map_err(|e| ListingError::Transport(e.to_string()))
    }

    fn request(&self, path: &Path) -> Result<ListResponse, ListingError> {
        let result = self
            .agent
            .get(&format!("{}/list", self.base_url))
            .query("path", &path.to_string_lossy())
            .call();

        match result {
            Ok(response) => response
                .into_json::<ListResponse>()
                .map_err(|e| ListingError::Transport(format!("malformed listing body: {e}"))),
            Err(ureq::Error::Status(status, response)) => {
                let detail = response
                    .into_json::<ErrorResponse>()
                    .map(|body| body.error)
                    .unwrap_or_else(|_| format!("server returned status {status}"));
                Err(ListingError::Transport(detail))
            }
            Err(other) => Err(ListingError::Transport(other.to_string())),
        }
    }
}

impl DirectorySource for RemoteSource {
    fn list(&self, path: &Path) -> Result<Listing, ListingError> {
        let response = self.request(path)?;
        if !response.success {
            return Err(ListingError::Transport("listing request failed".to_string()));
        }

        let resolved = PathBuf::from(&response.path);
        let mut entries: Vec<Entry> = response
            .items
            .into_iter()
            .filter(|item| !entry::is_hidden(&item.name))
            .map(|item| Entry {
                name: item.name,
                kind: item.kind,
                size_bytes: item.size,
                path: PathBuf::from(item.path),
            })
            .collect();
        entry::sort_entries(&mut entries);

        // The wire format already normalizes permission/not-found failures
        // into a warning on an empty listing; surface it as an advisory.
        // An empty warned listing gets no sentinel, matching the zero-card
        // rendering of a denied path.
        let advisory = response.warning.map(|message| Advisory {
            message,
            solution: response.solution,
        });
        if advisory.is_none() || !entries.is_empty() {
            if let Some(sentinel) = Entry::parent_sentinel(&resolved) {
                entries.insert(0, sentinel);
            }
        }

        tracing::debug!(path = %resolved.display(), count = entries.len(), "listed remote directory");
        Ok(Listing {
            path: resolved,
            entries,
            advisory,
        })
    }

    fn describe(&self) -> &'static str {
        "remote"
    }
}

/// Apply the propagation policy of the listing boundary: permission and
/// not-found failures resolve to an empty listing plus an advisory instead
/// of erroring; only transport failures escape.
pub fn resolve_listing(
    source: &dyn DirectorySource,
    path: &Path,
) -> Result<Listing, ListingError> {
    match source.list(path) {
        Ok(listing) => Ok(listing),
        Err(ListingError::PermissionDenied { path: denied, hint }) => {
            tracing::warn!(path = %denied, "permission denied, rendering empty listing");
            Ok(Listing {
                path: PathBuf::from(&denied),
                entries: Vec::new(),
                advisory: Some(Advisory {
                    message: format!("Permission denied: {denied}"),
                    solution: Some(hint.solution().to_string()),
                }),
            })
        }
        Err(ListingError::NotFound(missing)) => {
            tracing::warn!(path = %missing, "path not found, rendering empty listing");
            Ok(Listing {
                path: PathBuf::from(&missing),
                entries: Vec::new(),
                advisory: Some(Advisory {
                    message: format!("No such folder: {missing}"),
                    solution: None,
                }),
            })
        }
        Err(other) => Err(other),
    }
}

/// Where the view starts: a provider (when one probes as usable) and the
/// initial directory to list.
pub struct SourceSelection {
    pub source: Option<Arc<dyn DirectorySource>>,
    pub start_path: PathBuf,
}

/// Pick a provider once at startup: the remote server when configured and
/// reachable, otherwise the local filesystem, otherwise none (the caller
/// falls back to the placeholder listing).
pub fn select_source() -> SourceSelection {
    if let Ok(base_url) = std::env::var(SERVER_ENV) {
        let remote = RemoteSource::new(base_url.clone());
        match remote.probe() {
            Ok(cwd) => {
                tracing::info!(server = %base_url, start = %cwd.home, "using remote listing provider");
                return SourceSelection {
                    source: Some(Arc::new(remote)),
                    start_path: PathBuf::from(cwd.home),
                };
            }
            Err(e) => {
                tracing::warn!(server = %base_url, error = %e, "remote provider unreachable, trying local");
            }
        }
    }

    let start = home_dir().unwrap_or_else(|| PathBuf::from("."));
    if std::fs::read_dir(&start).is_ok() {
        tracing::info!(start = %start.display(), "using local listing provider");
        return SourceSelection {
            source: Some(Arc::new(LocalSource)),
            start_path: start,
        };
    }

    tracing::warn!("no listing provider available, using placeholder listing");
    SourceSelection {
        source: None,
        start_path: PathBuf::new(),
    }
}

pub fn home_dir() -> Option<PathBuf> {
    std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .ok()
        .map(PathBuf::from)
}

/// Built-in listing shown when no provider is usable, so the view is never
/// empty.
pub fn placeholder_listing() -> Listing {
    let entries = vec![
        Entry::folder("Documents", "placeholder/Documents"),
        Entry::folder("Pictures", "placeholder/Pictures"),
        Entry::file("Welcome.txt", "placeholder/Welcome.txt", 256),
        Entry::file("About cards.md", "placeholder/About cards.md", 1024),
    ];
    Listing {
        path: PathBuf::from("placeholder"),
        entries,
        advisory: Some(Advisory {
            message: "No folder access available; showing sample entries.".to_string(),
            solution: None,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::EntryKind;

    #[test]
    fn test_sensitive_path_classification() {
        assert_eq!(
            PermissionHint::classify("/Library/Mail"),
            PermissionHint::RequiresElevatedGrant
        );
        assert_eq!(
            PermissionHint::classify("/Users/demo/Library/Mobile Documents"),
            PermissionHint::RequiresElevatedGrant
        );
        assert_eq!(
            PermissionHint::classify("/home/demo/projects"),
            PermissionHint::Generic
        );
        assert_eq!(
            PermissionHint::RequiresElevatedGrant.wire_code(),
            Some(PERMISSION_TYPE_FULL_DISK)
        );
        assert_eq!(PermissionHint::Generic.wire_code(), None);
    }

    #[test]
    fn test_local_listing_filters_and_sorts() {
        let root = std::env::temp_dir().join(format!("cardflow-src-{}", std::process::id()));
        let _ = std::fs::remove_dir_all(&root);
        std::fs::create_dir_all(root.join("src")).unwrap();
        std::fs::create_dir_all(root.join(".git")).unwrap();
        std::fs::write(root.join("README.md"), b"hello").unwrap();

        let listing = LocalSource.list(&root).unwrap();
        let names: Vec<&str> = listing.entries.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["..", "src", "README.md"]);
        assert_eq!(listing.entries[1].kind, EntryKind::Folder);
        assert_eq!(listing.entries[2].kind, EntryKind::File);
        assert_eq!(listing.entries[2].size_bytes, Some(5));

        std::fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn test_local_not_found_maps_to_error_kind() {
        let missing = std::env::temp_dir().join("cardflow-definitely-missing-dir");
        let err = LocalSource.list(&missing).unwrap_err();
        assert!(matches!(err, ListingError::NotFound(_)));
    }

    #[test]
    fn test_resolve_listing_turns_not_found_into_advisory() {
        let missing = std::env::temp_dir().join("cardflow-definitely-missing-dir");
        let listing = resolve_listing(&LocalSource, &missing).unwrap();
        assert!(listing.entries.is_empty());
        let advisory = listing.advisory.expect("advisory expected");
        assert!(advisory.message.contains("No such folder"));
    }

    #[test]
    fn test_resolve_listing_turns_permission_denied_into_advisory() {
        struct DeniedSource;
        impl DirectorySource for DeniedSource {
            fn list(&self, path: &Path) -> Result<Listing, ListingError> {
                let path = path.to_string_lossy().to_string();
                Err(ListingError::PermissionDenied {
                    hint: PermissionHint::classify(&path),
                    path,
                })
            }
            fn describe(&self) -> &'static str {
                "denied"
            }
        }

        let listing = resolve_listing(&DeniedSource, Path::new("/Library/Mail")).unwrap();
        assert!(listing.entries.is_empty());
        let advisory = listing.advisory.unwrap();
        assert!(advisory.message.contains("Permission denied"));
        assert!(advisory.solution.unwrap().contains("Full Disk Access"));
    }

    #[test]
    fn test_placeholder_listing_never_empty() {
        let listing = placeholder_listing();
        assert!(!listing.entries.is_empty());
        assert!(listing.advisory.is_some());
    }
}
