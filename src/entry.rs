use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::path::{Path, PathBuf};

/// Display name of the synthetic go-to-parent entry.
pub const PARENT_NAME: &str = "..";

/// Kind of a directory entry. Serialized as `"file"` / `"folder"` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Folder,
}

/// One file or folder record produced by a directory listing.
/// Identity is the path; the name is display-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub name: String,
    pub kind: EntryKind,
    pub size_bytes: Option<u64>,
    pub path: PathBuf,
}

impl Entry {
    pub fn file(name: impl Into<String>, path: impl Into<PathBuf>, size: u64) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::File,
            size_bytes: Some(size),
            path: path.into(),
        }
    }

    pub fn folder(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            kind: EntryKind::Folder,
            size_bytes: None,
            path: path.into(),
        }
    }

    /// Synthetic `..` entry pointing at the parent of `listed_path`.
    pub fn parent_sentinel(listed_path: &Path) -> Option<Self> {
        listed_path.parent().map(|parent| Self {
            name: PARENT_NAME.to_string(),
            kind: EntryKind::Folder,
            size_bytes: None,
            path: parent.to_path_buf(),
        })
    }

    pub fn is_parent_sentinel(&self) -> bool {
        self.name == PARENT_NAME
    }

    pub fn is_folder(&self) -> bool {
        self.kind == EntryKind::Folder
    }
}

/// True for entries a listing must never contain (dotfiles).
pub fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

/// Sort entries in listing order: folders before files, then case-insensitive
/// numeric-aware name order within each group. The `..` sentinel, if present,
/// stays first.
pub fn sort_entries(entries: &mut [Entry]) {
    entries.sort_by(|a, b| {
        match (a.is_parent_sentinel(), b.is_parent_sentinel()) {
            (true, false) => return Ordering::Less,
            (false, true) => return Ordering::Greater,
            _ => {}
        }
        match (a.kind, b.kind) {
            (EntryKind::Folder, EntryKind::File) => Ordering::Less,
            (EntryKind::File, EntryKind::Folder) => Ordering::Greater,
            _ => natural_cmp(&a.name, &b.name),
        }
    });
}

/// Case-insensitive comparison that orders embedded digit runs numerically,
/// so "file2" sorts before "file10".
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut ca = a.chars().peekable();
    let mut cb = b.chars().peekable();

    loop {
        match (ca.peek().copied(), cb.peek().copied()) {
            (None, None) => return Ordering::Equal,
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) => {
                if x.is_ascii_digit() && y.is_ascii_digit() {
                    let na = take_digits(&mut ca);
                    let nb = take_digits(&mut cb);
                    match compare_digit_runs(&na, &nb) {
                        Ordering::Equal => {}
                        other => return other,
                    }
                } else {
                    let xl = x.to_lowercase();
                    let yl = y.to_lowercase();
                    match xl.cmp(yl) {
                        Ordering::Equal => {
                            ca.next();
                            cb.next();
                        }
                        other => return other,
                    }
                }
            }
        }
    }
}

fn take_digits(chars: &mut std::iter::Peekable<std::str::Chars<'_>>) -> String {
    let mut run = String::new();
    while let Some(c) = chars.peek().copied() {
        if c.is_ascii_digit() {
            run.push(c);
            chars.next();
        } else {
            break;
        }
    }
    run
}

fn compare_digit_runs(a: &str, b: &str) -> Ordering {
    let a_trim = a.trim_start_matches('0');
    let b_trim = b.trim_start_matches('0');
    match a_trim.len().cmp(&b_trim.len()) {
        Ordering::Equal => a_trim.cmp(b_trim).then_with(|| a.len().cmp(&b.len())),
        other => other,
    }
}

pub fn format_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if size >= GB {
        format!("{:.2} GB", size as f64 / GB as f64)
    } else if size >= MB {
        format!("{:.2} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.2} KB", size as f64 / KB as f64)
    } else {
        format!("{} B", size)
    }
}

/// Middle-ellipsis truncation for card labels.
pub fn truncate_label(name: &str, max_chars: usize) -> String {
    let chars: Vec<char> = name.chars().collect();
    if chars.len() <= max_chars || max_chars < 5 {
        return name.to_string();
    }
    let keep = max_chars - 1;
    let head = keep / 2 + keep % 2;
    let tail = keep / 2;
    let mut out: String = chars[..head].iter().collect();
    out.push('…');
    out.extend(chars[chars.len() - tail..].iter());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(entries: &[Entry]) -> Vec<&str> {
        entries.iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn test_folders_sort_before_files() {
        let mut entries = vec![
            Entry::file("README.md", "/r/README.md", 10),
            Entry::folder("src", "/r/src"),
        ];
        sort_entries(&mut entries);
        assert_eq!(names(&entries), vec!["src", "README.md"]);
    }

    #[test]
    fn test_case_insensitive_within_group() {
        let mut entries = vec![
            Entry::file("zeta.txt", "/r/zeta.txt", 1),
            Entry::file("Alpha.txt", "/r/Alpha.txt", 1),
            Entry::file("beta.txt", "/r/beta.txt", 1),
        ];
        sort_entries(&mut entries);
        assert_eq!(names(&entries), vec!["Alpha.txt", "beta.txt", "zeta.txt"]);
    }

    #[test]
    fn test_numeric_aware_ordering() {
        assert_eq!(natural_cmp("file2", "file10"), Ordering::Less);
        assert_eq!(natural_cmp("file10", "file2"), Ordering::Greater);
        assert_eq!(natural_cmp("v1.2", "v1.10"), Ordering::Less);
        assert_eq!(natural_cmp("abc", "ABC"), Ordering::Equal);
        assert_eq!(natural_cmp("a02", "a2"), Ordering::Greater); // longer zero-padded run loses ties
    }

    #[test]
    fn test_parent_sentinel_stays_first() {
        let mut entries = vec![
            Entry::file("a.txt", "/r/a.txt", 1),
            Entry::parent_sentinel(Path::new("/r")).unwrap(),
            Entry::folder("zoo", "/r/zoo"),
        ];
        sort_entries(&mut entries);
        assert_eq!(names(&entries), vec!["..", "zoo", "a.txt"]);
    }

    #[test]
    fn test_parent_sentinel_of_root_is_none() {
        assert!(Entry::parent_sentinel(Path::new("/")).is_none());
        let sentinel = Entry::parent_sentinel(Path::new("/home/user")).unwrap();
        assert_eq!(sentinel.path, PathBuf::from("/home"));
        assert!(sentinel.is_parent_sentinel());
        assert!(sentinel.is_folder());
    }

    #[test]
    fn test_hidden_detection() {
        assert!(is_hidden(".git"));
        assert!(is_hidden(".DS_Store"));
        assert!(!is_hidden("src"));
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.00 KB");
        assert_eq!(format_size(5 * 1024 * 1024), "5.00 MB");
    }

    #[test]
    fn test_truncate_label() {
        assert_eq!(truncate_label("short.txt", 20), "short.txt");
        let long = "a_very_long_file_name_indeed.tar.gz";
        let truncated = truncate_label(long, 15);
        assert_eq!(truncated.chars().count(), 15);
        assert!(truncated.contains('…'));
        assert!(truncated.starts_with("a_very"));
        assert!(truncated.ends_with("tar.gz"));
    }
}
