use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::error::TransferError;

/// Direct child directories of `dir`, sorted by name. Symlinks to directories
/// count as directories. Entries that cannot be inspected are skipped; an
/// unreadable `dir` itself is fatal.
pub(crate) fn sorted_child_dirs(dir: &Path) -> Result<Vec<(String, PathBuf)>, TransferError> {
    let mut out = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).follow_links(true).sort_by_file_name()
    {
        let entry = match entry {
            Ok(e) => e,
            Err(e) if e.depth() == 0 => {
                return Err(TransferError::ReadDirFailed(dir.to_path_buf(), e.to_string()));
            }
            Err(e) => {
                tracing::debug!("skipping entry in {}: {}", display_path(dir), e);
                continue;
            }
        };
        if !entry.file_type().is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().into_owned();
        out.push((name, entry.into_path()));
    }
    Ok(out)
}

// Lightweight path display wrapper that renders with forward slashes.
// Avoids allocating strings until actually formatted for logs.
pub struct DisplayPath<'a>(pub &'a Path);

impl<'a> std::fmt::Display for DisplayPath<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = self.0.to_string_lossy();
        f.write_str(&normalize_path(&s, true))
    }
}

pub fn display_path(p: &Path) -> DisplayPath<'_> {
    DisplayPath(p)
}

/// Normalize a path-like string for display and comparison:
/// - converts backslashes to forward slashes
/// - collapses repeated slashes
/// - optionally preserves a trailing slash
pub fn normalize_path(p: &str, preserve_trailing_slash: bool) -> String {
    if p.is_empty() {
        return String::new();
    }
    let mut s = p.replace('\\', "/");
    while s.contains("//") {
        s = s.replace("//", "/");
    }
    if !preserve_trailing_slash {
        // keep root "/"
        while s.len() > 1 && s.ends_with('/') {
            s.pop();
        }
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn normalize_empty() {
        assert_eq!(normalize_path("", true), "");
        assert_eq!(normalize_path("", false), "");
    }

    #[test]
    fn normalize_windows_separators() {
        assert_eq!(normalize_path("C:\\base\\ne-dump\\Actigraph", false), "C:/base/ne-dump/Actigraph");
    }

    #[test]
    fn preserve_and_strip_trailing_slash() {
        assert_eq!(normalize_path("/a/b/", true), "/a/b/");
        assert_eq!(normalize_path("/a/b/", false), "/a/b");
        assert_eq!(normalize_path("/", false), "/");
    }

    #[test]
    fn collapse_repeated_slashes() {
        assert_eq!(normalize_path("//base///act-int-test//sub-S01", false), "/base/act-int-test/sub-S01");
    }

    #[test]
    fn child_dirs_are_sorted_and_files_dropped() {
        let tmp = tempfile::tempdir().unwrap();
        for d in ["v5", "V0", "v3"] {
            fs::create_dir(tmp.path().join(d)).unwrap();
        }
        fs::write(tmp.path().join("a RAW.csv"), b"x").unwrap();
        let names: Vec<String> =
            sorted_child_dirs(tmp.path()).unwrap().into_iter().map(|(n, _)| n).collect();
        // byte order: uppercase before lowercase
        assert_eq!(names, vec!["V0", "v3", "v5"]);
    }

    #[test]
    fn missing_dir_is_fatal() {
        let tmp = tempfile::tempdir().unwrap();
        let err = sorted_child_dirs(&tmp.path().join("nope")).unwrap_err();
        assert!(matches!(err, TransferError::ReadDirFailed(..)));
    }
}
