//! Subject/session identity derived from directory names.
//!
//! Everything here works on plain strings so the rules can be exercised
//! without a filesystem.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;

use crate::layout::LayoutMode;

pub const SUBJECT_SUFFIX: &str = "_Actigraphy";
pub const CANDIDATE_SUFFIX: &str = "RAW.csv";

/// Dump directory name -> session number.
pub const DUMP_SESSIONS: [(&str, u8); 4] = [("A1", 1), ("A2", 2), ("A3", 3), ("A4", 4)];

/// Version directory name -> session number (legacy layout). Matched without
/// regard to ASCII case.
pub const VERSION_SESSIONS: [(&str, u8); 3] = [("v0", 1), ("v3", 2), ("v5", 3)];

// Non-greedy: the id stops at the first suffix occurrence.
static SUBJECT_DIR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^(?s)(.*?){}", regex::escape(SUBJECT_SUFFIX)))
        .expect("valid subject regex")
});

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubjectSession {
    pub subject_id: String,
    pub session_id: u8,
}

impl SubjectSession {
    /// `<root>/sub-<id>/accel/ses-<n>`
    pub fn destination_dir(&self, root: &Path) -> PathBuf {
        root.join(format!("sub-{}", self.subject_id))
            .join("accel")
            .join(format!("ses-{}", self.session_id))
    }

    /// `<root>/sub-<id>/accel/ses-<n>/sub-<id>_ses-<n>_accel.csv`
    pub fn destination_file(&self, root: &Path) -> PathBuf {
        self.destination_dir(root)
            .join(format!("sub-{}_ses-{}_accel.csv", self.subject_id, self.session_id))
    }
}

/// Why an entry contributes no transfer pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    NotSubjectDir,
    EmptySubjectId,
    UnknownVersion,
    UnknownDump,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            SkipReason::NotSubjectDir => "name does not end with _Actigraphy",
            SkipReason::EmptySubjectId => "missing subject_id",
            SkipReason::UnknownVersion => "no session mapping available",
            SkipReason::UnknownDump => "not a recognized dump directory",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved(SubjectSession),
    Skip(SkipReason),
}

/// Subject id from a `<id>_Actigraphy` directory name: the text before the
/// first `_Actigraphy`, trimmed. `Err` tells the caller why the directory is
/// not usable.
pub fn subject_id(subject_dir: &str) -> Result<String, SkipReason> {
    if !subject_dir.ends_with(SUBJECT_SUFFIX) {
        return Err(SkipReason::NotSubjectDir);
    }
    let caps = SUBJECT_DIR_RE.captures(subject_dir).ok_or(SkipReason::NotSubjectDir)?;
    let id = caps.get(1).map(|m| m.as_str().trim()).unwrap_or("");
    if id.is_empty() {
        return Err(SkipReason::EmptySubjectId);
    }
    Ok(id.to_string())
}

pub fn session_for_dump(dump_dir: &str) -> Option<u8> {
    DUMP_SESSIONS.iter().find(|(name, _)| *name == dump_dir).map(|(_, s)| *s)
}

pub fn session_for_version(version_dir: &str) -> Option<u8> {
    VERSION_SESSIONS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(version_dir))
        .map(|(_, s)| *s)
}

pub fn is_candidate_file(name: &str) -> bool {
    name.ends_with(CANDIDATE_SUFFIX)
}

/// Dump-aware layout: session from the dump directory, version ignored.
pub fn resolve_dump_aware(dump_dir: &str, subject_dir: &str) -> Resolution {
    let Some(session_id) = session_for_dump(dump_dir) else {
        return Resolution::Skip(SkipReason::UnknownDump);
    };
    match subject_id(subject_dir) {
        Ok(subject_id) => Resolution::Resolved(SubjectSession { subject_id, session_id }),
        Err(reason) => Resolution::Skip(reason),
    }
}

/// Legacy layout: session from the version directory.
pub fn resolve_legacy(subject_dir: &str, version_dir: &str) -> Resolution {
    let subject_id = match subject_id(subject_dir) {
        Ok(id) => id,
        Err(reason) => return Resolution::Skip(reason),
    };
    match session_for_version(version_dir) {
        Some(session_id) => Resolution::Resolved(SubjectSession { subject_id, session_id }),
        None => Resolution::Skip(SkipReason::UnknownVersion),
    }
}

/// Single entry point used by the traversal. `dump_dir` is only consulted in
/// dump-aware mode.
pub fn resolve(
    mode: &LayoutMode,
    dump_dir: Option<&str>,
    subject_dir: &str,
    version_dir: &str,
) -> Resolution {
    match mode {
        LayoutMode::DumpAware { .. } => match dump_dir {
            Some(d) => resolve_dump_aware(d, subject_dir),
            None => Resolution::Skip(SkipReason::UnknownDump),
        },
        LayoutMode::Legacy => resolve_legacy(subject_dir, version_dir),
    }
}
