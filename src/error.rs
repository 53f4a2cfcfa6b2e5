use std::path::{Path, PathBuf};

/// Fatal conditions raised by the actigraphy planner. Skippable entries never
/// surface here; they go to the reporter instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferError {
    /// No `--base-path` and no `BASE_PATH` in the environment.
    MissingBasePath,
    /// `<base>/ne-dump/Actigraph` is missing or not a directory.
    SourceNotFound(PathBuf),
    /// Archive handling was requested but `ne-dump` already has subdirectories.
    ArchiveTreePopulated { dir: PathBuf, subdirs: Vec<String> },
    /// More than one archive candidate sits in `ne-dump`.
    MultipleArchives { dir: PathBuf, archives: Vec<String> },
    ArchiveUnreadable { path: PathBuf, reason: String },
    ReadDirFailed(PathBuf, String),
    CreateDirFailed(PathBuf, String),
    CopyFailed { source: PathBuf, destination: PathBuf, reason: String },
    /// Two sources resolved to the same destination under `CollisionPolicy::Fail`.
    DestinationCollision { destination: PathBuf, first: PathBuf, second: PathBuf },
}

impl std::fmt::Display for TransferError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use TransferError::*;
        match self {
            MissingBasePath => {
                write!(f, "BASE_PATH environment variable must be set or --base-path provided")
            }
            SourceNotFound(p) => {
                write!(f, "Actigraphy source directory not found: {}", display_path(p))
            }
            ArchiveTreePopulated { dir, subdirs } => write!(
                f,
                "refusing to extract: {} already contains directories ({}); remove them or run without --handle-zip",
                display_path(dir),
                subdirs.join(", ")
            ),
            MultipleArchives { dir, archives } => write!(
                f,
                "multiple archives found in {} ({}); keep exactly one",
                display_path(dir),
                archives.join(", ")
            ),
            ArchiveUnreadable { path, reason } => {
                write!(f, "cannot read archive {}: {}", display_path(path), reason)
            }
            ReadDirFailed(p, msg) => write!(f, "cannot list directory {}: {}", display_path(p), msg),
            CreateDirFailed(p, msg) => {
                write!(f, "cannot create directory {}: {}", display_path(p), msg)
            }
            CopyFailed { source, destination, reason } => write!(
                f,
                "copy {} -> {} failed: {}",
                display_path(source),
                display_path(destination),
                reason
            ),
            DestinationCollision { destination, first, second } => write!(
                f,
                "destination collision at {}: {} and {} resolve to the same subject/session",
                display_path(destination),
                display_path(first),
                display_path(second)
            ),
        }
    }
}

impl std::error::Error for TransferError {}

impl TransferError {
    /// Process exit status for this condition. Always non-zero.
    pub fn exit_code(&self) -> i32 {
        use TransferError::*;
        match self {
            MissingBasePath => 2,
            SourceNotFound(_) => 3,
            ArchiveTreePopulated { .. } | MultipleArchives { .. } | ArchiveUnreadable { .. } => 4,
            ReadDirFailed(..) | CreateDirFailed(..) | CopyFailed { .. } => 5,
            DestinationCollision { .. } => 6,
        }
    }
}

/// Errors from assembling or running a `globus transfer` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// Each entry is `(setting, env var)`.
    MissingConfig(Vec<(&'static str, &'static str)>),
    RelativeDestinationPath(String),
    EmptySourcePath,
    InvalidExtraFlags(String),
    InvalidSyncLevel(String),
    CliNotFound(String),
    Spawn(String, String),
    CommandFailed { code: Option<i32> },
}

impl std::fmt::Display for SyncError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use SyncError::*;
        match self {
            MissingConfig(missing) => {
                let detail = missing
                    .iter()
                    .map(|(key, var)| format!("{} (set via {})", key, var))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "Missing required Globus configuration: {}", detail)
            }
            RelativeDestinationPath(p) => {
                write!(f, "destination_path must be absolute (start with '/'): {}", p)
            }
            EmptySourcePath => write!(f, "source_path must be provided"),
            InvalidExtraFlags(raw) => write!(f, "cannot split extra flags: {}", raw),
            InvalidSyncLevel(l) => {
                write!(f, "unsupported sync level '{}' (expected exists, size, mtime or checksum)", l)
            }
            CliNotFound(cmd) => write!(f, "Globus CLI not found on PATH: {}", cmd),
            Spawn(cmd, msg) => write!(f, "failed to run {}: {}", cmd, msg),
            CommandFailed { code: Some(c) } => {
                write!(f, "Globus transfer failed with exit code {}.", c)
            }
            CommandFailed { code: None } => write!(f, "Globus transfer terminated by signal."),
        }
    }
}

impl std::error::Error for SyncError {}

impl SyncError {
    pub fn exit_code(&self) -> i32 {
        match self {
            SyncError::CommandFailed { code: Some(c) } if *c != 0 => *c,
            _ => 1,
        }
    }
}

fn display_path(p: &Path) -> String {
    crate::transfer::display_path(p).to_string()
}
