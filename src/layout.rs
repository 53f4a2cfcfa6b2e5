use std::path::{Path, PathBuf};

use crate::error::TransferError;
use crate::identity::session_for_dump;
use crate::transfer::sorted_child_dirs;

/// A recognized `A1`..`A4` directory directly under the source root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DumpDir {
    pub name: String,
    pub path: PathBuf,
    pub session_id: u8,
}

/// Which of the two source layouts a run uses. Decided once per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LayoutMode {
    /// Subject folders grouped under dump folders; `dumps` is the name-sorted seed.
    DumpAware { dumps: Vec<DumpDir> },
    /// Subject folders directly under the source root.
    Legacy,
}

impl LayoutMode {
    pub fn name(&self) -> &'static str {
        match self {
            LayoutMode::DumpAware { .. } => "dump-aware",
            LayoutMode::Legacy => "legacy",
        }
    }

    /// Directories whose children are subject folders, paired with the dump
    /// name that applies to them.
    pub fn seeds<'a>(&'a self, source_root: &'a Path) -> Vec<(Option<&'a str>, &'a Path)> {
        match self {
            LayoutMode::DumpAware { dumps } => {
                dumps.iter().map(|d| (Some(d.name.as_str()), d.path.as_path())).collect()
            }
            LayoutMode::Legacy => vec![(None, source_root)],
        }
    }
}

/// Inspect the top level of `source_root`. Any recognized dump directory
/// selects the dump-aware layout; stray subject folders next to them are then
/// ignored.
pub fn detect_layout(source_root: &Path) -> Result<LayoutMode, TransferError> {
    let dumps: Vec<DumpDir> = sorted_child_dirs(source_root)?
        .into_iter()
        .filter_map(|(name, path)| {
            session_for_dump(&name).map(|session_id| DumpDir { name, path, session_id })
        })
        .collect();

    if dumps.is_empty() { Ok(LayoutMode::Legacy) } else { Ok(LayoutMode::DumpAware { dumps }) }
}
