//! One-time archive handling for the `ne-dump` directory.
//!
//! An archive is only considered when `ne-dump` holds files and nothing else.
//! Any subdirectory means the tree is already populated and the guard refuses.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;

use crate::error::TransferError;
use crate::reporter::Reporter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    Zip,
    Tar,
    TarGz,
}

impl ArchiveKind {
    /// Classify by file name; matching ignores ASCII case.
    pub fn from_file_name(name: &str) -> Option<Self> {
        let lower = name.to_ascii_lowercase();
        if lower.ends_with(".zip") {
            Some(ArchiveKind::Zip)
        } else if lower.ends_with(".tar.gz") || lower.ends_with(".tgz") {
            Some(ArchiveKind::TarGz)
        } else if lower.ends_with(".tar") {
            Some(ArchiveKind::Tar)
        } else {
            None
        }
    }
}

impl std::fmt::Display for ArchiveKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ArchiveKind::Zip => "zip",
            ArchiveKind::Tar => "tar",
            ArchiveKind::TarGz => "tar.gz",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingArchive {
    pub path: PathBuf,
    pub kind: ArchiveKind,
}

/// One entry of an archive's member list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub name: String,
    pub is_dir: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArchiveOutcome {
    NoArchive,
    Previewed { archive: PendingArchive, lines: Vec<String> },
    Extracted { archive: PendingArchive },
}

/// Look for the single archive directly inside `dump_dir`.
///
/// Fails if `dump_dir` already contains a directory, or if more than one
/// archive is present. A missing `dump_dir` yields `Ok(None)`; the planner's
/// source check reports that case.
pub fn find_pending_archive(dump_dir: &Path) -> Result<Option<PendingArchive>, TransferError> {
    if !dump_dir.is_dir() {
        return Ok(None);
    }
    let rd = std::fs::read_dir(dump_dir)
        .map_err(|e| TransferError::ReadDirFailed(dump_dir.to_path_buf(), e.to_string()))?;

    let mut subdirs = Vec::new();
    let mut archives = Vec::new();
    for ent in rd {
        let ent =
            ent.map_err(|e| TransferError::ReadDirFailed(dump_dir.to_path_buf(), e.to_string()))?;
        let path = ent.path();
        let name = ent.file_name().to_string_lossy().into_owned();
        if path.is_dir() {
            subdirs.push(name);
        } else if let Some(kind) = ArchiveKind::from_file_name(&name) {
            archives.push(PendingArchive { path, kind });
        }
    }

    if !subdirs.is_empty() {
        subdirs.sort();
        return Err(TransferError::ArchiveTreePopulated { dir: dump_dir.to_path_buf(), subdirs });
    }
    archives.sort_by(|a, b| a.path.cmp(&b.path));
    match archives.len() {
        0 => Ok(None),
        1 => Ok(archives.pop()),
        _ => Err(TransferError::MultipleArchives {
            dir: dump_dir.to_path_buf(),
            archives: archives
                .iter()
                .map(|a| {
                    a.path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default()
                })
                .collect(),
        }),
    }
}

fn unreadable(path: &Path, e: impl std::fmt::Display) -> TransferError {
    TransferError::ArchiveUnreadable { path: path.to_path_buf(), reason: e.to_string() }
}

fn open(path: &Path) -> Result<BufReader<File>, TransferError> {
    File::open(path).map(BufReader::new).map_err(|e| unreadable(path, e))
}

/// Read the member list in archive order without extracting anything.
pub fn read_members(archive: &PendingArchive) -> Result<Vec<Member>, TransferError> {
    let path = archive.path.as_path();
    match archive.kind {
        ArchiveKind::Zip => {
            let mut zip = zip::ZipArchive::new(open(path)?).map_err(|e| unreadable(path, e))?;
            let mut out = Vec::with_capacity(zip.len());
            for idx in 0..zip.len() {
                let entry = zip.by_index(idx).map_err(|e| unreadable(path, e))?;
                out.push(Member { name: entry.name().to_string(), is_dir: entry.is_dir() });
            }
            Ok(out)
        }
        ArchiveKind::Tar => tar_members(open(path)?, path),
        ArchiveKind::TarGz => tar_members(GzDecoder::new(open(path)?), path),
    }
}

fn tar_members<R: Read>(reader: R, path: &Path) -> Result<Vec<Member>, TransferError> {
    let mut tar = tar::Archive::new(reader);
    let entries = tar.entries().map_err(|e| unreadable(path, e))?;
    let mut out = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| unreadable(path, e))?;
        let is_dir = entry.header().entry_type().is_dir();
        let name = entry.path().map_err(|e| unreadable(path, e))?.to_string_lossy().into_owned();
        out.push(Member { name, is_dir });
    }
    Ok(out)
}

/// Render the hierarchy a member list expands to: every unique path prefix
/// once, in first-seen order, indented two spaces per level. A prefix gets a
/// trailing `/` when it is a directory entry or has anything below it.
pub fn preview_lines(members: &[Member]) -> Vec<String> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut nodes: Vec<(usize, String, bool)> = Vec::new();
    for member in members {
        let parts: Vec<&str> =
            member.name.split(['/', '\\']).filter(|p| !p.is_empty() && *p != ".").collect();
        for (depth, part) in parts.iter().enumerate() {
            let is_dir = depth + 1 < parts.len() || member.is_dir;
            let prefix = parts[..=depth].join("/");
            match index.get(&prefix) {
                Some(&i) => nodes[i].2 |= is_dir,
                None => {
                    index.insert(prefix, nodes.len());
                    nodes.push((depth, part.to_string(), is_dir));
                }
            }
        }
    }
    nodes
        .into_iter()
        .map(|(depth, part, is_dir)| {
            format!("{}{}{}", "  ".repeat(depth), part, if is_dir { "/" } else { "" })
        })
        .collect()
}

/// Unpack `archive` into `dest`.
pub fn extract(archive: &PendingArchive, dest: &Path) -> Result<(), TransferError> {
    let path = archive.path.as_path();
    match archive.kind {
        ArchiveKind::Zip => {
            let mut zip = zip::ZipArchive::new(open(path)?).map_err(|e| unreadable(path, e))?;
            zip.extract(dest).map_err(|e| unreadable(path, e))
        }
        ArchiveKind::Tar => tar::Archive::new(open(path)?).unpack(dest).map_err(|e| unreadable(path, e)),
        ArchiveKind::TarGz => tar::Archive::new(GzDecoder::new(open(path)?))
            .unpack(dest)
            .map_err(|e| unreadable(path, e)),
    }
}

/// Decide whether to preview, extract, or do nothing for `dump_dir`.
///
/// The member list is read before extraction, so an unreadable archive aborts
/// the run before anything lands on disk.
pub fn guard_archive(
    dump_dir: &Path,
    dry_run: bool,
    reporter: &dyn Reporter,
) -> Result<ArchiveOutcome, TransferError> {
    let Some(archive) = find_pending_archive(dump_dir)? else {
        reporter.on_no_archive(dump_dir);
        return Ok(ArchiveOutcome::NoArchive);
    };
    reporter.on_archive_found(&archive, dry_run);

    let members = read_members(&archive)?;
    if dry_run {
        let lines = preview_lines(&members);
        for line in &lines {
            reporter.on_archive_preview(line);
        }
        return Ok(ArchiveOutcome::Previewed { archive, lines });
    }

    extract(&archive, dump_dir)?;
    tracing::debug!("extracted {} member(s) into {}", members.len(), dump_dir.display());
    Ok(ArchiveOutcome::Extracted { archive })
}
