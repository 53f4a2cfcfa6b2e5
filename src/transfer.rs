// transfer module: plans (and in apply mode performs) the actigraphy reorganisation
mod copy;
mod helpers;
mod walk;

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::archive::{ArchiveOutcome, guard_archive};
use crate::config::Env;
use crate::error::TransferError;
use crate::layout::detect_layout;
use crate::reporter::Reporter;

pub use helpers::{display_path, normalize_path};
pub(crate) use helpers::sorted_child_dirs;

pub const DUMP_DIR: &str = "ne-dump";
pub const SOURCE_DIR: &str = "Actigraph";
pub const DESTINATION_DIR: &str = "act-int-test";

/// What to do when two sources resolve to the same destination file.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CollisionPolicy {
    /// Last traversed source wins; each collision is reported.
    #[default]
    Overwrite,
    /// Abort the run before anything is copied.
    Fail,
}

/// Inputs for one planning run.
#[derive(Clone, Debug)]
pub struct TransferOptions {
    /// Explicit base directory; falls back to `BASE_PATH`.
    pub base_path: Option<PathBuf>,
    pub dry_run: bool,
    /// `None` defers to `ACTIGRAPHY_HANDLE_ZIP`.
    pub handle_zip: Option<bool>,
    pub collision: CollisionPolicy,
}

impl Default for TransferOptions {
    fn default() -> Self {
        Self { base_path: None, dry_run: true, handle_zip: None, collision: CollisionPolicy::default() }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TransferPair {
    pub source: PathBuf,
    pub destination: PathBuf,
}

/// Fixed directories below a base path.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TreePaths {
    pub base: PathBuf,
    /// `<base>/ne-dump`, where a pending archive may sit.
    pub dump_dir: PathBuf,
    /// `<base>/ne-dump/Actigraph`
    pub source_root: PathBuf,
    /// `<base>/act-int-test`
    pub destination_root: PathBuf,
}

impl TreePaths {
    pub fn new(base: &Path) -> Self {
        let dump_dir = base.join(DUMP_DIR);
        Self {
            base: base.to_path_buf(),
            source_root: dump_dir.join(SOURCE_DIR),
            dump_dir,
            destination_root: base.join(DESTINATION_DIR),
        }
    }
}

/// Explicit path first, then `BASE_PATH`. The result is made absolute.
pub fn resolve_base_path(explicit: Option<&Path>, env: &Env) -> Result<PathBuf, TransferError> {
    let raw = match explicit {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => env.base_path().ok_or(TransferError::MissingBasePath)?,
    };
    Ok(std::path::absolute(&raw).unwrap_or(raw))
}

/// Plan against the process environment.
pub fn plan(
    opts: &TransferOptions,
    reporter: &dyn Reporter,
) -> Result<Vec<TransferPair>, TransferError> {
    plan_with_env(opts, &Env::from_process(), reporter)
}

/// Build the ordered list of transfer pairs and, unless `opts.dry_run`,
/// copy every source to its destination.
///
/// Dry and apply runs return the same list for the same tree. Nothing under
/// the source root is modified; the only source-side effect is the archive
/// extraction requested through `handle_zip`.
pub fn plan_with_env(
    opts: &TransferOptions,
    env: &Env,
    reporter: &dyn Reporter,
) -> Result<Vec<TransferPair>, TransferError> {
    let base = resolve_base_path(opts.base_path.as_deref(), env)?;
    let paths = TreePaths::new(&base);
    let handle_zip = opts.handle_zip.unwrap_or_else(|| env.handle_zip_default());
    tracing::debug!(
        "Resolved base path: {} (dry_run={}, handle_zip={})",
        display_path(&base),
        opts.dry_run,
        handle_zip
    );

    if handle_zip
        && let ArchiveOutcome::Previewed { archive, .. } =
            guard_archive(&paths.dump_dir, opts.dry_run, reporter)?
    {
        tracing::info!(
            "{} not extracted during dry run; rerun with --apply to unpack it",
            display_path(&archive.path)
        );
    }

    tracing::debug!("Scanning source root: {}", display_path(&paths.source_root));
    if !paths.source_root.is_dir() {
        return Err(TransferError::SourceNotFound(paths.source_root));
    }

    let mode = detect_layout(&paths.source_root)?;
    reporter.on_layout_detected(&mode);

    let candidates = walk::collect_candidates(&mode, &paths.source_root, reporter)?;

    let mut pairs = Vec::with_capacity(candidates.len());
    let mut claimed: HashMap<PathBuf, PathBuf> = HashMap::new();
    for candidate in candidates {
        let destination = candidate.identity.destination_file(&paths.destination_root);
        if let Some(previous) = claimed.insert(destination.clone(), candidate.source.clone()) {
            match opts.collision {
                CollisionPolicy::Fail => {
                    return Err(TransferError::DestinationCollision {
                        destination,
                        first: previous,
                        second: candidate.source,
                    });
                }
                CollisionPolicy::Overwrite => {
                    reporter.on_collision(&destination, &previous, &candidate.source)
                }
            }
        }
        let pair = TransferPair { source: candidate.source, destination };
        reporter.on_pair(&pair, opts.dry_run);
        pairs.push(pair);
    }

    if !opts.dry_run {
        for pair in &pairs {
            let bytes = copy::copy_pair(pair)?;
            reporter.on_copied(pair, bytes);
        }
    }

    reporter.on_complete(pairs.len(), opts.dry_run);
    Ok(pairs)
}
