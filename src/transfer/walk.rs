use std::path::{Path, PathBuf};

use crate::error::TransferError;
use crate::identity::{self, Resolution, SubjectSession};
use crate::layout::LayoutMode;
use crate::reporter::Reporter;

use super::sorted_child_dirs;

pub(super) struct Candidate {
    pub source: PathBuf,
    pub identity: SubjectSession,
}

// One walk for both layouts: seed dirs -> subject dirs -> version dirs -> files.
// Seeds, subjects and versions are name-sorted; files keep directory-listing order.
pub(super) fn collect_candidates(
    mode: &LayoutMode,
    source_root: &Path,
    reporter: &dyn Reporter,
) -> Result<Vec<Candidate>, TransferError> {
    let mut out = Vec::new();
    for (dump, seed) in mode.seeds(source_root) {
        for (subject_name, subject_dir) in sorted_child_dirs(seed)? {
            let subject_id = match identity::subject_id(&subject_name) {
                Ok(id) => id,
                Err(reason) => {
                    reporter.on_skip(&subject_dir, reason);
                    continue;
                }
            };
            reporter.on_subject(&subject_dir, &subject_id, dump);

            for (version_name, version_dir) in sorted_child_dirs(&subject_dir)? {
                let resolved = match identity::resolve(mode, dump, &subject_name, &version_name) {
                    Resolution::Resolved(r) => r,
                    Resolution::Skip(reason) => {
                        reporter.on_skip(&version_dir, reason);
                        continue;
                    }
                };
                for source in candidate_files(&version_dir)? {
                    out.push(Candidate { source, identity: resolved.clone() });
                }
            }
        }
    }
    Ok(out)
}

// `*RAW.csv` regular files directly inside `dir`, in listing order.
fn candidate_files(dir: &Path) -> Result<Vec<PathBuf>, TransferError> {
    let rd = std::fs::read_dir(dir)
        .map_err(|e| TransferError::ReadDirFailed(dir.to_path_buf(), e.to_string()))?;
    let mut files = Vec::new();
    for ent in rd {
        let ent = match ent {
            Ok(e) => e,
            Err(e) => {
                tracing::debug!("skipping unreadable entry in {}: {}", dir.display(), e);
                continue;
            }
        };
        let name = ent.file_name();
        if !identity::is_candidate_file(&name.to_string_lossy()) {
            continue;
        }
        let path = ent.path();
        if path.is_file() {
            files.push(path);
        } else {
            tracing::debug!(
                "{} matches *{} but is not a file",
                path.display(),
                identity::CANDIDATE_SUFFIX
            );
        }
    }
    Ok(files)
}
