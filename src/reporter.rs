use std::path::Path;

use crate::archive::PendingArchive;
use crate::identity::SkipReason;
use crate::layout::LayoutMode;
use crate::transfer::TransferPair;

/// Sink for planner events. The planner itself never touches global logging
/// state; callers decide where events go. All methods default to no-ops.
pub trait Reporter {
    fn on_archive_found(&self, _archive: &PendingArchive, _dry_run: bool) {}
    fn on_archive_preview(&self, _line: &str) {}
    fn on_no_archive(&self, _dir: &Path) {}
    fn on_layout_detected(&self, _mode: &LayoutMode) {}
    fn on_subject(&self, _subject_dir: &Path, _subject_id: &str, _dump: Option<&str>) {}
    fn on_skip(&self, _path: &Path, _reason: SkipReason) {}
    fn on_pair(&self, _pair: &TransferPair, _dry_run: bool) {}
    /// Apply mode only, after the bytes and timestamps landed.
    fn on_copied(&self, _pair: &TransferPair, _bytes: u64) {}
    fn on_collision(&self, _destination: &Path, _previous: &Path, _current: &Path) {}
    fn on_complete(&self, _pairs: usize, _dry_run: bool) {}
}

/// No-op reporter.
pub struct SilentReporter;

impl Reporter for SilentReporter {}

/// Reporter that forwards every event to `tracing`.
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn on_archive_found(&self, archive: &PendingArchive, dry_run: bool) {
        if dry_run {
            tracing::info!("Would extract {} ({} archive)", archive.path.display(), archive.kind);
        } else {
            tracing::info!("Extracting {} ({} archive)", archive.path.display(), archive.kind);
        }
    }

    fn on_archive_preview(&self, line: &str) {
        tracing::info!("{}", line);
    }

    fn on_no_archive(&self, dir: &Path) {
        tracing::info!("No archive found in {}; nothing to extract", dir.display());
    }

    fn on_layout_detected(&self, mode: &LayoutMode) {
        match mode {
            LayoutMode::DumpAware { dumps } => tracing::debug!(
                "Detected {} layout with {} dump directory(ies)",
                mode.name(),
                dumps.len()
            ),
            LayoutMode::Legacy => tracing::debug!("Detected {} layout", mode.name()),
        }
    }

    fn on_subject(&self, subject_dir: &Path, subject_id: &str, dump: Option<&str>) {
        match dump {
            Some(d) => tracing::debug!(
                "Processing subject {} in {} (dump={})",
                subject_id,
                subject_dir.display(),
                d
            ),
            None => tracing::debug!("Processing subject {} in {}", subject_id, subject_dir.display()),
        }
    }

    fn on_skip(&self, path: &Path, reason: SkipReason) {
        tracing::debug!("Skipping {}: {}", path.display(), reason);
    }

    fn on_pair(&self, pair: &TransferPair, dry_run: bool) {
        tracing::debug!(
            "{} {} -> {}",
            if dry_run { "Would copy" } else { "Copying" },
            pair.source.display(),
            pair.destination.display()
        );
    }

    fn on_copied(&self, pair: &TransferPair, bytes: u64) {
        tracing::debug!("Copied {} ({} bytes)", pair.destination.display(), bytes);
    }

    fn on_collision(&self, destination: &Path, previous: &Path, current: &Path) {
        tracing::warn!(
            "{} and {} both map to {}; the later file wins",
            previous.display(),
            current.display(),
            destination.display()
        );
    }

    fn on_complete(&self, pairs: usize, dry_run: bool) {
        tracing::info!("Identified {} file(s) for transfer (dry_run={})", pairs, dry_run);
    }
}
