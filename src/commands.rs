use std::cell::Cell;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use indicatif::ProgressBar;
use serde::Serialize;

use crate::archive::PendingArchive;
use crate::config::Env;
use crate::identity::SkipReason;
use crate::layout::LayoutMode;
use crate::reporter::{Reporter, TracingReporter};
use crate::sync::{GlobusSync, SyncOverrides};
use crate::transfer::{self, CollisionPolicy, TransferOptions, TransferPair};

/// Arguments for `handle_transfer`.
#[derive(Clone, Debug, Default)]
pub struct HandleTransferArgs {
    pub base_path: Option<PathBuf>,
    pub dry_run: bool,
    pub handle_zip: Option<bool>,
    pub fail_on_collision: bool,
    pub json: bool,
}

/// Arguments for `handle_sync`.
#[derive(Clone, Debug, Default)]
pub struct HandleSyncArgs {
    pub overrides: SyncOverrides,
    pub show_command: bool,
}

#[derive(Serialize)]
struct JsonPlan<'a> {
    generated_at: String,
    dry_run: bool,
    pairs: &'a [TransferPair],
}

// Forwards to tracing and advances the copy progress bar in apply mode.
struct CliReporter {
    inner: TracingReporter,
    progress: Option<ProgressBar>,
    copied_bytes: Cell<u64>,
}

impl Reporter for CliReporter {
    fn on_archive_found(&self, archive: &PendingArchive, dry_run: bool) {
        self.inner.on_archive_found(archive, dry_run)
    }
    fn on_archive_preview(&self, line: &str) {
        self.inner.on_archive_preview(line)
    }
    fn on_no_archive(&self, dir: &Path) {
        self.inner.on_no_archive(dir)
    }
    fn on_layout_detected(&self, mode: &LayoutMode) {
        self.inner.on_layout_detected(mode)
    }
    fn on_subject(&self, subject_dir: &Path, subject_id: &str, dump: Option<&str>) {
        self.inner.on_subject(subject_dir, subject_id, dump)
    }
    fn on_skip(&self, path: &Path, reason: SkipReason) {
        self.inner.on_skip(path, reason)
    }
    fn on_pair(&self, pair: &TransferPair, dry_run: bool) {
        self.inner.on_pair(pair, dry_run);
        if let Some(pb) = &self.progress {
            pb.inc_length(1);
        }
    }
    fn on_copied(&self, pair: &TransferPair, bytes: u64) {
        self.inner.on_copied(pair, bytes);
        self.copied_bytes.set(self.copied_bytes.get() + bytes);
        if let Some(pb) = &self.progress {
            if let Some(name) = pair.destination.file_name() {
                pb.set_message(name.to_string_lossy().into_owned());
            }
            pb.inc(1);
        }
    }
    fn on_collision(&self, destination: &Path, previous: &Path, current: &Path) {
        self.inner.on_collision(destination, previous, current)
    }
    fn on_complete(&self, pairs: usize, dry_run: bool) {
        self.inner.on_complete(pairs, dry_run)
    }
}

/// `transfer` subcommand: plan (and optionally copy), then print one line per
/// pair on stdout.
pub fn handle_transfer(env: &Env, args: HandleTransferArgs) -> Result<Vec<TransferPair>> {
    let HandleTransferArgs { base_path, dry_run, handle_zip, fail_on_collision, json } = args;
    let opts = TransferOptions {
        base_path,
        dry_run,
        handle_zip,
        collision: if fail_on_collision {
            CollisionPolicy::Fail
        } else {
            CollisionPolicy::Overwrite
        },
    };

    let progress = if dry_run || json { None } else { Some(crate::util::init_copy_progress()?) };
    let reporter =
        CliReporter { inner: TracingReporter, progress: progress.clone(), copied_bytes: Cell::new(0) };

    let started = Instant::now();
    let result = transfer::plan_with_env(&opts, env, &reporter);
    if let Some(pb) = &progress {
        pb.finish_and_clear();
    }
    let pairs = result?;

    if json {
        let plan = JsonPlan { generated_at: chrono::Utc::now().to_rfc3339(), dry_run, pairs: &pairs };
        println!("{}", serde_json::to_string_pretty(&plan).context("serialize plan")?);
    } else {
        let action = if dry_run { "Would copy" } else { "Copied" };
        for pair in &pairs {
            println!("{} {} -> {}", action, pair.source.display(), pair.destination.display());
        }
        crate::util::print_summary(
            pairs.len(),
            reporter.copied_bytes.get(),
            started.elapsed().as_secs_f64(),
            dry_run,
        );
    }
    tracing::info!("Actigraphy transfer complete (dry_run={})", dry_run);
    Ok(pairs)
}

/// `sync` subcommand: assemble the globus command, then print or run it.
pub fn handle_sync(env: &Env, args: HandleSyncArgs) -> Result<()> {
    tracing::debug!("CLI overrides: {:?}", args.overrides);
    let sync = GlobusSync::from_env(env, args.overrides)?;

    if args.show_command {
        let command = sync.command_as_string();
        tracing::info!("Assembled command: {}", command);
        println!("{}", command);
        return Ok(());
    }

    sync.run()?;
    tracing::info!("Globus transfer completed successfully");
    Ok(())
}
