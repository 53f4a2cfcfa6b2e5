use anyhow::Result;
use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use owo_colors::OwoColorize;
use std::time::Duration;

/// Try to enable ANSI escape sequence support on Windows consoles.
/// Returns true if enabling succeeded (or platform likely already supports ANSI), false otherwise.
#[cfg(windows)]
pub fn try_enable_ansi_on_windows() -> bool {
    enable_ansi_support::enable_ansi_support().is_ok()
}

// On non-Windows platforms the crate is not required and ANSI support is typically available
// by default in terminals.
#[cfg(not(windows))]
pub fn try_enable_ansi_on_windows() -> bool {
    true
}

/// Convert a byte count into a human readable string using IEC units (KiB/MiB/GiB).
pub fn human_bytes(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;
    const GB: f64 = MB * 1024.0;
    let b = bytes as f64;
    if b >= GB {
        format!("{:.2} GiB", b / GB)
    } else if b >= MB {
        format!("{:.2} MiB", b / MB)
    } else if b >= KB {
        format!("{:.2} KiB", b / KB)
    } else {
        format!("{} B", bytes)
    }
}

/// Progress bar drawn on stderr while files are copied. Starts empty; the
/// caller grows the length as pairs are planned.
pub fn init_copy_progress() -> Result<ProgressBar> {
    let pb = ProgressBar::with_draw_target(Some(0), ProgressDrawTarget::stderr());
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
        )?
        .progress_chars("=> "),
    );
    pb.enable_steady_tick(Duration::from_millis(120));
    Ok(pb)
}

/// One-line summary after a transfer run, on stderr so stdout stays parseable.
pub fn print_summary(files: usize, total_bytes: u64, elapsed_secs: f64, dry_run: bool) {
    let line = if dry_run {
        format!("{} file(s) would be copied (dry run; pass --apply to copy)", files)
    } else {
        format!("{} file(s) copied, {} in {:.2}s", files, human_bytes(total_bytes), elapsed_secs)
    };
    if try_enable_ansi_on_windows() {
        eprintln!("{}", line.green());
    } else {
        eprintln!("{}", line);
    }
}

/// Print a fatal error the way every command reports it.
pub fn print_error(msg: &str) {
    if try_enable_ansi_on_windows() {
        eprintln!("{} {}", "Error:".red().bold(), msg);
    } else {
        eprintln!("Error: {}", msg);
    }
}
