use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
pub struct Cli {
    #[clap(short, long, global = true, help = "Also write debug logs to the log directory")]
    pub verbose: bool,
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[clap(about = "Copy actigraphy CSVs into the BIDS-like layout", display_order = 1)]
    Transfer {
        #[clap(
            long,
            value_name = "DIR",
            help = "Root containing both ne-dump/ and act-int-test/ (defaults to BASE_PATH)"
        )]
        base_path: Option<PathBuf>,
        #[clap(
            long = "dry-run",
            overrides_with = "apply",
            help = "Preview files without copying (default)"
        )]
        dry_run: bool,
        #[clap(long, overrides_with = "dry_run", help = "Perform the copy")]
        apply: bool,
        #[clap(
            long,
            overrides_with = "no_handle_zip",
            help = "Extract (or, on a dry run, preview) a single archive in ne-dump first [env: ACTIGRAPHY_HANDLE_ZIP]"
        )]
        handle_zip: bool,
        #[clap(long, overrides_with = "handle_zip", help = "Skip archive handling even if ACTIGRAPHY_HANDLE_ZIP is set")]
        no_handle_zip: bool,
        #[clap(long, help = "Abort when two files map to the same destination")]
        fail_on_collision: bool,
        #[clap(long, help = "Print the plan as JSON instead of one line per file")]
        json: bool,
    },
    #[clap(about = "Execute a Globus transfer using the local Globus CLI", display_order = 2)]
    Sync {
        #[clap(long, help = "Override GLOBUS_SOURCE_ENDPOINT")]
        source_endpoint: Option<String>,
        #[clap(long, help = "Override GLOBUS_DEST_ENDPOINT")]
        dest_endpoint: Option<String>,
        #[clap(long, help = "Override GLOBUS_SOURCE_PATH")]
        source_path: Option<String>,
        #[clap(long, help = "Override GLOBUS_DEST_PATH")]
        dest_path: Option<String>,
        #[clap(long, help = "Override GLOBUS_LABEL")]
        label: Option<String>,
        #[clap(
            long,
            value_parser = ["exists", "size", "mtime", "checksum"],
            help = "Override GLOBUS_SYNC_LEVEL"
        )]
        sync_level: Option<String>,
        #[clap(long, help = "Override GLOBUS_NOTIFY")]
        notify: Option<String>,
        #[clap(long, help = "Force --dry-run regardless of environment configuration")]
        dry_run: bool,
        #[clap(long, help = "Path or alias to the Globus CLI executable")]
        globus_command: Option<String>,
        #[clap(
            long = "extra-flag",
            action = ArgAction::Append,
            allow_hyphen_values = true,
            help = "Additional flag appended to the globus command; repeatable"
        )]
        extra_flags: Vec<String>,
        #[clap(long, overrides_with = "no_preserve_mtime", help = "Explicitly enable --preserve-mtime")]
        preserve_mtime: bool,
        #[clap(long, overrides_with = "preserve_mtime", help = "Explicitly disable --preserve-mtime")]
        no_preserve_mtime: bool,
        #[clap(long, help = "Print the assembled command instead of executing it")]
        show_command: bool,
    },
}

impl Commands {
    /// Dry run unless `--apply` was the last of the pair given.
    pub fn transfer_dry_run(dry_run: bool, apply: bool) -> bool {
        dry_run || !apply
    }

    /// `Some` only when one of the pair was given explicitly.
    pub fn flag_pair(on: bool, off: bool) -> Option<bool> {
        match (on, off) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}
