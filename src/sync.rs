//! Thin wrapper around `globus transfer`.
//!
//! Settings come from explicit overrides first, then `GLOBUS_*` environment
//! variables, then defaults. The command is assembled as an argument vector and
//! either printed or executed; nothing is routed through a shell.

use std::process::Command;

use crate::config::{self, Env};
use crate::error::SyncError;

pub const DEFAULT_LABEL: &str = "NEU to UI sync";
pub const DEFAULT_SYNC_LEVEL: &str = "mtime";
pub const DEFAULT_NOTIFY: &str = "on";
pub const DEFAULT_CLI: &str = "globus";
pub const SYNC_LEVELS: [&str; 4] = ["exists", "size", "mtime", "checksum"];

/// Explicit values that take precedence over the environment.
#[derive(Clone, Debug, Default)]
pub struct SyncOverrides {
    pub source_endpoint: Option<String>,
    pub destination_endpoint: Option<String>,
    pub source_path: Option<String>,
    pub destination_path: Option<String>,
    pub label: Option<String>,
    pub sync_level: Option<String>,
    pub notify: Option<String>,
    pub preserve_mtime: Option<bool>,
    pub dry_run: Option<bool>,
    pub extra_flags: Option<Vec<String>>,
    pub globus_command: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlobusSync {
    pub source_endpoint: String,
    pub destination_endpoint: String,
    pub destination_path: String,
    pub source_path: String,
    pub label: String,
    pub sync_level: String,
    pub notify: String,
    pub preserve_mtime: bool,
    pub dry_run: bool,
    pub extra_flags: Vec<String>,
    pub globus_command: String,
}

impl GlobusSync {
    /// Resolve every setting and validate the result.
    pub fn from_env(env: &Env, overrides: SyncOverrides) -> Result<Self, SyncError> {
        let pick = |explicit: Option<String>, var: &str| -> Option<String> {
            explicit.or_else(|| env.get(var).map(str::to_string))
        };

        let extra_flags = match overrides.extra_flags {
            Some(flags) => flags,
            None => match env.get_non_empty(config::ENV_EXTRA_FLAGS) {
                Some(raw) => {
                    shlex::split(raw).ok_or_else(|| SyncError::InvalidExtraFlags(raw.to_string()))?
                }
                None => Vec::new(),
            },
        };

        let source_endpoint = pick(overrides.source_endpoint, config::ENV_SOURCE_ENDPOINT);
        let destination_endpoint = pick(overrides.destination_endpoint, config::ENV_DEST_ENDPOINT);
        let destination_path = pick(overrides.destination_path, config::ENV_DEST_PATH);

        let missing: Vec<(&'static str, &'static str)> = [
            ("source_endpoint", config::ENV_SOURCE_ENDPOINT, &source_endpoint),
            ("destination_endpoint", config::ENV_DEST_ENDPOINT, &destination_endpoint),
            ("destination_path", config::ENV_DEST_PATH, &destination_path),
        ]
        .into_iter()
        .filter(|(_, _, v)| v.as_deref().is_none_or(str::is_empty))
        .map(|(key, var, _)| (key, var))
        .collect();
        if !missing.is_empty() {
            return Err(SyncError::MissingConfig(missing));
        }

        let sync = GlobusSync {
            source_endpoint: source_endpoint.unwrap_or_default(),
            destination_endpoint: destination_endpoint.unwrap_or_default(),
            destination_path: destination_path.unwrap_or_default(),
            source_path: pick(overrides.source_path, config::ENV_SOURCE_PATH)
                .unwrap_or_else(|| "/".to_string()),
            label: pick(overrides.label, config::ENV_LABEL)
                .unwrap_or_else(|| DEFAULT_LABEL.to_string()),
            sync_level: pick(overrides.sync_level, config::ENV_SYNC_LEVEL)
                .unwrap_or_else(|| DEFAULT_SYNC_LEVEL.to_string()),
            notify: pick(overrides.notify, config::ENV_NOTIFY)
                .unwrap_or_else(|| DEFAULT_NOTIFY.to_string()),
            preserve_mtime: overrides
                .preserve_mtime
                .unwrap_or_else(|| env.get_bool(config::ENV_PRESERVE_MTIME, true)),
            dry_run: overrides.dry_run.unwrap_or_else(|| env.get_bool(config::ENV_DRY_RUN, false)),
            extra_flags,
            globus_command: pick(overrides.globus_command, config::ENV_CLI)
                .unwrap_or_else(|| DEFAULT_CLI.to_string()),
        };
        sync.validate()?;
        Ok(sync)
    }

    fn validate(&self) -> Result<(), SyncError> {
        if !self.destination_path.starts_with('/') {
            return Err(SyncError::RelativeDestinationPath(self.destination_path.clone()));
        }
        if self.source_path.is_empty() {
            return Err(SyncError::EmptySourcePath);
        }
        if !SYNC_LEVELS.contains(&self.sync_level.as_str()) {
            return Err(SyncError::InvalidSyncLevel(self.sync_level.clone()));
        }
        Ok(())
    }

    /// The full argument vector, program first.
    pub fn build_transfer_command(&self) -> Vec<String> {
        let mut command = vec![
            self.globus_command.clone(),
            "transfer".to_string(),
            "--recursive".to_string(),
            "--sync-level".to_string(),
            self.sync_level.clone(),
            "--label".to_string(),
            self.label.clone(),
        ];
        if !self.notify.is_empty() {
            command.push("--notify".to_string());
            command.push(self.notify.clone());
        }
        if self.preserve_mtime {
            command.push("--preserve-mtime".to_string());
        }
        if self.dry_run {
            command.push("--dry-run".to_string());
        }
        command.extend(self.extra_flags.iter().cloned());
        command.push(format!("{}:{}", self.source_endpoint, self.source_path));
        command.push(format!("{}:{}", self.destination_endpoint, self.destination_path));
        tracing::debug!("Constructed globus command arguments: {:?}", command);
        command
    }

    /// Shell-ready rendering of [`build_transfer_command`](Self::build_transfer_command).
    pub fn command_as_string(&self) -> String {
        self.build_transfer_command()
            .iter()
            .map(|part| match shlex::try_quote(part) {
                Ok(q) => q.into_owned(),
                // NUL bytes cannot be quoted; show them escaped
                Err(_) => format!("{:?}", part),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Run the command, inheriting stdio. Non-zero exit is an error.
    pub fn run(&self) -> Result<(), SyncError> {
        let command = self.build_transfer_command();
        let program = which::which(&command[0])
            .map_err(|_| SyncError::CliNotFound(command[0].clone()))?;
        tracing::debug!("Executing globus command: {:?}", command);
        let status = Command::new(&program)
            .args(&command[1..])
            .status()
            .map_err(|e| SyncError::Spawn(program.display().to_string(), e.to_string()))?;
        if status.success() {
            Ok(())
        } else {
            Err(SyncError::CommandFailed { code: status.code() })
        }
    }
}
