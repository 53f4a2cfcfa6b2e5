use std::collections::HashMap;
use std::path::PathBuf;

pub const ENV_BASE_PATH: &str = "BASE_PATH";
pub const ENV_HANDLE_ZIP: &str = "ACTIGRAPHY_HANDLE_ZIP";
pub const ENV_LOG_LEVEL: &str = "GLOBUS_LOG_LEVEL";

pub const ENV_SOURCE_ENDPOINT: &str = "GLOBUS_SOURCE_ENDPOINT";
pub const ENV_DEST_ENDPOINT: &str = "GLOBUS_DEST_ENDPOINT";
pub const ENV_SOURCE_PATH: &str = "GLOBUS_SOURCE_PATH";
pub const ENV_DEST_PATH: &str = "GLOBUS_DEST_PATH";
pub const ENV_LABEL: &str = "GLOBUS_LABEL";
pub const ENV_SYNC_LEVEL: &str = "GLOBUS_SYNC_LEVEL";
pub const ENV_NOTIFY: &str = "GLOBUS_NOTIFY";
pub const ENV_PRESERVE_MTIME: &str = "GLOBUS_PRESERVE_MTIME";
pub const ENV_DRY_RUN: &str = "GLOBUS_DRY_RUN";
pub const ENV_EXTRA_FLAGS: &str = "GLOBUS_EXTRA_FLAGS";
pub const ENV_CLI: &str = "GLOBUS_CLI";

/// Snapshot of environment variables. Library code reads settings through
/// this instead of `std::env` so callers and tests can supply their own.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Env {
    vars: HashMap<String, String>,
}

impl Env {
    pub fn from_process() -> Self {
        Self { vars: std::env::vars().collect() }
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self { vars: pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect() }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Value of `key`, treating an empty string as unset.
    pub fn get_non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.is_empty())
    }

    pub fn get_bool(&self, key: &str, default: bool) -> bool {
        str_to_bool(self.get(key), default)
    }

    pub fn base_path(&self) -> Option<PathBuf> {
        self.get_non_empty(ENV_BASE_PATH).map(PathBuf::from)
    }

    pub fn handle_zip_default(&self) -> bool {
        self.get_bool(ENV_HANDLE_ZIP, false)
    }

    pub fn log_level(&self) -> Option<&str> {
        self.get(ENV_LOG_LEVEL)
    }
}

/// Unset means `default`; otherwise anything but `0/false/no/off` is true.
pub fn str_to_bool(value: Option<&str>, default: bool) -> bool {
    match value {
        None => default,
        Some(v) => !matches!(v.trim().to_ascii_lowercase().as_str(), "0" | "false" | "no" | "off"),
    }
}

/// Translate a log level into a tracing filter directive. Accepts tracing
/// names, the stdlib-logging aliases (`WARNING`, `CRITICAL`) and their numeric
/// values. Empty or unset means `info`.
pub fn level_directive(value: Option<&str>) -> Result<&'static str, String> {
    let Some(raw) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return Ok("info");
    };
    if let Ok(n) = raw.parse::<u32>() {
        return Ok(match n {
            0..=5 => "trace",
            6..=10 => "debug",
            11..=20 => "info",
            21..=30 => "warn",
            _ => "error",
        });
    }
    match raw.to_ascii_uppercase().as_str() {
        "TRACE" => Ok("trace"),
        "DEBUG" => Ok("debug"),
        "INFO" => Ok("info"),
        "WARN" | "WARNING" => Ok("warn"),
        "ERROR" | "CRITICAL" | "FATAL" => Ok("error"),
        "OFF" => Ok("off"),
        _ => Err(format!("Unsupported log level: {}", raw)),
    }
}
