use crate::domain::error::{PackError, Result};
use crate::domain::models::{FormatOptions, RuleSet};
use crate::infra::output::write_atomic;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

pub const SETTINGS_FILE: &str = "promptpack_settings.json";

pub const DEFAULT_EXTENSIONS: [&str; 6] = [".php", ".js", ".ts", ".html", ".css", ".py"];
pub const DEFAULT_EXCLUDED_DIRS: [&str; 3] = ["vendor", ".git", "node_modules"];
pub const DEFAULT_EXCLUDED_FILES: [&str; 2] = [".env", "README.md"];

/// Flat settings record shared by every front end.
///
/// Fields missing from the stored file keep their default value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub allowed_exts: Vec<String>,
    pub excluded_dirs: Vec<String>,
    pub excluded_files: Vec<String>,
    pub as_markdown: bool,
    pub include_heading: bool,
    pub use_code_block: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            allowed_exts: DEFAULT_EXTENSIONS.iter().map(|s| s.to_string()).collect(),
            excluded_dirs: DEFAULT_EXCLUDED_DIRS.iter().map(|s| s.to_string()).collect(),
            excluded_files: DEFAULT_EXCLUDED_FILES.iter().map(|s| s.to_string()).collect(),
            as_markdown: true,
            include_heading: true,
            use_code_block: true,
            theme: None,
        }
    }
}

impl Settings {
    /// Loads settings from `path`, falling back to defaults when the file is
    /// absent or cannot be parsed.
    pub fn load(path: &Path) -> Self {
        let raw = match fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("No settings file at {}, using defaults", path.display());
                return Self::default();
            }
            Err(e) => {
                warn!("Cannot read settings {}: {}; using defaults", path.display(), e);
                return Self::default();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(settings) => {
                debug!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                warn!("Invalid settings {}: {}; using defaults", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut serializer)?;

        write_atomic(path, &buf).map_err(|e| match e {
            PackError::Write { path, source } => PackError::SettingsWrite { path, source },
            other => other,
        })?;
        debug!("Saved settings to {}", path.display());
        Ok(())
    }

    pub fn rule_set(&self) -> RuleSet {
        RuleSet::new(
            self.allowed_exts.iter().cloned(),
            self.excluded_dirs.iter().cloned(),
            self.excluded_files.iter().cloned(),
        )
    }

    pub fn format_options(&self) -> FormatOptions {
        FormatOptions {
            as_markdown: self.as_markdown,
            include_heading: self.include_heading,
            use_code_block: self.use_code_block,
        }
    }
}

/// `promptpack_settings.json` next to the running executable, or in the
/// working directory when the executable location is unknown.
pub fn default_settings_path() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(SETTINGS_FILE)))
        .unwrap_or_else(|| PathBuf::from(SETTINGS_FILE))
}

/// Splits a comma separated list, dropping blank entries.
pub fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
