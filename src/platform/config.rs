// ReconLog - platform/config.rs
//
// Platform config directory resolution and config.toml loading with
// validation. Uses the `directories` crate for XDG (Linux), AppData
// (Windows), Library (macOS) compliance.

use crate::util::constants;
use crate::util::error::ConfigError;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Resolved platform paths for ReconLog configuration.
#[derive(Debug, Clone)]
pub struct PlatformPaths {
    /// Configuration directory (e.g. ~/.config/reconlog/)
    pub config_dir: PathBuf,

    /// Default user registry directory (e.g. ~/.config/reconlog/registries/)
    pub user_registries_dir: PathBuf,
}

impl PlatformPaths {
    /// Resolve platform-appropriate paths.
    ///
    /// Falls back to current directory if platform dirs cannot be determined.
    pub fn resolve() -> Self {
        if let Some(proj_dirs) = ProjectDirs::from("", "", constants::APP_ID) {
            let config_dir = proj_dirs.config_dir().to_path_buf();
            let user_registries_dir = config_dir.join(constants::REGISTRIES_DIR_NAME);
            Self {
                config_dir,
                user_registries_dir,
            }
        } else {
            let fallback = PathBuf::from(".");
            Self {
                user_registries_dir: fallback.join(constants::REGISTRIES_DIR_NAME),
                config_dir: fallback,
            }
        }
    }

    /// Default location of config.toml.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(constants::CONFIG_FILE_NAME)
    }
}

// =============================================================================
// config.toml loading and validation
// =============================================================================

/// Raw deserialisable shape of config.toml.
///
/// Unknown keys are silently ignored so a newer config file still loads.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RawConfig {
    pub logging: LoggingSection,
    pub extraction: ExtractionSection,
    pub combine: CombineSection,
    pub registries: RegistriesSection,
}

/// `[logging]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: Option<String>,
}

/// `[extraction]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct ExtractionSection {
    /// Anchor field keywords on word boundaries.
    pub word_boundary: Option<bool>,
}

/// `[combine]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct CombineSection {
    /// Use the union of all sources' labels as combined-records columns.
    pub union_columns: Option<bool>,
}

/// `[registries]` config section.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(default)]
pub struct RegistriesSection {
    /// Directory holding user registry TOML files. Relative paths are
    /// resolved against the config file's directory.
    pub directory: Option<String>,
}

/// Validated configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Logging level string (for init before tracing is available).
    pub log_level: Option<String>,
    pub word_boundary: bool,
    pub union_columns: bool,
    /// Explicit user registry directory; `None` means the platform default.
    pub registry_dir: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: None,
            word_boundary: constants::DEFAULT_WORD_BOUNDARY,
            union_columns: constants::DEFAULT_UNION_COLUMNS,
            registry_dir: None,
        }
    }
}

/// Load config.toml from `path`.
///
/// With `explicit` (the user passed --config) a missing, unreadable, or
/// unparseable file is an error. Otherwise those cases fall back to defaults,
/// with a warning for anything but a missing file.
///
/// Returns the config and the non-fatal warnings to log once logging is up.
pub fn load_config(path: &Path, explicit: bool) -> Result<(AppConfig, Vec<String>), ConfigError> {
    let mut warnings = Vec::new();

    if !path.exists() {
        if explicit {
            return Err(ConfigError::NotFound {
                path: path.to_path_buf(),
            });
        }
        return Ok((AppConfig::default(), warnings));
    }

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if explicit => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })
        }
        Err(e) => {
            warnings.push(format!(
                "Could not read config file '{}': {e}. Using defaults.",
                path.display()
            ));
            return Ok((AppConfig::default(), warnings));
        }
    };

    let raw: RawConfig = match toml::from_str(&content) {
        Ok(r) => r,
        Err(e) if explicit => {
            return Err(ConfigError::TomlParse {
                path: path.to_path_buf(),
                source: e,
            })
        }
        Err(e) => {
            warnings.push(format!(
                "Failed to parse config file '{}': {e}. Using defaults.",
                path.display()
            ));
            return Ok((AppConfig::default(), warnings));
        }
    };

    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    let (config, validation_warnings) = validate(raw, base_dir);
    warnings.extend(validation_warnings);
    Ok((config, warnings))
}

/// Validate a raw config, accumulating warnings for unusable values.
pub fn validate(raw: RawConfig, base_dir: &Path) -> (AppConfig, Vec<String>) {
    let mut config = AppConfig::default();
    let mut warnings = Vec::new();

    if let Some(ref level) = raw.logging.level {
        let valid = ["error", "warn", "info", "debug", "trace"];
        if valid.contains(&level.to_lowercase().as_str()) {
            config.log_level = Some(level.to_lowercase());
        } else {
            warnings.push(format!(
                "[logging] level = \"{level}\" is not recognised. \
                 Valid values: error, warn, info, debug, trace. Using default (info).",
            ));
        }
    }

    if let Some(word_boundary) = raw.extraction.word_boundary {
        config.word_boundary = word_boundary;
    }

    if let Some(union_columns) = raw.combine.union_columns {
        config.union_columns = union_columns;
    }

    if let Some(ref dir) = raw.registries.directory {
        if dir.is_empty() {
            warnings.push(
                "[registries] directory is empty. Using the default registry directory."
                    .to_string(),
            );
        } else {
            config.registry_dir = Some(base_dir.join(dir));
        }
    }

    (config, warnings)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_default_config_uses_defaults() {
        let (config, warnings) =
            load_config(Path::new("/nonexistent/reconlog/config.toml"), false).unwrap();
        assert!(warnings.is_empty());
        assert!(config.word_boundary);
        assert!(!config.union_columns);
    }

    #[test]
    fn test_missing_explicit_config_is_error() {
        let result = load_config(Path::new("/nonexistent/reconlog/config.toml"), true);
        assert!(matches!(result, Err(ConfigError::NotFound { .. })));
    }

    #[test]
    fn test_full_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[logging]
level = "DEBUG"

[extraction]
word_boundary = false

[combine]
union_columns = true

[registries]
directory = "regs"

[unknown]
key = 1
"#,
        )
        .unwrap();

        let (config, warnings) = load_config(&path, true).unwrap();
        assert!(warnings.is_empty(), "{warnings:?}");
        assert_eq!(config.log_level.as_deref(), Some("debug"));
        assert!(!config.word_boundary);
        assert!(config.union_columns);
        assert_eq!(config.registry_dir, Some(dir.path().join("regs")));
    }

    #[test]
    fn test_bad_level_warns() {
        let raw: RawConfig = toml::from_str("[logging]\nlevel = \"loud\"\n").unwrap();
        let (config, warnings) = validate(raw, Path::new("."));
        assert!(config.log_level.is_none());
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_unparseable_default_config_warns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[logging\nlevel=").unwrap();

        let (_, warnings) = load_config(&path, false).unwrap();
        assert_eq!(warnings.len(), 1);
        assert!(matches!(
            load_config(&path, true),
            Err(ConfigError::TomlParse { .. })
        ));
    }
}
