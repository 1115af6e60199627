// ReconLog - util/error.rs
//
// Typed error hierarchy with context-preserving error chains.
// All errors preserve the causal chain for diagnostic logging.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Top-level error type for all ReconLog operations.
/// Errors are categorised by the subsystem that produced them.
#[derive(Debug)]
pub enum ReconLogError {
    /// Field registry loading or validation failed.
    Registry(RegistryError),

    /// An input source could not be used.
    Source(SourceError),

    /// Writing a table or series failed.
    Export(ExportError),

    /// Configuration loading failed.
    Config(ConfigError),

    /// Command-line arguments are inconsistent.
    Usage(UsageError),

    /// I/O error with path context.
    Io {
        path: PathBuf,
        operation: &'static str,
        source: io::Error,
    },
}

impl fmt::Display for ReconLogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Registry(e) => write!(f, "Registry error: {e}"),
            Self::Source(e) => write!(f, "Source error: {e}"),
            Self::Export(e) => write!(f, "Export error: {e}"),
            Self::Config(e) => write!(f, "Configuration error: {e}"),
            Self::Usage(e) => write!(f, "Usage error: {e}"),
            Self::Io {
                path,
                operation,
                source,
            } => write!(
                f,
                "I/O error during {operation} on '{}': {source}",
                path.display()
            ),
        }
    }
}

impl std::error::Error for ReconLogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Registry(e) => Some(e),
            Self::Source(e) => Some(e),
            Self::Export(e) => Some(e),
            Self::Config(e) => Some(e),
            Self::Usage(e) => Some(e),
            Self::Io { source, .. } => Some(source),
        }
    }
}

// ---------------------------------------------------------------------------
// Registry errors
// ---------------------------------------------------------------------------

/// Errors related to field registry loading and validation.
#[derive(Debug)]
pub enum RegistryError {
    /// TOML document could not be parsed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// Registry file exceeds the maximum allowed size.
    FileTooLarge {
        path: PathBuf,
        size: u64,
        max_size: u64,
    },

    /// A required field is missing or empty.
    MissingField {
        registry_id: String,
        field: &'static str,
    },

    /// A regex pattern in the registry is invalid.
    InvalidRegex {
        registry_id: String,
        field: String,
        pattern: String,
        source: regex::Error,
    },

    /// A regex pattern exceeds the maximum allowed length.
    RegexTooLong {
        registry_id: String,
        field: String,
        length: usize,
        max_length: usize,
    },

    /// A value pattern has no capture group to take the number from.
    NoCaptureGroup {
        registry_id: String,
        label: String,
        pattern: String,
    },

    /// Two fields in one registry share a label.
    DuplicateLabel { registry_id: String, label: String },

    /// The registry declares more fields than allowed.
    TooManyFields {
        registry_id: String,
        count: usize,
        max: usize,
    },

    /// No loaded registry has the requested id.
    NotFound { id: String },

    /// I/O error reading a registry file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for RegistryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { path, source } => {
                write!(f, "Failed to parse TOML '{}': {source}", path.display())
            }
            Self::FileTooLarge {
                path,
                size,
                max_size,
            } => write!(
                f,
                "Registry '{}' is {size} bytes, exceeds maximum of {max_size} bytes",
                path.display()
            ),
            Self::MissingField { registry_id, field } => {
                write!(
                    f,
                    "Registry '{registry_id}': missing required field '{field}'"
                )
            }
            Self::InvalidRegex {
                registry_id,
                field,
                pattern,
                source,
            } => write!(
                f,
                "Registry '{registry_id}': invalid regex in '{field}' ('{pattern}'): {source}"
            ),
            Self::RegexTooLong {
                registry_id,
                field,
                length,
                max_length,
            } => write!(
                f,
                "Registry '{registry_id}': regex in '{field}' is {length} chars, \
                 exceeds maximum of {max_length}"
            ),
            Self::NoCaptureGroup {
                registry_id,
                label,
                pattern,
            } => write!(
                f,
                "Registry '{registry_id}': pattern for '{label}' ('{pattern}') \
                 has no capture group"
            ),
            Self::DuplicateLabel { registry_id, label } => {
                write!(f, "Registry '{registry_id}': label '{label}' declared twice")
            }
            Self::TooManyFields {
                registry_id,
                count,
                max,
            } => write!(
                f,
                "Registry '{registry_id}' declares {count} fields, maximum is {max}"
            ),
            Self::NotFound { id } => write!(f, "No registry with id '{id}' is loaded"),
            Self::Io { path, source } => {
                write!(
                    f,
                    "I/O error reading registry '{}': {source}",
                    path.display()
                )
            }
        }
    }
}

impl std::error::Error for RegistryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::InvalidRegex { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<RegistryError> for ReconLogError {
    fn from(e: RegistryError) -> Self {
        Self::Registry(e)
    }
}

// ---------------------------------------------------------------------------
// Source errors
// ---------------------------------------------------------------------------

/// Errors for a single declared input source. Non-fatal in multi-source
/// stages: the source is skipped and the error is reported on the outcome.
#[derive(Debug)]
pub enum SourceError {
    /// The declared input file does not exist.
    Missing { path: PathBuf },

    /// The file exists but could not be read.
    Unreadable { path: PathBuf, source: io::Error },
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing { path } => {
                write!(f, "File {} does not exist", path.display())
            }
            Self::Unreadable { path, source } => {
                write!(f, "File {} could not be read: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for SourceError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Unreadable { source, .. } => Some(source),
            Self::Missing { .. } => None,
        }
    }
}

impl From<SourceError> for ReconLogError {
    fn from(e: SourceError) -> Self {
        Self::Source(e)
    }
}

// ---------------------------------------------------------------------------
// Export errors
// ---------------------------------------------------------------------------

/// Errors related to writing tables and series.
#[derive(Debug)]
pub enum ExportError {
    /// I/O error writing the output file.
    Io { path: PathBuf, source: io::Error },

    /// CSV serialisation or deserialisation error.
    Csv { path: PathBuf, source: csv::Error },

    /// JSON serialisation error.
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl fmt::Display for ExportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "Export I/O error '{}': {source}", path.display())
            }
            Self::Csv { path, source } => {
                write!(f, "CSV error '{}': {source}", path.display())
            }
            Self::Json { path, source } => {
                write!(f, "JSON export error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ExportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Csv { source, .. } => Some(source),
            Self::Json { source, .. } => Some(source),
        }
    }
}

impl From<ExportError> for ReconLogError {
    fn from(e: ExportError) -> Self {
        Self::Export(e)
    }
}

// ---------------------------------------------------------------------------
// Config errors
// ---------------------------------------------------------------------------

/// Errors related to configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    /// TOML parsing failed.
    TomlParse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// An explicitly requested config file is missing.
    NotFound { path: PathBuf },

    /// I/O error reading config file.
    Io { path: PathBuf, source: io::Error },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TomlParse { path, source } => {
                write!(f, "Config parse error '{}': {source}", path.display())
            }
            Self::NotFound { path } => {
                write!(f, "Config file '{}' does not exist", path.display())
            }
            Self::Io { path, source } => {
                write!(f, "Config I/O error '{}': {source}", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::TomlParse { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            Self::NotFound { .. } => None,
        }
    }
}

impl From<ConfigError> for ReconLogError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

// ---------------------------------------------------------------------------
// Usage errors
// ---------------------------------------------------------------------------

/// Fatal command-line inconsistencies detected before any processing.
#[derive(Debug)]
pub enum UsageError {
    /// The declared file count does not fit the paths that follow it.
    CountOutOfRange { count: usize, available: usize },
}

impl fmt::Display for UsageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::CountOutOfRange { count, available } => write!(
                f,
                "file count {count} is out of range: {available} path(s) given \
                 (expected 1-{available})"
            ),
        }
    }
}

impl std::error::Error for UsageError {}

impl From<UsageError> for ReconLogError {
    fn from(e: UsageError) -> Self {
        Self::Usage(e)
    }
}

/// Convenience type alias for ReconLog results.
pub type Result<T> = std::result::Result<T, ReconLogError>;
