// ReconLog - util/constants.rs
//
// Single source of truth for named constants, log markers, output labels,
// and limits.

// =============================================================================
// Application metadata
// =============================================================================

/// Application display name.
pub const APP_NAME: &str = "ReconLog";

/// Application identifier used for config directories.
pub const APP_ID: &str = "ReconLog";

/// Current application version.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// Log markers (reconstruction pipeline output)
// =============================================================================

/// Opens the verbatim metrics block.
pub const METRICS_BLOCK_START: &str = "Stack metrics";

/// Closes the metrics block; the closing line is part of the block.
pub const METRICS_BLOCK_END: &str = "Generated";

/// Substring identifying a per-iteration correlation line.
pub const CORRELATION_MARKER: &str = "ncc";

/// Literal word that, together with `stack <n>`, marks an exclusion note.
pub const EXCLUSION_WORD: &str = "excluded";

/// Token pattern that, together with `EXCLUSION_WORD`, marks an exclusion note.
pub const EXCLUSION_STACK_PATTERN: &str = r"stack \d+";

// =============================================================================
// Summary text layout
// =============================================================================

pub const SUMMARY_EXCLUSION_BANNER: &str = "Summary of Stack Selection and Exclusion:";

pub const SUMMARY_RENUMBER_FOOTNOTE: &str =
    "*note that stacks are renumbered from 0 after this exclusion step";

pub const SUMMARY_CORRELATION_BANNER: &str = "Global Metrics for Each Iteration (0-3):";

pub const SUMMARY_METRICS_BANNER: &str = "Stack Metrics:";

// =============================================================================
// Tables
// =============================================================================

/// First header cell of the wide comparison table.
pub const WIDE_TABLE_MEASURE_HEADER: &str = "Measure";

/// Prefix of the positional per-source column headers (`File_1`, `File_2`, ...).
pub const WIDE_TABLE_SOURCE_PREFIX: &str = "File_";

/// First header cell of the combined-records table.
pub const COMBINED_FILEPATH_HEADER: &str = "filepath";

/// Default output of `combine-volumes`.
pub const DEFAULT_COMBINED_VOLUMES_FILE: &str = "combined_volumes.csv";

/// Default output directory of `series`.
pub const DEFAULT_SERIES_DIR: &str = "csv_volume_plots";

/// Suffix of each per-measure series document written by `series`.
pub const SERIES_FILE_SUFFIX: &str = "_volume_comparison.json";

// =============================================================================
// Registries
// =============================================================================

/// Id of the built-in SVR global-metrics registry.
pub const SVR_METRICS_REGISTRY_ID: &str = "svr-metrics";

/// Id of the built-in segmentation volumes registry.
pub const VOLUMES_REGISTRY_ID: &str = "volumes";

/// Value pattern used when a registry does not declare its own.
/// Integer or decimal; the sample domain has no signed values.
pub const DEFAULT_NUMBER_PATTERN: &str = r"([0-9]*\.?[0-9]+)";

/// Separator between keyword and value when a field does not declare one.
pub const DEFAULT_FIELD_SEPARATOR: &str = r"\s*";

/// Maximum regex pattern length accepted from a registry (ReDoS guard).
pub const MAX_REGEX_PATTERN_LENGTH: usize = 1_024;

/// Maximum number of fields in one registry.
pub const MAX_REGISTRY_FIELDS: usize = 64;

/// Maximum size of a user registry file in bytes.
pub const MAX_REGISTRY_FILE_SIZE: u64 = 64 * 1024;

/// Name of the registry subdirectory inside the config directory.
pub const REGISTRIES_DIR_NAME: &str = "registries";

// =============================================================================
// Config and logging
// =============================================================================

/// Name of the optional configuration file.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Default log level when neither RUST_LOG, --debug, nor config set one.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Default for `[extraction] word_boundary`.
pub const DEFAULT_WORD_BOUNDARY: bool = true;

/// Default for `[combine] union_columns`.
pub const DEFAULT_UNION_COLUMNS: bool = false;

// =============================================================================
// Exit codes
// =============================================================================

pub const EXIT_SUCCESS: u8 = 0;

/// Unexpected I/O or other fatal error.
pub const EXIT_FAILURE: u8 = 1;

/// Bad command line (matches clap's own usage-error code).
pub const EXIT_USAGE: u8 = 2;

/// Stage completed but at least one declared source was skipped.
pub const EXIT_PARTIAL: u8 = 3;
