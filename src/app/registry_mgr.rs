// ReconLog - app/registry_mgr.rs
//
// Manages loading of field registries from both built-in sources
// (embedded in the binary) and user-defined TOML files on disk.
// User registries replace built-in registries with the same id.

use crate::core::registry::{self, CompileOptions, FieldRegistry};
use crate::util::constants;
use crate::util::error::RegistryError;
use std::path::{Path, PathBuf};

/// The set of registries available to a run.
#[derive(Debug, Clone)]
pub struct Registries {
    entries: Vec<FieldRegistry>,
}

impl Registries {
    pub fn get(&self, id: &str) -> Result<&FieldRegistry, RegistryError> {
        self.entries
            .iter()
            .find(|r| r.id == id)
            .ok_or_else(|| RegistryError::NotFound { id: id.to_string() })
    }

    pub fn svr_metrics(&self) -> Result<&FieldRegistry, RegistryError> {
        self.get(constants::SVR_METRICS_REGISTRY_ID)
    }

    pub fn volumes(&self) -> Result<&FieldRegistry, RegistryError> {
        self.get(constants::VOLUMES_REGISTRY_ID)
    }

    pub fn all(&self) -> &[FieldRegistry] {
        &self.entries
    }
}

/// Load all available registries: built-in first, then user-defined overrides.
///
/// Invalid user registries are logged and skipped (non-fatal); the built-in
/// with the same id stays in effect.
///
/// Returns the merged set and any non-fatal errors encountered.
pub fn load_all_registries(
    user_registry_dir: Option<&Path>,
    options: CompileOptions,
) -> (Registries, Vec<RegistryError>) {
    let mut entries = registry::load_builtin_registries(options);
    let mut errors = Vec::new();

    tracing::debug!(builtin_count = entries.len(), "Loaded built-in registries");

    if let Some(dir) = user_registry_dir {
        if dir.is_dir() {
            let (user_registries, user_errors) = load_user_registries(dir, options);
            errors.extend(user_errors);

            for user_registry in user_registries {
                if let Some(pos) = entries.iter().position(|r| r.id == user_registry.id) {
                    tracing::info!(
                        registry_id = %user_registry.id,
                        "User registry overrides built-in"
                    );
                    entries[pos] = user_registry;
                } else {
                    tracing::info!(
                        registry_id = %user_registry.id,
                        "Loaded user-defined registry"
                    );
                    entries.push(user_registry);
                }
            }
        } else {
            tracing::debug!(
                dir = %dir.display(),
                "User registry directory does not exist (skipping)"
            );
        }
    }

    (Registries { entries }, errors)
}

/// Load user-defined registries from a directory, in file-name order.
fn load_user_registries(
    dir: &Path,
    options: CompileOptions,
) -> (Vec<FieldRegistry>, Vec<RegistryError>) {
    let mut registries = Vec::new();
    let mut errors = Vec::new();

    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            errors.push(RegistryError::Io {
                path: dir.to_path_buf(),
                source: e,
            });
            return (registries, errors);
        }
    };

    let mut paths: Vec<PathBuf> = Vec::new();
    for entry_result in entries {
        match entry_result {
            Ok(entry) => {
                let path = entry.path();
                if path.extension().and_then(|e| e.to_str()) == Some("toml") {
                    paths.push(path);
                }
            }
            Err(e) => errors.push(RegistryError::Io {
                path: dir.to_path_buf(),
                source: e,
            }),
        }
    }
    paths.sort();

    for path in paths {
        let metadata = match std::fs::metadata(&path) {
            Ok(m) => m,
            Err(e) => {
                errors.push(RegistryError::Io { path, source: e });
                continue;
            }
        };

        if metadata.len() > constants::MAX_REGISTRY_FILE_SIZE {
            errors.push(RegistryError::FileTooLarge {
                path,
                size: metadata.len(),
                max_size: constants::MAX_REGISTRY_FILE_SIZE,
            });
            continue;
        }

        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) => {
                errors.push(RegistryError::Io { path, source: e });
                continue;
            }
        };

        match registry::parse_registry_toml(&content, &path)
            .and_then(|def| registry::validate_and_compile(def, options, false))
        {
            Ok(r) => registries.push(r),
            Err(e) => errors.push(e),
        }
    }

    (registries, errors)
}
