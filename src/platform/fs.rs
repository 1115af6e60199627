// ReconLog - platform/fs.rs
//
// File reading and output-file creation with path-carrying errors.
// Each input is opened, read fully, and closed before the caller moves on.

use std::fs::File;
use std::io::{self, BufWriter};
use std::path::Path;

/// Read the full content of a file as a string.
///
/// For files with invalid UTF-8, uses lossy conversion; pipeline logs
/// occasionally carry stray bytes from progress bars.
pub fn read_file_lossy(path: &Path) -> io::Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Create (or truncate) `path` for writing, creating missing parent
/// directories. Existing files are overwritten without warning.
pub fn create_output(path: &Path) -> io::Result<BufWriter<File>> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(BufWriter::new(File::create(path)?))
}
