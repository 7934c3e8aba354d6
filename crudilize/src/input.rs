//! Schema text loading.

use crate::error::CrudilizeError;
use std::fs;
use std::io::Read;
use std::path::Path;

/// Reads the schema text from `path`, or from `stdin` when no path is given.
///
/// `stdin` is only consumed in the second case.
///
/// # Errors
///
/// Returns `CrudilizeError::Io` if the file is missing or unreadable, or the
/// content is not UTF-8.
pub fn load_input<R: Read>(path: Option<&Path>, stdin: R) -> Result<String, CrudilizeError> {
    match path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "reading schema file");
            fs::read_to_string(path).map_err(|e| CrudilizeError::io(path.display(), e))
        }
        None => {
            tracing::debug!("reading schema from stdin");
            read_input(stdin)
        }
    }
}

/// Reads `reader` to end-of-stream as UTF-8.
///
/// # Errors
///
/// Returns `CrudilizeError::Io` on read failure or invalid UTF-8.
pub fn read_input<R: Read>(mut reader: R) -> Result<String, CrudilizeError> {
    let mut text: String = String::new();
    reader
        .read_to_string(&mut text)
        .map_err(|e| CrudilizeError::io("<stdin>", e))?;
    Ok(text)
}
