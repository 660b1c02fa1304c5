use crate::error::EtlError;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

const JSON_EXTENSION: &str = "json";

/// Returns the absolute paths of every `.json` file at any depth under `root`,
/// ordered by parent directory and then by file name.
pub fn find_json_files<P: AsRef<Path>>(root: P) -> Result<Vec<PathBuf>, EtlError> {
    let root = root.as_ref();
    if !root.is_dir() {
        return Err(EtlError::PathNotFound(root.to_path_buf()));
    }
    let root = root.canonicalize()?;

    let mut files = Vec::new();
    for entry in WalkDir::new(&root).sort_by_file_name() {
        let entry = entry.map_err(|e| match e.into_io_error() {
            Some(io_error) => EtlError::Io(io_error),
            None => EtlError::Io(std::io::Error::other("filesystem loop while walking")),
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let is_json = entry
            .path()
            .extension()
            .map(|ext| ext == JSON_EXTENSION)
            .unwrap_or(false);
        if is_json {
            files.push(entry.into_path());
        }
    }

    files.sort_by(|a, b| a.parent().cmp(&b.parent()).then_with(|| a.file_name().cmp(&b.file_name())));
    Ok(files)
}
