//! Filesystem helpers shared across `prefixdb` commands.

use std::io::ErrorKind;

use camino::Utf8Path;
use cap_std::ambient_authority;
use cap_std::fs_utf8::{Dir, File, OpenOptions};

use crate::error::CliError;

/// Extension of dataset files.
pub const DATASET_EXTENSION: &str = "json";

/// Extension of database files.
pub const DATABASE_EXTENSION: &str = "prefixdb";

/// Opens a directory if it exists, returning `None` when the path is missing.
pub fn open_optional_dir(path: &Utf8Path) -> Result<Option<Dir>, CliError> {
    match Dir::open_ambient_dir(path, ambient_authority()) {
        Ok(dir) => Ok(Some(dir)),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
        Err(err) => Err(CliError::Io {
            path: path.to_path_buf(),
            source: err,
        }),
    }
}

/// Whether `path` names an existing regular file.
pub fn is_file(path: &Utf8Path) -> Result<bool, CliError> {
    let (parent, name) = split(path)?;
    let Some(dir) = open_optional_dir(parent)? else {
        return Ok(false);
    };
    match dir.metadata(name) {
        Ok(metadata) => Ok(metadata.is_file()),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(false),
        Err(err) => Err(CliError::Io {
            path: path.to_path_buf(),
            source: err,
        }),
    }
}

/// Reject paths without the `expected` extension.
pub fn require_extension(path: &Utf8Path, expected: &'static str) -> Result<(), CliError> {
    if path.extension() == Some(expected) {
        Ok(())
    } else {
        Err(CliError::InvalidExtension {
            path: path.to_path_buf(),
            expected,
        })
    }
}

/// Reject input paths with the wrong extension or that do not exist.
pub fn require_input(path: &Utf8Path, expected: &'static str) -> Result<(), CliError> {
    require_extension(path, expected)?;
    if is_file(path)? {
        Ok(())
    } else {
        Err(CliError::MissingInput(path.to_path_buf()))
    }
}

/// Create or truncate `path`, creating missing parent directories.
pub fn create_output(path: &Utf8Path) -> Result<File, CliError> {
    let (parent, name) = split(path)?;
    let dir = ensure_dir(parent)?;
    dir.open_with(name, OpenOptions::new().write(true).create(true).truncate(true))
        .map_err(|io_err| CliError::Io {
            path: path.to_path_buf(),
            source: io_err,
        })
}

fn split(path: &Utf8Path) -> Result<(&Utf8Path, &str), CliError> {
    let name = path.file_name().ok_or_else(|| CliError::Io {
        path: path.to_path_buf(),
        source: std::io::Error::new(ErrorKind::InvalidInput, "path does not name a file"),
    })?;
    let parent = path
        .parent()
        .filter(|parent| !parent.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));
    Ok((parent, name))
}

fn ensure_dir(path: &Utf8Path) -> Result<Dir, CliError> {
    if let Some(dir) = open_optional_dir(path)? {
        return Ok(dir);
    }
    Dir::create_ambient_dir_all(path, ambient_authority()).map_err(|io_err| CliError::Io {
        path: path.to_path_buf(),
        source: io_err,
    })?;
    Dir::open_ambient_dir(path, ambient_authority()).map_err(|io_err| CliError::Io {
        path: path.to_path_buf(),
        source: io_err,
    })
}
