//! Reads review guidelines from disk through a capability-scoped directory.

use camino::Utf8Path;
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;

use crate::error::ReviewError;

pub(super) fn read(path: &str) -> Result<String, ReviewError> {
    let path = Utf8Path::new(path);
    let file_name = path.file_name().ok_or_else(|| ReviewError::Io {
        message: format!("instruction file path '{path}' has no file name"),
    })?;
    let parent = path
        .parent()
        .filter(|parent| !parent.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));

    let dir = Dir::open_ambient_dir(parent, ambient_authority()).map_err(|error| {
        ReviewError::Io {
            message: format!("failed to open instruction directory '{parent}': {error}"),
        }
    })?;
    dir.read_to_string(file_name)
        .map_err(|error| ReviewError::Io {
            message: format!("failed to read instruction file '{path}': {error}"),
        })
}
