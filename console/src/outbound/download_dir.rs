//! Download sink writing payloads into one directory.

use std::path::{Path, PathBuf};

use cap_std::{ambient_authority, fs::Dir};
use tracing::info;

use crate::domain::ports::{DownloadSink, DownloadSinkError};

/// Saves downloads as plain files under a fixed directory.
#[derive(Debug)]
pub struct DirectoryDownloadSink {
    root: PathBuf,
    dir: Dir,
}

impl DirectoryDownloadSink {
    /// Open (creating if needed) the download directory.
    ///
    /// # Errors
    ///
    /// Returns [`DownloadSinkError::Io`] when the directory is unusable.
    pub fn open(root: impl AsRef<Path>) -> Result<Self, DownloadSinkError> {
        let root = root.as_ref();
        Dir::create_ambient_dir_all(root, ambient_authority())
            .map_err(|error| DownloadSinkError::io(format!("{}: {error}", root.display())))?;
        let dir = Dir::open_ambient_dir(root, ambient_authority())
            .map_err(|error| DownloadSinkError::io(format!("{}: {error}", root.display())))?;
        Ok(Self {
            root: root.to_path_buf(),
            dir,
        })
    }
}

fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
        && !name.contains('\0')
}

impl DownloadSink for DirectoryDownloadSink {
    fn save(&self, file_name: &str, contents: &[u8]) -> Result<String, DownloadSinkError> {
        if !is_plain_file_name(file_name) {
            return Err(DownloadSinkError::invalid_name(file_name));
        }
        let target = self.root.join(file_name);
        self.dir
            .write(file_name, contents)
            .map_err(|error| DownloadSinkError::io(format!("{}: {error}", target.display())))?;
        info!(path = %target.display(), bytes = contents.len(), "download saved");
        Ok(target.display().to_string())
    }
}
