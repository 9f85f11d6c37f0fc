//! Session store persisted as one JSON file inside a capability directory.
//!
//! The file holds the three session keys together, so a write either
//! replaces all of them or none.

use std::io;
use std::path::{Path, PathBuf};

use cap_std::{ambient_authority, fs::Dir};
use tracing::debug;

use crate::domain::ports::{SessionStore, SessionStoreError};
use crate::domain::session::{Session, SessionFields};

/// File name of the persisted session inside the session directory.
pub const SESSION_FILE: &str = "session.json";
const STAGING_FILE: &str = ".session.json.tmp";

/// [`SessionStore`] backed by `<dir>/session.json`.
#[derive(Debug)]
pub struct FileSessionStore {
    root: PathBuf,
    dir: Dir,
}

impl FileSessionStore {
    /// Open (creating if needed) the session directory.
    ///
    /// # Errors
    ///
    /// Returns [`SessionStoreError::Io`] when the directory cannot be created
    /// or opened.
    pub fn open(root: impl AsRef<Path>) -> Result<Self, SessionStoreError> {
        let root = root.as_ref();
        Dir::create_ambient_dir_all(root, ambient_authority())
            .map_err(|error| io_error(root, &error))?;
        let dir = Dir::open_ambient_dir(root, ambient_authority())
            .map_err(|error| io_error(root, &error))?;
        Ok(Self {
            root: root.to_path_buf(),
            dir,
        })
    }

    /// Directory the session file lives in.
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn read_fields(&self) -> Result<SessionFields, SessionStoreError> {
        let raw = match self.dir.read(SESSION_FILE) {
            Ok(raw) => raw,
            Err(error) if error.kind() == io::ErrorKind::NotFound => {
                return Ok(SessionFields::default());
            }
            Err(error) => return Err(io_error(&self.root.join(SESSION_FILE), &error)),
        };
        serde_json::from_slice(&raw).map_err(|error| SessionStoreError::corrupt(error.to_string()))
    }
}

impl SessionStore for FileSessionStore {
    fn get(&self) -> Result<Option<Session>, SessionStoreError> {
        Ok(Session::from_fields(&self.read_fields()?))
    }

    fn set(&self, session: &Session) -> Result<(), SessionStoreError> {
        let body = serde_json::to_vec_pretty(&session.to_fields())
            .map_err(|error| SessionStoreError::io(error.to_string()))?;
        self.dir
            .write(STAGING_FILE, body)
            .map_err(|error| io_error(&self.root.join(STAGING_FILE), &error))?;
        self.dir
            .rename(STAGING_FILE, &self.dir, SESSION_FILE)
            .map_err(|error| io_error(&self.root.join(SESSION_FILE), &error))?;
        debug!(dir = %self.root.display(), "session stored");
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionStoreError> {
        match self.dir.remove_file(SESSION_FILE) {
            Ok(()) => Ok(()),
            Err(error) if error.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(error) => Err(io_error(&self.root.join(SESSION_FILE), &error)),
        }
    }
}

fn io_error(path: &Path, error: &io::Error) -> SessionStoreError {
    SessionStoreError::io(format!("{}: {error}", path.display()))
}
