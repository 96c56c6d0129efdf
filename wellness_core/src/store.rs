//! Per-user document persistence with file locking.
//!
//! Layout under the data directory:
//! - `users/<username>.json` holds one user's whole `AppState`
//! - `active_user` names the user who is currently logged in
//!
//! Documents are replaced whole: write to a temp file, sync, rename.

use crate::{AppState, Error, Result};
use fs2::FileExt;
use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

const USERS_DIR: &str = "users";
const ACTIVE_USER_FILE: &str = "active_user";

/// Filesystem-backed store for user documents
#[derive(Clone, Debug)]
pub struct UserStore {
    root: PathBuf,
}

impl UserStore {
    /// Create a store rooted at the given data directory
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Path of a user's document. `username` must already be normalized.
    pub fn user_path(&self, username: &str) -> PathBuf {
        self.root.join(USERS_DIR).join(format!("{}.json", username))
    }

    fn active_user_path(&self) -> PathBuf {
        self.root.join(ACTIVE_USER_FILE)
    }

    /// Load a user's document with shared locking
    ///
    /// Returns `None` if the user has never logged in. A document that
    /// exists but cannot be parsed is an error; it is never overwritten
    /// with a blank state.
    pub fn load(&self, username: &str) -> Result<Option<AppState>> {
        let path = self.user_path(username);
        if !path.exists() {
            tracing::debug!("No document for user {}", username);
            return Ok(None);
        }

        let contents = read_locked(&path)?;
        let state = serde_json::from_str::<AppState>(&contents).map_err(|e| {
            tracing::error!("User document {:?} is corrupted: {}", path, e);
            Error::Json(e)
        })?;

        tracing::debug!("Loaded document for {} from {:?}", username, path);
        Ok(Some(state))
    }

    /// Atomically replace the document for `state.profile.username`
    pub fn save(&self, state: &AppState) -> Result<()> {
        let path = self.user_path(&state.profile.username);
        let contents = serde_json::to_string(state)?;
        write_atomic(&path, contents.as_bytes())?;
        tracing::debug!("Saved document for {} to {:?}", state.profile.username, path);
        Ok(())
    }

    /// Username recorded as logged in, if any
    pub fn active_user(&self) -> Result<Option<String>> {
        let path = self.active_user_path();
        if !path.exists() {
            return Ok(None);
        }
        let username = read_locked(&path)?.trim().to_string();
        if username.is_empty() {
            Ok(None)
        } else {
            Ok(Some(username))
        }
    }

    pub fn set_active_user(&self, username: &str) -> Result<()> {
        write_atomic(&self.active_user_path(), username.as_bytes())?;
        tracing::info!("Active user set to {}", username);
        Ok(())
    }

    pub fn clear_active_user(&self) -> Result<()> {
        let path = self.active_user_path();
        if path.exists() {
            std::fs::remove_file(&path)?;
            tracing::info!("Active user cleared");
        }
        Ok(())
    }

    /// Usernames with a stored document, sorted
    pub fn list_users(&self) -> Result<Vec<String>> {
        let dir = self.root.join(USERS_DIR);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut users: Vec<String> = std::fs::read_dir(&dir)?
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let path = entry.path();
                if path.extension().and_then(|e| e.to_str()) == Some("json") {
                    path.file_stem().and_then(|s| s.to_str()).map(str::to_string)
                } else {
                    None
                }
            })
            .collect();
        users.sort();
        Ok(users)
    }
}

fn read_locked(path: &Path) -> Result<String> {
    let file = File::open(path)?;
    file.lock_shared()?;

    let mut contents = String::new();
    let read = std::io::BufReader::new(&file).read_to_string(&mut contents);
    file.unlock()?;
    read?;
    Ok(contents)
}

fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let parent = path.parent().ok_or_else(|| {
        std::io::Error::new(std::io::ErrorKind::Other, "store path missing parent")
    })?;
    std::fs::create_dir_all(parent)?;

    // Temp file in the same directory so the rename stays on one filesystem
    let temp = NamedTempFile::new_in(parent)?;
    temp.as_file().lock_exclusive()?;

    {
        let mut writer = std::io::BufWriter::new(temp.as_file());
        writer.write_all(bytes)?;
        writer.flush()?;
    }

    temp.as_file().sync_all()?;
    temp.as_file().unlock()?;
    temp.persist(path).map_err(|e| Error::Io(e.error))?;
    Ok(())
}
