//! # perch-auth
//!
//! Minimal file-backed credential store: one CSV row per user holding the
//! username and a SHA-256 password digest. Registration appends, login does
//! a linear lookup.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use sha2::{Digest, Sha256};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("user already exists")]
    UsernameTaken,

    #[error("invalid username or password")]
    InvalidCredentials,

    #[error("failed to access credential file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("credential file error: {0}")]
    Csv(#[from] csv::Error),
}

pub struct AuthStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl AuthStore {
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    /// Create a new user. The check and the append run under one lock so
    /// concurrent registrations cannot both claim a username.
    pub fn register(&self, username: &str, password: &str) -> Result<(), AuthError> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if self.find(username)?.is_some() {
            return Err(AuthError::UsernameTaken);
        }

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|source| AuthError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|source| AuthError::Io {
                path: self.path.clone(),
                source,
            })?;

        let digest = hash_password(password);
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);
        writer.write_record([username, digest.as_str()])?;
        writer.flush().map_err(|source| AuthError::Io {
            path: self.path.clone(),
            source,
        })?;
        Ok(())
    }

    /// Verify a username/password pair. Unknown users and wrong passwords
    /// are indistinguishable to the caller.
    pub fn login(&self, username: &str, password: &str) -> Result<(), AuthError> {
        match self.find(username)? {
            Some(stored) if stored == hash_password(password) => Ok(()),
            _ => Err(AuthError::InvalidCredentials),
        }
    }

    /// The stored password digest for a username, if the user exists.
    fn find(&self, username: &str) -> Result<Option<String>, AuthError> {
        if !self.path.exists() {
            return Ok(None);
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .from_path(&self.path)?;
        for result in reader.records() {
            let record = result?;
            if record.get(0) == Some(username) {
                return Ok(record.get(1).map(str::to_string));
            }
        }
        Ok(None)
    }
}

fn hash_password(password: &str) -> String {
    hex::encode(Sha256::digest(password.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> AuthStore {
        AuthStore::with_path(dir.path().join("users.csv"))
    }

    #[test]
    fn test_register_then_login() {
        let dir = TempDir::new().unwrap();
        let auth = store(&dir);

        auth.register("ada", "hunter2").unwrap();
        auth.login("ada", "hunter2").unwrap();
    }

    #[test]
    fn test_register_taken_username() {
        let dir = TempDir::new().unwrap();
        let auth = store(&dir);
        auth.register("ada", "hunter2").unwrap();

        let err = auth.register("ada", "other").unwrap_err();
        assert!(matches!(err, AuthError::UsernameTaken));
    }

    #[test]
    fn test_login_wrong_password() {
        let dir = TempDir::new().unwrap();
        let auth = store(&dir);
        auth.register("ada", "hunter2").unwrap();

        let err = auth.login("ada", "wrong").unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[test]
    fn test_login_unknown_user() {
        let dir = TempDir::new().unwrap();
        let auth = store(&dir);

        let err = auth.login("nobody", "pw").unwrap_err();
        assert!(matches!(err, AuthError::InvalidCredentials));
    }

    #[test]
    fn test_passwords_are_not_stored_in_clear() {
        let dir = TempDir::new().unwrap();
        let auth = store(&dir);
        auth.register("ada", "hunter2").unwrap();

        let raw = std::fs::read_to_string(dir.path().join("users.csv")).unwrap();
        assert!(raw.contains("ada"));
        assert!(!raw.contains("hunter2"));
    }

    #[test]
    fn test_multiple_users() {
        let dir = TempDir::new().unwrap();
        let auth = store(&dir);
        auth.register("ada", "one").unwrap();
        auth.register("brendan", "two").unwrap();

        auth.login("ada", "one").unwrap();
        auth.login("brendan", "two").unwrap();
        assert!(auth.login("ada", "two").is_err());
    }
}
