//! Login state shared by every command that needs an authenticated user.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

pub const DEMO_EMAIL: &str = "test@example.com";
pub const DEMO_PASSWORD: &str = "password123";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("not logged in")]
    Unauthenticated,
    #[error("session file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistedSession {
    authenticated: bool,
    email: Option<String>,
}

#[derive(Debug)]
pub struct Session {
    path: PathBuf,
    authenticated: bool,
    email: Option<String>,
}

impl Session {
    /// Reads the persisted flag. A missing or unreadable file means logged
    /// out.
    pub fn init(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let persisted = match fs::read_to_string(&path) {
            Ok(raw) => match serde_json::from_str::<PersistedSession>(&raw) {
                Ok(persisted) => Some(persisted),
                Err(error) => {
                    warn!(path = %path.display(), %error, "ignoring corrupt session file");
                    None
                }
            },
            Err(error) if error.kind() == io::ErrorKind::NotFound => None,
            Err(error) => {
                warn!(path = %path.display(), %error, "failed to read session file");
                None
            }
        };

        match persisted {
            Some(PersistedSession {
                authenticated: true,
                email,
            }) => Self {
                path,
                authenticated: true,
                email,
            },
            _ => Self {
                path,
                authenticated: false,
                email: None,
            },
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    pub fn login(&mut self, email: &str, password: &str) -> Result<(), SessionError> {
        if email.trim() != DEMO_EMAIL || password != DEMO_PASSWORD {
            warn!(email, "login rejected");
            return Err(SessionError::InvalidCredentials);
        }

        let persisted = PersistedSession {
            authenticated: true,
            email: Some(DEMO_EMAIL.to_string()),
        };
        self.write(&persisted)?;
        self.authenticated = true;
        self.email = persisted.email;
        info!(email = DEMO_EMAIL, "logged in");
        Ok(())
    }

    pub fn require_authenticated(&self) -> Result<(), SessionError> {
        if self.authenticated {
            Ok(())
        } else {
            Err(SessionError::Unauthenticated)
        }
    }

    /// Logs out and removes the persisted flag.
    pub fn teardown(&mut self) -> Result<(), SessionError> {
        self.authenticated = false;
        self.email = None;
        match fs::remove_file(&self.path) {
            Ok(()) => {}
            Err(error) if error.kind() == io::ErrorKind::NotFound => {}
            Err(source) => {
                return Err(SessionError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        }
        info!("logged out");
        Ok(())
    }

    fn write(&self, persisted: &PersistedSession) -> Result<(), SessionError> {
        let io_error = |source| SessionError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_error)?;
        }
        let raw = serde_json::to_string(persisted)
            .map_err(|error| io_error(io::Error::new(io::ErrorKind::InvalidData, error)))?;
        fs::write(&self.path, raw).map_err(io_error)
    }
}

#[cfg(test)]
#[path = "tests/session_tests.rs"]
mod tests;
