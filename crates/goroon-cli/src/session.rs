//! The login session file.
//!
//! `goroon login` stores the session id and endpoint as TOML (keys
//! `SessionId` and `Endpoint`, the layout older goroon releases wrote to
//! `~/.goroon`). Later commands reuse it instead of sending the password.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ClientError, ClientResult};

/// A stored login session.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionFile {
    /// Session cookie value.
    #[serde(rename = "SessionId")]
    pub session_id: String,
    /// Endpoint the session belongs to.
    #[serde(rename = "Endpoint")]
    pub endpoint: String,
}

impl std::fmt::Debug for SessionFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionFile")
            .field("session_id", &"***")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl SessionFile {
    /// Creates a session record.
    pub fn new(session_id: impl Into<String>, endpoint: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            endpoint: endpoint.into(),
        }
    }

    /// Reads the session file.
    ///
    /// A missing file yields `None`. An unreadable or malformed file is
    /// logged and also yields `None`, so the caller falls back to
    /// credentials.
    pub fn read(path: &Path) -> Option<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No session file");
                return None;
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Cannot read session file");
                return None;
            }
        };
        match toml::from_str::<Self>(&content) {
            Ok(session) => Some(session),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Ignoring malformed session file");
                None
            }
        }
    }

    /// Writes the session file, replacing any previous one.
    pub fn write(&self, path: &Path) -> ClientResult<()> {
        let content = toml::to_string(self)
            .map_err(|e| ClientError::Session(format!("failed to serialize session: {}", e)))?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content).map_err(|e| {
            ClientError::Session(format!("failed to write {}: {}", path.display(), e))
        })?;
        restrict_permissions(path)?;
        debug!(path = %path.display(), "Saved session");
        Ok(())
    }

    /// Returns true if this session may be used for `endpoint`.
    ///
    /// With no endpoint requested any stored session applies.
    pub fn matches_endpoint(&self, endpoint: Option<&str>) -> bool {
        match endpoint {
            Some(endpoint) => normalize(endpoint) == normalize(&self.endpoint),
            None => true,
        }
    }
}

fn normalize(endpoint: &str) -> &str {
    endpoint.trim().trim_end_matches('/')
}

#[cfg(unix)]
fn restrict_permissions(path: &Path) -> ClientResult<()> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    Ok(())
}

#[cfg(not(unix))]
fn restrict_permissions(_path: &Path) -> ClientResult<()> {
    Ok(())
}
