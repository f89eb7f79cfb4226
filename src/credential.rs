//! API credential handling
//!
//! The credential is a plain session value: [`Credential::set`] and
//! [`Credential::clear`] return the new state instead of mutating anything.
//! Persistence goes through a [`CredentialStore`], and a missing key is
//! requested through a [`CredentialPrompt`].

use crate::{Error, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

/// Name under which the key is persisted.
pub const CREDENTIAL_KEY: &str = "anthropic_api_key";

#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credential {
    api_key: Option<String>,
}

impl Credential {
    pub fn empty() -> Self {
        Self { api_key: None }
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    pub fn is_set(&self) -> bool {
        self.api_key.is_some()
    }

    /// New credential holding the trimmed key; a blank key yields an empty credential.
    pub fn set(&self, api_key: &str) -> Self {
        let trimmed = api_key.trim();
        if trimmed.is_empty() {
            Self::empty()
        } else {
            Self {
                api_key: Some(trimmed.to_string()),
            }
        }
    }

    pub fn clear(&self) -> Self {
        Self::empty()
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

pub trait CredentialStore: Send + Sync {
    fn load(&self) -> Result<Credential>;
    /// Persist `credential`; an empty credential erases the stored key.
    fn save(&self, credential: &Credential) -> Result<()>;
}

/// Stores the raw key in a file named [`CREDENTIAL_KEY`].
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(dir: &Path) -> Self {
        Self {
            path: dir.join(CREDENTIAL_KEY),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<Credential> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => Ok(Credential::empty().set(&contents)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Credential::empty()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, credential: &Credential) -> Result<()> {
        match credential.api_key() {
            Some(key) => {
                if let Some(parent) = self.path.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::write(&self.path, key)?;
                #[cfg(unix)]
                {
                    use std::os::unix::fs::PermissionsExt;
                    std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))?;
                }
                tracing::debug!("Saved credential to {}", self.path.display());
            }
            None => match std::fs::remove_file(&self.path) {
                Ok(()) => tracing::debug!("Removed credential at {}", self.path.display()),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            },
        }
        Ok(())
    }
}

/// In-memory store; clones share the same slot.
#[derive(Clone, Default)]
pub struct MemoryCredentialStore {
    slot: Arc<Mutex<Credential>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_key(self, api_key: &str) -> Self {
        if let Ok(mut slot) = self.slot.lock() {
            *slot = Credential::empty().set(api_key);
        }
        self
    }

    pub fn current(&self) -> Credential {
        self.slot
            .lock()
            .map(|slot| slot.clone())
            .unwrap_or_default()
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Result<Credential> {
        self.slot
            .lock()
            .map(|slot| slot.clone())
            .map_err(|_| Error::Invariant("credential store lock poisoned".to_string()))
    }

    fn save(&self, credential: &Credential) -> Result<()> {
        let mut slot = self
            .slot
            .lock()
            .map_err(|_| Error::Invariant("credential store lock poisoned".to_string()))?;
        *slot = credential.clone();
        Ok(())
    }
}

/// Asks the user for a key when none is stored. `None` means the user declined.
pub trait CredentialPrompt: Send + Sync {
    fn prompt(&self) -> Option<String>;
}

/// Hidden-input prompt on the controlling terminal.
pub struct TerminalPrompt;

impl CredentialPrompt for TerminalPrompt {
    fn prompt(&self) -> Option<String> {
        dialoguer::Password::new()
            .with_prompt(
                "Please enter your Anthropic API key (get one at https://console.anthropic.com/settings/keys)",
            )
            .allow_empty_password(true)
            .interact()
            .map_err(|e| {
                tracing::warn!("Credential prompt failed: {}", e);
                e
            })
            .ok()
    }
}

/// Prompt that always answers the same way and counts how often it was asked.
#[derive(Clone, Default)]
pub struct StaticPrompt {
    response: Option<String>,
    call_count: Arc<Mutex<usize>>,
}

impl StaticPrompt {
    pub fn declined() -> Self {
        Self::default()
    }

    pub fn with_response(response: &str) -> Self {
        Self {
            response: Some(response.to_string()),
            call_count: Arc::new(Mutex::new(0)),
        }
    }

    pub fn get_call_count(&self) -> usize {
        self.call_count.lock().map(|count| *count).unwrap_or(0)
    }
}

impl CredentialPrompt for StaticPrompt {
    fn prompt(&self) -> Option<String> {
        if let Ok(mut count) = self.call_count.lock() {
            *count += 1;
        }
        self.response.clone()
    }
}
