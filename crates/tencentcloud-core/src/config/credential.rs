//! Secret resolution with optional OS keyring support
//!
//! A secret stored in a profile is one of:
//! - `keyring:<entry>`: looked up in the OS keyring (feature `secure-storage`)
//! - anything else: used as plaintext
//!
//! An environment variable, when given and set, always wins.

use super::error::{ConfigError, Result};
use std::env;

/// Prefix that indicates a value should be retrieved from the keyring
const KEYRING_PREFIX: &str = "keyring:";

/// Service name for keyring entries
#[cfg(feature = "secure-storage")]
const SERVICE_NAME: &str = "tcctl";

/// Storage backend for secrets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialStorage {
    /// OS keyring
    #[cfg(feature = "secure-storage")]
    Keyring,
    /// Inline in the config file
    Plaintext,
}

/// Resolves and stores profile secrets
#[derive(Debug, Clone)]
pub struct CredentialStore {
    storage: CredentialStorage,
}

impl Default for CredentialStore {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialStore {
    /// Keyring when compiled in and reachable, plaintext otherwise
    pub fn new() -> Self {
        #[cfg(feature = "secure-storage")]
        let storage = if keyring::Entry::new(SERVICE_NAME, "__probe__").is_ok() {
            CredentialStorage::Keyring
        } else {
            CredentialStorage::Plaintext
        };
        #[cfg(not(feature = "secure-storage"))]
        let storage = CredentialStorage::Plaintext;

        Self { storage }
    }

    /// Always store secrets inline
    pub fn plaintext() -> Self {
        Self {
            storage: CredentialStorage::Plaintext,
        }
    }

    pub fn storage(&self) -> CredentialStorage {
        self.storage
    }

    /// Store a secret and return the value to write into the profile
    pub fn store_credential(&self, key: &str, value: &str) -> Result<String> {
        match self.storage {
            #[cfg(feature = "secure-storage")]
            CredentialStorage::Keyring => {
                keyring::Entry::new(SERVICE_NAME, key)
                    .and_then(|entry| entry.set_password(value))
                    .map_err(|e| {
                        ConfigError::KeyringError(format!("Failed to store '{key}': {e}"))
                    })?;
                Ok(format!("{KEYRING_PREFIX}{key}"))
            }
            CredentialStorage::Plaintext => {
                let _ = key;
                Ok(value.to_string())
            }
        }
    }

    /// Resolve a stored value
    ///
    /// Resolution order: `env_var` if set, keyring reference, plaintext.
    pub fn get_credential(&self, value: &str, env_var: Option<&str>) -> Result<String> {
        if let Some(var) = env_var
            && let Ok(env_value) = env::var(var)
        {
            return Ok(env_value);
        }

        let Some(key) = value.strip_prefix(KEYRING_PREFIX) else {
            return Ok(value.to_string());
        };

        #[cfg(feature = "secure-storage")]
        {
            keyring::Entry::new(SERVICE_NAME, key)
                .and_then(|entry| entry.get_password())
                .map_err(|e| {
                    ConfigError::KeyringError(format!("Failed to retrieve '{key}' from keyring: {e}"))
                })
        }
        #[cfg(not(feature = "secure-storage"))]
        {
            Err(ConfigError::CredentialError(format!(
                "'{key}' references the keyring but the secure-storage feature is not enabled"
            )))
        }
    }

    /// Remove the keyring entry behind a stored value, if it is a reference
    pub fn delete_credential(&self, value: &str) -> Result<()> {
        let Some(key) = value.strip_prefix(KEYRING_PREFIX) else {
            return Ok(());
        };

        #[cfg(feature = "secure-storage")]
        {
            let entry = keyring::Entry::new(SERVICE_NAME, key)
                .map_err(|e| ConfigError::KeyringError(e.to_string()))?;
            match entry.delete_credential() {
                Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
                Err(e) => Err(ConfigError::KeyringError(format!(
                    "Failed to delete '{key}' from keyring: {e}"
                ))),
            }
        }
        #[cfg(not(feature = "secure-storage"))]
        {
            let _ = key;
            Ok(())
        }
    }

    /// Check if a value is a keyring reference
    pub fn is_keyring_reference(value: &str) -> bool {
        value.starts_with(KEYRING_PREFIX)
    }
}
