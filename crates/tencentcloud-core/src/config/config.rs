//! Configuration management for Tencent Cloud profiles
//!
//! Handles configuration loading from files and environment variables.
//! Configuration is stored in TOML format with support for multiple named profiles.

#[cfg(target_os = "macos")]
use directories::BaseDirs;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::credential::CredentialStore;
use super::error::{ConfigError, Result};
use super::resilience::ResilienceConfig;
use crate::client::{ClientProfile, Credential};

pub const ENV_SECRET_ID: &str = "TENCENTCLOUD_SECRET_ID";
pub const ENV_SECRET_KEY: &str = "TENCENTCLOUD_SECRET_KEY";
pub const ENV_SECURITY_TOKEN: &str = "TENCENTCLOUD_SECURITY_TOKEN";
pub const ENV_REGION: &str = "TENCENTCLOUD_REGION";

/// Main configuration structure
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq)]
pub struct Config {
    /// Profile used when none is given explicitly
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_profile: Option<String>,
    /// Map of profile name -> profile configuration
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

/// Individual profile configuration
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Profile {
    /// API secret id. Supports keyring: prefix for secure storage.
    #[serde(default)]
    pub secret_id: String,
    /// API secret key. Supports keyring: prefix for secure storage.
    #[serde(default)]
    pub secret_key: String,
    /// Temporary session token
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub security_token: Option<String>,
    #[serde(default = "default_region")]
    pub region: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    /// Full endpoint URL overriding `{protocol}://{service}.{domain}`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    /// Resilience configuration for this profile
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resilience: Option<ResilienceConfig>,
}

/// A profile with every credential resolved, ready to build a client from
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedProfile {
    pub credential: Credential,
    pub region: String,
    pub client: ClientProfile,
    pub resilience: ResilienceConfig,
}

fn default_region() -> String {
    "ap-guangzhou".to_string()
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            secret_id: String::new(),
            secret_key: String::new(),
            security_token: None,
            region: default_region(),
            domain: None,
            protocol: None,
            endpoint: None,
            resilience: None,
        }
    }
}

impl Profile {
    pub fn new(secret_id: impl Into<String>, secret_key: impl Into<String>) -> Self {
        Self {
            secret_id: secret_id.into(),
            secret_key: secret_key.into(),
            ..Self::default()
        }
    }

    /// Check if this profile keeps any secret in the OS keyring
    pub fn uses_keyring(&self) -> bool {
        CredentialStore::is_keyring_reference(&self.secret_id)
            || CredentialStore::is_keyring_reference(&self.secret_key)
    }

    /// Resolve credentials (environment first, then keyring, then plaintext)
    pub fn resolve(&self, name: &str) -> Result<ResolvedProfile> {
        let store = CredentialStore::new();

        let secret_id = store
            .get_credential(&self.secret_id, Some(ENV_SECRET_ID))
            .map_err(|e| {
                ConfigError::CredentialError(format!("Failed to resolve secret id: {}", e))
            })?;
        let secret_key = store
            .get_credential(&self.secret_key, Some(ENV_SECRET_KEY))
            .map_err(|e| {
                ConfigError::CredentialError(format!("Failed to resolve secret key: {}", e))
            })?;
        let token = match &self.security_token {
            Some(token) => Some(store.get_credential(token, Some(ENV_SECURITY_TOKEN))?),
            None => std::env::var(ENV_SECURITY_TOKEN).ok(),
        };
        let region = store.get_credential(&self.region, Some(ENV_REGION))?;

        for (field, value) in [
            ("secret_id", &secret_id),
            ("secret_key", &secret_key),
            ("region", &region),
        ] {
            if value.is_empty() {
                return Err(ConfigError::MissingField {
                    profile: name.to_string(),
                    field: field.to_string(),
                });
            }
        }

        let resilience = self.resilience.clone().unwrap_or_default();
        let defaults = ClientProfile::default();
        Ok(ResolvedProfile {
            credential: Credential::new(secret_id, secret_key).with_token(token),
            region,
            client: ClientProfile {
                protocol: self.protocol.clone().unwrap_or(defaults.protocol),
                domain: self.domain.clone().unwrap_or(defaults.domain),
                endpoint: self.endpoint.clone(),
                request_timeout: resilience.request_timeout(),
            },
            resilience,
        })
    }

    /// Profile built purely from `TENCENTCLOUD_*` environment variables
    pub fn from_env() -> Option<Self> {
        let secret_id = std::env::var(ENV_SECRET_ID).ok()?;
        let secret_key = std::env::var(ENV_SECRET_KEY).ok()?;
        Some(Self {
            security_token: std::env::var(ENV_SECURITY_TOKEN).ok(),
            region: std::env::var(ENV_REGION).unwrap_or_else(|_| default_region()),
            ..Self::new(secret_id, secret_key)
        })
    }
}

impl Config {
    /// Resolve the profile name to use
    ///
    /// Resolution order: explicit name, `default_profile`, then the first
    /// profile sorted by name.
    pub fn resolve_profile_name(&self, explicit_profile: Option<&str>) -> Result<String> {
        if let Some(profile_name) = explicit_profile {
            return Ok(profile_name.to_string());
        }

        if let Some(ref default) = self.default_profile {
            return Ok(default.clone());
        }

        self.list_profiles()
            .first()
            .map(|(name, _)| name.to_string())
            .ok_or_else(|| ConfigError::NoProfiles {
                suggestion: format!(
                    "Use 'tcctl profile set' to create a profile or export {} and {}.",
                    ENV_SECRET_ID, ENV_SECRET_KEY
                ),
            })
    }

    /// Look up a profile by name
    pub fn profile(&self, name: &str) -> Result<&Profile> {
        self.profiles
            .get(name)
            .ok_or_else(|| ConfigError::ProfileNotFound {
                name: name.to_string(),
            })
    }

    /// Load configuration from the standard location
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from_path(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from_path(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(config_path).map_err(|e| ConfigError::LoadError {
            path: config_path.display().to_string(),
            source: e,
        })?;

        // Expand environment variables in the config content
        let expanded_content = Self::expand_env_vars(&content);

        let config: Config = toml::from_str(&expanded_content)?;

        Ok(config)
    }

    /// Save configuration to the standard location
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path()?;
        self.save_to_path(&config_path)
    }

    /// Save configuration to a specific path
    pub fn save_to_path(&self, config_path: &Path) -> Result<()> {
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::SaveError {
                path: parent.display().to_string(),
                source: e,
            })?;
        }

        let content = toml::to_string_pretty(self)?;

        fs::write(config_path, content).map_err(|e| ConfigError::SaveError {
            path: config_path.display().to_string(),
            source: e,
        })?;

        Ok(())
    }

    /// Set or update a profile
    pub fn set_profile(&mut self, name: String, profile: Profile) {
        self.profiles.insert(name, profile);
    }

    /// Remove a profile by name
    pub fn remove_profile(&mut self, name: &str) -> Option<Profile> {
        if self.default_profile.as_deref() == Some(name) {
            self.default_profile = None;
        }
        self.profiles.remove(name)
    }

    /// List all profiles sorted by name
    pub fn list_profiles(&self) -> Vec<(&String, &Profile)> {
        let mut profiles: Vec<_> = self.profiles.iter().collect();
        profiles.sort_by_key(|(name, _)| *name);
        profiles
    }

    /// Get the path to the configuration file
    ///
    /// On macOS, `~/.config/tcctl/config.toml` is preferred when it exists,
    /// falling back to `~/Library/Application Support/com.tencentcloud.tcctl/config.toml`.
    ///
    /// On Linux: ~/.config/tcctl/config.toml
    /// On Windows: %APPDATA%\tencentcloud\tcctl\config.toml
    pub fn config_path() -> Result<PathBuf> {
        #[cfg(target_os = "macos")]
        {
            if let Some(base_dirs) = BaseDirs::new() {
                let linux_style_path = base_dirs
                    .home_dir()
                    .join(".config")
                    .join("tcctl")
                    .join("config.toml");

                if linux_style_path
                    .parent()
                    .map(|p| p.exists())
                    .unwrap_or(false)
                {
                    return Ok(linux_style_path);
                }
            }
        }

        let proj_dirs =
            ProjectDirs::from("com", "tencentcloud", "tcctl").ok_or(ConfigError::ConfigDirError)?;

        Ok(proj_dirs.config_dir().join("config.toml"))
    }

    /// Expand environment variables in configuration content
    ///
    /// Supports ${VAR} and ${VAR:-default}. Unset variables without a default
    /// are left as-is so that profiles that are not used never fail to load.
    ///
    /// Example:
    /// ```toml
    /// secret_id = "${TENCENTCLOUD_SECRET_ID}"
    /// region = "${TENCENTCLOUD_REGION:-ap-guangzhou}"
    /// ```
    pub(crate) fn expand_env_vars(content: &str) -> String {
        let expanded =
            shellexpand::env_with_context_no_errors(content, |var| std::env::var(var).ok());
        expanded.to_string()
    }
}
