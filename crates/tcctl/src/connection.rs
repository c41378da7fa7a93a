//! Profile resolution and provider construction

use crate::error::{Result as CliResult, TcctlError};
use anyhow::Context;
use std::path::PathBuf;
use tencentcloud_core::Provider;
use tencentcloud_core::config::{Config, Profile, ResolvedProfile};
use tracing::{debug, info};

/// Creates providers from the loaded configuration
#[derive(Clone)]
pub struct ConnectionManager {
    pub config: Config,
    pub config_path: Option<PathBuf>,
}

impl ConnectionManager {
    pub fn with_config_path(config: Config, config_path: Option<PathBuf>) -> Self {
        Self {
            config,
            config_path,
        }
    }

    /// Save the configuration to the appropriate location
    pub fn save_config(&self, config: &Config) -> CliResult<()> {
        match &self.config_path {
            Some(path) => config
                .save_to_path(path)
                .context("Failed to save configuration")?,
            None => config.save().context("Failed to save configuration")?,
        }
        Ok(())
    }

    /// Resolve the profile a command runs with
    ///
    /// An explicit or default profile wins. Without any configured profile the
    /// `TENCENTCLOUD_*` environment variables are used, unless `--config-file`
    /// was given, which isolates the run from the environment.
    pub fn resolve_profile(&self, profile_name: Option<&str>) -> CliResult<ResolvedProfile> {
        if profile_name.is_none() && self.config.profiles.is_empty() {
            if self.config_path.is_some() {
                return Err(TcctlError::NoProfileConfigured);
            }
            let profile = Profile::from_env().ok_or(TcctlError::NoProfileConfigured)?;
            info!("Using Tencent Cloud credentials from environment variables");
            return Ok(profile.resolve("environment")?);
        }

        let name = self.config.resolve_profile_name(profile_name)?;
        info!("Using profile: {}", name);
        let profile = self.config.profile(&name)?;
        Ok(profile.resolve(&name)?)
    }

    /// Build a provider for the resolved profile
    pub fn create_provider(&self, profile_name: Option<&str>, no_retry: bool) -> CliResult<Provider> {
        let mut resolved = self.resolve_profile(profile_name)?;
        if no_retry {
            resolved.resilience.retry.enabled = false;
        }
        debug!(region = %resolved.region, "Creating provider");
        Ok(Provider::from_profile(&resolved)?)
    }
}
