//! Configuration and profile management
//!
// Allow nested config module - this is intentional for the config subsystem

#![allow(clippy::module_inception)]
//!
//! Profiles hold the API key pair, region and endpoint settings for one
//! Tencent Cloud account, plus the retry/polling budgets used by resource
//! lifecycles.
//!
//! # Features
//!
//! - Multiple named profiles with a default
//! - Secure credential storage using OS keyring (optional)
//! - Environment variable expansion in config files
//! - Platform-specific config file locations

pub mod config;
pub mod credential;
pub mod error;
pub mod resilience;

// Re-export main types for convenience
pub use config::{Config, Profile, ResolvedProfile};
pub use credential::{CredentialStorage, CredentialStore};
pub use error::{ConfigError, Result};
pub use resilience::{PollingConfig, RateLimitConfig, ResilienceConfig, RetryConfig};
