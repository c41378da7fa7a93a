//! Error types for tcctl

use colored::Colorize;
use tencentcloud_core::CoreError;
use tencentcloud_core::config::ConfigError;
use thiserror::Error;

/// Cargo-style diagnostic formatter for CLI errors.
///
/// Produces structured output like:
/// ```text
/// error: Profile 'prod' not found
///
///   tip: List available profiles: tcctl profile list
/// ```
pub struct CliDiagnostic {
    message: String,
    tips: Vec<String>,
}

impl CliDiagnostic {
    pub fn error(message: &str) -> Self {
        Self {
            message: message.to_string(),
            tips: Vec::new(),
        }
    }

    pub fn tip(mut self, description: &str) -> Self {
        self.tips.push(description.to_string());
        self
    }

    /// Print the diagnostic to stderr with colored formatting.
    pub fn print(&self) {
        eprint!("{}{}", "error".red().bold(), ": ".bold());
        eprintln!("{}", self.message);

        for tip in &self.tips {
            eprintln!();
            eprint!("  {}{}", "tip".yellow().bold(), ": ".bold());
            eprintln!("{}", tip);
        }
    }
}

/// Main error type for the tcctl application
#[derive(Error, Debug)]
pub enum TcctlError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Profile '{name}' not found")]
    ProfileNotFound { name: String },

    #[error("No profile configured. Use 'tcctl profile set' to configure a profile.")]
    NoProfileConfigured,

    #[error("Unknown {kind} type '{name}'")]
    UnknownType { kind: &'static str, name: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("API error: {message}")]
    ApiError { message: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("File error for '{path}': {message}")]
    FileError { path: String, message: String },

    #[error("Timeout: {message}")]
    Timeout { message: String },

    #[error("Output formatting error: {message}")]
    OutputError { message: String },
}

/// Result type for tcctl operations
pub type Result<T> = std::result::Result<T, TcctlError>;

impl TcctlError {
    /// Get helpful suggestions for resolving this error
    pub fn suggestions(&self) -> Vec<String> {
        match self {
            TcctlError::ProfileNotFound { name } => vec![
                "List available profiles: tcctl profile list".to_string(),
                format!("Create profile '{name}': tcctl profile set {name} --secret-id <id> --secret-key <key>"),
            ],
            TcctlError::NoProfileConfigured => vec![
                "Create a profile: tcctl profile set prod --secret-id <id> --secret-key <key>".to_string(),
                "Or export TENCENTCLOUD_SECRET_ID and TENCENTCLOUD_SECRET_KEY".to_string(),
            ],
            TcctlError::UnknownType { .. } => {
                vec!["List known type names: tcctl resource types".to_string()]
            }
            TcctlError::AuthenticationFailed { .. } => vec![
                "Check your credentials: tcctl profile show <profile>".to_string(),
                "Verify the secret id and key belong to the same API key".to_string(),
            ],
            TcctlError::Timeout { .. } => vec![
                "The operation keeps running in the cloud; check it again later".to_string(),
                "Raise write_timeout_secs or long_flow_multiplier in the profile".to_string(),
            ],
            TcctlError::InvalidInput { .. } => vec![
                "Check the command syntax: tcctl <command> --help".to_string(),
                "Verify input file format is correct (JSON/YAML)".to_string(),
            ],
            TcctlError::FileError { path, .. } => vec![
                format!("Check that file exists: {path}"),
                "Verify file permissions are correct".to_string(),
            ],
            _ => vec![],
        }
    }

    /// Print a cargo-style diagnostic to stderr using colored formatting.
    pub fn print_diagnostic(&self) {
        let mut diag = CliDiagnostic::error(&self.to_string());
        for suggestion in self.suggestions() {
            diag = diag.tip(&suggestion);
        }
        diag.print();
    }
}

impl From<CoreError> for TcctlError {
    fn from(err: CoreError) -> Self {
        let message = err.to_string();
        if err.is_timeout() {
            return TcctlError::Timeout { message };
        }
        if err.is_unauthorized() {
            return TcctlError::AuthenticationFailed { message };
        }
        match err.root() {
            CoreError::Validation(_) | CoreError::ImmutableField(_) => {
                TcctlError::InvalidInput { message }
            }
            CoreError::Config(_) => TcctlError::Configuration(message),
            CoreError::Io { path, source } => TcctlError::FileError {
                path: path.clone(),
                message: source.to_string(),
            },
            _ => TcctlError::ApiError { message },
        }
    }
}

impl From<ConfigError> for TcctlError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::ProfileNotFound { name } => TcctlError::ProfileNotFound { name },
            ConfigError::NoProfiles { .. } => TcctlError::NoProfileConfigured,
            other => TcctlError::Configuration(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for TcctlError {
    fn from(err: serde_json::Error) -> Self {
        TcctlError::OutputError {
            message: format!("JSON error: {}", err),
        }
    }
}

impl From<anyhow::Error> for TcctlError {
    fn from(err: anyhow::Error) -> Self {
        TcctlError::Configuration(format!("{err:#}"))
    }
}
