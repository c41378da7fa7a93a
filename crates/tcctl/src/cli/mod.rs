//! CLI structure and command definitions

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Tencent Cloud resource lifecycle CLI
#[derive(Parser, Debug)]
#[command(name = "tcctl")]
#[command(version, about = "Tencent Cloud resource lifecycle CLI")]
#[command(long_about = "
Tencent Cloud resource lifecycle CLI

Drives create, read, update and delete of CFS, Direct Connect, EKS,
SQL Server, PostgreSQL and BI resources, waiting on asynchronous
operations until they finish.

EXAMPLES:
    # Set up a profile
    tcctl profile set prod --secret-id AKID... --secret-key ... --region ap-guangzhou

    # Create a file system and keep its state
    tcctl resource create tencentcloud_cfs_file_system --config cfs.yaml --state cfs.json

    # Refresh it later
    tcctl resource read tencentcloud_cfs_file_system --state cfs.json

    # Query EKS clusters
    tcctl data tencentcloud_eks_clusters --filter filter.json -o yaml

    # Wait on a SQL Server flow
    tcctl flow wait sqlserver 12345

For more help on a specific command, run:
    tcctl <command> --help
")]
pub struct Cli {
    /// Profile to use for this command
    #[arg(long, short, global = true, env = "TCCTL_PROFILE")]
    pub profile: Option<String>,

    /// Path to alternate configuration file
    #[arg(long, global = true, env = "TCCTL_CONFIG_FILE")]
    pub config_file: Option<String>,

    /// Output format
    #[arg(long, short = 'o', global = true, value_enum, default_value = "auto")]
    pub output: OutputFormat,

    /// Enable verbose logging
    #[arg(long, short, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Attempt every API call once
    #[arg(long, global = true)]
    pub no_retry: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary
    Auto,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Profile management
    #[command(subcommand, visible_alias = "prof", visible_alias = "pr")]
    #[command(after_help = "EXAMPLES:
    # Create a profile
    tcctl profile set prod --secret-id AKID... --secret-key ... --region ap-shanghai

    # List all profiles
    tcctl profile list

    # Show profile details
    tcctl profile show prod

    # Set the default profile
    tcctl profile default prod
")]
    Profile(ProfileCommands),

    /// Resource lifecycle operations
    #[command(subcommand, visible_alias = "res")]
    Resource(ResourceCommands),

    /// Read a data source
    #[command(after_help = "EXAMPLES:
    # All CFS file systems
    tcctl data tencentcloud_cfs_file_systems

    # Filtered, saving the result list
    tcctl data tencentcloud_dc_gateways --filter filter.yaml --result-output-file gateways.json
")]
    Data(DataArgs),

    /// Asynchronous operation tracking
    #[command(subcommand)]
    Flow(FlowCommands),

    /// Version information
    #[command(visible_alias = "ver", visible_alias = "v")]
    Version,
}

/// Profile management commands
#[derive(Subcommand, Debug)]
pub enum ProfileCommands {
    /// List all configured profiles
    #[command(visible_alias = "ls", visible_alias = "l")]
    List,

    /// Show the path to the configuration file
    Path,

    /// Show details of a specific profile
    #[command(visible_alias = "sh", visible_alias = "get")]
    Show {
        /// Profile name to show
        name: String,
    },

    /// Set or create a profile
    #[command(visible_alias = "add", visible_alias = "create")]
    Set(ProfileSetArgs),

    /// Remove a profile
    #[command(visible_alias = "rm", visible_alias = "delete")]
    Remove {
        /// Profile name to remove
        name: String,

        /// Do not ask for confirmation
        #[arg(long, short)]
        yes: bool,
    },

    /// Set the default profile
    #[command(visible_alias = "def")]
    Default {
        /// Profile name to use by default
        name: String,
    },
}

#[derive(Args, Debug)]
pub struct ProfileSetArgs {
    /// Profile name
    pub name: String,

    /// API secret id
    #[arg(long)]
    pub secret_id: String,

    /// API secret key
    #[arg(long)]
    pub secret_key: String,

    /// Temporary session token
    #[arg(long)]
    pub security_token: Option<String>,

    /// Region, e.g. ap-guangzhou
    #[arg(long, default_value = "ap-guangzhou")]
    pub region: String,

    /// API domain, e.g. tencentcloudapi.com
    #[arg(long)]
    pub domain: Option<String>,

    /// Full endpoint URL used for every service
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Store the secret key in the OS keyring
    #[cfg(feature = "secure-storage")]
    #[arg(long)]
    pub use_keyring: bool,
}

/// Resource lifecycle commands
#[derive(Subcommand, Debug)]
pub enum ResourceCommands {
    /// List resource and data source type names
    Types,

    /// Create a resource
    #[command(after_help = "EXAMPLES:
    tcctl resource create tencentcloud_sqlserver_db --config db.yaml --state db.json
")]
    Create {
        /// Resource type name
        type_name: String,

        /// Configuration file (JSON or YAML)
        #[arg(long)]
        config: PathBuf,

        /// File to write the resulting state to
        #[arg(long)]
        state: Option<PathBuf>,
    },

    /// Refresh a resource from its state file
    Read {
        /// Resource type name
        type_name: String,

        /// State file written by `create`
        #[arg(long)]
        state: PathBuf,
    },

    /// Apply a new configuration to a resource
    Update {
        /// Resource type name
        type_name: String,

        /// New configuration file (JSON or YAML)
        #[arg(long)]
        config: PathBuf,

        /// State file written by `create`
        #[arg(long)]
        state: PathBuf,
    },

    /// Delete a resource
    Delete {
        /// Resource type name
        type_name: String,

        /// State file written by `create`
        #[arg(long)]
        state: PathBuf,
    },
}

#[derive(Args, Debug)]
pub struct DataArgs {
    /// Data source type name
    pub type_name: String,

    /// Filter file (JSON or YAML); no filter when omitted
    #[arg(long)]
    pub filter: Option<PathBuf>,

    /// Also save the result list to this file
    #[arg(long)]
    pub result_output_file: Option<PathBuf>,
}

/// Asynchronous operation commands
#[derive(Subcommand, Debug)]
pub enum FlowCommands {
    /// Wait until an operation finishes
    #[command(subcommand)]
    Wait(WaitTarget),
}

#[derive(Subcommand, Debug)]
pub enum WaitTarget {
    /// SQL Server flow
    Sqlserver {
        /// Flow id returned by a SQL Server call
        flow_id: i64,

        /// Maximum time to wait in seconds (default: the profile's long-flow budget)
        #[arg(long)]
        timeout: Option<u64>,
    },
}
