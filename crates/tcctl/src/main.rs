use anyhow::Result;
use clap::Parser;
use tencentcloud_core::config::Config;
use tracing::{debug, error, info, trace};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod commands;
mod connection;
mod error;
mod output;
mod progress;
mod state;

use cli::{Cli, Commands};
use connection::ConnectionManager;
use error::TcctlError;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity level
    init_tracing(cli.verbose);

    // Load configuration from specified path or default location
    let loaded = match &cli.config_file {
        Some(config_file) => {
            let path = std::path::PathBuf::from(config_file);
            debug!("Loading config from explicit path: {:?}", path);
            Config::load_from_path(&path).map(|config| (config, Some(path)))
        }
        None => {
            debug!("Loading config from default location");
            Config::load().map(|config| (config, None))
        }
    };
    let (config, config_path) = match loaded {
        Ok(loaded) => loaded,
        Err(e) => {
            TcctlError::from(e).print_diagnostic();
            std::process::exit(1);
        }
    };
    let conn_mgr = ConnectionManager::with_config_path(config, config_path);

    if let Err(e) = execute_command(&cli, &conn_mgr).await {
        e.print_diagnostic();
        std::process::exit(1);
    }

    Ok(())
}

fn init_tracing(verbose: u8) {
    // Check for RUST_LOG env var first, then fall back to verbosity flag
    let filter = if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::EnvFilter::from_default_env()
    } else {
        let level = match verbose {
            0 => "tcctl=warn,tencentcloud_core=warn",
            1 => "tcctl=info,tencentcloud_core=info",
            2 => "tcctl=debug,tencentcloud_core=debug",
            _ => "tcctl=trace,tencentcloud_core=trace",
        };
        tracing_subscriber::EnvFilter::new(level)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false)
                .with_thread_names(false)
                .compact(),
        )
        .init();

    debug!("Tracing initialized with verbosity level: {}", verbose);
}

async fn execute_command(cli: &Cli, conn_mgr: &ConnectionManager) -> Result<(), TcctlError> {
    trace!("Executing command: {:?}", cli.command);
    info!("Command: {}", format_command(&cli.command));

    let start = std::time::Instant::now();
    let result = match &cli.command {
        Commands::Version => {
            debug!("Showing version information");
            match cli.output {
                cli::OutputFormat::Auto => println!("tcctl {}", env!("CARGO_PKG_VERSION")),
                format => output::print_output(
                    serde_json::json!({
                        "version": env!("CARGO_PKG_VERSION"),
                        "name": env!("CARGO_PKG_NAME"),
                    }),
                    format,
                )?,
            }
            Ok(())
        }
        Commands::Profile(profile_cmd) => {
            commands::profile::handle_profile_command(profile_cmd, conn_mgr, cli.output)
        }
        Commands::Resource(resource_cmd) => {
            commands::resource::handle_resource_command(resource_cmd, conn_mgr, cli).await
        }
        Commands::Data(args) => commands::data::handle_data_command(args, conn_mgr, cli).await,
        Commands::Flow(flow_cmd) => commands::flow::handle_flow_command(flow_cmd, conn_mgr, cli).await,
    };

    let duration = start.elapsed();
    match &result {
        Ok(_) => info!("Command completed successfully in {:?}", duration),
        Err(e) => error!("Command failed after {:?}: {}", duration, e),
    }

    result
}

/// Command summary for logs; never includes secrets
fn format_command(command: &Commands) -> String {
    use cli::{FlowCommands, ProfileCommands, ResourceCommands, WaitTarget};

    match command {
        Commands::Version => "version".to_string(),
        Commands::Profile(cmd) => match cmd {
            ProfileCommands::List => "profile list".to_string(),
            ProfileCommands::Path => "profile path".to_string(),
            ProfileCommands::Show { name } => format!("profile show {name}"),
            ProfileCommands::Set(args) => format!("profile set {} [credentials redacted]", args.name),
            ProfileCommands::Remove { name, .. } => format!("profile remove {name}"),
            ProfileCommands::Default { name } => format!("profile default {name}"),
        },
        Commands::Resource(cmd) => match cmd {
            ResourceCommands::Types => "resource types".to_string(),
            ResourceCommands::Create { type_name, .. } => format!("resource create {type_name}"),
            ResourceCommands::Read { type_name, .. } => format!("resource read {type_name}"),
            ResourceCommands::Update { type_name, .. } => format!("resource update {type_name}"),
            ResourceCommands::Delete { type_name, .. } => format!("resource delete {type_name}"),
        },
        Commands::Data(args) => format!("data {}", args.type_name),
        Commands::Flow(FlowCommands::Wait(WaitTarget::Sqlserver { flow_id, .. })) => {
            format!("flow wait sqlserver {flow_id}")
        }
    }
}
