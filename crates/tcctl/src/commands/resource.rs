//! `tcctl resource` commands

use crate::cli::{Cli, OutputFormat, ResourceCommands};
use crate::connection::ConnectionManager;
use crate::error::{Result, TcctlError};
use crate::output::print_output;
use crate::progress::{spinner, spinner_callback};
use crate::state::{read_document, read_state, remove_state, write_state};
use colored::Colorize;
use indicatif::ProgressBar;
use serde_json::json;
use std::path::Path;
use tencentcloud_core::Provider;
use tencentcloud_core::resource::{
    DynResource, data_source_types, lookup_resource, resource_types,
};
use tracing::{debug, info, warn};

pub async fn handle_resource_command(
    cmd: &ResourceCommands,
    conn_mgr: &ConnectionManager,
    cli: &Cli,
) -> Result<()> {
    match cmd {
        ResourceCommands::Types => handle_types(cli.output),
        ResourceCommands::Create {
            type_name,
            config,
            state,
        } => handle_create(conn_mgr, cli, type_name, config, state.as_deref()).await,
        ResourceCommands::Read { type_name, state } => {
            handle_read(conn_mgr, cli, type_name, state).await
        }
        ResourceCommands::Update {
            type_name,
            config,
            state,
        } => handle_update(conn_mgr, cli, type_name, config, state).await,
        ResourceCommands::Delete { type_name, state } => {
            handle_delete(conn_mgr, cli, type_name, state).await
        }
    }
}

fn resolve_type(type_name: &str) -> Result<Box<dyn DynResource>> {
    lookup_resource(type_name).ok_or_else(|| TcctlError::UnknownType {
        kind: "resource",
        name: type_name.to_string(),
    })
}

/// Provider whose async waits drive a spinner
fn provider_with_spinner(
    conn_mgr: &ConnectionManager,
    cli: &Cli,
    message: &str,
) -> Result<(Provider, ProgressBar)> {
    let provider = conn_mgr.create_provider(cli.profile.as_deref(), cli.no_retry)?;
    let pb = spinner(message);
    Ok((provider.with_progress(spinner_callback(pb.clone())), pb))
}

fn handle_types(output_format: OutputFormat) -> Result<()> {
    let resources = resource_types();
    let data_sources = data_source_types();

    if output_format == OutputFormat::Auto {
        println!("{}", "Resources:".bold());
        for name in &resources {
            println!("  {name}");
        }
        println!("{}", "Data sources:".bold());
        for name in &data_sources {
            println!("  {name}");
        }
        return Ok(());
    }
    print_output(
        json!({ "resources": resources, "data_sources": data_sources }),
        output_format,
    )
}

async fn handle_create(
    conn_mgr: &ConnectionManager,
    cli: &Cli,
    type_name: &str,
    config_path: &Path,
    state_path: Option<&Path>,
) -> Result<()> {
    let resource = resolve_type(type_name)?;
    let config = read_document(config_path)?;
    let (provider, pb) = provider_with_spinner(conn_mgr, cli, &format!("Creating {type_name}"))?;

    let result = resource.create(&provider, config).await;
    pb.finish_and_clear();
    let data = result?;
    info!(id = %data.id, "Created {}", type_name);

    if let Some(path) = state_path {
        write_state(path, &data)?;
        debug!("State written to {}", path.display());
    }
    print_output(&data, cli.output)
}

async fn handle_read(
    conn_mgr: &ConnectionManager,
    cli: &Cli,
    type_name: &str,
    state_path: &Path,
) -> Result<()> {
    let resource = resolve_type(type_name)?;
    let data = read_state(state_path)?;
    let id = data.id.clone();
    let provider = conn_mgr.create_provider(cli.profile.as_deref(), cli.no_retry)?;

    match resource.refresh(&provider, data).await? {
        Some(data) => {
            write_state(state_path, &data)?;
            print_output(&data, cli.output)
        }
        None => {
            warn!("{} {} no longer exists", type_name, id);
            remove_state(state_path)?;
            eprintln!(
                "{} {type_name} {id} no longer exists; removed {}",
                "warning:".yellow().bold(),
                state_path.display()
            );
            Ok(())
        }
    }
}

async fn handle_update(
    conn_mgr: &ConnectionManager,
    cli: &Cli,
    type_name: &str,
    config_path: &Path,
    state_path: &Path,
) -> Result<()> {
    let resource = resolve_type(type_name)?;
    let data = read_state(state_path)?;
    let planned = read_document(config_path)?;
    let (provider, pb) = provider_with_spinner(conn_mgr, cli, &format!("Updating {type_name}"))?;

    let result = resource.update(&provider, data, planned).await;
    pb.finish_and_clear();
    let data = result?;

    write_state(state_path, &data)?;
    print_output(&data, cli.output)
}

async fn handle_delete(
    conn_mgr: &ConnectionManager,
    cli: &Cli,
    type_name: &str,
    state_path: &Path,
) -> Result<()> {
    let resource = resolve_type(type_name)?;
    let data = read_state(state_path)?;
    let id = data.id.clone();
    let (provider, pb) = provider_with_spinner(conn_mgr, cli, &format!("Deleting {type_name}"))?;

    let result = resource.delete(&provider, data).await;
    pb.finish_and_clear();
    result?;

    remove_state(state_path)?;
    match cli.output {
        OutputFormat::Auto => println!("{type_name} {id} deleted"),
        format => print_output(json!({ "id": id, "deleted": true }), format)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_type() {
        let err = resolve_type("tencentcloud_cos_bucket").err().unwrap();
        assert!(matches!(
            err,
            TcctlError::UnknownType {
                kind: "resource",
                ..
            }
        ));
    }

    #[test]
    fn test_known_types_resolve() {
        for name in resource_types() {
            assert_eq!(resolve_type(name).unwrap().type_name(), name);
        }
    }
}
