//! `tcctl profile` commands

use crate::cli::{OutputFormat, ProfileCommands, ProfileSetArgs};
use crate::connection::ConnectionManager;
use crate::error::{Result, TcctlError};
use crate::output::print_output;
use serde_json::json;
use std::io::{self, Write};
use tencentcloud_core::config::{Config, CredentialStore, Profile};
use tracing::{debug, trace};

pub fn handle_profile_command(
    profile_cmd: &ProfileCommands,
    conn_mgr: &ConnectionManager,
    output_format: OutputFormat,
) -> Result<()> {
    use ProfileCommands::*;

    match profile_cmd {
        List => handle_list(conn_mgr, output_format),
        Path => handle_path(conn_mgr, output_format),
        Show { name } => handle_show(conn_mgr, name, output_format),
        Set(args) => handle_set(conn_mgr, args),
        Remove { name, yes } => handle_remove(conn_mgr, name, *yes),
        Default { name } => handle_default(conn_mgr, name),
    }
}

/// First characters of a secret, enough to recognise it
fn preview(secret: &str) -> String {
    if CredentialStore::is_keyring_reference(secret) || secret.starts_with("${") {
        return secret.to_string();
    }
    let shown: String = secret.chars().take(8).collect();
    format!("{shown}...")
}

fn describe(conn_mgr: &ConnectionManager, name: &str, profile: &Profile) -> serde_json::Value {
    let mut obj = json!({
        "name": name,
        "is_default": conn_mgr.config.default_profile.as_deref() == Some(name),
        "region": profile.region,
        "secret_id": preview(&profile.secret_id),
        "secret_key_configured": !profile.secret_key.is_empty(),
        "uses_keyring": profile.uses_keyring(),
    });
    if let Some(domain) = &profile.domain {
        obj["domain"] = json!(domain);
    }
    if let Some(endpoint) = &profile.endpoint {
        obj["endpoint"] = json!(endpoint);
    }
    obj
}

fn handle_list(conn_mgr: &ConnectionManager, output_format: OutputFormat) -> Result<()> {
    debug!("Listing all configured profiles");
    let profiles = conn_mgr.config.list_profiles();
    trace!("Found {} profiles", profiles.len());

    if output_format == OutputFormat::Auto {
        if profiles.is_empty() {
            println!("No profiles configured.");
            println!("Use 'tcctl profile set' to create a profile.");
            return Ok(());
        }
        for (name, profile) in profiles {
            let marker = if conn_mgr.config.default_profile.as_deref() == Some(name.as_str()) {
                "*"
            } else {
                " "
            };
            println!("{marker} {name:<20} {}", profile.region);
        }
        return Ok(());
    }

    let list: Vec<_> = profiles
        .iter()
        .map(|(name, profile)| describe(conn_mgr, name, profile))
        .collect();
    print_output(list, output_format)
}

fn config_path(conn_mgr: &ConnectionManager) -> Result<std::path::PathBuf> {
    match &conn_mgr.config_path {
        Some(path) => Ok(path.clone()),
        None => Ok(Config::config_path()?),
    }
}

fn handle_path(conn_mgr: &ConnectionManager, output_format: OutputFormat) -> Result<()> {
    let path = config_path(conn_mgr)?;
    match output_format {
        OutputFormat::Auto => println!("{}", path.display()),
        _ => print_output(json!({ "config_path": path.display().to_string() }), output_format)?,
    }
    Ok(())
}

fn handle_show(conn_mgr: &ConnectionManager, name: &str, output_format: OutputFormat) -> Result<()> {
    let profile = conn_mgr.config.profile(name)?;
    print_output(describe(conn_mgr, name, profile), output_format)
}

fn handle_set(conn_mgr: &ConnectionManager, args: &ProfileSetArgs) -> Result<()> {
    debug!("Setting profile: {}", args.name);

    #[cfg(feature = "secure-storage")]
    let secret_key = if args.use_keyring {
        let stored = CredentialStore::new()
            .store_credential(&format!("{}-secret-key", args.name), &args.secret_key)?;
        println!("Secret key stored securely in OS keyring");
        stored
    } else {
        args.secret_key.clone()
    };
    #[cfg(not(feature = "secure-storage"))]
    let secret_key = args.secret_key.clone();

    let existing = conn_mgr.config.profiles.get(&args.name);
    let profile = Profile {
        security_token: args.security_token.clone(),
        region: args.region.clone(),
        domain: args.domain.clone(),
        endpoint: args.endpoint.clone(),
        // keep non-credential settings of an existing profile
        protocol: existing.and_then(|p| p.protocol.clone()),
        resilience: existing.and_then(|p| p.resilience.clone()),
        ..Profile::new(args.secret_id.clone(), secret_key)
    };

    let mut config = conn_mgr.config.clone();
    config.set_profile(args.name.clone(), profile);
    let first = config.profiles.len() == 1;
    if first && config.default_profile.is_none() {
        config.default_profile = Some(args.name.clone());
    }
    conn_mgr.save_config(&config)?;

    println!("Profile '{}' saved successfully to:", args.name);
    println!("  {}", config_path(conn_mgr)?.display());
    if !first && config.default_profile.as_deref() != Some(args.name.as_str()) {
        println!();
        println!("Tip: make it the default with:");
        println!("  tcctl profile default {}", args.name);
    }
    Ok(())
}

fn confirm(question: &str) -> Result<bool> {
    print!("{question} (y/N): ");
    let read = io::stdout().flush().and_then(|()| {
        let mut input = String::new();
        io::stdin().read_line(&mut input).map(|_| input)
    });
    let input = read.map_err(|e| TcctlError::InvalidInput {
        message: format!("failed to read confirmation: {e}"),
    })?;
    let input = input.trim().to_lowercase();
    Ok(input == "y" || input == "yes")
}

fn handle_remove(conn_mgr: &ConnectionManager, name: &str, yes: bool) -> Result<()> {
    debug!("Removing profile: {}", name);
    let profile = conn_mgr.config.profile(name)?;

    if !yes && !confirm(&format!("Are you sure you want to remove profile '{name}'?"))? {
        println!("Profile removal cancelled.");
        return Ok(());
    }

    let store = CredentialStore::new();
    for secret in [&profile.secret_id, &profile.secret_key] {
        store.delete_credential(secret)?;
    }

    let mut config = conn_mgr.config.clone();
    let was_default = config.default_profile.as_deref() == Some(name);
    config.remove_profile(name);
    conn_mgr.save_config(&config)?;

    println!("Profile '{}' removed successfully.", name);
    if was_default {
        println!("Default profile cleared.");
    }
    Ok(())
}

fn handle_default(conn_mgr: &ConnectionManager, name: &str) -> Result<()> {
    debug!("Setting default profile: {}", name);
    conn_mgr.config.profile(name)?;

    let mut config = conn_mgr.config.clone();
    config.default_profile = Some(name.to_string());
    conn_mgr.save_config(&config)?;

    println!("Default profile set to '{}'.", name);
    Ok(())
}
