//! `tcctl data` command

use crate::cli::{Cli, DataArgs};
use crate::connection::ConnectionManager;
use crate::error::{Result, TcctlError};
use crate::output::print_output;
use crate::state::read_document;
use serde_json::Value;
use tencentcloud_core::resource::lookup_data_source;
use tracing::debug;

pub async fn handle_data_command(
    args: &DataArgs,
    conn_mgr: &ConnectionManager,
    cli: &Cli,
) -> Result<()> {
    let source = lookup_data_source(&args.type_name).ok_or_else(|| TcctlError::UnknownType {
        kind: "data source",
        name: args.type_name.clone(),
    })?;

    let filter = match &args.filter {
        Some(path) => read_document(path)?,
        None => Value::Null,
    };
    debug!(filter = %filter, "Reading {}", args.type_name);

    let provider = conn_mgr.create_provider(cli.profile.as_deref(), cli.no_retry)?;
    let items = source
        .read(&provider, filter, args.result_output_file.as_deref())
        .await?;
    print_output(items, cli.output)
}
