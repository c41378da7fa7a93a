//! `tcctl flow` commands

use crate::cli::{Cli, FlowCommands, OutputFormat, WaitTarget};
use crate::connection::ConnectionManager;
use crate::error::Result;
use crate::output::print_output;
use crate::progress::{spinner, spinner_callback};
use serde_json::json;
use std::time::Duration;

pub async fn handle_flow_command(
    cmd: &FlowCommands,
    conn_mgr: &ConnectionManager,
    cli: &Cli,
) -> Result<()> {
    match cmd {
        FlowCommands::Wait(WaitTarget::Sqlserver { flow_id, timeout }) => {
            wait_sqlserver(conn_mgr, cli, *flow_id, *timeout).await
        }
    }
}

async fn wait_sqlserver(
    conn_mgr: &ConnectionManager,
    cli: &Cli,
    flow_id: i64,
    timeout: Option<u64>,
) -> Result<()> {
    let pb = spinner(&format!("Waiting for SQL Server flow {flow_id}"));
    let provider = conn_mgr
        .create_provider(cli.profile.as_deref(), cli.no_retry)?
        .with_progress(spinner_callback(pb.clone()));
    let timeout = timeout
        .map(Duration::from_secs)
        .unwrap_or_else(|| provider.timeouts().long_flow());

    let svc = &provider.sqlserver();
    let result = provider
        .wait_for(flow_id, timeout, |_| svc.flow_status(flow_id))
        .await;
    pb.finish_and_clear();
    let report = result?;

    match cli.output {
        OutputFormat::Auto => println!(
            "Flow {flow_id} succeeded after {} queries ({}s)",
            report.queries,
            report.elapsed.as_secs()
        ),
        format => print_output(
            json!({
                "flow_id": flow_id,
                "status": "success",
                "queries": report.queries,
                "elapsed_secs": report.elapsed.as_secs(),
            }),
            format,
        )?,
    }
    Ok(())
}
