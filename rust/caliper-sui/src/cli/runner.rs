// Runner - executes CLI commands against a configured network

use anyhow::Context;
use std::path::Path;
use tracing::{error, info, warn};

use caliper_sui::connector::{setup, BlockchainConnector, SuiConnector};
use caliper_sui::error::ConnectorError;
use caliper_sui::types::{TransactionRequest, WorkerArguments};
use caliper_sui::SuiConfig;

use super::{InvokeCmd, SetupCmd};

/// Print the addresses derived from the configured seeds
pub fn show_addresses(config: &SuiConfig) -> anyhow::Result<()> {
    let (deployer, funder) = SuiConnector::derive_identities(config)?;
    println!("Deployer: {}", deployer.address());
    println!("Funding:  {}", funder.address());
    Ok(())
}

/// Coordinator phase: gas pool, deployment and worker arguments
pub async fn run_setup(config: SuiConfig, cmd: &SetupCmd) -> anyhow::Result<()> {
    info!("Setting up {} workers against {}", cmd.workers, config.url);

    let mut connector = SuiConnector::new(config)?;
    let output = setup(&mut connector, cmd.workers)
        .await
        .context("setup failed, aborting run")?;

    let args: Vec<WorkerArguments> = (0..cmd.workers)
        .map(|i| output.partition_for_worker(i))
        .collect();
    write_json(&cmd.output, &args)?;

    info!(
        "✅ {} contracts deployed, worker arguments written to {:?}",
        output.registry.len(),
        cmd.output
    );
    Ok(())
}

/// Worker phase: send `count` requests sequentially and print a summary
pub async fn run_invoke(config: SuiConfig, cmd: &InvokeCmd) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(&cmd.workers_file)
        .with_context(|| format!("reading {:?}", cmd.workers_file))?;
    let all: Vec<WorkerArguments> = serde_json::from_str(&content)?;
    let args = all
        .into_iter()
        .find(|a| a.worker_index == cmd.worker)
        .with_context(|| format!("no arguments for worker {}", cmd.worker))?;

    let mut connector = SuiConnector::new(config)?;
    let mut ctx = connector.get_context(cmd.worker, args).await?;

    let request = TransactionRequest {
        contract: cmd.contract.clone(),
        module: cmd.module.clone(),
        function: cmd.function.clone(),
        args: cmd.args.clone(),
        read_only: cmd.read_only,
    };

    let mut succeeded = 0usize;
    let mut failed = 0usize;
    let mut total_latency_ms = 0u64;

    for i in 0..cmd.count {
        match connector.send_request(&mut ctx, &request).await {
            Ok(status) => {
                total_latency_ms += status.latency_ms;
                if status.is_success() {
                    succeeded += 1;
                    info!("[{}] ✅ {}", i, status.transaction_id().unwrap_or_default());
                } else {
                    failed += 1;
                    warn!("[{}] ❌ {}", i, status.error_message().unwrap_or_default());
                }
            }
            Err(e @ ConnectorError::GasExhausted { .. }) => {
                error!("[{}] {}", i, e);
                break;
            }
            Err(e) => return Err(e.into()),
        }
    }

    let sent = succeeded + failed;
    println!("Sent:      {}", sent);
    println!("Succeeded: {}", succeeded);
    println!("Failed:    {}", failed);
    if sent > 0 {
        println!("Avg latency: {} ms", total_latency_ms / sent as u64);
    }
    Ok(())
}

fn write_json<T: serde::Serialize>(path: &Path, value: &T) -> anyhow::Result<()> {
    let content = serde_json::to_string_pretty(value)?;
    std::fs::write(path, content).with_context(|| format!("writing {:?}", path))?;
    Ok(())
}
