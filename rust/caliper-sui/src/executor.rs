//! Move-call execution
//!
//! Drives one request through `Built -> Signed -> Submitted -> {Succeeded | Failed}`
//! and reports a [`TransactionStatus`]. Per-request problems never escape as
//! errors; only an exhausted gas pool does, since the worker cannot make
//! progress without coins.

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::{ConnectorError, Result};
use crate::keys::KeyMaterial;
use crate::rpc::types::{ExecuteTransactionResponse, TransactionEffects};
use crate::rpc::{MoveCall, SuiClient};
use crate::types::{TransactionRequest, TransactionStatus, WorkerContext};

/// Executes benchmark requests for one worker
pub struct TransactionExecutor {
    client: SuiClient,
    signer: Arc<KeyMaterial>,
    gas_budget: u64,
}

impl TransactionExecutor {
    pub fn new(client: SuiClient, signer: Arc<KeyMaterial>, gas_budget: u64) -> Self {
        Self {
            client,
            signer,
            gas_budget,
        }
    }

    /// Execute one request.
    ///
    /// Returns `Err(GasExhausted)` when the worker has no coin left for a
    /// state-changing request; every other failure is a failed status.
    pub async fn execute(
        &self,
        request: &TransactionRequest,
        ctx: &mut WorkerContext,
    ) -> Result<TransactionStatus> {
        let submitted_at = Utc::now();

        let result = match resolve(request, ctx) {
            Ok((package_id, arguments)) if request.read_only => {
                self.query(request, &package_id, arguments).await
            }
            Ok((package_id, arguments)) => {
                // the coin is consumed even if anything below fails
                let gas = ctx.pop_gas_coin()?;
                self.submit(request, &package_id, arguments, &gas).await
            }
            Err(e) => Err(e),
        };

        Ok(match result {
            Ok((raw, effects)) => classify(raw, effects, submitted_at),
            Err(e) => {
                warn!(
                    worker = ctx.worker_index,
                    contract = %request.contract,
                    function = %request.function,
                    "request failed: {}",
                    e
                );
                TransactionStatus::failed(e.status_message(), None, submitted_at)
            }
        })
    }

    /// Build, sign and submit a move call paid with `gas`
    async fn submit(
        &self,
        request: &TransactionRequest,
        package_id: &str,
        arguments: Vec<Value>,
        gas: &str,
    ) -> Result<(Value, TransactionEffects)> {
        let call = MoveCall {
            signer: self.signer.address(),
            package_object_id: package_id,
            module: &request.module,
            function: &request.function,
            arguments,
            gas: Some(gas),
            gas_budget: self.gas_budget,
        };

        let tx = self.client.move_call(&call).await?;
        let signed = self.signer.sign_transaction(&tx.tx_bytes)?;
        debug!(gas, "submitting {}::{}", request.module, request.function);

        let raw = self.client.execute_transaction(&signed).await?;
        let effects = ExecuteTransactionResponse::effects_from_value(&raw)?;
        Ok((raw, effects))
    }

    /// Read path: dev-inspect the call, no signature and no gas coin
    async fn query(
        &self,
        request: &TransactionRequest,
        package_id: &str,
        arguments: Vec<Value>,
    ) -> Result<(Value, TransactionEffects)> {
        let call = MoveCall {
            signer: self.signer.address(),
            package_object_id: package_id,
            module: &request.module,
            function: &request.function,
            arguments,
            gas: None,
            gas_budget: self.gas_budget,
        };

        let (raw, results) = self.client.dev_inspect_move_call(&call).await?;
        Ok((raw, results.effects))
    }
}

/// Package id and resolved arguments for a request
fn resolve(request: &TransactionRequest, ctx: &WorkerContext) -> Result<(String, Vec<Value>)> {
    let contract = ctx
        .contracts
        .get(&request.contract)
        .ok_or_else(|| ConnectorError::UnknownContract(request.contract.clone()))?;

    let arguments = request
        .args
        .iter()
        .map(|arg| arg.resolve(&request.contract, contract))
        .collect::<Result<Vec<_>>>()?;

    Ok((contract.package_id.clone(), arguments))
}

fn classify(raw: Value, effects: TransactionEffects, submitted_at: DateTime<Utc>) -> TransactionStatus {
    if effects.status.is_success() {
        TransactionStatus::succeeded(effects.transaction_digest, Some(raw), submitted_at)
    } else {
        TransactionStatus::failed(effects.status.status, Some(raw), submitted_at)
    }
}
