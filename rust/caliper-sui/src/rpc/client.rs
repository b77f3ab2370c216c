// Typed Sui RPC methods on top of a transport

use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::debug;

use super::transport::RpcTransport;
use super::types::{
    CoinPage, DevInspectResults, JsonRpcError, ObjectId, TransactionBytes,
    WAIT_FOR_LOCAL_EXECUTION,
};
use crate::error::{ConnectorError, Result};
use crate::keys::SignedTransaction;

/// Move call to be built by the node
#[derive(Debug, Clone)]
pub struct MoveCall<'a> {
    pub signer: &'a str,
    pub package_object_id: &'a str,
    pub module: &'a str,
    pub function: &'a str,
    pub arguments: Vec<Value>,
    pub gas: Option<&'a str>,
    pub gas_budget: u64,
}

/// Sui RPC client
#[derive(Clone)]
pub struct SuiClient {
    transport: Arc<dyn RpcTransport>,
}

impl SuiClient {
    pub fn new(transport: Arc<dyn RpcTransport>) -> Self {
        Self { transport }
    }

    /// Call a method and return its `result`, surfacing `{error}` bodies as `Rpc`
    pub async fn call_raw(&self, method: &'static str, params: Value) -> Result<Value> {
        debug!(method, "calling node");
        let mut body = self.transport.call(method, params).await?;

        if let Some(error) = body.get("error").filter(|e| !e.is_null()) {
            let error: JsonRpcError =
                serde_json::from_value(error.clone()).map_err(|e| ConnectorError::MalformedResponse {
                    method,
                    reason: format!("unreadable error object: {}", e),
                })?;
            return Err(ConnectorError::Rpc {
                code: error.code,
                message: error.message,
            });
        }

        match body.get_mut("result").map(Value::take) {
            Some(result) if !result.is_null() => Ok(result),
            _ => Err(ConnectorError::MalformedResponse {
                method,
                reason: "response carries neither result nor error".to_string(),
            }),
        }
    }

    /// Make a call and decode its result
    async fn call<T: DeserializeOwned>(&self, method: &'static str, params: Value) -> Result<T> {
        let result = self.call_raw(method, params).await?;
        serde_json::from_value(result).map_err(|e| ConnectorError::MalformedResponse {
            method,
            reason: e.to_string(),
        })
    }

    /// Coins of `coin_type` owned by `owner`
    pub async fn get_coins(&self, owner: &str, coin_type: &str) -> Result<CoinPage> {
        self.call(
            "sui_getCoins",
            json!({ "owner": owner, "coin_type": coin_type }),
        )
        .await
    }

    /// Build a self or third-party SUI transfer out of `sui_object_id`
    pub async fn transfer_sui(
        &self,
        signer: &str,
        sui_object_id: &str,
        gas_budget: u64,
        recipient: &str,
        amount: u64,
    ) -> Result<TransactionBytes> {
        self.call(
            "sui_transferSui",
            json!({
                "signer": signer,
                "sui_object_id": sui_object_id,
                "gas_budget": gas_budget,
                "recipient": recipient,
                "amount": amount,
            }),
        )
        .await
    }

    /// Build a split of `coin_object_id` into `split_amounts`, paid by `gas`
    pub async fn split_coin(
        &self,
        signer: &str,
        coin_object_id: &str,
        split_amounts: &[u64],
        gas_budget: u64,
        gas: &str,
    ) -> Result<TransactionBytes> {
        self.call(
            "sui_splitCoin",
            json!({
                "signer": signer,
                "coin_object_id": coin_object_id,
                "split_amounts": split_amounts,
                "gas_budget": gas_budget,
                "gas": gas,
            }),
        )
        .await
    }

    /// Build a publish of base64 encoded compiled modules
    pub async fn publish(
        &self,
        sender: &str,
        compiled_modules: &[String],
        gas: Option<&ObjectId>,
        gas_budget: u64,
    ) -> Result<TransactionBytes> {
        self.call(
            "sui_publish",
            json!([sender, compiled_modules, gas, gas_budget]),
        )
        .await
    }

    /// Build a move call
    pub async fn move_call(&self, call: &MoveCall<'_>) -> Result<TransactionBytes> {
        self.call(
            "sui_moveCall",
            json!({
                "signer": call.signer,
                "packageObjectId": call.package_object_id,
                "module": call.module,
                "function": call.function,
                "typeArguments": [],
                "arguments": call.arguments,
                "gas": call.gas,
                "gasBudget": call.gas_budget,
            }),
        )
        .await
    }

    /// Submit a signed transaction and wait for local execution.
    /// Returns the raw `result` so callers can keep it for reporting.
    pub async fn execute_transaction(&self, signed: &SignedTransaction) -> Result<Value> {
        self.call_raw(
            "sui_executeTransaction",
            json!({
                "tx_bytes": signed.tx_bytes,
                "sig_scheme": signed.scheme.as_str(),
                "signature": signed.signature,
                "pub_key": signed.pub_key,
                "request_type": WAIT_FOR_LOCAL_EXECUTION,
            }),
        )
        .await
    }

    /// Run a move call without signing or gas
    pub async fn dev_inspect_move_call(
        &self,
        call: &MoveCall<'_>,
    ) -> Result<(Value, DevInspectResults)> {
        let raw = self
            .call_raw(
                "sui_devInspectMoveCall",
                json!([
                    call.signer,
                    call.package_object_id,
                    call.module,
                    call.function,
                    [],
                    call.arguments,
                ]),
            )
            .await?;

        let results = serde_json::from_value(raw.clone()).map_err(|e| {
            ConnectorError::MalformedExecutionResponse(format!("dev inspect: {}", e))
        })?;
        Ok((raw, results))
    }
}
