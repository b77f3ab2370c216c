// Types RPC - Sui JSON-RPC payloads and a typed decode of execution effects
use serde::{Deserialize, Serialize};

use crate::error::{ConnectorError, Result};

/// On-chain object identifier (`0x`-prefixed hex)
pub type ObjectId = String;

/// Execution request type that blocks until the effects are applied locally
pub const WAIT_FOR_LOCAL_EXECUTION: &str = "WaitForLocalExecution";

/// Native fee coin type
pub const SUI_COIN_TYPE: &str = "0x2::sui::SUI";

/// JSON-RPC 2.0 Error
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    /// Error code
    pub code: i64,
    /// Error message
    pub message: String,
    /// Optional additional data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

/// Page of owned coins from `sui_getCoins`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoinPage {
    pub data: Vec<Coin>,
    #[serde(default)]
    pub next_cursor: Option<String>,
}

/// Owned coin summary
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coin {
    #[serde(default)]
    pub coin_type: String,
    pub coin_object_id: ObjectId,
    pub balance: u64,
}

/// Unsigned transaction returned by the transaction builder methods
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionBytes {
    pub tx_bytes: String,
}

/// Ownership of an object after execution
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Owner {
    AddressOwner(String),
    ObjectOwner(String),
    Shared(serde_json::Value),
    Immutable,
}

/// Reference to an object version
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectRef {
    pub object_id: ObjectId,
    #[serde(default)]
    pub version: Option<u64>,
    #[serde(default)]
    pub digest: Option<String>,
}

/// Object reference together with its owner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnedObjectRef {
    pub owner: Owner,
    pub reference: ObjectRef,
}

/// Execution status of a transaction
#[derive(Debug, Clone, Deserialize)]
pub struct ExecutionStatus {
    pub status: String,
    #[serde(default)]
    pub error: Option<String>,
}

impl ExecutionStatus {
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

/// Transaction effects, restricted to the fields the connector reads
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionEffects {
    pub status: ExecutionStatus,
    pub transaction_digest: String,
    #[serde(default)]
    pub created: Vec<OwnedObjectRef>,
}

impl TransactionEffects {
    /// Created object ids in creation order
    pub fn created_ids(&self) -> Vec<ObjectId> {
        self.created
            .iter()
            .map(|obj| obj.reference.object_id.clone())
            .collect()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertifiedEffects {
    pub effects: TransactionEffects,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertifiedTransaction {
    #[serde(default)]
    pub transaction_digest: Option<String>,
}

/// Response of `sui_executeTransaction`
#[derive(Debug, Clone, Deserialize)]
pub enum ExecuteTransactionResponse {
    ImmediateReturn {
        #[serde(alias = "txDigest")]
        tx_digest: String,
    },
    TxCert {
        certificate: CertifiedTransaction,
    },
    EffectsCert {
        certificate: CertifiedTransaction,
        effects: CertifiedEffects,
    },
}

impl ExecuteTransactionResponse {
    /// Decode a raw `result` value, failing fast when the effects are absent
    pub fn effects_from_value(value: &serde_json::Value) -> Result<TransactionEffects> {
        let response: Self = serde_json::from_value(value.clone())
            .map_err(|e| ConnectorError::MalformedExecutionResponse(e.to_string()))?;
        response.into_effects()
    }

    pub fn into_effects(self) -> Result<TransactionEffects> {
        match self {
            ExecuteTransactionResponse::EffectsCert { effects, .. } => Ok(effects.effects),
            ExecuteTransactionResponse::ImmediateReturn { tx_digest } => {
                Err(ConnectorError::MalformedExecutionResponse(format!(
                    "no effects for {} (returned before execution)",
                    tx_digest
                )))
            }
            ExecuteTransactionResponse::TxCert { certificate } => {
                Err(ConnectorError::MalformedExecutionResponse(format!(
                    "no effects for {} (certificate only)",
                    certificate.transaction_digest.unwrap_or_default()
                )))
            }
        }
    }
}

/// Response of `sui_devInspectMoveCall`
#[derive(Debug, Clone, Deserialize)]
pub struct DevInspectResults {
    pub effects: TransactionEffects,
    #[serde(default)]
    pub results: serde_json::Value,
}
