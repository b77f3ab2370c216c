// Error types for the connector
// Setup errors abort the run, per-request errors become a failed TransactionStatus

use std::path::PathBuf;

/// Failures below the JSON-RPC layer: the request never produced a usable body
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Network error: {0}")]
    Connection(#[from] reqwest::Error),

    #[error("HTTP error: {0}")]
    Status(u16),

    #[error("Malformed response body: {0}")]
    MalformedBody(String),
}

/// Connector errors
#[derive(Debug, thiserror::Error)]
pub enum ConnectorError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Well-formed `{error}` envelope returned by the node
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    #[error("Invalid key material: {0}")]
    InvalidKeyMaterial(String),

    #[error("No funding coin for {owner} covering {needed}")]
    NoFundingCoin { owner: String, needed: u64 },

    #[error("Gas exhausted for worker {worker}")]
    GasExhausted { worker: usize },

    #[error("Deployment of {contract} failed with status {status}")]
    DeploymentFailed { contract: String, status: String },

    #[error("{stage} transaction failed with status {status}")]
    ExecutionFailed { stage: &'static str, status: String },

    #[error("Malformed publish response: {0}")]
    MalformedPublishResponse(String),

    #[error("Malformed execution response: {0}")]
    MalformedExecutionResponse(String),

    #[error("Malformed {method} response: {reason}")]
    MalformedResponse { method: &'static str, reason: String },

    #[error("Unknown contract: {0}")]
    UnknownContract(String),

    #[error("Object index {index} out of range for {contract} ({len} initialized objects)")]
    ObjectIndexOutOfRange {
        contract: String,
        index: usize,
        len: usize,
    },

    #[error("Connector not initialized: {0}")]
    NotInitialized(&'static str),

    #[error("Contracts already deployed for this run")]
    AlreadyDeployed,

    #[error("Failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ConnectorError {
    /// Message reported in a failed TransactionStatus
    pub fn status_message(&self) -> String {
        match self {
            ConnectorError::Rpc { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ConnectorError>;
