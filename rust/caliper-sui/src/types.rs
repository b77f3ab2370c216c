// Types shared between the setup phase and the workers

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, VecDeque};

use crate::error::{ConnectorError, Result};
use crate::rpc::ObjectId;

// =============================================================================
// CONTRACT REGISTRY
// =============================================================================

/// A published package and the objects its initializers created
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeployedContract {
    pub package_id: ObjectId,
    /// Created objects other than the package, in creation order
    pub initialized_objects: Vec<ObjectId>,
}

/// Logical contract name -> deployed identifiers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContractRegistry {
    contracts: BTreeMap<String, DeployedContract>,
}

impl ContractRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, contract: DeployedContract) {
        self.contracts.insert(name.into(), contract);
    }

    pub fn get(&self, name: &str) -> Option<&DeployedContract> {
        self.contracts.get(name)
    }

    /// Package id for a logical contract name
    pub fn package_id(&self, name: &str) -> Result<&str> {
        self.get(name)
            .map(|contract| contract.package_id.as_str())
            .ok_or_else(|| ConnectorError::UnknownContract(name.to_string()))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.contracts.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.contracts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }
}

// =============================================================================
// REQUESTS
// =============================================================================

/// Move call argument
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Argument {
    /// Passed to the node unchanged
    Literal(serde_json::Value),
    /// Index into the contract's `initialized_objects`
    ObjectRef(usize),
}

impl Argument {
    /// Substitute object references with their object id
    pub fn resolve(&self, contract_name: &str, contract: &DeployedContract) -> Result<serde_json::Value> {
        match self {
            Argument::Literal(value) => Ok(value.clone()),
            Argument::ObjectRef(index) => contract
                .initialized_objects
                .get(*index)
                .map(|id| serde_json::Value::String(id.clone()))
                .ok_or_else(|| ConnectorError::ObjectIndexOutOfRange {
                    contract: contract_name.to_string(),
                    index: *index,
                    len: contract.initialized_objects.len(),
                }),
        }
    }
}

/// One benchmark request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRequest {
    /// Logical contract name from the configuration
    pub contract: String,
    pub module: String,
    pub function: String,
    #[serde(default)]
    pub args: Vec<Argument>,
    #[serde(default)]
    pub read_only: bool,
}

impl TransactionRequest {
    pub fn new(contract: &str, module: &str, function: &str, args: Vec<Argument>) -> Self {
        Self {
            contract: contract.to_string(),
            module: module.to_string(),
            function: function.to_string(),
            args,
            read_only: false,
        }
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }
}

// =============================================================================
// RESULTS
// =============================================================================

/// Terminal outcome of one request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TxOutcome {
    Succeeded { transaction_id: String },
    Failed { error_message: String },
}

/// Result reported to the harness for every request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionStatus {
    #[serde(flatten)]
    pub outcome: TxOutcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_result: Option<serde_json::Value>,
    pub submitted_at: DateTime<Utc>,
    pub latency_ms: u64,
}

impl TransactionStatus {
    pub fn succeeded(
        transaction_id: String,
        raw_result: Option<serde_json::Value>,
        submitted_at: DateTime<Utc>,
    ) -> Self {
        Self::finish(TxOutcome::Succeeded { transaction_id }, raw_result, submitted_at)
    }

    pub fn failed(
        error_message: String,
        raw_result: Option<serde_json::Value>,
        submitted_at: DateTime<Utc>,
    ) -> Self {
        Self::finish(TxOutcome::Failed { error_message }, raw_result, submitted_at)
    }

    fn finish(
        outcome: TxOutcome,
        raw_result: Option<serde_json::Value>,
        submitted_at: DateTime<Utc>,
    ) -> Self {
        let latency_ms = (Utc::now() - submitted_at).num_milliseconds().max(0) as u64;
        Self {
            outcome,
            raw_result,
            submitted_at,
            latency_ms,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, TxOutcome::Succeeded { .. })
    }

    pub fn transaction_id(&self) -> Option<&str> {
        match &self.outcome {
            TxOutcome::Succeeded { transaction_id } => Some(transaction_id),
            TxOutcome::Failed { .. } => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.outcome {
            TxOutcome::Succeeded { .. } => None,
            TxOutcome::Failed { error_message } => Some(error_message),
        }
    }
}

// =============================================================================
// WORKERS
// =============================================================================

/// Everything a worker process receives from the coordinating process
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerArguments {
    pub worker_index: usize,
    pub contracts: ContractRegistry,
    pub gas_coins: Vec<ObjectId>,
}

/// Per-worker runtime state
#[derive(Debug)]
pub struct WorkerContext {
    pub worker_index: usize,
    pub contracts: ContractRegistry,
    gas_pool: VecDeque<ObjectId>,
}

impl WorkerContext {
    pub fn new(args: WorkerArguments) -> Self {
        Self {
            worker_index: args.worker_index,
            contracts: args.contracts,
            gas_pool: args.gas_coins.into(),
        }
    }

    /// Take the next unused gas coin. Spent coins are never returned.
    pub fn pop_gas_coin(&mut self) -> Result<ObjectId> {
        self.gas_pool
            .pop_front()
            .ok_or(ConnectorError::GasExhausted {
                worker: self.worker_index,
            })
    }

    pub fn remaining_gas_coins(&self) -> usize {
        self.gas_pool.len()
    }
}
