//! Sui connector for load-testing harnesses
//!
//! Publishes benchmark contracts, splits a pool of gas coins between
//! workers and drives signed move calls over JSON-RPC.
//!
//! ## Architecture
//!
//! ```text
//! coordinator   KeyMaterial -> GasCoinAllocator -> ContractDeployer
//!                                    |                    |
//!                          gas partitions          ContractRegistry
//!                                    \                    /
//!                                     WorkerArguments (JSON)
//!                                              |
//! worker i      WorkerContext -> TransactionExecutor -> TransactionStatus
//! ```

pub mod config;
pub mod connector;
pub mod deploy;
pub mod error;
pub mod executor;
pub mod gas;
pub mod keys;
pub mod rpc;
pub mod types;

#[cfg(test)]
mod tests;

pub use config::SuiConfig;
pub use connector::{init_once, BlockchainConnector, SetupOutput, SuiConnector};
pub use error::{ConnectorError, TransportError};
pub use types::{
    Argument, ContractRegistry, TransactionRequest, TransactionStatus, TxOutcome, WorkerArguments,
    WorkerContext,
};
