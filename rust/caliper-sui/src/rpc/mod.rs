// RPC - JSON-RPC transport and typed Sui methods

pub mod client;
pub mod transport;
pub mod types;

#[cfg(test)]
pub(crate) mod mock;

pub use client::{MoveCall, SuiClient};
pub use transport::{HttpTransport, RpcTransport};
pub use types::ObjectId;
