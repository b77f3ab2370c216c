// Scripted transport for tests

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use super::transport::RpcTransport;
use crate::error::TransportError;

/// Replays queued bodies per method and records every call
#[derive(Default)]
pub struct MockTransport {
    responses: Mutex<HashMap<String, VecDeque<Result<Value, TransportError>>>>,
    calls: Mutex<Vec<(String, Value)>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a raw body
    pub fn push_body(&self, method: &str, body: Value) {
        self.push(method, Ok(body));
    }

    /// Queue a `{result}` body
    pub fn push_result(&self, method: &str, result: Value) {
        self.push_body(method, json!({"jsonrpc": "2.0", "id": 1, "result": result}));
    }

    /// Queue an `{error}` body
    pub fn push_error(&self, method: &str, code: i64, message: &str) {
        self.push_body(
            method,
            json!({"jsonrpc": "2.0", "id": 1, "error": {"code": code, "message": message}}),
        );
    }

    /// Queue a transport failure
    pub fn push_failure(&self, method: &str, error: TransportError) {
        self.push(method, Err(error));
    }

    fn push(&self, method: &str, response: Result<Value, TransportError>) {
        self.responses
            .lock()
            .unwrap()
            .entry(method.to_string())
            .or_default()
            .push_back(response);
    }

    /// Recorded (method, params) pairs in call order
    pub fn calls(&self) -> Vec<(String, Value)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn methods(&self) -> Vec<String> {
        self.calls().into_iter().map(|(method, _)| method).collect()
    }
}

#[async_trait]
impl RpcTransport for MockTransport {
    async fn call(&self, method: &str, params: Value) -> Result<Value, TransportError> {
        self.calls
            .lock()
            .unwrap()
            .push((method.to_string(), params));

        self.responses
            .lock()
            .unwrap()
            .get_mut(method)
            .and_then(VecDeque::pop_front)
            .unwrap_or_else(|| {
                Err(TransportError::MalformedBody(format!(
                    "no scripted response for {}",
                    method
                )))
            })
    }
}

/// `sui_executeTransaction` result with the given status and created objects
pub fn execution_result(status: &str, digest: &str, created: &[(&str, Value)]) -> Value {
    let created: Vec<Value> = created
        .iter()
        .map(|(id, owner)| json!({"owner": owner, "reference": {"objectId": id, "version": 1}}))
        .collect();

    json!({
        "EffectsCert": {
            "certificate": {"transactionDigest": digest},
            "effects": {
                "transactionEffectsDigest": format!("{}-effects", digest),
                "effects": {
                    "status": {"status": status},
                    "transactionDigest": digest,
                    "created": created,
                }
            },
            "confirmed_local_execution": true
        }
    })
}

/// Base64 transaction bytes as a builder method would return them
pub fn tx_bytes_result() -> Value {
    json!({"txBytes": "AQIDBA==", "gas": null, "inputObjects": []})
}
