//! Contract deployment
//!
//! Publishes every configured contract with the deployer identity and records
//! the package id plus any objects created by the module initializers.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::config::{ContractConfig, SuiConfig};
use crate::error::{ConnectorError, Result};
use crate::keys::KeyMaterial;
use crate::rpc::types::{ExecuteTransactionResponse, Owner, TransactionEffects};
use crate::rpc::SuiClient;
use crate::types::{ContractRegistry, DeployedContract};

/// Extension of compiled Move modules inside a package build directory
const MODULE_EXTENSION: &str = "mv";

pub struct ContractDeployer<'a> {
    client: &'a SuiClient,
    deployer: &'a KeyMaterial,
    config: &'a SuiConfig,
}

impl<'a> ContractDeployer<'a> {
    pub fn new(client: &'a SuiClient, deployer: &'a KeyMaterial, config: &'a SuiConfig) -> Self {
        Self {
            client,
            deployer,
            config,
        }
    }

    /// Publish all contracts in configured order
    pub async fn deploy_all(&self) -> Result<ContractRegistry> {
        info!("📦 Creating contracts...");

        let mut registry = ContractRegistry::new();
        for contract in &self.config.contracts {
            let deployed = self.deploy(contract).await?;
            info!(
                "📦 Deployed {} at {} ({} initialized objects)",
                contract.name,
                deployed.package_id,
                deployed.initialized_objects.len()
            );
            registry.insert(contract.name.clone(), deployed);
        }

        Ok(registry)
    }

    /// Publish one contract
    pub async fn deploy(&self, contract: &ContractConfig) -> Result<DeployedContract> {
        let path = self.config.resolve_path(&contract.path);
        let modules = read_modules(&path)?;
        debug!(contract = %contract.name, modules = modules.len(), "publishing");

        let tx = self
            .client
            .publish(
                self.deployer.address(),
                &modules,
                None,
                self.config.publish_gas_budget,
            )
            .await
            .map_err(|e| match e {
                ConnectorError::MalformedResponse { reason, .. } => {
                    ConnectorError::MalformedPublishResponse(reason)
                }
                other => other,
            })?;

        let signed = self.deployer.sign_transaction(&tx.tx_bytes)?;
        let raw = self.client.execute_transaction(&signed).await?;
        let effects = ExecuteTransactionResponse::effects_from_value(&raw).map_err(|e| match e {
            ConnectorError::MalformedExecutionResponse(reason) => {
                ConnectorError::MalformedPublishResponse(reason)
            }
            other => other,
        })?;

        if !effects.status.is_success() {
            return Err(ConnectorError::DeploymentFailed {
                contract: contract.name.clone(),
                status: effects.status.status,
            });
        }

        classify_created(&contract.name, &effects)
    }
}

/// Immutable created object -> package, everything else -> initialized objects
pub fn classify_created(name: &str, effects: &TransactionEffects) -> Result<DeployedContract> {
    let mut package_id = None;
    let mut initialized_objects = Vec::new();

    for created in &effects.created {
        match created.owner {
            Owner::Immutable if package_id.is_none() => {
                package_id = Some(created.reference.object_id.clone())
            }
            _ => initialized_objects.push(created.reference.object_id.clone()),
        }
    }

    let package_id = package_id.ok_or_else(|| {
        ConnectorError::MalformedPublishResponse(format!(
            "no immutable package object created for {}",
            name
        ))
    })?;

    Ok(DeployedContract {
        package_id,
        initialized_objects,
    })
}

/// Read compiled modules and base64 encode them.
/// A directory contributes every `.mv` file in it, sorted by file name.
pub fn read_modules(path: &Path) -> Result<Vec<String>> {
    let files: Vec<PathBuf> = if path.is_dir() {
        let mut files = Vec::new();
        for entry in std::fs::read_dir(path).map_err(io_error(path))? {
            let entry_path = entry.map_err(io_error(path))?.path();
            if entry_path.extension().and_then(|e| e.to_str()) == Some(MODULE_EXTENSION) {
                files.push(entry_path);
            }
        }
        files.sort();
        files
    } else {
        vec![path.to_path_buf()]
    };

    if files.is_empty() {
        return Err(ConnectorError::Io {
            path: path.to_path_buf(),
            source: std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "no compiled modules in directory",
            ),
        });
    }

    files
        .iter()
        .map(|file| {
            std::fs::read(file)
                .map(|bytes| STANDARD.encode(bytes))
                .map_err(io_error(file))
        })
        .collect()
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> ConnectorError {
    let path = path.to_path_buf();
    move |source| ConnectorError::Io { path, source }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rpc::mock::{execution_result, tx_bytes_result, MockTransport};
    use serde_json::json;
    use std::sync::Arc;

    fn config_with(dir: &Path, names: &[&str]) -> SuiConfig {
        let contracts = names
            .iter()
            .map(|name| {
                std::fs::write(dir.join(format!("{}.mv", name)), name.as_bytes()).unwrap();
                ContractConfig {
                    name: name.to_string(),
                    path: PathBuf::from(format!("{}.mv", name)),
                }
            })
            .collect();

        SuiConfig {
            workspace_root: dir.to_path_buf(),
            funding_seed: "00".repeat(32),
            publish_gas_budget: 5_000,
            contracts,
            ..SuiConfig::default()
        }
    }

    #[test]
    fn test_read_modules_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.mv"), b"bbb").unwrap();
        std::fs::write(dir.path().join("a.mv"), b"aaa").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"skip").unwrap();

        let modules = read_modules(dir.path()).unwrap();
        assert_eq!(modules, vec![STANDARD.encode(b"aaa"), STANDARD.encode(b"bbb")]);
    }

    #[test]
    fn test_read_modules_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = read_modules(&dir.path().join("absent.mv"));
        assert!(matches!(result, Err(ConnectorError::Io { .. })));

        let empty = tempfile::tempdir().unwrap();
        assert!(matches!(read_modules(empty.path()), Err(ConnectorError::Io { .. })));
    }

    #[tokio::test]
    async fn test_deploys_in_order_and_classifies_objects() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_with(dir.path(), &["A", "B"]);
        let deployer = KeyMaterial::from_seed([2u8; 32]);
        let owner = json!({"AddressOwner": deployer.address()});

        let mock = Arc::new(MockTransport::new());
        mock.push_result("sui_publish", tx_bytes_result());
        mock.push_result(
            "sui_executeTransaction",
            execution_result(
                "success",
                "PA",
                &[
                    ("0xa_obj1", owner.clone()),
                    ("0xa_pkg", json!("Immutable")),
                    ("0xa_obj2", json!({"Shared": {"initial_shared_version": 1}})),
                ],
            ),
        );
        mock.push_result("sui_publish", tx_bytes_result());
        mock.push_result(
            "sui_executeTransaction",
            execution_result(
                "success",
                "PB",
                &[
                    ("0xb_pkg", json!("Immutable")),
                    ("0xb_obj1", owner.clone()),
                    ("0xb_obj2", owner.clone()),
                ],
            ),
        );

        let client = SuiClient::new(mock.clone());
        let registry = ContractDeployer::new(&client, &deployer, &config)
            .deploy_all()
            .await
            .unwrap();

        assert_eq!(
            registry.get("A").unwrap(),
            &DeployedContract {
                package_id: "0xa_pkg".to_string(),
                initialized_objects: vec!["0xa_obj1".to_string(), "0xa_obj2".to_string()],
            }
        );
        assert_eq!(
            registry.get("B").unwrap(),
            &DeployedContract {
                package_id: "0xb_pkg".to_string(),
                initialized_objects: vec!["0xb_obj1".to_string(), "0xb_obj2".to_string()],
            }
        );

        let calls = mock.calls();
        assert_eq!(calls[0].0, "sui_publish");
        assert_eq!(
            calls[0].1,
            json!([deployer.address(), [STANDARD.encode(b"A")], null, 5000])
        );
        assert_eq!(calls[2].1[1], json!([STANDARD.encode(b"B")]));
    }

    #[tokio::test]
    async fn test_failed_publish_status() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_with(dir.path(), &["A"]);
        let deployer = KeyMaterial::from_seed([2u8; 32]);

        let mock = Arc::new(MockTransport::new());
        mock.push_result("sui_publish", tx_bytes_result());
        mock.push_result(
            "sui_executeTransaction",
            execution_result("failure", "PA", &[]),
        );

        let client = SuiClient::new(mock.clone());
        let err = ContractDeployer::new(&client, &deployer, &config)
            .deploy_all()
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ConnectorError::DeploymentFailed { ref contract, ref status }
                if contract == "A" && status == "failure"
        ));
    }

    #[tokio::test]
    async fn test_malformed_publish_responses() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_with(dir.path(), &["A"]);
        let deployer = KeyMaterial::from_seed([2u8; 32]);
        let client_for = |mock: &Arc<MockTransport>| SuiClient::new(mock.clone());

        // builder result without txBytes
        let mock = Arc::new(MockTransport::new());
        mock.push_result("sui_publish", json!({"gas": null}));
        let err = ContractDeployer::new(&client_for(&mock), &deployer, &config)
            .deploy_all()
            .await
            .unwrap_err();
        assert!(matches!(err, ConnectorError::MalformedPublishResponse(_)));

        // execution without effects
        let mock = Arc::new(MockTransport::new());
        mock.push_result("sui_publish", tx_bytes_result());
        mock.push_result("sui_executeTransaction", json!({"ImmediateReturn": {"tx_digest": "X"}}));
        let err = ContractDeployer::new(&client_for(&mock), &deployer, &config)
            .deploy_all()
            .await
            .unwrap_err();
        assert!(matches!(err, ConnectorError::MalformedPublishResponse(_)));

        // success without an immutable package
        let mock = Arc::new(MockTransport::new());
        mock.push_result("sui_publish", tx_bytes_result());
        mock.push_result(
            "sui_executeTransaction",
            execution_result("success", "PA", &[("0xobj", json!({"AddressOwner": "0x1"}))]),
        );
        let err = ContractDeployer::new(&client_for(&mock), &deployer, &config)
            .deploy_all()
            .await
            .unwrap_err();
        assert!(matches!(err, ConnectorError::MalformedPublishResponse(_)));
    }
}
