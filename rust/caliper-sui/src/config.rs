//! Network configuration
//!
//! Everything the connector needs to reach a Sui network, fund its workers
//! and publish the benchmark contracts. Loaded once from TOML and passed by
//! value into each component.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::rpc::types::SUI_COIN_TYPE;

/// Main configuration for the connector
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SuiConfig {
    /// JSON-RPC endpoint of a full node
    pub url: String,

    /// Base directory for relative contract paths
    pub workspace_root: PathBuf,

    /// Deployer secret key (hex or base64). A random identity is used when absent.
    pub deployer_seed: Option<String>,

    /// Funding secret key (hex or base64); owns the gas coins handed to workers
    pub funding_seed: String,

    /// Gas budget for each benchmark move call
    pub gas_budget: u64,

    /// Gas budget for each publish transaction
    pub publish_gas_budget: u64,

    /// Per-request timeout enforced by the HTTP transport
    pub request_timeout_secs: Option<u64>,

    pub gas: GasConfig,

    /// Contracts to publish, in deployment order
    pub contracts: Vec<ContractConfig>,
}

/// Gas coin pool settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GasConfig {
    /// Fee coin type owned by the funding identity
    pub coin_type: String,

    /// Number of coins to split off for the workers
    pub coin_count: usize,

    /// Balance of every split coin
    pub each_amount: u64,

    /// Gas reserved per coin for the transfer and split transactions
    pub per_coin_gas_reserve: u64,
}

/// A compiled contract: one `.mv` module or a directory of them
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractConfig {
    pub name: String,
    pub path: PathBuf,
}

impl Default for SuiConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:9000".to_string(),
            workspace_root: PathBuf::from("."),
            deployer_seed: None,
            funding_seed: String::new(),
            gas_budget: 10_000,
            publish_gas_budget: 10_000,
            request_timeout_secs: Some(30),
            gas: GasConfig::default(),
            contracts: vec![],
        }
    }
}

impl Default for GasConfig {
    fn default() -> Self {
        Self {
            coin_type: SUI_COIN_TYPE.to_string(),
            coin_count: 10,
            each_amount: 100_000,
            per_coin_gas_reserve: 1_000,
        }
    }
}

impl GasConfig {
    /// Amount moved into the dedicated coin that pays for the split
    pub fn split_gas_amount(&self) -> u64 {
        self.per_coin_gas_reserve.saturating_mul(self.coin_count as u64)
    }

    /// Balance the source coin must hold to fund the whole pool
    pub fn required_funding(&self) -> u64 {
        self.each_amount
            .saturating_mul(self.coin_count as u64)
            .saturating_add(self.split_gas_amount())
    }
}

impl SuiConfig {
    /// Load configuration from TOML file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    // Builder-style methods for CLI overrides

    pub fn with_url(mut self, url: Option<String>) -> Self {
        if let Some(url) = url {
            self.url = url;
        }
        self
    }

    pub fn with_workspace_root(mut self, root: Option<PathBuf>) -> Self {
        if let Some(root) = root {
            self.workspace_root = root;
        }
        self
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Resolve a contract path against the workspace root
    pub fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.workspace_root.join(path)
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.url.is_empty() {
            anyhow::bail!("url must not be empty");
        }

        if self.funding_seed.is_empty() {
            anyhow::bail!("funding_seed is required");
        }

        if self.gas.coin_count == 0 {
            anyhow::bail!("gas.coin_count must be at least 1");
        }

        if self.gas.each_amount < self.gas_budget {
            anyhow::bail!(
                "gas.each_amount ({}) must cover gas_budget ({})",
                self.gas.each_amount,
                self.gas_budget
            );
        }

        let mut names = std::collections::HashSet::new();
        for contract in &self.contracts {
            if !names.insert(contract.name.as_str()) {
                anyhow::bail!("contract {} is declared twice", contract.name);
            }
        }

        Ok(())
    }
}
