//! Connector - the surface a load-testing harness drives
//!
//! The harness calls, in order:
//!
//! ```text
//! coordinator: init -> install_smart_contract -> prepare_worker_arguments(n)
//! worker i:    get_context(i, args[i]) -> send_request(ctx, request) ...
//! ```
//!
//! Setup errors are returned to the caller and end the run. `send_request`
//! only errors when the worker has run out of gas coins.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::SuiConfig;
use crate::deploy::ContractDeployer;
use crate::error::{ConnectorError, Result};
use crate::executor::TransactionExecutor;
use crate::gas::{partition, GasCoinAllocator};
use crate::keys::KeyMaterial;
use crate::rpc::{HttpTransport, ObjectId, RpcTransport, SuiClient};
use crate::types::{
    ContractRegistry, TransactionRequest, TransactionStatus, WorkerArguments, WorkerContext,
};

/// Capabilities a harness expects from a blockchain connector
#[async_trait]
pub trait BlockchainConnector: Send {
    type WorkerArgs: Send;
    type Context: Send;

    /// Derive identities and prepare shared resources
    async fn init(&mut self) -> Result<()>;

    /// Deploy the configured contracts
    async fn install_smart_contract(&mut self) -> Result<()>;

    /// Arguments for each of `number` workers
    async fn prepare_worker_arguments(&mut self, number: usize) -> Result<Vec<Self::WorkerArgs>>;

    /// Build the per-worker context
    async fn get_context(&mut self, worker_index: usize, args: Self::WorkerArgs) -> Result<Self::Context>;

    /// Send one request
    async fn send_request(
        &self,
        context: &mut Self::Context,
        request: &TransactionRequest,
    ) -> Result<TransactionStatus>;
}

/// Identities derived from the configuration
struct Identities {
    deployer: KeyMaterial,
    funder: Arc<KeyMaterial>,
}

/// Sui implementation of [`BlockchainConnector`]
pub struct SuiConnector {
    config: SuiConfig,
    client: SuiClient,
    identities: Option<Identities>,
    registry: Option<ContractRegistry>,
    gas_pool: Vec<ObjectId>,
}

impl SuiConnector {
    /// Connector talking HTTP to the configured node
    pub fn new(config: SuiConfig) -> Result<Self> {
        let transport = HttpTransport::new(&config.url, config.request_timeout())?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    pub fn with_transport(config: SuiConfig, transport: Arc<dyn RpcTransport>) -> Self {
        Self {
            config,
            client: SuiClient::new(transport),
            identities: None,
            registry: None,
            gas_pool: Vec::new(),
        }
    }

    pub fn config(&self) -> &SuiConfig {
        &self.config
    }

    pub fn registry(&self) -> Option<&ContractRegistry> {
        self.registry.as_ref()
    }

    fn identities(&self) -> Result<&Identities> {
        self.identities
            .as_ref()
            .ok_or(ConnectorError::NotInitialized("init has not run"))
    }

    /// Deployer and funding identities from the configured seeds
    pub fn derive_identities(config: &SuiConfig) -> Result<(KeyMaterial, KeyMaterial)> {
        let deployer = match &config.deployer_seed {
            Some(seed) => KeyMaterial::from_encoded(seed)?,
            None => {
                warn!("No deployer seed configured, generating a throwaway deployer identity");
                KeyMaterial::generate()
            }
        };
        let funder = KeyMaterial::from_encoded(&config.funding_seed)?;
        Ok((deployer, funder))
    }
}

#[async_trait]
impl BlockchainConnector for SuiConnector {
    type WorkerArgs = WorkerArguments;
    type Context = WorkerContext;

    async fn init(&mut self) -> Result<()> {
        let (deployer, funder) = Self::derive_identities(&self.config)?;
        info!("🔑 Deployer address: {}", deployer.address());
        info!("🔑 Funding address: {}", funder.address());

        let pool = GasCoinAllocator::new(&self.client, &funder, &self.config.gas)
            .allocate()
            .await?;

        self.gas_pool = pool;
        self.identities = Some(Identities {
            deployer,
            funder: Arc::new(funder),
        });
        Ok(())
    }

    async fn install_smart_contract(&mut self) -> Result<()> {
        if self.registry.is_some() {
            return Err(ConnectorError::AlreadyDeployed);
        }

        let identities = self.identities()?;
        let registry = ContractDeployer::new(&self.client, &identities.deployer, &self.config)
            .deploy_all()
            .await?;

        self.registry = Some(registry);
        Ok(())
    }

    async fn prepare_worker_arguments(&mut self, number: usize) -> Result<Vec<WorkerArguments>> {
        let registry = self
            .registry
            .as_ref()
            .ok_or(ConnectorError::NotInitialized("contracts are not deployed"))?;

        if self.gas_pool.len() < number {
            warn!(
                coins = self.gas_pool.len(),
                workers = number,
                "fewer gas coins than workers, some workers start with an empty pool"
            );
        }

        Ok(partition(&self.gas_pool, number)
            .into_iter()
            .enumerate()
            .map(|(worker_index, gas_coins)| WorkerArguments {
                worker_index,
                contracts: registry.clone(),
                gas_coins,
            })
            .collect())
    }

    async fn get_context(&mut self, worker_index: usize, args: WorkerArguments) -> Result<WorkerContext> {
        if self.identities.is_none() {
            let (deployer, funder) = Self::derive_identities(&self.config)?;
            self.identities = Some(Identities {
                deployer,
                funder: Arc::new(funder),
            });
        }

        let mut context = WorkerContext::new(args);
        context.worker_index = worker_index;
        info!(
            "Worker {} ready with {} gas coins",
            worker_index,
            context.remaining_gas_coins()
        );
        Ok(context)
    }

    async fn send_request(
        &self,
        context: &mut WorkerContext,
        request: &TransactionRequest,
    ) -> Result<TransactionStatus> {
        let identities = self.identities()?;
        let executor = TransactionExecutor::new(
            self.client.clone(),
            identities.funder.clone(),
            self.config.gas_budget,
        );
        executor.execute(request, context).await
    }
}

// =============================================================================
// ONE-SHOT SETUP
// =============================================================================

/// Output of the coordinating process
#[derive(Debug, Clone)]
pub struct SetupOutput {
    pub registry: ContractRegistry,
    pub partitions: Vec<Vec<ObjectId>>,
}

impl SetupOutput {
    /// Arguments for worker `i` (an empty pool past the last partition)
    pub fn partition_for_worker(&self, worker_index: usize) -> WorkerArguments {
        WorkerArguments {
            worker_index,
            contracts: self.registry.clone(),
            gas_coins: self.partitions.get(worker_index).cloned().unwrap_or_default(),
        }
    }
}

/// Run identity derivation, gas allocation and deployment once
pub async fn init_once(config: SuiConfig, workers: usize) -> Result<SetupOutput> {
    let mut connector = SuiConnector::new(config)?;
    setup(&mut connector, workers).await
}

/// Same as [`init_once`] on an already built connector
pub async fn setup(connector: &mut SuiConnector, workers: usize) -> Result<SetupOutput> {
    connector.init().await?;
    connector.install_smart_contract().await?;
    let args = connector.prepare_worker_arguments(workers).await?;

    Ok(SetupOutput {
        registry: connector.registry.clone().unwrap_or_default(),
        partitions: args.into_iter().map(|a| a.gas_coins).collect(),
    })
}
