//! Gas coin pool
//!
//! Splits a pool of gas coins off the funding identity's largest coin and
//! partitions it between workers. Every coin ends up in exactly one
//! partition, so concurrent workers never reference the same coin.
//!
//! ## Sequence
//!
//! 1. `sui_getCoins`: pick the funding coin
//! 2. `sui_transferSui` to self: mint a dedicated coin paying for the split
//! 3. `sui_splitCoin`: split the funding coin into `coin_count` coins
//! 4. created objects of the split form the pool

use tracing::{debug, info, warn};

use crate::config::GasConfig;
use crate::error::{ConnectorError, Result};
use crate::keys::KeyMaterial;
use crate::rpc::types::{ExecuteTransactionResponse, TransactionEffects};
use crate::rpc::{ObjectId, SuiClient};

/// Builds the gas coin pool for one benchmark run
pub struct GasCoinAllocator<'a> {
    client: &'a SuiClient,
    funder: &'a KeyMaterial,
    config: &'a GasConfig,
}

impl<'a> GasCoinAllocator<'a> {
    pub fn new(client: &'a SuiClient, funder: &'a KeyMaterial, config: &'a GasConfig) -> Self {
        Self {
            client,
            funder,
            config,
        }
    }

    /// Run the whole sequence and return the pool in creation order
    pub async fn allocate(&self) -> Result<Vec<ObjectId>> {
        let owner = self.funder.address();
        let needed = self.config.required_funding();

        let coins = self.client.get_coins(owner, &self.config.coin_type).await?;
        let source = coins
            .data
            .into_iter()
            .max_by_key(|coin| coin.balance)
            .filter(|coin| coin.balance >= needed)
            .ok_or_else(|| ConnectorError::NoFundingCoin {
                owner: owner.to_string(),
                needed,
            })?;
        debug!(coin = %source.coin_object_id, balance = source.balance, "funding coin selected");

        let split_gas = self.config.split_gas_amount();
        let transfer = self
            .client
            .transfer_sui(owner, &source.coin_object_id, split_gas, owner, split_gas)
            .await?;
        let effects = self.sign_and_execute(&transfer.tx_bytes, "gas transfer").await?;
        let gas_coin = effects
            .created_ids()
            .into_iter()
            .next()
            .ok_or_else(|| ConnectorError::MalformedExecutionResponse(
                "gas transfer created no coin".to_string(),
            ))?;
        debug!(coin = %gas_coin, amount = split_gas, "split gas coin created");

        let amounts = vec![self.config.each_amount; self.config.coin_count];
        let split = self
            .client
            .split_coin(owner, &source.coin_object_id, &amounts, split_gas, &gas_coin)
            .await?;
        let effects = self.sign_and_execute(&split.tx_bytes, "coin split").await?;

        let pool = effects.created_ids();
        if pool.len() != self.config.coin_count {
            warn!(
                expected = self.config.coin_count,
                created = pool.len(),
                "split produced an unexpected number of coins"
            );
        }
        info!("⛽ Gas pool ready: {} coins of {}", pool.len(), self.config.each_amount);

        Ok(pool)
    }

    async fn sign_and_execute(&self, tx_bytes: &str, stage: &'static str) -> Result<TransactionEffects> {
        let signed = self.funder.sign_transaction(tx_bytes)?;
        let raw = self.client.execute_transaction(&signed).await?;
        let effects = ExecuteTransactionResponse::effects_from_value(&raw)?;

        if !effects.status.is_success() {
            return Err(ConnectorError::ExecutionFailed {
                stage,
                status: effects.status.status,
            });
        }
        Ok(effects)
    }
}

/// Split `pool` into `number` contiguous slices of `ceil(len / number)` coins.
/// Trailing slices are shorter or empty when the pool does not divide evenly.
pub fn partition(pool: &[ObjectId], number: usize) -> Vec<Vec<ObjectId>> {
    if number == 0 {
        return Vec::new();
    }

    let size = pool.len().div_ceil(number).max(1);
    let mut slices: Vec<Vec<ObjectId>> = pool.chunks(size).map(<[ObjectId]>::to_vec).collect();
    slices.resize_with(number, Vec::new);
    slices
}
