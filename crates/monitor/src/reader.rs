//! # Remote Reader
//! This module performs the on-chain read for an alert.
//!
//! A fresh HTTP provider is built for every alert's `rpc_url`. The endpoint is validated by
//! asking for its chain id before the `eth_call` is sent, so an unreachable node fails fast
//! instead of surfacing as a decode error.

use crate::error::{MonitorError, Result};
use crate::primitives::models::{AlertDefinition, CallDescriptor};
use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes};
use alloy::providers::{Provider, ProviderBuilder, RootProvider};
use alloy::rpc::types::TransactionRequest;
use std::str::FromStr;
use tracing::debug;
use url::Url;

pub type HttpProvider = RootProvider;

/// Performs the remote read for one alert and returns the canonical rendering of the result.
#[allow(async_fn_in_trait)]
pub trait RemoteReader {
    async fn read(&self, definition: &AlertDefinition) -> Result<String>;
}

/// Connection to one JSON-RPC endpoint.
#[derive(Clone)]
pub struct ContractReader {
    pub provider: HttpProvider,
    pub rpc_url: String,
}

impl ContractReader {
    pub fn connect(rpc_url: &str) -> Result<Self> {
        let url: Url = rpc_url.parse().map_err(|e: url::ParseError| MonitorError::InvalidRpcUrl {
            url: rpc_url.to_string(),
            reason: e.to_string(),
        })?;
        let provider = ProviderBuilder::new()
            .disable_recommended_fillers()
            .connect_http(url);

        Ok(Self {
            provider,
            rpc_url: rpc_url.to_string(),
        })
    }

    /// Queries the network identity; doubles as a liveness check of the endpoint.
    pub async fn chain_id(&self) -> Result<u64> {
        self.provider
            .get_chain_id()
            .await
            .map_err(|e| self.rpc_error(e))
    }

    /// Executes the described read against `contract` and decodes the result.
    pub async fn call(&self, contract: Address, descriptor: &CallDescriptor) -> Result<String> {
        let tx = TransactionRequest::default()
            .with_to(contract)
            .with_input(Bytes::from(descriptor.calldata()?));

        let output = self
            .provider
            .call(tx)
            .await
            .map_err(|e| self.rpc_error(e))?;

        descriptor.decode_output(&output)
    }

    fn rpc_error(&self, err: impl std::fmt::Display) -> MonitorError {
        MonitorError::Rpc {
            url: self.rpc_url.clone(),
            reason: err.to_string(),
        }
    }
}

/// Reads over JSON-RPC, one connection per alert.
#[derive(Debug, Clone, Copy, Default)]
pub struct RpcReader;

impl RemoteReader for RpcReader {
    async fn read(&self, definition: &AlertDefinition) -> Result<String> {
        let descriptor = definition.call_descriptor()?;
        let contract = Address::from_str(definition.contract_address.trim())
            .map_err(|_| MonitorError::InvalidAddress(definition.contract_address.clone()))?;

        let reader = ContractReader::connect(&definition.rpc_url)?;
        let chain_id = reader.chain_id().await?;
        debug!(chain_id, "Connected to {}", definition.rpc_url);

        reader.call(contract, &descriptor).await
    }
}
