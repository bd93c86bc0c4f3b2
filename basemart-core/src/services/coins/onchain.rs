use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use tracing::debug;

use super::{CoinSource, ProviderError};
use crate::helpers::abi::{
    decode_abi_string, decode_abi_uint, NAME_SELECTOR, SYMBOL_SELECTOR, TOTAL_SUPPLY_SELECTOR,
};
use crate::interfaces::coin::{CoinList, CoinNode, CoinPage, Numeric};

/// Extracts `result` from a JSON-RPC response body.
pub fn parse_rpc_result(body: &Value) -> Result<String, ProviderError> {
    if let Some(error) = body.get("error").filter(|e| !e.is_null()) {
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("unknown error");
        return Err(ProviderError::RpcError(message.to_string()));
    }
    body.get("result")
        .and_then(Value::as_str)
        .map(str::to_string)
        .ok_or_else(|| ProviderError::MissingDataError("JSON-RPC result".to_string()))
}

/// Reads ERC-20 metadata straight from the chain. It cannot rank coins, so
/// it only answers detail lookups.
#[derive(Debug)]
pub struct OnchainSource {
    client: Client,
    rpc_url: String,
    next_id: AtomicU64,
}

impl OnchainSource {
    pub fn new(rpc_url: &str, timeout: Duration) -> Result<Self, ProviderError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            rpc_url: rpc_url.to_string(),
            next_id: AtomicU64::new(1),
        })
    }

    async fn eth_call(&self, to: &str, data: &str) -> Result<String, ProviderError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let payload = json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": "eth_call",
            "params": [{ "to": to, "data": data }, "latest"],
        });

        let response = self.client.post(&self.rpc_url).json(&payload).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::StatusError {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.json::<Value>().await?;
        parse_rpc_result(&body)
    }
}

#[async_trait]
impl CoinSource for OnchainSource {
    fn name(&self) -> &'static str {
        "onchain"
    }

    async fn list_coins(
        &self,
        list: CoinList,
        _count: usize,
        _after: Option<String>,
    ) -> Result<CoinPage, ProviderError> {
        Err(ProviderError::Unsupported {
            provider: self.name().to_string(),
            what: list.label().to_string(),
        })
    }

    async fn coin_details(&self, address: &str) -> Result<Option<CoinNode>, ProviderError> {
        let raw_name = self.eth_call(address, NAME_SELECTOR).await?;
        // Calls against an address without code return empty data.
        let Some(name) = decode_abi_string(&raw_name) else {
            debug!("No ERC-20 metadata at {}", address);
            return Ok(None);
        };

        let symbol = decode_abi_string(&self.eth_call(address, SYMBOL_SELECTOR).await?);
        let total_supply = decode_abi_uint(&self.eth_call(address, TOTAL_SUPPLY_SELECTOR).await?);

        Ok(Some(CoinNode {
            address: address.to_string(),
            name: Some(name),
            symbol,
            total_supply: total_supply.map(|supply| Numeric::Text(supply.to_string())),
            ..Default::default()
        }))
    }
}
