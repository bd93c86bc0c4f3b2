pub mod events;
pub mod manager;

use async_trait::async_trait;
#[cfg(any(test, feature = "mock"))]
use mockall::automock;
use serde_json::Value;
use tokio::sync::broadcast;

use crate::interfaces::wallet::{ProviderEvent, RpcError};

pub use events::EventSubscription;
pub use manager::SessionManager;

/// Injected EIP-1193 wallet provider.
#[cfg_attr(any(test, feature = "mock"), automock)]
#[async_trait]
pub trait WalletProvider: Send + Sync {
    async fn request(&self, method: &str, params: Value) -> Result<Value, RpcError>;

    /// `accountsChanged` / `chainChanged` notifications.
    fn events(&self) -> broadcast::Receiver<ProviderEvent>;
}

/// Session manager restored on Base for `address`, for service tests.
#[cfg(test)]
pub(crate) async fn connected_session(address: &'static str) -> std::sync::Arc<SessionManager> {
    use crate::interfaces::wallet::NetworkConfig;
    use serde_json::json;

    let mut provider = MockWalletProvider::new();
    provider
        .expect_request()
        .returning(move |method, _| match method {
            "eth_accounts" => Ok(json!([address])),
            "eth_chainId" => Ok(json!("0x2105")),
            "eth_getBalance" => Ok(json!("0xde0b6b3a7640000")),
            other => Err(RpcError::new(-32601, format!("unexpected {}", other))),
        });
    let provider: std::sync::Arc<dyn WalletProvider> = std::sync::Arc::new(provider);
    let manager = SessionManager::new(Some(provider), NetworkConfig::default());
    assert!(manager.restore().await.unwrap());
    std::sync::Arc::new(manager)
}
