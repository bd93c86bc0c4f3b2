pub mod create;
pub mod explore;
pub mod gateway;
pub mod losers;
pub mod normalize;
pub mod onchain;
pub mod sample;
pub mod trade;

use async_trait::async_trait;
#[cfg(any(test, feature = "mock"))]
use mockall::automock;

use crate::interfaces::coin::{CoinList, CoinNode, CoinPage};

pub use crate::services::ProviderError;
pub use gateway::CoinGateway;

/// One step of the coin data fallback cascade.
#[cfg_attr(any(test, feature = "mock"), automock)]
#[async_trait]
pub trait CoinSource: Send + Sync {
    fn name(&self) -> &'static str;

    async fn list_coins(
        &self,
        list: CoinList,
        count: usize,
        after: Option<String>,
    ) -> Result<CoinPage, ProviderError>;

    /// `Ok(None)` when this source does not know the coin.
    async fn coin_details(&self, address: &str) -> Result<Option<CoinNode>, ProviderError>;
}
