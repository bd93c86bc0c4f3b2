pub mod debounce;
pub mod sample;
pub mod search;

use async_trait::async_trait;
#[cfg(any(test, feature = "mock"))]
use mockall::automock;

use crate::interfaces::nft::{Nft, NftFilterOptions};
use crate::services::ProviderError;

pub use debounce::SearchDebouncer;
pub use sample::SampleNftCatalog;

/// Number of NFTs shown in each home page section.
pub const SECTION_SIZE: usize = 4;

/// Read side of the NFT marketplace.
#[cfg_attr(any(test, feature = "mock"), automock)]
#[async_trait]
pub trait NftSource: Send + Sync {
    /// Highest 24h volume first.
    async fn trending(&self) -> Result<Vec<Nft>, ProviderError>;

    /// Most recently minted first.
    async fn newly_minted(&self) -> Result<Vec<Nft>, ProviderError>;

    async fn highest_market_cap(&self) -> Result<Vec<Nft>, ProviderError>;

    async fn search(
        &self,
        query: &str,
        filters: Option<NftFilterOptions>,
    ) -> Result<Vec<Nft>, ProviderError>;

    async fn by_id(&self, id: &str) -> Result<Option<Nft>, ProviderError>;

    /// Autocomplete entries for the search bar.
    async fn suggestions(&self, query: &str) -> Result<Vec<String>, ProviderError>;
}
