use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::helpers::app_config::AppConfig;
use crate::services::catalog::{NftSource, SampleNftCatalog, SearchDebouncer};
use crate::services::coins::create::CoinCreator;
use crate::services::coins::explore::ExploreApiSource;
use crate::services::coins::onchain::OnchainSource;
use crate::services::coins::sample::SampleCoinSource;
use crate::services::coins::trade::{CoinTrader, CoinsSdk};
use crate::services::coins::{CoinGateway, CoinSource};
use crate::services::feed::SocialFeed;
use crate::services::notify::Notifier;
use crate::services::storage::{ApiCredentials, CredentialStore};
use crate::services::wallet::{EventSubscription, SessionManager, WalletProvider};
use crate::services::ProviderError;

/// Everything a UI host needs, built once at startup.
pub struct MarketContext {
    pub config: AppConfig,
    pub credentials: CredentialStore,
    pub notifier: Notifier,
    pub wallet: Arc<SessionManager>,
    pub coins: CoinGateway,
    pub nfts: Arc<dyn NftSource>,
    pub feed: SocialFeed,
    subscription: Option<EventSubscription>,
}

impl MarketContext {
    /// Loads stored credentials, builds the data sources and restores a
    /// previously authorized wallet session when `provider` is present.
    pub async fn initialize(
        config: AppConfig,
        provider: Option<Arc<dyn WalletProvider>>,
    ) -> Result<Self, ProviderError> {
        let notifier = Notifier::new();
        let credentials = CredentialStore::new(&config.credentials_path);
        let keys = credentials.load().await;
        let timeout = Duration::from_secs(config.request_timeout_secs);

        let coins = CoinGateway::new(coin_sources(&config, &keys, timeout)?, notifier.clone());
        let feed = SocialFeed::new(
            &config.social_api_url,
            keys.farcaster_api_key.clone(),
            timeout,
            notifier.clone(),
        )?;
        let nfts: Arc<dyn NftSource> = Arc::new(SampleNftCatalog::new());

        let wallet = Arc::new(SessionManager::new(provider, config.network.clone()));
        let subscription = if wallet.has_provider() {
            match wallet.restore().await {
                Ok(true) => info!("Restored wallet session"),
                Ok(false) => info!("No authorized wallet account"),
                Err(e) => warn!("Could not restore wallet session: {}", e),
            }
            wallet.watch().ok()
        } else {
            info!("No wallet provider, running read-only");
            None
        };

        info!("Coin sources: {:?}", coins.source_names());
        Ok(Self {
            config,
            credentials,
            notifier,
            wallet,
            coins,
            nfts,
            feed,
            subscription,
        })
    }

    pub fn is_watching_wallet(&self) -> bool {
        self.subscription
            .as_ref()
            .is_some_and(EventSubscription::is_active)
    }

    pub fn trader(&self, sdk: Arc<dyn CoinsSdk>) -> CoinTrader {
        CoinTrader::new(
            sdk,
            Arc::clone(&self.wallet),
            self.notifier.clone(),
            self.config.slippage_bps,
        )
    }

    pub fn creator(&self, sdk: Arc<dyn CoinsSdk>) -> CoinCreator {
        CoinCreator::new(sdk, Arc::clone(&self.wallet), self.notifier.clone())
    }

    pub fn search_debouncer(&self) -> (SearchDebouncer, mpsc::Receiver<String>) {
        SearchDebouncer::spawn(Duration::from_millis(self.config.search_debounce_ms))
    }

    /// Stops listening to wallet events.
    pub fn shutdown(&mut self) {
        if self.subscription.take().is_some() {
            info!("Stopped watching wallet events");
        }
    }
}

/// Explore API first, then the chain itself, then sample data.
fn coin_sources(
    config: &AppConfig,
    keys: &ApiCredentials,
    timeout: Duration,
) -> Result<Vec<Arc<dyn CoinSource>>, ProviderError> {
    let mut sources: Vec<Arc<dyn CoinSource>> = vec![Arc::new(ExploreApiSource::new(
        &config.explore_api_url,
        keys.zora_api_key.clone(),
        config.network.chain_id,
        timeout,
    )?)];

    match config.network.primary_rpc_url() {
        Some(rpc_url) => sources.push(Arc::new(OnchainSource::new(rpc_url, timeout)?)),
        None => warn!("No RPC url for chain {}, skipping on-chain source", config.network.chain_id),
    }

    sources.push(Arc::new(SampleCoinSource::new()));
    Ok(sources)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interfaces::wallet::{ProviderEvent, RpcError};
    use crate::services::wallet::MockWalletProvider;
    use serde_json::json;
    use tokio::sync::broadcast;

    fn config(tag: &str) -> AppConfig {
        let path = std::env::temp_dir().join(format!(
            "basemart-context-{}-{}.json",
            tag,
            std::process::id()
        ));
        AppConfig {
            credentials_path: path.to_string_lossy().into_owned(),
            ..AppConfig::default()
        }
    }

    #[tokio::test]
    async fn test_start_read_only_without_provider() {
        let mut context = MarketContext::initialize(config("read-only"), None)
            .await
            .unwrap();

        assert!(!context.wallet.has_provider());
        assert!(!context.is_watching_wallet());
        assert_eq!(
            context.coins.source_names(),
            vec!["explore-api", "onchain", "sample"]
        );
        assert!(!context.feed.has_api_key());
        assert_eq!(context.nfts.trending().await.unwrap().len(), 4);
        context.shutdown();
    }

    #[tokio::test]
    async fn test_restore_and_watch_wallet() {
        let (events, _) = broadcast::channel::<ProviderEvent>(4);
        let mut provider = MockWalletProvider::new();
        provider.expect_request().returning(|method, _| match method {
            "eth_accounts" => Ok(json!(["0x1111111111111111111111111111111111111111"])),
            "eth_chainId" => Ok(json!("0x2105")),
            "eth_getBalance" => Ok(json!("0x0")),
            other => Err(RpcError::new(-32601, format!("unexpected {}", other))),
        });
        let sender = events.clone();
        provider.expect_events().returning(move || sender.subscribe());
        let provider: Arc<dyn WalletProvider> = Arc::new(provider);

        let mut context = MarketContext::initialize(config("wallet"), Some(provider))
            .await
            .unwrap();

        assert!(context.wallet.session().await.connected);
        assert!(context.is_watching_wallet());
        context.shutdown();
        assert!(!context.is_watching_wallet());
    }
}
