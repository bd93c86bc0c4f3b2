use std::sync::Arc;

use tracing::{debug, error, info, warn};

use super::losers::{derive_top_losers, overfetch_count};
use super::{CoinSource, ProviderError};
use crate::helpers::validation::{validate_address, ValidationError};
use crate::interfaces::coin::{Coin, CoinList, CoinPage};
use crate::services::notify::Notifier;
use crate::services::request::RequestGate;

/// Normalized page handed to views.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoinListing {
    pub coins: Vec<Coin>,
    pub next_cursor: Option<String>,
}

impl From<CoinPage> for CoinListing {
    fn from(page: CoinPage) -> Self {
        Self {
            coins: page.coins.into_iter().map(Coin::from).collect(),
            next_cursor: page.next_cursor,
        }
    }
}

/// Entry point for coin data. Sources are tried in order; the first one that
/// answers wins, even with an empty page. Failures are logged and turned
/// into notices, never returned.
pub struct CoinGateway {
    sources: Vec<Arc<dyn CoinSource>>,
    notifier: Notifier,
}

impl CoinGateway {
    pub fn new(sources: Vec<Arc<dyn CoinSource>>, notifier: Notifier) -> Self {
        Self { sources, notifier }
    }

    pub fn source_names(&self) -> Vec<&'static str> {
        self.sources.iter().map(|source| source.name()).collect()
    }

    pub async fn list(&self, list: CoinList, count: usize, after: Option<String>) -> Vec<Coin> {
        self.list_page(list, count, after).await.coins
    }

    pub async fn list_page(
        &self,
        list: CoinList,
        count: usize,
        after: Option<String>,
    ) -> CoinListing {
        if list == CoinList::TopLosers {
            return CoinListing {
                coins: self.top_losers(count).await,
                next_cursor: None,
            };
        }

        match self.cascade_list(list, count, after).await {
            Some(page) => CoinListing::from(page),
            None => CoinListing::default(),
        }
    }

    pub async fn top_losers(&self, count: usize) -> Vec<Coin> {
        let fetch = overfetch_count(count);
        debug!("Deriving {} top losers from {} gainers", count, fetch);

        match self.cascade_list(CoinList::TopGainers, fetch, None).await {
            Some(page) => {
                let coins = page.coins.into_iter().map(Coin::from).collect();
                derive_top_losers(coins, count)
            }
            None => Vec::new(),
        }
    }

    /// Looks a coin up by contract address. Only a malformed address is an
    /// error; unknown coins and source failures yield `Ok(None)`.
    pub async fn coin_details(&self, address: &str) -> Result<Option<Coin>, ValidationError> {
        let address = validate_address(address)?;
        let mut failures = Vec::new();

        for source in &self.sources {
            match source.coin_details(&address).await {
                Ok(Some(node)) => {
                    self.report_fallback(source.name(), &failures);
                    return Ok(Some(Coin::from(node)));
                }
                Ok(None) => debug!("{} does not know coin {}", source.name(), address),
                Err(ProviderError::Unsupported { .. }) => {}
                Err(e) => {
                    warn!("{} failed to load coin {}: {}", source.name(), address, e);
                    failures.push(format!("{}: {}", source.name(), e));
                }
            }
        }

        if !failures.is_empty() {
            error!("Could not load coin {}: {}", address, failures.join("; "));
            self.notifier
                .error("Coin unavailable", format!("Could not load coin {}", address));
        }
        Ok(None)
    }

    /// Runs a list request on behalf of a view. A result is only delivered
    /// if no newer request was issued through `gate` meanwhile.
    pub async fn fetch_for_view(
        &self,
        gate: &RequestGate,
        list: CoinList,
        count: usize,
        after: Option<String>,
    ) -> Option<CoinListing> {
        let ticket = gate.issue();
        let listing = self.list_page(list, count, after).await;
        if ticket.is_current() {
            Some(listing)
        } else {
            debug!("Discarding superseded {} request #{}", list, ticket.id());
            None
        }
    }

    async fn cascade_list(
        &self,
        list: CoinList,
        count: usize,
        after: Option<String>,
    ) -> Option<CoinPage> {
        let mut failures = Vec::new();

        for source in &self.sources {
            match source.list_coins(list, count, after.clone()).await {
                Ok(page) => {
                    info!(
                        "Loaded {} {} coins from {}",
                        page.coins.len(),
                        list,
                        source.name()
                    );
                    self.report_fallback(source.name(), &failures);
                    return Some(page);
                }
                Err(ProviderError::Unsupported { .. }) => {
                    debug!("{} cannot serve {}", source.name(), list);
                }
                Err(e) => {
                    warn!("{} failed to load {}: {}", source.name(), list, e);
                    failures.push(format!("{}: {}", source.name(), e));
                }
            }
        }

        error!("No source could load {}: {}", list, failures.join("; "));
        self.notifier.error(
            "Coins unavailable",
            format!("Could not load {}", list.label()),
        );
        None
    }

    fn report_fallback(&self, used: &str, failures: &[String]) {
        if failures.is_empty() {
            return;
        }
        self.notifier.warning(
            "Using fallback data",
            format!("Primary coin data failed, showing results from {}", used),
        );
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;
    use crate::interfaces::coin::{CoinNode, Numeric, PriceChange};
    use crate::services::coins::sample::SampleCoinSource;
    use crate::services::coins::MockCoinSource;
    use crate::services::notify::NoticeLevel;

    const COIN: &str = "0x4200000000000000000000000000000000000006";

    fn node(symbol: &str, change: &str) -> CoinNode {
        CoinNode {
            address: format!("0x{}", symbol),
            symbol: Some(symbol.to_string()),
            price_change_24h: Some(Numeric::Text(change.to_string())),
            ..Default::default()
        }
    }

    fn failing(name: &'static str) -> MockCoinSource {
        let mut source = MockCoinSource::new();
        source.expect_name().return_const(name);
        source
            .expect_list_coins()
            .times(1)
            .returning(|_, _, _| Err(ProviderError::HttpError("connection refused".to_string())));
        source
    }

    fn answering(name: &'static str, coins: Vec<CoinNode>) -> MockCoinSource {
        let mut source = MockCoinSource::new();
        source.expect_name().return_const(name);
        source.expect_list_coins().times(1).returning(move |_, _, _| {
            Ok(CoinPage {
                coins: coins.clone(),
                next_cursor: Some("next".to_string()),
            })
        });
        source
    }

    fn untouched(name: &'static str) -> MockCoinSource {
        let mut source = MockCoinSource::new();
        source.expect_name().return_const(name);
        source.expect_list_coins().never();
        source.expect_coin_details().never();
        source
    }

    fn gateway(sources: Vec<MockCoinSource>, notifier: &Notifier) -> CoinGateway {
        let sources = sources
            .into_iter()
            .map(|source| Arc::new(source) as Arc<dyn CoinSource>)
            .collect();
        CoinGateway::new(sources, notifier.clone())
    }

    #[tokio::test]
    async fn test_fall_back_to_next_source() {
        let notifier = Notifier::new();
        let mut notices = notifier.subscribe();
        let gateway = gateway(
            vec![failing("explore-api"), answering("sample", vec![node("A", "1.5")])],
            &notifier,
        );

        let listing = gateway.list_page(CoinList::TopVolume, 10, None).await;

        assert_eq!(listing.coins.len(), 1);
        assert_eq!(listing.coins[0].change_24h, PriceChange::Percent(1.5));
        assert_eq!(listing.next_cursor.as_deref(), Some("next"));
        assert_eq!(notices.try_recv().unwrap().level, NoticeLevel::Warning);
    }

    #[tokio::test]
    async fn test_stop_on_empty_success() {
        let notifier = Notifier::new();
        let mut notices = notifier.subscribe();
        let gateway = gateway(
            vec![answering("explore-api", Vec::new()), untouched("sample")],
            &notifier,
        );

        assert!(gateway.list(CoinList::New, 10, None).await.is_empty());
        assert!(notices.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_fall_back_to_samples_on_later_pages() {
        let notifier = Notifier::new();
        let mut notices = notifier.subscribe();
        let sources: Vec<Arc<dyn CoinSource>> = vec![
            Arc::new(failing("explore-api")),
            Arc::new(SampleCoinSource::new()),
        ];
        let gateway = CoinGateway::new(sources, notifier.clone());

        let coins = gateway
            .list(CoinList::TopGainers, 5, Some("eyJvZmZzZXQiOjEwfQ==".to_string()))
            .await;

        assert_eq!(coins.len(), 5);
        assert_eq!(notices.try_recv().unwrap().level, NoticeLevel::Warning);
    }

    #[tokio::test]
    async fn test_return_empty_when_every_source_fails() {
        let notifier = Notifier::new();
        let mut notices = notifier.subscribe();
        let gateway = gateway(vec![failing("explore-api"), failing("sample")], &notifier);

        assert!(gateway.list(CoinList::MostValuable, 10, None).await.is_empty());
        let notice = notices.try_recv().unwrap();
        assert_eq!(notice.level, NoticeLevel::Error);
        assert_eq!(notice.message, "Could not load Most Valuable");
    }

    #[tokio::test]
    async fn test_pass_cursor_and_count_through() {
        let mut source = MockCoinSource::new();
        source.expect_name().return_const("explore-api");
        source
            .expect_list_coins()
            .withf(|list: &CoinList, count: &usize, after: &Option<String>| {
                *list == CoinList::LastTraded && *count == 20 && after.as_deref() == Some("abc")
            })
            .times(1)
            .returning(|_, _, _| Ok(CoinPage::default()));
        let gateway = gateway(vec![source], &Notifier::new());

        gateway
            .list(CoinList::LastTraded, 20, Some("abc".to_string()))
            .await;
    }

    #[tokio::test]
    async fn test_derive_losers_from_overfetched_gainers() {
        let mut source = MockCoinSource::new();
        source.expect_name().return_const("explore-api");
        source
            .expect_list_coins()
            .withf(|list: &CoinList, count: &usize, after: &Option<String>| {
                *list == CoinList::TopGainers && *count == 15 && after.is_none()
            })
            .times(1)
            .returning(|_, _, _| {
                Ok(CoinPage {
                    coins: vec![
                        node("A", "3"),
                        node("B", "-1"),
                        node("C", "-9.5"),
                        node("D", "-4"),
                        node("E", "0"),
                    ],
                    next_cursor: Some("ignored".to_string()),
                })
            });
        let gateway = gateway(vec![source], &Notifier::new());

        let listing = gateway.list_page(CoinList::TopLosers, 3, None).await;

        let symbols: Vec<&str> = listing.coins.iter().map(|c| c.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["C", "D", "B"]);
        assert_eq!(listing.next_cursor, None);
    }

    #[tokio::test]
    async fn test_validate_address_before_lookup() {
        let gateway = gateway(vec![untouched("explore-api")], &Notifier::new());

        let err = gateway.coin_details("0x123").await.unwrap_err();
        assert_eq!(err, ValidationError::InvalidAddress("0x123".to_string()));
    }

    #[tokio::test]
    async fn test_continue_details_lookup_past_unknown_coin() {
        let mut explore = MockCoinSource::new();
        explore.expect_name().return_const("explore-api");
        explore
            .expect_coin_details()
            .times(1)
            .returning(|_| Ok(None));
        let mut onchain = MockCoinSource::new();
        onchain.expect_name().return_const("onchain");
        onchain.expect_coin_details().times(1).returning(|address| {
            Ok(Some(CoinNode {
                address: address.to_string(),
                name: Some("Wrapped Ether".to_string()),
                ..Default::default()
            }))
        });

        let gateway = gateway(vec![explore, onchain], &Notifier::new());
        let coin = gateway.coin_details(COIN).await.unwrap().unwrap();

        assert_eq!(coin.name, "Wrapped Ether");
        assert_eq!(coin.change_24h, PriceChange::Unavailable);
    }

    /// Answers after a per-list delay, to let requests overtake each other.
    struct DelayedSource;

    #[async_trait]
    impl CoinSource for DelayedSource {
        fn name(&self) -> &'static str {
            "delayed"
        }

        async fn list_coins(
            &self,
            list: CoinList,
            count: usize,
            after: Option<String>,
        ) -> Result<CoinPage, ProviderError> {
            let delay = if list == CoinList::TopGainers { 500 } else { 50 };
            tokio::time::sleep(Duration::from_millis(delay)).await;
            SampleCoinSource::new().list_coins(list, count, after).await
        }

        async fn coin_details(&self, _address: &str) -> Result<Option<CoinNode>, ProviderError> {
            Ok(None)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_drop_superseded_view_results() {
        let gateway = CoinGateway::new(vec![Arc::new(DelayedSource) as Arc<dyn CoinSource>], Notifier::new());
        let gate = RequestGate::new();

        let (stale, fresh) = tokio::join!(
            gateway.fetch_for_view(&gate, CoinList::TopGainers, 5, None),
            gateway.fetch_for_view(&gate, CoinList::New, 5, None),
        );

        assert_eq!(stale, None);
        assert_eq!(fresh.map(|listing| listing.coins.len()), Some(5));
    }
}
