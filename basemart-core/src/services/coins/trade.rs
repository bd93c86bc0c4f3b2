use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
#[cfg(any(test, feature = "mock"))]
use mockall::automock;
use num_bigint::BigUint;
use num_traits::Zero;
use tracing::{error, info, warn};

use super::ProviderError;
use crate::helpers::units::{apply_slippage, ETHER_DECIMALS};
use crate::helpers::validation::{parse_positive_amount, validate_address, ValidationError};
use crate::services::notify::Notifier;
use crate::services::wallet::SessionManager;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TradeDirection {
    Buy,
    Sell,
}

impl fmt::Display for TradeDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeDirection::Buy => write!(f, "buy"),
            TradeDirection::Sell => write!(f, "sell"),
        }
    }
}

/// Result of a simulated trade, in base units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeQuote {
    pub order_size: BigUint,
    pub amount_out: BigUint,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TradeParams {
    pub direction: TradeDirection,
    pub target: String,
    pub recipient: String,
    pub order_size: BigUint,
    pub min_amount_out: BigUint,
    pub referrer: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateCoinParams {
    pub name: String,
    pub symbol: String,
    pub uri: String,
    pub payout_recipient: String,
    pub initial_purchase_wei: BigUint,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployedCoin {
    pub hash: String,
    pub address: String,
}

/// Write side of the coin protocol SDK. Every method signing a transaction
/// returns its hash.
#[cfg_attr(any(test, feature = "mock"), automock)]
#[async_trait]
pub trait CoinsSdk: Send + Sync {
    async fn simulate_buy(&self, target: &str, order_size: BigUint) -> Result<TradeQuote, ProviderError>;

    async fn simulate_sell(&self, target: &str, sell_amount: BigUint) -> Result<TradeQuote, ProviderError>;

    async fn trade(&self, params: TradeParams) -> Result<String, ProviderError>;

    async fn create_coin(&self, params: CreateCoinParams) -> Result<DeployedCoin, ProviderError>;

    async fn update_metadata(&self, coin: &str, uri: &str) -> Result<String, ProviderError>;

    async fn update_payout_recipient(&self, coin: &str, recipient: &str) -> Result<String, ProviderError>;
}

#[derive(Debug, thiserror::Error)]
pub enum TradeError {
    #[error("Connect a wallet first")]
    WalletNotConnected,
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Transaction failed: {0}")]
    Provider(#[from] ProviderError),
}

/// Connected account, or the error every write path returns without one.
pub(crate) async fn require_account(wallet: &SessionManager) -> Result<String, TradeError> {
    wallet.session().await.address.ok_or(TradeError::WalletNotConnected)
}

/// Buy and sell flows. Quotes need no wallet; execution does.
pub struct CoinTrader {
    sdk: Arc<dyn CoinsSdk>,
    wallet: Arc<SessionManager>,
    notifier: Notifier,
    slippage_bps: u32,
}

impl CoinTrader {
    pub fn new(
        sdk: Arc<dyn CoinsSdk>,
        wallet: Arc<SessionManager>,
        notifier: Notifier,
        slippage_bps: u32,
    ) -> Self {
        Self {
            sdk,
            wallet,
            notifier,
            slippage_bps,
        }
    }

    /// Simulates spending `amount_eth` on `coin`.
    pub async fn quote_buy(&self, coin: &str, amount_eth: &str) -> Result<TradeQuote, TradeError> {
        let coin = validate_address(coin)?;
        let order_size = parse_positive_amount(amount_eth, ETHER_DECIMALS)?;
        Ok(self.sdk.simulate_buy(&coin, order_size).await?)
    }

    /// Simulates selling `token_amount` of `coin`.
    pub async fn quote_sell(&self, coin: &str, token_amount: &str) -> Result<TradeQuote, TradeError> {
        let coin = validate_address(coin)?;
        let sell_amount = parse_positive_amount(token_amount, ETHER_DECIMALS)?;
        Ok(self.sdk.simulate_sell(&coin, sell_amount).await?)
    }

    /// `referrer` earns the protocol's referral share when given.
    pub async fn buy(
        &self,
        coin: &str,
        amount_eth: &str,
        min_amount_out: Option<BigUint>,
        referrer: Option<&str>,
    ) -> Result<String, TradeError> {
        self.execute(TradeDirection::Buy, coin, amount_eth, min_amount_out, referrer)
            .await
    }

    pub async fn sell(
        &self,
        coin: &str,
        token_amount: &str,
        min_amount_out: Option<BigUint>,
        referrer: Option<&str>,
    ) -> Result<String, TradeError> {
        self.execute(TradeDirection::Sell, coin, token_amount, min_amount_out, referrer)
            .await
    }

    async fn execute(
        &self,
        direction: TradeDirection,
        coin: &str,
        amount: &str,
        min_amount_out: Option<BigUint>,
        referrer: Option<&str>,
    ) -> Result<String, TradeError> {
        let target = validate_address(coin)?;
        let order_size = parse_positive_amount(amount, ETHER_DECIMALS)?;
        let referrer = referrer.map(validate_address).transpose()?;
        let recipient = require_account(&self.wallet).await?;

        let min_amount_out = match min_amount_out {
            Some(min) => min,
            None => self.default_min_out(direction, &target, &order_size).await,
        };

        let params = TradeParams {
            direction,
            target: target.clone(),
            recipient,
            order_size,
            min_amount_out,
            referrer,
        };
        match self.sdk.trade(params).await {
            Ok(hash) => {
                info!("Submitted {} of {}: {}", direction, target, hash);
                self.notifier.success(
                    "Transaction submitted",
                    format!("{} order sent: {}", direction, hash),
                );
                Ok(hash)
            }
            Err(e) => {
                error!("Could not {} {}: {}", direction, target, e);
                self.notifier
                    .error("Transaction failed", format!("Could not {} {}", direction, target));
                Err(e.into())
            }
        }
    }

    /// Simulated output minus slippage, or zero when no quote is available.
    async fn default_min_out(
        &self,
        direction: TradeDirection,
        target: &str,
        order_size: &BigUint,
    ) -> BigUint {
        let quote = match direction {
            TradeDirection::Buy => self.sdk.simulate_buy(target, order_size.clone()).await,
            TradeDirection::Sell => self.sdk.simulate_sell(target, order_size.clone()).await,
        };
        match quote {
            Ok(quote) => apply_slippage(&quote.amount_out, self.slippage_bps),
            Err(e) => {
                warn!("No quote for {} of {}, trading without minimum: {}", direction, target, e);
                BigUint::zero()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interfaces::wallet::NetworkConfig;
    use crate::services::wallet::connected_session;

    const COIN: &str = "0x4200000000000000000000000000000000000006";
    const ALICE: &str = "0x1111111111111111111111111111111111111111";
    const REFERRER: &str = "0x3333333333333333333333333333333333333333";

    fn eth(value: &str) -> BigUint {
        BigUint::parse_bytes(value.as_bytes(), 10).unwrap()
    }

    fn disconnected() -> Arc<SessionManager> {
        Arc::new(SessionManager::new(None, NetworkConfig::default()))
    }

    fn trader(sdk: MockCoinsSdk, wallet: Arc<SessionManager>) -> CoinTrader {
        CoinTrader::new(Arc::new(sdk), wallet, Notifier::new(), 500)
    }

    #[tokio::test]
    async fn test_quote_without_wallet() {
        let mut sdk = MockCoinsSdk::new();
        sdk.expect_simulate_buy()
            .withf(|target: &str, size: &BigUint| {
                target == COIN && *size == eth("10000000000000000")
            })
            .times(1)
            .returning(|_, size| {
                Ok(TradeQuote {
                    order_size: size,
                    amount_out: eth("2000"),
                })
            });

        let quote = trader(sdk, disconnected())
            .quote_buy(COIN, "0.01")
            .await
            .unwrap();

        assert_eq!(quote.amount_out, eth("2000"));
    }

    #[tokio::test]
    async fn test_reject_invalid_input_before_sdk() {
        let mut sdk = MockCoinsSdk::new();
        sdk.expect_simulate_sell().never();
        sdk.expect_trade().never();
        let trader = trader(sdk, connected_session(ALICE).await);

        assert!(matches!(
            trader.quote_sell("not-an-address", "1").await,
            Err(TradeError::Validation(ValidationError::InvalidAddress(_)))
        ));
        assert!(matches!(
            trader.sell(COIN, "0", None, None).await,
            Err(TradeError::Validation(ValidationError::NonPositiveAmount(_)))
        ));
        assert!(matches!(
            trader.sell(COIN, "abc", None, None).await,
            Err(TradeError::Validation(ValidationError::InvalidAmount(_)))
        ));
    }

    #[tokio::test]
    async fn test_require_wallet_to_execute() {
        let mut sdk = MockCoinsSdk::new();
        sdk.expect_trade().never();

        let result = trader(sdk, disconnected()).buy(COIN, "0.01", None, None).await;

        assert!(matches!(result, Err(TradeError::WalletNotConnected)));
    }

    #[tokio::test]
    async fn test_apply_slippage_to_quote() {
        let mut sdk = MockCoinsSdk::new();
        sdk.expect_simulate_buy().times(1).returning(|_, size| {
            Ok(TradeQuote {
                order_size: size,
                amount_out: eth("2000"),
            })
        });
        sdk.expect_trade()
            .withf(|params: &TradeParams| {
                params.direction == TradeDirection::Buy
                    && params.target == COIN
                    && params.recipient == ALICE
                    && params.order_size == eth("10000000000000000")
                    && params.min_amount_out == eth("1900")
            })
            .times(1)
            .returning(|_| Ok("0xhash".to_string()));

        let hash = trader(sdk, connected_session(ALICE).await)
            .buy(COIN, "0.01", None, None)
            .await
            .unwrap();

        assert_eq!(hash, "0xhash");
    }

    #[tokio::test]
    async fn test_trade_without_minimum_when_quote_fails() {
        let mut sdk = MockCoinsSdk::new();
        sdk.expect_simulate_sell()
            .times(1)
            .returning(|_, _| Err(ProviderError::RpcError("pool not found".to_string())));
        sdk.expect_trade()
            .withf(|params: &TradeParams| {
                params.direction == TradeDirection::Sell && params.min_amount_out.is_zero()
            })
            .times(1)
            .returning(|_| Ok("0xsell".to_string()));

        let hash = trader(sdk, connected_session(ALICE).await)
            .sell(COIN, "150", None, None)
            .await
            .unwrap();

        assert_eq!(hash, "0xsell");
    }

    #[tokio::test]
    async fn test_pass_referrer_through() {
        let mut sdk = MockCoinsSdk::new();
        sdk.expect_simulate_buy().never();
        sdk.expect_trade()
            .withf(|params: &TradeParams| params.referrer.as_deref() == Some(REFERRER))
            .times(1)
            .returning(|_| Ok("0xref".to_string()));
        let trader = trader(sdk, connected_session(ALICE).await);

        let hash = trader
            .buy(COIN, "0.01", Some(eth("1")), Some(REFERRER))
            .await
            .unwrap();
        assert_eq!(hash, "0xref");

        assert!(matches!(
            trader.sell(COIN, "1", Some(eth("1")), Some("0xnope")).await,
            Err(TradeError::Validation(ValidationError::InvalidAddress(_)))
        ));
    }

    #[tokio::test]
    async fn test_honour_explicit_minimum() {
        let mut sdk = MockCoinsSdk::new();
        sdk.expect_simulate_buy().never();
        sdk.expect_trade()
            .withf(|params: &TradeParams| params.min_amount_out == eth("42"))
            .times(1)
            .returning(|_| Err(ProviderError::RpcError("slippage exceeded".to_string())));

        let result = trader(sdk, connected_session(ALICE).await)
            .buy(COIN, "1", Some(eth("42")), None)
            .await;

        assert!(matches!(result, Err(TradeError::Provider(_))));
    }
}
