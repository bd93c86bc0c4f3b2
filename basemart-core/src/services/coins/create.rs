use std::sync::Arc;

use num_bigint::BigUint;
use tracing::{error, info};

use super::trade::{require_account, CoinsSdk, CreateCoinParams, DeployedCoin, TradeError};
use super::ProviderError;
use crate::helpers::validation::{
    parse_wei, validate_address, validate_coin_name, validate_coin_symbol, validate_metadata_uri,
};
use crate::services::notify::Notifier;
use crate::services::wallet::SessionManager;

/// Raw values of the create-coin form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoinDraft {
    pub name: String,
    pub symbol: String,
    pub uri: String,
    /// Defaults to the connected account.
    pub payout_recipient: Option<String>,
    /// Whole wei; empty means no initial purchase.
    pub initial_purchase_wei: String,
}

pub struct CoinCreator {
    sdk: Arc<dyn CoinsSdk>,
    wallet: Arc<SessionManager>,
    notifier: Notifier,
}

impl CoinCreator {
    pub fn new(sdk: Arc<dyn CoinsSdk>, wallet: Arc<SessionManager>, notifier: Notifier) -> Self {
        Self {
            sdk,
            wallet,
            notifier,
        }
    }

    pub async fn deploy_coin(&self, draft: CoinDraft) -> Result<DeployedCoin, TradeError> {
        let name = validate_coin_name(&draft.name)?;
        let symbol = validate_coin_symbol(&draft.symbol)?;
        let uri = validate_metadata_uri(&draft.uri)?;
        let payout_recipient = draft
            .payout_recipient
            .as_deref()
            .filter(|recipient| !recipient.trim().is_empty())
            .map(validate_address)
            .transpose()?;
        let initial_purchase_wei = match draft.initial_purchase_wei.trim() {
            "" => BigUint::default(),
            wei => parse_wei(wei)?,
        };

        let account = require_account(&self.wallet).await?;
        let params = CreateCoinParams {
            name,
            symbol,
            uri,
            payout_recipient: payout_recipient.unwrap_or(account),
            initial_purchase_wei,
        };

        let symbol = params.symbol.clone();
        let deployed = self.report(
            "Coin created",
            "Could not create coin",
            self.sdk.create_coin(params).await,
            |coin| format!("Deployed at {}", coin.address),
        )?;
        info!("Deployed {} at {} ({})", symbol, deployed.address, deployed.hash);
        Ok(deployed)
    }

    pub async fn update_metadata(&self, coin: &str, uri: &str) -> Result<String, TradeError> {
        let coin = validate_address(coin)?;
        let uri = validate_metadata_uri(uri)?;
        require_account(&self.wallet).await?;

        self.report(
            "Metadata updated",
            "Could not update metadata",
            self.sdk.update_metadata(&coin, &uri).await,
            |hash| format!("Transaction {}", hash),
        )
    }

    pub async fn update_payout_recipient(
        &self,
        coin: &str,
        recipient: &str,
    ) -> Result<String, TradeError> {
        let coin = validate_address(coin)?;
        let recipient = validate_address(recipient)?;
        require_account(&self.wallet).await?;

        self.report(
            "Payout recipient updated",
            "Could not update payout recipient",
            self.sdk.update_payout_recipient(&coin, &recipient).await,
            |hash| format!("Transaction {}", hash),
        )
    }

    fn report<T>(
        &self,
        success: &str,
        failure: &str,
        result: Result<T, ProviderError>,
        describe: impl FnOnce(&T) -> String,
    ) -> Result<T, TradeError> {
        match result {
            Ok(value) => {
                self.notifier.success(success, describe(&value));
                Ok(value)
            }
            Err(e) => {
                error!("{}: {}", failure, e);
                self.notifier.error(failure, e.to_string());
                Err(e.into())
            }
        }
    }
}
