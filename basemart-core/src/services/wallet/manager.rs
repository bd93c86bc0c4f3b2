use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use num_traits::ToPrimitive;
use serde_json::{json, Value};
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, RwLock};
use tracing::{debug, error, info, warn};

use super::events::EventSubscription;
use super::WalletProvider;
use crate::helpers::units::{format_balance, parse_hex_quantity};
use crate::interfaces::wallet::{
    NetworkConfig, ProviderEvent, RpcError, SessionEvent, WalletError, WalletSession,
};

const SESSION_EVENT_CAPACITY: usize = 32;

/// Owns the wallet session and drives connect, restore and disconnect
/// against the injected provider.
pub struct SessionManager {
    provider: Option<Arc<dyn WalletProvider>>,
    network: NetworkConfig,
    session: Arc<RwLock<WalletSession>>,
    connecting: AtomicBool,
    events: broadcast::Sender<SessionEvent>,
}

struct ConnectingGuard<'a>(&'a AtomicBool);

impl Drop for ConnectingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl SessionManager {
    pub fn new(provider: Option<Arc<dyn WalletProvider>>, network: NetworkConfig) -> Self {
        let (events, _) = broadcast::channel(SESSION_EVENT_CAPACITY);
        Self {
            provider,
            network,
            session: Arc::new(RwLock::new(WalletSession::disconnected())),
            connecting: AtomicBool::new(false),
            events,
        }
    }

    pub fn has_provider(&self) -> bool {
        self.provider.is_some()
    }

    pub fn network(&self) -> &NetworkConfig {
        &self.network
    }

    pub async fn session(&self) -> WalletSession {
        self.session.read().await.clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    pub fn is_connecting(&self) -> bool {
        self.connecting.load(Ordering::SeqCst)
    }

    /// Explicit connect: request accounts, move the wallet to the target
    /// network, read the balance, then commit everything at once. The
    /// session is left untouched on any failure.
    pub async fn connect(&self) -> Result<WalletSession, WalletError> {
        let provider = self.provider.as_ref().ok_or(WalletError::NoWallet)?;
        if self.connecting.swap(true, Ordering::SeqCst) {
            return Err(WalletError::ConnectPending);
        }
        let _guard = ConnectingGuard(&self.connecting);

        let accounts = provider
            .request("eth_requestAccounts", json!([]))
            .await
            .map_err(|e| {
                warn!("eth_requestAccounts failed: {}", e);
                WalletError::from(e)
            })?;
        let address = first_account(&accounts)?.ok_or(WalletError::NoAccounts)?;

        let chain_id = self.ensure_network(provider.as_ref()).await?;
        let balance = self.fetch_balance(provider.as_ref(), &address).await?;

        let session = WalletSession::connected(address.clone(), chain_id, Some(balance));
        *self.session.write().await = session.clone();
        info!("Wallet connected: {} on chain {}", address, chain_id);
        self.publish(SessionEvent::Connected { address, chain_id });

        Ok(session)
    }

    /// Page-load path: adopts an already authorized account without
    /// prompting and without switching networks. Returns whether a session
    /// was restored.
    pub async fn restore(&self) -> Result<bool, WalletError> {
        let Some(provider) = self.provider.as_ref() else {
            debug!("No wallet provider, nothing to restore");
            return Ok(false);
        };

        let accounts = provider.request("eth_accounts", json!([])).await?;
        let Some(address) = first_account(&accounts)? else {
            debug!("Wallet has no authorized account");
            return Ok(false);
        };

        let chain_id = read_chain_id(provider.as_ref()).await?;
        if chain_id != self.network.chain_id {
            warn!(
                "Restored wallet is on chain {} instead of {}",
                chain_id, self.network.chain_id
            );
        }
        let balance = match self.fetch_balance(provider.as_ref(), &address).await {
            Ok(balance) => Some(balance),
            Err(e) => {
                warn!("Could not read balance of {}: {}", address, e);
                None
            }
        };

        *self.session.write().await = WalletSession::connected(address.clone(), chain_id, balance);
        info!("Wallet session restored: {} on chain {}", address, chain_id);
        self.publish(SessionEvent::Connected { address, chain_id });

        Ok(true)
    }

    pub async fn disconnect(&self) {
        *self.session.write().await = WalletSession::disconnected();
        info!("Wallet disconnected");
        self.publish(SessionEvent::Disconnected);
    }

    /// Re-reads the balance of the connected account. `Ok(None)` when no
    /// account is connected.
    pub async fn refresh_balance(&self) -> Result<Option<String>, WalletError> {
        let provider = self.provider.as_ref().ok_or(WalletError::NoWallet)?;
        let Some(address) = self.session.read().await.address.clone() else {
            return Ok(None);
        };

        let balance = self.fetch_balance(provider.as_ref(), &address).await?;
        {
            let mut session = self.session.write().await;
            if session.address.as_deref() != Some(address.as_str()) {
                debug!("Account changed while reading balance, dropping result");
                return Ok(None);
            }
            session.balance_display = Some(balance.clone());
        }
        self.publish(SessionEvent::BalanceUpdated {
            balance: Some(balance.clone()),
        });

        Ok(Some(balance))
    }

    pub async fn handle_provider_event(&self, event: ProviderEvent) {
        match event {
            ProviderEvent::AccountsChanged(accounts) => self.on_accounts_changed(accounts).await,
            ProviderEvent::ChainChanged(chain) => {
                let chain_id = parse_hex_quantity(&chain).and_then(|id| id.to_u64());
                warn!("Wallet switched to chain {}, reload required", chain);
                self.publish(SessionEvent::ReloadRequired { chain_id });
            }
        }
    }

    /// Spawns the task forwarding provider events into this manager.
    pub fn watch(self: &Arc<Self>) -> Result<EventSubscription, WalletError> {
        let provider = self.provider.as_ref().ok_or(WalletError::NoWallet)?;
        let mut events = provider.events();
        let manager = Arc::clone(self);

        let handle = tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => manager.handle_provider_event(event).await,
                    Err(RecvError::Lagged(skipped)) => {
                        warn!("Missed {} wallet events", skipped);
                    }
                    Err(RecvError::Closed) => {
                        debug!("Wallet event stream closed");
                        break;
                    }
                }
            }
        });

        Ok(EventSubscription::new(handle))
    }

    async fn on_accounts_changed(&self, accounts: Vec<String>) {
        let current = self.session().await;
        let Some(next) = accounts.into_iter().next() else {
            if current.connected {
                info!("Wallet revoked all accounts");
                self.disconnect().await;
            }
            return;
        };
        if !current.connected {
            debug!("Ignoring account change while disconnected");
            return;
        }
        if current
            .address
            .as_deref()
            .is_some_and(|address| address.eq_ignore_ascii_case(&next))
        {
            return;
        }

        let balance = match &self.provider {
            Some(provider) => match self.fetch_balance(provider.as_ref(), &next).await {
                Ok(balance) => Some(balance),
                Err(e) => {
                    warn!("Could not read balance of {}: {}", next, e);
                    None
                }
            },
            None => None,
        };

        {
            let mut session = self.session.write().await;
            if !session.connected {
                return;
            }
            session.address = Some(next.clone());
            session.balance_display = balance.clone();
        }
        info!("Active account changed to {}", next);
        self.publish(SessionEvent::AccountChanged { address: next });
        self.publish(SessionEvent::BalanceUpdated { balance });
    }

    /// Makes sure the wallet is on the target chain and returns its id.
    async fn ensure_network(&self, provider: &dyn WalletProvider) -> Result<u64, WalletError> {
        let current = read_chain_id(provider).await?;
        if current == self.network.chain_id {
            return Ok(current);
        }

        info!(
            "Wallet on chain {}, switching to {} ({})",
            current, self.network.chain_id, self.network.chain_name
        );
        match provider
            .request("wallet_switchEthereumChain", self.network.switch_chain_params())
            .await
        {
            Ok(_) => {}
            Err(e) if e.is_unrecognized_chain() => {
                info!("Chain {} unknown to the wallet, adding it", self.network.chain_id);
                provider
                    .request("wallet_addEthereumChain", self.network.add_chain_params())
                    .await
                    .map_err(|e| self.switch_error(e))?;
                provider
                    .request("wallet_switchEthereumChain", self.network.switch_chain_params())
                    .await
                    .map_err(|e| self.switch_error(e))?;
            }
            Err(e) => return Err(self.switch_error(e)),
        }

        Ok(self.network.chain_id)
    }

    async fn fetch_balance(
        &self,
        provider: &dyn WalletProvider,
        address: &str,
    ) -> Result<String, WalletError> {
        let result = provider
            .request("eth_getBalance", json!([address, "latest"]))
            .await?;
        let wei = result
            .as_str()
            .and_then(parse_hex_quantity)
            .ok_or_else(|| WalletError::InvalidResponse(format!("balance {}", result)))?;

        let currency = &self.network.native_currency;
        Ok(format_balance(&wei, currency.decimals, &currency.symbol))
    }

    fn switch_error(&self, e: RpcError) -> WalletError {
        if e.is_user_rejection() {
            return WalletError::UserRejected(e.message);
        }
        error!("Network switch failed: {}", e);
        WalletError::NetworkSwitch {
            chain_id: self.network.chain_id,
            reason: e.message,
        }
    }

    fn publish(&self, event: SessionEvent) {
        if self.events.send(event).is_err() {
            debug!("No session event subscriber");
        }
    }
}

fn first_account(accounts: &Value) -> Result<Option<String>, WalletError> {
    let list = accounts
        .as_array()
        .ok_or_else(|| WalletError::InvalidResponse(format!("accounts {}", accounts)))?;
    match list.first() {
        None => Ok(None),
        Some(Value::String(address)) => Ok(Some(address.clone())),
        Some(other) => Err(WalletError::InvalidResponse(format!("account {}", other))),
    }
}

async fn read_chain_id(provider: &dyn WalletProvider) -> Result<u64, WalletError> {
    let result = provider.request("eth_chainId", json!([])).await?;
    result
        .as_str()
        .and_then(parse_hex_quantity)
        .and_then(|id| id.to_u64())
        .ok_or_else(|| WalletError::InvalidResponse(format!("chain id {}", result)))
}
