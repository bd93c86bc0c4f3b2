use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::helpers::units::to_hex_quantity;

/// EIP-1193 "User Rejected Request".
pub const USER_REJECTED_REQUEST: i64 = 4001;
/// EIP-3326 "Unrecognized chain ID"; the wallet needs `wallet_addEthereumChain`.
pub const UNRECOGNIZED_CHAIN: i64 = 4902;

const BASE_CHAIN_ID: u64 = 8453;

/// What the UI knows about the connected wallet. Replaced as a whole on every
/// transition so a partially connected state is never observable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WalletSession {
    pub connected: bool,
    pub address: Option<String>,
    pub chain_id: Option<u64>,
    pub balance_display: Option<String>,
}

impl WalletSession {
    pub fn connected(address: String, chain_id: u64, balance_display: Option<String>) -> Self {
        Self {
            connected: true,
            address: Some(address),
            chain_id: Some(chain_id),
            balance_display,
        }
    }

    pub fn disconnected() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u32,
}

/// Target network of the marketplace, also the payload of
/// `wallet_addEthereumChain`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    pub chain_id: u64,
    pub chain_name: String,
    pub native_currency: NativeCurrency,
    pub rpc_urls: Vec<String>,
    pub block_explorer_urls: Vec<String>,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            chain_id: BASE_CHAIN_ID,
            chain_name: "Base".to_string(),
            native_currency: NativeCurrency {
                name: "Ether".to_string(),
                symbol: "ETH".to_string(),
                decimals: 18,
            },
            rpc_urls: vec!["https://mainnet.base.org".to_string()],
            block_explorer_urls: vec!["https://basescan.org".to_string()],
        }
    }
}

impl NetworkConfig {
    pub fn chain_id_hex(&self) -> String {
        to_hex_quantity(self.chain_id)
    }

    pub fn primary_rpc_url(&self) -> Option<&str> {
        self.rpc_urls.first().map(String::as_str)
    }

    /// Params of `wallet_switchEthereumChain`.
    pub fn switch_chain_params(&self) -> Value {
        json!([{ "chainId": self.chain_id_hex() }])
    }

    /// Params of `wallet_addEthereumChain` (EIP-3085).
    pub fn add_chain_params(&self) -> Value {
        json!([{
            "chainId": self.chain_id_hex(),
            "chainName": self.chain_name,
            "nativeCurrency": {
                "name": self.native_currency.name,
                "symbol": self.native_currency.symbol,
                "decimals": self.native_currency.decimals,
            },
            "rpcUrls": self.rpc_urls,
            "blockExplorerUrls": self.block_explorer_urls,
        }])
    }
}

/// Events pushed by the injected provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderEvent {
    AccountsChanged(Vec<String>),
    /// Hex chain id, as emitted by `chainChanged`.
    ChainChanged(String),
}

/// Events the session manager publishes to the UI layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    Connected { address: String, chain_id: u64 },
    AccountChanged { address: String },
    BalanceUpdated { balance: Option<String> },
    Disconnected,
    /// The active chain changed under us; the host must rebuild its state.
    ReloadRequired { chain_id: Option<u64> },
}

/// Error object returned by a provider `request`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
#[error("RPC error {code}: {message}")]
pub struct RpcError {
    pub code: i64,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl RpcError {
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            data: None,
        }
    }

    pub fn is_user_rejection(&self) -> bool {
        self.code == USER_REJECTED_REQUEST
    }

    /// Some wallets wrap 4902 inside a generic internal error.
    pub fn is_unrecognized_chain(&self) -> bool {
        if self.code == UNRECOGNIZED_CHAIN {
            return true;
        }
        let nested = self
            .data
            .as_ref()
            .and_then(|data| data.pointer("/originalError/code"))
            .and_then(Value::as_i64);
        nested == Some(UNRECOGNIZED_CHAIN)
            || self.message.to_lowercase().contains("unrecognized chain")
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum WalletError {
    #[error("No wallet provider detected")]
    NoWallet,
    #[error("Request rejected by user: {0}")]
    UserRejected(String),
    #[error("Wallet returned no accounts")]
    NoAccounts,
    #[error("A connection request is already pending")]
    ConnectPending,
    #[error("Could not switch to chain {chain_id}: {reason}")]
    NetworkSwitch { chain_id: u64, reason: String },
    #[error("Wallet provider error: {0}")]
    Rpc(RpcError),
    #[error("Unexpected provider response: {0}")]
    InvalidResponse(String),
}

impl From<RpcError> for WalletError {
    fn from(e: RpcError) -> Self {
        if e.is_user_rejection() {
            WalletError::UserRejected(e.message)
        } else {
            WalletError::Rpc(e)
        }
    }
}
