//! Client core for a coin and NFT marketplace on Base.
//!
//! The crate holds everything a UI host needs besides rendering: the wallet
//! session, the coin data gateway with its fallback cascade, the NFT catalog
//! and the small services around them (credentials, notices, request
//! ordering). [`context::MarketContext`] wires them together.

pub mod context;
pub mod helpers;
pub mod interfaces;
pub mod services;

pub use context::MarketContext;
pub use helpers::app_config::AppConfig;
