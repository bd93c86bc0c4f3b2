use config::{Config, ConfigError, Environment, File, FileFormat};
use serde::Deserialize;

use crate::interfaces::wallet::NetworkConfig;

// DEFAULT CONFIGURATION WHEN NO FILE IS PASSED
const EXPLORE_API_URL: &str = "https://api-sdk.zora.engineering";
const SOCIAL_API_URL: &str = "https://api.neynar.com/v2";
const CREDENTIALS_PATH: &str = "basemart-credentials.json";
const SLIPPAGE_BPS: u32 = 500;
const SEARCH_DEBOUNCE_MS: u64 = 300;
const REQUEST_TIMEOUT_SECS: u64 = 15;
const LOG_LEVEL: &str = "info";

pub fn default_explore_api_url() -> String {
    EXPLORE_API_URL.to_owned()
}

pub fn default_social_api_url() -> String {
    SOCIAL_API_URL.to_owned()
}

pub fn default_credentials_path() -> String {
    CREDENTIALS_PATH.to_owned()
}

pub fn default_slippage_bps() -> u32 {
    SLIPPAGE_BPS
}

pub fn default_search_debounce_ms() -> u64 {
    SEARCH_DEBOUNCE_MS
}

pub fn default_request_timeout_secs() -> u64 {
    REQUEST_TIMEOUT_SECS
}

pub fn default_log_level() -> String {
    LOG_LEVEL.to_owned()
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub network: NetworkConfig,
    #[serde(default = "default_explore_api_url")]
    pub explore_api_url: String,
    #[serde(default = "default_social_api_url")]
    pub social_api_url: String,
    #[serde(default = "default_credentials_path")]
    pub credentials_path: String,
    #[serde(default = "default_slippage_bps")]
    pub slippage_bps: u32,
    #[serde(default = "default_search_debounce_ms")]
    pub search_debounce_ms: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            network: NetworkConfig::default(),
            explore_api_url: default_explore_api_url(),
            social_api_url: default_social_api_url(),
            credentials_path: default_credentials_path(),
            slippage_bps: default_slippage_bps(),
            search_debounce_ms: default_search_debounce_ms(),
            request_timeout_secs: default_request_timeout_secs(),
            log_level: default_log_level(),
        }
    }
}

/// `BASEMART_` prefix, `__` between nested keys.
fn environment() -> Environment {
    Environment::with_prefix("BASEMART")
        .prefix_separator("_")
        .separator("__")
}

impl AppConfig {
    /// Loads a YAML file; `BASEMART_*` environment variables override it
    /// (`BASEMART_EXPLORE_API_URL`, `BASEMART_NETWORK__CHAIN_ID`, ...).
    pub fn load_from_file(config_path: &str) -> Result<Self, ConfigError> {
        let builder = Config::builder();
        let settings = builder
            .add_source(File::new(config_path, FileFormat::Yaml))
            .add_source(environment())
            .build()?;
        let config: AppConfig = settings.try_deserialize()?;

        Ok(config)
    }

    /// Defaults, still honouring the environment overrides.
    pub fn load_from_env() -> Result<Self, ConfigError> {
        let settings = Config::builder().add_source(environment()).build()?;
        settings.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_defaults_for_missing_keys() {
        let path = std::env::temp_dir().join(format!("basemart-config-{}.yaml", std::process::id()));
        std::fs::write(
            &path,
            "explore_api_url: http://localhost:4000\nslippage_bps: 100\nnetwork:\n  chain_id: 84532\n  chain_name: Base Sepolia\n  native_currency:\n    name: Sepolia Ether\n    symbol: ETH\n    decimals: 18\n  rpc_urls:\n    - https://sepolia.base.org\n  block_explorer_urls:\n    - https://sepolia.basescan.org\n",
        )
        .unwrap();

        let config = AppConfig::load_from_file(path.to_str().unwrap()).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.explore_api_url, "http://localhost:4000");
        assert_eq!(config.slippage_bps, 100);
        assert_eq!(config.network.chain_id, 84532);
        assert_eq!(config.network.chain_name, "Base Sepolia");
        assert_eq!(config.social_api_url, SOCIAL_API_URL);
        assert_eq!(config.search_debounce_ms, 300);
    }

    #[test]
    fn test_target_base_by_default() {
        let config = AppConfig::default();
        assert_eq!(config.network.chain_id, 8453);
        assert_eq!(config.network.chain_id_hex(), "0x2105");
        assert_eq!(config.slippage_bps, 500);
    }

    #[test]
    fn test_apply_environment_overrides() {
        std::env::set_var("BASEMART_REQUEST_TIMEOUT_SECS", "42");
        std::env::set_var("BASEMART_LOG_LEVEL", "debug");
        std::env::set_var("BASEMART_NETWORK__CHAIN_ID", "84532");

        let config = AppConfig::load_from_env().unwrap();

        assert_eq!(config.request_timeout_secs, 42);
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.network.chain_id, 84532);
        assert_eq!(config.network.chain_name, "Base");
        assert_eq!(config.explore_api_url, EXPLORE_API_URL);
    }
}
