//! Form-boundary validation. Everything here runs before a network call is
//! attempted.

use std::sync::OnceLock;

use num_bigint::BigUint;
use num_traits::Zero;
use regex::Regex;
use url::Url;

use super::units::parse_units;

pub const MAX_COIN_NAME_LEN: usize = 50;
pub const MAX_COIN_SYMBOL_LEN: usize = 10;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Invalid address: {0}")]
    InvalidAddress(String),
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
    #[error("Amount must be a positive number: {0}")]
    NonPositiveAmount(String),
    #[error("Amount {value} has more than {decimals} decimals")]
    TooManyDecimals { value: String, decimals: u32 },
    #[error("Coin name must be between 1 and 50 characters")]
    InvalidName,
    #[error("Coin symbol must be between 1 and 10 characters")]
    InvalidSymbol,
    #[error("Invalid metadata URI: {0}")]
    InvalidUri(String),
    #[error("Wei amount must be a whole number: {0}")]
    InvalidWei(String),
}

fn address_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^0x[0-9a-fA-F]{40}$").expect("valid address pattern"))
}

fn wei_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\d+$").expect("valid wei pattern"))
}

/// Checks a `0x`-prefixed 20-byte hex address and returns it trimmed.
pub fn validate_address(address: &str) -> Result<String, ValidationError> {
    let trimmed = address.trim();
    if address_pattern().is_match(trimmed) {
        Ok(trimmed.to_string())
    } else {
        Err(ValidationError::InvalidAddress(address.to_string()))
    }
}

/// Parses an order size and rejects zero.
pub fn parse_positive_amount(amount: &str, decimals: u32) -> Result<BigUint, ValidationError> {
    let value = parse_units(amount, decimals)?;
    if value.is_zero() {
        return Err(ValidationError::NonPositiveAmount(amount.to_string()));
    }
    Ok(value)
}

pub fn validate_coin_name(name: &str) -> Result<String, ValidationError> {
    let trimmed = name.trim();
    let len = trimmed.chars().count();
    if len == 0 || len > MAX_COIN_NAME_LEN {
        return Err(ValidationError::InvalidName);
    }
    Ok(trimmed.to_string())
}

pub fn validate_coin_symbol(symbol: &str) -> Result<String, ValidationError> {
    let trimmed = symbol.trim();
    let len = trimmed.chars().count();
    if len == 0 || len > MAX_COIN_SYMBOL_LEN {
        return Err(ValidationError::InvalidSymbol);
    }
    Ok(trimmed.to_string())
}

/// Metadata URIs may use any scheme (`ipfs://`, `https://`, `ar://`).
pub fn validate_metadata_uri(uri: &str) -> Result<String, ValidationError> {
    let trimmed = uri.trim();
    Url::parse(trimmed)
        .map(|_| trimmed.to_string())
        .map_err(|e| ValidationError::InvalidUri(format!("{}: {}", uri, e)))
}

/// Initial purchase amounts are entered directly in wei.
pub fn parse_wei(value: &str) -> Result<BigUint, ValidationError> {
    let trimmed = value.trim();
    if !wei_pattern().is_match(trimmed) {
        return Err(ValidationError::InvalidWei(value.to_string()));
    }
    BigUint::parse_bytes(trimmed.as_bytes(), 10)
        .ok_or_else(|| ValidationError::InvalidWei(value.to_string()))
}
