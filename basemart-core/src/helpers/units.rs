use num_bigint::BigUint;
use num_traits::Zero;

use super::validation::ValidationError;

/// Decimals of the native currency (ETH on Base) and of every coin.
pub const ETHER_DECIMALS: u32 = 18;

/// Precision used when a balance is shown to the user.
pub const BALANCE_DISPLAY_DECIMALS: u32 = 4;

const BPS_DENOMINATOR: u32 = 10_000;

/// Parses a JSON-RPC hex quantity (`0x1bc16d674ec80000`). `0x` alone is zero.
pub fn parse_hex_quantity(value: &str) -> Option<BigUint> {
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))?;
    if digits.is_empty() {
        return Some(BigUint::zero());
    }
    BigUint::parse_bytes(digits.as_bytes(), 16)
}

/// Encodes a chain id the way wallets expect it (`8453` -> `0x2105`).
pub fn to_hex_quantity(value: u64) -> String {
    format!("0x{:x}", value)
}

/// Formats a base-unit integer with `decimals` into a decimal string rounded
/// half-up to `precision` fractional digits.
pub fn format_units(value: &BigUint, decimals: u32, precision: u32) -> String {
    let scale = BigUint::from(10u32).pow(decimals);
    let unit = BigUint::from(10u32).pow(precision);

    let rounded = (value * &unit + &scale / 2u32) / &scale;
    let whole = &rounded / &unit;
    if precision == 0 {
        return whole.to_string();
    }
    let fraction = (&rounded % &unit).to_string();
    format!(
        "{}.{:0>width$}",
        whole,
        fraction,
        width = precision as usize
    )
}

/// Native balance as displayed in the wallet panel, e.g. `1.2500 ETH`.
pub fn format_balance(wei: &BigUint, decimals: u32, symbol: &str) -> String {
    format!(
        "{} {}",
        format_units(wei, decimals, BALANCE_DISPLAY_DECIMALS),
        symbol
    )
}

/// Parses a user supplied decimal amount (`"0.01"`) into base units.
pub fn parse_units(amount: &str, decimals: u32) -> Result<BigUint, ValidationError> {
    let trimmed = amount.trim();
    let (whole, fraction) = trimmed.split_once('.').unwrap_or((trimmed, ""));

    let all_digits = |part: &str| part.chars().all(|c| c.is_ascii_digit());
    if (whole.is_empty() && fraction.is_empty()) || !all_digits(whole) || !all_digits(fraction) {
        return Err(ValidationError::InvalidAmount(amount.to_string()));
    }
    if fraction.len() > decimals as usize {
        return Err(ValidationError::TooManyDecimals {
            value: amount.to_string(),
            decimals,
        });
    }

    let padded = format!(
        "{}{:0<width$}",
        whole,
        fraction,
        width = decimals as usize
    );
    if padded.is_empty() {
        return Ok(BigUint::zero());
    }
    BigUint::parse_bytes(padded.as_bytes(), 10)
        .ok_or_else(|| ValidationError::InvalidAmount(amount.to_string()))
}

/// Lowers `amount` by `bps` basis points; used to derive a minimum output
/// from a simulated quote.
pub fn apply_slippage(amount: &BigUint, bps: u32) -> BigUint {
    let keep = BPS_DENOMINATOR.saturating_sub(bps);
    amount * keep / BPS_DENOMINATOR
}
