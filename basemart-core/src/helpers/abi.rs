use num_bigint::BigUint;

/// `name()`
pub const NAME_SELECTOR: &str = "0x06fdde03";
/// `symbol()`
pub const SYMBOL_SELECTOR: &str = "0x95d89b41";
/// `totalSupply()`
pub const TOTAL_SUPPLY_SELECTOR: &str = "0x18160ddd";

const WORD: usize = 32;

pub fn decode_hex(data: &str) -> Option<Vec<u8>> {
    let digits = data.strip_prefix("0x").unwrap_or(data);
    if !digits.is_ascii() || digits.len() % 2 != 0 {
        return None;
    }
    (0..digits.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&digits[i..i + 2], 16).ok())
        .collect()
}

fn word_to_usize(word: &[u8]) -> Option<usize> {
    let (high, low) = word.split_at(WORD - 8);
    if high.iter().any(|b| *b != 0) {
        return None;
    }
    let mut buf = [0u8; 8];
    buf.copy_from_slice(low);
    usize::try_from(u64::from_be_bytes(buf)).ok()
}

/// Decodes the return data of a `string` getter. Legacy tokens that return a
/// `bytes32` are accepted too, trailing zero bytes trimmed.
pub fn decode_abi_string(data: &str) -> Option<String> {
    let bytes = decode_hex(data)?;
    if bytes.len() == WORD {
        let end = bytes.iter().position(|b| *b == 0).unwrap_or(WORD);
        return String::from_utf8(bytes[..end].to_vec()).ok();
    }
    if bytes.len() < 2 * WORD {
        return None;
    }

    let offset = word_to_usize(&bytes[..WORD])?;
    let len_end = offset.checked_add(WORD)?;
    let length = word_to_usize(bytes.get(offset..len_end)?)?;
    let content = bytes.get(len_end..len_end.checked_add(length)?)?;
    String::from_utf8(content.to_vec()).ok()
}

/// Decodes a single `uint256` return value.
pub fn decode_abi_uint(data: &str) -> Option<BigUint> {
    let bytes = decode_hex(data)?;
    if bytes.is_empty() || bytes.len() > WORD {
        return None;
    }
    Some(BigUint::from_bytes_be(&bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_hex() {
        assert_eq!(decode_hex("0x0aff"), Some(vec![0x0a, 0xff]));
        assert_eq!(decode_hex(""), Some(vec![]));
        assert_eq!(decode_hex("0xabc"), None);
        assert_eq!(decode_hex("0xzz"), None);
    }

    #[test]
    fn test_decode_dynamic_string() {
        let data = "0x\
            0000000000000000000000000000000000000000000000000000000000000020\
            000000000000000000000000000000000000000000000000000000000000000a\
            42617365642046726f6700000000000000000000000000000000000000000000";
        assert_eq!(decode_abi_string(data).as_deref(), Some("Based Frog"));

        let data = "0x\
            0000000000000000000000000000000000000000000000000000000000000020\
            0000000000000000000000000000000000000000000000000000000000000004\
            46524f4700000000000000000000000000000000000000000000000000000000";
        assert_eq!(decode_abi_string(data).as_deref(), Some("FROG"));
    }

    #[test]
    fn test_decode_bytes32_string() {
        let data = "0x4d4b520000000000000000000000000000000000000000000000000000000000";
        assert_eq!(decode_abi_string(data).as_deref(), Some("MKR"));
    }

    #[test]
    fn test_reject_truncated_string() {
        let data = "0x\
            0000000000000000000000000000000000000000000000000000000000000020\
            00000000000000000000000000000000000000000000000000000000000000ff\
            46524f4700000000000000000000000000000000000000000000000000000000";
        assert_eq!(decode_abi_string(data), None);
        assert_eq!(decode_abi_string("0x"), None);
    }

    #[test]
    fn test_decode_uint() {
        assert_eq!(
            decode_abi_uint("0x0000000000000000000000000000000000000000033b2e3c9fd0803ce8000000"),
            BigUint::parse_bytes(b"1000000000000000000000000000", 10)
        );
        assert_eq!(decode_abi_uint("0x"), None);
        assert_eq!(decode_abi_uint("0x0000000000000000000000000000000000000000033b2e3c9fd0803ce800000000"), None);
    }
}
