//! The explore API has no losers list. It is approximated from one
//! over-fetched gainers page, so coins outside that page are never seen.

use std::cmp::Ordering;

use crate::interfaces::coin::Coin;

const OVERFETCH_FACTOR: usize = 5;
const MAX_PAGE_SIZE: usize = 100;

/// Size of the gainers page fetched to derive `count` losers.
pub fn overfetch_count(count: usize) -> usize {
    count
        .saturating_mul(OVERFETCH_FACTOR)
        .min(MAX_PAGE_SIZE)
        .max(count)
}

/// Keeps coins with a negative 24h change, most negative first.
pub fn derive_top_losers(coins: Vec<Coin>, count: usize) -> Vec<Coin> {
    let mut losers: Vec<(f64, Coin)> = coins
        .into_iter()
        .filter_map(|coin| {
            let change = coin.change_24h.value()?;
            (change < 0.0).then_some((change, coin))
        })
        .collect();

    losers.sort_by(|(a, _), (b, _)| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    losers.truncate(count);
    losers.into_iter().map(|(_, coin)| coin).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interfaces::coin::{CoinNode, Numeric};

    fn coin(symbol: &str, change: Option<&str>) -> Coin {
        Coin::from(CoinNode {
            symbol: Some(symbol.to_string()),
            price_change_24h: change.map(|c| Numeric::Text(c.to_string())),
            ..Default::default()
        })
    }

    #[test]
    fn test_keep_negative_changes_in_ascending_order() {
        let coins = vec![
            coin("A", Some("12.5")),
            coin("B", Some("-2")),
            coin("C", None),
            coin("D", Some("-40.1")),
            coin("E", Some("0")),
            coin("F", Some("-7")),
        ];

        let losers = derive_top_losers(coins, 2);

        let symbols: Vec<&str> = losers.iter().map(|c| c.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["D", "F"]);
        for pair in losers.windows(2) {
            assert!(pair[0].change_24h.value() <= pair[1].change_24h.value());
        }
        assert!(losers
            .iter()
            .all(|c| c.change_24h.value().is_some_and(|v| v < 0.0)));
    }

    #[test]
    fn test_return_fewer_when_page_has_few_losers() {
        let losers = derive_top_losers(vec![coin("A", Some("1")), coin("B", Some("-1"))], 10);
        assert_eq!(losers.len(), 1);
        assert!(derive_top_losers(Vec::new(), 10).is_empty());
    }

    #[test]
    fn test_cap_overfetch() {
        assert_eq!(overfetch_count(10), 50);
        assert_eq!(overfetch_count(20), 100);
        assert_eq!(overfetch_count(50), 100);
        assert_eq!(overfetch_count(150), 150);
        assert_eq!(overfetch_count(0), 0);
    }
}
