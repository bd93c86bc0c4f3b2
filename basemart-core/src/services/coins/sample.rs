//! Last step of the cascade: a small deterministic coin set so the explore
//! page always has something to show.

use std::cmp::Ordering;

use async_trait::async_trait;
use tracing::debug;

use super::{CoinSource, ProviderError};
use crate::interfaces::coin::{CoinList, CoinNode, CoinPage, Numeric};

const SAMPLE_SIZE: usize = 24;
const NAMES: [&str; 8] = [
    "Harbor", "Lumen", "Drift", "Pixel", "Tide", "Ember", "Orbit", "Moss",
];
const SUFFIXES: [&str; 3] = ["Coin", "Club", "Works"];

#[derive(Debug, Clone)]
pub struct SampleCoinSource {
    coins: Vec<CoinNode>,
}

impl Default for SampleCoinSource {
    fn default() -> Self {
        Self::new()
    }
}

fn sample_coin(index: usize) -> CoinNode {
    let base = NAMES[index % NAMES.len()];
    let suffix = SUFFIXES[index / NAMES.len() % SUFFIXES.len()];
    // Spread values so every list has a distinct order.
    let seed = (index * 37 + 11) % 101;
    let change = seed as f64 / 2.0 - 25.0;
    let market_cap = 10_000 + ((index * 7_919) % 997) * 1_000;
    let volume = 500 + ((index * 4_001) % 503) * 100;

    CoinNode {
        address: format!("0x{:040x}", 0xba5e_0000 + index),
        name: Some(format!("{} {}", base, suffix)),
        symbol: Some(format!("{}{}", base[..3].to_uppercase(), index)),
        description: Some(format!("Sample coin #{} for offline browsing", index)),
        image_url: None,
        media_content: None,
        total_supply: Some(Numeric::Text("1000000000".to_string())),
        market_cap: Some(Numeric::Text(market_cap.to_string())),
        volume_24h: Some(Numeric::Text(volume.to_string())),
        price_change_24h: (index % 5 != 4).then(|| Numeric::Number(change)),
        market_cap_delta_24h: Some(Numeric::Number(change / 2.0)),
        created_at: Some(format!("2025-{:02}-{:02}T12:00:00Z", index % 12 + 1, index % 28 + 1)),
        creator_address: Some(format!("0x{:040x}", 0xc0ffee + index % 4)),
        payout_recipient: None,
        unique_holders: Some((seed * 13) as u64),
    }
}

fn metric(field: &Option<Numeric>) -> f64 {
    field.as_ref().and_then(Numeric::as_f64).unwrap_or(f64::MIN)
}

fn descending(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

impl SampleCoinSource {
    pub fn new() -> Self {
        Self {
            coins: (0..SAMPLE_SIZE).map(sample_coin).collect(),
        }
    }

    fn ranked(&self, list: CoinList) -> Vec<CoinNode> {
        let mut coins = self.coins.clone();
        match list {
            CoinList::TopGainers | CoinList::TopLosers => coins.sort_by(|a, b| {
                descending(
                    metric(&a.price_change_24h).max(metric(&a.market_cap_delta_24h)),
                    metric(&b.price_change_24h).max(metric(&b.market_cap_delta_24h)),
                )
            }),
            CoinList::TopVolume => {
                coins.sort_by(|a, b| descending(metric(&a.volume_24h), metric(&b.volume_24h)))
            }
            CoinList::MostValuable => {
                coins.sort_by(|a, b| descending(metric(&a.market_cap), metric(&b.market_cap)))
            }
            CoinList::New => coins.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            CoinList::LastTraded => coins.reverse(),
        }
        coins
    }
}

#[async_trait]
impl CoinSource for SampleCoinSource {
    fn name(&self) -> &'static str {
        "sample"
    }

    async fn list_coins(
        &self,
        list: CoinList,
        count: usize,
        after: Option<String>,
    ) -> Result<CoinPage, ProviderError> {
        if list == CoinList::TopLosers {
            return Err(ProviderError::Unsupported {
                provider: self.name().to_string(),
                what: list.label().to_string(),
            });
        }

        // Cursors issued by an upstream source mean nothing here; restart
        // from the top instead of failing the last step of the cascade.
        let offset = match after.as_deref().map(str::parse::<usize>) {
            Some(Ok(offset)) => offset,
            Some(Err(_)) => {
                debug!("Ignoring foreign cursor {:?}", after);
                0
            }
            None => 0,
        };
        let ranked = self.ranked(list);
        let end = offset.saturating_add(count).min(ranked.len());
        let coins = ranked.get(offset..end).map(<[CoinNode]>::to_vec).unwrap_or_default();

        Ok(CoinPage {
            coins,
            next_cursor: (end < ranked.len()).then(|| end.to_string()),
        })
    }

    async fn coin_details(&self, address: &str) -> Result<Option<CoinNode>, ProviderError> {
        Ok(self
            .coins
            .iter()
            .find(|coin| coin.address.eq_ignore_ascii_case(address))
            .cloned())
    }
}
