//! Field normalization applied once, where coins leave the gateway.

use crate::interfaces::coin::{Coin, CoinNode, Numeric, PriceChange};

const UNNAMED_COIN: &str = "Unnamed Coin";

fn numeric(field: Option<&Numeric>) -> Option<f64> {
    // Anything that rounds to zero at two decimals is zero, so it never
    // renders as "-0.00%" with a negative tone.
    field
        .and_then(Numeric::as_f64)
        .map(|v| if (v * 100.0).round() == 0.0 { 0.0 } else { v })
}

/// 24h change shown for a coin: `priceChange24h` when numeric, else
/// `marketCapDelta24h` when numeric, else unavailable.
pub fn resolve_price_change(
    price_change_24h: Option<&Numeric>,
    market_cap_delta_24h: Option<&Numeric>,
) -> PriceChange {
    numeric(price_change_24h)
        .or_else(|| numeric(market_cap_delta_24h))
        .map(PriceChange::Percent)
        .unwrap_or(PriceChange::Unavailable)
}

pub fn get_price_change(node: &CoinNode) -> PriceChange {
    resolve_price_change(
        node.price_change_24h.as_ref(),
        node.market_cap_delta_24h.as_ref(),
    )
}

fn preview_image(node: &CoinNode) -> Option<String> {
    let preview = node.media_content.as_ref()?.preview_image.as_ref()?;
    preview.medium.clone().or_else(|| preview.small.clone())
}

impl From<CoinNode> for Coin {
    fn from(node: CoinNode) -> Self {
        let change_24h = get_price_change(&node);
        let image_url = node
            .image_url
            .clone()
            .filter(|url| !url.is_empty())
            .or_else(|| preview_image(&node));

        Coin {
            address: node.address,
            name: node
                .name
                .filter(|name| !name.is_empty())
                .unwrap_or_else(|| UNNAMED_COIN.to_string()),
            symbol: node.symbol.unwrap_or_default(),
            description: node.description,
            image_url,
            total_supply: node.total_supply.map(|v| v.to_string()),
            market_cap: node.market_cap.map(|v| v.to_string()),
            volume_24h: node.volume_24h.map(|v| v.to_string()),
            price_change_24h: node.price_change_24h,
            market_cap_delta_24h: node.market_cap_delta_24h,
            created_at: node.created_at,
            creator_address: node.creator_address,
            payout_recipient: node.payout_recipient,
            unique_holders: node.unique_holders,
            change_24h,
        }
    }
}
