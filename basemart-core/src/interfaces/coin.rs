use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Numeric field that upstream sends either as a JSON number or a string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Numeric {
    Number(f64),
    Text(String),
}

impl Numeric {
    /// Finite numeric value, if the field holds one.
    pub fn as_f64(&self) -> Option<f64> {
        let value = match self {
            Numeric::Number(n) => *n,
            Numeric::Text(s) => s.trim().parse::<f64>().ok()?,
        };
        value.is_finite().then_some(value)
    }
}

impl fmt::Display for Numeric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Numeric::Number(n) => write!(f, "{}", n),
            Numeric::Text(s) => write!(f, "{}", s),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreviewImage {
    pub small: Option<String>,
    pub medium: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaContent {
    pub preview_image: Option<PreviewImage>,
}

/// A coin as a data source returns it, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoinNode {
    #[serde(default)]
    pub address: String,
    pub name: Option<String>,
    pub symbol: Option<String>,
    pub description: Option<String>,
    #[serde(alias = "image")]
    pub image_url: Option<String>,
    pub media_content: Option<MediaContent>,
    pub total_supply: Option<Numeric>,
    pub market_cap: Option<Numeric>,
    #[serde(rename = "volume24h")]
    pub volume_24h: Option<Numeric>,
    #[serde(rename = "priceChange24h")]
    pub price_change_24h: Option<Numeric>,
    #[serde(rename = "marketCapDelta24h")]
    pub market_cap_delta_24h: Option<Numeric>,
    pub created_at: Option<String>,
    #[serde(alias = "creator")]
    pub creator_address: Option<String>,
    pub payout_recipient: Option<String>,
    pub unique_holders: Option<u64>,
}

/// One page of a ranked list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoinPage {
    pub coins: Vec<CoinNode>,
    pub next_cursor: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeTone {
    Positive,
    Negative,
    Neutral,
}

/// Resolved 24h change of a coin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceChange {
    Percent(f64),
    Unavailable,
}

impl PriceChange {
    pub fn value(&self) -> Option<f64> {
        match self {
            PriceChange::Percent(v) => Some(*v),
            PriceChange::Unavailable => None,
        }
    }

    pub fn tone(&self) -> ChangeTone {
        match self {
            PriceChange::Percent(v) if *v >= 0.0 => ChangeTone::Positive,
            PriceChange::Percent(_) => ChangeTone::Negative,
            PriceChange::Unavailable => ChangeTone::Neutral,
        }
    }

    /// Absolute value with two decimals; `0.00` when unavailable.
    pub fn magnitude(&self) -> String {
        format!("{:.2}", self.value().unwrap_or(0.0).abs())
    }
}

impl fmt::Display for PriceChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PriceChange::Percent(v) if *v >= 0.0 => write!(f, "+{:.2}%", v),
            PriceChange::Percent(v) => write!(f, "{:.2}%", v),
            PriceChange::Unavailable => write!(f, "N/A"),
        }
    }
}

/// Normalized coin handed to the UI.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Coin {
    pub address: String,
    pub name: String,
    pub symbol: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub total_supply: Option<String>,
    pub market_cap: Option<String>,
    pub volume_24h: Option<String>,
    pub price_change_24h: Option<Numeric>,
    pub market_cap_delta_24h: Option<Numeric>,
    pub created_at: Option<String>,
    pub creator_address: Option<String>,
    pub payout_recipient: Option<String>,
    pub unique_holders: Option<u64>,
    pub change_24h: PriceChange,
}

/// Ranked lists offered by the explore page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoinList {
    TopGainers,
    TopVolume,
    MostValuable,
    New,
    LastTraded,
    /// Derived client-side from a gainers page.
    TopLosers,
}

impl CoinList {
    pub const ALL: [CoinList; 6] = [
        CoinList::TopGainers,
        CoinList::TopVolume,
        CoinList::MostValuable,
        CoinList::New,
        CoinList::LastTraded,
        CoinList::TopLosers,
    ];

    /// `listType` of the explore endpoint. Top losers has none.
    pub fn explore_list_type(&self) -> Option<&'static str> {
        match self {
            CoinList::TopGainers => Some("TOP_GAINERS"),
            CoinList::TopVolume => Some("TOP_VOLUME_24H"),
            CoinList::MostValuable => Some("MOST_VALUABLE"),
            CoinList::New => Some("NEW"),
            CoinList::LastTraded => Some("LAST_TRADED"),
            CoinList::TopLosers => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            CoinList::TopGainers => "Top Gainers",
            CoinList::TopVolume => "Top Volume",
            CoinList::MostValuable => "Most Valuable",
            CoinList::New => "New Coins",
            CoinList::LastTraded => "Recently Traded",
            CoinList::TopLosers => "Top Losers",
        }
    }

    fn slug(&self) -> &'static str {
        match self {
            CoinList::TopGainers => "top-gainers",
            CoinList::TopVolume => "top-volume",
            CoinList::MostValuable => "most-valuable",
            CoinList::New => "new",
            CoinList::LastTraded => "last-traded",
            CoinList::TopLosers => "top-losers",
        }
    }
}

impl fmt::Display for CoinList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.slug())
    }
}

impl FromStr for CoinList {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CoinList::ALL
            .into_iter()
            .find(|list| list.slug() == s)
            .ok_or_else(|| {
                let known: Vec<&str> = CoinList::ALL.iter().map(|l| l.slug()).collect();
                format!("unknown coin list '{}', expected one of {}", s, known.join(", "))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_accept_numbers_and_strings() {
        let node: CoinNode = serde_json::from_value(json!({
            "address": "0xabc",
            "name": "Frog",
            "symbol": "FROG",
            "priceChange24h": "-3.14",
            "marketCapDelta24h": 5,
            "volume24h": "1200.5",
            "uniqueHolders": 42,
            "mediaContent": { "previewImage": { "medium": "https://img/frog.png" } }
        }))
        .unwrap();

        assert_eq!(node.price_change_24h, Some(Numeric::Text("-3.14".to_string())));
        assert_eq!(node.market_cap_delta_24h, Some(Numeric::Number(5.0)));
        assert_eq!(node.volume_24h.unwrap().as_f64(), Some(1200.5));
        assert_eq!(node.unique_holders, Some(42));
        assert_eq!(
            node.media_content.unwrap().preview_image.unwrap().medium.as_deref(),
            Some("https://img/frog.png")
        );
    }

    #[test]
    fn test_reject_non_finite_numbers() {
        assert_eq!(Numeric::Text("NaN".to_string()).as_f64(), None);
        assert_eq!(Numeric::Text("inf".to_string()).as_f64(), None);
        assert_eq!(Numeric::Text("".to_string()).as_f64(), None);
        assert_eq!(Numeric::Text(" 2.5 ".to_string()).as_f64(), Some(2.5));
    }

    #[test]
    fn test_display_price_change() {
        assert_eq!(PriceChange::Percent(-3.14).to_string(), "-3.14%");
        assert_eq!(PriceChange::Percent(5.0).to_string(), "+5.00%");
        assert_eq!(PriceChange::Percent(0.0).to_string(), "+0.00%");
        assert_eq!(PriceChange::Unavailable.to_string(), "N/A");

        assert_eq!(PriceChange::Percent(-3.14).tone(), ChangeTone::Negative);
        assert_eq!(PriceChange::Percent(5.0).tone(), ChangeTone::Positive);
        assert_eq!(PriceChange::Unavailable.tone(), ChangeTone::Neutral);
    }

    #[test]
    fn test_parse_list_slugs() {
        for list in CoinList::ALL {
            assert_eq!(list.to_string().parse::<CoinList>().unwrap(), list);
        }
        assert!("trending".parse::<CoinList>().is_err());
        assert_eq!(CoinList::TopLosers.explore_list_type(), None);
    }
}
