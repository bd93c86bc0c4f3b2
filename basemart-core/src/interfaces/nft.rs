use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NftCollection {
    pub id: String,
    pub name: String,
    pub image_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NftCreator {
    pub id: String,
    pub name: String,
    pub address: String,
    pub profile_image_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NftPrice {
    pub amount: String,
    pub currency: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketStats {
    pub floor_price: String,
    pub volume_24h: String,
    pub volume_total: String,
    pub market_cap: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NftAttribute {
    pub trait_type: String,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NftCategory {
    Art,
    Music,
    Photography,
    Collectible,
    Other,
}

impl NftCategory {
    pub const ALL: [NftCategory; 5] = [
        NftCategory::Art,
        NftCategory::Music,
        NftCategory::Photography,
        NftCategory::Collectible,
        NftCategory::Other,
    ];
}

impl fmt::Display for NftCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NftCategory::Art => "Art",
            NftCategory::Music => "Music",
            NftCategory::Photography => "Photography",
            NftCategory::Collectible => "Collectible",
            NftCategory::Other => "Other",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for NftCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NftCategory::ALL
            .into_iter()
            .find(|c| c.to_string().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown category '{}'", s))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Nft {
    pub id: String,
    pub name: String,
    pub description: String,
    pub image: String,
    pub collection: NftCollection,
    pub creator: NftCreator,
    pub token_id: String,
    pub contract: String,
    pub owner: String,
    pub minted_at: DateTime<Utc>,
    pub price: NftPrice,
    pub market_stats: MarketStats,
    pub attributes: Vec<NftAttribute>,
    pub category: NftCategory,
}

impl Nft {
    pub fn price_amount(&self) -> Option<f64> {
        parse_amount(&self.price.amount)
    }

    pub fn volume_24h(&self) -> Option<f64> {
        parse_amount(&self.market_stats.volume_24h)
    }

    pub fn market_cap(&self) -> Option<f64> {
        parse_amount(&self.market_stats.market_cap)
    }
}

fn parse_amount(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortBy {
    Price,
    Volume,
    #[default]
    Date,
    MarketCap,
}

impl FromStr for SortBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "price" => Ok(SortBy::Price),
            "volume" => Ok(SortBy::Volume),
            "date" => Ok(SortBy::Date),
            "marketcap" | "market-cap" | "market_cap" => Ok(SortBy::MarketCap),
            _ => Err(format!("unknown sort key '{}'", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            _ => Err(format!("unknown sort direction '{}'", s)),
        }
    }
}

/// Filters of the search panel. Bounds are inclusive; `None` disables a
/// filter. Defaults sort newest first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NftFilterOptions {
    pub category: Option<NftCategory>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub minted_from: Option<DateTime<Utc>>,
    pub minted_to: Option<DateTime<Utc>>,
    pub sort_by: SortBy,
    pub sort_direction: SortDirection,
}
