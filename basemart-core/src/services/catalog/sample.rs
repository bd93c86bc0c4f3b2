use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::search::{search, sort_nfts, suggestions};
use super::{NftSource, SECTION_SIZE};
use crate::interfaces::nft::{
    MarketStats, Nft, NftAttribute, NftCategory, NftCollection, NftCreator, NftFilterOptions,
    NftPrice, SortBy, SortDirection,
};
use crate::services::ProviderError;

struct Row {
    id: u32,
    name: &'static str,
    collection: &'static str,
    creator: &'static str,
    category: NftCategory,
    price: &'static str,
    volume_24h: &'static str,
    market_cap: &'static str,
    minted_at: &'static str,
}

const ROWS: [Row; 8] = [
    Row {
        id: 1,
        name: "Tidal Bloom #3",
        collection: "Tidal Bloom",
        creator: "Marina Ko",
        category: NftCategory::Art,
        price: "0.35",
        volume_24h: "8.2",
        market_cap: "1200",
        minted_at: "2024-03-02T14:00:00Z",
    },
    Row {
        id: 2,
        name: "Bassline Relic #11",
        collection: "Bassline Relics",
        creator: "Low End Theory",
        category: NftCategory::Music,
        price: "0.12",
        volume_24h: "21.4",
        market_cap: "640",
        minted_at: "2024-05-18T09:30:00Z",
    },
    Row {
        id: 3,
        name: "Harbor Lights",
        collection: "Night Frames",
        creator: "Ada Lens",
        category: NftCategory::Photography,
        price: "0.8",
        volume_24h: "3.1",
        market_cap: "2400",
        minted_at: "2023-11-20T20:15:00Z",
    },
    Row {
        id: 4,
        name: "Pixel Pilot #77",
        collection: "Pixel Pilots",
        creator: "Marina Ko",
        category: NftCategory::Collectible,
        price: "0.05",
        volume_24h: "44.0",
        market_cap: "310",
        minted_at: "2024-06-01T12:00:00Z",
    },
    Row {
        id: 5,
        name: "Glass Garden #9",
        collection: "Glass Garden",
        creator: "Studio Verre",
        category: NftCategory::Art,
        price: "1.6",
        volume_24h: "15.7",
        market_cap: "5200",
        minted_at: "2024-01-14T08:45:00Z",
    },
    Row {
        id: 6,
        name: "Echo Chamber",
        collection: "Field Recordings",
        creator: "Low End Theory",
        category: NftCategory::Music,
        price: "0.22",
        volume_24h: "0.9",
        market_cap: "180",
        minted_at: "2024-06-20T18:00:00Z",
    },
    Row {
        id: 7,
        name: "Dune Study #2",
        collection: "Night Frames",
        creator: "Ada Lens",
        category: NftCategory::Photography,
        price: "0.45",
        volume_24h: "6.3",
        market_cap: "900",
        minted_at: "2023-12-05T07:10:00Z",
    },
    Row {
        id: 8,
        name: "Orbital Token #501",
        collection: "Orbitals",
        creator: "Studio Verre",
        category: NftCategory::Other,
        price: "2.1",
        volume_24h: "9.8",
        market_cap: "8800",
        minted_at: "2023-08-09T16:20:00Z",
    },
];

fn slug(value: &str) -> String {
    value
        .to_lowercase()
        .chars()
        .filter_map(|c| match c {
            'a'..='z' | '0'..='9' => Some(c),
            ' ' => Some('-'),
            _ => None,
        })
        .collect()
}

fn image(seed: &str) -> String {
    format!("https://picsum.photos/seed/{}/600", slug(seed))
}

fn address(tag: u32, salt: usize) -> String {
    format!("0x{:040x}", (tag as usize) << 16 | salt)
}

fn to_nft(row: &Row) -> Nft {
    let token_id = match row.name.split_once('#') {
        Some((_, edition)) => edition,
        None => "1",
    };
    let volume: f64 = row.volume_24h.parse().unwrap_or_default();
    let minted_at = DateTime::parse_from_rfc3339(row.minted_at)
        .map(|date| date.with_timezone(&Utc))
        .unwrap_or_default();

    Nft {
        id: row.id.to_string(),
        name: row.name.to_string(),
        description: format!(
            "{} from the {} collection by {}.",
            row.name, row.collection, row.creator
        ),
        image: image(row.name),
        collection: NftCollection {
            id: slug(row.collection),
            name: row.collection.to_string(),
            image_url: image(row.collection),
        },
        creator: NftCreator {
            id: slug(row.creator),
            name: row.creator.to_string(),
            address: address(0xc7ea, row.creator.len()),
            profile_image_url: image(row.creator),
        },
        token_id: token_id.to_string(),
        contract: address(0xc011, row.collection.len()),
        owner: address(0x0a11, row.id as usize),
        minted_at,
        price: NftPrice {
            amount: row.price.to_string(),
            currency: "ETH".to_string(),
        },
        market_stats: MarketStats {
            floor_price: row.price.to_string(),
            volume_24h: row.volume_24h.to_string(),
            volume_total: format!("{:.1}", volume * 30.0),
            market_cap: row.market_cap.to_string(),
        },
        attributes: vec![
            NftAttribute {
                trait_type: "Edition".to_string(),
                value: token_id.to_string(),
            },
            NftAttribute {
                trait_type: "Category".to_string(),
                value: row.category.to_string(),
            },
        ],
        category: row.category,
    }
}

/// Deterministic catalog data in catalog order.
pub(crate) fn sample_nfts() -> Vec<Nft> {
    ROWS.iter().map(to_nft).collect()
}

/// In-memory catalog used until a live NFT source is wired in.
#[derive(Debug, Clone)]
pub struct SampleNftCatalog {
    nfts: Vec<Nft>,
}

impl Default for SampleNftCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl SampleNftCatalog {
    pub fn new() -> Self {
        Self {
            nfts: sample_nfts(),
        }
    }

    pub fn with_nfts(nfts: Vec<Nft>) -> Self {
        Self { nfts }
    }

    fn top(&self, sort_by: SortBy) -> Vec<Nft> {
        let mut nfts = self.nfts.clone();
        sort_nfts(&mut nfts, sort_by, SortDirection::Desc);
        nfts.truncate(SECTION_SIZE);
        nfts
    }
}

#[async_trait]
impl NftSource for SampleNftCatalog {
    async fn trending(&self) -> Result<Vec<Nft>, ProviderError> {
        Ok(self.top(SortBy::Volume))
    }

    async fn newly_minted(&self) -> Result<Vec<Nft>, ProviderError> {
        Ok(self.top(SortBy::Date))
    }

    async fn highest_market_cap(&self) -> Result<Vec<Nft>, ProviderError> {
        Ok(self.top(SortBy::MarketCap))
    }

    async fn search(
        &self,
        query: &str,
        filters: Option<NftFilterOptions>,
    ) -> Result<Vec<Nft>, ProviderError> {
        Ok(search(&self.nfts, query, filters.as_ref()))
    }

    async fn by_id(&self, id: &str) -> Result<Option<Nft>, ProviderError> {
        Ok(self.nfts.iter().find(|nft| nft.id == id).cloned())
    }

    async fn suggestions(&self, query: &str) -> Result<Vec<String>, ProviderError> {
        Ok(suggestions(&self.nfts, query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(nfts: &[Nft]) -> Vec<&str> {
        nfts.iter().map(|nft| nft.id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_rank_home_sections() {
        let catalog = SampleNftCatalog::new();

        assert_eq!(ids(&catalog.trending().await.unwrap()), vec!["4", "2", "5", "8"]);
        assert_eq!(ids(&catalog.newly_minted().await.unwrap()), vec!["6", "4", "2", "1"]);
        assert_eq!(
            ids(&catalog.highest_market_cap().await.unwrap()),
            vec!["8", "5", "3", "1"]
        );
    }

    #[tokio::test]
    async fn test_find_by_id() {
        let catalog = SampleNftCatalog::new();

        let nft = catalog.by_id("3").await.unwrap().unwrap();
        assert_eq!(nft.name, "Harbor Lights");
        assert_eq!(nft.token_id, "1");
        assert_eq!(catalog.by_id("404").await.unwrap(), None);
    }

    #[test]
    fn test_build_consistent_samples() {
        let nfts = sample_nfts();
        assert_eq!(nfts.len(), ROWS.len());

        let glass = &nfts[4];
        assert_eq!(glass.token_id, "9");
        assert_eq!(glass.collection.id, "glass-garden");
        assert_eq!(glass.market_stats.volume_total, "471.0");
        assert_eq!(glass.minted_at.to_rfc3339(), "2024-01-14T08:45:00+00:00");
        assert!(nfts.iter().all(|nft| nft.contract.len() == 42));
    }

    #[test]
    fn test_cut_sections_to_four() {
        let catalog = SampleNftCatalog::new();
        assert_eq!(ids(&catalog.top(SortBy::Price)), vec!["8", "5", "3", "7"]);
    }
}
