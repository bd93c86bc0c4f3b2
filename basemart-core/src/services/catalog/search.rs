//! Client-side search over an in-memory NFT list.

use std::cmp::Ordering;

use crate::interfaces::nft::{Nft, NftFilterOptions, SortBy, SortDirection};

pub const MIN_SUGGESTION_QUERY: usize = 2;
pub const MAX_SUGGESTIONS: usize = 5;

/// Case-insensitive substring match on name, creator and collection.
pub fn matches_query(nft: &Nft, query: &str) -> bool {
    let query = query.to_lowercase();
    [&nft.name, &nft.creator.name, &nft.collection.name]
        .iter()
        .any(|field| field.to_lowercase().contains(&query))
}

/// Bounds are inclusive. A price that does not parse never satisfies a
/// price bound.
pub fn passes_filters(nft: &Nft, filters: &NftFilterOptions) -> bool {
    if filters.category.is_some_and(|category| nft.category != category) {
        return false;
    }

    if filters.min_price.is_some() || filters.max_price.is_some() {
        let Some(price) = nft.price_amount() else {
            return false;
        };
        if filters.min_price.is_some_and(|min| price < min) {
            return false;
        }
        if filters.max_price.is_some_and(|max| price > max) {
            return false;
        }
    }

    if filters.minted_from.is_some_and(|from| nft.minted_at < from) {
        return false;
    }
    if filters.minted_to.is_some_and(|to| nft.minted_at > to) {
        return false;
    }
    true
}

fn sort_key(nft: &Nft, sort_by: SortBy) -> f64 {
    let value = match sort_by {
        SortBy::Price => nft.price_amount(),
        SortBy::Volume => nft.volume_24h(),
        SortBy::MarketCap => nft.market_cap(),
        SortBy::Date => Some(nft.minted_at.timestamp_millis() as f64),
    };
    // Unparseable values sink to the bottom of a descending sort.
    value.unwrap_or(f64::NEG_INFINITY)
}

/// Stable sort; ties keep their input order.
pub fn sort_nfts(nfts: &mut [Nft], sort_by: SortBy, direction: SortDirection) {
    nfts.sort_by(|a, b| {
        let ordering: Ordering = sort_key(a, sort_by).total_cmp(&sort_key(b, sort_by));
        match direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
}

/// Matches `query`, then applies `filters` and their sort when given.
/// Without filters results keep catalog order.
pub fn search(nfts: &[Nft], query: &str, filters: Option<&NftFilterOptions>) -> Vec<Nft> {
    let mut results: Vec<Nft> = nfts
        .iter()
        .filter(|nft| matches_query(nft, query))
        .filter(|nft| filters.map_or(true, |filters| passes_filters(nft, filters)))
        .cloned()
        .collect();

    if let Some(filters) = filters {
        sort_nfts(&mut results, filters.sort_by, filters.sort_direction);
    }
    results
}

/// NFT names first, then creator names, without duplicates.
pub fn suggestions(nfts: &[Nft], query: &str) -> Vec<String> {
    if query.chars().count() < MIN_SUGGESTION_QUERY {
        return Vec::new();
    }
    let query = query.to_lowercase();

    let names = nfts.iter().map(|nft| &nft.name);
    let creators = nfts.iter().map(|nft| &nft.creator.name);

    let mut found: Vec<String> = Vec::new();
    for candidate in names.chain(creators) {
        if candidate.to_lowercase().contains(&query) && !found.contains(candidate) {
            found.push(candidate.clone());
        }
    }
    found.truncate(MAX_SUGGESTIONS);
    found
}
