//! Farcaster casts shown next to coins and NFTs.

use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, error, warn};

use super::notify::Notifier;
use super::ProviderError;
use crate::interfaces::feed::{Cast, CastAuthor};

const API_KEY_HEADER: &str = "api_key";
const NFT_SAMPLE_SIZE: usize = 3;

/// Counters come either as a number or as the list of reactions itself.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Tally {
    Number(u64),
    List(Vec<Value>),
}

impl Tally {
    fn total(&self) -> u64 {
        match self {
            Tally::Number(count) => *count,
            Tally::List(items) => items.len() as u64,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Fid {
    Number(u64),
    Text(String),
}

#[derive(Debug, Default, Deserialize)]
struct AuthorPayload {
    fid: Option<Fid>,
    username: Option<String>,
    display_name: Option<String>,
    pfp_url: Option<String>,
    follower_count: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct ReactionsPayload {
    likes_count: Option<u64>,
    recasts_count: Option<u64>,
    likes: Option<Tally>,
    recasts: Option<Tally>,
}

#[derive(Debug, Default, Deserialize)]
struct RepliesPayload {
    count: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct CastPayload {
    hash: Option<String>,
    text: Option<String>,
    timestamp: Option<String>,
    #[serde(default)]
    author: Option<AuthorPayload>,
    #[serde(default)]
    reactions: Option<ReactionsPayload>,
    #[serde(default)]
    replies: Option<RepliesPayload>,
}

#[derive(Debug, Deserialize)]
struct FeedPayload {
    casts: Option<Vec<CastPayload>>,
}

fn non_empty(value: Option<String>, default: &str) -> String {
    value
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn count(exact: Option<u64>, tally: Option<&Tally>) -> u64 {
    exact.or_else(|| tally.map(Tally::total)).unwrap_or_default()
}

impl CastPayload {
    fn into_cast(self, index: usize) -> Cast {
        let timestamp = self
            .timestamp
            .as_deref()
            .and_then(|date| DateTime::parse_from_rfc3339(date).ok())
            .map(|date| date.with_timezone(&Utc))
            .unwrap_or_else(Utc::now);
        let author = self.author.unwrap_or_default();
        let reactions = self.reactions.unwrap_or_default();
        let replies = self.replies.unwrap_or_default();

        Cast {
            id: non_empty(self.hash, &format!("cast-{}", index)),
            text: non_empty(self.text, "No text available"),
            author: CastAuthor {
                id: match author.fid {
                    Some(Fid::Number(fid)) => fid.to_string(),
                    Some(Fid::Text(fid)) => fid,
                    None => String::new(),
                },
                username: non_empty(author.username, "unknown"),
                display_name: non_empty(author.display_name, "Unknown User"),
                profile_image: author.pfp_url.unwrap_or_default(),
                follower_count: author.follower_count.unwrap_or_default(),
            },
            timestamp,
            like_count: count(reactions.likes_count, reactions.likes.as_ref()),
            recast_count: count(reactions.recasts_count, reactions.recasts.as_ref()),
            reply_count: replies.count.unwrap_or_default(),
        }
    }
}

/// Maps a feed payload to casts. Fields missing from a cast get defaults;
/// a payload without a `casts` array is an error.
pub fn parse_casts(body: &Value) -> Result<Vec<Cast>, ProviderError> {
    let payload: FeedPayload = serde_json::from_value(body.clone())?;
    let casts = payload
        .casts
        .ok_or_else(|| ProviderError::MissingDataError("casts missing from feed".to_string()))?;

    Ok(casts
        .into_iter()
        .enumerate()
        .map(|(index, cast)| cast.into_cast(index))
        .collect())
}

struct SampleCast {
    text: &'static str,
    username: &'static str,
    display_name: &'static str,
    followers: u64,
    posted_at: &'static str,
    likes: u64,
    recasts: u64,
    replies: u64,
}

const SAMPLE_CASTS: [SampleCast; 5] = [
    SampleCast {
        text: "Just minted a Tidal Bloom piece, the colors are unreal on Base",
        username: "tide_collector",
        display_name: "Tide Collector",
        followers: 1820,
        posted_at: "2024-06-21T10:15:00Z",
        likes: 142,
        recasts: 31,
        replies: 12,
    },
    SampleCast {
        text: "Floor on Orbitals keeps climbing. Glad I picked one up early",
        username: "floor_watcher",
        display_name: "Floor Watcher",
        followers: 5400,
        posted_at: "2024-06-21T08:40:00Z",
        likes: 389,
        recasts: 77,
        replies: 45,
    },
    SampleCast {
        text: "New Field Recordings drop tomorrow. Who is on the list?",
        username: "lowendtheory",
        display_name: "Low End Theory",
        followers: 12650,
        posted_at: "2024-06-20T19:05:00Z",
        likes: 512,
        recasts: 120,
        replies: 88,
    },
    SampleCast {
        text: "Hot take: coins for every post is the best thing to happen to creators",
        username: "art_curator",
        display_name: "Art Curator",
        followers: 2310,
        posted_at: "2024-06-20T14:30:00Z",
        likes: 97,
        recasts: 18,
        replies: 64,
    },
    SampleCast {
        text: "Night Frames is my favorite photography collection this month",
        username: "lens_and_chain",
        display_name: "Lens & Chain",
        followers: 760,
        posted_at: "2024-06-19T22:50:00Z",
        likes: 54,
        recasts: 9,
        replies: 6,
    },
];

/// Deterministic casts used when the social API is unavailable.
pub fn sample_casts() -> Vec<Cast> {
    SAMPLE_CASTS
        .iter()
        .enumerate()
        .map(|(index, sample)| Cast {
            id: format!("fc-{}", index + 1),
            text: sample.text.to_string(),
            author: CastAuthor {
                id: format!("user{}", index + 1),
                username: sample.username.to_string(),
                display_name: sample.display_name.to_string(),
                profile_image: format!("https://picsum.photos/seed/{}/200", sample.username),
                follower_count: sample.followers,
            },
            timestamp: DateTime::parse_from_rfc3339(sample.posted_at)
                .map(|date| date.with_timezone(&Utc))
                .unwrap_or_default(),
            like_count: sample.likes,
            recast_count: sample.recasts,
            reply_count: sample.replies,
        })
        .collect()
}

/// Social feed client. Never fails: without a key, or when the API errors,
/// it serves sample casts instead.
#[derive(Debug, Clone)]
pub struct SocialFeed {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    notifier: Notifier,
}

impl SocialFeed {
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        timeout: Duration,
        notifier: Notifier,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            notifier,
        })
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    pub async fn trending_casts(&self, limit: usize) -> Vec<Cast> {
        let Some(api_key) = &self.api_key else {
            warn!("No social API key configured, using sample casts");
            return sample_casts();
        };

        let query = [("limit", limit.to_string())];
        match self.fetch(api_key, "feeds/trending", &query).await {
            Ok(casts) => casts,
            Err(e) => {
                error!("Failed to fetch trending casts: {}", e);
                self.notifier.error(
                    "Error",
                    "Failed to fetch trending casts. Using sample data instead.",
                );
                sample_casts()
            }
        }
    }

    /// Casts mentioning `nft_id`.
    pub async fn nft_casts(&self, nft_id: &str, limit: usize) -> Vec<Cast> {
        let Some(api_key) = &self.api_key else {
            warn!("No social API key configured, using sample casts");
            return Self::nft_samples();
        };

        let query = [("q", nft_id.to_string()), ("limit", limit.to_string())];
        match self.fetch(api_key, "feeds/search", &query).await {
            Ok(casts) => casts,
            Err(e) => {
                error!("Failed to fetch casts for NFT {}: {}", nft_id, e);
                self.notifier.error(
                    "Error",
                    "Failed to fetch NFT casts. Using sample data instead.",
                );
                Self::nft_samples()
            }
        }
    }

    fn nft_samples() -> Vec<Cast> {
        let mut casts = sample_casts();
        casts.truncate(NFT_SAMPLE_SIZE);
        casts
    }

    async fn fetch(
        &self,
        api_key: &str,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<Cast>, ProviderError> {
        let url = format!("{}/{}", self.base_url, path);
        debug!("GET {} {:?}", url, query);

        let response = self
            .client
            .get(url)
            .query(query)
            .header("accept", "application/json")
            .header(API_KEY_HEADER, api_key)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ProviderError::StatusError {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.json::<Value>().await?;
        parse_casts(&body)
    }
}
