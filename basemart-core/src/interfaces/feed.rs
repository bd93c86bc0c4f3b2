use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastAuthor {
    pub id: String,
    pub username: String,
    pub display_name: String,
    pub profile_image: String,
    pub follower_count: u64,
}

/// A Farcaster post shown next to NFTs and coins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cast {
    pub id: String,
    pub text: String,
    pub author: CastAuthor,
    pub timestamp: DateTime<Utc>,
    pub like_count: u64,
    pub recast_count: u64,
    pub reply_count: u64,
}
