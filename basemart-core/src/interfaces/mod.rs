pub mod coin;
pub mod feed;
pub mod nft;
pub mod wallet;
