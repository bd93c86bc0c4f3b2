//! Terminal rendering of coins, NFTs, casts and notices.

use basemart_core::interfaces::coin::{ChangeTone, Coin};
use basemart_core::interfaces::feed::Cast;
use basemart_core::interfaces::nft::Nft;
use basemart_core::services::notify::{Notice, NoticeLevel};
use crossterm::style::Stylize;
use crossterm::tty::IsTty;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Ink {
    Green,
    Red,
    Yellow,
    Cyan,
    Dim,
}

/// Colours only when writing to a terminal and `NO_COLOR` is unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    enabled: bool,
}

impl Palette {
    pub fn for_stdout() -> Self {
        Self::detect(std::io::stdout().is_tty())
    }

    pub fn for_stderr() -> Self {
        Self::detect(std::io::stderr().is_tty())
    }

    pub fn plain() -> Self {
        Self { enabled: false }
    }

    fn detect(is_tty: bool) -> Self {
        Self {
            enabled: is_tty && std::env::var_os("NO_COLOR").is_none(),
        }
    }

    /// Styles already padded text so escape codes never count towards widths.
    fn paint(&self, ink: Ink, text: String) -> String {
        if !self.enabled {
            return text;
        }
        match ink {
            Ink::Green => text.green().to_string(),
            Ink::Red => text.red().to_string(),
            Ink::Yellow => text.yellow().to_string(),
            Ink::Cyan => text.cyan().to_string(),
            Ink::Dim => text.dim().to_string(),
        }
    }
}

fn tone_ink(tone: ChangeTone) -> Ink {
    match tone {
        ChangeTone::Positive => Ink::Green,
        ChangeTone::Negative => Ink::Red,
        ChangeTone::Neutral => Ink::Dim,
    }
}

pub fn coin_row(palette: Palette, coin: &Coin) -> String {
    let change = format!("{:>10}", coin.change_24h.to_string());
    format!(
        "{:<24} {:<8} {}  mcap {:<14} vol {:<14} {}",
        coin.name,
        coin.symbol,
        palette.paint(tone_ink(coin.change_24h.tone()), change),
        coin.market_cap.as_deref().unwrap_or("-"),
        coin.volume_24h.as_deref().unwrap_or("-"),
        palette.paint(Ink::Dim, coin.address.clone()),
    )
}

pub fn coin_details(palette: Palette, coin: &Coin) -> String {
    let mut lines = vec![
        format!("{} ({})", coin.name, coin.symbol),
        format!("  address       {}", coin.address),
        format!(
            "  24h change    {}",
            palette.paint(tone_ink(coin.change_24h.tone()), coin.change_24h.to_string())
        ),
    ];
    let optional = [
        ("market cap", &coin.market_cap),
        ("volume 24h", &coin.volume_24h),
        ("total supply", &coin.total_supply),
        ("created", &coin.created_at),
        ("creator", &coin.creator_address),
        ("payout", &coin.payout_recipient),
        ("image", &coin.image_url),
    ];
    for (label, value) in optional {
        if let Some(value) = value {
            lines.push(format!("  {:<13} {}", label, value));
        }
    }
    if let Some(holders) = coin.unique_holders {
        lines.push(format!("  {:<13} {}", "holders", holders));
    }
    if let Some(description) = &coin.description {
        lines.push(String::new());
        lines.push(format!("  {}", description));
    }
    lines.join("\n")
}

pub fn nft_row(palette: Palette, nft: &Nft) -> String {
    format!(
        "{:>3}  {:<22} {:<16} {:<12} {:>6} {}  {}",
        nft.id,
        nft.name,
        nft.creator.name,
        nft.category.to_string(),
        nft.price.amount,
        nft.price.currency,
        palette.paint(Ink::Dim, nft.minted_at.format("%Y-%m-%d").to_string()),
    )
}

pub fn nft_details(palette: Palette, nft: &Nft) -> String {
    let mut lines = vec![
        palette.paint(Ink::Cyan, nft.name.clone()),
        format!("  {}", nft.description),
        format!("  collection    {}", nft.collection.name),
        format!("  creator       {} ({})", nft.creator.name, nft.creator.address),
        format!("  contract      {} #{}", nft.contract, nft.token_id),
        format!("  owner         {}", nft.owner),
        format!("  minted        {}", nft.minted_at.to_rfc3339()),
        format!("  price         {} {}", nft.price.amount, nft.price.currency),
        format!("  floor         {}", nft.market_stats.floor_price),
        format!("  volume 24h    {}", nft.market_stats.volume_24h),
        format!("  volume total  {}", nft.market_stats.volume_total),
        format!("  market cap    {}", nft.market_stats.market_cap),
    ];
    for attribute in &nft.attributes {
        lines.push(format!("  {:<13} {}", attribute.trait_type, attribute.value));
    }
    lines.join("\n")
}

pub fn cast(palette: Palette, cast: &Cast) -> String {
    let byline = format!(
        "@{} · {}",
        cast.author.username,
        cast.timestamp.format("%Y-%m-%d %H:%M")
    );
    let counters = format!(
        "{} likes  {} recasts  {} replies",
        cast.like_count, cast.recast_count, cast.reply_count
    );
    format!(
        "{} {}\n  {}\n  {}",
        palette.paint(Ink::Cyan, cast.author.display_name.clone()),
        palette.paint(Ink::Dim, byline),
        cast.text,
        palette.paint(Ink::Dim, counters),
    )
}

pub fn notice(palette: Palette, notice: &Notice) -> String {
    let ink = match notice.level {
        NoticeLevel::Info => Ink::Cyan,
        NoticeLevel::Success => Ink::Green,
        NoticeLevel::Warning => Ink::Yellow,
        NoticeLevel::Error => Ink::Red,
    };
    format!("{} {}", palette.paint(ink, notice.title.clone()), notice.message)
}

/// Keeps the first and last four characters of a secret.
pub fn mask(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    if chars.len() <= 8 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..4].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}…{}", head, tail)
}
