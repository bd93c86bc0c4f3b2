mod render;

use anyhow::{anyhow, Result};
use basemart_core::interfaces::coin::CoinList;
use basemart_core::interfaces::nft::{NftCategory, NftFilterOptions, SortBy, SortDirection};
use basemart_core::services::storage::ApiCredentials;
use basemart_core::{AppConfig, MarketContext};
use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use clap::{Parser, Subcommand};
use tokio::sync::broadcast::error::TryRecvError;
use tracing::{debug, info};
use tracing_subscriber::fmt;
use tracing_subscriber::EnvFilter;

/// Browse coins, NFTs and casts of the Base marketplace
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// YAML configuration file; defaults apply when omitted
    #[arg(short, long)]
    config_path: Option<String>,

    /// Log filter used when RUST_LOG is not set
    #[arg(short, long)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List coins of an explore list
    Coins {
        /// top-gainers, top-volume, most-valuable, new, last-traded, top-losers
        #[arg(default_value = "top-gainers")]
        list: CoinList,
        #[arg(short = 'n', long, default_value_t = 10)]
        count: usize,
        /// Cursor returned by a previous page
        #[arg(long)]
        after: Option<String>,
    },
    /// Show one coin
    Coin { address: String },
    /// Browse the NFT catalog
    Nfts {
        #[command(subcommand)]
        section: NftSection,
    },
    /// Search NFTs by name, creator or collection
    Search {
        #[arg(default_value = "")]
        query: String,
        #[arg(long)]
        category: Option<NftCategory>,
        #[arg(long)]
        min_price: Option<f64>,
        #[arg(long)]
        max_price: Option<f64>,
        /// First mint day, YYYY-MM-DD or RFC 3339
        #[arg(long, value_parser = parse_from)]
        from: Option<DateTime<Utc>>,
        /// Last mint day, YYYY-MM-DD or RFC 3339
        #[arg(long, value_parser = parse_to)]
        to: Option<DateTime<Utc>>,
        /// price, volume, date or market-cap
        #[arg(long)]
        sort: Option<SortBy>,
        /// asc or desc
        #[arg(long)]
        direction: Option<SortDirection>,
    },
    /// Autocomplete suggestions for a partial query
    Suggest { query: String },
    /// Social feed
    Feed {
        #[command(subcommand)]
        section: FeedSection,
    },
    /// Manage stored API keys
    Credentials {
        #[command(subcommand)]
        action: CredentialsAction,
    },
}

#[derive(Subcommand, Debug)]
enum NftSection {
    Trending,
    New,
    TopCap,
    Show { id: String },
}

#[derive(Subcommand, Debug)]
enum FeedSection {
    Trending {
        #[arg(short = 'n', long, default_value_t = 10)]
        limit: usize,
    },
    Nft {
        id: String,
        #[arg(short = 'n', long, default_value_t = 10)]
        limit: usize,
    },
}

#[derive(Subcommand, Debug)]
enum CredentialsAction {
    /// Store keys; omitted keys keep their current value
    Set {
        #[arg(long)]
        zora: Option<String>,
        #[arg(long)]
        farcaster: Option<String>,
    },
    Show,
    Clear,
}

fn parse_day(value: &str, time: NaiveTime) -> Result<DateTime<Utc>, String> {
    if let Ok(date) = DateTime::parse_from_rfc3339(value) {
        return Ok(date.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|day| Utc.from_utc_datetime(&day.and_time(time)))
        .map_err(|e| format!("invalid date '{}': {}", value, e))
}

fn parse_from(value: &str) -> Result<DateTime<Utc>, String> {
    parse_day(value, NaiveTime::MIN)
}

fn parse_to(value: &str) -> Result<DateTime<Utc>, String> {
    let end_of_day = NaiveTime::from_hms_opt(23, 59, 59).ok_or("invalid end of day")?;
    parse_day(value, end_of_day)
}

/// Initializes the logging, ensuring that the `RUST_LOG` environment
/// variable is always considered first.
fn init_logging(default_filter: &str) -> Result<()> {
    let filter = EnvFilter::try_from_default_env().or(EnvFilter::try_new(default_filter))?;
    tracing::subscriber::set_global_default(
        fmt::Subscriber::builder()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .finish(),
    )?;
    Ok(())
}

fn load_config(args: &Args) -> Result<AppConfig> {
    let config = match &args.config_path {
        Some(path) => AppConfig::load_from_file(path)?,
        None => AppConfig::load_from_env()?,
    };
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();
    let config = load_config(&args)?;
    init_logging(args.log_level.as_deref().unwrap_or(&config.log_level))?;

    let mut context = MarketContext::initialize(config, None).await?;
    let mut notices = context.notifier.subscribe();

    let outcome = run(&context, args.command).await;
    let errors = render::Palette::for_stderr();

    loop {
        match notices.try_recv() {
            Ok(notice) => eprintln!("{}", render::notice(errors, &notice)),
            Err(TryRecvError::Lagged(skipped)) => debug!("Skipped {} notices", skipped),
            Err(_) => break,
        }
    }
    context.shutdown();
    outcome
}

async fn run(context: &MarketContext, command: Command) -> Result<()> {
    let palette = render::Palette::for_stdout();
    match command {
        Command::Coins { list, count, after } => {
            let listing = context.coins.list_page(list, count, after).await;
            println!("{}", list.label());
            for coin in &listing.coins {
                println!("{}", render::coin_row(palette, coin));
            }
            if let Some(cursor) = listing.next_cursor {
                println!("\nnext page: --after {}", cursor);
            }
        }
        Command::Coin { address } => match context.coins.coin_details(&address).await? {
            Some(coin) => println!("{}", render::coin_details(palette, &coin)),
            None => println!("Coin not found"),
        },
        Command::Nfts { section } => {
            let nfts = match section {
                NftSection::Trending => context.nfts.trending().await?,
                NftSection::New => context.nfts.newly_minted().await?,
                NftSection::TopCap => context.nfts.highest_market_cap().await?,
                NftSection::Show { id } => {
                    let nft = context
                        .nfts
                        .by_id(&id)
                        .await?
                        .ok_or_else(|| anyhow!("No NFT with id {}", id))?;
                    println!("{}", render::nft_details(palette, &nft));
                    return Ok(());
                }
            };
            for nft in &nfts {
                println!("{}", render::nft_row(palette, nft));
            }
        }
        Command::Search {
            query,
            category,
            min_price,
            max_price,
            from,
            to,
            sort,
            direction,
        } => {
            let filtered = category.is_some()
                || min_price.is_some()
                || max_price.is_some()
                || from.is_some()
                || to.is_some()
                || sort.is_some()
                || direction.is_some();
            let filters = filtered.then(|| NftFilterOptions {
                category,
                min_price,
                max_price,
                minted_from: from,
                minted_to: to,
                sort_by: sort.unwrap_or_default(),
                sort_direction: direction.unwrap_or_default(),
            });

            let results = context.nfts.search(&query, filters).await?;
            info!("{} NFTs match '{}'", results.len(), query);
            if results.is_empty() {
                println!("No NFTs found");
            }
            for nft in &results {
                println!("{}", render::nft_row(palette, nft));
            }
        }
        Command::Suggest { query } => {
            for suggestion in context.nfts.suggestions(&query).await? {
                println!("{}", suggestion);
            }
        }
        Command::Feed { section } => {
            let casts = match section {
                FeedSection::Trending { limit } => context.feed.trending_casts(limit).await,
                FeedSection::Nft { id, limit } => context.feed.nft_casts(&id, limit).await,
            };
            for cast in &casts {
                println!("{}\n", render::cast(palette, cast));
            }
        }
        Command::Credentials { action } => match action {
            CredentialsAction::Set { zora, farcaster } => {
                let current = context.credentials.load().await;
                let updated = ApiCredentials::new(
                    zora.or(current.zora_api_key),
                    farcaster.or(current.farcaster_api_key),
                );
                context.credentials.save(&updated).await?;
                println!("Saved to {}", context.credentials.path().display());
            }
            CredentialsAction::Show => {
                let current = context.credentials.load().await;
                let show = |key: Option<String>| match key {
                    Some(key) => render::mask(&key),
                    None => "not set".to_string(),
                };
                println!("zora       {}", show(current.zora_api_key));
                println!("farcaster  {}", show(current.farcaster_api_key));
            }
            CredentialsAction::Clear => {
                context.credentials.clear().await?;
                println!("Credentials cleared");
            }
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_search_arguments() {
        let args = Args::parse_from([
            "basemart",
            "search",
            "glass",
            "--category",
            "art",
            "--max-price",
            "2",
            "--to",
            "2024-01-31",
            "--sort",
            "market-cap",
        ]);

        match args.command {
            Command::Search {
                query,
                category,
                max_price,
                to,
                sort,
                ..
            } => {
                assert_eq!(query, "glass");
                assert_eq!(category, Some(NftCategory::Art));
                assert_eq!(max_price, Some(2.0));
                assert_eq!(to.map(|to| to.to_rfc3339()).as_deref(), Some("2024-01-31T23:59:59+00:00"));
                assert_eq!(sort, Some(SortBy::MarketCap));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_coin_list_slug() {
        let args = Args::parse_from(["basemart", "coins", "top-losers", "-n", "5"]);

        match args.command {
            Command::Coins { list, count, .. } => {
                assert_eq!(list, CoinList::TopLosers);
                assert_eq!(count, 5);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_accept_rfc3339_and_days() {
        assert_eq!(
            parse_from("2024-05-01").unwrap().to_rfc3339(),
            "2024-05-01T00:00:00+00:00"
        );
        assert!(parse_from("2024-05-01T12:00:00Z").is_ok());
        assert!(parse_to("yesterday").is_err());
    }
}
