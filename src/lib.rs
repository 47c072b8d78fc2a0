pub mod cli;
pub mod core;
pub mod providers;

use crate::core::config::AppConfig;
use crate::core::history::ChartMode;
use crate::core::price::TimePeriod;
use crate::providers::{CoinrankingProvider, NewsProvider};
use anyhow::Result;
use tracing::{debug, info};

const DEFAULT_NEWS_QUERY: &str = "Cryptocurrency";
const DEFAULT_NEWS_COUNT: usize = 12;
const DEFAULT_EXCHANGE_LIMIT: usize = 50;

#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    Coins {
        limit: Option<usize>,
    },
    Coin {
        id: String,
    },
    Compare {
        first: String,
        second: String,
        period: Option<TimePeriod>,
        percent: bool,
    },
    Convert {
        amount: f64,
        from: String,
        to: String,
        swap: bool,
    },
    Exchanges {
        limit: Option<usize>,
    },
    News {
        query: Option<String>,
        count: Option<usize>,
    },
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("Coinboard starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!(
        coin_limit = config.coin_limit,
        default_period = %config.default_period,
        "Loaded config"
    );

    match command {
        AppCommand::Coins { limit } => {
            let coinranking = CoinrankingProvider::new(&config.providers.coinranking())?;
            cli::coins::run(&coinranking, limit.unwrap_or(config.coin_limit)).await
        }
        AppCommand::Coin { id } => {
            let coinranking = CoinrankingProvider::new(&config.providers.coinranking())?;
            cli::coin::run(&coinranking, &id).await
        }
        AppCommand::Compare {
            first,
            second,
            period,
            percent,
        } => {
            let coinranking = CoinrankingProvider::new(&config.providers.coinranking())?;
            let mode = if percent {
                ChartMode::Percentage
            } else {
                ChartMode::Absolute
            };
            cli::compare::run(
                &coinranking,
                cli::compare::CompareArgs {
                    first: &first,
                    second: &second,
                    period: period.unwrap_or(config.default_period),
                    mode,
                    coin_limit: config.coin_limit,
                },
            )
            .await
        }
        AppCommand::Convert {
            amount,
            from,
            to,
            swap,
        } => {
            let coinranking = CoinrankingProvider::new(&config.providers.coinranking())?;
            cli::convert::run(
                coinranking,
                cli::convert::ConvertArgs {
                    amount,
                    from: &from,
                    to: &to,
                    swap,
                    coin_limit: config.coin_limit,
                },
            )
            .await
        }
        AppCommand::Exchanges { limit } => {
            let coinranking = CoinrankingProvider::new(&config.providers.coinranking())?;
            cli::exchanges::run(&coinranking, limit.unwrap_or(DEFAULT_EXCHANGE_LIMIT)).await
        }
        AppCommand::News { query, count } => {
            let news = NewsProvider::new(&config.providers.news())?;
            cli::news::run(
                &news,
                query.as_deref().unwrap_or(DEFAULT_NEWS_QUERY),
                count.unwrap_or(DEFAULT_NEWS_COUNT),
            )
            .await
        }
    }
}
