//! Pricing abstractions and core types

use crate::core::currency::{Coin, FiatCurrency};
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

/// Span of a historical price query.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub enum TimePeriod {
    ThreeHours,
    OneDay,
    #[default]
    SevenDays,
    ThirtyDays,
    ThreeMonths,
    OneYear,
    ThreeYears,
    FiveYears,
}

impl TimePeriod {
    pub const ALL: [TimePeriod; 8] = [
        TimePeriod::ThreeHours,
        TimePeriod::OneDay,
        TimePeriod::SevenDays,
        TimePeriod::ThirtyDays,
        TimePeriod::ThreeMonths,
        TimePeriod::OneYear,
        TimePeriod::ThreeYears,
        TimePeriod::FiveYears,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TimePeriod::ThreeHours => "3h",
            TimePeriod::OneDay => "24h",
            TimePeriod::SevenDays => "7d",
            TimePeriod::ThirtyDays => "30d",
            TimePeriod::ThreeMonths => "3m",
            TimePeriod::OneYear => "1y",
            TimePeriod::ThreeYears => "3y",
            TimePeriod::FiveYears => "5y",
        }
    }

    /// Whether labels for this span need a time of day to be distinguishable.
    pub fn is_intraday(&self) -> bool {
        matches!(self, TimePeriod::ThreeHours | TimePeriod::OneDay)
    }
}

impl Display for TimePeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TimePeriod {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.to_lowercase();
        TimePeriod::ALL
            .into_iter()
            .find(|p| p.as_str() == lowered)
            .ok_or_else(|| anyhow::anyhow!("Invalid time period: {}", s))
    }
}

impl TryFrom<String> for TimePeriod {
    type Error = anyhow::Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimePeriod> for String {
    fn from(period: TimePeriod) -> Self {
        period.as_str().to_string()
    }
}

/// One observation of a coin's price. The price stays a decimal string until
/// it is consumed; upstream histories may carry gaps as `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: i64,
    pub price: Option<String>,
}

impl PricePoint {
    pub fn new(timestamp: i64, price: &str) -> Self {
        Self {
            timestamp,
            price: Some(price.to_string()),
        }
    }
}

/// Price observations, newest first as delivered by the history source.
pub type History = Vec<PricePoint>;

#[derive(Debug, Clone, PartialEq)]
pub struct CoinDetails {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub price: String,
    pub market_cap: Option<String>,
    pub volume_24h: Option<String>,
    pub all_time_high: Option<String>,
    pub number_of_markets: Option<u64>,
    pub number_of_exchanges: Option<u64>,
    pub color: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Exchange {
    pub id: String,
    pub rank: u32,
    pub name: String,
    pub volume_24h: Option<String>,
    pub number_of_markets: Option<u64>,
    pub market_share: Option<String>,
    pub url: Option<String>,
}

#[async_trait]
pub trait CoinListSource: Send + Sync {
    async fn fetch_coins(&self, limit: usize) -> Result<Vec<Coin>>;
}

#[async_trait]
pub trait ReferenceCurrencySource: Send + Sync {
    async fn fetch_reference_currencies(&self) -> Result<Vec<FiatCurrency>>;
}

#[async_trait]
pub trait PriceLookupSource: Send + Sync {
    /// Price of `coin_id` denominated in the reference currency `reference_id`.
    async fn fetch_price(&self, coin_id: &str, reference_id: &str) -> Result<String>;
}

#[async_trait]
pub trait HistorySource: Send + Sync {
    async fn fetch_history(&self, coin_id: &str, period: TimePeriod) -> Result<History>;
}

#[async_trait]
pub trait CoinDetailsSource: Send + Sync {
    async fn fetch_coin(&self, coin_id: &str) -> Result<CoinDetails>;
}

#[async_trait]
pub trait ExchangeSource: Send + Sync {
    async fn fetch_exchanges(&self, limit: usize) -> Result<Vec<Exchange>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_period_round_trips_wire_strings() {
        for period in TimePeriod::ALL {
            assert_eq!(period.to_string().parse::<TimePeriod>().unwrap(), period);
        }
        assert_eq!("24H".parse::<TimePeriod>().unwrap(), TimePeriod::OneDay);
        assert_eq!("3m".parse::<TimePeriod>().unwrap(), TimePeriod::ThreeMonths);
    }

    #[test]
    fn test_invalid_time_period() {
        let err = "2w".parse::<TimePeriod>().unwrap_err();
        assert_eq!(err.to_string(), "Invalid time period: 2w");
    }
}
