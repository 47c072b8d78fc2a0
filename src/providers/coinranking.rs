use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument};

use crate::core::config::ApiConfig;
use crate::core::currency::{Coin, FiatCurrency};
use crate::core::price::{
    CoinDetails, CoinDetailsSource, CoinListSource, Exchange, ExchangeSource, History,
    HistorySource, PriceLookupSource, PricePoint, ReferenceCurrencySource, TimePeriod,
};

/// Client for the Coinranking REST API. One instance serves every coin,
/// currency, history and exchange lookup.
#[derive(Clone)]
pub struct CoinrankingProvider {
    base_url: String,
    client: reqwest::Client,
}

impl CoinrankingProvider {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        if let Some(host) = &config.api_host {
            headers.insert("X-RapidAPI-Host", HeaderValue::from_str(host)?);
        }
        if let Some(key) = config.api_key.as_deref().filter(|k| !k.is_empty()) {
            headers.insert("X-RapidAPI-Key", HeaderValue::from_str(key)?);
        }
        let client = reqwest::Client::builder()
            .user_agent("coinboard/0.1")
            .default_headers(headers)
            .build()?;
        Ok(CoinrankingProvider {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Joins `segments` onto the base URL as escaped path segments.
    fn url(&self, segments: &[&str], params: &[(&str, &str)]) -> Result<reqwest::Url> {
        let mut url = reqwest::Url::parse(&self.base_url)
            .with_context(|| format!("Invalid base URL: {}", self.base_url))?;
        url.path_segments_mut()
            .map_err(|_| anyhow!("Base URL cannot be a base: {}", self.base_url))?
            .pop_if_empty()
            .extend(segments);
        if !params.is_empty() {
            url.query_pairs_mut().extend_pairs(params);
        }
        Ok(url)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        params: &[(&str, &str)],
        resource: &str,
    ) -> Result<T> {
        let url = self.url(segments, params)?;
        debug!("Requesting {} from {}", resource, url);

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for {} URL: {}", e, resource, url))?;

        if !response.status().is_success() {
            return Err(anyhow!("HTTP error: {} for {}", response.status(), resource));
        }

        let text = response.text().await?;
        let envelope: Envelope<T> = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse JSON response for {resource}"))?;
        Ok(envelope.data)
    }
}

#[derive(Deserialize, Debug)]
struct Envelope<T> {
    data: T,
}

#[derive(Deserialize, Debug)]
struct CoinsData {
    coins: Vec<WireCoin>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct WireCoin {
    uuid: String,
    symbol: String,
    name: String,
    price: Option<String>,
    color: Option<String>,
    rank: Option<u32>,
    market_cap: Option<String>,
    change: Option<String>,
    icon_url: Option<String>,
}

impl From<WireCoin> for Coin {
    fn from(coin: WireCoin) -> Self {
        Coin {
            id: coin.uuid,
            symbol: coin.symbol,
            name: coin.name,
            price: coin.price,
            color: coin.color,
            sign: None,
            rank: coin.rank,
            market_cap: coin.market_cap,
            change: coin.change,
            icon_url: coin.icon_url,
        }
    }
}

#[derive(Deserialize, Debug)]
struct CurrenciesData {
    currencies: Vec<WireCurrency>,
}

#[derive(Deserialize, Debug)]
struct WireCurrency {
    uuid: String,
    symbol: String,
    name: String,
    sign: Option<String>,
}

#[derive(Deserialize, Debug)]
struct CoinData {
    coin: WireCoinDetails,
}

#[derive(Deserialize, Debug)]
struct AllTimeHigh {
    price: Option<String>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct WireCoinDetails {
    uuid: String,
    symbol: String,
    name: String,
    price: Option<String>,
    color: Option<String>,
    market_cap: Option<String>,
    #[serde(rename = "24hVolume")]
    volume_24h: Option<String>,
    all_time_high: Option<AllTimeHigh>,
    number_of_markets: Option<u64>,
    number_of_exchanges: Option<u64>,
}

#[derive(Deserialize, Debug)]
struct HistoryData {
    history: Vec<WirePricePoint>,
}

#[derive(Deserialize, Debug)]
struct WirePricePoint {
    price: Option<String>,
    timestamp: i64,
}

#[derive(Deserialize, Debug)]
struct ExchangesData {
    exchanges: Vec<WireExchange>,
}

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
struct WireExchange {
    uuid: String,
    name: String,
    rank: u32,
    #[serde(rename = "24hVolume")]
    volume_24h: Option<String>,
    number_of_markets: Option<u64>,
    market_share: Option<String>,
    coinranking_url: Option<String>,
}

#[async_trait]
impl CoinListSource for CoinrankingProvider {
    #[instrument(name = "CoinListFetch", skip(self))]
    async fn fetch_coins(&self, limit: usize) -> Result<Vec<Coin>> {
        let limit = limit.to_string();
        let data: CoinsData = self
            .get(&["coins"], &[("limit", limit.as_str())], "coin list")
            .await?;
        debug!(count = data.coins.len(), "Fetched coin list");
        Ok(data.coins.into_iter().map(Coin::from).collect())
    }
}

#[async_trait]
impl ReferenceCurrencySource for CoinrankingProvider {
    #[instrument(name = "ReferenceCurrencyFetch", skip(self))]
    async fn fetch_reference_currencies(&self) -> Result<Vec<FiatCurrency>> {
        let data: CurrenciesData = self
            .get(
                &["reference-currencies"],
                &[("types[]", "fiat"), ("limit", "100")],
                "reference currencies",
            )
            .await?;
        Ok(data
            .currencies
            .into_iter()
            .map(|c| FiatCurrency {
                id: c.uuid,
                symbol: c.symbol,
                name: c.name,
                sign: c.sign,
            })
            .collect())
    }
}

#[async_trait]
impl PriceLookupSource for CoinrankingProvider {
    #[instrument(
        name = "PriceLookup",
        skip(self),
        fields(coin_id = %coin_id, reference_id = %reference_id)
    )]
    async fn fetch_price(&self, coin_id: &str, reference_id: &str) -> Result<String> {
        let data: CoinData = self
            .get(
                &["coin", coin_id],
                &[("referenceCurrencyUuid", reference_id)],
                &format!("coin: {coin_id}"),
            )
            .await?;
        data.coin
            .price
            .ok_or_else(|| anyhow!("No price found for coin: {} in {}", coin_id, reference_id))
    }
}

#[async_trait]
impl HistorySource for CoinrankingProvider {
    #[instrument(name = "HistoryFetch", skip(self), fields(coin_id = %coin_id, period = %period))]
    async fn fetch_history(&self, coin_id: &str, period: TimePeriod) -> Result<History> {
        let data: HistoryData = self
            .get(
                &["coin", coin_id, "history"],
                &[("timePeriod", period.as_str())],
                &format!("history of coin: {coin_id}"),
            )
            .await?;
        Ok(data
            .history
            .into_iter()
            .map(|p| PricePoint {
                timestamp: p.timestamp,
                price: p.price,
            })
            .collect())
    }
}

#[async_trait]
impl CoinDetailsSource for CoinrankingProvider {
    #[instrument(name = "CoinDetailsFetch", skip(self), fields(coin_id = %coin_id))]
    async fn fetch_coin(&self, coin_id: &str) -> Result<CoinDetails> {
        let data: CoinData = self
            .get(&["coin", coin_id], &[], &format!("coin: {coin_id}"))
            .await?;
        let coin = data.coin;
        let price = coin
            .price
            .ok_or_else(|| anyhow!("No price found for coin: {}", coin_id))?;
        Ok(CoinDetails {
            id: coin.uuid,
            symbol: coin.symbol,
            name: coin.name,
            price,
            market_cap: coin.market_cap,
            volume_24h: coin.volume_24h,
            all_time_high: coin.all_time_high.and_then(|ath| ath.price),
            number_of_markets: coin.number_of_markets,
            number_of_exchanges: coin.number_of_exchanges,
            color: coin.color,
        })
    }
}

#[async_trait]
impl ExchangeSource for CoinrankingProvider {
    #[instrument(name = "ExchangesFetch", skip(self))]
    async fn fetch_exchanges(&self, limit: usize) -> Result<Vec<Exchange>> {
        let limit = limit.to_string();
        let data: ExchangesData = self
            .get(&["exchanges"], &[("limit", limit.as_str())], "exchanges")
            .await?;
        Ok(data
            .exchanges
            .into_iter()
            .map(|e| Exchange {
                id: e.uuid,
                rank: e.rank,
                name: e.name,
                volume_24h: e.volume_24h,
                number_of_markets: e.number_of_markets,
                market_share: e.market_share,
                url: e.coinranking_url,
            })
            .collect())
    }
}
