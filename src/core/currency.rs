//! Currency lists and identifier classification

use serde::{Deserialize, Serialize};
use tracing::warn;

/// A cryptocurrency as listed by the coin list source. Prices are quoted in
/// the source's default reference currency (USD).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Coin {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub price: Option<String>,
    pub color: Option<String>,
    pub sign: Option<String>,
    pub rank: Option<u32>,
    pub market_cap: Option<String>,
    pub change: Option<String>,
    pub icon_url: Option<String>,
}

/// A fiat reference currency that crypto prices can be denominated in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FiatCurrency {
    pub id: String,
    pub symbol: String,
    pub name: String,
    pub sign: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurrencyKind {
    Crypto,
    Fiat,
    /// Present in neither list. Callers treat this as "not ready".
    Unknown,
}

/// Classifies `id` by membership of the two lists. Coins are checked first.
pub fn classify(id: &str, coins: &[Coin], fiats: &[FiatCurrency]) -> CurrencyKind {
    if coins.iter().any(|c| c.id == id) {
        CurrencyKind::Crypto
    } else if fiats.iter().any(|f| f.id == id) {
        CurrencyKind::Fiat
    } else {
        CurrencyKind::Unknown
    }
}

/// The coin and fiat lists a conversion is evaluated against.
#[derive(Debug, Clone, Default)]
pub struct CurrencyCatalog {
    pub coins: Vec<Coin>,
    pub fiats: Vec<FiatCurrency>,
}

impl CurrencyCatalog {
    pub fn new(coins: Vec<Coin>, fiats: Vec<FiatCurrency>) -> Self {
        for fiat in &fiats {
            if coins.iter().any(|c| c.id == fiat.id) {
                warn!(id = %fiat.id, "Identifier listed as both coin and fiat, treating as coin");
            }
        }
        Self { coins, fiats }
    }

    pub fn classify(&self, id: &str) -> CurrencyKind {
        classify(id, &self.coins, &self.fiats)
    }

    pub fn coin(&self, id: &str) -> Option<&Coin> {
        self.coins.iter().find(|c| c.id == id)
    }

    pub fn fiat(&self, id: &str) -> Option<&FiatCurrency> {
        self.fiats.iter().find(|f| f.id == id)
    }

    /// Resolves user input to an identifier: an exact id first, then a
    /// case-insensitive symbol match, coins before fiats.
    pub fn find_id(&self, query: &str) -> Option<String> {
        if self.classify(query) != CurrencyKind::Unknown {
            return Some(query.to_string());
        }
        self.coins
            .iter()
            .find(|c| c.symbol.eq_ignore_ascii_case(query))
            .map(|c| c.id.clone())
            .or_else(|| {
                self.fiats
                    .iter()
                    .find(|f| f.symbol.eq_ignore_ascii_case(query))
                    .map(|f| f.id.clone())
            })
    }

    pub fn symbol(&self, id: &str) -> &str {
        if let Some(coin) = self.coin(id) {
            &coin.symbol
        } else if let Some(fiat) = self.fiat(id) {
            &fiat.symbol
        } else {
            ""
        }
    }

    /// Sign shown in front of an amount, falling back to `$`.
    pub fn sign(&self, id: &str) -> &str {
        let sign = match self.classify(id) {
            CurrencyKind::Crypto => self.coin(id).and_then(|c| c.sign.as_deref()),
            CurrencyKind::Fiat => self.fiat(id).and_then(|f| f.sign.as_deref()),
            CurrencyKind::Unknown => None,
        };
        sign.unwrap_or("$")
    }
}
