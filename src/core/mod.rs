//! Core business logic abstractions

pub mod config;
pub mod convert;
pub mod currency;
pub mod error;
pub mod history;
pub mod log;
pub mod news;
pub mod price;

// Re-export main types for cleaner imports
pub use convert::{Conversion, ConversionOutcome, ConversionRequest, Converter};
pub use currency::{Coin, CurrencyCatalog, CurrencyKind, FiatCurrency};
pub use error::QuoteError;
pub use history::{AlignedSeries, ChartMode};
pub use news::{NewsArticle, NewsSource};
pub use price::{
    CoinDetails, CoinDetailsSource, CoinListSource, Exchange, ExchangeSource, History,
    HistorySource, PriceLookupSource, PricePoint, ReferenceCurrencySource, TimePeriod,
};
