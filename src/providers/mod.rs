pub mod coinranking;
pub mod news;

pub use coinranking::CoinrankingProvider;
pub use news::NewsProvider;
