pub mod cache;
pub mod candles;
pub mod fetcher;
pub mod ticker;
mod wire;

// Re-exports for convenient access (e.g. `use crate::market_data::Candle`).
pub use cache::CachePolicy;
pub use candles::Candle;
pub use fetcher::{ExchangeApi, MarketFetcher};
pub use ticker::TickerSnapshot;
