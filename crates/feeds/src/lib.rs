//! Read-only clients for the external data sources the scheduled pushes
//! summarise, plus the one-line formatters for each.

pub mod error;
mod http;
pub mod news;
pub mod quotes;
pub mod weather;

pub use {
    error::{Error, Result},
    news::{Article, NO_NEWS, NewsClient, news_digest},
    quotes::{DEFAULT_INDICES, IndexMove, IndexSymbol, QuoteClient, stock_line, stock_summary},
    weather::{Weather, WeatherClient, weather_line},
};
