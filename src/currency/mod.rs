//! Live exchange rates and the ticker that displays them.

mod feed;
mod ticker;

pub use feed::{
    CurrencyFeed, CurrencyRate, FeedHandle, FeedStatus, HttpRateSource, RATE_POLL_PERIOD,
    RATES_URL, RateSource,
};
pub use ticker::{TICKER_STYLE, get_currency_ticker_partial, ticker_view};
