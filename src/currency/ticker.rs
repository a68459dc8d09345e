//! The scrolling banner of exchange rates shown at the top of the dashboard.

use axum::{
    extract::{FromRef, State},
    response::{IntoResponse, Response},
};
use maud::{Markup, html};

use crate::{
    AppState,
    currency::feed::{CurrencyFeed, FeedStatus},
    endpoints,
};

/// Styles for the scrolling animation of [ticker_view].
pub const TICKER_STYLE: &str = r#"
    .ticker-track {
        display: inline-block;
        white-space: nowrap;
        padding-left: 100%;
        animation: ticker-scroll 30s linear infinite;
    }

    @keyframes ticker-scroll {
        from { transform: translateX(0); }
        to { transform: translateX(-100%); }
    }
"#;

/// Poll quickly until the first response arrives, then at the feed's rate.
const LOADING_TRIGGER: &str = "every 2s";
const READY_TRIGGER: &str = "every 60s";

/// The state needed to render the currency ticker.
#[derive(Debug, Clone)]
pub struct TickerState {
    pub currency_feed: CurrencyFeed,
}

impl FromRef<AppState> for TickerState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            currency_feed: state.currency_feed.clone(),
        }
    }
}

/// A route handler that renders the ticker with the latest exchange rates.
pub async fn get_currency_ticker_partial(State(state): State<TickerState>) -> Response {
    ticker_view(&state.currency_feed.status()).into_response()
}

/// Render the ticker for `status`.
///
/// The ticker replaces itself with a fresh copy from the server periodically.
pub fn ticker_view(status: &FeedStatus) -> Markup {
    let trigger = match status {
        FeedStatus::Loading => LOADING_TRIGGER,
        FeedStatus::Error | FeedStatus::Ready(_) => READY_TRIGGER,
    };

    html! {
        div
            id="currency-ticker"
            hx-get=(endpoints::CURRENCY_TICKER_PARTIAL)
            hx-trigger=(trigger)
            hx-swap="outerHTML"
            class="w-full overflow-hidden py-2 text-sm bg-gray-900 text-white dark:bg-black"
        {
            @match status {
                FeedStatus::Loading => {
                    p class="px-4 text-gray-300" { "Loading currency rates..." }
                }
                FeedStatus::Error => {
                    p class="px-4 py-1 bg-red-600 text-white" { "Failed to load currency rates" }
                }
                FeedStatus::Ready(rates) => {
                    div role="marquee" class="ticker-track"
                    {
                        @for rate in rates {
                            span class="mx-4 font-mono" data-currency=(rate.code)
                            {
                                (rate.code) ": " (format!("{:.4}", rate.rate))
                            }
                        }
                    }
                }
            }
        }
    }
}
