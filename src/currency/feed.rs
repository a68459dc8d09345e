//! Polls an exchange rate API on a fixed period and keeps the latest rates.

use std::{
    collections::BTreeMap,
    future::Future,
    sync::{
        Arc, PoisonError, RwLock,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use serde::Deserialize;
use tokio::{
    task::JoinHandle,
    time::{MissedTickBehavior, interval},
};

use crate::Error;

/// The public API that exchange rates are fetched from, relative to USD.
pub const RATES_URL: &str = "https://open.er-api.com/v6/latest/USD";

/// How often exchange rates are fetched.
pub const RATE_POLL_PERIOD: Duration = Duration::from_secs(60);

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

const USER_AGENT: &str = concat!(
    env!("CARGO_PKG_NAME"),
    "/",
    env!("CARGO_PKG_VERSION")
);

/// The value of one US dollar in another currency.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrencyRate {
    /// The currency code, e.g. "EUR".
    pub code: String,
    /// How many units of the currency one US dollar buys.
    pub rate: f64,
}

/// What the feed knows about exchange rates.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FeedStatus {
    /// No response has been received yet.
    #[default]
    Loading,
    /// The last fetch failed.
    Error,
    /// The rates from the last successful fetch, sorted by currency code.
    Ready(Vec<CurrencyRate>),
}

/// Somewhere to get the latest exchange rates from.
pub trait RateSource {
    /// Fetch the latest rates.
    ///
    /// # Errors
    ///
    /// Returns [Error::RateFetchError] if the rates could not be fetched or decoded.
    fn fetch(&self) -> impl Future<Output = Result<Vec<CurrencyRate>, Error>> + Send;
}

#[derive(Debug, Deserialize)]
struct RatesResponse {
    #[serde(default)]
    rates: Option<BTreeMap<String, RateValue>>,
}

/// Some APIs send rates as numeric strings, e.g. `"0.92"`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RateValue {
    Number(f64),
    Text(String),
}

impl RateValue {
    fn to_rate(&self, code: &str) -> Result<f64, Error> {
        match self {
            RateValue::Number(rate) => Ok(*rate),
            RateValue::Text(text) => text.trim().parse().map_err(|_| {
                Error::RateFetchError(format!("rate for {code} is not a number: {text:?}"))
            }),
        }
    }
}

/// Decode the rates in a response body.
///
/// A body without a `rates` field decodes to no rates rather than an error.
pub fn parse_rates(body: &str) -> Result<Vec<CurrencyRate>, Error> {
    let response: RatesResponse =
        serde_json::from_str(body).map_err(|error| Error::RateFetchError(error.to_string()))?;

    response
        .rates
        .unwrap_or_default()
        .into_iter()
        .map(|(code, value)| {
            let rate = value.to_rate(&code)?;
            Ok(CurrencyRate { code, rate })
        })
        .collect()
}

/// Fetches rates over HTTP.
#[derive(Debug, Clone)]
pub struct HttpRateSource {
    client: reqwest::Client,
    url: String,
}

impl HttpRateSource {
    /// Create a source that fetches from `url`, e.g. [RATES_URL].
    ///
    /// # Errors
    ///
    /// Returns [Error::RateFetchError] if the HTTP client could not be created.
    pub fn new(url: &str) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|error| Error::RateFetchError(error.to_string()))?;

        Ok(Self {
            client,
            url: url.to_owned(),
        })
    }
}

impl RateSource for HttpRateSource {
    async fn fetch(&self) -> Result<Vec<CurrencyRate>, Error> {
        // The body decides success, the status code is not checked.
        let body = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|error| Error::RateFetchError(error.to_string()))?
            .text()
            .await
            .map_err(|error| Error::RateFetchError(error.to_string()))?;

        parse_rates(&body)
    }
}

/// The latest exchange rates, shared between the polling task and request handlers.
#[derive(Debug, Clone, Default)]
pub struct CurrencyFeed {
    status: Arc<RwLock<FeedStatus>>,
}

impl CurrencyFeed {
    /// Create a feed that is loading until it is started and the first fetch completes.
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of the current status.
    pub fn status(&self) -> FeedStatus {
        self.status
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Fetch from `source` now and then every `period` until the returned
    /// handle is stopped or dropped.
    ///
    /// Fetches never overlap, the next one starts at least `period` after the
    /// previous one started. Must be called from within a tokio runtime.
    pub fn start<S>(&self, source: S, period: Duration) -> FeedHandle
    where
        S: RateSource + Send + Sync + 'static,
    {
        let active = Arc::new(AtomicBool::new(true));
        let status = self.status.clone();
        let task_active = active.clone();

        let task = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;

                let next_status = match source.fetch().await {
                    Ok(rates) => {
                        tracing::debug!("Fetched {} exchange rates", rates.len());
                        FeedStatus::Ready(rates)
                    }
                    Err(error) => {
                        tracing::warn!("Could not fetch exchange rates: {error}");
                        FeedStatus::Error
                    }
                };

                let mut current = status.write().unwrap_or_else(PoisonError::into_inner);

                if !task_active.load(Ordering::Acquire) {
                    break;
                }

                *current = next_status;
            }
        });

        FeedHandle {
            task,
            active,
            status: self.status.clone(),
        }
    }
}

/// Controls a running currency feed. Dropping the handle stops the feed.
#[derive(Debug)]
pub struct FeedHandle {
    task: JoinHandle<()>,
    active: Arc<AtomicBool>,
    status: Arc<RwLock<FeedStatus>>,
}

impl FeedHandle {
    /// Stop polling and cancel any fetch in progress.
    ///
    /// The feed status is not changed after this returns. Calling this more
    /// than once has no further effect.
    pub fn stop(&self) {
        // Taking the write lock waits out a status update that is underway.
        let _status = self.status.write().unwrap_or_else(PoisonError::into_inner);

        if self.active.swap(false, Ordering::AcqRel) {
            tracing::debug!("Stopping currency feed");
        }

        self.task.abort();
    }

    /// Whether [FeedHandle::stop] has been called.
    pub fn is_stopped(&self) -> bool {
        !self.active.load(Ordering::Acquire)
    }
}

impl Drop for FeedHandle {
    fn drop(&mut self) {
        self.stop();
    }
}


#[cfg(test)]
mod parse_rates_tests {
    use super::{CurrencyRate, parse_rates};
    use crate::Error;

    #[test]
    fn parses_rates_sorted_by_code() {
        let got = parse_rates(r#"{"result": "success", "rates": {"USD": 1, "EUR": 0.92}}"#);

        assert_eq!(
            got,
            Ok(vec![
                CurrencyRate {
                    code: "EUR".to_owned(),
                    rate: 0.92
                },
                CurrencyRate {
                    code: "USD".to_owned(),
                    rate: 1.0
                },
            ])
        );
    }

    #[test]
    fn missing_rates_is_empty_not_error() {
        assert_eq!(parse_rates("{}"), Ok(Vec::new()));
    }

    #[test]
    fn wrong_shape_is_error() {
        assert!(matches!(
            parse_rates(r#"{"rates": "unavailable"}"#),
            Err(Error::RateFetchError(_))
        ));
        assert!(matches!(
            parse_rates(r#"{"rates": {"EUR": "ninety-two cents"}}"#),
            Err(Error::RateFetchError(_))
        ));
        assert!(matches!(
            parse_rates(r#"{"rates": {"EUR": [0.92]}}"#),
            Err(Error::RateFetchError(_))
        ));
    }

    #[test]
    fn numeric_string_rates_are_accepted() {
        let got = parse_rates(r#"{"rates": {"EUR": "0.92", "GBP": 0.79}}"#);

        assert_eq!(
            got,
            Ok(vec![
                CurrencyRate {
                    code: "EUR".to_owned(),
                    rate: 0.92
                },
                CurrencyRate {
                    code: "GBP".to_owned(),
                    rate: 0.79
                },
            ])
        );
    }

    #[test]
    fn invalid_json_is_error() {
        assert!(matches!(
            parse_rates("<html>Bad Gateway</html>"),
            Err(Error::RateFetchError(_))
        ));
    }
}


#[cfg(test)]
mod http_rate_source_tests {
    use axum::{Router, routing::get};
    use tokio::net::TcpListener;

    use super::{HttpRateSource, RateSource, test_sources::eur_rate};
    use crate::Error;

    async fn serve(body: &'static str) -> String {
        let app = Router::new().route("/latest", get(move || async move { body }));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        format!("http://{address}/latest")
    }

    #[tokio::test]
    async fn fetches_rates_over_http() {
        let url = serve(r#"{"result": "success", "rates": {"EUR": 0.92}}"#).await;
        let source = HttpRateSource::new(&url).unwrap();

        let rates = source.fetch().await;

        assert_eq!(rates, Ok(eur_rate()));
    }

    #[tokio::test]
    async fn unreachable_server_is_error() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        drop(listener);
        let source = HttpRateSource::new(&format!("http://{address}/latest")).unwrap();

        let rates = source.fetch().await;

        assert!(matches!(rates, Err(Error::RateFetchError(_))));
    }
}
