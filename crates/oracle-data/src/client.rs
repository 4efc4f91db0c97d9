//! Financial Modeling Prep style API client
//!
//! Wraps the provider's REST endpoints with rate limiting, request
//! timeouts, and per-resource TTL caches. Lookups are keyed by symbol and
//! idempotent; empty provider responses surface as [`DataError::NotFound`].

use crate::cache::{CacheKey, CacheManager};
use crate::error::{DataError, Result};
use crate::records::{
    CompanyProfile, FinancialGrowth, FinancialHealth, KeyFinancials, NewsArticle, NewsDigest,
    Profitability, StockQuote, Valuation,
};
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::Client;
use serde::Deserialize;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

const DEFAULT_BASE_URL: &str = "https://financialmodelingprep.com/api/v3";
const DEFAULT_MAX_RPM: u32 = 10;
const DEFAULT_TIMEOUT_SECS: u64 = 10;
const NEWS_LIMIT: u32 = 10;

type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// Configuration for the FMP client
#[derive(Debug, Clone)]
pub struct FmpConfig {
    /// API key for the data provider
    pub api_key: String,
    /// Base URL (overridable for tests and proxies)
    pub base_url: String,
    /// Maximum requests per minute
    pub max_rpm: u32,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl FmpConfig {
    /// Create a config with the given API key and defaults
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_rpm: DEFAULT_MAX_RPM,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Create config from `FMP_API_KEY` (and optionally `FMP_API_BASE`)
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("FMP_API_KEY").map_err(|_| {
            DataError::ConfigError("FMP_API_KEY environment variable not set".to_string())
        })?;
        let mut config = Self::new(api_key);
        if let Ok(base) = std::env::var("FMP_API_BASE") {
            config.base_url = base;
        }
        Ok(config)
    }

    /// Set a custom base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the per-minute request quota
    pub fn with_max_rpm(mut self, max_rpm: u32) -> Self {
        self.max_rpm = max_rpm;
        self
    }
}

/// Rate-limited, cached client for the financial data provider
pub struct FmpClient {
    client: Client,
    config: FmpConfig,
    rate_limiter: SharedRateLimiter,
    cache: CacheManager,
}

#[derive(Debug, Deserialize)]
struct FmpProfile {
    #[serde(rename = "companyName")]
    company_name: Option<String>,
    industry: Option<String>,
    sector: Option<String>,
    description: Option<String>,
    ceo: Option<String>,
    website: Option<String>,
    #[serde(rename = "fullTimeEmployees")]
    full_time_employees: Option<String>,
    exchange: Option<String>,
    #[serde(rename = "mktCap")]
    mkt_cap: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct FmpQuote {
    price: Option<f64>,
    change: Option<f64>,
    #[serde(rename = "changesPercentage")]
    changes_percentage: Option<f64>,
    #[serde(rename = "dayLow")]
    day_low: Option<f64>,
    #[serde(rename = "dayHigh")]
    day_high: Option<f64>,
    #[serde(rename = "yearLow")]
    year_low: Option<f64>,
    #[serde(rename = "yearHigh")]
    year_high: Option<f64>,
    #[serde(rename = "marketCap")]
    market_cap: Option<f64>,
    volume: Option<f64>,
    #[serde(rename = "avgVolume")]
    avg_volume: Option<f64>,
    pe: Option<f64>,
    eps: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct FmpRatiosTtm {
    #[serde(rename = "grossProfitMarginTTM")]
    gross_profit_margin: Option<f64>,
    #[serde(rename = "operatingProfitMarginTTM")]
    operating_profit_margin: Option<f64>,
    #[serde(rename = "netProfitMarginTTM")]
    net_profit_margin: Option<f64>,
    #[serde(rename = "returnOnEquityTTM")]
    return_on_equity: Option<f64>,
    #[serde(rename = "returnOnAssetsTTM")]
    return_on_assets: Option<f64>,
    #[serde(rename = "priceEarningsRatioTTM")]
    price_earnings: Option<f64>,
    #[serde(rename = "priceToBookRatioTTM")]
    price_to_book: Option<f64>,
    #[serde(rename = "priceToSalesRatioTTM")]
    price_to_sales: Option<f64>,
    #[serde(rename = "priceToFreeCashFlowsRatioTTM")]
    price_to_fcf: Option<f64>,
    #[serde(rename = "currentRatioTTM")]
    current_ratio: Option<f64>,
    #[serde(rename = "debtEquityRatioTTM")]
    debt_equity: Option<f64>,
    #[serde(rename = "interestCoverageTTM")]
    interest_coverage: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct FmpIncome {
    revenue: Option<f64>,
    #[serde(rename = "netIncome")]
    net_income: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct FmpBalance {
    #[serde(rename = "totalAssets")]
    total_assets: Option<f64>,
    #[serde(rename = "totalDebt")]
    total_debt: Option<f64>,
}

#[derive(Debug, Default, Deserialize)]
struct FmpCashFlow {
    #[serde(rename = "freeCashFlow")]
    free_cash_flow: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct FmpNewsItem {
    title: Option<String>,
    #[serde(rename = "publishedDate")]
    published_date: Option<String>,
    site: Option<String>,
    url: Option<String>,
    text: Option<String>,
}

impl FmpClient {
    /// Create a client with the given configuration
    pub fn with_config(config: FmpConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let rpm = NonZeroU32::new(config.max_rpm)
            .ok_or_else(|| DataError::ConfigError("max_rpm must be greater than 0".to_string()))?;
        let rate_limiter = Arc::new(RateLimiter::direct(Quota::per_minute(rpm)));

        info!(max_rpm = config.max_rpm, "FMP client initialized");
        Ok(Self {
            client,
            config,
            rate_limiter,
            cache: CacheManager::default_config(),
        })
    }

    /// Create a client from environment variables
    pub fn from_env() -> Result<Self> {
        Self::with_config(FmpConfig::from_env()?)
    }

    /// Fetch the company profile for a symbol
    pub async fn company_profile(&self, symbol: &str) -> Result<CompanyProfile> {
        let symbol = validate_symbol(symbol)?;
        let key = CacheKey::new(&symbol, "profile");

        let value = self
            .cache
            .fundamental
            .get_or_fetch(key, || async {
                let raw = self.get_json(&format!("profile/{symbol}"), &[]).await?;
                let item = first_element(raw, &symbol, "profile")?;
                let profile: FmpProfile = serde_json::from_value(item)?;
                let record = CompanyProfile {
                    symbol: symbol.clone(),
                    name: profile.company_name.unwrap_or_else(|| symbol.clone()),
                    industry: profile.industry,
                    sector: profile.sector,
                    description: profile.description,
                    ceo: profile.ceo,
                    website: profile.website,
                    employees: profile.full_time_employees,
                    exchange: profile.exchange,
                    market_cap: profile.mkt_cap,
                };
                Ok::<_, DataError>(serde_json::to_value(record)?)
            })
            .await?;

        Ok(serde_json::from_value(value)?)
    }

    /// Fetch the current quote for a symbol
    pub async fn stock_quote(&self, symbol: &str) -> Result<StockQuote> {
        let symbol = validate_symbol(symbol)?;
        let key = CacheKey::new(&symbol, "quote");

        let value = self
            .cache
            .realtime
            .get_or_fetch(key, || async {
                let raw = self.get_json(&format!("quote/{symbol}"), &[]).await?;
                let item = first_element(raw, &symbol, "quote")?;
                let quote: FmpQuote = serde_json::from_value(item)?;
                let record = StockQuote {
                    symbol: symbol.clone(),
                    price: quote.price,
                    change: quote.change,
                    percent_change: quote.changes_percentage,
                    day_low: quote.day_low,
                    day_high: quote.day_high,
                    year_low: quote.year_low,
                    year_high: quote.year_high,
                    market_cap: quote.market_cap,
                    volume: quote.volume,
                    avg_volume: quote.avg_volume,
                    pe: quote.pe,
                    eps: quote.eps,
                };
                Ok::<_, DataError>(serde_json::to_value(record)?)
            })
            .await?;

        Ok(serde_json::from_value(value)?)
    }

    /// Fetch key financial metrics, aggregated from several statements
    ///
    /// Individual statement failures are tolerated; the call errors only
    /// when every underlying request failed.
    pub async fn key_financials(&self, symbol: &str) -> Result<KeyFinancials> {
        let symbol = validate_symbol(symbol)?;
        let key = CacheKey::new(&symbol, "financials");

        let value = self
            .cache
            .fundamental
            .get_or_fetch(key, || async {
                let limit = [("limit", "1".to_string())];
                let ratios_path = format!("ratios-ttm/{symbol}");
                let income_path = format!("income-statement/{symbol}");
                let balance_path = format!("balance-sheet-statement/{symbol}");
                let cash_flow_path = format!("cash-flow-statement/{symbol}");
                let (ratios, income, balance, cash_flow) = tokio::join!(
                    self.get_json(&ratios_path, &[]),
                    self.get_json(&income_path, &limit),
                    self.get_json(&balance_path, &limit),
                    self.get_json(&cash_flow_path, &limit),
                );

                if [&ratios, &income, &balance, &cash_flow]
                    .iter()
                    .all(|r| r.is_err())
                {
                    return Err(DataError::ApiError(format!(
                        "could not retrieve any financial data for {symbol}"
                    )));
                }

                let ratios: FmpRatiosTtm = parse_first_or_default(ratios, &symbol, "ratios");
                let income: FmpIncome = parse_first_or_default(income, &symbol, "income");
                let balance: FmpBalance = parse_first_or_default(balance, &symbol, "balance");
                let cash_flow: FmpCashFlow =
                    parse_first_or_default(cash_flow, &symbol, "cash flow");

                let record = KeyFinancials {
                    symbol: symbol.clone(),
                    profitability: Profitability {
                        gross_margin: ratios.gross_profit_margin,
                        operating_margin: ratios.operating_profit_margin,
                        net_margin: ratios.net_profit_margin,
                        roe: ratios.return_on_equity,
                        roa: ratios.return_on_assets,
                    },
                    valuation: Valuation {
                        pe: ratios.price_earnings,
                        pb: ratios.price_to_book,
                        ps: ratios.price_to_sales,
                        pfcf: ratios.price_to_fcf,
                    },
                    health: FinancialHealth {
                        current_ratio: ratios.current_ratio,
                        debt_to_equity: ratios.debt_equity,
                        interest_coverage: ratios.interest_coverage,
                    },
                    growth: FinancialGrowth {
                        revenue: income.revenue,
                        net_income: income.net_income,
                        total_assets: balance.total_assets,
                        total_debt: balance.total_debt,
                        free_cash_flow: cash_flow.free_cash_flow,
                    },
                };
                Ok::<_, DataError>(serde_json::to_value(record)?)
            })
            .await?;

        Ok(serde_json::from_value(value)?)
    }

    /// Fetch recent news for a symbol
    pub async fn stock_news(&self, symbol: &str) -> Result<NewsDigest> {
        let symbol = validate_symbol(symbol)?;
        let key = CacheKey::new(&symbol, "news");

        let value = self
            .cache
            .news
            .get_or_fetch(key, || async {
                let params = [
                    ("tickers", symbol.clone()),
                    ("limit", NEWS_LIMIT.to_string()),
                ];
                let raw = self.get_json("stock_news", &params).await?;
                let items: Vec<FmpNewsItem> = match raw {
                    serde_json::Value::Array(items) if !items.is_empty() => items
                        .into_iter()
                        .map(serde_json::from_value)
                        .collect::<std::result::Result<_, _>>()?,
                    _ => return Err(DataError::not_found(&symbol, "news")),
                };

                let articles = items
                    .into_iter()
                    .map(|item| NewsArticle {
                        title: item.title.unwrap_or_else(|| "No title".to_string()),
                        date: item.published_date,
                        source: item.site,
                        url: item.url,
                        summary: item.text,
                    })
                    .collect();

                let record = NewsDigest {
                    symbol: symbol.clone(),
                    articles,
                };
                Ok::<_, DataError>(serde_json::to_value(record)?)
            })
            .await?;

        Ok(serde_json::from_value(value)?)
    }

    /// Make one rate-limited GET request and return the parsed JSON body
    async fn get_json(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<serde_json::Value> {
        self.rate_limiter.until_ready().await;

        let url = format!("{}/{path}", self.config.base_url);
        debug!(%url, "fetching reference data");

        let mut request = self.client.get(&url).query(&[("apikey", &self.config.api_key)]);
        for (name, value) in params {
            request = request.query(&[(name, value)]);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                429 => DataError::RateLimited(body),
                s if s >= 500 => DataError::ServerError(format!("{s}: {body}")),
                s => DataError::ApiError(format!("{s}: {body}")),
            });
        }

        let data: serde_json::Value = response.json().await?;
        if let Some(message) = embedded_error(&data) {
            warn!(%path, %message, "provider returned embedded error");
            return Err(DataError::ApiError(message));
        }

        Ok(data)
    }
}

/// FMP reports some failures as a 200 with an error message in the body
fn embedded_error(data: &serde_json::Value) -> Option<String> {
    let object = data.as_object()?;
    object
        .get("Error Message")
        .or_else(|| object.get("error"))
        .and_then(|v| v.as_str())
        .map(String::from)
}

/// Normalize a symbol and reject obviously invalid input
fn validate_symbol(symbol: &str) -> Result<String> {
    let symbol = symbol.trim().to_ascii_uppercase();
    if symbol.is_empty()
        || !symbol
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
    {
        return Err(DataError::InvalidSymbol(symbol));
    }
    Ok(symbol)
}

/// Take the first element of an array response, or report missing data
fn first_element(
    value: serde_json::Value,
    symbol: &str,
    resource: &str,
) -> Result<serde_json::Value> {
    match value {
        serde_json::Value::Array(mut items) if !items.is_empty() => Ok(items.remove(0)),
        _ => Err(DataError::not_found(symbol, resource)),
    }
}

/// Parse the first element of a statement response, defaulting on failure
fn parse_first_or_default<T: Default + serde::de::DeserializeOwned>(
    response: Result<serde_json::Value>,
    symbol: &str,
    resource: &str,
) -> T {
    match response.and_then(|v| first_element(v, symbol, resource)) {
        Ok(item) => serde_json::from_value(item).unwrap_or_default(),
        Err(e) => {
            warn!(%symbol, %resource, error = %e, "statement unavailable, continuing with partial data");
            T::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_symbol() {
        assert_eq!(validate_symbol(" aapl ").unwrap(), "AAPL");
        assert_eq!(validate_symbol("BRK.B").unwrap(), "BRK.B");
        assert!(validate_symbol("").is_err());
        assert!(validate_symbol("AA PL").is_err());
        assert!(validate_symbol("A;DROP").is_err());
    }

    #[test]
    fn test_first_element() {
        let value = serde_json::json!([{"price": 1.0}, {"price": 2.0}]);
        let first = first_element(value, "AAPL", "quote").unwrap();
        assert_eq!(first["price"], 1.0);

        let err = first_element(serde_json::json!([]), "AAPL", "quote").unwrap_err();
        assert!(matches!(err, DataError::NotFound { .. }));

        let err = first_element(serde_json::json!({}), "AAPL", "quote").unwrap_err();
        assert!(matches!(err, DataError::NotFound { .. }));
    }

    #[test]
    fn test_embedded_error() {
        let data = serde_json::json!({"Error Message": "Invalid API key"});
        assert_eq!(embedded_error(&data), Some("Invalid API key".to_string()));

        let data = serde_json::json!({"error": "limit reached"});
        assert_eq!(embedded_error(&data), Some("limit reached".to_string()));

        let data = serde_json::json!([{"price": 1.0}]);
        assert_eq!(embedded_error(&data), None);
    }

    #[test]
    fn test_parse_first_or_default_tolerates_failure() {
        let parsed: FmpIncome = parse_first_or_default(
            Err(DataError::ServerError("502".to_string())),
            "AAPL",
            "income",
        );
        assert!(parsed.revenue.is_none());

        let parsed: FmpIncome = parse_first_or_default(
            Ok(serde_json::json!([{"revenue": 1000.0, "netIncome": 100.0}])),
            "AAPL",
            "income",
        );
        assert_eq!(parsed.revenue, Some(1000.0));
    }

    #[test]
    fn test_config_requires_positive_rpm() {
        let config = FmpConfig::new("test-key").with_max_rpm(0);
        assert!(FmpClient::with_config(config).is_err());

        let config = FmpConfig::new("test-key").with_base_url("http://localhost:9999");
        let client = FmpClient::with_config(config).unwrap();
        assert_eq!(client.config.base_url, "http://localhost:9999");
    }
}
