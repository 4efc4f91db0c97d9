//! Typed reference-data records
//!
//! These are the shapes handed to agents as reference data. Raw provider
//! payloads are mapped into them by the client; optional fields stay `None`
//! instead of being filled with placeholder values.

use serde::{Deserialize, Serialize};

/// Company profile information
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanyProfile {
    pub symbol: String,
    pub name: String,
    pub industry: Option<String>,
    pub sector: Option<String>,
    pub description: Option<String>,
    pub ceo: Option<String>,
    pub website: Option<String>,
    pub employees: Option<String>,
    pub exchange: Option<String>,
    pub market_cap: Option<f64>,
}

/// Current stock quote
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StockQuote {
    pub symbol: String,
    pub price: Option<f64>,
    pub change: Option<f64>,
    pub percent_change: Option<f64>,
    pub day_low: Option<f64>,
    pub day_high: Option<f64>,
    pub year_low: Option<f64>,
    pub year_high: Option<f64>,
    pub market_cap: Option<f64>,
    pub volume: Option<f64>,
    pub avg_volume: Option<f64>,
    pub pe: Option<f64>,
    pub eps: Option<f64>,
}

/// Profitability ratios (trailing twelve months)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Profitability {
    pub gross_margin: Option<f64>,
    pub operating_margin: Option<f64>,
    pub net_margin: Option<f64>,
    pub roe: Option<f64>,
    pub roa: Option<f64>,
}

/// Valuation ratios (trailing twelve months)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Valuation {
    pub pe: Option<f64>,
    pub pb: Option<f64>,
    pub ps: Option<f64>,
    pub pfcf: Option<f64>,
}

/// Balance-sheet health ratios
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FinancialHealth {
    pub current_ratio: Option<f64>,
    pub debt_to_equity: Option<f64>,
    pub interest_coverage: Option<f64>,
}

/// Latest-period absolute figures
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FinancialGrowth {
    pub revenue: Option<f64>,
    pub net_income: Option<f64>,
    pub total_assets: Option<f64>,
    pub total_debt: Option<f64>,
    pub free_cash_flow: Option<f64>,
}

/// Key financial metrics aggregated from several statements
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyFinancials {
    pub symbol: String,
    pub profitability: Profitability,
    pub valuation: Valuation,
    pub health: FinancialHealth,
    pub growth: FinancialGrowth,
}

/// One news article
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsArticle {
    pub title: String,
    pub date: Option<String>,
    pub source: Option<String>,
    pub url: Option<String>,
    pub summary: Option<String>,
}

/// Recent news for a symbol
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsDigest {
    pub symbol: String,
    pub articles: Vec<NewsArticle>,
}

impl NewsDigest {
    /// Number of articles in the digest
    pub fn count(&self) -> usize {
        self.articles.len()
    }
}
