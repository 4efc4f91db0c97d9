//! Run configuration

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// How thorough the analysis tasks should be
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Depth {
    /// Faster, headline-level analysis
    #[default]
    Quick,
    /// Adds trend, SWOT, and sentiment-trend sections
    Deep,
}

impl fmt::Display for Depth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Depth::Quick => write!(f, "quick"),
            Depth::Deep => write!(f, "deep"),
        }
    }
}

impl FromStr for Depth {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "quick" => Ok(Depth::Quick),
            "deep" => Ok(Depth::Deep),
            other => Err(Error::Config(format!("unknown depth '{other}'"))),
        }
    }
}

/// How the judge weighs the analyst reports
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Style {
    /// Weigh financials, profile, and news evenly
    #[default]
    Balanced,
    /// Base the verdict solely on the financial analysis
    FactsFirst,
    /// Weigh news sentiment most heavily
    NewsWeighted,
}

impl fmt::Display for Style {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Style::Balanced => write!(f, "balanced"),
            Style::FactsFirst => write!(f, "facts-first"),
            Style::NewsWeighted => write!(f, "news-weighted"),
        }
    }
}

impl FromStr for Style {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "balanced" => Ok(Style::Balanced),
            "facts-first" | "facts_first" => Ok(Style::FactsFirst),
            "news-weighted" | "news_weighted" => Ok(Style::NewsWeighted),
            other => Err(Error::Config(format!("unknown style '{other}'"))),
        }
    }
}

/// Options recognized by `run_workflow`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Analysis depth
    pub depth: Depth,
    /// Judge weighting style
    pub style: Style,
    /// Model name passed to the completion provider
    pub model: String,
    /// Overall wall-clock ceiling for the run
    pub timeout_seconds: u64,
    /// Bounded wait on each external agent call
    pub task_timeout_seconds: u64,
    /// Retries after the first attempt on transient failures
    pub retry_limit: u32,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            depth: Depth::Quick,
            style: Style::Balanced,
            model: "gpt-4o-mini".to_string(),
            timeout_seconds: 300,
            task_timeout_seconds: 120,
            retry_limit: 2,
        }
    }
}

impl RunConfig {
    /// Per-run deadline
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Per-task deadline
    pub fn task_timeout(&self) -> Duration {
        Duration::from_secs(self.task_timeout_seconds)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.model.is_empty() {
            return Err(Error::Config("model must not be empty".to_string()));
        }
        if self.timeout_seconds == 0 {
            return Err(Error::Config("timeout_seconds must be greater than 0".to_string()));
        }
        if self.task_timeout_seconds == 0 {
            return Err(Error::Config(
                "task_timeout_seconds must be greater than 0".to_string(),
            ));
        }
        if self.task_timeout_seconds > self.timeout_seconds {
            return Err(Error::Config(
                "task timeout must not exceed the run timeout".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = RunConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.depth, Depth::Quick);
        assert_eq!(config.style, Style::Balanced);
    }

    #[test]
    fn test_parse_depth_and_style() {
        assert_eq!("deep".parse::<Depth>().unwrap(), Depth::Deep);
        assert_eq!("facts-first".parse::<Style>().unwrap(), Style::FactsFirst);
        assert!("bogus".parse::<Depth>().is_err());
        assert!("bogus".parse::<Style>().is_err());
    }

    #[test]
    fn test_validation_rejects_zero_timeout() {
        let config = RunConfig {
            timeout_seconds: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = RunConfig {
            task_timeout_seconds: 600,
            timeout_seconds: 300,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
