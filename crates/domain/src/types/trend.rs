//! Sentiment trend types
//!
//! The trends endpoint is served snake_case, unlike the rest of the API.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::WhisperError;

/// Aggregation window for trend analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendPeriod {
    Day,
    Week,
    #[default]
    Month,
    Quarter,
    Year,
}

impl TrendPeriod {
    /// Number of days covered by the period.
    #[must_use]
    pub fn days(self) -> u32 {
        match self {
            Self::Day => 1,
            Self::Week => 7,
            Self::Month => 30,
            Self::Quarter => 90,
            Self::Year => 365,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Month => "month",
            Self::Quarter => "quarter",
            Self::Year => "year",
        }
    }
}

impl fmt::Display for TrendPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TrendPeriod {
    type Err = WhisperError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "day" => Ok(Self::Day),
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            "quarter" => Ok(Self::Quarter),
            "year" => Ok(Self::Year),
            other => Err(WhisperError::InvalidInput(format!("Unknown trend period: {other}"))),
        }
    }
}

/// Combined sentiment, mention, and aspect trends for one product
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendAnalysis {
    pub product_id: i64,
    pub period: TrendPeriod,
    pub sentiment: TrendSeries<TrendPoint>,
    pub mentions: TrendSeries<TrendPoint>,
    pub aspects: TrendSeries<AspectPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendSeries<P> {
    pub product_id: i64,
    pub trend_type: String,
    pub period: TrendPeriod,
    pub data_points: Vec<P>,
}

/// One dated observation. `date` is `YYYY-MM-DD`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub date: String,
    pub value: f64,
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AspectPoint {
    pub date: String,
    pub aspects: BTreeMap<String, AspectStat>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AspectStat {
    pub count: u64,
    pub sentiment: f64,
}
