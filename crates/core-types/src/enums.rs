use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;

/// The field of the daily history that the rotation study is computed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Study {
    Price,
    Volume,
    Volatility,
}

impl fmt::Display for Study {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Study::Price => write!(f, "price"),
            Study::Volume => write!(f, "volume"),
            Study::Volatility => write!(f, "volatility"),
        }
    }
}

impl FromStr for Study {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "price" => Ok(Study::Price),
            "volume" => Ok(Study::Volume),
            "volatility" => Ok(Study::Volatility),
            other => Err(CoreError::InvalidInput(
                "study".to_string(),
                format!("unknown study '{}'", other),
            )),
        }
    }
}

/// The quote source a request is served from.
///
/// New sources are added by implementing the provider contract for a new
/// variant, never by branching on a source-name string inside the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    Yahoo,
    Cboe,
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Yahoo => write!(f, "yahoo"),
            DataSource::Cboe => write!(f, "cboe"),
        }
    }
}

impl FromStr for DataSource {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "yahoo" | "yahoofinance" => Ok(DataSource::Yahoo),
            "cboe" => Ok(DataSource::Cboe),
            other => Err(CoreError::InvalidInput(
                "source".to_string(),
                format!("unknown data source '{}'", other),
            )),
        }
    }
}

/// The sampling interval used when reducing a full indicator history to a
/// rotation tail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TailInterval {
    Week,
    Month,
}

impl fmt::Display for TailInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TailInterval::Week => write!(f, "week"),
            TailInterval::Month => write!(f, "month"),
        }
    }
}

impl FromStr for TailInterval {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "week" | "weekly" => Ok(TailInterval::Week),
            "month" | "monthly" => Ok(TailInterval::Month),
            other => Err(CoreError::InvalidInput(
                "tail_interval".to_string(),
                format!("unknown tail interval '{}'", other),
            )),
        }
    }
}
