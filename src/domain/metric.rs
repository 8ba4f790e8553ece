// Metric catalog and query controls (aggregate, interval, range)
use super::threshold::Threshold;
use crate::error::DashboardError;
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricInfo {
    pub metric: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub thresholds: Vec<Threshold>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetricsResponse {
    #[serde(default)]
    pub metrics: Vec<MetricInfo>,
}

/// Display name for a metric key; unknown keys are shown upper-cased.
pub fn metric_label(metric: &str) -> String {
    let known = match metric {
        "temp" => "Temperature",
        "co2" => "CO₂",
        "pm25" => "PM2.5",
        "rh" => "Relative Humidity",
        "no2" => "Nitrogen Dioxide",
        "co" => "Carbon Monoxide",
        "o2" => "Oxygen",
        "light_night" => "Night Light",
        "noise_night" => "Night Noise",
        other => return other.to_uppercase(),
    };
    known.to_string()
}

/// Reduction applied upstream to the samples of one interval bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregate {
    #[default]
    Avg,
    Min,
    Max,
    Last,
    Sum,
}

impl Aggregate {
    pub const ALL: [Aggregate; 5] = [
        Aggregate::Avg,
        Aggregate::Min,
        Aggregate::Max,
        Aggregate::Last,
        Aggregate::Sum,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Aggregate::Avg => "avg",
            Aggregate::Min => "min",
            Aggregate::Max => "max",
            Aggregate::Last => "last",
            Aggregate::Sum => "sum",
        }
    }
}

impl fmt::Display for Aggregate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Aggregate {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Aggregate::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| DashboardError::InvalidRequest(format!("unknown aggregate '{}'", s)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntervalUnit {
    Seconds,
    Minutes,
    Hours,
    Days,
}

impl IntervalUnit {
    fn suffix(&self) -> char {
        match self {
            IntervalUnit::Seconds => 's',
            IntervalUnit::Minutes => 'm',
            IntervalUnit::Hours => 'h',
            IntervalUnit::Days => 'd',
        }
    }
}

/// Bucket width such as "5m" or "1h".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Interval {
    pub amount: u32,
    pub unit: IntervalUnit,
}

impl Interval {
    /// Intervals offered by the chart controls.
    pub const CHOICES: [&'static str; 4] = ["1m", "5m", "15m", "1h"];

    pub fn duration(&self) -> Duration {
        let amount = i64::from(self.amount);
        match self.unit {
            IntervalUnit::Seconds => Duration::seconds(amount),
            IntervalUnit::Minutes => Duration::minutes(amount),
            IntervalUnit::Hours => Duration::hours(amount),
            IntervalUnit::Days => Duration::days(amount),
        }
    }
}

impl Default for Interval {
    fn default() -> Self {
        Self {
            amount: 5,
            unit: IntervalUnit::Minutes,
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.unit.suffix())
    }
}

impl FromStr for Interval {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DashboardError::InvalidRequest(format!("bad interval '{}'", s));
        let s = s.trim();
        let suffix = s.chars().last().ok_or_else(invalid)?;
        let unit = match suffix.to_ascii_lowercase() {
            's' => IntervalUnit::Seconds,
            'm' => IntervalUnit::Minutes,
            'h' => IntervalUnit::Hours,
            'd' => IntervalUnit::Days,
            _ => return Err(invalid()),
        };
        let amount: u32 = s[..s.len() - suffix.len_utf8()]
            .parse()
            .map_err(|_| invalid())?;
        if amount == 0 {
            return Err(invalid());
        }
        Ok(Self { amount, unit })
    }
}

impl TryFrom<String> for Interval {
    type Error = DashboardError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Interval> for String {
    fn from(value: Interval) -> Self {
        value.to_string()
    }
}

/// How far back a chart query reaches from now.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Range {
    #[serde(rename = "6h")]
    Last6h,
    #[serde(rename = "12h")]
    Last12h,
    #[default]
    #[serde(rename = "24h")]
    Last24h,
}

impl Range {
    pub fn hours(&self) -> i64 {
        match self {
            Range::Last6h => 6,
            Range::Last12h => 12,
            Range::Last24h => 24,
        }
    }

    pub fn duration(&self) -> Duration {
        Duration::hours(self.hours())
    }
}

impl FromStr for Range {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "6h" => Ok(Range::Last6h),
            "12h" => Ok(Range::Last12h),
            "24h" => Ok(Range::Last24h),
            other => Err(DashboardError::InvalidRequest(format!(
                "unsupported range '{}'",
                other
            ))),
        }
    }
}
