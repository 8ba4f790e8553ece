// Timeseries query and result models
use super::metric::{metric_label, Aggregate, Interval, Range};
use super::threshold::Threshold;
use chrono::NaiveDateTime;
use serde::{Deserialize, Deserializer, Serialize};

const QUERY_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub name: String,
    /// `null` entries arrive as NaN and are drawn as gaps.
    #[serde(default, deserialize_with = "nullable_numbers")]
    pub data: Vec<f64>,
}

fn nullable_numbers<'de, D>(deserializer: D) -> Result<Vec<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Vec<Option<f64>> = Vec::deserialize(deserializer)?;
    Ok(raw.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeseriesResult {
    pub title: String,
    #[serde(default)]
    pub unit: String,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub series: Vec<Series>,
    #[serde(default)]
    pub thresholds: Vec<Threshold>,
}

impl TimeseriesResult {
    /// Values of the first series, which is the one charted.
    pub fn primary_data(&self) -> &[f64] {
        self.series
            .first()
            .map(|s| s.data.as_slice())
            .unwrap_or(&[])
    }
}

/// Body of the upstream `metric_timeseries` request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeseriesQuery {
    pub serial_number: String,
    pub metric: String,
    pub start_ts: String,
    pub end_ts: String,
    pub interval: Interval,
    pub agg: Aggregate,
    pub title: String,
}

impl TimeseriesQuery {
    /// Query covering `range` up to `now` (local wall-clock time).
    pub fn new(
        serial_number: &str,
        metric: &str,
        interval: Interval,
        agg: Aggregate,
        range: Range,
        now: NaiveDateTime,
    ) -> Self {
        let start = now - range.duration();
        Self {
            serial_number: serial_number.to_string(),
            metric: metric.to_string(),
            start_ts: start.format(QUERY_TIME_FORMAT).to_string(),
            end_ts: now.format(QUERY_TIME_FORMAT).to_string(),
            interval,
            agg,
            title: format!("{} ({}, {})", metric_label(metric), interval, agg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_query_window_and_title() {
        let now = NaiveDate::from_ymd_opt(2024, 3, 2)
            .unwrap()
            .and_hms_opt(8, 30, 15)
            .unwrap();
        let q = TimeseriesQuery::new(
            "SN-1",
            "temp",
            "15m".parse().unwrap(),
            Aggregate::Max,
            Range::Last12h,
            now,
        );

        assert_eq!(q.start_ts, "2024-03-01T20:30:15");
        assert_eq!(q.end_ts, "2024-03-02T08:30:15");
        assert_eq!(q.title, "Temperature (15m, max)");

        let body = serde_json::to_value(&q).unwrap();
        assert_eq!(body["interval"], "15m");
        assert_eq!(body["agg"], "max");
        assert_eq!(body["serial_number"], "SN-1");
    }

    #[test]
    fn test_result_with_null_points() {
        let json = r#"{
            "title": "CO2",
            "unit": "ppm",
            "labels": ["2024-01-01T00:00:00", "2024-01-01T00:05:00"],
            "series": [{"name": "co2", "data": [410.0, null]}],
            "thresholds": [{"label": "ASHRAE", "kind": "upper", "value": 1000.0}]
        }"#;
        let result: TimeseriesResult = serde_json::from_str(json).unwrap();
        let data = result.primary_data();
        assert_eq!(data.len(), 2);
        assert_eq!(data[0], 410.0);
        assert!(data[1].is_nan());
    }

    #[test]
    fn test_primary_data_without_series() {
        let result: TimeseriesResult =
            serde_json::from_str(r#"{"title": "Missing serial_number"}"#).unwrap();
        assert!(result.primary_data().is_empty());
        assert!(result.labels.is_empty());
    }
}
