// Disease domain model and disease-to-metric filtering
use super::metric::MetricInfo;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Disease {
    pub key: String,
    pub name: String,
    #[serde(default)]
    pub metrics: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DiseasesResponse {
    #[serde(default)]
    pub diseases: Vec<Disease>,
}

pub const NO_METRICS_LOADED: &str = "No metrics could be loaded";
pub const NO_METRICS_FOR_DISEASE: &str = "The selected disease has no available metrics";

/// Catalog entries allowed for a disease, in catalog order. An absent or
/// empty allow-list keeps everything.
pub fn filter_metrics(all: &[MetricInfo], allowed: Option<&[String]>) -> Vec<MetricInfo> {
    match allowed {
        Some(allowed) if !allowed.is_empty() => all
            .iter()
            .filter(|m| allowed.contains(&m.metric))
            .cloned()
            .collect(),
        _ => all.to_vec(),
    }
}

/// Keeps `current` when it is still offered, otherwise falls back to the first option.
pub fn choose_metric(filtered: &[MetricInfo], current: Option<&str>) -> Option<String> {
    match current {
        Some(c) if filtered.iter().any(|m| m.metric == c) => Some(c.to_string()),
        _ => filtered.first().map(|m| m.metric.clone()),
    }
}

pub fn no_metric_reason(
    all: &[MetricInfo],
    allowed: Option<&[String]>,
    filtered: &[MetricInfo],
) -> Option<&'static str> {
    if all.is_empty() {
        return Some(NO_METRICS_LOADED);
    }
    match allowed {
        Some(allowed) if !allowed.is_empty() && filtered.is_empty() => Some(NO_METRICS_FOR_DISEASE),
        _ => None,
    }
}
