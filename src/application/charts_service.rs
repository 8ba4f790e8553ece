// Charts service - Disease selection, chart controls and chart loading
use crate::application::chart_renderer::render;
use crate::application::selection_store::{
    remembered_or_first, sensor_serial_key, SelectionStore, DISEASE_KEY, HOUSE_ID_KEY,
};
use crate::application::telemetry_api::TelemetryApi;
use crate::domain::disease::{choose_metric, filter_metrics, no_metric_reason, Disease};
use crate::domain::drawing::Drawing;
use crate::domain::metric::{Aggregate, Interval, MetricInfo, Range};
use crate::domain::sensor::{unique_serials, Sensor};
use crate::domain::timeseries::TimeseriesQuery;
use crate::error::{DashboardError, Result};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, Serialize)]
pub struct DiseaseSelection {
    pub diseases: Vec<Disease>,
    pub selected: Option<String>,
}

/// State of the chart controls for one household.
#[derive(Debug, Clone, Serialize)]
pub struct ChartPanel {
    pub house_id: String,
    pub disease: Option<String>,
    pub metrics: Vec<MetricInfo>,
    pub metric: Option<String>,
    pub serials: Vec<String>,
    pub serial: Option<String>,
    pub intervals: Vec<&'static str>,
    pub notice: Option<&'static str>,
}

#[derive(Debug, Clone, Default)]
pub struct ChartRequest {
    pub house_id: String,
    pub disease: Option<String>,
    pub serial: Option<String>,
    pub metric: Option<String>,
    pub interval: Interval,
    pub agg: Aggregate,
    pub range: Range,
}

#[derive(Clone)]
pub struct ChartsService {
    api: Arc<dyn TelemetryApi>,
    selections: Arc<dyn SelectionStore>,
}

impl ChartsService {
    pub fn new(api: Arc<dyn TelemetryApi>, selections: Arc<dyn SelectionStore>) -> Self {
        Self { api, selections }
    }

    /// Sensors of a household; the household becomes the remembered one.
    pub async fn sensors(&self, house_id: &str) -> Result<Vec<Sensor>> {
        let sensors = self.api.list_sensors(house_id).await?;
        self.remember(HOUSE_ID_KEY, house_id);
        Ok(sensors)
    }

    pub fn last_house(&self) -> Option<String> {
        self.selections.get(HOUSE_ID_KEY)
    }

    pub async fn diseases(&self) -> DiseaseSelection {
        let diseases = self.api.list_diseases().await.unwrap_or_else(|e| {
            tracing::warn!("Error fetching diseases: {}", e);
            Vec::new()
        });
        let keys: Vec<String> = diseases.iter().map(|d| d.key.clone()).collect();
        let selected = remembered_or_first(&keys, self.selections.get(DISEASE_KEY));
        DiseaseSelection { diseases, selected }
    }

    pub async fn select_disease(&self, key: &str) -> Result<Disease> {
        let disease = self.api.get_disease(key).await?;
        self.selections.set(DISEASE_KEY, &disease.key)?;
        Ok(disease)
    }

    /// Forget the selected disease; the next listing falls back to the first one.
    pub fn clear_disease(&self) -> Result<()> {
        self.selections.clear(DISEASE_KEY)
    }

    /// Resolve metric and serial options for a household. Without an explicit
    /// disease the selection from `diseases()` restricts the metrics. The
    /// `metric` is kept as the chosen one when the disease offers it.
    pub async fn panel(
        &self,
        house_id: &str,
        disease: Option<&str>,
        metric: Option<&str>,
    ) -> Result<ChartPanel> {
        let disease = match disease {
            Some(key) => Some(self.api.get_disease(key).await?),
            None => {
                let DiseaseSelection { diseases, selected } = self.diseases().await;
                selected.and_then(|key| diseases.into_iter().find(|d| d.key == key))
            }
        };
        let allowed = disease.as_ref().map(|d| d.metrics.as_slice());

        let all_metrics = self.api.list_metrics().await.unwrap_or_else(|e| {
            tracing::warn!("Error fetching metric catalog: {}", e);
            Vec::new()
        });
        let metrics = filter_metrics(&all_metrics, allowed);
        let notice = no_metric_reason(&all_metrics, allowed, &metrics);
        let metric = choose_metric(&metrics, metric);

        let serials = match self.api.list_sensors(house_id).await {
            Ok(sensors) => unique_serials(&sensors),
            Err(e) => {
                tracing::warn!("Error fetching sensors for {}: {}", house_id, e);
                Vec::new()
            }
        };
        let serial = remembered_or_first(
            &serials,
            self.selections.get(&sensor_serial_key(house_id)),
        );

        tracing::debug!(
            "Panel for {}: {} metrics, {} serials",
            house_id,
            metrics.len(),
            serials.len()
        );

        Ok(ChartPanel {
            house_id: house_id.to_string(),
            disease: disease.map(|d| d.key),
            metrics,
            metric,
            serials,
            serial,
            intervals: Interval::CHOICES.to_vec(),
            notice,
        })
    }

    /// Query the timeseries for the request and render it. Missing serial or
    /// metric fall back to the panel defaults.
    pub async fn load_chart(&self, request: &ChartRequest, now: NaiveDateTime) -> Result<Drawing> {
        let requested = request.metric.as_deref().filter(|m| !m.is_empty());
        let panel = self
            .panel(&request.house_id, request.disease.as_deref(), requested)
            .await?;

        let serial = request
            .serial
            .clone()
            .filter(|s| !s.is_empty())
            .or(panel.serial)
            .ok_or_else(|| DashboardError::InvalidRequest("No sensor serial available".into()))?;

        if let Some(m) = requested {
            if panel.metric.as_deref() != Some(m) {
                return Err(DashboardError::InvalidRequest(format!(
                    "Metric '{}' is not available for the selected disease",
                    m
                )));
            }
        }
        let metric = panel.metric.ok_or_else(|| {
            DashboardError::InvalidRequest("No metric available (check disease settings)".into())
        })?;

        let query = TimeseriesQuery::new(
            &serial,
            &metric,
            request.interval,
            request.agg,
            request.range,
            now,
        );
        tracing::debug!(
            "Loading {} for serial {} from {} to {}",
            metric,
            serial,
            query.start_ts,
            query.end_ts
        );
        let result = self.api.metric_timeseries(&query).await?;
        self.remember(&sensor_serial_key(&request.house_id), &serial);

        Ok(render(
            &result.labels,
            result.primary_data(),
            &result.thresholds,
            &result.unit,
            &result.title,
        ))
    }

    fn remember(&self, key: &str, value: &str) {
        if let Err(e) = self.selections.set(key, value) {
            tracing::warn!("Could not persist selection {}: {}", key, e);
        }
    }
}
