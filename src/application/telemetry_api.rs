// Port for the upstream telemetry HTTP API
use crate::domain::disease::Disease;
use crate::domain::metric::MetricInfo;
use crate::domain::sensor::Sensor;
use crate::domain::timeseries::{TimeseriesQuery, TimeseriesResult};
use crate::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait TelemetryApi: Send + Sync {
    /// Catalog of chartable metrics with their units and thresholds
    async fn list_metrics(&self) -> Result<Vec<MetricInfo>>;

    async fn list_diseases(&self) -> Result<Vec<Disease>>;

    /// Single disease definition; `NotFound` when the key is unknown
    async fn get_disease(&self, key: &str) -> Result<Disease>;

    /// Sensors registered for a household
    async fn list_sensors(&self, house_id: &str) -> Result<Vec<Sensor>>;

    /// Aggregated timeseries for one sensor serial and metric
    async fn metric_timeseries(&self, query: &TimeseriesQuery) -> Result<TimeseriesResult>;
}
