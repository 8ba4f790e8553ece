// HTTP implementation of the telemetry API
use crate::application::telemetry_api::TelemetryApi;
use crate::domain::disease::{Disease, DiseasesResponse};
use crate::domain::metric::{MetricInfo, MetricsResponse};
use crate::domain::sensor::Sensor;
use crate::domain::timeseries::{TimeseriesQuery, TimeseriesResult};
use crate::error::{DashboardError, Result};
use async_trait::async_trait;
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HttpTelemetryApi {
    base_url: String,
    client: reqwest::Client,
}

impl HttpTelemetryApi {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn fetch<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!("Telemetry API returned {}: {}", status, body);
            return Err(DashboardError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.json::<T>().await?)
    }
}

#[async_trait]
impl TelemetryApi for HttpTelemetryApi {
    async fn list_metrics(&self) -> Result<Vec<MetricInfo>> {
        let request = self.client.get(self.url("/api/charts/metrics"));
        let response: MetricsResponse = self.fetch(request).await?;
        Ok(response.metrics)
    }

    async fn list_diseases(&self) -> Result<Vec<Disease>> {
        let request = self.client.get(self.url("/api/diseases/"));
        let response: DiseasesResponse = self.fetch(request).await?;
        Ok(response.diseases)
    }

    async fn get_disease(&self, key: &str) -> Result<Disease> {
        let path = format!("/api/diseases/{}", urlencoding::encode(key));
        let request = self.client.get(self.url(&path));
        match self.fetch(request).await {
            Err(DashboardError::Upstream { status, .. })
                if status == StatusCode::NOT_FOUND.as_u16() =>
            {
                Err(DashboardError::NotFound(format!("disease '{}'", key)))
            }
            other => other,
        }
    }

    async fn list_sensors(&self, house_id: &str) -> Result<Vec<Sensor>> {
        let path = format!("/sensors/?house_id={}", urlencoding::encode(house_id));
        tracing::debug!("Fetching sensors for house {}", house_id);
        self.fetch(self.client.get(self.url(&path))).await
    }

    async fn metric_timeseries(&self, query: &TimeseriesQuery) -> Result<TimeseriesResult> {
        let request = self
            .client
            .post(self.url("/api/charts/metric_timeseries"))
            .json(query);
        self.fetch(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_is_normalised() {
        let api = HttpTelemetryApi::new("http://api.local:8000/", Duration::from_secs(1)).unwrap();
        assert_eq!(api.url("/api/diseases/"), "http://api.local:8000/api/diseases/");
    }
}
