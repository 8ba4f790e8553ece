// HTTP request handlers
use crate::application::chart_renderer::render;
use crate::application::charts_service::{ChartPanel, ChartRequest, DiseaseSelection};
use crate::domain::drawing::Drawing;
use crate::domain::metric::{Aggregate, Interval, Range};
use crate::domain::sensor::Sensor;
use crate::domain::timeseries::TimeseriesResult;
use crate::error::{DashboardError, Result};
use crate::infrastructure::chunked_json::stream_from_receiver;
use crate::infrastructure::http_response::{accepts_brotli, svg_response};
use crate::infrastructure::svg_writer::drawing_to_svg;
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Default, Deserialize)]
pub struct ChartQuery {
    pub disease: Option<String>,
    pub serial: Option<String>,
    pub metric: Option<String>,
    pub interval: Option<String>,
    pub agg: Option<String>,
    pub range: Option<String>,
}

impl ChartQuery {
    fn into_request(self, house_id: String) -> Result<ChartRequest> {
        Ok(ChartRequest {
            house_id,
            disease: self.disease,
            serial: self.serial,
            metric: self.metric,
            interval: self
                .interval
                .as_deref()
                .map(str::parse::<Interval>)
                .transpose()?
                .unwrap_or_default(),
            agg: self
                .agg
                .as_deref()
                .map(str::parse::<Aggregate>)
                .transpose()?
                .unwrap_or_default(),
            range: self
                .range
                .as_deref()
                .map(str::parse::<Range>)
                .transpose()?
                .unwrap_or_default(),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct PanelQuery {
    pub disease: Option<String>,
    pub metric: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LiveQuery {
    pub sensor_id: Option<String>,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/healthz", get(health_check))
        .route("/sensors", get(list_last_house_sensors))
        .route("/houses/:house_id/sensors", get(list_sensors))
        .route("/houses/:house_id/panel", get(chart_panel))
        .route("/houses/:house_id/chart.svg", get(chart_svg))
        .route("/diseases", get(list_diseases))
        .route("/diseases/selected", delete(clear_disease))
        .route("/diseases/selected/:key", put(select_disease))
        .route("/charts/render", post(render_chart))
        .route("/live/frames", post(ingest_live_frame))
        .route("/live/chart.svg", get(live_chart_svg))
        .route("/live/stream", get(live_stream))
        .with_state(state)
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

pub async fn list_sensors(
    Path(house_id): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Sensor>>> {
    Ok(Json(state.charts_service.sensors(&house_id).await?))
}

/// Sensors of the most recently viewed household
pub async fn list_last_house_sensors(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Sensor>>> {
    let house_id = state
        .charts_service
        .last_house()
        .ok_or_else(|| DashboardError::InvalidRequest("Missing house_id".into()))?;
    Ok(Json(state.charts_service.sensors(&house_id).await?))
}

pub async fn list_diseases(State(state): State<Arc<AppState>>) -> Json<DiseaseSelection> {
    Json(state.charts_service.diseases().await)
}

pub async fn select_disease(
    Path(key): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<StatusCode> {
    state.charts_service.select_disease(&key).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn clear_disease(State(state): State<Arc<AppState>>) -> Result<StatusCode> {
    state.charts_service.clear_disease()?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn chart_panel(
    Path(house_id): Path<String>,
    Query(query): Query<PanelQuery>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<ChartPanel>> {
    let panel = state
        .charts_service
        .panel(
            &house_id,
            query.disease.as_deref(),
            query.metric.as_deref().filter(|m| !m.is_empty()),
        )
        .await?;
    Ok(Json(panel))
}

/// Historical chart for a household as SVG
pub async fn chart_svg(
    Path(house_id): Path<String>,
    Query(query): Query<ChartQuery>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Result<Response> {
    let request = query.into_request(house_id)?;
    let now = chrono::Local::now().naive_local();
    let drawing = state.charts_service.load_chart(&request, now).await?;
    Ok(svg(&drawing, accepts_brotli(&headers)).await)
}

/// Render a timeseries supplied by the caller
pub async fn render_chart(headers: HeaderMap, Json(result): Json<TimeseriesResult>) -> Response {
    let drawing = render(
        &result.labels,
        result.primary_data(),
        &result.thresholds,
        &result.unit,
        &result.title,
    );
    svg(&drawing, accepts_brotli(&headers)).await
}

/// Accept one raw frame relayed from the upstream live feed
pub async fn ingest_live_frame(
    State(state): State<Arc<AppState>>,
    body: String,
) -> Result<StatusCode> {
    match state.live_feed.ingest_frame(&body) {
        Ok(_) => Ok(StatusCode::ACCEPTED),
        Err(e) => {
            tracing::warn!("Rejected live frame: {}", e);
            Err(e)
        }
    }
}

pub async fn live_chart_svg(
    Query(query): Query<LiveQuery>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response {
    let drawing = state.live_feed.render_window(query.sensor_id.as_deref());
    svg(&drawing, accepts_brotli(&headers)).await
}

/// Stream subsequent live readings as length-prefixed JSON chunks
pub async fn live_stream(
    Query(query): Query<LiveQuery>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let rx = state.live_feed.subscribe(query.sensor_id.filter(|s| !s.is_empty()));
    stream_from_receiver(rx, accepts_brotli(&headers)).await
}

async fn svg(drawing: &Drawing, compress: bool) -> Response {
    match svg_response(drawing_to_svg(drawing), compress).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::charts_service::ChartsService;
    use crate::application::live_feed_service::LiveFeedService;
    use crate::application::selection_store::{InMemorySelectionStore, SelectionStore, DISEASE_KEY};
    use crate::infrastructure::http_api::HttpTelemetryApi;
    use std::time::Duration;

    #[tokio::test]
    async fn test_clear_disease_handler() {
        let api = HttpTelemetryApi::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap();
        let store = Arc::new(InMemorySelectionStore::new());
        store.set(DISEASE_KEY, "asthma").unwrap();
        let state = Arc::new(AppState {
            charts_service: ChartsService::new(Arc::new(api), store.clone()),
            live_feed: LiveFeedService::new(10),
        });

        let status = clear_disease(State(state)).await.unwrap();
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(store.get(DISEASE_KEY), None);
    }

    #[test]
    fn test_chart_query_defaults() {
        let request = ChartQuery::default().into_request("h1".into()).unwrap();
        assert_eq!(request.house_id, "h1");
        assert_eq!(request.interval.to_string(), "5m");
        assert_eq!(request.agg, Aggregate::Avg);
        assert_eq!(request.range, Range::Last24h);
    }

    #[test]
    fn test_chart_query_parses_controls() {
        let query = ChartQuery {
            interval: Some("1h".into()),
            agg: Some("sum".into()),
            range: Some("6h".into()),
            ..Default::default()
        };
        let request = query.into_request("h1".into()).unwrap();
        assert_eq!(request.interval.to_string(), "1h");
        assert_eq!(request.agg, Aggregate::Sum);
        assert_eq!(request.range, Range::Last6h);
    }

    #[test]
    fn test_chart_query_rejects_bad_interval() {
        let query = ChartQuery {
            interval: Some("soon".into()),
            ..Default::default()
        };
        let err = query.into_request("h1".into()).unwrap_err();
        assert!(matches!(err, DashboardError::InvalidRequest(_)));
    }
}
