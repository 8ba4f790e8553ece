// Application layer - Use cases and ports
pub mod chart_renderer;
pub mod charts_service;
pub mod live_feed_service;
pub mod selection_store;
pub mod telemetry_api;
