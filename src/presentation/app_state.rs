// Application state for HTTP handlers
use crate::application::charts_service::ChartsService;
use crate::application::live_feed_service::LiveFeedService;

#[derive(Clone)]
pub struct AppState {
    pub charts_service: ChartsService,
    pub live_feed: LiveFeedService,
}
