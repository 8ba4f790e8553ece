// Live feed service - Rolling window of readings from the upstream feed
use crate::application::chart_renderer::render;
use crate::domain::drawing::Drawing;
use crate::domain::live::{LiveFrame, LiveReading, READING_TOPIC};
use crate::error::Result;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

pub const DEFAULT_WINDOW: usize = 300;
const SUBSCRIBER_BUFFER: usize = 100;

struct Subscriber {
    sensor_filter: Option<String>,
    tx: mpsc::Sender<LiveReading>,
}

#[derive(Default)]
struct LiveState {
    window: VecDeque<LiveReading>,
    subscribers: Vec<Subscriber>,
}

#[derive(Clone)]
pub struct LiveFeedService {
    capacity: usize,
    state: Arc<Mutex<LiveState>>,
}

impl LiveFeedService {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            state: Arc::new(Mutex::new(LiveState::default())),
        }
    }

    /// Decode one feed frame and publish it. Frames on other topics are
    /// ignored and yield `Ok(None)`.
    pub fn ingest_frame(&self, frame: &str) -> Result<Option<LiveReading>> {
        let frame: LiveFrame = serde_json::from_str(frame)?;
        if frame.topic != READING_TOPIC {
            tracing::debug!("Ignoring live frame with topic {}", frame.topic);
            return Ok(None);
        }
        let reading: LiveReading = serde_json::from_value(frame.data)?;
        self.publish(reading.clone());
        Ok(Some(reading))
    }

    pub fn publish(&self, reading: LiveReading) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());

        state.subscribers.retain(|sub| {
            if sub.tx.is_closed() {
                return false;
            }
            if reading.matches(sub.sensor_filter.as_deref()) {
                if let Err(mpsc::error::TrySendError::Full(_)) = sub.tx.try_send(reading.clone()) {
                    tracing::warn!("Live subscriber lagging, dropped reading {}", reading.id);
                }
            }
            true
        });

        state.window.push_back(reading);
        while state.window.len() > self.capacity {
            state.window.pop_front();
        }
    }

    /// Buffered readings for a sensor (all sensors when the filter is empty), oldest first.
    pub fn window(&self, sensor_filter: Option<&str>) -> Vec<LiveReading> {
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state
            .window
            .iter()
            .filter(|r| r.matches(sensor_filter))
            .cloned()
            .collect()
    }

    pub fn subscribe(&self, sensor_filter: Option<String>) -> mpsc::Receiver<LiveReading> {
        let (tx, rx) = mpsc::channel(SUBSCRIBER_BUFFER);
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.subscribers.push(Subscriber { sensor_filter, tx });
        rx
    }

    pub fn render_window(&self, sensor_filter: Option<&str>) -> Drawing {
        let readings = self.window(sensor_filter);
        let labels: Vec<&str> = readings.iter().map(|r| r.ts.as_str()).collect();
        let data: Vec<f64> = readings.iter().map(|r| r.value).collect();
        let title = match sensor_filter {
            Some(id) if !id.is_empty() => format!("Live readings ({})", id),
            _ => "Live readings".to_string(),
        };
        render(&labels, &data, &[], "", &title)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DashboardError;

    fn frame(id: i64, sensor: &str, value: f64) -> String {
        format!(
            r#"{{"topic":"reading.new","data":{{"id":{},"sensor_id":"{}","ts":"2024-01-01T10:{:02}:00","value":{}}}}}"#,
            id,
            sensor,
            id % 60,
            value
        )
    }

    #[test]
    fn test_window_keeps_last_readings() {
        let feed = LiveFeedService::new(3);
        for i in 0..5 {
            feed.ingest_frame(&frame(i, "s1", i as f64)).unwrap();
        }
        let ids: Vec<i64> = feed.window(None).iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 3, 4]);
    }

    #[test]
    fn test_window_filters_by_sensor() {
        let feed = LiveFeedService::new(DEFAULT_WINDOW);
        feed.ingest_frame(&frame(1, "a", 1.0)).unwrap();
        feed.ingest_frame(&frame(2, "b", 2.0)).unwrap();
        feed.ingest_frame(&frame(3, "a", 3.0)).unwrap();

        assert_eq!(feed.window(Some("a")).len(), 2);
        assert_eq!(feed.window(Some("")).len(), 3);
    }

    #[test]
    fn test_other_topics_and_bad_frames() {
        let feed = LiveFeedService::new(DEFAULT_WINDOW);
        let ignored = feed
            .ingest_frame(r#"{"topic":"sensor.registered","data":{}}"#)
            .unwrap();
        assert!(ignored.is_none());
        assert!(feed.window(None).is_empty());

        let err = feed.ingest_frame("not json").unwrap_err();
        assert!(matches!(err, DashboardError::MalformedFrame(_)));

        let err = feed
            .ingest_frame(r#"{"topic":"reading.new","data":{"id":1}}"#)
            .unwrap_err();
        assert!(matches!(err, DashboardError::MalformedFrame(_)));
    }

    #[tokio::test]
    async fn test_subscribers_receive_matching_readings() {
        let feed = LiveFeedService::new(DEFAULT_WINDOW);
        let mut only_b = feed.subscribe(Some("b".into()));
        let mut all = feed.subscribe(None);

        feed.ingest_frame(&frame(1, "a", 1.0)).unwrap();
        feed.ingest_frame(&frame(2, "b", 2.0)).unwrap();

        assert_eq!(only_b.recv().await.unwrap().id, 2);
        assert_eq!(all.recv().await.unwrap().id, 1);
        assert_eq!(all.recv().await.unwrap().id, 2);
    }

    #[test]
    fn test_closed_subscribers_are_dropped() {
        let feed = LiveFeedService::new(DEFAULT_WINDOW);
        let rx = feed.subscribe(None);
        drop(rx);
        feed.ingest_frame(&frame(1, "a", 1.0)).unwrap();
        assert!(feed.state.lock().unwrap().subscribers.is_empty());
    }

    #[test]
    fn test_render_window() {
        let feed = LiveFeedService::new(DEFAULT_WINDOW);
        assert!(feed.render_window(None).is_placeholder());

        feed.ingest_frame(&frame(1, "a", 21.5)).unwrap();
        feed.ingest_frame(&frame(2, "a", 22.0)).unwrap();
        let drawing = feed.render_window(Some("a"));
        assert_eq!(drawing.title, "Live readings (a)");
        let plot = drawing.plot.expect("plot");
        assert_eq!(plot.path.points().count(), 2);
    }
}
