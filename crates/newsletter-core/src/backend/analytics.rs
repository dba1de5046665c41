// # Analytics Sinks
//
// - `TracingAnalyticsSink`: logs each event at info level
// - `ChannelAnalyticsSink`: forwards events to a bounded channel, dropping
//   them (with a warning) when the receiver lags or is gone

use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::traits::{AnalyticsEvent, AnalyticsSink};

/// Analytics sink that writes events to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAnalyticsSink;

impl AnalyticsSink for TracingAnalyticsSink {
    fn emit(&self, event: AnalyticsEvent) {
        match serde_json::to_string(&event) {
            Ok(payload) => info!(event = %event.event, "analytics {}", payload),
            Err(e) => warn!("Failed to serialize analytics event: {}", e),
        }
    }
}

/// Analytics sink that forwards events to a channel
#[derive(Debug, Clone)]
pub struct ChannelAnalyticsSink {
    tx: mpsc::Sender<AnalyticsEvent>,
}

impl ChannelAnalyticsSink {
    /// Create a sink and the receiver its events arrive on
    pub fn new(capacity: usize) -> (Self, mpsc::Receiver<AnalyticsEvent>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, rx)
    }
}

impl AnalyticsSink for ChannelAnalyticsSink {
    fn emit(&self, event: AnalyticsEvent) {
        if let Err(e) = self.tx.try_send(event) {
            warn!("Analytics channel unavailable, dropping event: {}", e);
        }
    }
}
