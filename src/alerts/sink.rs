use std::cell::RefCell;
use std::rc::Rc;
use tracing::info;

use crate::models::DashboardAlert;

/// External notification/dashboard sink.
///
/// The sink owns deduplication and display: alerts sharing a key replace
/// each other, and the TTL tells the sink when an alert may be considered
/// stale. Dispatch is synchronous and trusted; failures do not propagate
/// back into the engine.
pub trait NotificationSink {
    /// Accept a severity-classified alert
    fn update_dashboard(&mut self, alert: DashboardAlert);
}

/// Sink that logs alerts through tracing, for embedders without a
/// dashboard connection
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn update_dashboard(&mut self, alert: DashboardAlert) {
        info!(
            key = %alert.key,
            priority = %alert.priority,
            ttl_ms = alert.ttl_ms,
            payload = %serde_json::to_string(&alert).unwrap_or_default(),
            "dashboard alert"
        );
    }
}

/// Sink that records every alert it receives, for tests and inspection.
///
/// Clones share the same alert log, so a handle kept outside the engine
/// observes everything the engine's copy received. Single-threaded by
/// design, like the engine itself.
#[derive(Debug, Default, Clone)]
pub struct RecordingSink {
    alerts: Rc<RefCell<Vec<DashboardAlert>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Alerts received so far, in delivery order
    pub fn alerts(&self) -> Vec<DashboardAlert> {
        self.alerts.borrow().clone()
    }
}

impl NotificationSink for RecordingSink {
    fn update_dashboard(&mut self, alert: DashboardAlert) {
        self.alerts.borrow_mut().push(alert);
    }
}
