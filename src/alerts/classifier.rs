use tracing::info;

use crate::alerts::sink::NotificationSink;
use crate::alerts::{GLASS_BREAKING_KEY, GLASS_BREAKING_TAG, VEHICLE_TAG};
use crate::config::CorrelatorConfig;
use crate::models::{DashboardAlert, TaggedSource};

/// Alert title for glass-breaking events
const GLASS_BREAKING_TITLE: &str = "Glass Breaking Event Detected!";

/// Body text when no corroborating tag was seen recently
const GENERIC_COMMENT: &str = "A glass breaking event was detected on the camera.";

/// Body text when a vehicle was detected shortly before the glass broke
const CORROBORATED_COMMENT: &str = "Glass breaking was detected recently after a vehicle was \
                                    detected on the camera. Please review the footage.";

/// Icon shown on the dashboard alert
const GLASS_BREAKING_ICON: &str = "explosion";

/// Classifies a source's current reading against the compound
/// glass-breaking pattern and dispatches the resulting alert.
///
/// The corroboration scan only looks at the triggering source's own
/// history, never at the transition matrix.
pub struct AlertClassifier {
    recent_tag_window_ms: i64,
    alert_ttl_ms: i64,
}

impl AlertClassifier {
    pub fn new(config: &CorrelatorConfig) -> Self {
        Self {
            recent_tag_window_ms: config.recent_tag_window_ms,
            alert_ttl_ms: config.alert_ttl_ms,
        }
    }

    /// Build the alert a source's current reading warrants, if any.
    ///
    /// A reading may carry several critical tags; only the first is acted
    /// on, so at most one alert is produced per qualifying reading. Absent
    /// readings, empty histories and missing corroboration are valid
    /// non-error outcomes that only narrow which body text is used.
    pub fn evaluate(&self, source: &dyn TaggedSource, now_ms: i64) -> Option<DashboardAlert> {
        let reading = source.recent_reading()?;
        if !reading.contains_tag(GLASS_BREAKING_TAG) {
            return None;
        }

        info!(camera = %source.label(), "glass breaking event detected");

        let mut comment = GENERIC_COMMENT;
        for past in source.reading_history() {
            if past.timestamp_ms <= now_ms - self.recent_tag_window_ms {
                // Older than the corroboration window
                continue;
            }
            if past.contains_tag(VEHICLE_TAG) {
                info!(camera = %source.label(), "vehicle event corroborates glass breaking");
                comment = CORROBORATED_COMMENT;
                break;
            }
        }

        Some(DashboardAlert::critical(
            GLASS_BREAKING_KEY,
            GLASS_BREAKING_TITLE,
            comment,
            GLASS_BREAKING_ICON,
            self.alert_ttl_ms,
        ))
    }

    /// Evaluate and hand the alert to the sink when one fires
    pub fn evaluate_and_alert(
        &self,
        source: &dyn TaggedSource,
        now_ms: i64,
        sink: &mut dyn NotificationSink,
    ) {
        if let Some(alert) = self.evaluate(source, now_ms) {
            sink.update_dashboard(alert);
        }
    }
}
