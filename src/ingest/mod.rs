//! Event ingest adapter.
//!
//! Sole entry point driving the correlator: the host platform delivers one
//! reading-updated callback per measurement, and this module assembles the
//! sorted snapshot, updates the transition matrix and runs the alert
//! classifier. It also carries the platform's remaining dispatch contract:
//! log-only lifecycle stubs and an enumerated data-stream router.

use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::str::FromStr;
use tracing::{debug, info, warn};

use crate::alerts::{AlertClassifier, NotificationSink};
use crate::config::CorrelatorConfig;
use crate::correlation::TransitionCorrelator;
use crate::models::{SourceReading, SourceRegistry};
use crate::time::{Clock, SystemClock};

/// Addresses this engine accepts on the inter-module data stream.
///
/// Messages arrive addressed by string; parsing into this enum replaces
/// the platform's dynamic attribute lookup on the receiving object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumString)]
#[strum(serialize_all = "snake_case")]
pub enum StreamAddress {
    /// Reinitialize the transition matrix
    ResetTransitionMatrix,

    /// User resolved the glass-breaking dashboard alert
    GlassBreaking,
}

type StreamHandler = fn(&mut CameraEventEngine, &serde_json::Value);

/// Static address -> handler mapping for data-stream messages
static STREAM_HANDLERS: Lazy<HashMap<StreamAddress, StreamHandler>> = Lazy::new(|| {
    let mut handlers: HashMap<StreamAddress, StreamHandler> = HashMap::new();
    handlers.insert(
        StreamAddress::ResetTransitionMatrix,
        CameraEventEngine::handle_reset_transition_matrix,
    );
    handlers.insert(
        StreamAddress::GlassBreaking,
        CameraEventEngine::handle_glass_breaking_resolved,
    );
    handlers
});

/// Callback-driven engine tying the correlator and classifier to the host
/// platform's device-change notifier.
///
/// Strictly sequential: the platform delivers one event at a time and no
/// call suspends or blocks.
pub struct CameraEventEngine {
    config: CorrelatorConfig,
    correlator: TransitionCorrelator,
    classifier: AlertClassifier,
    clock: Box<dyn Clock>,
    sink: Box<dyn NotificationSink>,
}

impl CameraEventEngine {
    /// Create an engine on the wall clock
    pub fn new(config: CorrelatorConfig, sink: Box<dyn NotificationSink>) -> Self {
        Self::with_clock(config, Box::new(SystemClock), sink)
    }

    /// Create an engine with an explicit clock
    pub fn with_clock(
        config: CorrelatorConfig,
        clock: Box<dyn Clock>,
        sink: Box<dyn NotificationSink>,
    ) -> Self {
        Self {
            correlator: TransitionCorrelator::new(&config),
            classifier: AlertClassifier::new(&config),
            config,
            clock,
            sink,
        }
    }

    /// A source's readings were updated.
    ///
    /// Invoked at most once per physical update; duplicate invocations for
    /// the same logical event are tolerated since downstream appends are
    /// deduplicated. A source the registry cannot resolve to a tagged
    /// source is simply not a correlation participant. Never fails.
    pub fn on_reading_updated(&mut self, registry: &dyn SourceRegistry, source_id: &str) {
        let Some(source) = registry.get(source_id) else {
            debug!(source_id, "reading update from a source without tagged readings");
            return;
        };

        let now_ms = self.clock.now_ms();

        // Snapshot of every tagged source's current reading; absent
        // readings mean "no recent tags", not an error. Sorting by the
        // reading tuple fixes the pairwise iteration order.
        let mut snapshot: Vec<SourceReading> = registry
            .tagged_sources()
            .into_iter()
            .filter_map(SourceReading::capture)
            .collect();
        snapshot.sort_by(|a, b| a.reading.cmp(&b.reading));

        info!(
            camera = %source.label(),
            snapshot = %serde_json::to_string(&snapshot).unwrap_or_default(),
            "camera tag snapshot"
        );

        self.correlator.update(&snapshot, now_ms);

        for line in self.correlator.matrix().summaries() {
            debug!(matrix = %line, "transition matrix");
        }
        for line in self.correlator.matrix().count_summaries() {
            debug!(matrix = %line, "transition matrix counts");
        }

        self.classifier
            .evaluate_and_alert(source, now_ms, self.sink.as_mut());
    }

    /// Data stream message received; unknown addresses are ignored
    pub fn datastream_updated(&mut self, address: &str, content: &serde_json::Value) {
        match StreamAddress::from_str(address) {
            Ok(parsed) => {
                info!(address = %parsed, "datastream message");
                if let Some(handler) = STREAM_HANDLERS.get(&parsed) {
                    handler(self, content);
                }
            }
            Err(_) => {
                warn!(address, "ignoring datastream message with unknown address");
            }
        }
    }

    fn handle_reset_transition_matrix(&mut self, _content: &serde_json::Value) {
        info!("reinitializing transition matrix");
        self.correlator.reset();
    }

    fn handle_glass_breaking_resolved(&mut self, content: &serde_json::Value) {
        info!(
            content = %content,
            "glass breaking alert dismissed by the user"
        );
    }

    /// Read access to the correlator
    pub fn correlator(&self) -> &TransitionCorrelator {
        &self.correlator
    }

    /// Effective configuration
    pub fn config(&self) -> &CorrelatorConfig {
        &self.config
    }

    // --- Pass-through lifecycle stubs required by the platform's dispatch
    // contract; none of these participate in correlation. ---

    /// Occupancy mode changed
    pub fn mode_updated(&self, mode: &str) {
        debug!(mode, "mode updated");
    }

    /// A device is new or its goal/scenario changed
    pub fn metadata_updated(&self, source_id: &str) {
        debug!(source_id, "device metadata updated");
    }

    /// A device raised a platform alert (connect/disconnect, status)
    pub fn device_alert(&self, source_id: &str, alert_type: &str) {
        debug!(source_id, alert_type, "device alert");
    }

    /// A device is being removed from the account
    pub fn device_deleted(&self, source_id: &str) {
        debug!(source_id, "device deleted");
    }

    /// The user answered a question
    pub fn question_answered(&self, question_key: &str) {
        debug!(question_key, "question answered");
    }

    /// A hard-coded runtime schedule fired
    pub fn schedule_fired(&self, schedule_id: &str) {
        debug!(schedule_id, "schedule fired");
    }

    /// An engine timer fired
    pub fn timer_fired(&self, argument: &str) {
        debug!(argument, "timer fired");
    }

    /// A device uploaded a file
    pub fn file_uploaded(&self, source_id: &str, file_id: &str, filesize_bytes: u64) {
        debug!(source_id, file_id, filesize_bytes, "file uploaded");
    }

    /// The parent proxy device reported new coordinates
    pub fn coordinates_updated(&self, latitude: f64, longitude: f64) {
        debug!(latitude, longitude, "coordinates updated");
    }
}
