/// Alert classification and dispatch
///
/// This module provides:
/// - The compound-pattern classifier (critical tag corroborated by a
///   recent secondary tag)
/// - The notification sink trait the host dashboard implements
/// - Tracing-backed and in-memory sink implementations

pub mod classifier;
pub mod sink;

pub use classifier::AlertClassifier;
pub use sink::{NotificationSink, RecordingSink, TracingSink};

/// High-severity tag that triggers an alert
pub const GLASS_BREAKING_TAG: &str = "Glass Breaking";

/// Secondary tag whose recent presence upgrades the alert body text
pub const VEHICLE_TAG: &str = "Vehicle";

/// Stable dashboard key for glass-breaking alerts
pub const GLASS_BREAKING_KEY: &str = "glass_breaking";
