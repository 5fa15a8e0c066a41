use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A single tagged measurement from a camera
///
/// Multiple tags may co-occur at one timestamp. Readings are immutable once
/// recorded by the source. The derived ordering (tags lexicographically,
/// then timestamp) is the snapshot sort key used to fix the pairwise
/// iteration order of the correlator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub struct TagReading {
    /// Detection tags reported together (e.g. "Person", "Vehicle")
    pub tags: Vec<String>,

    /// Timestamp in milliseconds
    pub timestamp_ms: i64,
}

impl TagReading {
    pub fn new(tags: Vec<String>, timestamp_ms: i64) -> Self {
        Self { tags, timestamp_ms }
    }

    /// Check whether this reading carries the given tag
    pub fn contains_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

/// A camera-like device exposing tagged event readings.
///
/// Eligibility for correlation is this capability itself: a device
/// participates iff it implements the trait, replacing any runtime type
/// test on the device object.
pub trait TaggedSource {
    /// Stable device identity
    fn id(&self) -> &str;

    /// Human-readable label
    fn label(&self) -> &str;

    /// Most recent tag reading, if the device has reported one
    fn recent_reading(&self) -> Option<&TagReading>;

    /// Full reading history, newest first
    fn reading_history(&self) -> &[TagReading];
}

/// The host platform's device collection, narrowed to sources that expose
/// the tagged-reading capability.
pub trait SourceRegistry {
    /// Look up one tagged source by identity
    fn get(&self, source_id: &str) -> Option<&dyn TaggedSource>;

    /// All tagged sources currently known to the platform
    fn tagged_sources(&self) -> Vec<&dyn TaggedSource>;
}

/// One element of the snapshot handed to the correlator: a source identity
/// plus its most recent reading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceReading {
    /// Source identity
    pub source_id: String,

    /// Human-readable source label
    pub label: String,

    /// The source's most recent reading
    pub reading: TagReading,
}

impl SourceReading {
    /// Capture a snapshot element from a source, absent if the source has
    /// no current reading
    pub fn capture(source: &dyn TaggedSource) -> Option<Self> {
        source.recent_reading().map(|reading| Self {
            source_id: source.id().to_string(),
            label: source.label().to_string(),
            reading: reading.clone(),
        })
    }
}

/// Reference camera implementation backed by an in-memory reading history.
///
/// The production platform owns its own device objects; this type exists
/// for embedders without one and for tests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Camera {
    id: String,
    label: String,
    /// Reading history, newest first
    readings: Vec<TagReading>,
}

impl Camera {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            readings: Vec::new(),
        }
    }

    /// Record a new reading as the most recent one
    pub fn record_reading(&mut self, reading: TagReading) {
        self.readings.insert(0, reading);
    }
}

impl TaggedSource for Camera {
    fn id(&self) -> &str {
        &self.id
    }

    fn label(&self) -> &str {
        &self.label
    }

    fn recent_reading(&self) -> Option<&TagReading> {
        self.readings.first()
    }

    fn reading_history(&self) -> &[TagReading] {
        &self.readings
    }
}

/// In-memory source registry over [`Camera`] devices
#[derive(Debug, Clone, Default)]
pub struct InMemoryRegistry {
    cameras: BTreeMap<String, Camera>,
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a camera
    pub fn insert(&mut self, camera: Camera) {
        self.cameras.insert(camera.id.clone(), camera);
    }

    /// Mutable access for recording readings in tests and demos
    pub fn camera_mut(&mut self, source_id: &str) -> Option<&mut Camera> {
        self.cameras.get_mut(source_id)
    }
}

impl SourceRegistry for InMemoryRegistry {
    fn get(&self, source_id: &str) -> Option<&dyn TaggedSource> {
        self.cameras.get(source_id).map(|c| c as &dyn TaggedSource)
    }

    fn tagged_sources(&self) -> Vec<&dyn TaggedSource> {
        self.cameras.values().map(|c| c as &dyn TaggedSource).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reading_ordering_is_tags_then_timestamp() {
        let a = TagReading::new(vec!["Person".to_string()], 2_000);
        let b = TagReading::new(vec!["Person".to_string()], 1_000);
        let c = TagReading::new(vec!["Vehicle".to_string()], 500);

        let mut readings = vec![a.clone(), c.clone(), b.clone()];
        readings.sort();

        // "Person" sorts before "Vehicle"; equal tags fall back to timestamp
        assert_eq!(readings, vec![b, a, c]);
    }

    #[test]
    fn test_camera_history_is_newest_first() {
        let mut camera = Camera::new("cam-1", "Front Door");
        camera.record_reading(TagReading::new(vec!["Person".to_string()], 1_000));
        camera.record_reading(TagReading::new(vec!["Vehicle".to_string()], 2_000));

        assert_eq!(camera.recent_reading().unwrap().timestamp_ms, 2_000);
        assert_eq!(camera.reading_history()[1].timestamp_ms, 1_000);
    }

    #[test]
    fn test_capture_absent_without_reading() {
        let camera = Camera::new("cam-1", "Front Door");
        assert!(SourceReading::capture(&camera).is_none());
    }

    #[test]
    fn test_registry_lookup() {
        let mut registry = InMemoryRegistry::new();
        registry.insert(Camera::new("cam-1", "Front Door"));
        registry.insert(Camera::new("cam-2", "Driveway"));

        assert!(registry.get("cam-1").is_some());
        assert!(registry.get("cam-9").is_none());
        assert_eq!(registry.tagged_sources().len(), 2);
    }
}
