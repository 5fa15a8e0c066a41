use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info};

use crate::models::SourceReading;

/// Current schema version of the persisted matrix state
pub const MATRIX_SCHEMA_VERSION: u32 = 1;

/// One stored tag transition between two cameras.
///
/// The camera that observed the tag more recently always contributes the
/// first element, regardless of the owning record's `from`/`to`
/// orientation. Downstream consumers rely on this larger-timestamp-first
/// convention, not on the record labels.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TagOccurrence {
    /// Timestamp of the later observation
    pub later_ms: i64,

    /// Timestamp of the earlier observation
    pub earlier_ms: i64,
}

impl TagOccurrence {
    pub fn new(later_ms: i64, earlier_ms: i64) -> Self {
        Self {
            later_ms,
            earlier_ms,
        }
    }
}

/// Per-unordered-camera-pair storage of tag transition evidence.
///
/// Orientation is fixed the first time a pair is observed and never
/// flipped; both movement directions for the pair fold into this one
/// record, direction encoded by which timestamp is larger within each
/// occurrence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionRecord {
    /// Identity of the `from` leg of the fixed orientation
    pub from_id: String,

    /// Label of the `from` leg
    pub from_label: String,

    /// Identity of the `to` leg of the fixed orientation
    pub to_id: String,

    /// Label of the `to` leg
    pub to_label: String,

    /// Tag -> ordered occurrence list, most recently appended last
    pub occurrences: BTreeMap<String, Vec<TagOccurrence>>,
}

impl TransitionRecord {
    fn new(from: &SourceReading, to: &SourceReading) -> Self {
        Self {
            from_id: from.source_id.clone(),
            from_label: from.label.clone(),
            to_id: to.source_id.clone(),
            to_label: to.label.clone(),
            occurrences: BTreeMap::new(),
        }
    }

    /// Check whether this record covers the unordered pair `{a, b}`
    pub fn matches_pair(&self, a: &str, b: &str) -> bool {
        (self.from_id == a && self.to_id == b) || (self.from_id == b && self.to_id == a)
    }

    /// Append an occurrence for `tag` unless already stored, then prune the
    /// tag's list to occurrences whose earlier timestamp is strictly newer
    /// than `cutoff_ms`. Returns true when the occurrence was appended.
    ///
    /// Pruning runs only after an actual append, so a duplicate delivery of
    /// the same candidate leaves the list untouched.
    pub fn record_transition(&mut self, tag: &str, occurrence: TagOccurrence, cutoff_ms: i64) -> bool {
        let list = self.occurrences.entry(tag.to_string()).or_default();
        if list.contains(&occurrence) {
            return false;
        }

        list.push(occurrence);

        let original_count = list.len();
        list.retain(|occ| occ.earlier_ms > cutoff_ms);
        if list.len() != original_count {
            debug!(
                from = %self.from_label,
                to = %self.to_label,
                tag,
                pruned = original_count - list.len(),
                "pruned stale transition occurrences"
            );
        }

        true
    }

    /// Occurrence counts per tag
    pub fn tag_counts(&self) -> BTreeMap<&str, usize> {
        self.occurrences
            .iter()
            .map(|(tag, list)| (tag.as_str(), list.len()))
            .collect()
    }
}

/// The pairwise transition matrix across all known cameras.
///
/// Explicit versioned state owned by the correlator: created empty at
/// construction, records added lazily on first co-observation of a pair,
/// never removed afterwards. Only occurrence lists shrink, via pruning.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionMatrix {
    version: u32,
    records: Vec<TransitionRecord>,
}

impl Default for TransitionMatrix {
    fn default() -> Self {
        Self::new()
    }
}

impl TransitionMatrix {
    pub fn new() -> Self {
        Self {
            version: MATRIX_SCHEMA_VERSION,
            records: Vec::new(),
        }
    }

    /// Schema version this matrix was initialized with
    pub fn version(&self) -> u32 {
        self.version
    }

    /// Reset state restored from an older schema version
    pub fn migrate(&mut self) {
        if self.version != MATRIX_SCHEMA_VERSION {
            info!(
                from_version = self.version,
                to_version = MATRIX_SCHEMA_VERSION,
                "resetting transition matrix for schema upgrade"
            );
            *self = Self::new();
        }
    }

    /// Resolve the record for the unordered pair of `camera1` and
    /// `camera2`, creating it with orientation `(from = camera2,
    /// to = camera1)` on first observation.
    ///
    /// Both orientations are checked before creating; a second record for
    /// the same pair is an internal invariant violation, fatal in debug
    /// builds while release builds prefer the first match.
    pub fn record_for_pair(
        &mut self,
        camera1: &SourceReading,
        camera2: &SourceReading,
    ) -> &mut TransitionRecord {
        let mut matches = self
            .records
            .iter()
            .enumerate()
            .filter(|(_, r)| r.matches_pair(&camera1.source_id, &camera2.source_id))
            .map(|(idx, _)| idx);

        let first = matches.next();
        debug_assert!(
            matches.next().is_none(),
            "duplicate transition record for pair {{{}, {}}}",
            camera1.source_id,
            camera2.source_id
        );
        drop(matches);

        match first {
            Some(idx) => &mut self.records[idx],
            None => {
                self.records.push(TransitionRecord::new(camera2, camera1));
                self.records.last_mut().unwrap()
            }
        }
    }

    /// Look up the record covering the unordered pair `{a, b}`
    pub fn get(&self, a: &str, b: &str) -> Option<&TransitionRecord> {
        self.records.iter().find(|r| r.matches_pair(a, b))
    }

    /// All records, in creation order
    pub fn records(&self) -> &[TransitionRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Deterministic per-record occurrence lines, sorted by from-label then
    /// to-label: `"<from> >> <to>: {tag: [...]}"`
    pub fn summaries(&self) -> Vec<String> {
        let mut sorted: Vec<&TransitionRecord> = self.records.iter().collect();
        sorted.sort_by(|a, b| {
            (a.from_label.as_str(), a.to_label.as_str())
                .cmp(&(b.from_label.as_str(), b.to_label.as_str()))
        });

        sorted
            .iter()
            .map(|r| {
                format!(
                    "{} >> {}: {}",
                    r.from_label,
                    r.to_label,
                    serde_json::to_string(&r.occurrences).unwrap_or_default()
                )
            })
            .collect()
    }

    /// Deterministic per-record count lines, same ordering as
    /// [`summaries`](Self::summaries)
    pub fn count_summaries(&self) -> Vec<String> {
        let mut sorted: Vec<&TransitionRecord> = self.records.iter().collect();
        sorted.sort_by(|a, b| {
            (a.from_label.as_str(), a.to_label.as_str())
                .cmp(&(b.from_label.as_str(), b.to_label.as_str()))
        });

        sorted
            .iter()
            .map(|r| {
                format!(
                    "{} >> {}: {}",
                    r.from_label,
                    r.to_label,
                    serde_json::to_string(&r.tag_counts()).unwrap_or_default()
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TagReading;

    fn reading(id: &str, tags: &[&str], timestamp_ms: i64) -> SourceReading {
        SourceReading {
            source_id: id.to_string(),
            label: id.to_string(),
            reading: TagReading::new(tags.iter().map(|t| t.to_string()).collect(), timestamp_ms),
        }
    }

    #[test]
    fn test_single_record_per_unordered_pair() {
        let cam1 = reading("cam-1", &["Person"], 2_000);
        let cam2 = reading("cam-2", &["Person"], 1_000);

        let mut matrix = TransitionMatrix::new();
        matrix.record_for_pair(&cam1, &cam2);
        // Reverse visit must resolve to the same record
        matrix.record_for_pair(&cam2, &cam1);

        assert_eq!(matrix.len(), 1);
    }

    #[test]
    fn test_orientation_fixed_at_creation() {
        let cam1 = reading("cam-1", &["Person"], 2_000);
        let cam2 = reading("cam-2", &["Person"], 1_000);

        let mut matrix = TransitionMatrix::new();
        matrix.record_for_pair(&cam1, &cam2);

        let record = matrix.get("cam-1", "cam-2").unwrap();
        assert_eq!(record.from_id, "cam-2");
        assert_eq!(record.to_id, "cam-1");

        // A later reverse visit does not flip the orientation
        matrix.record_for_pair(&cam2, &cam1);
        let record = matrix.get("cam-1", "cam-2").unwrap();
        assert_eq!(record.from_id, "cam-2");
        assert_eq!(record.to_id, "cam-1");
    }

    #[test]
    fn test_no_duplicate_occurrences() {
        let cam1 = reading("cam-1", &["Person"], 2_000);
        let cam2 = reading("cam-2", &["Person"], 1_000);

        let mut matrix = TransitionMatrix::new();
        let record = matrix.record_for_pair(&cam1, &cam2);

        assert!(record.record_transition("Person", TagOccurrence::new(2_000, 1_000), 0));
        assert!(!record.record_transition("Person", TagOccurrence::new(2_000, 1_000), 0));

        assert_eq!(record.occurrences["Person"].len(), 1);
    }

    #[test]
    fn test_prune_requires_strictly_newer_than_cutoff() {
        let cam1 = reading("cam-1", &["Person"], 2_000);
        let cam2 = reading("cam-2", &["Person"], 1_000);

        let mut matrix = TransitionMatrix::new();
        let record = matrix.record_for_pair(&cam1, &cam2);

        record.record_transition("Person", TagOccurrence::new(2_000, 1_000), 0);
        // earlier_ms == cutoff is excluded; the trigger occurrence survives
        record.record_transition("Person", TagOccurrence::new(9_000, 8_000), 1_000);

        assert_eq!(
            record.occurrences["Person"],
            vec![TagOccurrence::new(9_000, 8_000)]
        );
    }

    #[test]
    fn test_prune_keeps_occurrences_inside_window() {
        let cam1 = reading("cam-1", &["Person"], 2_000);
        let cam2 = reading("cam-2", &["Person"], 1_000);

        let mut matrix = TransitionMatrix::new();
        let record = matrix.record_for_pair(&cam1, &cam2);

        record.record_transition("Person", TagOccurrence::new(2_000, 1_001), 0);
        record.record_transition("Person", TagOccurrence::new(9_000, 8_000), 1_000);

        assert_eq!(record.occurrences["Person"].len(), 2);
    }

    #[test]
    fn test_migrate_resets_old_versions() {
        let mut matrix = TransitionMatrix::new();
        let cam1 = reading("cam-1", &["Person"], 2_000);
        let cam2 = reading("cam-2", &["Person"], 1_000);
        matrix.record_for_pair(&cam1, &cam2);

        matrix.version = 0;
        matrix.migrate();

        assert!(matrix.is_empty());
        assert_eq!(matrix.version(), MATRIX_SCHEMA_VERSION);
    }

    #[test]
    fn test_summaries_are_sorted_and_deterministic() {
        let cam_b = reading("cam-b", &["Person"], 2_000);
        let cam_a = reading("cam-a", &["Person"], 1_000);
        let cam_c = reading("cam-c", &["Person"], 3_000);

        let mut matrix = TransitionMatrix::new();
        matrix
            .record_for_pair(&cam_c, &cam_a)
            .record_transition("Person", TagOccurrence::new(3_000, 1_000), 0);
        matrix
            .record_for_pair(&cam_b, &cam_a)
            .record_transition("Person", TagOccurrence::new(2_000, 1_000), 0);

        let counts = matrix.count_summaries();
        assert_eq!(
            counts,
            vec![
                "cam-a >> cam-b: {\"Person\":1}".to_string(),
                "cam-a >> cam-c: {\"Person\":1}".to_string(),
            ]
        );
    }
}
