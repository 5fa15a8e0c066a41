use tracing::debug;

use crate::config::CorrelatorConfig;
use crate::correlation::matrix::{TagOccurrence, TransitionMatrix};
use crate::models::SourceReading;

/// Online correlator owning the pairwise transition matrix.
///
/// Each update performs an O(n²) pass over the snapshot, visiting every
/// ordered camera pair so both movement directions are tested against the
/// single record kept per unordered pair. Sole mutator of the matrix;
/// callers must deliver updates sequentially.
pub struct TransitionCorrelator {
    transition_window_ms: i64,
    matrix: TransitionMatrix,
}

impl TransitionCorrelator {
    /// Create a correlator with an empty, schema-versioned matrix
    pub fn new(config: &CorrelatorConfig) -> Self {
        Self {
            transition_window_ms: config.transition_window_ms,
            matrix: TransitionMatrix::new(),
        }
    }

    /// Restore a correlator around previously persisted matrix state,
    /// resetting it if the schema version changed
    pub fn with_matrix(config: &CorrelatorConfig, mut matrix: TransitionMatrix) -> Self {
        matrix.migrate();
        Self {
            transition_window_ms: config.transition_window_ms,
            matrix,
        }
    }

    /// Fold one sorted snapshot of current readings into the matrix.
    ///
    /// For every ordered pair `(camera1, camera2)` and every tag present in
    /// both current readings, a transition is recorded when `camera1`
    /// observed the tag strictly more recently. The later timestamp always
    /// comes first in the stored occurrence. Appends are deduplicated and
    /// each touched tag list is pruned to the trailing window.
    ///
    /// A snapshot with no tag overlap between any pair leaves the matrix
    /// unchanged; this call never fails.
    pub fn update(&mut self, snapshot: &[SourceReading], now_ms: i64) {
        let cutoff_ms = now_ms - self.transition_window_ms;

        for camera1 in snapshot {
            for camera2 in snapshot {
                if camera1.source_id == camera2.source_id {
                    continue;
                }

                let record = self.matrix.record_for_pair(camera1, camera2);

                for tag in &camera1.reading.tags {
                    if !camera2.reading.contains_tag(tag) {
                        continue;
                    }

                    // Recency ordering between the two readings decides the
                    // later leg, not the record's fixed orientation
                    if camera1.reading.timestamp_ms > camera2.reading.timestamp_ms {
                        let occurrence = TagOccurrence::new(
                            camera1.reading.timestamp_ms,
                            camera2.reading.timestamp_ms,
                        );
                        if record.record_transition(tag, occurrence, cutoff_ms) {
                            debug!(
                                tag,
                                later = %camera1.label,
                                earlier = %camera2.label,
                                "tag transition recorded"
                            );
                        }
                    }
                }
            }
        }
    }

    /// Read access to the matrix
    pub fn matrix(&self) -> &TransitionMatrix {
        &self.matrix
    }

    /// Reinitialize the matrix; the only way existing records disappear
    pub fn reset(&mut self) {
        self.matrix = TransitionMatrix::new();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TagReading;
    use crate::time::ONE_MINUTE_MS;

    fn reading(id: &str, tags: &[&str], timestamp_ms: i64) -> SourceReading {
        SourceReading {
            source_id: id.to_string(),
            label: id.to_string(),
            reading: TagReading::new(tags.iter().map(|t| t.to_string()).collect(), timestamp_ms),
        }
    }

    fn correlator() -> TransitionCorrelator {
        TransitionCorrelator::new(&CorrelatorConfig::default())
    }

    #[test]
    fn test_transition_stores_later_timestamp_first() {
        let mut correlator = correlator();

        // Cam2 saw "Person" later than Cam1
        let snapshot = vec![
            reading("cam-2", &["Person"], 2_000),
            reading("cam-1", &["Person"], 1_000),
        ];
        correlator.update(&snapshot, 2_000);

        let record = correlator.matrix().get("cam-1", "cam-2").unwrap();
        assert_eq!(
            record.occurrences["Person"],
            vec![TagOccurrence::new(2_000, 1_000)]
        );
    }

    #[test]
    fn test_no_tag_overlap_is_a_no_op_on_occurrences() {
        let mut correlator = correlator();

        let snapshot = vec![
            reading("cam-1", &["Person"], 2_000),
            reading("cam-2", &["Vehicle"], 1_000),
        ];
        correlator.update(&snapshot, 2_000);

        // The pair record exists but holds no occurrences
        let record = correlator.matrix().get("cam-1", "cam-2").unwrap();
        assert!(record.occurrences.is_empty());
    }

    #[test]
    fn test_duplicate_delivery_is_idempotent() {
        let mut correlator = correlator();

        let snapshot = vec![
            reading("cam-2", &["Person"], 2_000),
            reading("cam-1", &["Person"], 1_000),
        ];
        correlator.update(&snapshot, 2_000);
        correlator.update(&snapshot, 2_000);

        let record = correlator.matrix().get("cam-1", "cam-2").unwrap();
        assert_eq!(record.occurrences["Person"].len(), 1);
        assert_eq!(correlator.matrix().len(), 1);
    }

    #[test]
    fn test_both_directions_fold_into_one_record() {
        let mut correlator = correlator();

        let snapshot = vec![
            reading("cam-2", &["Person"], 2_000),
            reading("cam-1", &["Person"], 1_000),
        ];
        correlator.update(&snapshot, 2_000);

        // Movement back the other way a minute later
        let snapshot = vec![
            reading("cam-2", &["Person"], 2_000),
            reading("cam-1", &["Person"], 2_000 + ONE_MINUTE_MS),
        ];
        correlator.update(&snapshot, 2_000 + ONE_MINUTE_MS);

        assert_eq!(correlator.matrix().len(), 1);
        let record = correlator.matrix().get("cam-1", "cam-2").unwrap();
        assert_eq!(
            record.occurrences["Person"],
            vec![
                TagOccurrence::new(2_000, 1_000),
                TagOccurrence::new(2_000 + ONE_MINUTE_MS, 2_000),
            ]
        );
    }

    #[test]
    fn test_stale_occurrences_pruned_on_next_update() {
        let mut correlator = correlator();

        let snapshot = vec![
            reading("cam-2", &["Person"], 2_000),
            reading("cam-1", &["Person"], 1_000),
        ];
        correlator.update(&snapshot, 2_000);

        // Twenty minutes later the same tag transitions again; the old
        // occurrence's earlier timestamp is now outside the window
        let later = 2_000 + 20 * ONE_MINUTE_MS;
        let snapshot = vec![
            reading("cam-2", &["Person"], later),
            reading("cam-1", &["Person"], later - 1_000),
        ];
        correlator.update(&snapshot, later);

        let record = correlator.matrix().get("cam-1", "cam-2").unwrap();
        assert_eq!(
            record.occurrences["Person"],
            vec![TagOccurrence::new(later, later - 1_000)]
        );
    }

    #[test]
    fn test_window_boundary_is_exclusive() {
        let config = CorrelatorConfig::default();
        let mut correlator = TransitionCorrelator::new(&config);

        let earlier = 1_000_000;
        let snapshot = vec![
            reading("cam-2", &["Person"], earlier + 500),
            reading("cam-1", &["Person"], earlier),
        ];
        correlator.update(&snapshot, earlier + 500);

        // A second append at exactly now - window == earlier drops the pair
        let now = earlier + config.transition_window_ms;
        let snapshot = vec![
            reading("cam-2", &["Person"], now),
            reading("cam-1", &["Person"], now - 1),
        ];
        correlator.update(&snapshot, now);

        let record = correlator.matrix().get("cam-1", "cam-2").unwrap();
        assert_eq!(
            record.occurrences["Person"],
            vec![TagOccurrence::new(now, now - 1)]
        );
    }

    #[test]
    fn test_reset_clears_all_records() {
        let mut correlator = correlator();

        let snapshot = vec![
            reading("cam-2", &["Person"], 2_000),
            reading("cam-1", &["Person"], 1_000),
        ];
        correlator.update(&snapshot, 2_000);
        assert!(!correlator.matrix().is_empty());

        correlator.reset();
        assert!(correlator.matrix().is_empty());
    }
}
