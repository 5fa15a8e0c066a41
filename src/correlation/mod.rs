/// Correlation module for tracking tag transitions between cameras
///
/// This module provides:
/// - The pairwise transition matrix and its per-pair records
/// - The online correlator that updates and prunes the matrix
/// - Deterministic matrix summaries for logging

pub mod engine;
pub mod matrix;

pub use engine::TransitionCorrelator;
pub use matrix::{TagOccurrence, TransitionMatrix, TransitionRecord, MATRIX_SCHEMA_VERSION};
