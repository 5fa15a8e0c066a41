//! Cross-camera event correlation engine.
//!
//! Cameras observing related physical space emit timestamped sets of
//! detection tags ("Person", "Vehicle", "Glass Breaking"). This crate
//! maintains a bounded-memory transition matrix describing which tags moved
//! between every pair of cameras within a trailing window, and classifies
//! glass-breaking events into corroborated or generic dashboard alerts.
//!
//! The host platform delivers one reading-updated callback per measurement
//! and owns the devices, the dashboard, and the clock; those collaborators
//! are modeled as the [`models::TaggedSource`], [`alerts::NotificationSink`]
//! and [`time::Clock`] traits.

pub mod alerts;
pub mod config;
pub mod correlation;
pub mod error;
pub mod ingest;
pub mod models;
pub mod time;

pub use alerts::{AlertClassifier, NotificationSink};
pub use config::CorrelatorConfig;
pub use correlation::{TransitionCorrelator, TransitionMatrix, TransitionRecord};
pub use error::{AppError, Result};
pub use ingest::CameraEventEngine;
pub use models::{DashboardAlert, SourceReading, TagReading, TaggedSource};
pub use time::{Clock, SystemClock};
