use serde::{Deserialize, Serialize};
use strum::Display;
use validator::Validate;

/// FontAwesome regular icon font identifier
pub const ICON_FONT_FONTAWESOME_REGULAR: &str = "far";

/// Dashboard priority levels, lowest to highest
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum DashboardPriority {
    Empty,
    Ok,
    Learning,
    SystemProblem,
    CriticalAlert,
}

/// One-shot resolution affordance attached to a dashboard alert.
///
/// The sink renders the dashboard button; tapping it opens an action sheet
/// whose resolution button acknowledges and clears the alert.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResolutionAction {
    /// Key echoed back by the sink when the user resolves the alert
    pub key: String,

    /// Button label on the dashboard itself
    pub dashboard_button: String,

    /// Title of the action sheet opened by the dashboard button
    pub actionsheet_title: String,

    /// Label of the resolving button inside the action sheet
    pub resolution_button: String,

    /// Acknowledgment text shown after resolving
    pub ack: String,

    /// Icon shown next to the resolution button
    pub icon: String,

    /// Icon font for the resolution icon
    pub icon_font: String,

    /// Optional multiple-choice responses; `None` for a plain dismissal
    pub response_options: Option<Vec<String>>,
}

impl ResolutionAction {
    /// Build a single-button acknowledge-and-dismiss action
    pub fn one_shot(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            dashboard_button: "DISMISS >".to_string(),
            actionsheet_title: "Update Status".to_string(),
            resolution_button: "Dismiss".to_string(),
            ack: "Okay, dismissing the notification...".to_string(),
            icon: "thumbs-up".to_string(),
            icon_font: ICON_FONT_FONTAWESOME_REGULAR.to_string(),
            response_options: None,
        }
    }
}

/// Severity-classified alert handed to the external notification sink.
///
/// The sink deduplicates and updates-in-place by `key`; this crate only
/// produces the value.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DashboardAlert {
    /// Stable key used by the sink for replace-by-key semantics
    #[validate(length(min = 1, max = 255))]
    pub key: String,

    /// Alert priority
    pub priority: DashboardPriority,

    /// Normalized severity indicator on the platform's percent-good scale
    #[validate(range(min = 0, max = 100))]
    pub percent_good: u8,

    /// Alert title
    #[validate(length(min = 1, max = 500))]
    pub title: String,

    /// Human-readable body text
    pub comment: String,

    /// Icon reference
    pub icon: String,

    /// Icon font identifier
    pub icon_font: String,

    /// Optional user-resolution affordance
    pub resolution: Option<ResolutionAction>,

    /// Optional conversation reference; always `None` for this engine
    pub conversation: Option<String>,

    /// Optional scheduled future re-fire timestamp
    pub future_timestamp_ms: Option<i64>,

    /// Expiry horizon after which the sink may consider the alert stale
    pub ttl_ms: i64,
}

impl DashboardAlert {
    /// Create a critical alert with a one-shot dismissal action
    pub fn critical(
        key: impl Into<String>,
        title: impl Into<String>,
        comment: impl Into<String>,
        icon: impl Into<String>,
        ttl_ms: i64,
    ) -> Self {
        let key = key.into();
        Self {
            resolution: Some(ResolutionAction::one_shot(key.clone())),
            key,
            priority: DashboardPriority::CriticalAlert,
            percent_good: 100,
            title: title.into(),
            comment: comment.into(),
            icon: icon.into(),
            icon_font: ICON_FONT_FONTAWESOME_REGULAR.to_string(),
            conversation: None,
            future_timestamp_ms: None,
            ttl_ms,
        }
    }
}
