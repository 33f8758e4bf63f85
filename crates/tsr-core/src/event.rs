//! Committed study events and their kinds.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An immutable entry in the session's event log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// What happened.
    pub kind: EventKind,
    /// Wall-clock capture time at the moment the event was committed.
    ///
    /// For annotated kinds this is the instant the action was triggered,
    /// not when the description was submitted.
    pub timestamp: DateTime<Utc>,
    /// Milliseconds since the previous committed event (0 for the first).
    pub duration_ms: u64,
}

/// The kind of study event, carrying any kind-specific payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    /// The stopwatch was started.
    ProcessStarted,
    /// The stopwatch was stopped.
    ProcessStopped,
    /// A downtime period began.
    DowntimeStart {
        /// Operator-supplied note on the cause, if any.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    /// A downtime period ended.
    DowntimeEnd,
    /// The operator performed a manual task.
    OperatorTask {
        /// Operator-supplied note on the task, if any.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        description: Option<String>,
    },
    /// A pallet was completed.
    PalletComplete {
        /// 1-based rank among pallet-completion events in this session.
        sequence: u32,
    },
}

impl EventKind {
    /// Human-readable label, as shown in the log display and the export.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::ProcessStarted => "Process Started",
            Self::ProcessStopped => "Process Stopped",
            Self::DowntimeStart { .. } => "Downtime Start",
            Self::DowntimeEnd => "Downtime End",
            Self::OperatorTask { .. } => "Operator Task",
            Self::PalletComplete { .. } => "Pallet Complete",
        }
    }

    /// The operator-supplied annotation, if this kind carries one.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        match self {
            Self::DowntimeStart { description } | Self::OperatorTask { description } => {
                description.as_deref()
            }
            _ => None,
        }
    }

    /// The pallet sequence number, for pallet-completion events.
    #[must_use]
    pub const fn pallet_sequence(&self) -> Option<u32> {
        match self {
            Self::PalletComplete { sequence } => Some(*sequence),
            _ => None,
        }
    }
}

impl fmt::Display for EventKind {
    /// Renders the label, with the annotation appended as `label: note`.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.description() {
            Some(description) => write!(f, "{}: {description}", self.label()),
            None => f.write_str(self.label()),
        }
    }
}

/// Event kinds that require a description before they can be committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnnotatedKind {
    DowntimeStart,
    OperatorTask,
}

impl AnnotatedKind {
    /// Builds the committed event kind once annotation is resolved.
    #[must_use]
    pub fn with_description(self, description: Option<String>) -> EventKind {
        match self {
            Self::DowntimeStart => EventKind::DowntimeStart { description },
            Self::OperatorTask => EventKind::OperatorTask { description },
        }
    }

    /// Label of the kind being staged.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::DowntimeStart => "Downtime Start",
            Self::OperatorTask => "Operator Task",
        }
    }
}
