//! Removal status state machine.
//!
//! A removal request moves `pending -> in_progress -> completed | failed`, and
//! may also settle directly from `pending`. `completed` and `failed` are
//! terminal. Dispatch only ever produces `pending` or `failed`; `in_progress`
//! is entered when a broker acknowledges the request.

use crate::error::VeilError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Status of a single broker's removal request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemovalStatus {
    /// Accepted by the transport, awaiting the broker
    Pending,
    /// Broker acknowledged and is processing the request
    InProgress,
    /// Broker confirmed removal
    Completed,
    /// Delivery or removal failed
    Failed,
}

impl RemovalStatus {
    /// Stable lowercase name used on the wire and in the database.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Whether no further transitions are possible.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Whether moving from `self` to `next` is a legal transition.
    #[must_use]
    pub fn can_transition_to(&self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::InProgress | Self::Completed | Self::Failed)
                | (Self::InProgress, Self::Completed | Self::Failed)
        )
    }

    /// Validate and perform a transition.
    ///
    /// # Errors
    /// Returns `VeilError::InvalidTransition` when the move is not allowed.
    pub fn transition(self, next: Self) -> Result<Self, VeilError> {
        if self.can_transition_to(next) {
            Ok(next)
        } else {
            Err(VeilError::InvalidTransition(format!(
                "cannot move removal request from {self} to {next}"
            )))
        }
    }
}

impl fmt::Display for RemovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RemovalStatus {
    type Err = VeilError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            other => Err(VeilError::Validation(format!(
                "unknown removal status '{other}'"
            ))),
        }
    }
}

/// Aggregate status of all broker requests in one batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    /// Every broker request is still pending
    Pending,
    /// Some requests have moved but not all have settled
    InProgress,
    /// All settled and at least one broker completed removal
    Completed,
    /// All settled and every request failed
    Failed,
}

impl BatchStatus {
    /// Derive the batch status from its per-broker statuses.
    ///
    /// An empty batch is reported as `Pending`.
    pub fn aggregate<I>(statuses: I) -> Self
    where
        I: IntoIterator<Item = RemovalStatus>,
    {
        let mut total = 0usize;
        let mut pending = 0usize;
        let mut open = 0usize;
        let mut completed = 0usize;

        for status in statuses {
            total += 1;
            match status {
                RemovalStatus::Pending => {
                    pending += 1;
                    open += 1;
                }
                RemovalStatus::InProgress => open += 1,
                RemovalStatus::Completed => completed += 1,
                RemovalStatus::Failed => {}
            }
        }

        if total == 0 || pending == total {
            Self::Pending
        } else if open > 0 {
            Self::InProgress
        } else if completed > 0 {
            Self::Completed
        } else {
            Self::Failed
        }
    }
}
