//! Classified result of one trigger attempt

use std::fmt;

/// Everything a trigger run can end as.
///
/// Faults are data, not errors: the scheduled path must survive any
/// outcome, and the probe path wants to show it to the operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// The endpoint answered with a success status
    Completed,
    /// A required setting is absent; no request was sent
    MissingConfig { name: String },
    /// The deadline elapsed before the endpoint answered
    Timeout,
    /// The endpoint answered with a non-success status
    RemoteFailure {
        status: u16,
        reason: String,
        excerpt: String,
    },
    /// Any other runtime fault, connection errors included
    Failed { detail: String },
}

impl TriggerOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, TriggerOutcome::Completed)
    }
}

impl fmt::Display for TriggerOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TriggerOutcome::Completed => {
                write!(f, "Cloudflare Worker for WordPress works. Yay!")
            }
            TriggerOutcome::MissingConfig { name } => {
                write!(f, "Missing configuration value: {}", name)
            }
            TriggerOutcome::Timeout => {
                write!(f, "Timeout waiting for the cron endpoint")
            }
            TriggerOutcome::RemoteFailure {
                status,
                reason,
                excerpt,
            } => {
                write!(f, "Cron failed: HTTP {} {} {}", status, reason, excerpt)
            }
            TriggerOutcome::Failed { detail } => {
                write!(f, "Error triggering cron: {}", detail)
            }
        }
    }
}
