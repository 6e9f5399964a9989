use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Review state of an appointment. Cancellation is a delete, not a state.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AppointmentStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl AppointmentStatus {
    pub const ALL: [AppointmentStatus; 3] = [
        AppointmentStatus::Pending,
        AppointmentStatus::Approved,
        AppointmentStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Pending => "Pending",
            AppointmentStatus::Approved => "Approved",
            AppointmentStatus::Rejected => "Rejected",
        }
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentStatus {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AppointmentStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| anyhow::anyhow!("unknown appointment status: {s}"))
    }
}

/// Administrator decision on an appointment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewAction {
    Approve,
    Reject,
}

impl ReviewAction {
    /// Status an appointment ends in after this action, whatever its
    /// current status. Re-approving or re-rejecting is allowed.
    pub fn apply(self, _current: AppointmentStatus) -> AppointmentStatus {
        match self {
            ReviewAction::Approve => AppointmentStatus::Approved,
            ReviewAction::Reject => AppointmentStatus::Rejected,
        }
    }
}

impl FromStr for ReviewAction {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approve" => Ok(ReviewAction::Approve),
            "reject" => Ok(ReviewAction::Reject),
            other => anyhow::bail!("unknown action: {other}"),
        }
    }
}

/// Flat fee counted per approved appointment in revenue figures.
pub const APPROVED_VISIT_FEE: i64 = 500;

pub fn revenue(approved: i64) -> i64 {
    approved * APPROVED_VISIT_FEE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn approve_then_reject_ends_rejected() {
        let status = AppointmentStatus::default();
        let status = ReviewAction::Approve.apply(status);
        assert_eq!(status, AppointmentStatus::Approved);
        let status = ReviewAction::Reject.apply(status);
        assert_eq!(status, AppointmentStatus::Rejected);
    }

    #[test]
    fn decided_appointments_can_be_decided_again() {
        for current in AppointmentStatus::ALL {
            assert_eq!(ReviewAction::Approve.apply(current), AppointmentStatus::Approved);
            assert_eq!(ReviewAction::Reject.apply(current), AppointmentStatus::Rejected);
        }
    }

    #[test]
    fn action_parses_from_path_segment() {
        assert_eq!("approve".parse::<ReviewAction>().unwrap(), ReviewAction::Approve);
        assert_eq!("reject".parse::<ReviewAction>().unwrap(), ReviewAction::Reject);
        assert!("cancel".parse::<ReviewAction>().is_err());
    }

    #[test]
    fn status_text_round_trips_through_storage_form() {
        for status in AppointmentStatus::ALL {
            assert_eq!(status.as_str().parse::<AppointmentStatus>().unwrap(), status);
        }
        assert!("pending".parse::<AppointmentStatus>().is_err());
    }

    #[test]
    fn revenue_counts_approved_only() {
        assert_eq!(revenue(0), 0);
        assert_eq!(revenue(3), 1500);
    }
}
