use serde::{Deserialize, Serialize};

use crate::appointments::repo_types::Appointment;

#[derive(Debug, Deserialize)]
pub struct DashboardQuery {
    /// `YYYY-MM-DD`; empty means no filter.
    #[serde(default)]
    pub date: Option<String>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct Stats {
    pub total_patients: i64,
    pub total_doctors: i64,
    pub total_appts: i64,
    pub revenue: i64,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct StatusCounts {
    #[serde(rename = "Pending")]
    pub pending: i64,
    #[serde(rename = "Approved")]
    pub approved: i64,
    #[serde(rename = "Rejected")]
    pub rejected: i64,
}

/// Appointment with the names an administrator needs to read it.
#[derive(Debug, Serialize)]
pub struct AppointmentLine {
    #[serde(flatten)]
    pub appointment: Appointment,
    pub patient_name: String,
    pub doctor_name: String,
}

#[derive(Debug, Serialize)]
pub struct Dashboard {
    pub stats: Stats,
    pub status_counts: StatusCounts,
    pub appointments: Vec<AppointmentLine>,
}
