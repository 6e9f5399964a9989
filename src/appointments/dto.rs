use serde::{Deserialize, Serialize};

use super::repo_types::{Appointment, AppointmentMode};
use crate::scheduling::Specialization;

/// POST /appointments body. Without `doctor_id` a doctor is picked from
/// the symptoms.
#[derive(Debug, Deserialize)]
pub struct BookRequest {
    #[serde(default)]
    pub doctor_id: Option<i64>,
    pub date: String,
    pub time: String,
    #[serde(default)]
    pub symptoms: Option<String>,
    #[serde(default)]
    pub mode: AppointmentMode,
}

#[derive(Debug, Serialize)]
pub struct DoctorSummary {
    pub id: i64,
    pub name: String,
    pub specialization: Specialization,
}

/// Appointment as shown to its patient.
#[derive(Debug, Serialize)]
pub struct Receipt {
    #[serde(flatten)]
    pub appointment: Appointment,
    pub doctor: Option<DoctorSummary>,
}
