use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::{Date, OffsetDateTime};
use uuid::Uuid;

use crate::scheduling::{AppointmentStatus, Slot, SlotDate, SlotTime};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppointmentMode {
    Online,
    #[default]
    Offline,
}

impl AppointmentMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentMode::Online => "Online",
            AppointmentMode::Offline => "Offline",
        }
    }
}

impl fmt::Display for AppointmentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AppointmentMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Online" => Ok(AppointmentMode::Online),
            "Offline" => Ok(AppointmentMode::Offline),
            other => anyhow::bail!("unknown appointment mode: {other}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub id: i64,
    pub patient_id: Uuid,
    pub doctor_id: i64,
    pub date: SlotDate,
    pub time: SlotTime,
    pub symptoms: Option<String>,
    pub mode: AppointmentMode,
    /// Present exactly when `mode` is Online.
    pub meet_link: Option<String>,
    pub status: AppointmentStatus,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Appointment {
    pub fn slot(&self) -> Slot {
        Slot {
            doctor_id: self.doctor_id,
            date: self.date,
            time: self.time.clone(),
        }
    }
}

/// A booking that passed validation and is ready to be stored as Pending.
#[derive(Debug, Clone)]
pub struct NewAppointment {
    pub patient_id: Uuid,
    pub slot: Slot,
    pub symptoms: Option<String>,
    pub mode: AppointmentMode,
    pub meet_link: Option<String>,
}

#[derive(Debug, FromRow)]
pub struct AppointmentRow {
    pub id: i64,
    pub patient_id: Uuid,
    pub doctor_id: i64,
    pub date: Date,
    pub time: String,
    pub symptoms: Option<String>,
    pub mode: String,
    pub meet_link: Option<String>,
    pub status: String,
    pub created_at: OffsetDateTime,
}

impl TryFrom<AppointmentRow> for Appointment {
    type Error = anyhow::Error;

    fn try_from(r: AppointmentRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: r.id,
            patient_id: r.patient_id,
            doctor_id: r.doctor_id,
            date: SlotDate(r.date),
            time: SlotTime(r.time),
            symptoms: r.symptoms,
            mode: r.mode.parse()?,
            meet_link: r.meet_link,
            status: r.status.parse()?,
            created_at: r.created_at,
        })
    }
}
