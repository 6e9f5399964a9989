use std::collections::HashMap;

use uuid::Uuid;

use super::dto::{AppointmentLine, Dashboard, Stats, StatusCounts};
use crate::{
    appointments::repo_types::Appointment,
    auth::repo_types::Role,
    error::AppError,
    scheduling::{lifecycle::revenue, AppointmentStatus, SlotDate},
    state::AppState,
};

const MISSING_NAME: &str = "(deleted)";

pub async fn stats(state: &AppState) -> Result<(Stats, StatusCounts), AppError> {
    let counts = StatusCounts {
        pending: state.appointments.count_by_status(AppointmentStatus::Pending).await?,
        approved: state.appointments.count_by_status(AppointmentStatus::Approved).await?,
        rejected: state.appointments.count_by_status(AppointmentStatus::Rejected).await?,
    };
    let stats = Stats {
        total_patients: state.users.count_by_role(Role::Patient).await?,
        total_doctors: state.doctors.count().await?,
        total_appts: state.appointments.count().await?,
        revenue: revenue(counts.approved),
    };
    Ok((stats, counts))
}

/// Attaches patient and doctor names to each appointment.
async fn with_names(
    state: &AppState,
    appointments: Vec<Appointment>,
) -> Result<Vec<AppointmentLine>, AppError> {
    let doctors: HashMap<i64, String> = state
        .doctors
        .list_all()
        .await?
        .into_iter()
        .map(|d| (d.id, d.name))
        .collect();

    let mut patients: HashMap<Uuid, String> = HashMap::new();
    let mut lines = Vec::with_capacity(appointments.len());
    for appointment in appointments {
        if !patients.contains_key(&appointment.patient_id) {
            let name = state
                .users
                .find_by_id(appointment.patient_id)
                .await?
                .map(|u| u.name)
                .unwrap_or_else(|| MISSING_NAME.to_string());
            patients.insert(appointment.patient_id, name);
        }
        lines.push(AppointmentLine {
            patient_name: patients[&appointment.patient_id].clone(),
            doctor_name: doctors
                .get(&appointment.doctor_id)
                .cloned()
                .unwrap_or_else(|| MISSING_NAME.to_string()),
            appointment,
        });
    }
    Ok(lines)
}

pub async fn dashboard(state: &AppState, date: Option<SlotDate>) -> Result<Dashboard, AppError> {
    let (stats, status_counts) = stats(state).await?;
    let appointments = state.appointments.list_all(date).await?;
    Ok(Dashboard {
        stats,
        status_counts,
        appointments: with_names(state, appointments).await?,
    })
}

fn csv_field(value: &str) -> String {
    if value.contains(&[',', '"', '\n', '\r'][..]) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn csv_line(fields: &[&str]) -> String {
    let mut line = fields.iter().map(|f| csv_field(f)).collect::<Vec<_>>().join(",");
    line.push_str("\r\n");
    line
}

pub fn render_csv(lines: &[AppointmentLine]) -> String {
    let mut out = csv_line(&["ID", "Patient", "Doctor", "Date", "Time", "Status"]);
    for line in lines {
        let a = &line.appointment;
        out.push_str(&csv_line(&[
            &a.id.to_string(),
            &line.patient_name,
            &line.doctor_name,
            &a.date.to_string(),
            a.time.as_str(),
            a.status.as_str(),
        ]));
    }
    out
}

/// Every appointment as CSV, newest date first.
pub async fn export_csv(state: &AppState) -> Result<String, AppError> {
    let appointments = state.appointments.list_all(None).await?;
    let lines = with_names(state, appointments).await?;
    Ok(render_csv(&lines))
}
