use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::{
    appointments::repo_types::{Appointment, AppointmentRow, NewAppointment},
    scheduling::{AppointmentStatus, Slot, SlotDate},
};

/// Appointment persistence. `insert` is the only way to create a booking
/// and it refuses a held slot atomically, so two racing bookings for the
/// same (doctor, date, time) cannot both land.
#[async_trait]
pub trait AppointmentStore: Send + Sync {
    async fn find_conflicting(&self, slot: &Slot) -> anyhow::Result<Option<Appointment>>;
    /// Stores a Pending appointment, or returns `None` when the slot is taken.
    async fn insert(&self, new: NewAppointment) -> anyhow::Result<Option<Appointment>>;
    async fn get(&self, id: i64) -> anyhow::Result<Option<Appointment>>;
    async fn delete(&self, id: i64) -> anyhow::Result<bool>;
    async fn delete_by_doctor(&self, doctor_id: i64) -> anyhow::Result<u64>;
    async fn set_status(
        &self,
        id: i64,
        status: AppointmentStatus,
    ) -> anyhow::Result<Option<Appointment>>;
    /// Newest date first.
    async fn list_by_patient(&self, patient_id: Uuid) -> anyhow::Result<Vec<Appointment>>;
    /// Newest date first, optionally restricted to one date.
    async fn list_all(&self, date: Option<SlotDate>) -> anyhow::Result<Vec<Appointment>>;
    async fn count_by_status(&self, status: AppointmentStatus) -> anyhow::Result<i64>;
    async fn count(&self) -> anyhow::Result<i64>;
}

const COLUMNS: &str =
    "id, patient_id, doctor_id, date, time, symptoms, mode, meet_link, status, created_at";

pub struct PgAppointmentStore {
    db: PgPool,
}

impl PgAppointmentStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn into_appointments(rows: Vec<AppointmentRow>) -> anyhow::Result<Vec<Appointment>> {
    rows.into_iter().map(Appointment::try_from).collect()
}

#[async_trait]
impl AppointmentStore for PgAppointmentStore {
    async fn find_conflicting(&self, slot: &Slot) -> anyhow::Result<Option<Appointment>> {
        let row = sqlx::query_as::<_, AppointmentRow>(&format!(
            "SELECT {COLUMNS} FROM appointments WHERE doctor_id = $1 AND date = $2 AND time = $3"
        ))
        .bind(slot.doctor_id)
        .bind(slot.date.0)
        .bind(slot.time.as_str())
        .fetch_optional(&self.db)
        .await
        .context("find conflicting appointment")?;
        row.map(Appointment::try_from).transpose()
    }

    async fn insert(&self, new: NewAppointment) -> anyhow::Result<Option<Appointment>> {
        // appointments_slot_key makes this a single check-and-insert
        let row = sqlx::query_as::<_, AppointmentRow>(&format!(
            r#"
            INSERT INTO appointments (patient_id, doctor_id, date, time, symptoms, mode, meet_link, status)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            ON CONFLICT ON CONSTRAINT appointments_slot_key DO NOTHING
            RETURNING {COLUMNS}
            "#
        ))
        .bind(new.patient_id)
        .bind(new.slot.doctor_id)
        .bind(new.slot.date.0)
        .bind(new.slot.time.as_str())
        .bind(&new.symptoms)
        .bind(new.mode.as_str())
        .bind(&new.meet_link)
        .bind(AppointmentStatus::Pending.as_str())
        .fetch_optional(&self.db)
        .await
        .context("insert appointment")?;
        row.map(Appointment::try_from).transpose()
    }

    async fn get(&self, id: i64) -> anyhow::Result<Option<Appointment>> {
        let row = sqlx::query_as::<_, AppointmentRow>(&format!(
            "SELECT {COLUMNS} FROM appointments WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("get appointment")?;
        row.map(Appointment::try_from).transpose()
    }

    async fn delete(&self, id: i64) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM appointments WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await
            .context("delete appointment")?;
        Ok(res.rows_affected() > 0)
    }

    async fn delete_by_doctor(&self, doctor_id: i64) -> anyhow::Result<u64> {
        let res = sqlx::query("DELETE FROM appointments WHERE doctor_id = $1")
            .bind(doctor_id)
            .execute(&self.db)
            .await
            .context("delete appointments by doctor")?;
        Ok(res.rows_affected())
    }

    async fn set_status(
        &self,
        id: i64,
        status: AppointmentStatus,
    ) -> anyhow::Result<Option<Appointment>> {
        let row = sqlx::query_as::<_, AppointmentRow>(&format!(
            "UPDATE appointments SET status = $2 WHERE id = $1 RETURNING {COLUMNS}"
        ))
        .bind(id)
        .bind(status.as_str())
        .fetch_optional(&self.db)
        .await
        .context("update appointment status")?;
        row.map(Appointment::try_from).transpose()
    }

    async fn list_by_patient(&self, patient_id: Uuid) -> anyhow::Result<Vec<Appointment>> {
        let rows = sqlx::query_as::<_, AppointmentRow>(&format!(
            "SELECT {COLUMNS} FROM appointments WHERE patient_id = $1 ORDER BY date DESC, id DESC"
        ))
        .bind(patient_id)
        .fetch_all(&self.db)
        .await
        .context("list appointments by patient")?;
        into_appointments(rows)
    }

    async fn list_all(&self, date: Option<SlotDate>) -> anyhow::Result<Vec<Appointment>> {
        let rows = sqlx::query_as::<_, AppointmentRow>(&format!(
            r#"
            SELECT {COLUMNS}
            FROM appointments
            WHERE $1::date IS NULL OR date = $1
            ORDER BY date DESC, id DESC
            "#
        ))
        .bind(date.map(|d| d.0))
        .fetch_all(&self.db)
        .await
        .context("list appointments")?;
        into_appointments(rows)
    }

    async fn count_by_status(&self, status: AppointmentStatus) -> anyhow::Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM appointments WHERE status = $1")
            .bind(status.as_str())
            .fetch_one(&self.db)
            .await
            .context("count appointments by status")?;
        Ok(count)
    }

    async fn count(&self) -> anyhow::Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM appointments")
            .fetch_one(&self.db)
            .await
            .context("count appointments")?;
        Ok(count)
    }
}

#[derive(Default)]
struct AppointmentTable {
    next_id: i64,
    rows: Vec<Appointment>,
}

impl AppointmentTable {
    fn sorted(mut rows: Vec<Appointment>) -> Vec<Appointment> {
        rows.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
        rows
    }
}

/// Process-local store. The slot check and the push share one lock guard.
#[derive(Default)]
pub struct MemoryAppointmentStore {
    inner: Mutex<AppointmentTable>,
}

#[async_trait]
impl AppointmentStore for MemoryAppointmentStore {
    async fn find_conflicting(&self, slot: &Slot) -> anyhow::Result<Option<Appointment>> {
        let table = self.inner.lock().await;
        Ok(table.rows.iter().find(|a| a.slot() == *slot).cloned())
    }

    async fn insert(&self, new: NewAppointment) -> anyhow::Result<Option<Appointment>> {
        let mut table = self.inner.lock().await;
        if table.rows.iter().any(|a| a.slot() == new.slot) {
            return Ok(None);
        }
        table.next_id += 1;
        let appointment = Appointment {
            id: table.next_id,
            patient_id: new.patient_id,
            doctor_id: new.slot.doctor_id,
            date: new.slot.date,
            time: new.slot.time,
            symptoms: new.symptoms,
            mode: new.mode,
            meet_link: new.meet_link,
            status: AppointmentStatus::Pending,
            created_at: OffsetDateTime::now_utc(),
        };
        table.rows.push(appointment.clone());
        Ok(Some(appointment))
    }

    async fn get(&self, id: i64) -> anyhow::Result<Option<Appointment>> {
        let table = self.inner.lock().await;
        Ok(table.rows.iter().find(|a| a.id == id).cloned())
    }

    async fn delete(&self, id: i64) -> anyhow::Result<bool> {
        let mut table = self.inner.lock().await;
        let before = table.rows.len();
        table.rows.retain(|a| a.id != id);
        Ok(table.rows.len() != before)
    }

    async fn delete_by_doctor(&self, doctor_id: i64) -> anyhow::Result<u64> {
        let mut table = self.inner.lock().await;
        let before = table.rows.len();
        table.rows.retain(|a| a.doctor_id != doctor_id);
        Ok((before - table.rows.len()) as u64)
    }

    async fn set_status(
        &self,
        id: i64,
        status: AppointmentStatus,
    ) -> anyhow::Result<Option<Appointment>> {
        let mut table = self.inner.lock().await;
        Ok(table.rows.iter_mut().find(|a| a.id == id).map(|a| {
            a.status = status;
            a.clone()
        }))
    }

    async fn list_by_patient(&self, patient_id: Uuid) -> anyhow::Result<Vec<Appointment>> {
        let table = self.inner.lock().await;
        let rows = table
            .rows
            .iter()
            .filter(|a| a.patient_id == patient_id)
            .cloned()
            .collect();
        Ok(AppointmentTable::sorted(rows))
    }

    async fn list_all(&self, date: Option<SlotDate>) -> anyhow::Result<Vec<Appointment>> {
        let table = self.inner.lock().await;
        let rows = table
            .rows
            .iter()
            .filter(|a| date.map_or(true, |d| a.date == d))
            .cloned()
            .collect();
        Ok(AppointmentTable::sorted(rows))
    }

    async fn count_by_status(&self, status: AppointmentStatus) -> anyhow::Result<i64> {
        let table = self.inner.lock().await;
        Ok(table.rows.iter().filter(|a| a.status == status).count() as i64)
    }

    async fn count(&self) -> anyhow::Result<i64> {
        Ok(self.inner.lock().await.rows.len() as i64)
    }
}
