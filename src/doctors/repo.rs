use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use tokio::sync::Mutex;

use crate::{
    db::like_escape,
    doctors::repo_types::{Doctor, DoctorRow, NewDoctor},
    scheduling::Specialization,
};

#[async_trait]
pub trait DoctorDirectory: Send + Sync {
    async fn list_all(&self) -> anyhow::Result<Vec<Doctor>>;
    async fn get(&self, id: i64) -> anyhow::Result<Option<Doctor>>;
    /// Ordered by id, so the first entry is the longest-listed doctor.
    async fn find_by_specialization(&self, spec: Specialization) -> anyhow::Result<Vec<Doctor>>;
    /// Case-insensitive substring match on the name.
    async fn find_by_name_contains(&self, text: &str) -> anyhow::Result<Vec<Doctor>>;
    async fn add(&self, new: NewDoctor) -> anyhow::Result<Doctor>;
    async fn delete(&self, id: i64) -> anyhow::Result<bool>;
    async fn count(&self) -> anyhow::Result<i64>;
}

pub struct PgDoctorDirectory {
    db: PgPool,
}

impl PgDoctorDirectory {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn into_doctors(rows: Vec<DoctorRow>) -> anyhow::Result<Vec<Doctor>> {
    rows.into_iter().map(Doctor::try_from).collect()
}

#[async_trait]
impl DoctorDirectory for PgDoctorDirectory {
    async fn list_all(&self) -> anyhow::Result<Vec<Doctor>> {
        let rows = sqlx::query_as::<_, DoctorRow>(
            "SELECT id, name, specialization, experience, image_url FROM doctors ORDER BY id",
        )
        .fetch_all(&self.db)
        .await
        .context("list doctors")?;
        into_doctors(rows)
    }

    async fn get(&self, id: i64) -> anyhow::Result<Option<Doctor>> {
        let row = sqlx::query_as::<_, DoctorRow>(
            "SELECT id, name, specialization, experience, image_url FROM doctors WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("get doctor")?;
        row.map(Doctor::try_from).transpose()
    }

    async fn find_by_specialization(&self, spec: Specialization) -> anyhow::Result<Vec<Doctor>> {
        let rows = sqlx::query_as::<_, DoctorRow>(
            r#"
            SELECT id, name, specialization, experience, image_url
            FROM doctors
            WHERE specialization = $1
            ORDER BY id
            "#,
        )
        .bind(spec.as_str())
        .fetch_all(&self.db)
        .await
        .context("find doctors by specialization")?;
        into_doctors(rows)
    }

    async fn find_by_name_contains(&self, text: &str) -> anyhow::Result<Vec<Doctor>> {
        let rows = sqlx::query_as::<_, DoctorRow>(
            r#"
            SELECT id, name, specialization, experience, image_url
            FROM doctors
            WHERE name ILIKE '%' || $1 || '%'
            ORDER BY id
            "#,
        )
        .bind(like_escape(text))
        .fetch_all(&self.db)
        .await
        .context("find doctors by name")?;
        into_doctors(rows)
    }

    async fn add(&self, new: NewDoctor) -> anyhow::Result<Doctor> {
        let row = sqlx::query_as::<_, DoctorRow>(
            r#"
            INSERT INTO doctors (name, specialization, experience, image_url)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, specialization, experience, image_url
            "#,
        )
        .bind(&new.name)
        .bind(new.specialization.as_str())
        .bind(new.experience)
        .bind(&new.image_url)
        .fetch_one(&self.db)
        .await
        .context("insert doctor")?;
        Doctor::try_from(row)
    }

    async fn delete(&self, id: i64) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM doctors WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await
            .context("delete doctor")?;
        Ok(res.rows_affected() > 0)
    }

    async fn count(&self) -> anyhow::Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM doctors")
            .fetch_one(&self.db)
            .await
            .context("count doctors")?;
        Ok(count)
    }
}

#[derive(Default)]
struct DoctorTable {
    next_id: i64,
    rows: Vec<Doctor>,
}

/// Process-local doctor directory. Rows stay in id order.
#[derive(Default)]
pub struct MemoryDoctorDirectory {
    inner: Mutex<DoctorTable>,
}

#[async_trait]
impl DoctorDirectory for MemoryDoctorDirectory {
    async fn list_all(&self) -> anyhow::Result<Vec<Doctor>> {
        Ok(self.inner.lock().await.rows.clone())
    }

    async fn get(&self, id: i64) -> anyhow::Result<Option<Doctor>> {
        let table = self.inner.lock().await;
        Ok(table.rows.iter().find(|d| d.id == id).cloned())
    }

    async fn find_by_specialization(&self, spec: Specialization) -> anyhow::Result<Vec<Doctor>> {
        let table = self.inner.lock().await;
        Ok(table
            .rows
            .iter()
            .filter(|d| d.specialization == spec)
            .cloned()
            .collect())
    }

    async fn find_by_name_contains(&self, text: &str) -> anyhow::Result<Vec<Doctor>> {
        let needle = text.to_lowercase();
        let table = self.inner.lock().await;
        Ok(table
            .rows
            .iter()
            .filter(|d| d.name.to_lowercase().contains(&needle))
            .cloned()
            .collect())
    }

    async fn add(&self, new: NewDoctor) -> anyhow::Result<Doctor> {
        let mut table = self.inner.lock().await;
        table.next_id += 1;
        let doctor = Doctor {
            id: table.next_id,
            name: new.name,
            specialization: new.specialization,
            experience: new.experience,
            image_url: new.image_url,
        };
        table.rows.push(doctor.clone());
        Ok(doctor)
    }

    async fn delete(&self, id: i64) -> anyhow::Result<bool> {
        let mut table = self.inner.lock().await;
        let before = table.rows.len();
        table.rows.retain(|d| d.id != id);
        Ok(table.rows.len() != before)
    }

    async fn count(&self) -> anyhow::Result<i64> {
        Ok(self.inner.lock().await.rows.len() as i64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doctors::repo_types::DEFAULT_IMAGE_URL;

    fn new_doctor(name: &str, spec: Specialization) -> NewDoctor {
        NewDoctor {
            name: name.into(),
            specialization: spec,
            experience: 5,
            image_url: DEFAULT_IMAGE_URL.into(),
        }
    }

    #[tokio::test]
    async fn ids_are_sequential_and_lookups_work() {
        let dir = MemoryDoctorDirectory::default();
        let a = dir.add(new_doctor("Dr. Sarah Jenkins", Specialization::Cardiology)).await.unwrap();
        let b = dir.add(new_doctor("Dr. Mike Ross", Specialization::Neurology)).await.unwrap();
        assert_eq!((a.id, b.id), (1, 2));

        assert_eq!(dir.get(2).await.unwrap().unwrap().name, "Dr. Mike Ross");
        assert_eq!(dir.find_by_specialization(Specialization::Cardiology).await.unwrap(), vec![a]);
        assert_eq!(dir.find_by_name_contains("ROSS").await.unwrap().len(), 1);
        assert_eq!(dir.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn delete_reports_whether_a_row_went_away() {
        let dir = MemoryDoctorDirectory::default();
        let a = dir.add(new_doctor("Dr. John Doe", Specialization::Orthopedics)).await.unwrap();
        assert!(dir.delete(a.id).await.unwrap());
        assert!(!dir.delete(a.id).await.unwrap());
        assert!(dir.get(a.id).await.unwrap().is_none());
    }
}
