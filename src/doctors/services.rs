use tracing::{debug, info};

use super::{
    dto::{AddDoctorRequest, SearchResponse},
    repo::DoctorDirectory,
    repo_types::{Doctor, NewDoctor, DEFAULT_IMAGE_URL},
};
use crate::{
    appointments::repo::AppointmentStore,
    error::AppError,
    scheduling::{specialization::route_search, Specialization},
};

/// Public search: a symptom keyword filters by specialization, anything
/// else is treated as part of a doctor's name. An empty query lists all.
pub async fn search(doctors: &dyn DoctorDirectory, raw: &str) -> Result<SearchResponse, AppError> {
    let query = raw.trim().to_lowercase();
    if query.is_empty() {
        return Ok(SearchResponse {
            query,
            specialization: None,
            doctors: doctors.list_all().await?,
        });
    }

    let specialization = route_search(&query);
    let found = match specialization {
        Some(spec) => doctors.find_by_specialization(spec).await?,
        None => doctors.find_by_name_contains(&query).await?,
    };
    debug!(%query, ?specialization, hits = found.len(), "doctor search");

    Ok(SearchResponse {
        query,
        specialization,
        doctors: found,
    })
}

pub async fn add_doctor(
    doctors: &dyn DoctorDirectory,
    req: AddDoctorRequest,
) -> Result<Doctor, AppError> {
    let name = req.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::BadRequest("Doctor name is required".into()));
    }
    if req.experience < 0 {
        return Err(AppError::BadRequest("Experience cannot be negative".into()));
    }
    let specialization: Specialization = req
        .specialization
        .parse()
        .map_err(|e: anyhow::Error| AppError::BadRequest(e.to_string()))?;
    let image_url = req
        .image_url
        .map(|u| u.trim().to_string())
        .filter(|u| !u.is_empty())
        .unwrap_or_else(|| DEFAULT_IMAGE_URL.to_string());

    let doctor = doctors
        .add(NewDoctor {
            name,
            specialization,
            experience: req.experience,
            image_url,
        })
        .await?;
    info!(doctor_id = doctor.id, %specialization, "doctor added");
    Ok(doctor)
}

/// Removes a doctor together with every appointment booked with them.
pub async fn delete_doctor(
    doctors: &dyn DoctorDirectory,
    appointments: &dyn AppointmentStore,
    id: i64,
) -> Result<(), AppError> {
    if doctors.get(id).await?.is_none() {
        return Err(AppError::NotFound("Doctor"));
    }
    let dropped = appointments.delete_by_doctor(id).await?;
    doctors.delete(id).await?;
    info!(doctor_id = id, dropped_appointments = dropped, "doctor deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doctors::repo::MemoryDoctorDirectory;

    async fn roster() -> MemoryDoctorDirectory {
        let dir = MemoryDoctorDirectory::default();
        for (name, spec) in [
            ("Dr. Sarah Jenkins", "Cardiology"),
            ("Dr. Mike Ross", "Neurology"),
            ("Dr. Emily Blunt", "Pediatrics"),
            ("Dr. Raj Malhotra", "General Physician"),
        ] {
            add_doctor(
                &dir,
                AddDoctorRequest {
                    name: name.into(),
                    specialization: spec.into(),
                    experience: 10,
                    image_url: None,
                },
            )
            .await
            .unwrap();
        }
        dir
    }

    #[tokio::test]
    async fn symptom_query_filters_by_specialization() {
        let dir = roster().await;
        let res = search(&dir, "Baby has a rash").await.unwrap();
        // "rash" is Dermatology and outranks "baby" (Pediatrics); nobody practices it here
        assert_eq!(res.specialization, Some(Specialization::Dermatology));
        assert!(res.doctors.is_empty());

        let res = search(&dir, "my child").await.unwrap();
        assert_eq!(res.specialization, Some(Specialization::Pediatrics));
        assert_eq!(res.doctors[0].name, "Dr. Emily Blunt");
    }

    #[tokio::test]
    async fn other_queries_match_names() {
        let dir = roster().await;
        let res = search(&dir, "MALHOTRA").await.unwrap();
        assert_eq!(res.specialization, None);
        assert_eq!(res.query, "malhotra");
        assert_eq!(res.doctors.len(), 1);
    }

    #[tokio::test]
    async fn empty_query_lists_everyone() {
        let dir = roster().await;
        assert_eq!(search(&dir, "  ").await.unwrap().doctors.len(), 4);
    }

    #[tokio::test]
    async fn add_doctor_validates_input() {
        let dir = MemoryDoctorDirectory::default();
        let err = add_doctor(
            &dir,
            AddDoctorRequest {
                name: "Dr. Who".into(),
                specialization: "Time Travel".into(),
                experience: 900,
                image_url: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));

        let doc = add_doctor(
            &dir,
            AddDoctorRequest {
                name: " Dr. Lisa Kudrow ".into(),
                specialization: "dermatology".into(),
                experience: 20,
                image_url: Some(String::new()),
            },
        )
        .await
        .unwrap();
        assert_eq!(doc.name, "Dr. Lisa Kudrow");
        assert_eq!(doc.specialization, Specialization::Dermatology);
        assert_eq!(doc.image_url, DEFAULT_IMAGE_URL);
    }
}
