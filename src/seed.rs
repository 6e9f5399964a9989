use tracing::info;

use crate::{
    auth::{
        password::hash_password,
        repo_types::{NewUser, Role},
    },
    doctors::repo_types::{NewDoctor, DEFAULT_IMAGE_URL},
    scheduling::Specialization,
    state::AppState,
};

const DEFAULT_DOCTORS: [(&str, Specialization, i32); 6] = [
    ("Dr. Sarah Jenkins", Specialization::Cardiology, 15),
    ("Dr. Mike Ross", Specialization::Neurology, 10),
    ("Dr. Emily Blunt", Specialization::Pediatrics, 8),
    ("Dr. John Doe", Specialization::Orthopedics, 12),
    ("Dr. Lisa Kudrow", Specialization::Dermatology, 20),
    ("Dr. Raj Malhotra", Specialization::GeneralPhysician, 18),
];

/// First-boot data: the configured administrator and the default roster.
/// Does nothing once an administrator exists.
pub async fn ensure_defaults(state: &AppState) -> anyhow::Result<()> {
    if state.users.count_by_role(Role::Admin).await? > 0 {
        return Ok(());
    }

    let seed = &state.config.seed;
    let admin = state
        .users
        .create(NewUser {
            name: seed.admin_name.clone(),
            email: seed.admin_email.trim().to_lowercase(),
            password_hash: hash_password(&seed.admin_password)?,
            role: Role::Admin,
            phone: None,
        })
        .await?;
    match admin {
        Some(admin) => info!(user_id = %admin.id, email = %admin.email, "seeded administrator"),
        None => anyhow::bail!("seed admin e-mail {} is taken by a patient", seed.admin_email),
    }

    for (name, specialization, experience) in DEFAULT_DOCTORS {
        if !state.doctors.find_by_name_contains(name).await?.iter().any(|d| d.name == name) {
            state
                .doctors
                .add(NewDoctor {
                    name: name.to_string(),
                    specialization,
                    experience,
                    image_url: DEFAULT_IMAGE_URL.to_string(),
                })
                .await?;
        }
    }
    info!(doctors = state.doctors.count().await?, "default doctors in place");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn seeds_admin_and_roster_once() {
        let state = AppState::fake();
        ensure_defaults(&state).await.unwrap();
        ensure_defaults(&state).await.unwrap();

        assert_eq!(state.users.count_by_role(Role::Admin).await.unwrap(), 1);
        assert_eq!(state.doctors.count().await.unwrap(), 6);

        let admin = state.users.find_by_email("admin@hospital.com").await.unwrap().unwrap();
        assert_eq!(admin.role, Role::Admin);
        assert_ne!(admin.password_hash, "admin123");

        let gp = state
            .doctors
            .find_by_specialization(Specialization::GeneralPhysician)
            .await
            .unwrap();
        assert_eq!(gp[0].name, "Dr. Raj Malhotra");
    }

    #[tokio::test]
    async fn keeps_doctors_already_on_the_roster() {
        let state = AppState::fake();
        state
            .doctors
            .add(NewDoctor {
                name: "Dr. Mike Ross".into(),
                specialization: Specialization::Neurology,
                experience: 3,
                image_url: DEFAULT_IMAGE_URL.into(),
            })
            .await
            .unwrap();

        ensure_defaults(&state).await.unwrap();
        let ross = state.doctors.find_by_name_contains("Mike Ross").await.unwrap();
        assert_eq!(ross.len(), 1);
        assert_eq!(ross[0].experience, 3);
        assert_eq!(state.doctors.count().await.unwrap(), 6);
    }
}
