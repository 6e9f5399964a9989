use std::sync::Arc;

use sqlx::PgPool;
use tracing::info;

use crate::{
    appointments::repo::{AppointmentStore, MemoryAppointmentStore, PgAppointmentStore},
    auth::repo::{MemoryUserDirectory, PgUserDirectory, UserDirectory},
    config::AppConfig,
    contact::repo::{ContactInbox, MemoryContactInbox, PgContactInbox},
    db,
    doctors::repo::{DoctorDirectory, MemoryDoctorDirectory, PgDoctorDirectory},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserDirectory>,
    pub doctors: Arc<dyn DoctorDirectory>,
    pub appointments: Arc<dyn AppointmentStore>,
    pub inbox: Arc<dyn ContactInbox>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);

        match config.database_url.clone() {
            Some(url) => {
                let pool = db::connect(&url).await?;
                db::migrate(&pool).await?;
                info!("using postgres stores");
                Ok(Self::postgres(pool, config))
            }
            None => {
                info!("using in-memory stores");
                Ok(Self::in_memory(config))
            }
        }
    }

    pub fn postgres(db: PgPool, config: Arc<AppConfig>) -> Self {
        Self {
            config,
            users: Arc::new(PgUserDirectory::new(db.clone())),
            doctors: Arc::new(PgDoctorDirectory::new(db.clone())),
            appointments: Arc::new(PgAppointmentStore::new(db.clone())),
            inbox: Arc::new(PgContactInbox::new(db)),
        }
    }

    pub fn in_memory(config: Arc<AppConfig>) -> Self {
        Self {
            config,
            users: Arc::new(MemoryUserDirectory::default()),
            doctors: Arc::new(MemoryDoctorDirectory::default()),
            appointments: Arc::new(MemoryAppointmentStore::default()),
            inbox: Arc::new(MemoryContactInbox::default()),
        }
    }

    #[cfg(test)]
    pub fn fake() -> Self {
        use crate::config::{JwtConfig, SeedConfig};

        let config = Arc::new(AppConfig {
            database_url: None,
            jwt: JwtConfig {
                secret: "test-secret".into(),
                issuer: "test-issuer".into(),
                audience: "test-aud".into(),
                ttl_minutes: 5,
                refresh_ttl_minutes: 60,
            },
            seed: SeedConfig {
                admin_name: "System Admin".into(),
                admin_email: "admin@hospital.com".into(),
                admin_password: "admin123".into(),
            },
        });
        Self::in_memory(config)
    }
}
