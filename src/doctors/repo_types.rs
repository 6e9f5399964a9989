use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::scheduling::Specialization;

pub const DEFAULT_IMAGE_URL: &str =
    "https://img.freepik.com/free-vector/doctor-character-background_1270-84.jpg";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Doctor {
    pub id: i64,
    pub name: String,
    pub specialization: Specialization,
    pub experience: i32, // years
    pub image_url: String,
}

#[derive(Debug, Clone)]
pub struct NewDoctor {
    pub name: String,
    pub specialization: Specialization,
    pub experience: i32,
    pub image_url: String,
}

#[derive(Debug, FromRow)]
pub struct DoctorRow {
    pub id: i64,
    pub name: String,
    pub specialization: String,
    pub experience: i32,
    pub image_url: String,
}

impl TryFrom<DoctorRow> for Doctor {
    type Error = anyhow::Error;

    fn try_from(r: DoctorRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: r.id,
            name: r.name,
            specialization: r.specialization.parse()?,
            experience: r.experience,
            image_url: r.image_url,
        })
    }
}
