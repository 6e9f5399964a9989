use serde::{Deserialize, Serialize};

use crate::{doctors::repo_types::Doctor, scheduling::Specialization};

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub query: String,
    /// Set when the query matched a symptom keyword.
    pub specialization: Option<Specialization>,
    pub doctors: Vec<Doctor>,
}

#[derive(Debug, Deserialize)]
pub struct AddDoctorRequest {
    pub name: String,
    pub specialization: String,
    #[serde(default = "default_experience")]
    pub experience: i32,
    #[serde(default)]
    pub image_url: Option<String>,
}
fn default_experience() -> i32 { 1 }
