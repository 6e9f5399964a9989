use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Medical practice categories doctors are filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Specialization {
    Cardiology,
    Neurology,
    Pediatrics,
    Orthopedics,
    Dermatology,
    #[serde(rename = "General Physician")]
    GeneralPhysician,
}

impl Specialization {
    pub const ALL: [Specialization; 6] = [
        Specialization::Cardiology,
        Specialization::Neurology,
        Specialization::Pediatrics,
        Specialization::Orthopedics,
        Specialization::Dermatology,
        Specialization::GeneralPhysician,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Specialization::Cardiology => "Cardiology",
            Specialization::Neurology => "Neurology",
            Specialization::Pediatrics => "Pediatrics",
            Specialization::Orthopedics => "Orthopedics",
            Specialization::Dermatology => "Dermatology",
            Specialization::GeneralPhysician => "General Physician",
        }
    }
}

impl fmt::Display for Specialization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Specialization {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Specialization::ALL
            .into_iter()
            .find(|spec| spec.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| anyhow::anyhow!("unknown specialization: {wanted}"))
    }
}

/// One row of a keyword table: any keyword hit selects `specialization`.
#[derive(Debug)]
pub struct SymptomRule {
    pub specialization: Specialization,
    pub keywords: &'static [&'static str],
}

/// Ordered keyword rules; the first rule with a matching keyword wins.
#[derive(Debug)]
pub struct SymptomTable {
    pub rules: &'static [SymptomRule],
    pub fallback: Option<Specialization>,
}

impl SymptomTable {
    pub fn lookup(&self, text: &str) -> Option<Specialization> {
        let text = text.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.keywords.iter().any(|kw| text.contains(kw)))
            .map(|rule| rule.specialization)
            .or(self.fallback)
    }
}

/// Used when a patient books without picking a doctor.
pub static BOOKING_TABLE: SymptomTable = SymptomTable {
    rules: &[
        SymptomRule {
            specialization: Specialization::GeneralPhysician,
            keywords: &["fever", "headache", "cold", "cough", "chest pain"],
        },
        SymptomRule {
            specialization: Specialization::Cardiology,
            keywords: &["heart", "pulse"],
        },
        SymptomRule {
            specialization: Specialization::Neurology,
            keywords: &["brain", "nerve"],
        },
        SymptomRule {
            specialization: Specialization::Dermatology,
            keywords: &["skin", "rash", "acne"],
        },
        SymptomRule {
            specialization: Specialization::Orthopedics,
            keywords: &["bone", "joint", "fracture"],
        },
    ],
    fallback: Some(Specialization::GeneralPhysician),
};

/// Used by the public doctor search. Deliberately differs from
/// [`BOOKING_TABLE`]: no General Physician rule and no fallback.
pub static SEARCH_TABLE: SymptomTable = SymptomTable {
    rules: &[
        SymptomRule {
            specialization: Specialization::Cardiology,
            keywords: &["heart", "chest", "pulse", "cardio"],
        },
        SymptomRule {
            specialization: Specialization::Dermatology,
            keywords: &["skin", "rash", "acne", "derma"],
        },
        SymptomRule {
            specialization: Specialization::Orthopedics,
            keywords: &["bone", "knee", "joint", "fracture"],
        },
        SymptomRule {
            specialization: Specialization::Pediatrics,
            keywords: &["child", "baby", "infant", "kid"],
        },
        SymptomRule {
            specialization: Specialization::Neurology,
            keywords: &["brain", "head", "nerve", "neuro"],
        },
    ],
    fallback: None,
};

/// Picks the specialization a booking is assigned to.
pub fn route(symptoms: &str) -> Specialization {
    BOOKING_TABLE
        .lookup(symptoms)
        .unwrap_or(Specialization::GeneralPhysician)
}

/// Picks the specialization a search query filters on, if any.
pub fn route_search(query: &str) -> Option<Specialization> {
    SEARCH_TABLE.lookup(query)
}
