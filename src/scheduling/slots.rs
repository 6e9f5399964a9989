use std::{fmt, str::FromStr};

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;
use time::{format_description::FormatItem, macros::format_description, Date, OffsetDateTime};

const DATE_FORMAT: &[FormatItem<'static>] = format_description!("[year]-[month]-[day]");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SlotError {
    #[error("Cannot book for past dates.")]
    PastDate,
    #[error("Slot already booked. Please choose another.")]
    SlotConflict,
}

/// Calendar date of an appointment. Its text form is `YYYY-MM-DD`, so
/// ordering the values and ordering the strings agree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotDate(pub Date);

impl SlotDate {
    pub fn today() -> Self {
        SlotDate(OffsetDateTime::now_utc().date())
    }
}

impl fmt::Display for SlotDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = self.0.format(DATE_FORMAT).map_err(|_| fmt::Error)?;
        f.write_str(&text)
    }
}

impl FromStr for SlotDate {
    type Err = time::error::Parse;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Date::parse(s.trim(), DATE_FORMAT).map(SlotDate)
    }
}

impl Serialize for SlotDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SlotDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse()
            .map_err(|_| de::Error::custom(format!("invalid date {raw:?}, expected YYYY-MM-DD")))
    }
}

/// Time-of-day token. Compared for exact equality only: "10:00" and
/// "10:00 AM" are different slots.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlotTime(pub String);

impl SlotTime {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SlotTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A (doctor, date, time) tuple.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Slot {
    pub doctor_id: i64,
    pub date: SlotDate,
    pub time: SlotTime,
}

/// Checks a requested slot against `today` and the doctor's bookings.
///
/// `booked` may hold slots for any doctor; only exact tuple matches conflict.
pub fn allocate<'a, I>(slot: &Slot, today: SlotDate, booked: I) -> Result<(), SlotError>
where
    I: IntoIterator<Item = &'a Slot>,
{
    if slot.date < today {
        return Err(SlotError::PastDate);
    }
    if booked.into_iter().any(|taken| taken == slot) {
        return Err(SlotError::SlotConflict);
    }
    Ok(())
}
