//! Booking rules: symptom routing, slot checks, review transitions and
//! meeting links. Nothing in here touches storage.

pub mod lifecycle;
pub mod meet;
pub mod slots;
pub mod specialization;

pub use lifecycle::{AppointmentStatus, ReviewAction};
pub use slots::{Slot, SlotDate, SlotError, SlotTime};
pub use specialization::Specialization;
