use std::collections::HashMap;

use tracing::{info, warn};

use super::{
    dto::{BookRequest, DoctorSummary, Receipt},
    repo_types::{Appointment, AppointmentMode, NewAppointment},
};
use crate::{
    auth::extractors::AuthContext,
    doctors::repo_types::Doctor,
    error::AppError,
    scheduling::{
        meet::generate_meet_link,
        slots::allocate,
        specialization::route,
        AppointmentStatus, ReviewAction, Slot, SlotDate, SlotError, SlotTime,
    },
    state::AppState,
};

fn non_blank(text: Option<String>) -> Option<String> {
    text.map(|t| t.trim().to_string()).filter(|t| !t.is_empty())
}

async fn pick_doctor(
    state: &AppState,
    doctor_id: Option<i64>,
    symptoms: Option<&str>,
) -> Result<Doctor, AppError> {
    if let Some(id) = doctor_id {
        return state
            .doctors
            .get(id)
            .await?
            .ok_or(AppError::NotFound("Doctor"));
    }

    let specialization = route(symptoms.unwrap_or_default());
    let doctor = state
        .doctors
        .find_by_specialization(specialization)
        .await?
        .into_iter()
        .next();
    match doctor {
        Some(d) => {
            info!(doctor_id = d.id, %specialization, "doctor auto-assigned");
            Ok(d)
        }
        None => {
            warn!(%specialization, "no doctor on file for routed specialization");
            Err(AppError::NoMatchingDoctor)
        }
    }
}

/// Books a slot for `ctx`'s user. The new appointment is Pending.
pub async fn book(
    state: &AppState,
    ctx: &AuthContext,
    req: BookRequest,
    today: SlotDate,
) -> Result<Appointment, AppError> {
    let date: SlotDate = req
        .date
        .parse()
        .map_err(|_| AppError::BadRequest("Invalid date, expected YYYY-MM-DD".into()))?;
    if req.time.trim().is_empty() {
        return Err(AppError::BadRequest("Time is required".into()));
    }
    let symptoms = non_blank(req.symptoms);

    let doctor = pick_doctor(state, req.doctor_id, symptoms.as_deref()).await?;
    let slot = Slot {
        doctor_id: doctor.id,
        date,
        time: SlotTime(req.time),
    };

    let held: Vec<Slot> = state
        .appointments
        .find_conflicting(&slot)
        .await?
        .map(|a| a.slot())
        .into_iter()
        .collect();
    allocate(&slot, today, &held).map_err(|e| {
        warn!(doctor_id = slot.doctor_id, date = %slot.date, time = %slot.time, error = %e, "booking refused");
        e
    })?;

    let meet_link = match req.mode {
        AppointmentMode::Online => Some(generate_meet_link()),
        AppointmentMode::Offline => None,
    };

    let appointment = state
        .appointments
        .insert(NewAppointment {
            patient_id: ctx.user_id,
            slot: slot.clone(),
            symptoms,
            mode: req.mode,
            meet_link,
        })
        .await?
        .ok_or_else(|| {
            warn!(doctor_id = slot.doctor_id, date = %slot.date, time = %slot.time, "slot taken by a concurrent booking");
            SlotError::SlotConflict
        })?;

    info!(
        appointment_id = appointment.id,
        patient_id = %ctx.user_id,
        doctor_id = appointment.doctor_id,
        date = %appointment.date,
        time = %appointment.time,
        mode = %appointment.mode,
        "appointment booked"
    );
    Ok(appointment)
}

/// Loads an appointment owned by `ctx`. Someone else's appointment is
/// reported as missing.
async fn owned(state: &AppState, ctx: &AuthContext, id: i64) -> Result<Appointment, AppError> {
    match state.appointments.get(id).await? {
        Some(a) if a.patient_id == ctx.user_id => Ok(a),
        Some(_) => {
            warn!(appointment_id = id, user_id = %ctx.user_id, "appointment belongs to another patient");
            Err(AppError::NotFound("Appointment"))
        }
        None => Err(AppError::NotFound("Appointment")),
    }
}

fn summarize(doctor: &Doctor) -> DoctorSummary {
    DoctorSummary {
        id: doctor.id,
        name: doctor.name.clone(),
        specialization: doctor.specialization,
    }
}

pub async fn receipt(state: &AppState, ctx: &AuthContext, id: i64) -> Result<Receipt, AppError> {
    let appointment = owned(state, ctx, id).await?;
    let doctor = state.doctors.get(appointment.doctor_id).await?;
    Ok(Receipt {
        doctor: doctor.as_ref().map(summarize),
        appointment,
    })
}

pub async fn list_mine(state: &AppState, ctx: &AuthContext) -> Result<Vec<Receipt>, AppError> {
    let appointments = state.appointments.list_by_patient(ctx.user_id).await?;
    let doctors: HashMap<i64, Doctor> = state
        .doctors
        .list_all()
        .await?
        .into_iter()
        .map(|d| (d.id, d))
        .collect();
    Ok(appointments
        .into_iter()
        .map(|appointment| Receipt {
            doctor: doctors.get(&appointment.doctor_id).map(summarize),
            appointment,
        })
        .collect())
}

/// Hard-deletes the caller's appointment, whatever its status.
pub async fn cancel(state: &AppState, ctx: &AuthContext, id: i64) -> Result<(), AppError> {
    let appointment = owned(state, ctx, id).await?;
    if !state.appointments.delete(appointment.id).await? {
        return Err(AppError::NotFound("Appointment"));
    }
    info!(appointment_id = id, patient_id = %ctx.user_id, status = %appointment.status, "appointment cancelled");
    Ok(())
}

/// Applies an administrator decision. Already-decided appointments are
/// overwritten.
pub async fn review(state: &AppState, id: i64, action: ReviewAction) -> Result<Appointment, AppError> {
    let current = state
        .appointments
        .get(id)
        .await?
        .ok_or(AppError::NotFound("Appointment"))?;
    let next: AppointmentStatus = action.apply(current.status);
    let updated = state
        .appointments
        .set_status(id, next)
        .await?
        .ok_or(AppError::NotFound("Appointment"))?;
    info!(appointment_id = id, from = %current.status, to = %next, "appointment reviewed");
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use time::macros::date;
    use uuid::Uuid;

    use super::*;
    use crate::{
        auth::repo_types::Role,
        doctors::repo_types::{NewDoctor, DEFAULT_IMAGE_URL},
        scheduling::{meet::tests::MEET_LINK_RE, Specialization},
    };

    const TODAY: SlotDate = SlotDate(date!(2030 - 01 - 01));

    async fn seeded_state() -> AppState {
        let state = AppState::fake();
        for (name, spec) in [
            ("Dr. Sarah Jenkins", Specialization::Cardiology),
            ("Dr. Mike Ross", Specialization::Neurology),
            ("Dr. Raj Malhotra", Specialization::GeneralPhysician),
        ] {
            state
                .doctors
                .add(NewDoctor {
                    name: name.into(),
                    specialization: spec,
                    experience: 10,
                    image_url: DEFAULT_IMAGE_URL.into(),
                })
                .await
                .unwrap();
        }
        state
    }

    fn patient() -> AuthContext {
        AuthContext {
            user_id: Uuid::new_v4(),
            role: Role::Patient,
        }
    }

    fn request(doctor_id: Option<i64>, date: &str, time: &str, mode: AppointmentMode) -> BookRequest {
        BookRequest {
            doctor_id,
            date: date.into(),
            time: time.into(),
            symptoms: None,
            mode,
        }
    }

    #[tokio::test]
    async fn online_booking_is_pending_with_meet_link() {
        let state = seeded_state().await;
        let appt = book(&state, &patient(), request(Some(2), "2099-01-01", "10:00", AppointmentMode::Online), TODAY)
            .await
            .unwrap();
        assert_eq!(appt.doctor_id, 2);
        assert_eq!(appt.status, AppointmentStatus::Pending);
        let link = appt.meet_link.expect("online booking has a link");
        assert!(MEET_LINK_RE.is_match(&link));
    }

    #[tokio::test]
    async fn offline_booking_has_no_link() {
        let state = seeded_state().await;
        let appt = book(&state, &patient(), request(Some(1), "2099-01-01", "10:00", AppointmentMode::Offline), TODAY)
            .await
            .unwrap();
        assert!(appt.meet_link.is_none());
    }

    #[tokio::test]
    async fn second_booking_of_same_slot_conflicts() {
        let state = seeded_state().await;
        book(&state, &patient(), request(Some(2), "2099-01-01", "10:00", AppointmentMode::Offline), TODAY)
            .await
            .unwrap();
        let err = book(&state, &patient(), request(Some(2), "2099-01-01", "10:00", AppointmentMode::Online), TODAY)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Slot(SlotError::SlotConflict)));
        assert_eq!(state.appointments.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn past_dates_are_refused() {
        let state = seeded_state().await;
        let err = book(&state, &patient(), request(Some(1), "2029-12-31", "10:00", AppointmentMode::Offline), TODAY)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Slot(SlotError::PastDate)));
    }

    #[tokio::test]
    async fn symptoms_route_to_a_doctor_when_none_chosen() {
        let state = seeded_state().await;
        let mut req = request(None, "2099-01-01", "10:00", AppointmentMode::Offline);
        req.symptoms = Some("fever and cough, heart racing".into());
        let appt = book(&state, &patient(), req, TODAY).await.unwrap();
        assert_eq!(appt.doctor_id, 3); // General Physician
        assert_eq!(appt.symptoms.as_deref(), Some("fever and cough, heart racing"));

        let mut req = request(None, "2099-01-01", "10:00", AppointmentMode::Offline);
        req.symptoms = Some("Pulse is irregular".into());
        assert_eq!(book(&state, &patient(), req, TODAY).await.unwrap().doctor_id, 1);

        let req = request(None, "2099-01-02", "10:00", AppointmentMode::Offline);
        assert_eq!(book(&state, &patient(), req, TODAY).await.unwrap().doctor_id, 3);
    }

    #[tokio::test]
    async fn routing_without_a_matching_doctor_fails() {
        let state = seeded_state().await;
        let mut req = request(None, "2099-01-01", "10:00", AppointmentMode::Offline);
        req.symptoms = Some("itchy skin".into());
        let err = book(&state, &patient(), req, TODAY).await.unwrap_err();
        assert!(matches!(err, AppError::NoMatchingDoctor));
    }

    #[tokio::test]
    async fn bad_input_is_rejected() {
        let state = seeded_state().await;
        let err = book(&state, &patient(), request(Some(1), "01/02/2099", "10:00", AppointmentMode::Offline), TODAY)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));

        let err = book(&state, &patient(), request(Some(1), "2099-01-01", "  ", AppointmentMode::Offline), TODAY)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));

        let err = book(&state, &patient(), request(Some(42), "2099-01-01", "10:00", AppointmentMode::Offline), TODAY)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound("Doctor")));
    }

    #[tokio::test]
    async fn cancel_removes_permanently_and_frees_the_slot() {
        let state = seeded_state().await;
        let me = patient();
        let appt = book(&state, &me, request(Some(1), "2099-01-01", "10:00", AppointmentMode::Offline), TODAY)
            .await
            .unwrap();

        review(&state, appt.id, ReviewAction::Approve).await.unwrap();
        cancel(&state, &me, appt.id).await.unwrap();

        assert!(state.appointments.get(appt.id).await.unwrap().is_none());
        assert!(matches!(receipt(&state, &me, appt.id).await.unwrap_err(), AppError::NotFound(_)));
        assert!(matches!(cancel(&state, &me, appt.id).await.unwrap_err(), AppError::NotFound(_)));

        book(&state, &patient(), request(Some(1), "2099-01-01", "10:00", AppointmentMode::Offline), TODAY)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn patients_cannot_touch_each_others_appointments() {
        let state = seeded_state().await;
        let owner = patient();
        let other = patient();
        let appt = book(&state, &owner, request(Some(1), "2099-01-01", "10:00", AppointmentMode::Offline), TODAY)
            .await
            .unwrap();

        assert!(cancel(&state, &other, appt.id).await.is_err());
        assert!(receipt(&state, &other, appt.id).await.is_err());
        assert!(state.appointments.get(appt.id).await.unwrap().is_some());
        assert!(list_mine(&state, &other).await.unwrap().is_empty());

        let mine = list_mine(&state, &owner).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].doctor.as_ref().unwrap().name, "Dr. Sarah Jenkins");
    }

    #[tokio::test]
    async fn approve_then_reject_leaves_rejected() {
        let state = seeded_state().await;
        let appt = book(&state, &patient(), request(Some(1), "2099-01-01", "10:00", AppointmentMode::Offline), TODAY)
            .await
            .unwrap();
        review(&state, appt.id, ReviewAction::Approve).await.unwrap();
        let last = review(&state, appt.id, ReviewAction::Reject).await.unwrap();
        assert_eq!(last.status, AppointmentStatus::Rejected);
        assert!(matches!(review(&state, 999, ReviewAction::Approve).await.unwrap_err(), AppError::NotFound(_)));
    }
}
