//! HTTP inbound adapter exposing REST endpoints.

use actix_web::web;

pub mod appointments;
pub mod caller;
pub mod declarations;
pub mod error;
pub mod health;
pub mod history;
pub mod profiles;
pub mod ratings;
pub mod referrals;
pub mod state;
pub(crate) mod validation;

pub use error::{ApiError, ApiResult};
pub use state::HttpState;

/// Register every API endpoint under the `/api/v1` scope.
///
/// The [`HttpState`] and [`health::HealthState`] app data must be attached by
/// the caller.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .service(appointments::create_appointment)
            .service(appointments::finish_appointment)
            .service(appointments::cancel_appointment)
            .service(appointments::assign_lab_assistant)
            .service(appointments::appointments_for_patient)
            .service(appointments::appointments_for_doctor)
            .service(referrals::create_referral_for_doctor)
            .service(referrals::create_referral_for_examination)
            .service(referrals::create_referral_for_family_doctor)
            .service(referrals::active_referrals)
            .service(referrals::all_referrals)
            .service(referrals::delete_referral)
            .service(declarations::sign_declaration)
            .service(declarations::declaration_for_patient)
            .service(history::patient_medical_history)
            .service(history::patient_referrals)
            .service(ratings::doctor_rating)
            .service(ratings::hospital_rating)
            .service(profiles::fetch_profile)
            .service(profiles::update_profile),
    )
    .service(health::ready)
    .service(health::live);
}
