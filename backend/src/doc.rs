//! OpenAPI document for the REST adapter.

use utoipa::OpenApi;

use crate::domain::actors::Role;
use crate::domain::appointments::{AppointmentStatus, AppointmentSummary};
use crate::domain::declarations::Declaration;
use crate::domain::referrals::{Referral, ReferralTarget};
use crate::domain::{DomainError, ErrorCode};
use crate::inbound::http::appointments::{
    AssignLabAssistantBody, CancelAppointmentBody, CreateAppointmentBody, FinishAppointmentBody,
    UploadedFileBody,
};
use crate::inbound::http::declarations::SignDeclarationBody;
use crate::inbound::http::error::ApiError;
use crate::inbound::http::profiles::{ContactUpdateBody, ProfileBody};
use crate::inbound::http::ratings::RatingBody;
use crate::inbound::http::referrals::{
    DoctorReferralBody, ExaminationReferralBody, FamilyDoctorReferralBody,
};

/// Aggregated OpenAPI surface.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Polyclinic backend",
        description = "Appointment and referral management core"
    ),
    paths(
        crate::inbound::http::appointments::create_appointment,
        crate::inbound::http::appointments::finish_appointment,
        crate::inbound::http::appointments::cancel_appointment,
        crate::inbound::http::appointments::assign_lab_assistant,
        crate::inbound::http::appointments::appointments_for_patient,
        crate::inbound::http::appointments::appointments_for_doctor,
        crate::inbound::http::referrals::create_referral_for_doctor,
        crate::inbound::http::referrals::create_referral_for_examination,
        crate::inbound::http::referrals::create_referral_for_family_doctor,
        crate::inbound::http::referrals::active_referrals,
        crate::inbound::http::referrals::all_referrals,
        crate::inbound::http::referrals::delete_referral,
        crate::inbound::http::declarations::sign_declaration,
        crate::inbound::http::declarations::declaration_for_patient,
        crate::inbound::http::history::patient_medical_history,
        crate::inbound::http::history::patient_referrals,
        crate::inbound::http::ratings::doctor_rating,
        crate::inbound::http::ratings::hospital_rating,
        crate::inbound::http::profiles::fetch_profile,
        crate::inbound::http::profiles::update_profile,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        ApiError,
        AppointmentStatus,
        AppointmentSummary,
        AssignLabAssistantBody,
        CancelAppointmentBody,
        ContactUpdateBody,
        CreateAppointmentBody,
        Declaration,
        DoctorReferralBody,
        DomainError,
        ErrorCode,
        ExaminationReferralBody,
        FamilyDoctorReferralBody,
        FinishAppointmentBody,
        ProfileBody,
        RatingBody,
        Referral,
        ReferralTarget,
        Role,
        SignDeclarationBody,
        UploadedFileBody,
    ))
)]
pub struct ApiDoc;
