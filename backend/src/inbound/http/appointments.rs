//! Appointment HTTP handlers.

use actix_web::{HttpResponse, get, post, put, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::appointments::{AppointmentSummary, CreateAppointment, DateRange};
use crate::domain::ids::{
    AppointmentId, DoctorId, HospitalId, LabAssistantId, PatientId, ReferralId,
};
use crate::domain::ports::MedicalFileUpload;

use super::caller::Caller;
use super::error::{ApiError, ApiResult};
use super::state::HttpState;
use super::validation::{
    FieldName, parse_optional_date, parse_optional_uuid, parse_date, parse_time, parse_uuid,
};

/// Request payload for creating an appointment.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateAppointmentBody {
    /// The attending patient.
    #[schema(format = "uuid")]
    pub patient_id: String,
    /// Doctor target; mutually exclusive with `hospitalId`.
    #[schema(format = "uuid")]
    pub doctor_id: Option<String>,
    /// Hospital target; mutually exclusive with `doctorId`.
    #[schema(format = "uuid")]
    pub hospital_id: Option<String>,
    /// The referral being consumed.
    #[schema(format = "uuid")]
    pub referral_id: String,
    /// Calendar date.
    #[schema(example = "2026-08-10")]
    pub date: String,
    /// Start time.
    #[schema(example = "09:30")]
    pub time: String,
}

/// An uploaded medical file attached on completion.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFileBody {
    /// Original file name.
    pub file_name: String,
    /// File content.
    pub content: String,
}

/// Request payload for finishing an appointment.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FinishAppointmentBody {
    /// Diagnosis recorded by the finishing doctor.
    pub diagnosis: String,
    /// Medical files to attach.
    #[serde(default)]
    pub files: Vec<UploadedFileBody>,
}

/// Request payload for cancelling an appointment.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CancelAppointmentBody {
    /// The doctor side of the appointment.
    #[schema(format = "uuid")]
    pub doctor_id: String,
    /// The patient side of the appointment.
    #[schema(format = "uuid")]
    pub patient_id: String,
}

/// Request payload for assigning a lab assistant.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssignLabAssistantBody {
    /// The lab assistant to attach.
    #[schema(format = "uuid")]
    pub lab_assistant_id: String,
}

/// Date-range query parameters for appointment listings.
#[derive(Debug, Clone, Default, Deserialize, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct DateRangeQuery {
    /// Lower bound, inclusive, YYYY-MM-DD.
    pub from: Option<String>,
    /// Upper bound, inclusive, YYYY-MM-DD.
    pub to: Option<String>,
}

fn parse_range(query: DateRangeQuery) -> Result<DateRange, ApiError> {
    Ok(DateRange {
        from: parse_optional_date(query.from.as_deref(), FieldName::new("from"))?,
        to: parse_optional_date(query.to.as_deref(), FieldName::new("to"))?,
    })
}

/// Create an appointment against a referral.
#[utoipa::path(
    post,
    path = "/api/v1/appointments",
    tags = ["appointments"],
    request_body = CreateAppointmentBody,
    responses(
        (status = 201, description = "Appointment created", body = AppointmentSummary),
        (status = 400, description = "Malformed request fields"),
        (status = 404, description = "Referral, patient, or target not found"),
        (status = 409, description = "Both or neither of doctor and hospital supplied")
    )
)]
#[post("/appointments")]
pub async fn create_appointment(
    state: web::Data<HttpState>,
    body: web::Json<CreateAppointmentBody>,
) -> ApiResult<HttpResponse> {
    let body = body.into_inner();
    let request = CreateAppointment {
        patient_id: PatientId::from_uuid(parse_uuid(
            &body.patient_id,
            FieldName::new("patientId"),
        )?),
        doctor_id: parse_optional_uuid(body.doctor_id.as_deref(), FieldName::new("doctorId"))?
            .map(DoctorId::from_uuid),
        hospital_id: parse_optional_uuid(
            body.hospital_id.as_deref(),
            FieldName::new("hospitalId"),
        )?
        .map(HospitalId::from_uuid),
        referral_id: ReferralId::from_uuid(parse_uuid(
            &body.referral_id,
            FieldName::new("referralId"),
        )?),
        date: parse_date(&body.date, FieldName::new("date"))?,
        time: parse_time(&body.time, FieldName::new("time"))?,
    };

    let appointment = state.appointments.create_appointment(request).await?;
    Ok(HttpResponse::Created().json(AppointmentSummary::from(&appointment)))
}

/// Finish an appointment with a diagnosis and optional files.
#[utoipa::path(
    post,
    path = "/api/v1/appointments/{appointment_id}/finish",
    tags = ["appointments"],
    request_body = FinishAppointmentBody,
    responses(
        (status = 200, description = "Appointment completed", body = AppointmentSummary),
        (status = 404, description = "Appointment not found"),
        (status = 409, description = "Appointment already terminal"),
        (status = 500, description = "Medical file persistence failed")
    )
)]
#[post("/appointments/{appointment_id}/finish")]
pub async fn finish_appointment(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    caller: Caller,
    body: web::Json<FinishAppointmentBody>,
) -> ApiResult<HttpResponse> {
    let appointment_id = AppointmentId::from_uuid(parse_uuid(
        &path.into_inner(),
        FieldName::new("appointmentId"),
    )?);
    let body = body.into_inner();
    let files: Vec<MedicalFileUpload> = body
        .files
        .into_iter()
        .map(|file| MedicalFileUpload {
            file_name: file.file_name,
            content: file.content.into_bytes(),
        })
        .collect();

    let appointment = state
        .appointments
        .finish_appointment(caller.0.id, files, appointment_id, body.diagnosis)
        .await?;
    Ok(HttpResponse::Ok().json(AppointmentSummary::from(&appointment)))
}

/// Cancel an appointment.
#[utoipa::path(
    post,
    path = "/api/v1/appointments/{appointment_id}/cancel",
    tags = ["appointments"],
    request_body = CancelAppointmentBody,
    responses(
        (status = 204, description = "Appointment cancelled"),
        (status = 403, description = "Caller is neither the doctor, the patient, nor a lab assistant"),
        (status = 404, description = "Appointment not found")
    )
)]
#[post("/appointments/{appointment_id}/cancel")]
pub async fn cancel_appointment(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    caller: Caller,
    body: web::Json<CancelAppointmentBody>,
) -> ApiResult<HttpResponse> {
    let appointment_id = AppointmentId::from_uuid(parse_uuid(
        &path.into_inner(),
        FieldName::new("appointmentId"),
    )?);
    let body = body.into_inner();
    let doctor_id = DoctorId::from_uuid(parse_uuid(&body.doctor_id, FieldName::new("doctorId"))?);
    let patient_id =
        PatientId::from_uuid(parse_uuid(&body.patient_id, FieldName::new("patientId"))?);

    state
        .appointments
        .cancel_appointment(caller.0.id, doctor_id, patient_id, appointment_id)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}

/// Attach a lab assistant to an appointment.
#[utoipa::path(
    put,
    path = "/api/v1/appointments/{appointment_id}/lab-assistant",
    tags = ["appointments"],
    request_body = AssignLabAssistantBody,
    responses(
        (status = 200, description = "Lab assistant assigned", body = AppointmentSummary),
        (status = 404, description = "Appointment or lab assistant not found"),
        (status = 409, description = "Appointment already terminal")
    )
)]
#[put("/appointments/{appointment_id}/lab-assistant")]
pub async fn assign_lab_assistant(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    body: web::Json<AssignLabAssistantBody>,
) -> ApiResult<HttpResponse> {
    let appointment_id = AppointmentId::from_uuid(parse_uuid(
        &path.into_inner(),
        FieldName::new("appointmentId"),
    )?);
    let assistant_id = LabAssistantId::from_uuid(parse_uuid(
        &body.lab_assistant_id,
        FieldName::new("labAssistantId"),
    )?);

    let appointment = state
        .appointments
        .assign_lab_assistant(assistant_id, appointment_id)
        .await?;
    Ok(HttpResponse::Ok().json(AppointmentSummary::from(&appointment)))
}

/// Range-filtered appointment listing for a patient.
#[utoipa::path(
    get,
    path = "/api/v1/patients/{patient_id}/appointments",
    tags = ["appointments"],
    params(DateRangeQuery),
    responses(
        (status = 200, description = "Appointments in range", body = [AppointmentSummary]),
        (status = 401, description = "Listing unavailable")
    )
)]
#[get("/patients/{patient_id}/appointments")]
pub async fn appointments_for_patient(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    query: web::Query<DateRangeQuery>,
) -> ApiResult<HttpResponse> {
    let patient_id = PatientId::from_uuid(parse_uuid(
        &path.into_inner(),
        FieldName::new("patientId"),
    )?);
    let range = parse_range(query.into_inner())?;
    let summaries = state
        .appointments
        .appointments_for_patient(patient_id, range)
        .await?;
    Ok(HttpResponse::Ok().json(summaries))
}

/// Range-filtered appointment listing for a doctor.
#[utoipa::path(
    get,
    path = "/api/v1/doctors/{doctor_id}/appointments",
    tags = ["appointments"],
    params(DateRangeQuery),
    responses(
        (status = 200, description = "Appointments in range", body = [AppointmentSummary]),
        (status = 404, description = "Listing unavailable")
    )
)]
#[get("/doctors/{doctor_id}/appointments")]
pub async fn appointments_for_doctor(
    state: web::Data<HttpState>,
    path: web::Path<String>,
    query: web::Query<DateRangeQuery>,
) -> ApiResult<HttpResponse> {
    let doctor_id =
        DoctorId::from_uuid(parse_uuid(&path.into_inner(), FieldName::new("doctorId"))?);
    let range = parse_range(query.into_inner())?;
    let summaries = state
        .appointments
        .appointments_for_doctor(doctor_id, range)
        .await?;
    Ok(HttpResponse::Ok().json(summaries))
}
