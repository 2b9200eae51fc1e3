//! Reminder records generated by the reminder sweep.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::ids::{AppointmentId, PatientId, ReminderId};

/// Dedup key: at most one reminder per patient per appointment per day.
///
/// The key is explicit rather than derived from the reminder text, so message
/// formatting can change without breaking idempotence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReminderKey {
    /// The patient being reminded.
    pub patient_id: PatientId,
    /// The appointment the reminder refers to.
    pub appointment_id: AppointmentId,
    /// The day the reminder was generated on.
    pub date: NaiveDate,
}

/// A generated reminder message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Reminder {
    /// Stable identifier.
    pub id: ReminderId,
    /// The patient being reminded.
    pub patient_id: PatientId,
    /// The appointment the reminder refers to.
    pub appointment_id: AppointmentId,
    /// The day the reminder was generated on.
    pub generated_on: NaiveDate,
    /// Human-readable reminder text.
    pub message: String,
}

impl Reminder {
    /// Build a reminder and its implied dedup key.
    pub fn new(
        patient_id: PatientId,
        appointment_id: AppointmentId,
        generated_on: NaiveDate,
        message: String,
    ) -> Self {
        Self {
            id: ReminderId::random(),
            patient_id,
            appointment_id,
            generated_on,
            message,
        }
    }

    /// The dedup key this reminder occupies.
    pub fn key(&self) -> ReminderKey {
        ReminderKey {
            patient_id: self.patient_id,
            appointment_id: self.appointment_id,
            date: self.generated_on,
        }
    }
}
