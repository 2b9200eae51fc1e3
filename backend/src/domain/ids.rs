//! Strongly typed entity identifiers.
//!
//! Every aggregate gets its own UUID-backed newtype so identifiers cannot be
//! mixed up across repository calls.

use std::fmt;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
            ToSchema,
        )]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Mint a fresh random identifier.
            pub fn random() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wrap an existing UUID.
            pub const fn from_uuid(value: Uuid) -> Self {
                Self(value)
            }

            /// Underlying UUID value.
            pub const fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl From<Uuid> for $name {
            fn from(value: Uuid) -> Self {
                Self(value)
            }
        }
    };
}

entity_id!(
    /// Identifier of a patient.
    PatientId
);
entity_id!(
    /// Identifier of a doctor.
    DoctorId
);
entity_id!(
    /// Identifier of a lab assistant.
    LabAssistantId
);
entity_id!(
    /// Identifier of a hospital or laboratory.
    HospitalId
);
entity_id!(
    /// Identifier of a doctor specialty record.
    DoctorTypeId
);
entity_id!(
    /// Identifier of an examination kind.
    ExaminationId
);
entity_id!(
    /// Identifier of a referral.
    ReferralId
);
entity_id!(
    /// Identifier of an appointment.
    AppointmentId
);
entity_id!(
    /// Identifier of a family-doctor declaration.
    DeclarationId
);
entity_id!(
    /// Identifier of a feedback entry.
    FeedbackId
);
entity_id!(
    /// Identifier of a stored medical file.
    MedicalFileId
);
entity_id!(
    /// Identifier of a generated reminder.
    ReminderId
);
