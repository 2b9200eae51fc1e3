//! Domain services and aggregates of the appointment/referral core.
//!
//! Everything here is transport and persistence agnostic: services depend on
//! the ports in [`ports`], inbound adapters call the services, and outbound
//! adapters implement the ports. Appointment and referral state is only ever
//! mutated through [`appointments::AppointmentService`] and
//! [`referrals::ReferralPolicyService`].

pub mod actors;
pub mod appointments;
pub mod auth;
pub mod declarations;
pub mod error;
pub mod history;
pub mod ids;
pub mod ports;
pub mod ratings;
pub mod referrals;
pub mod reminders;
pub mod sweeps;

pub use self::error::{DomainError, DomainErrorValidationError, ErrorCode};

/// Convenient domain result alias.
///
/// # Examples
/// ```
/// use polyclinic_backend::domain::{DomainError, DomainResult};
///
/// fn deny() -> DomainResult<()> {
///     Err(DomainError::forbidden("nope"))
/// }
/// ```
pub type DomainResult<T> = Result<T, DomainError>;
