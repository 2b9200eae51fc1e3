//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data` so they depend only
//! on the domain services and remain testable without a running server.

use std::sync::Arc;

use crate::domain::appointments::AppointmentService;
use crate::domain::auth::ProfileDirectory;
use crate::domain::declarations::DeclarationService;
use crate::domain::history::MedicalHistoryService;
use crate::domain::ratings::RatingService;
use crate::domain::referrals::ReferralPolicyService;

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Appointment lifecycle service.
    pub appointments: Arc<AppointmentService>,
    /// Referral policy service.
    pub referrals: Arc<ReferralPolicyService>,
    /// Declaration signing service.
    pub declarations: Arc<DeclarationService>,
    /// Medical-history read service.
    pub history: Arc<MedicalHistoryService>,
    /// Rating aggregation service.
    pub ratings: Arc<RatingService>,
    /// Role-keyed profile directory.
    pub profiles: ProfileDirectory,
}
