//! Assembly of domain services, adapters, and sweeps.

use std::sync::Arc;

use mockable::Clock;
use tracing::info;

use crate::domain::actors::{AgeClass, DoctorType, Role};
use crate::domain::appointments::{AppointmentService, AppointmentServicePorts};
use crate::domain::auth::ProfileDirectory;
use crate::domain::declarations::{DeclarationService, DeclarationServicePorts};
use crate::domain::history::{MedicalHistoryPorts, MedicalHistoryService};
use crate::domain::ids::DoctorTypeId;
use crate::domain::ports::RepositoryError;
use crate::domain::ratings::RatingService;
use crate::domain::referrals::{ReferralPolicyPorts, ReferralPolicyService};
use crate::domain::sweeps::{
    DeclarationAgeSweep, MissedAppointmentSweep, ReminderSweep, Sweep, SweepScheduler,
    SweepSettings,
};
use crate::inbound::http::HttpState;
use crate::outbound::persistence::InMemoryStore;

/// Fully wired application state.
pub struct AppState {
    /// Handler dependency bundle.
    pub http: HttpState,
    /// Scheduler with all sweeps registered, not yet started.
    pub scheduler: SweepScheduler,
}

/// Wire every service and sweep over the given store and clock.
pub fn build_state(
    store: &Arc<InMemoryStore>,
    clock: Arc<dyn Clock>,
    sweeps: &SweepSettings,
) -> AppState {
    let appointments = Arc::new(AppointmentService::new(
        AppointmentServicePorts {
            appointments: Arc::clone(store) as _,
            referrals: Arc::clone(store) as _,
            patients: Arc::clone(store) as _,
            doctors: Arc::clone(store) as _,
            hospitals: Arc::clone(store) as _,
            lab_assistants: Arc::clone(store) as _,
            doctor_types: Arc::clone(store) as _,
            files: Arc::clone(store) as _,
        },
        Arc::clone(&clock),
    ));

    let referrals = Arc::new(ReferralPolicyService::new(
        ReferralPolicyPorts {
            referrals: Arc::clone(store) as _,
            appointments: Arc::clone(store) as _,
            doctor_types: Arc::clone(store) as _,
            examinations: Arc::clone(store) as _,
            gate: Arc::clone(&appointments) as _,
        },
        Arc::clone(&clock),
    ));

    let declarations = Arc::new(DeclarationService::new(DeclarationServicePorts {
        declarations: Arc::clone(store) as _,
        age_gate: Arc::clone(&appointments) as _,
        referrals: Arc::clone(&referrals) as _,
    }));

    let history = Arc::new(MedicalHistoryService::new(MedicalHistoryPorts {
        appointments: Arc::clone(store) as _,
        referrals: Arc::clone(store) as _,
        gate: Arc::clone(&appointments) as _,
    }));

    let ratings = Arc::new(RatingService::new(Arc::clone(store) as _));

    let profiles = ProfileDirectory::new()
        .register(Role::Patient, store.profile_repository(Role::Patient))
        .register(Role::Doctor, store.profile_repository(Role::Doctor))
        .register(
            Role::LabAssistant,
            store.profile_repository(Role::LabAssistant),
        );

    let mut scheduler = SweepScheduler::new();
    scheduler.register(
        Arc::new(ReminderSweep::new(
            Arc::clone(store) as _,
            Arc::clone(store) as _,
            Arc::clone(&clock),
        )) as Arc<dyn Sweep>,
        sweeps.reminder_interval,
    );
    scheduler.register(
        Arc::new(MissedAppointmentSweep::new(
            Arc::clone(store) as _,
            Arc::clone(&clock),
            sweeps.missed_grace,
        )) as Arc<dyn Sweep>,
        sweeps.missed_interval,
    );
    scheduler.register(
        Arc::new(DeclarationAgeSweep::new(
            Arc::clone(store) as _,
            Arc::clone(store) as _,
            Arc::clone(store) as _,
            Arc::clone(store) as _,
            Arc::clone(&clock),
        )) as Arc<dyn Sweep>,
        sweeps.declaration_interval,
    );

    AppState {
        http: HttpState {
            appointments,
            referrals,
            declarations,
            history,
            ratings,
            profiles,
        },
        scheduler,
    }
}

/// Seed the specialty registry the referral flows resolve against.
///
/// The family-doctor specialty must exist for declarations to issue
/// referrals; the rest mirrors a minimal clinic registry.
pub fn seed_registry(store: &InMemoryStore) -> Result<(), RepositoryError> {
    let specialties = [
        ("family doctor", AgeClass::All),
        ("pediatrician", AgeClass::Pediatric),
        ("cardiologist", AgeClass::All),
        ("internist", AgeClass::Adult),
    ];
    for (name, age_class) in specialties {
        store.insert_doctor_type(DoctorType {
            id: DoctorTypeId::random(),
            name: name.to_owned(),
            age_class,
        })?;
    }
    info!(count = specialties.len(), "specialty registry seeded");
    Ok(())
}
