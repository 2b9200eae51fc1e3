//! Reminder generation sweep.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::warn;

use crate::domain::appointments::{Appointment, AppointmentStatus};
use crate::domain::error::DomainError;
use crate::domain::ports::{AppointmentRepository, ReminderRepository};
use crate::domain::reminders::{Reminder, ReminderKey};

use super::{Sweep, SweepOutcome};

/// Generates one reminder per patient per day for every scheduled
/// appointment taking place today or tomorrow.
///
/// Idempotence hangs off the explicit `(patient, appointment, day)` key, so
/// running the sweep twice in the same day creates nothing new.
pub struct ReminderSweep {
    appointments: Arc<dyn AppointmentRepository>,
    reminders: Arc<dyn ReminderRepository>,
    clock: Arc<dyn Clock>,
}

impl ReminderSweep {
    /// Build the sweep.
    pub fn new(
        appointments: Arc<dyn AppointmentRepository>,
        reminders: Arc<dyn ReminderRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            appointments,
            reminders,
            clock,
        }
    }

    fn message_for(appointment: &Appointment) -> String {
        format!(
            "Reminder: you have an appointment on {} at {}.",
            appointment.date,
            appointment.time.format("%H:%M")
        )
    }
}

#[async_trait]
impl Sweep for ReminderSweep {
    fn name(&self) -> &'static str {
        "reminders"
    }

    async fn run(&self) -> Result<SweepOutcome, DomainError> {
        let today = self.clock.utc().date_naive();
        let Some(tomorrow) = today.succ_opt() else {
            return Err(DomainError::internal("reminder-sweep date out of range"));
        };

        let scheduled = self
            .appointments
            .find_by_status(AppointmentStatus::Scheduled)
            .await
            .map_err(|error| {
                DomainError::internal(format!("scheduled-appointment listing failed: {error}"))
            })?;
        let examined = scheduled.len();

        let mut acted = 0;
        for appointment in scheduled {
            if appointment.date != today && appointment.date != tomorrow {
                continue;
            }

            let key = ReminderKey {
                patient_id: appointment.patient_id,
                appointment_id: appointment.id,
                date: today,
            };
            match self.reminders.exists(&key).await {
                Ok(true) => continue,
                Ok(false) => {}
                Err(error) => {
                    warn!(appointment = %appointment.id, %error, "reminder dedup check failed; skipping");
                    continue;
                }
            }

            let reminder = Reminder::new(
                appointment.patient_id,
                appointment.id,
                today,
                Self::message_for(&appointment),
            );
            if let Err(error) = self.reminders.save(&reminder).await {
                warn!(appointment = %appointment.id, %error, "reminder save failed; skipping");
                continue;
            }
            acted += 1;
        }

        Ok(SweepOutcome { examined, acted })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};

    use super::*;
    use crate::domain::appointments::AppointmentTarget;
    use crate::domain::ids::{DoctorId, PatientId, ReferralId};
    use crate::domain::ports::{MockAppointmentRepository, RepositoryError};
    use crate::test_support::FixedClock;

    /// In-memory reminder store; the sweep's dedup behaviour is the thing
    /// under test, so the double has to remember saves between runs.
    #[derive(Default)]
    struct RecordingReminderRepository {
        store: Mutex<Vec<Reminder>>,
    }

    impl RecordingReminderRepository {
        fn count(&self) -> usize {
            self.store.lock().expect("store poisoned").len()
        }
    }

    #[async_trait]
    impl ReminderRepository for RecordingReminderRepository {
        async fn exists(&self, key: &ReminderKey) -> Result<bool, RepositoryError> {
            let guard = self.store.lock().map_err(|_| {
                RepositoryError::connection("reminder store poisoned")
            })?;
            Ok(guard.iter().any(|reminder| reminder.key() == *key))
        }

        async fn save(&self, reminder: &Reminder) -> Result<(), RepositoryError> {
            let mut guard = self.store.lock().map_err(|_| {
                RepositoryError::connection("reminder store poisoned")
            })?;
            guard.push(reminder.clone());
            Ok(())
        }

        async fn find_by_patient(
            &self,
            patient_id: PatientId,
        ) -> Result<Vec<Reminder>, RepositoryError> {
            let guard = self.store.lock().map_err(|_| {
                RepositoryError::connection("reminder store poisoned")
            })?;
            Ok(guard
                .iter()
                .filter(|reminder| reminder.patient_id == patient_id)
                .cloned()
                .collect())
        }
    }

    fn fixed_clock() -> Arc<FixedClock> {
        Arc::new(FixedClock::at(
            Utc.with_ymd_and_hms(2026, 8, 5, 7, 0, 0)
                .single()
                .expect("valid time"),
        ))
    }

    fn scheduled_on(day: u32) -> Appointment {
        Appointment::create(
            PatientId::random(),
            ReferralId::random(),
            NaiveDate::from_ymd_opt(2026, 8, day).expect("valid date"),
            NaiveTime::from_hms_opt(10, 30, 0).expect("valid time"),
            AppointmentTarget::Doctor(DoctorId::random()),
        )
    }

    fn appointments_returning(listing: Vec<Appointment>) -> Arc<MockAppointmentRepository> {
        let mut appointments = MockAppointmentRepository::new();
        appointments
            .expect_find_by_status()
            .returning(move |_| Ok(listing.clone()));
        Arc::new(appointments)
    }

    #[tokio::test]
    async fn reminds_for_today_and_tomorrow_only() {
        // Today is 5 August.
        let listing = vec![scheduled_on(5), scheduled_on(6), scheduled_on(20)];
        let reminders = Arc::new(RecordingReminderRepository::default());
        let sweep = ReminderSweep::new(
            appointments_returning(listing),
            Arc::clone(&reminders) as Arc<dyn ReminderRepository>,
            fixed_clock(),
        );

        let outcome = sweep.run().await.expect("sweep succeeds");
        assert_eq!(outcome.examined, 3);
        assert_eq!(outcome.acted, 2);
        assert_eq!(reminders.count(), 2);
    }

    #[tokio::test]
    async fn running_twice_in_a_day_creates_one_reminder() {
        let listing = vec![scheduled_on(6)];
        let reminders = Arc::new(RecordingReminderRepository::default());
        let sweep = ReminderSweep::new(
            appointments_returning(listing),
            Arc::clone(&reminders) as Arc<dyn ReminderRepository>,
            fixed_clock(),
        );

        sweep.run().await.expect("first run succeeds");
        let second = sweep.run().await.expect("second run succeeds");

        assert_eq!(second.acted, 0);
        assert_eq!(reminders.count(), 1);
    }

    #[tokio::test]
    async fn reminder_text_names_the_appointment_slot() {
        let appointment = scheduled_on(5);
        let patient_id = appointment.patient_id;
        let reminders = Arc::new(RecordingReminderRepository::default());
        let sweep = ReminderSweep::new(
            appointments_returning(vec![appointment]),
            Arc::clone(&reminders) as Arc<dyn ReminderRepository>,
            fixed_clock(),
        );

        sweep.run().await.expect("sweep succeeds");
        let stored = reminders
            .find_by_patient(patient_id)
            .await
            .expect("listing succeeds");
        assert_eq!(
            stored[0].message,
            "Reminder: you have an appointment on 2026-08-05 at 10:30."
        );
    }
}
