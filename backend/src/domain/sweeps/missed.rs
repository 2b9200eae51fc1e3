//! Missed-appointment detection sweep.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::TimeDelta;
use mockable::Clock;
use tracing::warn;

use crate::domain::appointments::AppointmentStatus;
use crate::domain::error::DomainError;
use crate::domain::ports::AppointmentRepository;

use super::{Sweep, SweepOutcome};

/// Closes open appointments whose start lies more than the grace period in
/// the past.
///
/// Mutated rows are persisted in one batch. A row whose version moved between
/// the read and the write lost a race against an explicit completion or
/// cancellation; the sweep logs and skips it rather than overwrite the later
/// state.
pub struct MissedAppointmentSweep {
    appointments: Arc<dyn AppointmentRepository>,
    clock: Arc<dyn Clock>,
    grace: TimeDelta,
}

impl MissedAppointmentSweep {
    /// Build the sweep with the given grace period.
    pub fn new(
        appointments: Arc<dyn AppointmentRepository>,
        clock: Arc<dyn Clock>,
        grace: TimeDelta,
    ) -> Self {
        Self {
            appointments,
            clock,
            grace,
        }
    }
}

#[async_trait]
impl Sweep for MissedAppointmentSweep {
    fn name(&self) -> &'static str {
        "missed-appointments"
    }

    async fn run(&self) -> Result<SweepOutcome, DomainError> {
        let now = self.clock.utc().naive_utc();
        let Some(cutoff) = now.checked_sub_signed(self.grace) else {
            return Err(DomainError::internal("missed-sweep cutoff out of range"));
        };

        let open = self
            .appointments
            .find_by_status(AppointmentStatus::Open)
            .await
            .map_err(|error| DomainError::internal(format!("open-appointment listing failed: {error}")))?;
        let examined = open.len();

        let mut mutated = Vec::new();
        for mut appointment in open {
            if appointment.scheduled_at() >= cutoff {
                continue;
            }
            if let Err(error) = appointment.mark_missed() {
                warn!(appointment = %appointment.id, %error, "skipping appointment during missed sweep");
                continue;
            }
            mutated.push(appointment);
        }

        if mutated.is_empty() {
            return Ok(SweepOutcome { examined, acted: 0 });
        }

        let batch = self
            .appointments
            .save_all(&mutated)
            .await
            .map_err(|error| DomainError::internal(format!("missed-sweep batch save failed: {error}")))?;
        for stale in &batch.stale {
            warn!(appointment = %stale, "appointment changed during missed sweep; left untouched");
        }
        Ok(SweepOutcome {
            examined,
            acted: batch.saved,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveTime};

    use super::*;
    use crate::domain::appointments::{Appointment, AppointmentTarget};
    use crate::domain::ids::{HospitalId, PatientId, ReferralId};
    use crate::domain::ports::{BatchSaveOutcome, MockAppointmentRepository};
    use crate::test_support::FixedClock;

    fn fixed_clock() -> Arc<FixedClock> {
        Arc::new(FixedClock::default_test_time())
    }

    fn open_appointment_at(hour: u32, day: u32) -> Appointment {
        Appointment::create(
            PatientId::random(),
            ReferralId::random(),
            NaiveDate::from_ymd_opt(2026, 8, day).expect("valid date"),
            NaiveTime::from_hms_opt(hour, 0, 0).expect("valid time"),
            AppointmentTarget::Hospital(HospitalId::random()),
        )
    }

    #[tokio::test]
    async fn closes_appointments_past_the_grace_period() {
        // Now is 12:00; grace is two hours. 09:00 today is overdue, 13:00
        // today is not.
        let overdue = open_appointment_at(9, 5);
        let upcoming = open_appointment_at(13, 5);
        let overdue_id = overdue.id;

        let mut appointments = MockAppointmentRepository::new();
        {
            let listing = vec![overdue.clone(), upcoming.clone()];
            appointments
                .expect_find_by_status()
                .returning(move |_| Ok(listing.clone()));
        }
        appointments
            .expect_save_all()
            .times(1)
            .withf(move |batch| {
                batch.len() == 1
                    && batch[0].id == overdue_id
                    && batch[0].status() == AppointmentStatus::Missed
            })
            .returning(|batch| {
                Ok(BatchSaveOutcome {
                    saved: batch.len(),
                    stale: Vec::new(),
                })
            });

        let sweep = MissedAppointmentSweep::new(
            Arc::new(appointments),
            fixed_clock(),
            TimeDelta::hours(2),
        );
        let outcome = sweep.run().await.expect("sweep succeeds");
        assert_eq!(outcome.examined, 2);
        assert_eq!(outcome.acted, 1);
    }

    #[tokio::test]
    async fn an_appointment_inside_the_grace_window_is_untouched() {
        // 11:00 today is one hour past start, within the two hour grace.
        let recent = open_appointment_at(11, 5);

        let mut appointments = MockAppointmentRepository::new();
        appointments
            .expect_find_by_status()
            .returning(move |_| Ok(vec![recent.clone()]));
        appointments.expect_save_all().times(0);

        let sweep = MissedAppointmentSweep::new(
            Arc::new(appointments),
            fixed_clock(),
            TimeDelta::hours(2),
        );
        let outcome = sweep.run().await.expect("sweep succeeds");
        assert_eq!(outcome.acted, 0);
    }

    #[tokio::test]
    async fn stale_rows_are_reported_not_retried() {
        let overdue = open_appointment_at(8, 4);
        let overdue_id = overdue.id;

        let mut appointments = MockAppointmentRepository::new();
        appointments
            .expect_find_by_status()
            .returning(move |_| Ok(vec![overdue.clone()]));
        appointments.expect_save_all().times(1).returning(move |_| {
            Ok(BatchSaveOutcome {
                saved: 0,
                stale: vec![overdue_id],
            })
        });

        let sweep = MissedAppointmentSweep::new(
            Arc::new(appointments),
            fixed_clock(),
            TimeDelta::hours(2),
        );
        let outcome = sweep.run().await.expect("sweep succeeds");
        assert_eq!(outcome.acted, 0);
    }
}
