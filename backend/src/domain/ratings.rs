//! Rating aggregation over patient feedback.
//!
//! The same rule feeds both the single-entity detail view and bulk
//! search-result annotation, so it lives in one place: mean of the non-null
//! scores, rounded to two decimals, 0.0 when there is nothing to average.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::error::DomainError;
use super::ids::{DoctorId, FeedbackId, HospitalId, PatientId};
use super::ports::{FeedbackRepository, RepositoryError};

/// Patient feedback left for a doctor or a hospital.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Feedback {
    /// Stable identifier.
    pub id: FeedbackId,
    /// The authoring patient.
    pub patient_id: PatientId,
    /// The rated doctor, for doctor feedback.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doctor_id: Option<DoctorId>,
    /// The rated hospital, for hospital feedback.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hospital_id: Option<HospitalId>,
    /// Score from 1 to 5; feedback may carry a comment only.
    pub score: Option<u8>,
    /// Free-form comment.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

/// Rating aggregation service.
pub struct RatingService {
    feedback: Arc<dyn FeedbackRepository>,
}

impl RatingService {
    /// Build the service over the feedback port.
    pub fn new(feedback: Arc<dyn FeedbackRepository>) -> Self {
        Self { feedback }
    }

    fn map_repository_error(error: RepositoryError) -> DomainError {
        DomainError::internal(format!("feedback repository error: {error}"))
    }

    /// Average rating of a doctor.
    pub async fn calculate_doctor_rating(&self, doctor_id: DoctorId) -> Result<f64, DomainError> {
        let feedback = self
            .feedback
            .find_by_doctor(doctor_id)
            .await
            .map_err(Self::map_repository_error)?;
        Ok(mean_score(&feedback))
    }

    /// Average rating of a hospital.
    pub async fn calculate_hospital_rating(
        &self,
        hospital_id: HospitalId,
    ) -> Result<f64, DomainError> {
        let feedback = self
            .feedback
            .find_by_hospital(hospital_id)
            .await
            .map_err(Self::map_repository_error)?;
        Ok(mean_score(&feedback))
    }
}

/// Mean of the non-null scores, rounded to two decimals.
///
/// Score-less feedback is excluded from the average, not counted as zero; an
/// empty input yields 0.0.
pub fn mean_score(feedback: &[Feedback]) -> f64 {
    let scores: Vec<u8> = feedback.iter().filter_map(|entry| entry.score).collect();
    if scores.is_empty() {
        return 0.0;
    }
    let sum: u32 = scores.iter().map(|score| u32::from(*score)).sum();
    let mean = f64::from(sum) / scores.len() as f64;
    (mean * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::domain::ports::MockFeedbackRepository;

    fn scored(score: Option<u8>) -> Feedback {
        Feedback {
            id: FeedbackId::random(),
            patient_id: PatientId::random(),
            doctor_id: Some(DoctorId::random()),
            hospital_id: None,
            score,
            comment: None,
        }
    }

    #[rstest]
    #[case(&[], 0.0)]
    #[case(&[Some(5), Some(4), Some(3)], 4.0)]
    #[case(&[Some(5), None, Some(4), Some(3)], 4.0)]
    #[case(&[Some(5), Some(4)], 4.5)]
    #[case(&[Some(5), Some(4), Some(4)], 4.33)]
    #[case(&[None, None], 0.0)]
    fn mean_excludes_null_scores_and_rounds(#[case] scores: &[Option<u8>], #[case] expected: f64) {
        let feedback: Vec<Feedback> = scores.iter().copied().map(scored).collect();
        assert!((mean_score(&feedback) - expected).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn doctor_rating_aggregates_repository_feedback() {
        let mut repository = MockFeedbackRepository::new();
        repository
            .expect_find_by_doctor()
            .returning(|_| Ok(vec![scored(Some(5)), scored(Some(4)), scored(None)]));

        let service = RatingService::new(std::sync::Arc::new(repository));
        let rating = service
            .calculate_doctor_rating(DoctorId::random())
            .await
            .expect("rating computed");
        assert!((rating - 4.5).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn hospital_with_no_feedback_rates_zero() {
        let mut repository = MockFeedbackRepository::new();
        repository
            .expect_find_by_hospital()
            .returning(|_| Ok(Vec::new()));

        let service = RatingService::new(std::sync::Arc::new(repository));
        let rating = service
            .calculate_hospital_rating(HospitalId::random())
            .await
            .expect("rating computed");
        assert!((rating - 0.0).abs() < f64::EPSILON);
    }
}
