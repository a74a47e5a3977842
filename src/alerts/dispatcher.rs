use crate::alerts::events::{AlertEvent, TriggerKind};
use crate::alerts::thresholds::{Verdict, evaluate};
use crate::models::{Doctor, Patient, VitalSign};
use crate::notify::{NotificationChannel, NotificationRequest, NotificationResult, SendPool};
use crate::storage::CareDirectory;
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("{0} information missing")]
    MissingData(&'static str),
}

/// What caused an alert. Both variants end in the same fan-out pipeline.
#[derive(Debug, Clone, Copy)]
pub enum AlertTrigger<'a> {
    ThresholdBreach {
        patient: Option<&'a Patient>,
        vital: Option<&'a VitalSign>,
    },
    ManualPanic {
        patient: Option<&'a Patient>,
        doctor: Option<&'a Doctor>,
    },
}

/// One doctor's copy of an alert and how sending it went.
#[derive(Debug, Clone, Serialize)]
pub struct AlertDelivery {
    pub doctor_id: String,
    pub event: AlertEvent,
    pub result: NotificationResult,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DispatchOutcome {
    /// The reading was within threshold; nothing was sent.
    NoAlertNeeded { verdict: Verdict },
    Dispatched {
        kind: TriggerKind,
        verdict: Option<Verdict>,
        deliveries: Vec<AlertDelivery>,
    },
}

impl DispatchOutcome {
    pub fn results(&self) -> Vec<&NotificationResult> {
        match self {
            DispatchOutcome::NoAlertNeeded { .. } => Vec::new(),
            DispatchOutcome::Dispatched { deliveries, .. } => deliveries.iter().map(|d| &d.result).collect(),
        }
    }

    pub fn sent(&self) -> usize {
        self.results().iter().filter(|r| r.success).count()
    }

    pub fn failed(&self) -> usize {
        self.results().iter().filter(|r| !r.success).count()
    }
}

/// Turns breaches and panic presses into per-doctor notifications.
pub struct AlertDispatcher {
    channel: NotificationChannel,
    pool: SendPool,
}

impl AlertDispatcher {
    pub fn new(channel: NotificationChannel, pool: SendPool) -> Self {
        Self { channel, pool }
    }

    pub fn channel(&self) -> &NotificationChannel {
        &self.channel
    }

    pub async fn dispatch(&self, trigger: AlertTrigger<'_>, directory: &dyn CareDirectory) -> Result<DispatchOutcome, DispatchError> {
        match trigger {
            AlertTrigger::ThresholdBreach { patient, vital } => {
                let patient = patient.ok_or(DispatchError::MissingData("Patient"))?;
                let vital = vital.ok_or(DispatchError::MissingData("Vital sign"))?;

                let verdict = evaluate(Some(vital));
                if verdict.within_threshold {
                    tracing::debug!(patient_id = %patient.id, "Vitals within threshold, no alert needed");
                    return Ok(DispatchOutcome::NoAlertNeeded { verdict });
                }

                tracing::info!(
                    patient_id = %patient.id,
                    reason = ?verdict.reason,
                    "Abnormal vitals, alerting associated doctors"
                );

                let doctors = directory.associated_doctors(&patient.id);
                let deliveries = self.fan_out(&patient.id, &doctors, || AlertEvent::threshold_breach(patient, vital)).await;

                Ok(DispatchOutcome::Dispatched {
                    kind: TriggerKind::ThresholdBreach,
                    verdict: Some(verdict),
                    deliveries,
                })
            }
            AlertTrigger::ManualPanic { patient, doctor } => {
                let (patient, doctor) = match (patient, doctor) {
                    (Some(patient), Some(doctor)) => (patient, doctor),
                    _ => return Err(DispatchError::MissingData("Patient or doctor")),
                };

                tracing::warn!(patient_id = %patient.id, doctor_id = %doctor.id, "Panic button pressed");

                let deliveries = self
                    .fan_out(&patient.id, std::slice::from_ref(doctor), || AlertEvent::manual_panic(patient))
                    .await;

                Ok(DispatchOutcome::Dispatched {
                    kind: TriggerKind::ManualPanic,
                    verdict: None,
                    deliveries,
                })
            }
        }
    }

    /// Panic alert to every doctor associated with the patient.
    pub async fn panic_all(&self, patient: Option<&Patient>, directory: &dyn CareDirectory) -> Result<DispatchOutcome, DispatchError> {
        let patient = patient.ok_or(DispatchError::MissingData("Patient"))?;

        tracing::warn!(patient_id = %patient.id, "Panic button pressed");

        let doctors = directory.associated_doctors(&patient.id);
        let deliveries = self.fan_out(&patient.id, &doctors, || AlertEvent::manual_panic(patient)).await;

        Ok(DispatchOutcome::Dispatched {
            kind: TriggerKind::ManualPanic,
            verdict: None,
            deliveries,
        })
    }

    /// Each doctor gets their own event and an isolated send attempt.
    async fn fan_out(&self, patient_id: &str, doctors: &[Doctor], make_event: impl Fn() -> AlertEvent) -> Vec<AlertDelivery> {
        if doctors.is_empty() {
            tracing::warn!(patient_id, "No doctors associated with this patient to receive alerts");
            return Vec::new();
        }

        let kind = self.channel.kind();
        let events: Vec<AlertEvent> = doctors.iter().map(|_| make_event()).collect();
        let requests = doctors
            .iter()
            .zip(&events)
            .map(|(doctor, event)| NotificationRequest::new(doctor.address_for(kind), event.message.clone(), kind))
            .collect();

        let results = self.pool.send_all(&self.channel, requests).await;

        let deliveries: Vec<AlertDelivery> = doctors
            .iter()
            .zip(events)
            .zip(results)
            .map(|((doctor, event), result)| AlertDelivery {
                doctor_id: doctor.id.clone(),
                event,
                result,
            })
            .collect();

        let failed = deliveries.iter().filter(|d| !d.result.success).count();
        tracing::info!(
            patient_id,
            recipients = deliveries.len(),
            failed,
            "Alert fan-out complete"
        );

        deliveries
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::thresholds::VerdictReason;
    use crate::models::User;
    use crate::notify::{ChannelKind, NotificationError, SmsChannel};
    use crate::storage::CareRepository;

    fn dispatcher() -> AlertDispatcher {
        AlertDispatcher::new(NotificationChannel::Sms(SmsChannel), SendPool::default())
    }

    fn repository() -> CareRepository {
        let mut repo = CareRepository::new();
        repo.add_user(User::patient("P1", "Ann", "ann@example.com")).unwrap();
        repo.add_user(User::doctor("D1", "House", "house@example.com").with_phone("+15550101")).unwrap();
        repo.add_user(User::doctor("D2", "Grey", "grey@example.com")).unwrap();
        repo.add_user(User::doctor("D3", "Who", "who@example.com").with_phone("+15550103")).unwrap();
        for doctor in ["D1", "D2", "D3"] {
            repo.assign_patient(doctor, "P1").unwrap();
        }
        repo
    }

    #[tokio::test]
    async fn test_missing_data_errors() {
        let repo = repository();
        let patient = repo.find_user("P1").unwrap().clone();
        let vital = VitalSign::new(130, 90, "150/95", 38.5);

        let err = dispatcher()
            .dispatch(AlertTrigger::ThresholdBreach { patient: None, vital: Some(&vital) }, &repo)
            .await
            .unwrap_err();
        assert_eq!(err, DispatchError::MissingData("Patient"));

        let err = dispatcher()
            .dispatch(AlertTrigger::ThresholdBreach { patient: Some(&patient), vital: None }, &repo)
            .await
            .unwrap_err();
        assert_eq!(err, DispatchError::MissingData("Vital sign"));

        let err = dispatcher()
            .dispatch(AlertTrigger::ManualPanic { patient: Some(&patient), doctor: None }, &repo)
            .await
            .unwrap_err();
        assert!(matches!(err, DispatchError::MissingData(_)));
    }

    #[tokio::test]
    async fn test_normal_vitals_send_nothing() {
        let repo = repository();
        let patient = repo.find_user("P1").unwrap().clone();
        let vital = VitalSign::new(72, 98, "120/80", 36.6);

        let outcome = dispatcher()
            .dispatch(AlertTrigger::ThresholdBreach { patient: Some(&patient), vital: Some(&vital) }, &repo)
            .await
            .unwrap();

        assert!(matches!(outcome, DispatchOutcome::NoAlertNeeded { .. }));
        assert!(outcome.results().is_empty());
    }

    #[tokio::test]
    async fn test_breach_isolates_failed_recipient() {
        let repo = repository();
        let patient = repo.find_user("P1").unwrap().clone();
        let vital = VitalSign::new(130, 90, "150/95", 38.5);

        // D2 has no phone number, so the SMS to them fails on its own.
        let outcome = dispatcher()
            .dispatch(AlertTrigger::ThresholdBreach { patient: Some(&patient), vital: Some(&vital) }, &repo)
            .await
            .unwrap();

        let DispatchOutcome::Dispatched { kind, verdict, deliveries } = outcome else {
            panic!("expected a dispatch");
        };
        assert_eq!(kind, TriggerKind::ThresholdBreach);
        assert_eq!(verdict.unwrap().reason, VerdictReason::OutOfRange);
        assert_eq!(deliveries.len(), 3);

        let ids: Vec<&str> = deliveries.iter().map(|d| d.doctor_id.as_str()).collect();
        assert_eq!(ids, vec!["D1", "D2", "D3"]);
        assert!(deliveries[0].result.success);
        assert!(!deliveries[1].result.success);
        assert_eq!(
            deliveries[1].result.error,
            Some(NotificationError::InvalidRecipient { channel: "sms".to_string() })
        );
        assert!(deliveries[2].result.success);
        assert!(deliveries.iter().all(|d| d.event.message.contains("BP=150/95")));
        assert!(deliveries.iter().all(|d| d.result.channel == ChannelKind::Sms));
    }

    #[tokio::test]
    async fn test_malformed_reading_still_alerts() {
        let repo = repository();
        let patient = repo.find_user("P1").unwrap().clone();
        let vital = VitalSign::new(72, 98, "abc/80", 36.6);

        let outcome = dispatcher()
            .dispatch(AlertTrigger::ThresholdBreach { patient: Some(&patient), vital: Some(&vital) }, &repo)
            .await
            .unwrap();

        match outcome {
            DispatchOutcome::Dispatched { verdict, .. } => {
                assert_eq!(verdict.unwrap().reason, VerdictReason::MalformedReading);
            }
            other => panic!("unexpected outcome: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_breach_without_doctors_reports_nothing() {
        let mut repo = CareRepository::new();
        repo.add_user(User::patient("P9", "Lone", "lone@example.com")).unwrap();
        let patient = repo.find_user("P9").unwrap().clone();
        let vital = VitalSign::new(130, 90, "150/95", 38.5);

        let outcome = dispatcher()
            .dispatch(AlertTrigger::ThresholdBreach { patient: Some(&patient), vital: Some(&vital) }, &repo)
            .await
            .unwrap();

        assert!(matches!(outcome, DispatchOutcome::Dispatched { .. }));
        assert!(outcome.results().is_empty());
    }

    #[tokio::test]
    async fn test_manual_panic_targets_one_doctor() {
        let repo = repository();
        let patient = repo.find_user("P1").unwrap().clone();
        let doctor = repo.find_user("D3").unwrap().clone();

        let outcome = dispatcher()
            .dispatch(AlertTrigger::ManualPanic { patient: Some(&patient), doctor: Some(&doctor) }, &repo)
            .await
            .unwrap();

        let DispatchOutcome::Dispatched { kind, deliveries, .. } = outcome else {
            panic!("expected a dispatch");
        };
        assert_eq!(kind, TriggerKind::ManualPanic);
        assert_eq!(deliveries.len(), 1);
        assert_eq!(deliveries[0].result.recipient, "+15550103");
        assert_eq!(deliveries[0].event.message, "Emergency! Patient P1 needs immediate attention.");
        assert!(deliveries[0].event.vital.is_none());
    }

    #[tokio::test]
    async fn test_panic_all_reaches_every_associated_doctor() {
        let repo = repository();
        let patient = repo.find_user("P1").unwrap().clone();

        let outcome = dispatcher().panic_all(Some(&patient), &repo).await.unwrap();
        assert_eq!(outcome.results().len(), 3);
        assert_eq!(outcome.sent(), 2);
        assert_eq!(outcome.failed(), 1);

        assert_eq!(
            dispatcher().panic_all(None, &repo).await.unwrap_err(),
            DispatchError::MissingData("Patient")
        );
    }
}
