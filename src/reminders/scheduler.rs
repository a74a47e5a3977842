use crate::models::{Appointment, Prescription};
use crate::notify::{ChannelKind, NotificationChannel, NotificationError, NotificationRequest, NotificationResult, SendPool};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderKind {
    AppointmentReminder,
    MedicationReminder,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ReminderSource<'a> {
    Appointment(&'a Appointment),
    Prescription(&'a Prescription),
}

/// A reminder about to be sent. Built fresh for every run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReminderJob<'a> {
    pub kind: ReminderKind,
    pub source: ReminderSource<'a>,
    pub message: String,
    pub recipient: String,
}

impl<'a> ReminderJob<'a> {
    pub fn for_appointment(appointment: &'a Appointment, channel: ChannelKind) -> Self {
        Self {
            kind: ReminderKind::AppointmentReminder,
            source: ReminderSource::Appointment(appointment),
            message: format!(
                "Reminder: Appointment with Dr. {} on {}",
                appointment.doctor.name, appointment.date
            ),
            recipient: appointment.patient.address_for(channel).to_string(),
        }
    }

    pub fn for_prescription(prescription: &'a Prescription, channel: ChannelKind) -> Self {
        Self {
            kind: ReminderKind::MedicationReminder,
            source: ReminderSource::Prescription(prescription),
            message: format!(
                "Reminder: Take {} ({}) as per schedule: {}",
                prescription.medication, prescription.dosage, prescription.schedule
            ),
            recipient: prescription.patient.address_for(channel).to_string(),
        }
    }
}

/// What to do with the rest of a batch once one reminder fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Every reminder gets its own attempt.
    #[default]
    Isolate,
    /// Stop at the first failure; the remainder is reported as skipped.
    AbortOnFirstFailure,
}

impl std::str::FromStr for FailurePolicy {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "isolate" => Ok(FailurePolicy::Isolate),
            "abort" => Ok(FailurePolicy::AbortOnFirstFailure),
            _ => anyhow::bail!("Invalid failure_policy: {}. Must be 'isolate' or 'abort'", s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReminderFailure {
    pub kind: ReminderKind,
    pub recipient: String,
    pub error: NotificationError,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchResult {
    pub sent: usize,
    pub failed: Vec<ReminderFailure>,
    /// Jobs never attempted because the batch was aborted.
    pub skipped: usize,
    /// One entry per attempted send, in job order.
    pub results: Vec<NotificationResult>,
}

impl BatchResult {
    pub fn attempted(&self) -> usize {
        self.results.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failed.is_empty() && self.skipped == 0
    }
}

/// Sends appointment and medication reminders through one shared channel.
pub struct ReminderScheduler {
    notifier: NotificationChannel,
    pool: SendPool,
    policy: FailurePolicy,
}

impl ReminderScheduler {
    pub fn new(notifier: NotificationChannel, pool: SendPool) -> Self {
        Self {
            notifier,
            pool,
            policy: FailurePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Approved appointments first, then every prescription, in input order.
    pub fn plan<'a>(appointments: &'a [Appointment], prescriptions: &'a [Prescription], channel: ChannelKind) -> Vec<ReminderJob<'a>> {
        appointments
            .iter()
            .filter(|a| a.is_approved())
            .map(|a| ReminderJob::for_appointment(a, channel))
            .chain(prescriptions.iter().map(|p| ReminderJob::for_prescription(p, channel)))
            .collect()
    }

    pub async fn run(&self, appointments: &[Appointment], prescriptions: &[Prescription]) -> BatchResult {
        let channel = self.notifier.kind();
        let jobs = Self::plan(appointments, prescriptions, channel);
        let total = jobs.len();
        let kinds: Vec<ReminderKind> = jobs.iter().map(|job| job.kind).collect();

        let requests: Vec<NotificationRequest> = jobs
            .iter()
            .map(|job| NotificationRequest::new(job.recipient.clone(), job.message.clone(), channel))
            .collect();

        tracing::info!(jobs = total, policy = ?self.policy, "Sending reminders");

        let results = match self.policy {
            FailurePolicy::Isolate => self.pool.send_all(&self.notifier, requests).await,
            FailurePolicy::AbortOnFirstFailure => {
                let mut results = Vec::with_capacity(total);
                for request in requests {
                    let result = self.pool.send_one(&self.notifier, request).await;
                    let failed = !result.success;
                    results.push(result);
                    if failed {
                        break;
                    }
                }
                results
            }
        };

        let failed: Vec<ReminderFailure> = kinds
            .iter()
            .zip(&results)
            .filter_map(|(kind, result)| {
                result.error.clone().map(|error| ReminderFailure {
                    kind: *kind,
                    recipient: result.recipient.clone(),
                    error,
                })
            })
            .collect();

        let batch = BatchResult {
            sent: results.iter().filter(|r| r.success).count(),
            skipped: total - results.len(),
            failed,
            results,
        };

        if batch.is_clean() {
            tracing::info!(sent = batch.sent, "Reminders sent");
        } else {
            tracing::warn!(
                sent = batch.sent,
                failed = batch.failed.len(),
                skipped = batch.skipped,
                "Reminder batch finished with failures"
            );
        }

        batch
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AppointmentStatus, User};
    use crate::notify::SmsChannel;

    /// An empty phone number makes the SMS to this patient fail.
    fn patient(phone: &str) -> User {
        User::patient("P1", "Ann", "ann@example.com").with_phone(phone)
    }

    fn appointment(date: &str, status: AppointmentStatus, phone: &str) -> Appointment {
        Appointment {
            date: date.to_string(),
            doctor: User::doctor("D1", "House", "house@example.com"),
            patient: patient(phone),
            status,
        }
    }

    fn prescription(medication: &str, phone: &str) -> Prescription {
        Prescription {
            medication: medication.to_string(),
            dosage: "500mg".to_string(),
            schedule: "twice daily".to_string(),
            patient: patient(phone),
        }
    }

    fn scheduler() -> ReminderScheduler {
        ReminderScheduler::new(NotificationChannel::Sms(SmsChannel), SendPool::default())
    }

    #[test]
    fn test_plan_only_reminds_approved_appointments() {
        let appointments = vec![
            appointment("2026-11-01", AppointmentStatus::Requested, "+15550100"),
            appointment("2026-11-02", AppointmentStatus::Approved, "+15550100"),
            appointment("2026-11-03", AppointmentStatus::Cancelled, "+15550100"),
        ];
        let prescriptions = vec![prescription("Amoxicillin", "+15550100")];

        let jobs = ReminderScheduler::plan(&appointments, &prescriptions, ChannelKind::Email);
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].kind, ReminderKind::AppointmentReminder);
        assert_eq!(jobs[0].message, "Reminder: Appointment with Dr. House on 2026-11-02");
        assert_eq!(jobs[0].source, ReminderSource::Appointment(&appointments[1]));
        assert_eq!(jobs[1].kind, ReminderKind::MedicationReminder);
        assert_eq!(jobs[1].message, "Reminder: Take Amoxicillin (500mg) as per schedule: twice daily");
        assert_eq!(jobs[1].recipient, "ann@example.com");

        let sms_jobs = ReminderScheduler::plan(&appointments, &prescriptions, ChannelKind::Sms);
        assert_eq!(sms_jobs[0].recipient, "+15550100");
    }

    #[tokio::test]
    async fn test_isolate_policy_continues_past_failure() {
        let appointments = vec![
            appointment("2026-11-02", AppointmentStatus::Approved, ""),
            appointment("2026-11-04", AppointmentStatus::Approved, "+15550100"),
        ];
        let prescriptions = vec![prescription("Ibuprofen", "+15550100")];

        let batch = scheduler().run(&appointments, &prescriptions).await;
        assert_eq!(batch.sent, 2);
        assert_eq!(batch.failed.len(), 1);
        assert_eq!(batch.failed[0].kind, ReminderKind::AppointmentReminder);
        assert_eq!(batch.skipped, 0);
        assert_eq!(batch.attempted(), 3);
        assert!(!batch.is_clean());
    }

    #[tokio::test]
    async fn test_abort_policy_stops_at_first_failure() {
        let appointments = vec![
            appointment("2026-11-02", AppointmentStatus::Approved, "+15550100"),
            appointment("2026-11-04", AppointmentStatus::Approved, ""),
        ];
        let prescriptions = vec![prescription("Ibuprofen", "+15550100")];

        let batch = scheduler()
            .with_policy(FailurePolicy::AbortOnFirstFailure)
            .run(&appointments, &prescriptions)
            .await;
        assert_eq!(batch.sent, 1);
        assert_eq!(batch.failed.len(), 1);
        assert_eq!(batch.skipped, 1);
        assert_eq!(batch.attempted(), 2);
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let batch = scheduler().run(&[], &[]).await;
        assert_eq!(batch.sent, 0);
        assert!(batch.is_clean());
    }

    #[test]
    fn test_failure_policy_parse() {
        assert_eq!("isolate".parse::<FailurePolicy>().unwrap(), FailurePolicy::Isolate);
        assert_eq!("abort".parse::<FailurePolicy>().unwrap(), FailurePolicy::AbortOnFirstFailure);
        assert!("retry".parse::<FailurePolicy>().is_err());
    }
}
