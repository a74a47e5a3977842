use crate::alerts::{DispatchOutcome, Verdict, VerdictReason};
use crate::models::{Appointment, Feedback, User};
use crate::notify::NotificationResult;
use crate::reminders::BatchResult;
use serde::Serialize;
use tabled::{Table, Tabled};

/// Trait for results that can be displayed as tables or JSON
pub trait OutputFormat {
    fn to_table(&self) -> String;
    fn to_json(&self) -> Result<String, serde_json::Error>;
}

/// Row for a threshold verdict
#[derive(Tabled, Serialize, Debug)]
pub struct VerdictRow {
    #[tabled(rename = "Within Threshold")]
    pub within_threshold: String,
    #[tabled(rename = "Reason")]
    pub reason: String,
    #[tabled(rename = "Out Of Range")]
    pub breaches: String,
}

/// Row for one attempted send
#[derive(Tabled, Serialize, Debug)]
pub struct DeliveryRow {
    #[tabled(rename = "Recipient")]
    pub recipient: String,
    #[tabled(rename = "Channel")]
    pub channel: String,
    #[tabled(rename = "Status")]
    pub status: String,
    #[tabled(rename = "Error")]
    pub error: String,
}

/// Row for a registered user
#[derive(Tabled, Serialize, Debug)]
pub struct UserRow {
    #[tabled(rename = "ID")]
    pub id: String,
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Role")]
    pub role: String,
    #[tabled(rename = "Email")]
    pub email: String,
    #[tabled(rename = "Phone")]
    pub phone: String,
}

/// Row for an appointment; the index is what `appointment approve` takes
#[derive(Tabled, Serialize, Debug)]
pub struct AppointmentRow {
    #[tabled(rename = "#")]
    pub index: usize,
    #[tabled(rename = "Date")]
    pub date: String,
    #[tabled(rename = "Doctor")]
    pub doctor: String,
    #[tabled(rename = "Patient")]
    pub patient: String,
    #[tabled(rename = "Status")]
    pub status: String,
}

#[derive(Tabled, Serialize, Debug)]
pub struct FeedbackRow {
    #[tabled(rename = "Recorded")]
    pub recorded: String,
    #[tabled(rename = "Doctor")]
    pub doctor: String,
    #[tabled(rename = "Feedback")]
    pub text: String,
    #[tabled(rename = "Prescription")]
    pub prescription: String,
}

impl VerdictRow {
    pub fn from_verdict(verdict: &Verdict) -> Self {
        Self {
            within_threshold: if verdict.within_threshold { "yes" } else { "no" }.to_string(),
            reason: reason_label(verdict.reason).to_string(),
            breaches: if verdict.breaches.is_empty() {
                "-".to_string()
            } else {
                verdict.breaches.iter().map(|b| b.label()).collect::<Vec<_>>().join(", ")
            },
        }
    }
}

impl DeliveryRow {
    pub fn from_result(result: &NotificationResult) -> Self {
        Self {
            recipient: if result.recipient.is_empty() { "(none)".to_string() } else { result.recipient.clone() },
            channel: result.channel.to_string(),
            status: if result.success { "sent" } else { "failed" }.to_string(),
            error: result.error.as_ref().map(|e| e.to_string()).unwrap_or_else(|| "-".to_string()),
        }
    }
}

impl OutputFormat for Verdict {
    fn to_table(&self) -> String {
        Table::new([VerdictRow::from_verdict(self)]).to_string()
    }

    fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl OutputFormat for DispatchOutcome {
    fn to_table(&self) -> String {
        match self {
            DispatchOutcome::NoAlertNeeded { verdict } => {
                format!("{}\nVitals within threshold. No alert needed.", verdict.to_table())
            }
            DispatchOutcome::Dispatched { verdict, deliveries, .. } => {
                let mut output = String::new();
                if let Some(verdict) = verdict {
                    output.push_str(&verdict.to_table());
                    output.push('\n');
                }
                if deliveries.is_empty() {
                    output.push_str("No doctors associated with this patient to receive alerts.");
                    return output;
                }
                let rows: Vec<DeliveryRow> = deliveries.iter().map(|d| DeliveryRow::from_result(&d.result)).collect();
                output.push_str(&Table::new(rows).to_string());
                output.push_str(&format!("\n{} sent, {} failed", self.sent(), self.failed()));
                output
            }
        }
    }

    fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl OutputFormat for BatchResult {
    fn to_table(&self) -> String {
        if self.results.is_empty() && self.skipped == 0 {
            return "No reminders due.".to_string();
        }

        let rows: Vec<DeliveryRow> = self.results.iter().map(DeliveryRow::from_result).collect();
        let mut output = Table::new(rows).to_string();
        output.push_str(&format!("\n{} sent, {} failed", self.sent, self.failed.len()));
        if self.skipped > 0 {
            output.push_str(&format!(", {} skipped", self.skipped));
        }
        output
    }

    fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

impl OutputFormat for [User] {
    fn to_table(&self) -> String {
        if self.is_empty() {
            return "No users registered.".to_string();
        }
        let rows: Vec<UserRow> = self
            .iter()
            .map(|user| UserRow {
                id: user.id.clone(),
                name: user.name.clone(),
                role: user.role.to_string(),
                email: user.email.clone(),
                phone: user.phone.clone().unwrap_or_else(|| "-".to_string()),
            })
            .collect();
        Table::new(rows).to_string()
    }

    fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

fn appointment_rows(appointments: &[Appointment]) -> Vec<AppointmentRow> {
    appointments
        .iter()
        .enumerate()
        .map(|(index, appointment)| AppointmentRow {
            index,
            date: appointment.date.clone(),
            doctor: format!("Dr. {} ({})", appointment.doctor.name, appointment.doctor.id),
            patient: format!("{} ({})", appointment.patient.name, appointment.patient.id),
            status: appointment.status.to_string(),
        })
        .collect()
}

impl OutputFormat for [Appointment] {
    fn to_table(&self) -> String {
        if self.is_empty() {
            return "No appointments.".to_string();
        }
        Table::new(appointment_rows(self)).to_string()
    }

    fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&appointment_rows(self))
    }
}

impl OutputFormat for [&Feedback] {
    fn to_table(&self) -> String {
        if self.is_empty() {
            return "No feedback recorded.".to_string();
        }
        let rows: Vec<FeedbackRow> = self
            .iter()
            .map(|feedback| FeedbackRow {
                recorded: feedback.recorded_at.format("%Y-%m-%d %H:%M").to_string(),
                doctor: feedback.doctor_id.clone(),
                text: feedback.text.clone(),
                prescription: feedback
                    .prescription
                    .as_ref()
                    .map(|p| format!("{} ({}), {}", p.medication, p.dosage, p.schedule))
                    .unwrap_or_else(|| "-".to_string()),
            })
            .collect();
        Table::new(rows).to_string()
    }

    fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

fn reason_label(reason: VerdictReason) -> &'static str {
    match reason {
        VerdictReason::NoData => "no data",
        VerdictReason::WithinRange => "within range",
        VerdictReason::OutOfRange => "out of range",
        VerdictReason::MalformedReading => "malformed reading",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alerts::evaluate;
    use crate::models::VitalSign;
    use crate::notify::{ChannelKind, NotificationError};

    fn failed_result() -> NotificationResult {
        NotificationResult {
            recipient: String::new(),
            channel: ChannelKind::Email,
            success: false,
            error: Some(NotificationError::InvalidRecipient { channel: "email".to_string() }),
        }
    }

    #[test]
    fn test_verdict_row_lists_breaches() {
        let verdict = evaluate(Some(&VitalSign::new(130, 98, "120/80", 38.5)));
        let row = VerdictRow::from_verdict(&verdict);
        assert_eq!(row.within_threshold, "no");
        assert_eq!(row.reason, "out of range");
        assert_eq!(row.breaches, "heart rate, temperature");
    }

    #[test]
    fn test_delivery_row_for_failure() {
        let row = DeliveryRow::from_result(&failed_result());
        assert_eq!(row.recipient, "(none)");
        assert_eq!(row.status, "failed");
        assert_eq!(row.error, "Invalid recipient for email");
    }

    #[test]
    fn test_appointment_rows_carry_index() {
        let appointment = Appointment::requested(
            "2026-11-02",
            User::doctor("D1", "House", "house@example.com"),
            User::patient("P1", "Ann", "ann@example.com"),
        );
        let appointments = vec![appointment.clone(), appointment];
        let json = appointments.to_json().unwrap();
        assert!(json.contains("\"index\": 1"));
        assert!(appointments.to_table().contains("Dr. House (D1)"));

        let none: Vec<Appointment> = Vec::new();
        assert_eq!(none.to_table(), "No appointments.");
    }

    #[test]
    fn test_empty_batch_table() {
        let batch = BatchResult { sent: 0, failed: Vec::new(), skipped: 0, results: Vec::new() };
        assert_eq!(batch.to_table(), "No reminders due.");
    }

    #[test]
    fn test_batch_json_output() {
        let batch = BatchResult { sent: 0, failed: Vec::new(), skipped: 2, results: vec![failed_result()] };
        let json = batch.to_json().unwrap();
        assert!(json.contains("\"skipped\": 2"));
        assert!(json.contains("invalid_recipient"));
    }
}
