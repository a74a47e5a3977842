use crate::models::{Patient, VitalSign};
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerKind {
    ThresholdBreach,
    ManualPanic,
}

/// An alert ready to be fanned out. Built once per dispatch, never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertEvent {
    pub id: Uuid,
    pub patient_id: String,
    pub vital: Option<VitalSign>,
    pub message: String,
    pub kind: TriggerKind,
    pub raised_at: DateTime<Utc>,
}

impl AlertEvent {
    pub fn threshold_breach(patient: &Patient, vital: &VitalSign) -> Self {
        Self {
            id: Uuid::new_v4(),
            patient_id: patient.id.clone(),
            vital: Some(vital.clone()),
            message: breach_message(&patient.id, vital),
            kind: TriggerKind::ThresholdBreach,
            raised_at: Utc::now(),
        }
    }

    pub fn manual_panic(patient: &Patient) -> Self {
        Self {
            id: Uuid::new_v4(),
            patient_id: patient.id.clone(),
            vital: None,
            message: panic_message(&patient.id),
            kind: TriggerKind::ManualPanic,
            raised_at: Utc::now(),
        }
    }
}

pub fn breach_message(patient_id: &str, vital: &VitalSign) -> String {
    format!(
        "Alert! Patient {}'s vital signs are abnormal: HR={}, O2={}, BP={}, Temp={:?}",
        patient_id,
        vital.heart_rate(),
        vital.oxygen_level(),
        vital.blood_pressure(),
        vital.temperature()
    )
}

pub fn panic_message(patient_id: &str) -> String {
    format!("Emergency! Patient {} needs immediate attention.", patient_id)
}

fn breach_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?s)^Alert! Patient (.+)'s vital signs are abnormal: HR=(-?\d+), O2=(-?\d+), BP=(.*), Temp=(\S+)$")
            .expect("breach message pattern is valid")
    })
}

/// Recover the patient id and the raw readings from a rendered breach message.
pub fn parse_alert_message(message: &str) -> Option<(String, VitalSign)> {
    let caps = breach_pattern().captures(message)?;
    let heart_rate = caps[2].parse().ok()?;
    let oxygen_level = caps[3].parse().ok()?;
    let temperature = caps[5].parse().ok()?;

    Some((
        caps[1].to_string(),
        VitalSign::new(heart_rate, oxygen_level, &caps[4], temperature),
    ))
}
