use crate::models::people::{Doctor, Patient};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AppointmentStatus {
    Requested,
    Approved,
    Cancelled,
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AppointmentStatus::Requested => "Requested",
            AppointmentStatus::Approved => "Approved",
            AppointmentStatus::Cancelled => "Cancelled",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Appointment {
    pub date: String,
    pub doctor: Doctor,
    pub patient: Patient,
    pub status: AppointmentStatus,
}

impl Appointment {
    pub fn requested(date: impl Into<String>, doctor: Doctor, patient: Patient) -> Self {
        Self {
            date: date.into(),
            doctor,
            patient,
            status: AppointmentStatus::Requested,
        }
    }

    pub fn is_approved(&self) -> bool {
        self.status == AppointmentStatus::Approved
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prescription {
    pub medication: String,
    pub dosage: String,
    pub schedule: String,
    pub patient: Patient,
}

/// Doctor feedback recorded in a patient's history. Prescriptions only ever
/// exist attached to one of these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    pub doctor_id: String,
    pub patient_id: String,
    pub text: String,
    pub prescription: Option<Prescription>,
    pub recorded_at: DateTime<Utc>,
}
