use crate::models::{Appointment, AppointmentStatus, Doctor, Feedback, Prescription, Role, User};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Read-only queries the alerting core needs from whoever owns the people.
pub trait CareDirectory {
    fn find_user(&self, id: &str) -> Option<&User>;

    /// Doctors currently caring for the patient, in registration order.
    fn associated_doctors(&self, patient_id: &str) -> Vec<Doctor>;
}

/// Users, care assignments, appointments and feedback, kept as one JSON document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CareRepository {
    #[serde(default)]
    users: Vec<User>,
    /// Doctor id to the ids of the patients they look after.
    #[serde(default)]
    assignments: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    appointments: Vec<Appointment>,
    #[serde(default)]
    feedback: Vec<Feedback>,
}

impl CareRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from disk. A missing file is an empty repository.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read repository file: {}", path.display()))?;

        serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse repository file: {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create repository directory: {}", parent.display()))?;
        }

        let contents = serde_json::to_string_pretty(self).context("Failed to serialize repository")?;

        fs::write(path, contents)
            .with_context(|| format!("Failed to write repository file: {}", path.display()))
    }

    pub fn add_user(&mut self, user: User) -> Result<()> {
        if self.find_user(&user.id).is_some() {
            anyhow::bail!("User ID {} already exists", user.id);
        }
        self.users.push(user);
        Ok(())
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn find_with_role(&self, id: &str, role: Role) -> Option<&User> {
        self.find_user(id).filter(|user| user.is(role))
    }

    /// Returns false if the patient was already on the doctor's list.
    pub fn assign_patient(&mut self, doctor_id: &str, patient_id: &str) -> Result<bool> {
        let doctor = self.require(doctor_id, Role::Doctor)?.id.clone();
        let patient = self.require(patient_id, Role::Patient)?.id.clone();

        let patients = self.assignments.entry(doctor).or_default();
        if patients.contains(&patient) {
            return Ok(false);
        }
        patients.push(patient);
        Ok(true)
    }

    pub fn request_appointment(&mut self, date: &str, doctor_id: &str, patient_id: &str) -> Result<usize> {
        let doctor = self.require(doctor_id, Role::Doctor)?.clone();
        let patient = self.require(patient_id, Role::Patient)?.clone();

        self.appointments.push(Appointment::requested(date, doctor, patient));
        Ok(self.appointments.len() - 1)
    }

    pub fn set_appointment_status(&mut self, index: usize, status: AppointmentStatus) -> Result<()> {
        let appointment = self
            .appointments
            .get_mut(index)
            .with_context(|| format!("Invalid appointment index: {}", index))?;
        appointment.status = status;
        Ok(())
    }

    pub fn appointments(&self) -> &[Appointment] {
        &self.appointments
    }

    /// Record doctor feedback, optionally prescribing a medication.
    pub fn add_feedback(
        &mut self,
        doctor_id: &str,
        patient_id: &str,
        text: &str,
        prescription: Option<(&str, &str, &str)>,
    ) -> Result<()> {
        let doctor = self.require(doctor_id, Role::Doctor)?.id.clone();
        let patient = self.require(patient_id, Role::Patient)?.clone();

        let prescription = prescription.map(|(medication, dosage, schedule)| Prescription {
            medication: medication.to_string(),
            dosage: dosage.to_string(),
            schedule: schedule.to_string(),
            patient: patient.clone(),
        });

        self.feedback.push(Feedback {
            doctor_id: doctor,
            patient_id: patient.id,
            text: text.to_string(),
            prescription,
            recorded_at: chrono::Utc::now(),
        });
        Ok(())
    }

    pub fn feedback_for(&self, patient_id: &str) -> Vec<&Feedback> {
        self.feedback
            .iter()
            .filter(|f| f.patient_id.eq_ignore_ascii_case(patient_id))
            .collect()
    }

    /// Every prescription attached to a feedback record.
    pub fn prescriptions(&self) -> Vec<Prescription> {
        self.feedback.iter().filter_map(|f| f.prescription.clone()).collect()
    }

    fn require(&self, id: &str, role: Role) -> Result<&User> {
        self.find_with_role(id, role)
            .with_context(|| format!("{} not found: {}", role, id))
    }
}

impl CareDirectory for CareRepository {
    fn find_user(&self, id: &str) -> Option<&User> {
        self.users.iter().find(|user| user.id.eq_ignore_ascii_case(id))
    }

    fn associated_doctors(&self, patient_id: &str) -> Vec<Doctor> {
        self.users
            .iter()
            .filter(|user| user.is(Role::Doctor))
            .filter(|doctor| {
                self.assignments
                    .get(&doctor.id)
                    .is_some_and(|patients| patients.iter().any(|p| p.eq_ignore_ascii_case(patient_id)))
            })
            .cloned()
            .collect()
    }
}
