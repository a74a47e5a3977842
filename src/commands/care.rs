use crate::cli::{AppointmentAction, FeedbackAction, UserAction};
use crate::commands::config::report_success;
use crate::models::{AppointmentStatus, User};
use crate::output::OutputFormat;
use crate::storage::CareRepository;
use anyhow::Result;
use std::path::Path;

pub fn handle_user_action(action: UserAction, repository_path: &Path, json_output: bool) -> Result<()> {
    let mut repository = CareRepository::open(repository_path)?;

    match action {
        UserAction::Add { id, name, email, role, phone } => {
            let mut user = User::new(id, name, email, role);
            if let Some(phone) = phone {
                user = user.with_phone(phone);
            }
            let message = format!("Registered {} {}", user.role, user.id);

            repository.add_user(user)?;
            repository.save(repository_path)?;
            report_success(json_output, &message);
        }
        UserAction::List => print_listing(repository.users(), json_output)?,
    }
    Ok(())
}

pub fn handle_assign_command(doctor_id: &str, patient_id: &str, repository_path: &Path, json_output: bool) -> Result<()> {
    let mut repository = CareRepository::open(repository_path)?;

    if repository.assign_patient(doctor_id, patient_id)? {
        repository.save(repository_path)?;
        tracing::info!(doctor_id, patient_id, "Patient assigned");
        report_success(json_output, &format!("Patient {} assigned to doctor {}", patient_id, doctor_id));
    } else {
        report_success(json_output, &format!("Patient {} is already under doctor {}", patient_id, doctor_id));
    }
    Ok(())
}

pub fn handle_appointment_action(action: AppointmentAction, repository_path: &Path, json_output: bool) -> Result<()> {
    let mut repository = CareRepository::open(repository_path)?;

    let message = match action {
        AppointmentAction::Request { date, doctor, patient } => {
            let index = repository.request_appointment(&date, &doctor, &patient)?;
            format!("Appointment #{} requested with doctor {} on {}", index, doctor, date)
        }
        AppointmentAction::Approve { index } => {
            repository.set_appointment_status(index, AppointmentStatus::Approved)?;
            format!("Appointment #{} approved", index)
        }
        AppointmentAction::Cancel { index } => {
            repository.set_appointment_status(index, AppointmentStatus::Cancelled)?;
            format!("Appointment #{} cancelled", index)
        }
        AppointmentAction::List => return print_listing(repository.appointments(), json_output),
    };

    repository.save(repository_path)?;
    report_success(json_output, &message);
    Ok(())
}

pub fn handle_feedback_action(action: FeedbackAction, repository_path: &Path, json_output: bool) -> Result<()> {
    let mut repository = CareRepository::open(repository_path)?;

    match action {
        FeedbackAction::Add { doctor, patient, text, medication, dosage, schedule } => {
            let prescription = match (&medication, &dosage, &schedule) {
                (Some(medication), Some(dosage), Some(schedule)) => {
                    Some((medication.as_str(), dosage.as_str(), schedule.as_str()))
                }
                _ => None,
            };

            repository.add_feedback(&doctor, &patient, &text, prescription)?;
            repository.save(repository_path)?;
            report_success(json_output, &format!("Feedback recorded for patient {}", patient));
        }
        FeedbackAction::List { patient } => {
            let feedback = repository.feedback_for(&patient);
            print_listing(feedback.as_slice(), json_output)?;
        }
    }
    Ok(())
}

fn print_listing<T: OutputFormat + ?Sized>(items: &T, json_output: bool) -> Result<()> {
    if json_output {
        println!("{}", items.to_json()?);
    } else {
        println!("{}", items.to_table());
    }
    Ok(())
}
