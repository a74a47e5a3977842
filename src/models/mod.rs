// Models module
pub mod care;
pub mod people;
pub mod vitals;

pub use care::{Appointment, AppointmentStatus, Feedback, Prescription};
pub use people::{Doctor, Patient, Role, User};
pub use vitals::{BloodPressure, ValidationError, VitalSign};
