use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Invalid blood pressure format '{0}'. Please use 'systolic/diastolic'")]
    MalformedBloodPressure(String),

    #[error("Invalid {field} value '{value}'. Please enter a number")]
    InvalidNumber { field: &'static str, value: String },
}

/// A single vital-sign reading as submitted by a patient.
///
/// The blood pressure is kept as the raw string the patient entered so that a
/// malformed reading can still be carried to the evaluator and reported as such.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VitalSign {
    heart_rate: i32,
    oxygen_level: i32,
    blood_pressure: String,
    temperature: f64,
}

impl VitalSign {
    pub fn new(heart_rate: i32, oxygen_level: i32, blood_pressure: impl Into<String>, temperature: f64) -> Self {
        Self {
            heart_rate,
            oxygen_level,
            blood_pressure: blood_pressure.into(),
            temperature,
        }
    }

    /// Build a reading from raw text input. The numeric fields must parse; the
    /// blood pressure is kept as entered so the evaluator can report it.
    pub fn from_input(heart_rate: &str, oxygen_level: &str, blood_pressure: &str, temperature: &str) -> Result<Self, ValidationError> {
        let heart_rate = parse_number::<i32>("heart rate", heart_rate)?;
        let oxygen_level = parse_number::<i32>("oxygen level", oxygen_level)?;
        let temperature = parse_number::<f64>("temperature", temperature)?;

        Ok(Self::new(heart_rate, oxygen_level, blood_pressure.trim(), temperature))
    }

    /// Like `from_input`, but a malformed blood pressure is rejected too.
    pub fn validated(heart_rate: &str, oxygen_level: &str, blood_pressure: &str, temperature: &str) -> Result<Self, ValidationError> {
        let vital = Self::from_input(heart_rate, oxygen_level, blood_pressure, temperature)?;
        vital.parsed_blood_pressure()?;
        Ok(vital)
    }

    pub fn heart_rate(&self) -> i32 {
        self.heart_rate
    }

    pub fn oxygen_level(&self) -> i32 {
        self.oxygen_level
    }

    pub fn blood_pressure(&self) -> &str {
        &self.blood_pressure
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn parsed_blood_pressure(&self) -> Result<BloodPressure, ValidationError> {
        BloodPressure::parse(&self.blood_pressure)
    }
}

impl fmt::Display for VitalSign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Heart Rate: {} bpm, Oxygen Level: {}%, Blood Pressure: {}, Temperature: {:?} °C",
            self.heart_rate, self.oxygen_level, self.blood_pressure, self.temperature
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BloodPressure {
    pub systolic: f64,
    pub diastolic: f64,
}

impl BloodPressure {
    /// Parse "systolic/diastolic". Exactly two tokens, each a real number.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let parts: Vec<&str> = raw.split('/').collect();
        if parts.len() != 2 {
            return Err(ValidationError::MalformedBloodPressure(raw.to_string()));
        }

        let parse_part = |part: &str| {
            part.trim()
                .parse::<f64>()
                .map_err(|_| ValidationError::MalformedBloodPressure(raw.to_string()))
        };

        Ok(Self {
            systolic: parse_part(parts[0])?,
            diastolic: parse_part(parts[1])?,
        })
    }
}

fn parse_number<T: std::str::FromStr>(field: &'static str, value: &str) -> Result<T, ValidationError> {
    value.trim().parse::<T>().map_err(|_| ValidationError::InvalidNumber {
        field,
        value: value.to_string(),
    })
}
