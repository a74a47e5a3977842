use crate::models::VitalSign;
use serde::Serialize;

/// Inclusive normal ranges for each vital sign.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThresholdPolicy {
    pub heart_rate: (i32, i32),
    pub min_oxygen_level: i32,
    pub systolic: (f64, f64),
    pub diastolic: (f64, f64),
    pub temperature: (f64, f64), // °C
}

pub const THRESHOLD_POLICY: ThresholdPolicy = ThresholdPolicy {
    heart_rate: (60, 100),
    min_oxygen_level: 95,
    systolic: (90.0, 140.0),
    diastolic: (60.0, 90.0),
    temperature: (36.1, 37.2),
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictReason {
    /// No reading was supplied; absence of data is not abnormal.
    NoData,
    WithinRange,
    OutOfRange,
    MalformedReading,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VitalCheck {
    HeartRate,
    OxygenLevel,
    BloodPressure,
    Temperature,
}

impl VitalCheck {
    pub fn label(&self) -> &'static str {
        match self {
            VitalCheck::HeartRate => "heart rate",
            VitalCheck::OxygenLevel => "oxygen level",
            VitalCheck::BloodPressure => "blood pressure",
            VitalCheck::Temperature => "temperature",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Verdict {
    pub within_threshold: bool,
    pub reason: VerdictReason,
    /// Checks that fell outside the policy. Empty unless `reason` is `OutOfRange`.
    pub breaches: Vec<VitalCheck>,
}

impl Verdict {
    fn ok(reason: VerdictReason) -> Self {
        Self {
            within_threshold: true,
            reason,
            breaches: Vec::new(),
        }
    }

    pub fn is_breach(&self) -> bool {
        !self.within_threshold
    }
}

/// Decide whether a reading is within the process-wide threshold policy.
pub fn evaluate(vital: Option<&VitalSign>) -> Verdict {
    evaluate_with(&THRESHOLD_POLICY, vital)
}

pub fn evaluate_with(policy: &ThresholdPolicy, vital: Option<&VitalSign>) -> Verdict {
    let Some(vital) = vital else {
        return Verdict::ok(VerdictReason::NoData);
    };

    let bp = match vital.parsed_blood_pressure() {
        Ok(bp) => bp,
        Err(_) => {
            return Verdict {
                within_threshold: false,
                reason: VerdictReason::MalformedReading,
                breaches: Vec::new(),
            };
        }
    };

    let heart_rate_ok = in_range(vital.heart_rate(), policy.heart_rate);
    let oxygen_ok = vital.oxygen_level() >= policy.min_oxygen_level;
    let bp_ok = in_range(bp.systolic, policy.systolic) && in_range(bp.diastolic, policy.diastolic);
    let temperature_ok = in_range(vital.temperature(), policy.temperature);

    let breaches: Vec<VitalCheck> = [
        (VitalCheck::HeartRate, heart_rate_ok),
        (VitalCheck::OxygenLevel, oxygen_ok),
        (VitalCheck::BloodPressure, bp_ok),
        (VitalCheck::Temperature, temperature_ok),
    ]
    .into_iter()
    .filter(|(_, ok)| !ok)
    .map(|(check, _)| check)
    .collect();

    if breaches.is_empty() {
        Verdict::ok(VerdictReason::WithinRange)
    } else {
        Verdict {
            within_threshold: false,
            reason: VerdictReason::OutOfRange,
            breaches,
        }
    }
}

fn in_range<T: PartialOrd>(value: T, (low, high): (T, T)) -> bool {
    value >= low && value <= high
}
