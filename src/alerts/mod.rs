pub mod dispatcher;
pub mod events;
pub mod thresholds;

pub use dispatcher::{AlertDelivery, AlertDispatcher, AlertTrigger, DispatchError, DispatchOutcome};
pub use events::{AlertEvent, TriggerKind, parse_alert_message};
pub use thresholds::{THRESHOLD_POLICY, ThresholdPolicy, Verdict, VerdictReason, VitalCheck, evaluate};
