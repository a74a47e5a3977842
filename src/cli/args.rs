use crate::models::{Role, ValidationError, VitalSign};
use crate::notify::ChannelKind;
use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "rpmon")]
#[command(about = "Remote patient monitoring: vital-sign alerts and reminders")]
#[command(version)]
pub struct Cli {
    /// Custom config file path
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Override the care repository file
    #[arg(long, global = true)]
    pub data: Option<String>,

    /// Override the notification channel
    #[arg(long, global = true, value_enum)]
    pub channel: Option<ChannelKind>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// JSON output format
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// A vital-sign reading as typed by the patient.
#[derive(Args, Debug, Clone)]
pub struct VitalArgs {
    /// Heart rate (bpm)
    #[arg(long = "heart-rate", allow_hyphen_values = true)]
    pub heart_rate: String,

    /// Oxygen saturation (%)
    #[arg(long, allow_hyphen_values = true)]
    pub oxygen: String,

    /// Blood pressure as systolic/diastolic, e.g. 120/80
    #[arg(long)]
    pub bp: String,

    /// Body temperature (°C)
    #[arg(long, allow_hyphen_values = true)]
    pub temp: String,

    /// Reject a malformed blood pressure instead of reporting it as abnormal
    #[arg(long)]
    pub strict: bool,
}

impl VitalArgs {
    pub fn to_vital_sign(&self) -> Result<VitalSign, ValidationError> {
        if self.strict {
            VitalSign::validated(&self.heart_rate, &self.oxygen, &self.bp, &self.temp)
        } else {
            VitalSign::from_input(&self.heart_rate, &self.oxygen, &self.bp, &self.temp)
        }
    }
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,
    /// Initialize fresh configuration
    Init,
    /// Set configuration value
    Set {
        /// Configuration key (e.g., dispatch.send_timeout_secs)
        key: String,
        /// Configuration value
        value: String,
    },
}

#[derive(Subcommand)]
pub enum UserAction {
    /// Register a patient, doctor or administrator
    Add {
        #[arg(long)]
        id: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long, value_enum)]
        role: Role,
        /// Phone number used by the SMS channel
        #[arg(long)]
        phone: Option<String>,
    },
    /// List registered users
    List,
}

#[derive(Subcommand)]
pub enum AppointmentAction {
    /// Request an appointment with a doctor
    Request {
        #[arg(long)]
        date: String,
        #[arg(long)]
        doctor: String,
        #[arg(long)]
        patient: String,
    },
    /// Approve a requested appointment (index from `appointment list`)
    Approve { index: usize },
    /// Cancel an appointment (index from `appointment list`)
    Cancel { index: usize },
    /// List appointments
    List,
}

#[derive(Subcommand)]
pub enum FeedbackAction {
    /// Record doctor feedback, optionally with a prescription
    Add {
        #[arg(long)]
        doctor: String,
        #[arg(long)]
        patient: String,
        #[arg(long)]
        text: String,
        #[arg(long, requires_all = ["dosage", "schedule"])]
        medication: Option<String>,
        #[arg(long, requires = "medication")]
        dosage: Option<String>,
        #[arg(long, requires = "medication")]
        schedule: Option<String>,
    },
    /// Show feedback recorded for a patient
    List {
        #[arg(long)]
        patient: String,
    },
}

#[derive(Subcommand)]
pub enum Commands {
    /// Evaluate a reading against the vital-sign thresholds without alerting anyone
    Evaluate {
        #[command(flatten)]
        vitals: VitalArgs,
    },

    /// Evaluate a patient's reading and alert their doctors if it is abnormal
    Check {
        /// Patient ID
        #[arg(long)]
        patient: String,

        #[command(flatten)]
        vitals: VitalArgs,
    },

    /// Send an emergency alert for a patient
    Panic {
        /// Patient ID
        #[arg(long)]
        patient: String,

        /// Only alert this doctor (default: every associated doctor)
        #[arg(long)]
        doctor: Option<String>,
    },

    /// Send reminders for approved appointments and prescribed medication
    Remind,

    /// Manage users in the care repository
    User {
        #[command(subcommand)]
        action: UserAction,
    },

    /// Put a patient under a doctor's care
    Assign {
        #[arg(long)]
        doctor: String,
        #[arg(long)]
        patient: String,
    },

    /// Manage appointments
    Appointment {
        #[command(subcommand)]
        action: AppointmentAction,
    },

    /// Record or show doctor feedback
    Feedback {
        #[command(subcommand)]
        action: FeedbackAction,
    },

    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}
