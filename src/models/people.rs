use crate::notify::ChannelKind;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Patient,
    Doctor,
    Administrator,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Role::Patient => "Patient",
            Role::Doctor => "Doctor",
            Role::Administrator => "Administrator",
        };
        f.write_str(name)
    }
}

/// Identity of anyone known to the system. Only the role differs between
/// patients, doctors and administrators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub role: Role,
}

/// A `User` expected to hold the patient role.
pub type Patient = User;
/// A `User` expected to hold the doctor role.
pub type Doctor = User;

impl User {
    pub fn new(id: impl Into<String>, name: impl Into<String>, email: impl Into<String>, role: Role) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            email: email.into(),
            phone: None,
            role,
        }
    }

    pub fn patient(id: impl Into<String>, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self::new(id, name, email, Role::Patient)
    }

    pub fn doctor(id: impl Into<String>, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self::new(id, name, email, Role::Doctor)
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn is(&self, role: Role) -> bool {
        self.role == role
    }

    /// Where this user is reached on the given channel. Empty when unknown.
    pub fn address_for(&self, channel: ChannelKind) -> &str {
        match channel {
            ChannelKind::Email => &self.email,
            ChannelKind::Sms => self.phone.as_deref().unwrap_or_default(),
        }
    }
}
