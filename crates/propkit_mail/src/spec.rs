//! Delivery settings, reports and errors.

use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

use crate::conf::{
    C_ATTACHMENT_NAME_DEFAULT, C_MAIL_DOMAIN_DEFAULT, C_MAIL_SIGNATURE_DEFAULT,
    C_MAIL_SUBJECT_DEFAULT, C_SENDER_NAME_DEFAULT, C_SMTP_HOST_DEFAULT, N_SMTP_PORT_DEFAULT,
    N_SMTP_TIMEOUT_SECS_DEFAULT,
};

////////////////////////////////////////////////////////////////////////////////
// #region Settings

/// SMTP relay and sender identity.
///
/// Credentials are never defaulted; they come from the config file or the
/// environment.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SpecSmtpConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Sender address; falls back to `username` when unset.
    pub sender_email: Option<String>,
    pub sender_name: String,
    pub timeout_secs: u64,
}

impl Default for SpecSmtpConfig {
    fn default() -> Self {
        Self {
            host: C_SMTP_HOST_DEFAULT.to_string(),
            port: N_SMTP_PORT_DEFAULT,
            username: None,
            password: None,
            sender_email: None,
            sender_name: C_SENDER_NAME_DEFAULT.to_string(),
            timeout_secs: N_SMTP_TIMEOUT_SECS_DEFAULT,
        }
    }
}

impl SpecSmtpConfig {
    /// Socket timeout applied to the transport.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Effective sender address.
    pub fn sender_address(&self) -> Option<&str> {
        self.sender_email
            .as_deref()
            .or(self.username.as_deref())
            .filter(|c_addr| !c_addr.trim().is_empty())
    }
}

/// Message content settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SpecMailOptions {
    /// Domain appended to recipient identifiers.
    pub domain: String,
    pub subject: String,
    /// Name signed under the body.
    pub signature: String,
    /// Filename of the attached workbook.
    pub attachment_name: String,
}

impl Default for SpecMailOptions {
    fn default() -> Self {
        Self {
            domain: C_MAIL_DOMAIN_DEFAULT.to_string(),
            subject: C_MAIL_SUBJECT_DEFAULT.to_string(),
            signature: C_MAIL_SIGNATURE_DEFAULT.to_string(),
            attachment_name: C_ATTACHMENT_NAME_DEFAULT.to_string(),
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Report

/// Outcome of one successful delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecDeliveryReport {
    /// Full destination address.
    pub recipient: String,
    /// Greeting name used in the body.
    pub display_name: String,
    pub attachment_name: String,
    pub n_bytes_attachment: usize,
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Errors

/// Failures of address derivation, message assembly or transport.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// Recipient identifier cannot become an address.
    #[error("invalid recipient '{identifier}': {reason}")]
    InvalidRecipient {
        identifier: String,
        reason: &'static str,
    },
    /// Sender or recipient address failed to parse.
    #[error("invalid address '{address}': {message}")]
    InvalidAddress { address: String, message: String },
    /// A required SMTP setting is absent.
    #[error("missing SMTP setting: {0}")]
    MissingSetting(&'static str),
    /// Message assembly failed.
    #[error("failed to build message: {0}")]
    Message(String),
    /// Relay connection, authentication or submission failed.
    #[error("SMTP delivery failed: {0}")]
    Transport(String),
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
