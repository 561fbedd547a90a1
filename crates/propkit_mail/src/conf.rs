//! Delivery defaults.

/// Default SMTP relay host.
pub const C_SMTP_HOST_DEFAULT: &str = "smtp.gmail.com";
/// Default SMTP submission port (STARTTLS).
pub const N_SMTP_PORT_DEFAULT: u16 = 587;
/// Default sender display name.
pub const C_SENDER_NAME_DEFAULT: &str = "Spydarr Package Reporter";
/// Default socket timeout in seconds.
pub const N_SMTP_TIMEOUT_SECS_DEFAULT: u64 = 30;

/// Organizational domain appended to bare recipient identifiers.
pub const C_MAIL_DOMAIN_DEFAULT: &str = "beyondwalls.com";
pub const C_MAIL_SUBJECT_DEFAULT: &str = "Property Package Report";
pub const C_MAIL_SIGNATURE_DEFAULT: &str = "Atharva Joshi";
pub const C_ATTACHMENT_NAME_DEFAULT: &str = "Updated_Package_Report.xlsx";

/// MIME type of `.xlsx` attachments.
pub const C_MIME_XLSX: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
