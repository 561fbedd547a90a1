//! `propkit_mail` v1:
//! report email delivery over SMTP.
//!
//! Modules:
//! - `conf`      : defaults and the attachment MIME type
//! - `spec`      : settings, delivery report and errors
//! - `util`      : recipient address, greeting name and body text
//! - `message`   : MIME message assembly
//! - `transport` : `Mailer` seam and the SMTP implementation
pub mod conf;
pub mod message;
pub mod spec;
pub mod transport;
pub mod util;

pub use conf::{C_ATTACHMENT_NAME_DEFAULT, C_MAIL_DOMAIN_DEFAULT, C_MIME_XLSX};
pub use lettre::Message;
pub use message::{build_report_message, parse_mailbox};
pub use spec::{DeliveryError, SpecDeliveryReport, SpecMailOptions, SpecSmtpConfig};
pub use transport::{Mailer, SmtpMailer, deliver_report};
pub use util::{derive_display_name, derive_mail_body, derive_recipient_address};
