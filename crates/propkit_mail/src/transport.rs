//! Delivery seam: the [`Mailer`] trait, its SMTP implementation and the
//! one-call report delivery.

use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use tracing::{debug, info};

use crate::message::build_report_message;
use crate::spec::{DeliveryError, SpecDeliveryReport, SpecMailOptions, SpecSmtpConfig};
use crate::util::{derive_display_name, derive_recipient_address};

/// Sends one assembled message.
pub trait Mailer {
    fn send(&self, message: &Message) -> Result<(), DeliveryError>;
}

/// Blocking SMTP submission over STARTTLS with login credentials.
pub struct SmtpMailer {
    transport: SmtpTransport,
}

impl SmtpMailer {
    /// Build the transport. Username and password must be present.
    pub fn from_config(smtp: &SpecSmtpConfig) -> Result<Self, DeliveryError> {
        let username = derive_required_setting(&smtp.username, "smtp.username")?;
        let password = derive_required_setting(&smtp.password, "smtp.password")?;

        let transport = SmtpTransport::starttls_relay(&smtp.host)
            .map_err(|err| DeliveryError::Transport(err.to_string()))?
            .port(smtp.port)
            .credentials(Credentials::new(username, password))
            .timeout(Some(smtp.timeout()))
            .build();
        debug!(host = %smtp.host, port = smtp.port, "smtp transport ready");
        Ok(Self { transport })
    }
}

impl Mailer for SmtpMailer {
    fn send(&self, message: &Message) -> Result<(), DeliveryError> {
        Transport::send(&self.transport, message)
            .map(|_| ())
            .map_err(|err| DeliveryError::Transport(err.to_string()))
    }
}

/// Email `attachment` to the person named by `identifier`.
///
/// Nothing is sent when the identifier, sender or message is invalid.
pub fn deliver_report<M: Mailer + ?Sized>(
    mailer: &M,
    smtp: &SpecSmtpConfig,
    options: &SpecMailOptions,
    identifier: &str,
    attachment: &[u8],
) -> Result<SpecDeliveryReport, DeliveryError> {
    let c_recipient = derive_recipient_address(identifier, &options.domain)?;
    let c_display_name = derive_display_name(&c_recipient);
    let message = build_report_message(smtp, options, &c_recipient, &c_display_name, attachment)?;

    mailer.send(&message)?;
    info!(recipient = %c_recipient, n_bytes = attachment.len(), "report emailed");

    Ok(SpecDeliveryReport {
        recipient: c_recipient,
        display_name: c_display_name,
        attachment_name: options.attachment_name.clone(),
        n_bytes_attachment: attachment.len(),
    })
}

fn derive_required_setting(
    value: &Option<String>,
    key: &'static str,
) -> Result<String, DeliveryError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|c_value| !c_value.is_empty())
        .map(str::to_string)
        .ok_or(DeliveryError::MissingSetting(key))
}
