//! MIME assembly of the report email.

use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};
use lettre::{Address, Message};

use crate::conf::C_MIME_XLSX;
use crate::spec::{DeliveryError, SpecMailOptions, SpecSmtpConfig};
use crate::util::derive_mail_body;

/// Parse `address` into a mailbox with an optional display name.
pub fn parse_mailbox(name: Option<&str>, address: &str) -> Result<Mailbox, DeliveryError> {
    let addr: Address = address
        .trim()
        .parse()
        .map_err(|err: lettre::address::AddressError| DeliveryError::InvalidAddress {
            address: address.to_string(),
            message: err.to_string(),
        })?;
    Ok(Mailbox::new(name.map(str::to_string), addr))
}

/// Build the report email: plain-text greeting plus the workbook attachment.
pub fn build_report_message(
    smtp: &SpecSmtpConfig,
    options: &SpecMailOptions,
    recipient: &str,
    display_name: &str,
    attachment: &[u8],
) -> Result<Message, DeliveryError> {
    let c_sender = smtp
        .sender_address()
        .ok_or(DeliveryError::MissingSetting("smtp.sender_email"))?;
    let mailbox_from = parse_mailbox(Some(&smtp.sender_name), c_sender)?;
    let mailbox_to = parse_mailbox(None, recipient)?;

    let content_type = ContentType::parse(C_MIME_XLSX)
        .map_err(|err| DeliveryError::Message(err.to_string()))?;
    let part_attachment =
        Attachment::new(options.attachment_name.clone()).body(attachment.to_vec(), content_type);
    let part_body = SinglePart::plain(derive_mail_body(display_name, &options.signature));

    Message::builder()
        .from(mailbox_from)
        .to(mailbox_to)
        .subject(options.subject.as_str())
        .multipart(
            MultiPart::mixed()
                .singlepart(part_body)
                .singlepart(part_attachment),
        )
        .map_err(|err| DeliveryError::Message(err.to_string()))
}
