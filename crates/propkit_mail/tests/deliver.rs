use std::cell::RefCell;

use lettre::Message;
use propkit_mail::{
    DeliveryError, Mailer, SpecMailOptions, SpecSmtpConfig, deliver_report,
};

#[derive(Default)]
struct RecordingMailer {
    l_sent: RefCell<Vec<String>>,
    if_fail: bool,
}

impl Mailer for RecordingMailer {
    fn send(&self, message: &Message) -> Result<(), DeliveryError> {
        if self.if_fail {
            return Err(DeliveryError::Transport("connection refused".to_string()));
        }
        self.l_sent
            .borrow_mut()
            .push(String::from_utf8_lossy(&message.formatted()).to_string());
        Ok(())
    }
}

fn derive_smtp_sample() -> SpecSmtpConfig {
    SpecSmtpConfig {
        username: Some("reports@example.com".to_string()),
        password: Some("secret".to_string()),
        ..Default::default()
    }
}

#[test]
fn delivers_to_domain_address_with_greeting() {
    let mailer = RecordingMailer::default();
    let report = deliver_report(
        &mailer,
        &derive_smtp_sample(),
        &SpecMailOptions::default(),
        "  Firstname.Lastname ",
        b"xlsx-bytes",
    )
    .unwrap();

    assert_eq!(report.recipient, "firstname.lastname@beyondwalls.com");
    assert_eq!(report.display_name, "Firstname Lastname");
    assert_eq!(report.n_bytes_attachment, 10);

    let l_sent = mailer.l_sent.borrow();
    assert_eq!(l_sent.len(), 1);
    assert!(l_sent[0].contains("To: firstname.lastname@beyondwalls.com"));
    assert!(l_sent[0].contains("Dear Firstname Lastname,"));
}

#[test]
fn invalid_identifier_sends_nothing() {
    let mailer = RecordingMailer::default();
    let err = deliver_report(
        &mailer,
        &derive_smtp_sample(),
        &SpecMailOptions::default(),
        "someone@elsewhere.com",
        b"",
    )
    .unwrap_err();
    assert!(matches!(err, DeliveryError::InvalidRecipient { .. }));
    assert!(mailer.l_sent.borrow().is_empty());
}

#[test]
fn transport_failure_surfaces_as_error() {
    let mailer = RecordingMailer {
        if_fail: true,
        ..Default::default()
    };
    let err = deliver_report(
        &mailer,
        &derive_smtp_sample(),
        &SpecMailOptions::default(),
        "ops",
        b"",
    )
    .unwrap_err();
    assert_eq!(err.to_string(), "SMTP delivery failed: connection refused");
}
