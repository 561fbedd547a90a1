//! Pure helpers: recipient address, greeting name and body text.

use crate::spec::DeliveryError;

/// Turn a recipient identifier into a full address.
///
/// The identifier is trimmed, lowercased and suffixed with `@{domain}`.
/// Empty identifiers and identifiers containing `@` or inner whitespace are
/// rejected.
pub fn derive_recipient_address(identifier: &str, domain: &str) -> Result<String, DeliveryError> {
    let c_trimmed = identifier.trim();
    let reject = |reason: &'static str| DeliveryError::InvalidRecipient {
        identifier: identifier.to_string(),
        reason,
    };
    if c_trimmed.is_empty() {
        return Err(reject("empty identifier"));
    }
    if c_trimmed.contains('@') {
        return Err(reject("must not contain '@'"));
    }
    if c_trimmed.chars().any(char::is_whitespace) {
        return Err(reject("contains whitespace"));
    }
    Ok(format!("{}@{}", c_trimmed.to_lowercase(), domain.trim()))
}

/// Greeting name from an address: local part, `.`/`_` as spaces, title-cased.
///
/// `"firstname.lastname@x.com" -> "Firstname Lastname"`.
pub fn derive_display_name(address: &str) -> String {
    let c_local = address.split('@').next().unwrap_or_default();
    let c_spaced: String = c_local
        .chars()
        .map(|ch| if ch == '.' || ch == '_' { ' ' } else { ch })
        .collect();
    derive_title_case(&c_spaced)
}

/// Upper-case the first letter of every alphabetic run, lower-case the rest.
pub fn derive_title_case(text: &str) -> String {
    let mut c_out = String::with_capacity(text.len());
    let mut if_prev_alpha = false;
    for ch in text.chars() {
        if ch.is_alphabetic() {
            if if_prev_alpha {
                c_out.extend(ch.to_lowercase());
            } else {
                c_out.extend(ch.to_uppercase());
            }
            if_prev_alpha = true;
        } else {
            c_out.push(ch);
            if_prev_alpha = false;
        }
    }
    c_out
}

/// Plain-text body of the report email.
pub fn derive_mail_body(display_name: &str, signature: &str) -> String {
    format!(
        "Dear {display_name},\n\nPlease find the attached updated Report with Package calculations.\n\nRegards,\n{signature}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recipient_is_trimmed_lowercased_and_suffixed() {
        assert_eq!(
            derive_recipient_address("  John.Doe ", "beyondwalls.com").unwrap(),
            "john.doe@beyondwalls.com"
        );
        assert_eq!(
            derive_recipient_address("ops_team", "example.org").unwrap(),
            "ops_team@example.org"
        );
    }

    #[test]
    fn malformed_recipients_are_rejected() {
        for c_bad in ["", "   ", "john@doe", "john doe", "a\tb"] {
            let err = derive_recipient_address(c_bad, "beyondwalls.com").unwrap_err();
            assert!(
                matches!(err, DeliveryError::InvalidRecipient { .. }),
                "{c_bad:?} should be rejected"
            );
        }
    }

    #[test]
    fn display_name_from_local_part() {
        assert_eq!(
            derive_display_name("firstname.lastname@x.com"),
            "Firstname Lastname"
        );
        assert_eq!(derive_display_name("JANE_DOE@x.com"), "Jane Doe");
        assert_eq!(derive_display_name("ops"), "Ops");
    }

    #[test]
    fn title_case_restarts_after_non_letters() {
        assert_eq!(derive_title_case("o'neil"), "O'Neil");
        assert_eq!(derive_title_case("r2d2 unit"), "R2D2 Unit");
        assert_eq!(derive_title_case(""), "");
    }

    #[test]
    fn body_has_greeting_and_signature() {
        assert_eq!(
            derive_mail_body("John Doe", "Atharva Joshi"),
            "Dear John Doe,\n\nPlease find the attached updated Report with Package calculations.\n\nRegards,\nAtharva Joshi"
        );
    }
}
