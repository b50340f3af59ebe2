//! Input normalization and `validator` helpers shared by the workflows.

use std::borrow::Cow;

use validator::{ValidationError, ValidationErrors, ValidationErrorsKind};

/// Canonical form of an email used for every lookup.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Phone numbers are 7 to 15 ASCII digits.
pub fn validate_phone(phone: &str) -> Result<(), ValidationError> {
    if (7..=15).contains(&phone.len()) && phone.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(ValidationError::new("phone")
            .with_message(Cow::Borrowed("Phone number must be 7 to 15 digits")))
    }
}

/// Flattens `validator` output into a single `"; "`-joined message.
///
/// Fields are visited in name order so the text is stable; repeated messages
/// (e.g. the same rule failing on several list items) appear once.
#[must_use]
pub fn describe(errors: &ValidationErrors) -> String {
    let mut messages = Vec::new();
    collect(errors, "", &mut messages);
    messages.join("; ")
}

fn collect(errors: &ValidationErrors, prefix: &str, out: &mut Vec<String>) {
    let mut fields: Vec<_> = errors.errors().iter().collect();
    fields.sort_by(|a, b| a.0.cmp(b.0));

    for (field, kind) in fields {
        let path = if prefix.is_empty() {
            field.to_string()
        } else {
            format!("{prefix}.{field}")
        };

        match kind {
            ValidationErrorsKind::Field(list) => {
                for error in list {
                    let message = error
                        .message
                        .as_ref()
                        .map_or_else(|| format!("{path} is invalid"), ToString::to_string);
                    if !out.contains(&message) {
                        out.push(message);
                    }
                }
            }
            ValidationErrorsKind::Struct(nested) => collect(nested, &path, out),
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    collect(nested, &format!("{path}[{index}]"), out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use validator::Validate;

    #[derive(Validate)]
    struct Signup {
        #[validate(length(min = 3, message = "too short"))]
        name: String,
        #[validate(email(message = "bad email"))]
        email: String,
    }

    #[rstest]
    #[case("  Alice@Example.COM ", "alice@example.com")]
    #[case("bob@x.io", "bob@x.io")]
    fn test_normalize_email(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(normalize_email(raw), expected);
    }

    #[rstest]
    #[case("5551234", true)]
    #[case("123456789012345", true)]
    #[case("123456", false)]
    #[case("1234567890123456", false)]
    #[case("555-1234", false)]
    fn test_validate_phone(#[case] phone: &str, #[case] ok: bool) {
        assert_eq!(validate_phone(phone).is_ok(), ok);
    }

    #[test]
    fn test_describe_joins_in_field_order() {
        let signup = Signup {
            name: "al".into(),
            email: "nope".into(),
        };
        let errors = signup.validate().unwrap_err();
        assert_eq!(describe(&errors), "bad email; too short");
    }
}
