//! Submission validation.
//!
//! Pure functions over the sanitized fields, the honeypot value, and the
//! anti-spam verdict. Mail dispatch happens elsewhere; this module only
//! accumulates the status messages that gate it.

use std::sync::LazyLock;

use regex::Regex;

use super::types::{MessageCode, Severity, SubmissionStatus, SubmittedFields};
use crate::token::TimestampCodec;

#[allow(clippy::unwrap_used)] // pattern is a constant
static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap());

/// Outcome of the anti-spam timing check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AntiSpamVerdict {
    /// Token decoded and fell inside the accepted window.
    Trusted,
    /// Token missing, undecodable, or out of range.
    Suspicious,
}

/// Range-check the anti-spam token.
///
/// A submission is trusted only when the token decodes to a timestamp `t`
/// with `now < t + window_secs`. Every failure mode (missing token, decode
/// failure, out-of-range timestamp) collapses into [`AntiSpamVerdict::Suspicious`];
/// nothing here is an error.
pub fn check_token(
    codec: &TimestampCodec,
    token: &str,
    now: i64,
    window_secs: i64,
) -> AntiSpamVerdict {
    match codec.decode(token) {
        Some(t) if now < t + window_secs => AntiSpamVerdict::Trusted,
        _ => AntiSpamVerdict::Suspicious,
    }
}

/// Basic email-format check.
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}

/// Validate a submission.
///
/// Suspicious submissions (honeypot filled or timing check failed) get at
/// most a missing-fields warning; detailed validation errors are withheld
/// from probing bots, and mail is never dispatched for them. Trusted
/// submissions accumulate every applicable warning; an empty result means
/// the processor may attempt dispatch.
pub fn validate(
    fields: &SubmittedFields,
    honeypot: &str,
    verdict: AntiSpamVerdict,
) -> SubmissionStatus {
    let mut status = SubmissionStatus::new();

    let missing = fields.name.is_empty() || fields.email.is_empty() || fields.message.is_empty();

    if !honeypot.is_empty() || verdict == AntiSpamVerdict::Suspicious {
        if missing {
            status.push(Severity::Warning, MessageCode::MissingFields);
        } else {
            status.push(Severity::Danger, MessageCode::NoScriptAllowed);
        }
        return status;
    }

    if missing {
        status.push(Severity::Warning, MessageCode::MissingFields);
    }
    if !fields.email.is_empty() && !is_valid_email(&fields.email) {
        status.push(Severity::Warning, MessageCode::EmailInvalid);
    }

    status
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn fields(name: &str, email: &str, message: &str) -> SubmittedFields {
        SubmittedFields {
            name: name.to_string(),
            email: email.to_string(),
            message: message.to_string(),
        }
    }

    #[test]
    fn email_format_check() {
        assert!(is_valid_email("a@b.com"));
        assert!(is_valid_email("jo.smith+tag@mail.example.org"));
        assert!(!is_valid_email("not-an-email"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a b@c.com"));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn trusted_and_complete_yields_empty_status() {
        let status = validate(
            &fields("Jo", "jo@x.com", "Hi"),
            "",
            AntiSpamVerdict::Trusted,
        );
        assert!(status.is_empty());
    }

    #[test]
    fn trusted_with_missing_field_warns() {
        let status = validate(&fields("Jo", "jo@x.com", ""), "", AntiSpamVerdict::Trusted);
        assert_eq!(
            status.codes(Severity::Warning),
            &[MessageCode::MissingFields]
        );
        assert!(status.codes(Severity::Danger).is_empty());
    }

    #[test]
    fn empty_email_triggers_only_missing_fields() {
        let status = validate(&fields("Jo", "", "Hi"), "", AntiSpamVerdict::Trusted);
        assert_eq!(
            status.codes(Severity::Warning),
            &[MessageCode::MissingFields]
        );
    }

    #[test]
    fn invalid_email_warns_and_can_stack_with_missing_fields() {
        let status = validate(&fields("Jo", "not-an-email", "Hi"), "", AntiSpamVerdict::Trusted);
        assert_eq!(status.codes(Severity::Warning), &[MessageCode::EmailInvalid]);

        let status = validate(&fields("", "not-an-email", ""), "", AntiSpamVerdict::Trusted);
        assert_eq!(
            status.codes(Severity::Warning),
            &[MessageCode::MissingFields, MessageCode::EmailInvalid]
        );
    }

    #[test]
    fn filled_honeypot_is_flagged_even_with_valid_fields() {
        let status = validate(
            &fields("Jo", "jo@x.com", "Hi"),
            "http://spam.example",
            AntiSpamVerdict::Trusted,
        );
        assert_eq!(
            status.codes(Severity::Danger),
            &[MessageCode::NoScriptAllowed]
        );
    }

    #[test]
    fn suspicious_submissions_never_leak_email_validation() {
        let status = validate(
            &fields("Jo", "not-an-email", "Hi"),
            "",
            AntiSpamVerdict::Suspicious,
        );
        assert_eq!(
            status.codes(Severity::Danger),
            &[MessageCode::NoScriptAllowed]
        );
        assert!(status.codes(Severity::Warning).is_empty());

        let status = validate(&fields("", "", ""), "", AntiSpamVerdict::Suspicious);
        assert_eq!(
            status.codes(Severity::Warning),
            &[MessageCode::MissingFields]
        );
    }

    #[test]
    fn token_within_window_is_trusted() {
        let codec = TimestampCodec::new("test-secret");
        let now = 1_000_000;

        let fresh = codec.encode(now - 2);
        assert_eq!(check_token(&codec, &fresh, now, 4), AntiSpamVerdict::Trusted);

        let boundary = codec.encode(now - 4);
        assert_eq!(
            check_token(&codec, &boundary, now, 4),
            AntiSpamVerdict::Suspicious
        );

        let stale = codec.encode(now - 10);
        assert_eq!(
            check_token(&codec, &stale, now, 4),
            AntiSpamVerdict::Suspicious
        );
    }

    #[test]
    fn missing_or_undecodable_token_is_suspicious() {
        let codec = TimestampCodec::new("test-secret");
        assert_eq!(check_token(&codec, "", 0, 4), AntiSpamVerdict::Suspicious);
        assert_eq!(
            check_token(&codec, "garbage", 0, 4),
            AntiSpamVerdict::Suspicious
        );
    }
}
