//! Data model for the submission lifecycle.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

/// Mail-routing and styling configuration for one rendered form.
///
/// Built per render by overlaying recognized attributes onto the defaults,
/// then stored in the transient store so the submission handler, which runs
/// on a different URL than the page hosting the form, can retrieve it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormConfig {
    /// Recipient override. Falls back to the site admin email.
    pub mailto: Option<String>,
    /// From/Reply-To address override. Falls back to the site admin email.
    pub headermailto: Option<String>,
    /// From/Reply-To display name override. Falls back to the site name.
    pub headername: Option<String>,
    /// CSS class for the submit button.
    pub cssbutton: String,
    /// CSS class prefix for alert blocks; the severity is appended.
    pub cssalert: String,
}

impl Default for FormConfig {
    fn default() -> Self {
        Self {
            mailto: None,
            headermailto: None,
            headername: None,
            cssbutton: "btn btn-primary".to_string(),
            cssalert: "alert alert-".to_string(),
        }
    }
}

impl FormConfig {
    /// Overlay attributes onto the defaults.
    ///
    /// Attribute keys are matched case-insensitively; unrecognized keys are
    /// ignored, and empty values leave the default in place.
    pub fn from_attributes(attributes: &HashMap<String, String>) -> Self {
        let mut config = Self::default();

        for (key, value) in attributes {
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            match key.to_lowercase().as_str() {
                "mailto" => config.mailto = Some(value.to_string()),
                "headermailto" => config.headermailto = Some(value.to_string()),
                "headername" => config.headername = Some(value.to_string()),
                "cssbutton" => config.cssbutton = value.to_string(),
                "cssalert" => config.cssalert = value.to_string(),
                _ => {}
            }
        }

        config
    }
}

/// Severity of a status message.
///
/// The declaration order is the render order of the alert blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Danger,
    Success,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Warning => "warning",
            Severity::Danger => "danger",
            Severity::Success => "success",
        }
    }
}

/// Machine-readable outcome codes carried across the redirect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageCode {
    MissingFields,
    EmailInvalid,
    NoScriptAllowed,
    Error,
    Success,
    /// Fallback for codes this build does not know. Renders defined text
    /// instead of leaking the raw code.
    #[serde(other)]
    Unknown,
}

impl MessageCode {
    /// Human-readable text for this code.
    pub fn text(self) -> &'static str {
        match self {
            MessageCode::MissingFields => "Please fill out all fields.",
            MessageCode::EmailInvalid => "Please check your email address.",
            MessageCode::NoScriptAllowed => "Please don't call this by script.",
            MessageCode::Error => "The message could not be sent.",
            MessageCode::Success => "Thanks! The message has been sent.",
            MessageCode::Unknown => "Something went wrong. Please try again.",
        }
    }
}

/// Accumulated outcome of one submission: per severity, an ordered list of
/// message codes. Each code renders as its own alert block.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubmissionStatus(BTreeMap<Severity, Vec<MessageCode>>);

impl SubmissionStatus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a code under the given severity, preserving insertion order.
    pub fn push(&mut self, severity: Severity, code: MessageCode) {
        self.0.entry(severity).or_default().push(code);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate `(severity, code)` pairs in render order.
    pub fn iter(&self) -> impl Iterator<Item = (Severity, MessageCode)> + '_ {
        self.0
            .iter()
            .flat_map(|(severity, codes)| codes.iter().map(|code| (*severity, *code)))
    }

    /// All codes recorded under one severity.
    pub fn codes(&self, severity: Severity) -> &[MessageCode] {
        self.0.get(&severity).map_or(&[], Vec::as_slice)
    }
}

/// Raw submitted field values, kept only for redisplay after the redirect.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmittedFields {
    pub name: String,
    pub email: String,
    pub message: String,
}

/// What one submission left behind for the next render: the fields to
/// redisplay and the status to show. Stored read-once under the session
/// identity key.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionResult {
    pub fields: SubmittedFields,
    pub status: SubmissionStatus,
}
