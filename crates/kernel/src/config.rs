//! Configuration loaded from environment variables.

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port (default: 3000).
    pub port: u16,

    /// Public site URL, used for canonical page keys, same-origin redirect
    /// checks, and the fallback redirect target (default: `http://localhost:{port}`).
    pub site_url: String,

    /// Site name, used as the fallback From/Reply-To display name.
    pub site_name: String,

    /// Site-wide admin email: fallback recipient and From/Reply-To address.
    pub admin_email: String,

    /// URL of the privacy policy page linked from the consent notice
    /// (default: `{site_url}/privacy-policy`).
    pub privacy_policy_url: String,

    /// Path to the Tera templates directory (default: ./templates).
    pub templates_dir: PathBuf,

    /// SMTP host for mail delivery. When None, dispatch always fails with a
    /// delivery error status.
    pub smtp_host: Option<String>,

    /// SMTP port (default: 587).
    pub smtp_port: u16,

    /// SMTP username for authentication.
    pub smtp_username: Option<String>,

    /// SMTP password for authentication.
    pub smtp_password: Option<String>,

    /// SMTP encryption mode: "starttls" (default), "tls", or "none".
    pub smtp_encryption: String,

    /// Secret string the timestamp codec derives its key from.
    ///
    /// Anti-bot obfuscation only: this is ordinary configuration, not
    /// secret-grade key material.
    pub antispam_secret: String,

    /// Seconds the anti-spam token stays valid after render (default: 4).
    pub antispam_window_secs: i64,

    /// Cookie SameSite policy: "strict" (default), "lax", or "none".
    pub cookie_same_site: String,

    /// Attribute overrides applied to the contact form render
    /// (mailto, headermailto, headername, cssbutton, cssalert).
    pub contact_attributes: HashMap<String, String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .context("PORT must be a valid u16")?;

        let site_url = env::var("SITE_URL").unwrap_or_else(|_| format!("http://localhost:{port}"));

        let site_name = env::var("SITE_NAME").unwrap_or_else(|_| "Recapito".to_string());

        let admin_email =
            env::var("ADMIN_EMAIL").context("ADMIN_EMAIL environment variable is required")?;

        let privacy_policy_url = env::var("PRIVACY_POLICY_URL")
            .unwrap_or_else(|_| format!("{}/privacy-policy", site_url.trim_end_matches('/')));

        let templates_dir = env::var("TEMPLATES_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./templates"));

        let smtp_host = env::var("SMTP_HOST").ok();

        let smtp_port = env::var("SMTP_PORT")
            .unwrap_or_else(|_| "587".to_string())
            .parse()
            .context("SMTP_PORT must be a valid u16")?;

        let smtp_username = env::var("SMTP_USERNAME").ok();
        let smtp_password = env::var("SMTP_PASSWORD").ok();

        let smtp_encryption = env::var("SMTP_ENCRYPTION")
            .unwrap_or_else(|_| "starttls".to_string())
            .to_lowercase();

        let antispam_secret =
            env::var("ANTISPAM_SECRET").unwrap_or_else(|_| "recapito-antispam".to_string());

        let antispam_window_secs = env::var("ANTISPAM_WINDOW_SECS")
            .unwrap_or_else(|_| "4".to_string())
            .parse()
            .context("ANTISPAM_WINDOW_SECS must be a valid i64")?;

        let cookie_same_site = env::var("COOKIE_SAME_SITE")
            .unwrap_or_else(|_| "strict".to_string())
            .to_lowercase();

        let mut contact_attributes = HashMap::new();
        for (var, attr) in [
            ("CONTACT_MAILTO", "mailto"),
            ("CONTACT_HEADER_MAILTO", "headermailto"),
            ("CONTACT_HEADER_NAME", "headername"),
            ("CONTACT_CSS_BUTTON", "cssbutton"),
            ("CONTACT_CSS_ALERT", "cssalert"),
        ] {
            if let Ok(value) = env::var(var) {
                contact_attributes.insert(attr.to_string(), value);
            }
        }

        Ok(Self {
            port,
            site_url,
            site_name,
            admin_email,
            privacy_policy_url,
            templates_dir,
            smtp_host,
            smtp_port,
            smtp_username,
            smtp_password,
            smtp_encryption,
            antispam_secret,
            antispam_window_secs,
            cookie_same_site,
            contact_attributes,
        })
    }
}
