//! Application state shared across all handlers.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::config::Config;
use crate::services::email::{Mailer, SmtpMailer};
use crate::theme::ThemeEngine;
use crate::token::TimestampCodec;
use crate::transient::TransientStore;

/// Shared application state.
///
/// Wrapped in Arc internally so Clone is cheap. One instance is constructed
/// at startup and owned by the router; there is no global registry.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Application configuration.
    config: Config,

    /// Ephemeral state store for per-page config and session results.
    transients: TransientStore,

    /// Anti-spam timestamp codec.
    codec: TimestampCodec,

    /// Tera template engine.
    theme: ThemeEngine,

    /// Mail transport (available when SMTP_HOST is configured).
    mailer: Option<Arc<dyn Mailer>>,
}

impl AppState {
    /// Create application state, wiring the SMTP mailer when configured.
    pub fn new(config: Config) -> Result<Self> {
        let mailer: Option<Arc<dyn Mailer>> = match config.smtp_host.as_deref() {
            Some(host) => {
                let smtp = SmtpMailer::new(
                    host,
                    config.smtp_port,
                    config.smtp_username.as_deref(),
                    config.smtp_password.as_deref(),
                    &config.smtp_encryption,
                )
                .context("failed to create SMTP transport")?;
                info!(host = %host, port = config.smtp_port, "SMTP transport configured");
                Some(Arc::new(smtp))
            }
            None => {
                warn!("SMTP_HOST not configured; submissions will report a delivery error");
                None
            }
        };

        Self::with_mailer(config, mailer)
    }

    /// Create application state with an explicit mail transport.
    ///
    /// Integration tests use this to substitute a recording mailer.
    pub fn with_mailer(config: Config, mailer: Option<Arc<dyn Mailer>>) -> Result<Self> {
        let theme =
            ThemeEngine::new(&config.templates_dir).context("failed to load templates")?;
        let codec = TimestampCodec::new(&config.antispam_secret);
        let transients = TransientStore::new();

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                transients,
                codec,
                theme,
                mailer,
            }),
        })
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    pub fn transients(&self) -> &TransientStore {
        &self.inner.transients
    }

    pub fn codec(&self) -> &TimestampCodec {
        &self.inner.codec
    }

    pub fn theme(&self) -> &ThemeEngine {
        &self.inner.theme
    }

    pub fn mailer(&self) -> Option<&Arc<dyn Mailer>> {
        self.inner.mailer.as_ref()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("transients", &self.inner.transients)
            .field("mailer_configured", &self.inner.mailer.is_some())
            .finish()
    }
}
