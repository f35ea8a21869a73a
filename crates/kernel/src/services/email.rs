//! Mail delivery behind a transport-agnostic trait.
//!
//! The processor only sees [`Mailer`]; production wires in the lettre SMTP
//! transport, tests substitute a recording fake.

use anyhow::{Context, Result};
use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

/// One outbound contact message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub to: String,
    pub subject: String,
    pub body: String,
    /// From/Reply-To display name.
    pub header_name: String,
    /// From/Reply-To address.
    pub header_mailto: String,
}

/// Mail transport seam.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Deliver one message. Exactly one attempt, no retries.
    async fn send(&self, mail: &OutgoingMail) -> Result<()>;
}

/// SMTP delivery via lettre.
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
}

impl SmtpMailer {
    /// Create an SMTP mailer. The connection is lazy; construction only
    /// validates the transport configuration.
    ///
    /// `encryption` controls the transport mode:
    /// - `"starttls"` (default): opportunistic STARTTLS, typically port 587
    /// - `"tls"`: implicit TLS (SMTPS), typically port 465
    /// - `"none"`: unencrypted, for local development only
    pub fn new(
        smtp_host: &str,
        smtp_port: u16,
        smtp_username: Option<&str>,
        smtp_password: Option<&str>,
        encryption: &str,
    ) -> Result<Self> {
        let mut builder = match encryption {
            "tls" => AsyncSmtpTransport::<Tokio1Executor>::relay(smtp_host)
                .context("failed to create SMTP relay transport")?
                .port(smtp_port),
            "none" => {
                AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(smtp_host).port(smtp_port)
            }
            _ => AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(smtp_host)
                .context("failed to create SMTP STARTTLS transport")?
                .port(smtp_port),
        };

        if let (Some(user), Some(pass)) = (smtp_username, smtp_password) {
            builder = builder.credentials(Credentials::new(user.to_string(), pass.to_string()));
        }

        Ok(Self {
            transport: builder.build(),
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, mail: &OutgoingMail) -> Result<()> {
        let sender = Mailbox::new(
            Some(mail.header_name.clone()),
            mail.header_mailto
                .parse()
                .context("invalid sender email address")?,
        );

        let message = Message::builder()
            .from(sender.clone())
            .reply_to(sender)
            .to(mail.to.parse().context("invalid recipient email address")?)
            .subject(&mail.subject)
            .header(ContentType::TEXT_PLAIN)
            .body(mail.body.clone())
            .context("failed to build email message")?;

        self.transport
            .send(message)
            .await
            .context("failed to send email")?;

        Ok(())
    }
}
