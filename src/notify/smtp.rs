use crate::notify::{AlertMessage, MailTransport};
use crate::utils::errors::{Result, WatcherError};
use async_trait::async_trait;
use clap::ValueEnum;
use lettre::message::{header::ContentType, Mailbox};
use lettre::transport::smtp::authentication::{Credentials, Mechanism};
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{Message, SmtpTransport, Transport};
use std::time::Duration;

const SMTP_TIMEOUT: Duration = Duration::from_secs(30);

/// How the SMTP connection is secured
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SmtpTls {
    /// Plain connection
    None,
    /// Upgrade with STARTTLS when the server offers it
    #[default]
    Opportunistic,
    /// Require STARTTLS
    Starttls,
    /// Implicit TLS (usually port 465)
    Tls,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    /// Authentication is only attempted when a username is set
    pub username: Option<String>,
    pub password: String,
    pub tls: SmtpTls,
}

/// `MailTransport` delivering over SMTP
pub struct SmtpMailer {
    transport: SmtpTransport,
}

impl SmtpMailer {
    pub fn new(settings: &SmtpSettings) -> Result<Self> {
        let builder = match settings.tls {
            SmtpTls::None => SmtpTransport::builder_dangerous(&settings.host),
            SmtpTls::Opportunistic => SmtpTransport::builder_dangerous(&settings.host)
                .tls(Tls::Opportunistic(tls_parameters(&settings.host)?)),
            SmtpTls::Starttls => SmtpTransport::starttls_relay(&settings.host)
                .map_err(|e| WatcherError::Notify(format!("Invalid SMTP relay: {e}")))?,
            SmtpTls::Tls => SmtpTransport::relay(&settings.host)
                .map_err(|e| WatcherError::Notify(format!("Invalid SMTP relay: {e}")))?,
        };

        let mut builder = builder.port(settings.port).timeout(Some(SMTP_TIMEOUT));

        if let Some(username) = &settings.username {
            builder = builder
                .credentials(Credentials::new(
                    username.clone(),
                    settings.password.clone(),
                ))
                .authentication(vec![Mechanism::Plain, Mechanism::Login]);
        }

        tracing::debug!(
            "SMTP transport {}:{} ({:?})",
            settings.host,
            settings.port,
            settings.tls
        );

        Ok(Self {
            transport: builder.build(),
        })
    }
}

#[async_trait]
impl MailTransport for SmtpMailer {
    async fn send(&self, message: &AlertMessage) -> Result<()> {
        let email = build_email(message)?;
        let transport = self.transport.clone();

        // lettre's SmtpTransport is blocking
        tokio::task::spawn_blocking(move || transport.send(&email))
            .await
            .map_err(|e| WatcherError::Notify(format!("Mail delivery task failed: {e}")))?
            .map_err(|e| WatcherError::Notify(format!("Failed to send email: {e}")))?;

        Ok(())
    }
}

fn tls_parameters(host: &str) -> Result<TlsParameters> {
    TlsParameters::new(host.to_string())
        .map_err(|e| WatcherError::Notify(format!("Invalid TLS parameters for {host}: {e}")))
}

fn parse_mailbox(address: &str) -> Result<Mailbox> {
    address
        .parse()
        .map_err(|e| WatcherError::Notify(format!("Invalid email address {address}: {e}")))
}

fn build_email(message: &AlertMessage) -> Result<Message> {
    Message::builder()
        .from(parse_mailbox(&message.from)?)
        .to(parse_mailbox(&message.to)?)
        .subject(message.subject.clone())
        .header(ContentType::TEXT_PLAIN)
        .body(message.body.clone())
        .map_err(|e| WatcherError::Notify(format!("Failed to build email: {e}")))
}
