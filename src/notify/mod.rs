pub mod smtp;

use crate::cert::CertificateRecord;
use crate::utils::errors::Result;
use async_trait::async_trait;
use std::sync::Arc;

pub use smtp::{SmtpMailer, SmtpSettings, SmtpTls};

const SUBJECT_PREFIX: &str = "Warning: Certificates Expiring Soon";

/// A plaintext alert ready for delivery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertMessage {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
}

/// Delivers alert messages
#[async_trait]
pub trait MailTransport: Send + Sync {
    async fn send(&self, message: &AlertMessage) -> Result<()>;
}

#[async_trait]
impl<T: MailTransport + ?Sized> MailTransport for Arc<T> {
    async fn send(&self, message: &AlertMessage) -> Result<()> {
        (**self).send(message).await
    }
}

/// Turns a scan result into one aggregate alert per cycle
pub struct Notifier<T> {
    transport: T,
    sender: String,
    recipient: String,
    cluster_name: String,
}

impl<T: MailTransport> Notifier<T> {
    pub fn new(
        transport: T,
        sender: impl Into<String>,
        recipient: impl Into<String>,
        cluster_name: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            sender: sender.into(),
            recipient: recipient.into(),
            cluster_name: cluster_name.into(),
        }
    }

    /// Send one alert listing every record. Nothing is sent for an empty list.
    pub async fn notify(&self, records: &[CertificateRecord]) -> Result<()> {
        if records.is_empty() {
            tracing::info!("No cert alerts detected");
            return Ok(());
        }

        let message = self.build_message(records);
        tracing::info!(
            "Sending alert for {} certificates to {}",
            records.len(),
            self.recipient
        );
        self.transport.send(&message).await?;
        tracing::info!("Alert sent");
        Ok(())
    }

    pub fn build_message(&self, records: &[CertificateRecord]) -> AlertMessage {
        AlertMessage {
            from: self.sender.clone(),
            to: self.recipient.clone(),
            subject: self.subject(),
            body: format_body(records),
        }
    }

    fn subject(&self) -> String {
        if self.cluster_name.is_empty() {
            SUBJECT_PREFIX.to_string()
        } else {
            format!("{SUBJECT_PREFIX} - {}", self.cluster_name)
        }
    }
}

fn format_body(records: &[CertificateRecord]) -> String {
    let mut body = String::new();
    for record in records {
        body.push_str(&record.report_line());
        body.push('\n');
    }
    body
}
