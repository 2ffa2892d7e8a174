use crate::cert::{CertificateParser, CertificateRecord, ScanResult};
use crate::cluster::{SecretSource, TlsSecret};
use crate::utils::errors::{Result, WatcherError};
use chrono::{DateTime, Utc};

/// What to do with a secret whose certificate cannot be decoded or parsed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum InvalidCertificatePolicy {
    /// Fail the whole scan
    #[default]
    Abort,
    /// Log the secret and keep scanning
    Skip,
}

/// Walks every namespace and collects TLS certificates expiring before a threshold
pub struct ExpiryScanner<S> {
    source: S,
    policy: InvalidCertificatePolicy,
}

impl<S: SecretSource> ExpiryScanner<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            policy: InvalidCertificatePolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: InvalidCertificatePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Scan the cluster for certificates with `notAfter` strictly before `threshold`.
    ///
    /// Namespaces and secrets are visited one at a time in name order, so the
    /// result is ordered by namespace then secret name. Any cluster error, and
    /// under [`InvalidCertificatePolicy::Abort`] any certificate error, fails
    /// the scan without a partial result.
    pub async fn scan(&self, threshold: DateTime<Utc>) -> Result<ScanResult> {
        tracing::info!("Retrieving tls secrets...");

        let mut namespaces = self
            .source
            .list_namespaces()
            .await
            .map_err(|e| WatcherError::scan("listing namespaces", e))?;
        namespaces.sort();
        tracing::debug!("Found {} namespaces", namespaces.len());

        let mut expiring = Vec::new();
        let mut checked = 0usize;
        let mut skipped = 0usize;

        for namespace in &namespaces {
            let mut secrets = self
                .source
                .list_tls_secrets(namespace)
                .await
                .map_err(|e| {
                    WatcherError::scan(format!("listing secrets in namespace {namespace}"), e)
                })?;
            secrets.sort_by(|a, b| a.name.cmp(&b.name));
            tracing::trace!("Namespace {} has {} tls secrets", namespace, secrets.len());

            for secret in secrets {
                checked += 1;
                match self.check_secret(namespace, &secret, threshold) {
                    Ok(Some(record)) => expiring.push(record),
                    Ok(None) => {}
                    Err(e)
                        if self.policy == InvalidCertificatePolicy::Skip
                            && e.is_certificate_error() =>
                    {
                        tracing::warn!("Skipping secret {}/{}: {}", namespace, secret.name, e);
                        skipped += 1;
                    }
                    Err(e) => {
                        return Err(WatcherError::scan(
                            format!("secret {namespace}/{}", secret.name),
                            e,
                        ))
                    }
                }
            }
        }

        tracing::debug!(
            "Checked {} tls secrets, {} expiring, {} skipped",
            checked,
            expiring.len(),
            skipped
        );
        Ok(expiring)
    }

    fn check_secret(
        &self,
        namespace: &str,
        secret: &TlsSecret,
        threshold: DateTime<Utc>,
    ) -> Result<Option<CertificateRecord>> {
        let parsed = CertificateParser::parse_pem(secret.certificate_bytes())?;

        if parsed.not_after >= threshold {
            return Ok(None);
        }

        let record = CertificateRecord::new(namespace, secret.name.clone(), parsed.not_after);
        tracing::info!(
            "Certificate expiring soon: {} (cn={}, serial={})",
            record,
            parsed.common_name.as_deref().unwrap_or("-"),
            parsed.serial
        );
        Ok(Some(record))
    }
}
