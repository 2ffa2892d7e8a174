//! In-memory fakes and certificate fixtures shared by unit tests.

use crate::cluster::{SecretSource, TlsSecret};
use crate::notify::{AlertMessage, MailTransport};
use crate::utils::errors::{Result, WatcherError};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rcgen::{CertificateParams, DistinguishedName, DnType, KeyPair};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::SystemTime;
use tokio_util::sync::CancellationToken;

/// Self-signed PEM certificate expiring at `not_after`
pub fn certificate_pem(not_after: DateTime<Utc>) -> String {
    certificate_pem_with_cn("test.example.com", not_after)
}

pub fn certificate_pem_with_cn(cn: &str, not_after: DateTime<Utc>) -> String {
    let mut params = CertificateParams::new(vec![cn.to_string()]).unwrap();

    let mut dn = DistinguishedName::new();
    dn.push(DnType::CommonName, cn);
    params.distinguished_name = dn;
    params.not_after = SystemTime::from(not_after).into();

    let key_pair = KeyPair::generate().unwrap();
    params.self_signed(&key_pair).unwrap().pem()
}

fn unavailable(what: &str) -> WatcherError {
    WatcherError::Io(std::io::Error::new(
        std::io::ErrorKind::ConnectionRefused,
        format!("{what}: connection refused"),
    ))
}

/// Cluster fake holding secrets per namespace
#[derive(Default)]
pub struct FakeSecretSource {
    namespaces: BTreeMap<String, Vec<TlsSecret>>,
    failing_namespaces: BTreeSet<String>,
    fail_namespace_listing: bool,
    namespace_calls: AtomicUsize,
    secret_calls: AtomicUsize,
    cancel_after: Option<(usize, CancellationToken)>,
}

impl FakeSecretSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_namespace(mut self, namespace: &str) -> Self {
        self.namespaces.entry(namespace.to_string()).or_default();
        self
    }

    pub fn with_secret(self, namespace: &str, name: &str, pem: &str) -> Self {
        self.push_secret(namespace, name, Some(pem.as_bytes().to_vec()))
    }

    /// A TLS secret without a `tls.crt` entry
    pub fn with_empty_secret(self, namespace: &str, name: &str) -> Self {
        self.push_secret(namespace, name, None)
    }

    fn push_secret(mut self, namespace: &str, name: &str, certificate: Option<Vec<u8>>) -> Self {
        self.namespaces
            .entry(namespace.to_string())
            .or_default()
            .push(TlsSecret {
                namespace: namespace.to_string(),
                name: name.to_string(),
                certificate,
            });
        self
    }

    /// Listing secrets in `namespace` fails
    pub fn failing_namespace(mut self, namespace: &str) -> Self {
        self.namespaces.entry(namespace.to_string()).or_default();
        self.failing_namespaces.insert(namespace.to_string());
        self
    }

    pub fn failing_namespace_listing(mut self) -> Self {
        self.fail_namespace_listing = true;
        self
    }

    /// Cancel `token` once namespaces have been listed `cycles` times
    pub fn cancel_after(mut self, cycles: usize, token: CancellationToken) -> Self {
        self.cancel_after = Some((cycles, token));
        self
    }

    /// Number of scans started
    pub fn namespace_list_calls(&self) -> usize {
        self.namespace_calls.load(Ordering::SeqCst)
    }

    pub fn secret_list_calls(&self) -> usize {
        self.secret_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SecretSource for FakeSecretSource {
    async fn list_namespaces(&self) -> Result<Vec<String>> {
        let calls = self.namespace_calls.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some((cycles, token)) = &self.cancel_after {
            if calls >= *cycles {
                token.cancel();
            }
        }

        if self.fail_namespace_listing {
            return Err(unavailable("list namespaces"));
        }
        // Reverse order so the scanner has to sort
        Ok(self.namespaces.keys().rev().cloned().collect())
    }

    async fn list_tls_secrets(&self, namespace: &str) -> Result<Vec<TlsSecret>> {
        self.secret_calls.fetch_add(1, Ordering::SeqCst);

        if self.failing_namespaces.contains(namespace) {
            return Err(unavailable("list secrets"));
        }
        let mut secrets = self.namespaces.get(namespace).cloned().unwrap_or_default();
        secrets.reverse();
        Ok(secrets)
    }
}

/// Mail fake recording every message handed to it
#[derive(Default)]
pub struct FakeMailer {
    sent: Mutex<Vec<AlertMessage>>,
    calls: AtomicUsize,
    fail: bool,
}

impl FakeMailer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<AlertMessage> {
        self.sent.lock().unwrap().clone()
    }

    pub fn send_calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MailTransport for FakeMailer {
    async fn send(&self, message: &AlertMessage) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(WatcherError::Notify("535 authentication failed".to_string()));
        }
        self.sent.lock().unwrap().push(message.clone());
        Ok(())
    }
}
