pub mod client;

use crate::utils::errors::Result;
use async_trait::async_trait;
use std::sync::Arc;

pub use client::KubeSecretSource;

/// Secret type tag of TLS secrets
pub const TLS_SECRET_TYPE: &str = "kubernetes.io/tls";

/// Data key holding the PEM certificate (chain) of a TLS secret
pub const TLS_CERT_KEY: &str = "tls.crt";

/// A TLS secret as seen by the scanner
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsSecret {
    pub namespace: String,
    pub name: String,
    /// Raw value of `tls.crt`, `None` when the key is absent
    pub certificate: Option<Vec<u8>>,
}

impl TlsSecret {
    /// Certificate payload, empty when the secret carries none
    pub fn certificate_bytes(&self) -> &[u8] {
        self.certificate.as_deref().unwrap_or_default()
    }
}

/// Read-only view of the cluster used by the expiry scanner
#[async_trait]
pub trait SecretSource: Send + Sync {
    /// Names of every namespace in the cluster
    async fn list_namespaces(&self) -> Result<Vec<String>>;

    /// TLS-typed secrets of one namespace
    async fn list_tls_secrets(&self, namespace: &str) -> Result<Vec<TlsSecret>>;
}

#[async_trait]
impl<S: SecretSource + ?Sized> SecretSource for Arc<S> {
    async fn list_namespaces(&self) -> Result<Vec<String>> {
        (**self).list_namespaces().await
    }

    async fn list_tls_secrets(&self, namespace: &str) -> Result<Vec<TlsSecret>> {
        (**self).list_tls_secrets(namespace).await
    }
}
