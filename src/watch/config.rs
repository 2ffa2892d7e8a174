use crate::notify::SmtpSettings;
use crate::scan::InvalidCertificatePolicy;
use std::path::PathBuf;
use std::time::Duration;

/// Runtime configuration, built once at startup and never mutated
#[derive(Debug, Clone)]
pub struct WatchConfig {
    /// Time between the starts of two cycles
    pub interval: Duration,
    /// Days before expiration at which a certificate is reported
    pub warning_days: u32,
    /// Display name used in alert subjects, may be empty
    pub cluster_name: String,
    pub smtp: SmtpSettings,
    pub sender: String,
    pub recipient: String,
    pub run_once: bool,
    /// Explicit kubeconfig; in-cluster or default config when unset
    pub kubeconfig: Option<PathBuf>,
    pub invalid_certificates: InvalidCertificatePolicy,
}
