use chrono::{DateTime, Duration, Utc};
use std::fmt;

/// A certificate found inside the warning window during one scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateRecord {
    pub namespace: String,
    pub secret_name: String,
    pub not_after: DateTime<Utc>,
}

/// Records found by one scan, ordered by namespace then secret name
pub type ScanResult = Vec<CertificateRecord>;

impl CertificateRecord {
    pub fn new(
        namespace: impl Into<String>,
        secret_name: impl Into<String>,
        not_after: DateTime<Utc>,
    ) -> Self {
        Self {
            namespace: namespace.into(),
            secret_name: secret_name.into(),
            not_after,
        }
    }

    /// Report line used in alert bodies
    pub fn report_line(&self) -> String {
        format!(
            "namespace={} cert={} expires={}",
            self.namespace,
            self.secret_name,
            format_expiry(&self.not_after)
        )
    }
}

impl fmt::Display for CertificateRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} expires {}",
            self.namespace,
            self.secret_name,
            format_expiry(&self.not_after)
        )
    }
}

pub fn format_expiry(not_after: &DateTime<Utc>) -> String {
    not_after.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Certificates expiring strictly before this instant are reported
pub fn warning_threshold(now: DateTime<Utc>, warning_days: u32) -> DateTime<Utc> {
    now.checked_add_signed(Duration::days(i64::from(warning_days)))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}
