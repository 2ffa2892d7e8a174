pub mod cert;
pub mod cli;
pub mod cluster;
pub mod notify;
pub mod scan;
pub mod utils;
pub mod watch;

#[cfg(test)]
mod testing;

pub use cert::{CertificateParser, CertificateRecord, ScanResult};
pub use cluster::{KubeSecretSource, SecretSource, TlsSecret};
pub use notify::{AlertMessage, MailTransport, Notifier, SmtpMailer};
pub use scan::{ExpiryScanner, InvalidCertificatePolicy};
pub use utils::errors;
pub use watch::{CycleDriver, RunMode, WatchConfig};
