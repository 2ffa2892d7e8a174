pub mod parser;
pub mod record;

pub use parser::{CertificateParser, ParsedCertificate};
pub use record::{format_expiry, warning_threshold, CertificateRecord, ScanResult};
