use crate::utils::errors::{Result, WatcherError};
use crate::utils::pem;
use chrono::{DateTime, Utc};
use x509_parser::prelude::*;

/// The parts of a certificate the watcher cares about
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCertificate {
    pub not_after: DateTime<Utc>,
    pub common_name: Option<String>,
    pub serial: String,
}

pub struct CertificateParser;

impl CertificateParser {
    /// Parse the leaf certificate of a PEM payload as stored under `tls.crt`
    pub fn parse_pem(pem_data: &[u8]) -> Result<ParsedCertificate> {
        let der_bytes = pem::decode_first_certificate(pem_data)?;
        Self::parse_der(&der_bytes)
    }

    /// Parse a single DER encoded X.509 certificate
    pub fn parse_der(der_bytes: &[u8]) -> Result<ParsedCertificate> {
        let (_, cert) = X509Certificate::from_der(der_bytes)
            .map_err(|e| WatcherError::Parse(format!("DER parsing error: {e}")))?;

        let not_after_ts = cert.validity().not_after.timestamp();
        let not_after = DateTime::from_timestamp(not_after_ts, 0).ok_or_else(|| {
            WatcherError::Parse(format!("notAfter out of range: {not_after_ts}"))
        })?;

        let common_name = cert
            .subject()
            .iter_common_name()
            .next()
            .and_then(|cn| cn.as_str().ok())
            .map(|cn| cn.to_string());

        Ok(ParsedCertificate {
            not_after,
            common_name,
            serial: hex::encode(cert.serial.to_bytes_be()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{certificate_pem, certificate_pem_with_cn};
    use chrono::TimeZone;

    #[test]
    fn test_parse_not_after() {
        let pem = certificate_pem(Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap());
        let parsed = CertificateParser::parse_pem(pem.as_bytes()).unwrap();
        assert_eq!(
            parsed.not_after,
            Utc.with_ymd_and_hms(2024, 1, 15, 0, 0, 0).unwrap()
        );
        assert!(!parsed.serial.is_empty());
    }

    #[test]
    fn test_parse_common_name() {
        let pem = certificate_pem_with_cn(
            "web.example.com",
            Utc.with_ymd_and_hms(2030, 6, 1, 0, 0, 0).unwrap(),
        );
        let parsed = CertificateParser::parse_pem(pem.as_bytes()).unwrap();
        assert_eq!(parsed.common_name.as_deref(), Some("web.example.com"));
    }

    #[test]
    fn test_parse_leaf_of_chain() {
        let leaf = certificate_pem(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap());
        let issuer = certificate_pem(Utc.with_ymd_and_hms(2034, 3, 1, 0, 0, 0).unwrap());
        let chain = format!("{leaf}{issuer}");

        let parsed = CertificateParser::parse_pem(chain.as_bytes()).unwrap();
        assert_eq!(
            parsed.not_after,
            Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_malformed_der_is_parse_error() {
        // Valid PEM framing and base64, but the payload is not a certificate
        let pem = "-----BEGIN CERTIFICATE-----\naGVsbG8gd29ybGQ=\n-----END CERTIFICATE-----\n";
        assert!(matches!(
            CertificateParser::parse_pem(pem.as_bytes()),
            Err(WatcherError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_block_is_decode_error() {
        assert!(matches!(
            CertificateParser::parse_pem(b"not a certificate"),
            Err(WatcherError::Decode(_))
        ));
    }
}
