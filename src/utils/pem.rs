use crate::utils::errors::{Result, WatcherError};
use base64::{engine::general_purpose, Engine as _};

const BEGIN_CERTIFICATE: &str = "-----BEGIN CERTIFICATE-----";
const END_CERTIFICATE: &str = "-----END CERTIFICATE-----";

/// Decode the first CERTIFICATE block of a PEM payload into DER bytes.
///
/// Secrets frequently hold a full chain in `tls.crt`; the leaf comes first,
/// so any blocks after the first one are ignored.
pub fn decode_first_certificate(pem_data: &[u8]) -> Result<Vec<u8>> {
    let text = std::str::from_utf8(pem_data)
        .map_err(|e| WatcherError::Decode(format!("PEM payload is not valid UTF-8: {e}")))?;

    let body = extract_certificate_body(text)?;

    general_purpose::STANDARD
        .decode(body)
        .map_err(|e| WatcherError::Decode(format!("Base64 decode error: {e}")))
}

/// Extract the base64 body of the first complete certificate block
fn extract_certificate_body(pem_data: &str) -> Result<String> {
    let mut in_cert = false;
    let mut complete = false;
    let mut cert_lines = Vec::new();

    for line in pem_data.lines() {
        let line = line.trim();
        if line == BEGIN_CERTIFICATE {
            in_cert = true;
            cert_lines.clear();
        } else if line == END_CERTIFICATE && in_cert {
            complete = true;
            break;
        } else if in_cert && !line.is_empty() {
            cert_lines.push(line);
        }
    }

    if !complete || cert_lines.is_empty() {
        return Err(WatcherError::Decode(
            "No certificate block found in PEM payload".to_string(),
        ));
    }

    Ok(cert_lines.concat())
}
