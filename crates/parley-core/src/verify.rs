//! Request authentication using Ed25519.
//!
//! The platform signs every webhook with its private key. The signed message
//! is the UTF-8 concatenation of the `X-Signature-Timestamp` header and the
//! raw request body, with no separator. The signature travels hex-encoded in
//! `X-Signature-Ed25519`; the public key is provisioned out of band, also as
//! hex.
//!
//! [`verify`] is the admission gate: anything that passes it is treated as
//! authentic by the router. It never fails loudly; every problem collapses to
//! `false`. Use [`Verifier`] when the key should be parsed once, when the
//! rejection reason matters, or when a freshness window is wanted.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use ed25519_dalek::{Signature, Verifier as _, VerifyingKey};
use tracing::{debug, error};

use crate::error::{VerifyError, VerifyResult};

/// Header carrying the signing timestamp.
pub const TIMESTAMP_HEADER: &str = "X-Signature-Timestamp";

/// Header carrying the hex-encoded signature.
pub const SIGNATURE_HEADER: &str = "X-Signature-Ed25519";

/// Verifies a signed request.
///
/// Returns `false` when either header is absent, when the key or signature
/// cannot be decoded, or when the signature does not match
/// `timestamp + body`. No freshness check is applied.
pub fn verify(
    public_key_hex: &str,
    timestamp: Option<&str>,
    signature: Option<&str>,
    body: &str,
) -> bool {
    match Verifier::from_hex(public_key_hex) {
        Ok(verifier) => verifier.verify(timestamp, signature, body),
        Err(e) => {
            error!(error = %e, "Cannot verify request");
            false
        }
    }
}

/// A reusable request verifier bound to one public key.
#[derive(Debug, Clone)]
pub struct Verifier {
    key: VerifyingKey,
    max_age: Option<Duration>,
}

impl Verifier {
    /// Parses a hex-encoded 32-byte Ed25519 public key.
    pub fn from_hex(public_key_hex: &str) -> VerifyResult<Self> {
        let bytes = hex::decode(public_key_hex.trim())
            .map_err(|e| VerifyError::InvalidPublicKey(e.to_string()))?;
        let bytes: [u8; 32] = bytes.try_into().map_err(|b: Vec<u8>| {
            VerifyError::InvalidPublicKey(format!("expected 32 bytes, got {}", b.len()))
        })?;
        let key = VerifyingKey::from_bytes(&bytes)
            .map_err(|e| VerifyError::InvalidPublicKey(e.to_string()))?;

        Ok(Self { key, max_age: None })
    }

    /// Rejects timestamps further than `max_age` from the current time.
    ///
    /// The timestamp header must then hold Unix seconds.
    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = Some(max_age);
        self
    }

    /// Returns the configured freshness window.
    pub fn max_age(&self) -> Option<Duration> {
        self.max_age
    }

    /// Verifies a request, returning `false` on any failure.
    pub fn verify(&self, timestamp: Option<&str>, signature: Option<&str>, body: &str) -> bool {
        match self.check(timestamp, signature, body) {
            Ok(()) => true,
            Err(e @ (VerifyError::MissingTimestamp | VerifyError::MissingSignature)) => {
                error!("{e}");
                false
            }
            Err(e) => {
                debug!(error = %e, "Request verification failed");
                false
            }
        }
    }

    /// Verifies a request, reporting why it was rejected.
    pub fn check(
        &self,
        timestamp: Option<&str>,
        signature: Option<&str>,
        body: &str,
    ) -> VerifyResult<()> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        self.check_at(timestamp, signature, body, now)
    }

    fn check_at(
        &self,
        timestamp: Option<&str>,
        signature: Option<&str>,
        body: &str,
        now: Duration,
    ) -> VerifyResult<()> {
        let timestamp = timestamp
            .filter(|t| !t.is_empty())
            .ok_or(VerifyError::MissingTimestamp)?;
        let signature = signature
            .filter(|s| !s.is_empty())
            .ok_or(VerifyError::MissingSignature)?;

        if let Some(max_age) = self.max_age {
            check_freshness(timestamp, now, max_age)?;
        }

        let sig_bytes =
            hex::decode(signature).map_err(|e| VerifyError::InvalidSignature(e.to_string()))?;
        let sig_bytes: [u8; 64] = sig_bytes.try_into().map_err(|b: Vec<u8>| {
            VerifyError::InvalidSignature(format!("expected 64 bytes, got {}", b.len()))
        })?;
        let signature = Signature::from_bytes(&sig_bytes);

        let mut message = Vec::with_capacity(timestamp.len() + body.len());
        message.extend_from_slice(timestamp.as_bytes());
        message.extend_from_slice(body.as_bytes());

        self.key
            .verify(&message, &signature)
            .map_err(|_| VerifyError::BadSignature)
    }
}

fn check_freshness(timestamp: &str, now: Duration, max_age: Duration) -> VerifyResult<()> {
    let signed_at: u64 = timestamp
        .trim()
        .parse()
        .map_err(|_| VerifyError::StaleTimestamp(timestamp.to_string()))?;
    let skew = now.as_secs().abs_diff(signed_at);
    if skew > max_age.as_secs() {
        return Err(VerifyError::StaleTimestamp(timestamp.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ed25519_dalek::{Signer, SigningKey};

    const BODY: &str = r#"{"type":1}"#;
    const TIMESTAMP: &str = "1700000000";

    fn keypair() -> (SigningKey, String) {
        let signing_key = SigningKey::from_bytes(&[7u8; 32]);
        let public_hex = hex::encode(signing_key.verifying_key().to_bytes());
        (signing_key, public_hex)
    }

    fn sign(key: &SigningKey, timestamp: &str, body: &str) -> String {
        hex::encode(key.sign(format!("{timestamp}{body}").as_bytes()).to_bytes())
    }

    #[test]
    fn test_verify_freshly_signed_request() {
        let (key, public_hex) = keypair();
        let sig = sign(&key, TIMESTAMP, BODY);
        assert!(verify(&public_hex, Some(TIMESTAMP), Some(&sig), BODY));
    }

    #[test]
    fn test_verify_missing_headers() {
        let (key, public_hex) = keypair();
        let sig = sign(&key, TIMESTAMP, BODY);
        assert!(!verify(&public_hex, None, Some(&sig), BODY));
        assert!(!verify(&public_hex, Some(TIMESTAMP), None, BODY));

        let verifier = Verifier::from_hex(&public_hex).unwrap();
        assert_eq!(
            verifier.check(None, Some(&sig), BODY),
            Err(VerifyError::MissingTimestamp)
        );
        assert_eq!(
            verifier.check(Some(TIMESTAMP), None, BODY),
            Err(VerifyError::MissingSignature)
        );
    }

    #[test]
    fn test_empty_headers_count_as_missing() {
        let (key, public_hex) = keypair();
        // signed over the body alone, as an empty timestamp would contribute
        let body_only = sign(&key, "", BODY);
        assert!(!verify(&public_hex, Some(""), Some(&body_only), BODY));

        let verifier = Verifier::from_hex(&public_hex).unwrap();
        assert_eq!(
            verifier.check(Some(""), Some(&body_only), BODY),
            Err(VerifyError::MissingTimestamp)
        );
        assert_eq!(
            verifier.check(Some(TIMESTAMP), Some(""), BODY),
            Err(VerifyError::MissingSignature)
        );
    }

    #[test]
    fn test_verify_altered_body_fails() {
        let (key, public_hex) = keypair();
        let sig = sign(&key, TIMESTAMP, BODY);
        assert!(!verify(&public_hex, Some(TIMESTAMP), Some(&sig), r#"{"type":2}"#));

        let verifier = Verifier::from_hex(&public_hex).unwrap();
        assert_eq!(
            verifier.check(Some("1700000001"), Some(&sig), BODY),
            Err(VerifyError::BadSignature)
        );
    }

    #[test]
    fn test_verify_wrong_key_fails() {
        let (key, _) = keypair();
        let other = SigningKey::from_bytes(&[9u8; 32]);
        let other_hex = hex::encode(other.verifying_key().to_bytes());
        let sig = sign(&key, TIMESTAMP, BODY);
        assert!(!verify(&other_hex, Some(TIMESTAMP), Some(&sig), BODY));
    }

    #[test]
    fn test_invalid_encodings_return_false() {
        let (key, public_hex) = keypair();
        let sig = sign(&key, TIMESTAMP, BODY);
        assert!(!verify("zz", Some(TIMESTAMP), Some(&sig), BODY));
        assert!(!verify("abcd", Some(TIMESTAMP), Some(&sig), BODY));
        assert!(!verify(&public_hex, Some(TIMESTAMP), Some("not-hex"), BODY));
        assert!(!verify(&public_hex, Some(TIMESTAMP), Some("abcd"), BODY));

        assert!(matches!(
            Verifier::from_hex("abcd"),
            Err(VerifyError::InvalidPublicKey(_))
        ));
    }

    #[test]
    fn test_freshness_window() {
        let (key, public_hex) = keypair();
        let sig = sign(&key, TIMESTAMP, BODY);
        let verifier = Verifier::from_hex(&public_hex)
            .unwrap()
            .with_max_age(Duration::from_secs(300));

        let signed_at = Duration::from_secs(1_700_000_000);
        assert!(
            verifier
                .check_at(Some(TIMESTAMP), Some(&sig), BODY, signed_at + Duration::from_secs(60))
                .is_ok()
        );
        assert_eq!(
            verifier.check_at(
                Some(TIMESTAMP),
                Some(&sig),
                BODY,
                signed_at + Duration::from_secs(301)
            ),
            Err(VerifyError::StaleTimestamp(TIMESTAMP.to_string()))
        );
        assert_eq!(
            verifier.check_at(Some(TIMESTAMP), Some(&sig), BODY, signed_at - Duration::from_secs(301)),
            Err(VerifyError::StaleTimestamp(TIMESTAMP.to_string()))
        );
    }

    #[test]
    fn test_without_window_old_timestamps_pass() {
        let (key, public_hex) = keypair();
        let sig = sign(&key, "0", BODY);
        let verifier = Verifier::from_hex(&public_hex).unwrap();
        assert!(verifier.verify(Some("0"), Some(&sig), BODY));
        assert!(verifier.max_age().is_none());
    }
}
