use chrono::Utc;
use ring::hmac;
use thiserror::Error;

/// Maximum age of a signed webhook delivery, in seconds
pub const SIGNATURE_TOLERANCE_SECS: i64 = 300;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum WebhookError {
    #[error("missing Stripe-Signature header")]
    MissingSignature,
    #[error("webhook signing secret is not configured")]
    NotConfigured,
    #[error("malformed signature header")]
    MalformedSignature,
    #[error("signature timestamp outside tolerance")]
    Expired,
    #[error("signature mismatch")]
    Mismatch,
    #[error("invalid event payload: {0}")]
    InvalidPayload(String),
}

/// Verifies `Stripe-Signature` headers of the form `t=<unix>,v1=<hex>`.
///
/// The signed payload is `"{t}.{body}"` under HMAC-SHA256 with the endpoint secret.
pub struct WebhookSignatureValidator {
    signing_secret: Option<String>,
    tolerance_secs: i64,
}

impl WebhookSignatureValidator {
    pub fn new(signing_secret: Option<String>) -> Self {
        Self {
            signing_secret: signing_secret.filter(|s| !s.is_empty()),
            tolerance_secs: SIGNATURE_TOLERANCE_SECS,
        }
    }

    /// Validate against the current clock
    pub fn verify(&self, signature_header: Option<&str>, body: &[u8]) -> Result<(), WebhookError> {
        self.verify_at(signature_header, body, Utc::now().timestamp())
    }

    pub fn verify_at(
        &self,
        signature_header: Option<&str>,
        body: &[u8],
        now: i64,
    ) -> Result<(), WebhookError> {
        let secret = self.signing_secret.as_deref().ok_or(WebhookError::NotConfigured)?;
        let header = signature_header.ok_or(WebhookError::MissingSignature)?;

        let mut timestamp = None;
        let mut signatures = Vec::new();
        for part in header.split(',') {
            match part.trim().split_once('=') {
                Some(("t", value)) => timestamp = value.parse::<i64>().ok(),
                Some(("v1", value)) => signatures.push(value),
                _ => {}
            }
        }

        let timestamp = timestamp.ok_or(WebhookError::MalformedSignature)?;
        if signatures.is_empty() {
            return Err(WebhookError::MalformedSignature);
        }
        if (now - timestamp).abs() > self.tolerance_secs {
            return Err(WebhookError::Expired);
        }

        let expected = compute_signature(secret, timestamp, body);
        // Any of the listed v1 signatures may match (secret rotation)
        let matched = signatures.iter().any(|candidate| {
            subtle::ConstantTimeEq::ct_eq(candidate.as_bytes(), expected.as_bytes()).into()
        });

        if matched {
            Ok(())
        } else {
            Err(WebhookError::Mismatch)
        }
    }
}

/// Hex HMAC-SHA256 of `"{timestamp}.{body}"`
pub fn compute_signature(secret: &str, timestamp: i64, body: &[u8]) -> String {
    let key = hmac::Key::new(hmac::HMAC_SHA256, secret.as_bytes());
    let mut ctx = hmac::Context::with_key(&key);
    ctx.update(timestamp.to_string().as_bytes());
    ctx.update(b".");
    ctx.update(body);
    hex::encode(ctx.sign().as_ref())
}

/// Build a complete header value, as the billing provider would send it
pub fn signature_header(secret: &str, timestamp: i64, body: &[u8]) -> String {
    format!("t={},v1={}", timestamp, compute_signature(secret, timestamp, body))
}
