use crate::config::{PaymentConfig, Secret};
use crate::domain::payment::{PaymentCallback, signed_payload};
use crate::error::{CoursePayError, Result};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Lowercase hex HMAC-SHA256 of `message` under `secret`.
pub(crate) fn hmac_sha256_hex(secret: &Secret, message: &[u8]) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.expose()).expect("HMAC can take key of any size");
    mac.update(message);
    hex::encode(mac.finalize().into_bytes())
}

/// Constant-time byte comparison. Differing lengths never compare equal.
pub(crate) fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && bool::from(a.ct_eq(b))
}

/// Authorizes payment callbacks before any enrollment is committed.
///
/// The gateway signs `orderId|paymentId` with the shared key secret; the
/// verifier recomputes that signature and compares the hex strings exactly.
/// Every kind of mismatch surfaces as the same `InvalidSignature` error.
#[derive(Clone)]
pub struct SignatureVerifier {
    secret: Secret,
}

impl SignatureVerifier {
    pub fn new(config: &PaymentConfig) -> Self {
        Self {
            secret: config.key_secret.clone(),
        }
    }

    /// Computes the signature the gateway would attach to this payment.
    pub fn sign(&self, order_id: &str, payment_id: &str) -> String {
        hmac_sha256_hex(&self.secret, signed_payload(order_id, payment_id).as_bytes())
    }

    pub fn verify(&self, callback: &PaymentCallback) -> Result<()> {
        let expected = self.sign(&callback.order_id, &callback.payment_id);
        if constant_time_eq(expected.as_bytes(), callback.signature.as_bytes()) {
            Ok(())
        } else {
            Err(CoursePayError::InvalidSignature)
        }
    }
}
