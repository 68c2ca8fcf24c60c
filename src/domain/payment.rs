use super::money::Money;
use crate::error::CoursePayError;
use serde::{Deserialize, Serialize};

/// Order creation request handed to the payment gateway.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct OrderRequest {
    /// Amount in minor currency units.
    pub amount: Money,
    pub currency: String,
    /// Uniqueness token, used by the gateway as receipt/idempotency key.
    pub receipt: String,
}

/// Gateway-issued descriptor of a pending payment.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct OrderDescriptor {
    pub id: String,
    pub amount: Money,
    pub currency: String,
    pub receipt: String,
    pub status: String,
    pub created_at: i64,
}

/// Identifiers the client relays from the gateway after paying.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct PaymentCallback {
    pub order_id: String,
    pub payment_id: String,
    pub signature: String,
}

impl PaymentCallback {
    pub fn new(
        order_id: impl Into<String>,
        payment_id: impl Into<String>,
        signature: impl Into<String>,
    ) -> Self {
        Self {
            order_id: order_id.into(),
            payment_id: payment_id.into(),
            signature: signature.into(),
        }
    }

    /// The message the gateway signs: `orderId|paymentId`.
    pub fn signed_payload(&self) -> String {
        signed_payload(&self.order_id, &self.payment_id)
    }
}

pub fn signed_payload(order_id: &str, payment_id: &str) -> String {
    format!("{order_id}|{payment_id}")
}

/// Lifecycle of a single purchase.
///
/// `Enrolled` and `Failed` are terminal. `Failed` can be entered from any
/// non-terminal state.
#[derive(Debug, Serialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum EnrollmentState {
    OrderRequested,
    SignatureVerified,
    Enrolling,
    Enrolled,
    Failed,
}

impl EnrollmentState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, EnrollmentState::Enrolled | EnrollmentState::Failed)
    }

    pub fn transition(self, next: EnrollmentState) -> Result<Self, CoursePayError> {
        use EnrollmentState::*;

        let allowed = match (self, next) {
            (OrderRequested, SignatureVerified) => true,
            (SignatureVerified, Enrolling) => true,
            (Enrolling, Enrolled) => true,
            (from, Failed) => !from.is_terminal(),
            _ => false,
        };

        if allowed {
            Ok(next)
        } else {
            Err(CoursePayError::internal(format!(
                "illegal enrollment transition {self:?} -> {next:?}"
            )))
        }
    }
}
