//! Application layer containing the purchase and learning flows.
//!
//! `CheckoutService` is the primary entry point: it chains the
//! `OrderPreparer`, the `SignatureVerifier` and the `EnrollmentWriter`, and
//! hands confirmation emails to the `NotificationSender` worker over a
//! `tokio` channel.

pub mod checkout;
pub mod enrollment;
pub mod notification;
pub mod order;
pub mod profile;
pub mod progress;
pub mod signature;
