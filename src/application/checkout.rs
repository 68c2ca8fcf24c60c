use super::enrollment::{CourseOutcome, EnrollmentReport, EnrollmentWriter};
use super::notification::NotificationSender;
use super::order::OrderPreparer;
use super::signature::SignatureVerifier;
use crate::domain::course::CourseId;
use crate::domain::money::Money;
use crate::domain::notification::Notification;
use crate::domain::payment::{EnrollmentState, OrderDescriptor, PaymentCallback};
use crate::domain::ports::SharedUserStore;
use crate::domain::user::UserId;
use crate::error::{CoursePayError, Result};
use tracing::{debug, info, warn};

/// Orchestrates a purchase: order capture, callback verification,
/// enrollment and confirmation emails.
pub struct CheckoutService {
    preparer: OrderPreparer,
    verifier: SignatureVerifier,
    writer: EnrollmentWriter,
    users: SharedUserStore,
    notifier: NotificationSender,
}

impl CheckoutService {
    pub fn new(
        preparer: OrderPreparer,
        verifier: SignatureVerifier,
        writer: EnrollmentWriter,
        users: SharedUserStore,
        notifier: NotificationSender,
    ) -> Self {
        Self {
            preparer,
            verifier,
            writer,
            users,
            notifier,
        }
    }

    pub async fn capture(&self, user: &UserId, courses: &[CourseId]) -> Result<OrderDescriptor> {
        self.preparer.prepare(user, courses).await
    }

    /// Verifies the gateway callback and enrolls `user` into `courses`.
    ///
    /// Nothing is written unless the signature checks out. The returned report
    /// may contain per-course failures; callers decide how to surface them.
    pub async fn verify(
        &self,
        user: &UserId,
        callback: &PaymentCallback,
        courses: &[CourseId],
    ) -> Result<EnrollmentReport> {
        if courses.is_empty() {
            return Err(CoursePayError::validation(
                "Payment verification failed: missing fields",
            ));
        }

        let mut state = EnrollmentState::OrderRequested;

        if let Err(e) = self.verifier.verify(callback) {
            warn!(user = %user, order_id = %callback.order_id, "Rejected payment callback");
            advance(&mut state, EnrollmentState::Failed)?;
            return Err(e);
        }
        advance(&mut state, EnrollmentState::SignatureVerified)?;
        advance(&mut state, EnrollmentState::Enrolling)?;

        let report = match self.writer.enroll(user, courses).await {
            Ok(report) => report,
            Err(e) => {
                advance(&mut state, EnrollmentState::Failed)?;
                return Err(e);
            }
        };

        for outcome in &report.outcomes {
            if let CourseOutcome::Enrolled { course_name, .. } = outcome {
                self.notifier.notify(Notification::CourseEnrollment {
                    to: report.user.email.clone(),
                    course_name: course_name.clone(),
                    first_name: report.user.first_name.clone(),
                });
            }
        }

        if report.is_complete() {
            advance(&mut state, EnrollmentState::Enrolled)?;
            info!(user = %user, order_id = %callback.order_id, "Payment verified");
        } else {
            advance(&mut state, EnrollmentState::Failed)?;
            warn!(
                user = %user,
                order_id = %callback.order_id,
                failed = report.failures().count(),
                "Payment verified but enrollment partially failed"
            );
        }

        Ok(report)
    }

    /// Queues a payment receipt email for `user`.
    pub async fn send_payment_success_email(
        &self,
        user_id: &UserId,
        order_id: &str,
        payment_id: &str,
        amount: Money,
    ) -> Result<()> {
        if order_id.is_empty() || payment_id.is_empty() || amount.is_zero() {
            return Err(CoursePayError::validation(
                "Please provide all required fields",
            ));
        }

        let user = self
            .users
            .get(user_id)
            .await?
            .ok_or_else(|| CoursePayError::UserNotFound(user_id.clone()))?;

        self.notifier.notify(Notification::PaymentReceived {
            to: user.email.clone(),
            full_name: user.full_name(),
            amount,
            order_id: order_id.to_string(),
            payment_id: payment_id.to_string(),
        });
        Ok(())
    }
}

fn advance(state: &mut EnrollmentState, next: EnrollmentState) -> Result<()> {
    *state = state.transition(next)?;
    debug!(state = ?state, "Enrollment state changed");
    Ok(())
}
