use crate::config::PaymentConfig;
use crate::domain::course::CourseId;
use crate::domain::money::Money;
use crate::domain::payment::{OrderDescriptor, OrderRequest};
use crate::domain::ports::{SharedCourseStore, SharedPaymentGateway};
use crate::domain::user::UserId;
use crate::error::{CoursePayError, Result};
use std::collections::HashSet;
use tracing::{info, warn};
use uuid::Uuid;

/// Prices a basket of courses and opens a gateway order for it.
///
/// Every course is validated before the gateway is contacted, so a rejected
/// basket never creates an order.
pub struct OrderPreparer {
    courses: SharedCourseStore,
    gateway: SharedPaymentGateway,
    currency: String,
}

impl OrderPreparer {
    pub fn new(courses: SharedCourseStore, gateway: SharedPaymentGateway, config: &PaymentConfig) -> Self {
        Self {
            courses,
            gateway,
            currency: config.currency.clone(),
        }
    }

    /// Sums the price of `course_ids` for `user`.
    ///
    /// Fails with `CourseNotFound` for an unknown course and `AlreadyEnrolled`
    /// if the user already bought one of them.
    pub async fn quote(&self, user: &UserId, course_ids: &[CourseId]) -> Result<Money> {
        if course_ids.is_empty() {
            return Err(CoursePayError::validation(
                "Please provide at least one course ID",
            ));
        }

        let mut seen = HashSet::with_capacity(course_ids.len());
        let mut total = Money::ZERO;

        for course_id in course_ids {
            if !seen.insert(course_id) {
                return Err(CoursePayError::validation(format!(
                    "Duplicate course ID in request: {course_id}"
                )));
            }

            let course = self
                .courses
                .get(course_id)
                .await?
                .ok_or_else(|| CoursePayError::CourseNotFound(course_id.clone()))?;

            if course.is_enrolled(user) {
                return Err(CoursePayError::AlreadyEnrolled(course_id.clone()));
            }

            total = total
                .checked_add(course.price)
                .ok_or_else(|| CoursePayError::validation("Order total is out of range"))?;
        }

        Ok(total)
    }

    /// Validates the basket and asks the gateway for an order covering it.
    pub async fn prepare(&self, user: &UserId, course_ids: &[CourseId]) -> Result<OrderDescriptor> {
        let total = self.quote(user, course_ids).await?;
        if total.is_zero() {
            return Err(CoursePayError::validation(
                "Order total must be greater than zero",
            ));
        }

        let request = OrderRequest {
            amount: total,
            currency: self.currency.clone(),
            receipt: format!("rcpt_{}", Uuid::new_v4().simple()),
        };

        match self.gateway.create_order(request).await {
            Ok(order) => {
                info!(user = %user, order_id = %order.id, amount = %order.amount, "Order created");
                Ok(order)
            }
            Err(e) => {
                warn!(user = %user, error = %e, "Order creation failed");
                Err(match e {
                    CoursePayError::GatewayError(_) => e,
                    other => CoursePayError::GatewayError(other.to_string()),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Secret;
    use crate::domain::course::Course;
    use crate::domain::ports::CourseStore;
    use crate::infrastructure::gateway::LocalGateway;
    use crate::infrastructure::in_memory::InMemoryCourseStore;
    use std::sync::Arc;

    async fn preparer() -> (OrderPreparer, InMemoryCourseStore) {
        let store = InMemoryCourseStore::new();
        for (id, price) in [("a", 500), ("b", 1500), ("free", 0)] {
            store
                .store(Course::new(
                    CourseId::new(id),
                    id,
                    Money::from_minor(price),
                    UserId::new("i1"),
                ))
                .await
                .unwrap();
        }
        let config = PaymentConfig::new(Secret::new("s"), "INR");
        let preparer = OrderPreparer::new(Arc::new(store.clone()), Arc::new(LocalGateway::new()), &config);
        (preparer, store)
    }

    #[tokio::test]
    async fn test_quote_sums_prices() {
        let (preparer, _) = preparer().await;
        let total = preparer
            .quote(&UserId::new("u1"), &[CourseId::new("a"), CourseId::new("b")])
            .await
            .unwrap();
        assert_eq!(total, Money::from_minor(2000));
    }

    #[tokio::test]
    async fn test_prepare_uses_configured_currency() {
        let (preparer, _) = preparer().await;
        let order = preparer
            .prepare(&UserId::new("u1"), &[CourseId::new("a")])
            .await
            .unwrap();
        assert_eq!(order.currency, "INR");
        assert_eq!(order.amount, Money::from_minor(500));
        assert!(order.receipt.starts_with("rcpt_"));
    }

    #[tokio::test]
    async fn test_rejects_empty_and_duplicate_lists() {
        let (preparer, _) = preparer().await;
        let user = UserId::new("u1");

        assert!(matches!(
            preparer.quote(&user, &[]).await,
            Err(CoursePayError::ValidationError(_))
        ));
        assert!(matches!(
            preparer
                .quote(&user, &[CourseId::new("a"), CourseId::new("a")])
                .await,
            Err(CoursePayError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_rejects_unknown_course() {
        let (preparer, _) = preparer().await;
        let result = preparer
            .quote(&UserId::new("u1"), &[CourseId::new("a"), CourseId::new("nope")])
            .await;
        assert!(matches!(result, Err(CoursePayError::CourseNotFound(id)) if id.as_str() == "nope"));
    }

    #[tokio::test]
    async fn test_rejects_already_enrolled() {
        let (preparer, store) = preparer().await;
        let user = UserId::new("u1");
        store.enroll_student(&CourseId::new("b"), &user).await.unwrap();

        let result = preparer
            .prepare(&user, &[CourseId::new("a"), CourseId::new("b")])
            .await;
        assert!(matches!(result, Err(CoursePayError::AlreadyEnrolled(id)) if id.as_str() == "b"));
    }

    #[tokio::test]
    async fn test_rejects_zero_total() {
        let (preparer, _) = preparer().await;
        let result = preparer
            .prepare(&UserId::new("u1"), &[CourseId::new("free")])
            .await;
        assert!(matches!(result, Err(CoursePayError::ValidationError(_))));
    }
}
