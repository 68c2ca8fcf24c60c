use crate::domain::payment::{OrderDescriptor, OrderRequest};
use crate::domain::ports::PaymentGateway;
use crate::error::{CoursePayError, Result};
use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;
use uuid::Uuid;

/// A payment gateway that issues orders locally.
///
/// Order ids follow the `order_<hex>` shape real gateways use. Suitable for
/// development and tests; payments against these orders are signed with the
/// configured key secret (see the `sign-payment` command).
#[derive(Debug, Default, Clone)]
pub struct LocalGateway;

impl LocalGateway {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PaymentGateway for LocalGateway {
    async fn create_order(&self, request: OrderRequest) -> Result<OrderDescriptor> {
        if request.amount.is_zero() {
            return Err(CoursePayError::GatewayError(
                "order amount must be positive".to_string(),
            ));
        }

        let order = OrderDescriptor {
            id: format!("order_{}", Uuid::new_v4().simple()),
            amount: request.amount,
            currency: request.currency,
            receipt: request.receipt,
            status: "created".to_string(),
            created_at: Utc::now().timestamp(),
        };
        debug!(order_id = %order.id, amount = %order.amount, "Issued local order");
        Ok(order)
    }
}
