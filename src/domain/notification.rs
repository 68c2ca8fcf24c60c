use super::money::Money;
use serde::{Deserialize, Serialize};

/// A rendered transactional email.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Email {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// Messages the notification worker knows how to deliver.
#[derive(Debug, PartialEq, Clone)]
pub enum Notification {
    CourseEnrollment {
        to: String,
        course_name: String,
        first_name: String,
    },
    PaymentReceived {
        to: String,
        full_name: String,
        amount: Money,
        order_id: String,
        payment_id: String,
    },
}

impl Notification {
    pub fn recipient(&self) -> &str {
        match self {
            Notification::CourseEnrollment { to, .. } => to,
            Notification::PaymentReceived { to, .. } => to,
        }
    }

    pub fn render(&self) -> Email {
        match self {
            Notification::CourseEnrollment {
                to,
                course_name,
                first_name,
            } => Email {
                to: to.clone(),
                subject: format!("Successfully Enrolled into {course_name}"),
                html: format!(
                    "<p>Dear {first_name},</p>\
                     <p>You have successfully registered for <b>{course_name}</b>.</p>"
                ),
            },
            Notification::PaymentReceived {
                to,
                full_name,
                amount,
                order_id,
                payment_id,
            } => Email {
                to: to.clone(),
                subject: "Payment Received".to_string(),
                html: format!(
                    "<p>Dear {full_name},</p>\
                     <p>We have received a payment of <b>{amount}</b>.</p>\
                     <p>Order ID: {order_id}<br/>Payment ID: {payment_id}</p>"
                ),
            },
        }
    }
}
