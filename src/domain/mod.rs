//! Domain types and the ports through which the application layer reaches
//! storage, the payment gateway and the mail transport.

pub mod course;
pub mod money;
pub mod notification;
pub mod payment;
pub mod ports;
pub mod progress;
pub mod user;
