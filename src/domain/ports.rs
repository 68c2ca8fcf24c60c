use super::course::{Course, CourseId};
use super::notification::Email;
use super::payment::{OrderDescriptor, OrderRequest};
use super::progress::CourseProgress;
use super::user::{UserId, UserProfile};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

#[async_trait]
pub trait CourseStore: Send + Sync {
    async fn store(&self, course: Course) -> Result<()>;
    async fn get(&self, course_id: &CourseId) -> Result<Option<Course>>;
    /// Atomically adds `user` to the course's enrolled list.
    /// Returns the updated course, or `None` if the course does not exist.
    async fn enroll_student(&self, course_id: &CourseId, user: &UserId) -> Result<Option<Course>>;
    async fn by_instructor(&self, instructor: &UserId) -> Result<Vec<Course>>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn store(&self, user: UserProfile) -> Result<()>;
    async fn get(&self, user_id: &UserId) -> Result<Option<UserProfile>>;
    /// Atomically appends the course and progress references to the profile.
    /// Returns the updated profile, or `None` if the user does not exist.
    async fn add_enrollment(
        &self,
        user_id: &UserId,
        course_id: &CourseId,
        progress_id: Uuid,
    ) -> Result<Option<UserProfile>>;
}

#[async_trait]
pub trait ProgressStore: Send + Sync {
    /// Inserts a new record. Fails with `DuplicateEnrollment` if a record for
    /// the same (user, course) pair already exists.
    async fn create(&self, progress: CourseProgress) -> Result<()>;
    /// Replaces an existing record.
    async fn update(&self, progress: CourseProgress) -> Result<()>;
    async fn find(&self, user_id: &UserId, course_id: &CourseId) -> Result<Option<CourseProgress>>;
    async fn count(&self) -> Result<usize>;
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn create_order(&self, request: OrderRequest) -> Result<OrderDescriptor>;
}

#[async_trait]
pub trait MailTransport: Send + Sync {
    /// Delivers the email and returns the transport's message id.
    async fn send(&self, email: &Email) -> Result<String>;
}

pub type SharedCourseStore = Arc<dyn CourseStore>;
pub type SharedUserStore = Arc<dyn UserStore>;
pub type SharedProgressStore = Arc<dyn ProgressStore>;
pub type SharedPaymentGateway = Arc<dyn PaymentGateway>;
pub type MailTransportBox = Box<dyn MailTransport>;
