use crate::domain::course::CourseId;
use crate::domain::user::UserId;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoursePayError {
    #[error("{0}")]
    ValidationError(String),
    #[error("Course not found: {0}")]
    CourseNotFound(CourseId),
    #[error("User not found: {0}")]
    UserNotFound(UserId),
    #[error("Lesson not found: {0}")]
    LessonNotFound(String),
    #[error("You are already enrolled in course {0}")]
    AlreadyEnrolled(CourseId),
    #[error("Enrollment record already exists for user {user} in course {course}")]
    DuplicateEnrollment { user: UserId, course: CourseId },
    #[error("You are not enrolled in course {0}")]
    NotEnrolled(CourseId),
    #[error("Payment verification failed: invalid signature")]
    InvalidSignature,
    #[error("Payment gateway error: {0}")]
    GatewayError(String),
    #[error("Notification failed: {0}")]
    NotificationError(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("{0}")]
    Forbidden(String),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[cfg(feature = "storage-rocksdb")]
    #[error("Storage error: {0}")]
    StorageError(#[from] rocksdb::Error),
    #[error("Internal error: {0}")]
    InternalError(Box<dyn std::error::Error + Send + Sync>),
}

impl CoursePayError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::ValidationError(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::InternalError(Box::new(std::io::Error::other(message.into())))
    }
}

pub type Result<T> = std::result::Result<T, CoursePayError>;
