use super::course::CourseId;
use super::user::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Per-(user, course) enrollment record tracking completed lessons.
///
/// Stores guarantee at most one record per (user, course) pair.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct CourseProgress {
    pub id: Uuid,
    pub user: UserId,
    pub course: CourseId,
    #[serde(default)]
    pub completed_lessons: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, PartialEq, Eq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum LessonCompletion {
    Created,
    Updated,
    AlreadyCompleted,
}

impl CourseProgress {
    pub fn new(user: UserId, course: CourseId) -> Self {
        Self {
            id: Uuid::new_v4(),
            user,
            course,
            completed_lessons: Vec::new(),
            created_at: Utc::now(),
        }
    }

    /// Marks a lesson as completed. Completing it twice is not an error.
    pub fn complete(&mut self, lesson: &str) -> LessonCompletion {
        if self.completed_lessons.iter().any(|l| l == lesson) {
            return LessonCompletion::AlreadyCompleted;
        }
        self.completed_lessons.push(lesson.to_string());
        LessonCompletion::Updated
    }

    pub fn completed_count(&self) -> usize {
        self.completed_lessons.len()
    }
}
