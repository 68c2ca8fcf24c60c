use crate::domain::course::CourseId;
use crate::domain::money::Money;
use crate::domain::ports::{SharedCourseStore, SharedProgressStore, SharedUserStore};
use crate::domain::user::UserId;
use crate::error::{CoursePayError, Result};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;
use tracing::warn;

#[derive(Debug, Serialize, PartialEq, Clone)]
pub struct EnrolledCourse {
    pub course_id: CourseId,
    pub course_name: String,
    pub total_lessons: usize,
    pub completed_lessons: usize,
    /// Percentage rounded to two decimals; 100 for a course without lessons.
    pub progress_percentage: Decimal,
}

#[derive(Debug, Serialize, PartialEq, Clone)]
pub struct CourseStats {
    pub course_id: CourseId,
    pub course_name: String,
    pub total_students_enrolled: usize,
    pub total_amount_generated: Money,
}

/// Read-side views over a user's purchases.
pub struct ProfileService {
    courses: SharedCourseStore,
    users: SharedUserStore,
    progress: SharedProgressStore,
}

impl ProfileService {
    pub fn new(courses: SharedCourseStore, users: SharedUserStore, progress: SharedProgressStore) -> Self {
        Self {
            courses,
            users,
            progress,
        }
    }

    pub async fn enrolled_courses(&self, user_id: &UserId) -> Result<Vec<EnrolledCourse>> {
        let user = self
            .users
            .get(user_id)
            .await?
            .ok_or_else(|| CoursePayError::UserNotFound(user_id.clone()))?;

        let mut enrolled = Vec::with_capacity(user.courses.len());
        for course_id in &user.courses {
            let Some(course) = self.courses.get(course_id).await? else {
                warn!(user = %user_id, course = %course_id, "Profile references a missing course");
                continue;
            };

            let completed = self
                .progress
                .find(user_id, course_id)
                .await?
                .map(|p| p.completed_count())
                .unwrap_or(0);

            enrolled.push(EnrolledCourse {
                course_id: course.id,
                course_name: course.name,
                total_lessons: course.lessons.len(),
                completed_lessons: completed,
                progress_percentage: percentage(completed, course.lessons.len()),
            });
        }
        Ok(enrolled)
    }

    pub async fn instructor_dashboard(&self, instructor: &UserId) -> Result<Vec<CourseStats>> {
        let courses = self.courses.by_instructor(instructor).await?;
        courses
            .into_iter()
            .map(|course| {
                let revenue = course
                    .revenue()
                    .ok_or_else(|| CoursePayError::internal("course revenue overflow"))?;
                Ok(CourseStats {
                    total_students_enrolled: course.students_enrolled.len(),
                    total_amount_generated: revenue,
                    course_id: course.id,
                    course_name: course.name,
                })
            })
            .collect()
    }
}

fn percentage(completed: usize, total: usize) -> Decimal {
    if total == 0 {
        return dec!(100);
    }
    (Decimal::from(completed as u64) * dec!(100) / Decimal::from(total as u64)).round_dp(2)
}
