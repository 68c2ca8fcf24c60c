use crate::domain::course::CourseId;
use crate::domain::ports::{SharedCourseStore, SharedProgressStore, SharedUserStore};
use crate::domain::progress::{CourseProgress, LessonCompletion};
use crate::domain::user::UserId;
use crate::error::{CoursePayError, Result};
use tracing::info;

/// Records lesson completions for enrolled learners.
pub struct ProgressTracker {
    courses: SharedCourseStore,
    users: SharedUserStore,
    progress: SharedProgressStore,
}

impl ProgressTracker {
    pub fn new(courses: SharedCourseStore, users: SharedUserStore, progress: SharedProgressStore) -> Self {
        Self {
            courses,
            users,
            progress,
        }
    }

    /// Marks `lesson` of `course_id` as completed by `user`.
    ///
    /// A missing progress record for an enrolled user is recreated on the fly
    /// and linked from the user's profile, which repairs enrollments
    /// interrupted between the student append and the record creation.
    pub async fn complete_lesson(
        &self,
        user: &UserId,
        course_id: &CourseId,
        lesson: &str,
    ) -> Result<LessonCompletion> {
        if lesson.is_empty() {
            return Err(CoursePayError::validation("Lesson ID is required"));
        }

        let course = self
            .courses
            .get(course_id)
            .await?
            .ok_or_else(|| CoursePayError::CourseNotFound(course_id.clone()))?;

        if !course.has_lesson(lesson) {
            return Err(CoursePayError::LessonNotFound(lesson.to_string()));
        }
        if !course.is_enrolled(user) {
            return Err(CoursePayError::NotEnrolled(course_id.clone()));
        }

        let mut progress = match self.progress.find(user, course_id).await? {
            Some(progress) => progress,
            None => {
                let mut fresh = CourseProgress::new(user.clone(), course_id.clone());
                fresh.complete(lesson);
                let fresh_id = fresh.id;
                match self.progress.create(fresh).await {
                    Ok(()) => {
                        self.users
                            .add_enrollment(user, course_id, fresh_id)
                            .await?
                            .ok_or_else(|| CoursePayError::UserNotFound(user.clone()))?;
                        info!(user = %user, course = %course_id, lesson, "Course progress created");
                        return Ok(LessonCompletion::Created);
                    }
                    // Lost the race against a concurrent first completion.
                    Err(CoursePayError::DuplicateEnrollment { .. }) => self
                        .progress
                        .find(user, course_id)
                        .await?
                        .ok_or_else(|| {
                            CoursePayError::internal(format!(
                                "progress record for {user} in {course_id} is indexed but missing"
                            ))
                        })?,
                    Err(e) => return Err(e),
                }
            }
        };

        let completion = progress.complete(lesson);
        if completion == LessonCompletion::Updated {
            self.progress.update(progress).await?;
            info!(user = %user, course = %course_id, lesson, "Lesson completed");
        }
        Ok(completion)
    }
}
