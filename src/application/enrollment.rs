use crate::domain::course::CourseId;
use crate::domain::ports::{SharedCourseStore, SharedProgressStore, SharedUserStore};
use crate::domain::progress::CourseProgress;
use crate::domain::user::{UserId, UserProfile};
use crate::error::{CoursePayError, Result};
use tracing::{info, warn};
use uuid::Uuid;

/// Result of enrolling a user into one course.
#[derive(Debug)]
pub enum CourseOutcome {
    Enrolled {
        course: CourseId,
        course_name: String,
        progress: Uuid,
    },
    /// A progress record for the pair already existed (e.g. a client retry).
    AlreadyEnrolled { course: CourseId },
    Failed {
        course: CourseId,
        error: CoursePayError,
    },
}

impl CourseOutcome {
    pub fn course(&self) -> &CourseId {
        match self {
            CourseOutcome::Enrolled { course, .. } => course,
            CourseOutcome::AlreadyEnrolled { course } => course,
            CourseOutcome::Failed { course, .. } => course,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, CourseOutcome::Failed { .. })
    }
}

/// Per-course results of one enrollment call.
///
/// Courses are processed in order and independently: a failure on one course
/// leaves the courses before and after it committed.
#[derive(Debug)]
pub struct EnrollmentReport {
    /// The user's profile after the last successful append.
    pub user: UserProfile,
    pub outcomes: Vec<CourseOutcome>,
}

impl EnrollmentReport {
    pub fn is_complete(&self) -> bool {
        !self.outcomes.iter().any(CourseOutcome::is_failure)
    }

    /// Courses the user is enrolled in after this call, new or pre-existing.
    pub fn enrolled(&self) -> impl Iterator<Item = &CourseId> {
        self.outcomes
            .iter()
            .filter(|o| !o.is_failure())
            .map(CourseOutcome::course)
    }

    pub fn failures(&self) -> impl Iterator<Item = (&CourseId, &CoursePayError)> {
        self.outcomes.iter().filter_map(|o| match o {
            CourseOutcome::Failed { course, error } => Some((course, error)),
            _ => None,
        })
    }

    pub fn first_failure(&self) -> Option<(&CourseId, &CoursePayError)> {
        self.failures().next()
    }
}

/// Commits enrollment state for courses a user has paid for.
pub struct EnrollmentWriter {
    courses: SharedCourseStore,
    users: SharedUserStore,
    progress: SharedProgressStore,
}

impl EnrollmentWriter {
    pub fn new(courses: SharedCourseStore, users: SharedUserStore, progress: SharedProgressStore) -> Self {
        Self {
            courses,
            users,
            progress,
        }
    }

    /// Enrolls `user` into every course in `course_ids`.
    ///
    /// Fails outright only when the user does not exist or storage breaks
    /// before any course is touched; per-course problems are reported in the
    /// returned `EnrollmentReport`.
    pub async fn enroll(&self, user_id: &UserId, course_ids: &[CourseId]) -> Result<EnrollmentReport> {
        let mut user = self
            .users
            .get(user_id)
            .await?
            .ok_or_else(|| CoursePayError::UserNotFound(user_id.clone()))?;

        let mut outcomes = Vec::with_capacity(course_ids.len());
        for course_id in course_ids {
            let outcome = match self.enroll_one(user_id, course_id).await {
                Ok(Step::Created {
                    profile,
                    course_name,
                    progress,
                }) => {
                    user = profile;
                    info!(user = %user_id, course = %course_id, progress = %progress, "Student enrolled");
                    CourseOutcome::Enrolled {
                        course: course_id.clone(),
                        course_name,
                        progress,
                    }
                }
                Ok(Step::Existing { profile }) => {
                    user = profile;
                    info!(user = %user_id, course = %course_id, "Already enrolled, skipping");
                    CourseOutcome::AlreadyEnrolled {
                        course: course_id.clone(),
                    }
                }
                Err(error) => {
                    warn!(user = %user_id, course = %course_id, error = %error, "Enrollment failed");
                    CourseOutcome::Failed {
                        course: course_id.clone(),
                        error,
                    }
                }
            };
            outcomes.push(outcome);
        }

        Ok(EnrollmentReport { user, outcomes })
    }

    async fn enroll_one(&self, user_id: &UserId, course_id: &CourseId) -> Result<Step> {
        let course = self
            .courses
            .enroll_student(course_id, user_id)
            .await?
            .ok_or_else(|| CoursePayError::CourseNotFound(course_id.clone()))?;

        let progress = CourseProgress::new(user_id.clone(), course_id.clone());
        let progress_id = progress.id;
        match self.progress.create(progress).await {
            Ok(()) => {}
            Err(CoursePayError::DuplicateEnrollment { .. }) => {
                // An earlier attempt may have stopped before the profile append.
                let existing = self
                    .progress
                    .find(user_id, course_id)
                    .await?
                    .ok_or_else(|| {
                        CoursePayError::internal(format!(
                            "progress record for {user_id} in {course_id} is indexed but missing"
                        ))
                    })?;
                let profile = self.append_to_profile(user_id, course_id, existing.id).await?;
                return Ok(Step::Existing { profile });
            }
            Err(e) => return Err(e),
        }

        let profile = self.append_to_profile(user_id, course_id, progress_id).await?;
        Ok(Step::Created {
            profile,
            course_name: course.name,
            progress: progress_id,
        })
    }

    async fn append_to_profile(
        &self,
        user_id: &UserId,
        course_id: &CourseId,
        progress_id: Uuid,
    ) -> Result<UserProfile> {
        self.users
            .add_enrollment(user_id, course_id, progress_id)
            .await?
            .ok_or_else(|| CoursePayError::UserNotFound(user_id.clone()))
    }
}

enum Step {
    Created {
        profile: UserProfile,
        course_name: String,
        progress: Uuid,
    },
    /// A record for the pair already existed; the profile now references it.
    Existing { profile: UserProfile },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::course::Course;
    use crate::domain::money::Money;
    use crate::domain::ports::{CourseStore, ProgressStore, UserStore};
    use crate::domain::user::AccountType;
    use crate::infrastructure::in_memory::{
        InMemoryCourseStore, InMemoryProgressStore, InMemoryUserStore,
    };
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct Fixture {
        writer: EnrollmentWriter,
        courses: InMemoryCourseStore,
        progress: InMemoryProgressStore,
    }

    async fn fixture() -> Fixture {
        let courses = InMemoryCourseStore::new();
        let users = InMemoryUserStore::new();
        let progress = InMemoryProgressStore::new();

        for id in ["a", "b"] {
            courses
                .store(Course::new(CourseId::new(id), id, Money::from_minor(500), UserId::new("i1")))
                .await
                .unwrap();
        }
        users
            .store(UserProfile::new(UserId::new("u1"), "a@b.c", "Ada", "L", AccountType::Student))
            .await
            .unwrap();

        let writer = EnrollmentWriter::new(
            Arc::new(courses.clone()),
            Arc::new(users),
            Arc::new(progress.clone()),
        );
        Fixture {
            writer,
            courses,
            progress,
        }
    }

    #[tokio::test]
    async fn test_enrolls_every_course() {
        let f = fixture().await;
        let report = f
            .writer
            .enroll(&UserId::new("u1"), &[CourseId::new("a"), CourseId::new("b")])
            .await
            .unwrap();

        assert!(report.is_complete());
        assert_eq!(report.user.courses, vec![CourseId::new("a"), CourseId::new("b")]);
        assert_eq!(report.user.course_progress.len(), 2);
        assert_eq!(f.progress.count().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_retry_is_idempotent() {
        let f = fixture().await;
        let user = UserId::new("u1");
        let courses = [CourseId::new("a")];

        f.writer.enroll(&user, &courses).await.unwrap();
        let report = f.writer.enroll(&user, &courses).await.unwrap();

        assert!(report.is_complete());
        assert!(matches!(report.outcomes[0], CourseOutcome::AlreadyEnrolled { .. }));
        assert_eq!(f.progress.count().await.unwrap(), 1);
        assert_eq!(report.user.courses.len(), 1);

        let course = f.courses.get(&CourseId::new("a")).await.unwrap().unwrap();
        assert_eq!(course.students_enrolled, vec![user]);
    }

    #[tokio::test]
    async fn test_missing_course_does_not_stop_the_rest() {
        let f = fixture().await;
        let report = f
            .writer
            .enroll(
                &UserId::new("u1"),
                &[CourseId::new("ghost"), CourseId::new("b")],
            )
            .await
            .unwrap();

        assert!(!report.is_complete());
        let (course, error) = report.first_failure().unwrap();
        assert_eq!(course.as_str(), "ghost");
        assert!(matches!(error, CoursePayError::CourseNotFound(_)));
        assert_eq!(report.enrolled().collect::<Vec<_>>(), vec![&CourseId::new("b")]);
    }

    #[tokio::test]
    async fn test_unknown_user_touches_nothing() {
        let f = fixture().await;
        let result = f
            .writer
            .enroll(&UserId::new("ghost"), &[CourseId::new("a")])
            .await;

        assert!(matches!(result, Err(CoursePayError::UserNotFound(_))));
        let course = f.courses.get(&CourseId::new("a")).await.unwrap().unwrap();
        assert!(course.students_enrolled.is_empty());
        assert_eq!(f.progress.count().await.unwrap(), 0);
    }

    /// User store whose first `add_enrollment` fails after nothing was written.
    struct FlakyUsers {
        inner: InMemoryUserStore,
        failed: AtomicBool,
    }

    #[async_trait]
    impl UserStore for FlakyUsers {
        async fn store(&self, user: UserProfile) -> Result<()> {
            self.inner.store(user).await
        }

        async fn get(&self, user_id: &UserId) -> Result<Option<UserProfile>> {
            self.inner.get(user_id).await
        }

        async fn add_enrollment(
            &self,
            user_id: &UserId,
            course_id: &CourseId,
            progress_id: Uuid,
        ) -> Result<Option<UserProfile>> {
            if !self.failed.swap(true, Ordering::SeqCst) {
                return Err(CoursePayError::internal("disk hiccup"));
            }
            self.inner.add_enrollment(user_id, course_id, progress_id).await
        }
    }

    #[tokio::test]
    async fn test_retry_repairs_interrupted_profile_append() {
        let courses = InMemoryCourseStore::new();
        courses
            .store(Course::new(CourseId::new("a"), "a", Money::from_minor(500), UserId::new("i1")))
            .await
            .unwrap();
        let users = InMemoryUserStore::new();
        users
            .store(UserProfile::new(UserId::new("u1"), "a@b.c", "Ada", "L", AccountType::Student))
            .await
            .unwrap();
        let progress = InMemoryProgressStore::new();
        let writer = EnrollmentWriter::new(
            Arc::new(courses),
            Arc::new(FlakyUsers {
                inner: users.clone(),
                failed: AtomicBool::new(false),
            }),
            Arc::new(progress.clone()),
        );
        let user = UserId::new("u1");
        let course = CourseId::new("a");

        let first = writer.enroll(&user, &[course.clone()]).await.unwrap();
        assert!(matches!(first.outcomes[0], CourseOutcome::Failed { .. }));
        assert!(users.get(&user).await.unwrap().unwrap().courses.is_empty());

        let retry = writer.enroll(&user, &[course.clone()]).await.unwrap();
        assert!(retry.is_complete());
        assert!(matches!(retry.outcomes[0], CourseOutcome::AlreadyEnrolled { .. }));

        let record = progress.find(&user, &course).await.unwrap().unwrap();
        let profile = users.get(&user).await.unwrap().unwrap();
        assert_eq!(profile.courses, vec![course]);
        assert_eq!(profile.course_progress, vec![record.id]);
        assert_eq!(retry.user, profile);
        assert_eq!(progress.count().await.unwrap(), 1);
    }
}
