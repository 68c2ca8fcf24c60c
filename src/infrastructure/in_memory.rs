use crate::domain::course::{Course, CourseId};
use crate::domain::ports::{CourseStore, ProgressStore, UserStore};
use crate::domain::progress::CourseProgress;
use crate::domain::user::{UserId, UserProfile};
use crate::error::{CoursePayError, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

/// A thread-safe in-memory store for courses.
///
/// Every mutation happens under the write guard, so appending a student is
/// atomic with respect to concurrent requests.
#[derive(Default, Clone)]
pub struct InMemoryCourseStore {
    courses: Arc<RwLock<HashMap<CourseId, Course>>>,
}

impl InMemoryCourseStore {
    /// Creates a new, empty in-memory course store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops a course from the catalog, returning it if it was present.
    pub async fn remove(&self, course_id: &CourseId) -> Option<Course> {
        self.courses.write().await.remove(course_id)
    }
}

#[async_trait]
impl CourseStore for InMemoryCourseStore {
    async fn store(&self, course: Course) -> Result<()> {
        let mut courses = self.courses.write().await;
        courses.insert(course.id.clone(), course);
        Ok(())
    }

    async fn get(&self, course_id: &CourseId) -> Result<Option<Course>> {
        let courses = self.courses.read().await;
        Ok(courses.get(course_id).cloned())
    }

    async fn enroll_student(&self, course_id: &CourseId, user: &UserId) -> Result<Option<Course>> {
        let mut courses = self.courses.write().await;
        Ok(courses.get_mut(course_id).map(|course| {
            course.enroll(user);
            course.clone()
        }))
    }

    async fn by_instructor(&self, instructor: &UserId) -> Result<Vec<Course>> {
        let courses = self.courses.read().await;
        let mut taught: Vec<Course> = courses
            .values()
            .filter(|c| &c.instructor == instructor)
            .cloned()
            .collect();
        taught.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(taught)
    }
}

/// A thread-safe in-memory store for user profiles.
#[derive(Default, Clone)]
pub struct InMemoryUserStore {
    users: Arc<RwLock<HashMap<UserId, UserProfile>>>,
}

impl InMemoryUserStore {
    /// Creates a new, empty in-memory user store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn store(&self, user: UserProfile) -> Result<()> {
        let mut users = self.users.write().await;
        users.insert(user.id.clone(), user);
        Ok(())
    }

    async fn get(&self, user_id: &UserId) -> Result<Option<UserProfile>> {
        let users = self.users.read().await;
        Ok(users.get(user_id).cloned())
    }

    async fn add_enrollment(
        &self,
        user_id: &UserId,
        course_id: &CourseId,
        progress_id: Uuid,
    ) -> Result<Option<UserProfile>> {
        let mut users = self.users.write().await;
        Ok(users.get_mut(user_id).map(|user| {
            user.add_enrollment(course_id, progress_id);
            user.clone()
        }))
    }
}

#[derive(Default)]
struct ProgressTable {
    records: HashMap<Uuid, CourseProgress>,
    by_enrollment: HashMap<(UserId, CourseId), Uuid>,
}

/// A thread-safe in-memory store for course progress records.
///
/// Keeps a `(user, course)` index next to the records; `create` refuses a
/// second record for the same pair.
#[derive(Default, Clone)]
pub struct InMemoryProgressStore {
    table: Arc<RwLock<ProgressTable>>,
}

impl InMemoryProgressStore {
    /// Creates a new, empty in-memory progress store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProgressStore for InMemoryProgressStore {
    async fn create(&self, progress: CourseProgress) -> Result<()> {
        let mut table = self.table.write().await;
        let key = (progress.user.clone(), progress.course.clone());
        if table.by_enrollment.contains_key(&key) {
            return Err(CoursePayError::DuplicateEnrollment {
                user: progress.user,
                course: progress.course,
            });
        }
        table.by_enrollment.insert(key, progress.id);
        table.records.insert(progress.id, progress);
        Ok(())
    }

    async fn update(&self, progress: CourseProgress) -> Result<()> {
        let mut table = self.table.write().await;
        match table.records.get_mut(&progress.id) {
            Some(existing) => {
                *existing = progress;
                Ok(())
            }
            None => Err(CoursePayError::internal(format!(
                "progress record {} does not exist",
                progress.id
            ))),
        }
    }

    async fn find(&self, user_id: &UserId, course_id: &CourseId) -> Result<Option<CourseProgress>> {
        let table = self.table.read().await;
        Ok(table
            .by_enrollment
            .get(&(user_id.clone(), course_id.clone()))
            .and_then(|id| table.records.get(id))
            .cloned())
    }

    async fn count(&self) -> Result<usize> {
        let table = self.table.read().await;
        Ok(table.records.len())
    }
}
