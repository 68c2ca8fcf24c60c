use crate::domain::course::{Course, CourseId};
use crate::domain::ports::{CourseStore, ProgressStore, UserStore};
use crate::domain::progress::CourseProgress;
use crate::domain::user::{UserId, UserProfile};
use crate::error::{CoursePayError, Result};
use async_trait::async_trait;
use rocksdb::{ColumnFamily, ColumnFamilyDescriptor, DB, IteratorMode, Options, WriteBatch};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Column Family for course documents.
pub const CF_COURSES: &str = "courses";
/// Column Family for user profiles.
pub const CF_USERS: &str = "users";
/// Column Family for progress records, keyed by record id.
pub const CF_PROGRESS: &str = "progress";
/// Column Family mapping `user \0 course` to a progress record id.
pub const CF_PROGRESS_INDEX: &str = "progress_index";

/// A persistent store implementation using RocksDB.
///
/// One instance implements every document port, with each document kind in
/// its own Column Family and values encoded as JSON. Read-modify-write
/// operations are serialized by `write_lock`, which is what makes student
/// appends atomic and the `(user, course)` uniqueness check race free.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
    write_lock: Arc<Mutex<()>>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path, creating
    /// any missing column families.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let families = [CF_COURSES, CF_USERS, CF_PROGRESS, CF_PROGRESS_INDEX]
            .into_iter()
            .map(|name| ColumnFamilyDescriptor::new(name, Options::default()));

        let db = DB::open_cf_descriptors(&opts, path, families)?;

        Ok(Self {
            db: Arc::new(db),
            write_lock: Arc::new(Mutex::new(())),
        })
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| CoursePayError::internal(format!("{name} column family not found")))
    }

    fn get_json<T: DeserializeOwned>(&self, cf_name: &str, key: &[u8]) -> Result<Option<T>> {
        let cf = self.cf(cf_name)?;
        match self.db.get_cf(cf, key)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn put_json<T: Serialize>(&self, cf_name: &str, key: &[u8], value: &T) -> Result<()> {
        let cf = self.cf(cf_name)?;
        let bytes = serde_json::to_vec(value)?;
        self.db.put_cf(cf, key, bytes)?;
        Ok(())
    }

    fn scan<T: DeserializeOwned>(&self, cf_name: &str) -> Result<Vec<T>> {
        let cf = self.cf(cf_name)?;
        let mut values = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_key, value) = item?;
            values.push(serde_json::from_slice(&value)?);
        }
        Ok(values)
    }
}

fn enrollment_key(user: &UserId, course: &CourseId) -> Vec<u8> {
    let mut key = Vec::with_capacity(user.as_str().len() + course.as_str().len() + 1);
    key.extend_from_slice(user.as_str().as_bytes());
    key.push(0);
    key.extend_from_slice(course.as_str().as_bytes());
    key
}

#[async_trait]
impl CourseStore for RocksDBStore {
    async fn store(&self, course: Course) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.put_json(CF_COURSES, course.id.as_str().as_bytes(), &course)
    }

    async fn get(&self, course_id: &CourseId) -> Result<Option<Course>> {
        self.get_json(CF_COURSES, course_id.as_str().as_bytes())
    }

    async fn enroll_student(&self, course_id: &CourseId, user: &UserId) -> Result<Option<Course>> {
        let _guard = self.write_lock.lock().await;
        let key = course_id.as_str().as_bytes();
        let Some(mut course) = self.get_json::<Course>(CF_COURSES, key)? else {
            return Ok(None);
        };
        if course.enroll(user) {
            self.put_json(CF_COURSES, key, &course)?;
        }
        Ok(Some(course))
    }

    async fn by_instructor(&self, instructor: &UserId) -> Result<Vec<Course>> {
        let courses: Vec<Course> = self.scan(CF_COURSES)?;
        Ok(courses
            .into_iter()
            .filter(|c| &c.instructor == instructor)
            .collect())
    }
}

#[async_trait]
impl UserStore for RocksDBStore {
    async fn store(&self, user: UserProfile) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.put_json(CF_USERS, user.id.as_str().as_bytes(), &user)
    }

    async fn get(&self, user_id: &UserId) -> Result<Option<UserProfile>> {
        self.get_json(CF_USERS, user_id.as_str().as_bytes())
    }

    async fn add_enrollment(
        &self,
        user_id: &UserId,
        course_id: &CourseId,
        progress_id: Uuid,
    ) -> Result<Option<UserProfile>> {
        let _guard = self.write_lock.lock().await;
        let key = user_id.as_str().as_bytes();
        let Some(mut user) = self.get_json::<UserProfile>(CF_USERS, key)? else {
            return Ok(None);
        };
        user.add_enrollment(course_id, progress_id);
        self.put_json(CF_USERS, key, &user)?;
        Ok(Some(user))
    }
}

#[async_trait]
impl ProgressStore for RocksDBStore {
    async fn create(&self, progress: CourseProgress) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let index_cf = self.cf(CF_PROGRESS_INDEX)?;
        let progress_cf = self.cf(CF_PROGRESS)?;

        let index_key = enrollment_key(&progress.user, &progress.course);
        if self.db.get_pinned_cf(index_cf, &index_key)?.is_some() {
            return Err(CoursePayError::DuplicateEnrollment {
                user: progress.user,
                course: progress.course,
            });
        }

        let mut batch = WriteBatch::default();
        batch.put_cf(index_cf, &index_key, progress.id.as_bytes());
        batch.put_cf(progress_cf, progress.id.as_bytes(), serde_json::to_vec(&progress)?);
        self.db.write(batch)?;
        Ok(())
    }

    async fn update(&self, progress: CourseProgress) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let key = progress.id.as_bytes();
        if self.db.get_pinned_cf(self.cf(CF_PROGRESS)?, key)?.is_none() {
            return Err(CoursePayError::internal(format!(
                "progress record {} does not exist",
                progress.id
            )));
        }
        self.put_json(CF_PROGRESS, key, &progress)
    }

    async fn find(&self, user_id: &UserId, course_id: &CourseId) -> Result<Option<CourseProgress>> {
        let index_cf = self.cf(CF_PROGRESS_INDEX)?;
        let Some(id) = self.db.get_cf(index_cf, enrollment_key(user_id, course_id))? else {
            return Ok(None);
        };
        self.get_json(CF_PROGRESS, &id)
    }

    async fn count(&self) -> Result<usize> {
        let cf = self.cf(CF_PROGRESS)?;
        let mut count = 0;
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            item?;
            count += 1;
        }
        Ok(count)
    }
}
