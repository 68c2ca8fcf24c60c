use crate::domain::course::{Course, CourseId};
use crate::domain::money::Money;
use crate::domain::user::{AccountType, UserId, UserProfile};
use crate::error::{CoursePayError, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Read;

/// One row of a course catalog file: `id,name,price,instructor,lessons`.
///
/// `price` is in major units; `lessons` is a `;`-separated list of lesson ids.
#[derive(Debug, Deserialize)]
struct CourseRecord {
    id: String,
    name: String,
    price: Decimal,
    instructor: String,
    #[serde(default)]
    lessons: Option<String>,
}

impl TryFrom<CourseRecord> for Course {
    type Error = CoursePayError;

    fn try_from(record: CourseRecord) -> Result<Self> {
        let lessons = record
            .lessons
            .as_deref()
            .unwrap_or_default()
            .split(';')
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect::<Vec<_>>();

        Ok(Course::new(
            CourseId::new(record.id),
            record.name,
            Money::from_major(record.price)?,
            UserId::new(record.instructor),
        )
        .with_lessons(lessons))
    }
}

/// One row of a user file: `id,email,first_name,last_name,account_type`.
#[derive(Debug, Deserialize)]
struct UserRecord {
    id: String,
    email: String,
    first_name: String,
    last_name: String,
    account_type: String,
}

impl TryFrom<UserRecord> for UserProfile {
    type Error = CoursePayError;

    fn try_from(record: UserRecord) -> Result<Self> {
        let account_type: AccountType = record
            .account_type
            .parse()
            .map_err(CoursePayError::ValidationError)?;
        Ok(UserProfile::new(
            UserId::new(record.id),
            record.email,
            record.first_name,
            record.last_name,
            account_type,
        ))
    }
}

/// Reads seed courses and users from CSV sources.
///
/// Wraps `csv::Reader`, trimming whitespace and tolerating short rows, and
/// yields one `Result` per row so a bad row does not abort the import.
pub struct CatalogReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> CatalogReader<R> {
    /// Creates a new `CatalogReader` from any `Read` source (e.g. File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    pub fn courses(self) -> impl Iterator<Item = Result<Course>> {
        self.reader
            .into_deserialize::<CourseRecord>()
            .map(|row| row.map_err(CoursePayError::from).and_then(Course::try_from))
    }

    pub fn users(self) -> impl Iterator<Item = Result<UserProfile>> {
        self.reader
            .into_deserialize::<UserRecord>()
            .map(|row| row.map_err(CoursePayError::from).and_then(UserProfile::try_from))
    }
}
