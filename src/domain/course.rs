use super::money::Money;
use super::user::UserId;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CourseId(String);

impl CourseId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CourseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CourseId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// A purchasable course.
///
/// `students_enrolled` has set semantics: a user appears at most once.
/// `lessons` lists the subsection ids a learner can mark as completed.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Course {
    pub id: CourseId,
    pub name: String,
    /// Price in minor currency units.
    pub price: Money,
    pub instructor: UserId,
    #[serde(default)]
    pub students_enrolled: Vec<UserId>,
    #[serde(default)]
    pub lessons: Vec<String>,
}

impl Course {
    pub fn new(id: CourseId, name: impl Into<String>, price: Money, instructor: UserId) -> Self {
        Self {
            id,
            name: name.into(),
            price,
            instructor,
            students_enrolled: Vec::new(),
            lessons: Vec::new(),
        }
    }

    pub fn with_lessons<I, S>(mut self, lessons: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lessons = lessons.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_enrolled(&self, user: &UserId) -> bool {
        self.students_enrolled.contains(user)
    }

    /// Adds the user to the enrolled list. Returns `false` if already present.
    pub fn enroll(&mut self, user: &UserId) -> bool {
        if self.is_enrolled(user) {
            return false;
        }
        self.students_enrolled.push(user.clone());
        true
    }

    pub fn has_lesson(&self, lesson: &str) -> bool {
        self.lessons.iter().any(|l| l == lesson)
    }

    /// Revenue generated by the course so far: enrolled students times price.
    pub fn revenue(&self) -> Option<Money> {
        self.price.checked_mul(self.students_enrolled.len() as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn course() -> Course {
        Course::new(
            CourseId::new("c1"),
            "Rust 101",
            Money::from_minor(500),
            UserId::new("i1"),
        )
    }

    #[test]
    fn test_enroll_is_idempotent() {
        let mut course = course();
        let user = UserId::new("u1");

        assert!(course.enroll(&user));
        assert!(!course.enroll(&user));
        assert_eq!(course.students_enrolled, vec![user.clone()]);
        assert!(course.is_enrolled(&user));
    }

    #[test]
    fn test_revenue() {
        let mut course = course();
        course.enroll(&UserId::new("u1"));
        course.enroll(&UserId::new("u2"));
        assert_eq!(course.revenue(), Some(Money::from_minor(1000)));
    }

    #[test]
    fn test_lessons() {
        let course = course().with_lessons(["l1", "l2"]);
        assert!(course.has_lesson("l2"));
        assert!(!course.has_lesson("l3"));
    }
}
