//! Course domain entity and derived enrollment metrics.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Course difficulty level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum CourseLevel {
    Beginner,
    Intermediate,
    Advanced,
}

impl CourseLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            CourseLevel::Beginner => "BEGINNER",
            CourseLevel::Intermediate => "INTERMEDIATE",
            CourseLevel::Advanced => "ADVANCED",
        }
    }
}

impl Default for CourseLevel {
    fn default() -> Self {
        CourseLevel::Beginner
    }
}

impl From<&str> for CourseLevel {
    fn from(s: &str) -> Self {
        match s {
            "INTERMEDIATE" => CourseLevel::Intermediate,
            "ADVANCED" => CourseLevel::Advanced,
            _ => CourseLevel::Beginner,
        }
    }
}

impl std::fmt::Display for CourseLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Course domain entity
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Course {
    pub id: Uuid,
    pub title: String,
    /// URL-safe unique identifier
    pub slug: String,
    pub description: String,
    /// Duration in hours, 1..=500
    pub duration_hours: u32,
    /// Teaching instructor; courses survive instructor removal unstaffed
    pub instructor_id: Option<Uuid>,
    pub level: CourseLevel,
    /// Capacity, 1..=100. Advisory only: enrollment never rejects on it.
    pub max_students: u32,
    /// Non-negative, two decimal places
    pub price: Decimal,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Course {
    /// Remaining capacity given the current number of ACTIVE enrollments.
    ///
    /// Signed: lowering `max_students` below the current enrollment (or
    /// over-subscribing, since capacity is advisory) yields a negative
    /// value that is reported as-is, never corrected.
    pub fn available_slots(&self, enrolled_students_count: u64) -> i64 {
        self.max_students as i64 - enrolled_students_count as i64
    }

    pub fn is_unstaffed(&self) -> bool {
        self.instructor_id.is_none()
    }
}
