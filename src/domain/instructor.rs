//! Instructor domain entity: the teaching assignment wrapper.
//!
//! An instructor is a thin record linked one-to-one with a teacher
//! profile. Name and qualification fields live on the profile and its
//! account; the instructor row only carries assignment state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::{Account, Profile};

/// Instructor domain entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Instructor {
    pub id: Uuid,
    /// Backing teacher profile; exactly one instructor per profile
    pub profile_id: Uuid,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Instructor together with the person behind it (safe to return to
/// client). The personal fields are read through the linked profile and
/// account, never stored on the instructor row.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct InstructorResponse {
    pub id: Uuid,
    pub profile_id: Uuid,
    #[schema(example = "Ivan Petrov")]
    pub display_name: String,
    #[schema(example = "ivan@example.com")]
    pub email: String,
    #[schema(example = "Cybersecurity")]
    pub specialization: String,
    pub degree: String,
    pub academic_rank: String,
    pub department: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl InstructorResponse {
    /// A profile promoted away from the teacher role no longer carries
    /// teacher data; those fields come back empty.
    pub fn new(instructor: &Instructor, profile: &Profile, account: &Account) -> Self {
        let teacher = profile.details.as_teacher();
        Self {
            id: instructor.id,
            profile_id: profile.id,
            display_name: account.display_name(),
            email: account.email.clone(),
            specialization: teacher.map(|t| t.specialization.clone()).unwrap_or_default(),
            degree: teacher.map(|t| t.degree.clone()).unwrap_or_default(),
            academic_rank: teacher.map(|t| t.academic_rank.clone()).unwrap_or_default(),
            department: teacher.map(|t| t.department.clone()).unwrap_or_default(),
            is_active: instructor.is_active,
            created_at: instructor.created_at,
        }
    }
}
