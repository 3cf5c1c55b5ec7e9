//! Profile domain entity: role discriminant plus role-conditional data.
//!
//! A profile is the per-account record holding the role and the fields
//! that only make sense for that role. The role-conditional fields are a
//! sum type so a student profile structurally cannot carry teacher data.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::{ROLE_ADMIN, ROLE_STUDENT, ROLE_TEACHER};

/// Profile roles enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Student,
    Teacher,
    Admin,
}

impl Role {
    /// Check if this role has admin privileges
    pub fn is_admin(&self) -> bool {
        matches!(self, Role::Admin)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => ROLE_STUDENT,
            Role::Teacher => ROLE_TEACHER,
            Role::Admin => ROLE_ADMIN,
        }
    }
}

impl From<&str> for Role {
    fn from(s: &str) -> Self {
        match s {
            ROLE_TEACHER => Role::Teacher,
            ROLE_ADMIN => Role::Admin,
            _ => Role::Student,
        }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.as_str().to_string()
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Faculty a student belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "UPPERCASE")]
pub enum Faculty {
    /// Cybersecurity
    Cs,
    /// Software engineering
    Se,
    /// Information technology
    It,
    /// Data science
    Ds,
    /// Web technologies
    Web,
}

impl Faculty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Faculty::Cs => "CS",
            Faculty::Se => "SE",
            Faculty::It => "IT",
            Faculty::Ds => "DS",
            Faculty::Web => "WEB",
        }
    }

    /// Parse from the stored discriminant; None for unknown values
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "CS" => Some(Faculty::Cs),
            "SE" => Some(Faculty::Se),
            "IT" => Some(Faculty::It),
            "DS" => Some(Faculty::Ds),
            "WEB" => Some(Faculty::Web),
            _ => None,
        }
    }
}

impl std::fmt::Display for Faculty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Administrative access level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AdminLevel {
    Moderator,
    Manager,
    SuperAdmin,
}

impl AdminLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdminLevel::Moderator => "MODERATOR",
            AdminLevel::Manager => "MANAGER",
            AdminLevel::SuperAdmin => "SUPER_ADMIN",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "MODERATOR" => Some(AdminLevel::Moderator),
            "MANAGER" => Some(AdminLevel::Manager),
            "SUPER_ADMIN" => Some(AdminLevel::SuperAdmin),
            _ => None,
        }
    }
}

impl std::fmt::Display for AdminLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Student-only profile data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StudentData {
    /// Student card number (unique when present)
    pub student_id: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub faculty: Faculty,
    /// Year of study, 1..=6
    pub year_of_study: u8,
}

/// Teacher-only profile data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TeacherData {
    pub specialization: String,
    pub degree: String,
    pub academic_rank: String,
    pub department: String,
    pub office: String,
}

/// Admin-only profile data
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AdminData {
    pub admin_level: AdminLevel,
}

/// Role-conditional profile fields as a tagged union.
///
/// The variant always matches the profile's role discriminant, so a
/// student profile cannot hold teacher fields and vice versa.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "role", rename_all = "UPPERCASE")]
pub enum RoleDetails {
    Student(StudentData),
    Teacher(TeacherData),
    Admin(AdminData),
}

impl RoleDetails {
    /// The role this variant belongs to
    pub fn role(&self) -> Role {
        match self {
            RoleDetails::Student(_) => Role::Student,
            RoleDetails::Teacher(_) => Role::Teacher,
            RoleDetails::Admin(_) => Role::Admin,
        }
    }

    pub fn as_student(&self) -> Option<&StudentData> {
        match self {
            RoleDetails::Student(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_teacher(&self) -> Option<&TeacherData> {
        match self {
            RoleDetails::Teacher(data) => Some(data),
            _ => None,
        }
    }

    pub fn as_admin(&self) -> Option<&AdminData> {
        match self {
            RoleDetails::Admin(data) => Some(data),
            _ => None,
        }
    }
}

/// Profile domain entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: Uuid,
    /// Owning account; exactly one profile per account
    pub account_id: Uuid,
    pub avatar: Option<String>,
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub details: RoleDetails,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    /// The role discriminant, derived from the details variant
    pub fn role(&self) -> Role {
        self.details.role()
    }

    pub fn is_student(&self) -> bool {
        matches!(self.details, RoleDetails::Student(_))
    }

    pub fn is_teacher(&self) -> bool {
        matches!(self.details, RoleDetails::Teacher(_))
    }

    pub fn is_admin(&self) -> bool {
        matches!(self.details, RoleDetails::Admin(_))
    }

    /// Promote this profile to admin with the given access level.
    ///
    /// Role-specific data of the previous role is discarded; promotion is
    /// an administrative action, never part of self-service registration.
    pub fn promote_to_admin(&mut self, level: AdminLevel) {
        self.details = RoleDetails::Admin(AdminData { admin_level: level });
        self.updated_at = Utc::now();
    }
}

/// Profile response (safe to return to client)
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub account_id: Uuid,
    pub role: Role,
    pub avatar: Option<String>,
    pub phone: Option<String>,
    pub bio: Option<String>,
    pub details: RoleDetails,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&Profile> for ProfileResponse {
    fn from(profile: &Profile) -> Self {
        Self {
            id: profile.id,
            account_id: profile.account_id,
            role: profile.role(),
            avatar: profile.avatar.clone(),
            phone: profile.phone.clone(),
            bio: profile.bio.clone(),
            details: profile.details.clone(),
            is_active: profile.is_active,
            created_at: profile.created_at,
        }
    }
}

impl From<Profile> for ProfileResponse {
    fn from(profile: Profile) -> Self {
        Self::from(&profile)
    }
}

/// Contact fields every role shares; used for partial updates
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
pub struct ContactUpdate {
    pub avatar: Option<String>,
    pub phone: Option<String>,
    pub bio: Option<String>,
}
