//! Course service - catalog management and instructor assignment.

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::Serialize;
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::DEFAULT_COURSE_CAPACITY;
use crate::domain::{Course, CourseLevel, InstructorResponse};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;
use crate::types::PaginationParams;

/// A course together with its derived enrollment metrics.
///
/// The count covers ACTIVE enrollments only; the slot number is
/// advisory and may be negative.
#[derive(Debug, Serialize, ToSchema)]
pub struct CourseWithStats {
    #[serde(flatten)]
    pub course: Course,
    pub enrolled_students_count: u64,
    pub available_slots: i64,
}

/// New course input
#[derive(Debug, Clone)]
pub struct NewCourse {
    pub title: String,
    pub slug: Option<String>,
    pub description: String,
    pub duration_hours: u32,
    pub level: CourseLevel,
    pub max_students: Option<u32>,
    pub price: Decimal,
    pub instructor_id: Option<Uuid>,
}

/// Partial course update; `None` fields are left untouched.
/// `instructor_id` uses a double Option to distinguish "leave as is"
/// from "detach".
#[derive(Debug, Clone, Default)]
pub struct CourseUpdate {
    pub title: Option<String>,
    pub slug: Option<String>,
    pub description: Option<String>,
    pub duration_hours: Option<u32>,
    pub level: Option<CourseLevel>,
    pub max_students: Option<u32>,
    pub price: Option<Decimal>,
    pub instructor_id: Option<Option<Uuid>>,
}

/// Course service trait for dependency injection.
#[async_trait]
pub trait CourseService: Send + Sync {
    async fn get_course(&self, id: Uuid) -> AppResult<CourseWithStats>;

    async fn get_by_slug(&self, slug: &str) -> AppResult<CourseWithStats>;

    async fn list_courses(
        &self,
        params: PaginationParams,
    ) -> AppResult<(Vec<CourseWithStats>, u64)>;

    async fn create_course(&self, input: NewCourse) -> AppResult<Course>;

    async fn update_course(&self, id: Uuid, update: CourseUpdate) -> AppResult<Course>;

    async fn deactivate_course(&self, id: Uuid) -> AppResult<Course>;

    /// Instructors with the person behind them, ordered by surname.
    async fn list_instructors(&self) -> AppResult<Vec<InstructorResponse>>;

    async fn get_instructor(&self, id: Uuid) -> AppResult<InstructorResponse>;

    /// Remove an instructor, detaching their courses inside the same
    /// transaction. Courses survive unstaffed, never cascade.
    async fn delete_instructor(&self, id: Uuid) -> AppResult<u64>;
}

/// Concrete implementation of CourseService using Unit of Work.
pub struct CourseManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> CourseManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    async fn with_stats(&self, course: Course) -> AppResult<CourseWithStats> {
        let enrolled = self
            .uow
            .enrollments()
            .count_active_for_course(course.id)
            .await?;
        let available_slots = course.available_slots(enrolled);
        Ok(CourseWithStats {
            course,
            enrolled_students_count: enrolled,
            available_slots,
        })
    }

    /// The instructor must exist; attaching to an inactive instructor
    /// is allowed.
    async fn check_instructor(&self, instructor_id: Uuid) -> AppResult<()> {
        self.uow
            .instructors()
            .find_by_id(instructor_id)
            .await?
            .map(|_| ())
            .ok_or_else(|| AppError::field("instructor_id", "Instructor does not exist"))
    }
}

#[async_trait]
impl<U: UnitOfWork> CourseService for CourseManager<U> {
    async fn get_course(&self, id: Uuid) -> AppResult<CourseWithStats> {
        let course = self.uow.courses().find_by_id(id).await?.ok_or_not_found()?;
        self.with_stats(course).await
    }

    async fn get_by_slug(&self, slug: &str) -> AppResult<CourseWithStats> {
        let course = self
            .uow
            .courses()
            .find_by_slug(slug)
            .await?
            .ok_or_not_found()?;
        self.with_stats(course).await
    }

    async fn list_courses(
        &self,
        params: PaginationParams,
    ) -> AppResult<(Vec<CourseWithStats>, u64)> {
        let (courses, total) = self.uow.courses().list_active(&params).await?;

        let mut with_stats = Vec::with_capacity(courses.len());
        for course in courses {
            with_stats.push(self.with_stats(course).await?);
        }
        Ok((with_stats, total))
    }

    async fn create_course(&self, input: NewCourse) -> AppResult<Course> {
        if let Some(instructor_id) = input.instructor_id {
            self.check_instructor(instructor_id).await?;
        }

        let slug = match input.slug {
            Some(slug) if !slug.trim().is_empty() => slug,
            _ => slugify(&input.title),
        };

        let now = chrono::Utc::now();
        let course = Course {
            id: Uuid::new_v4(),
            title: input.title,
            slug,
            description: input.description,
            duration_hours: input.duration_hours,
            instructor_id: input.instructor_id,
            level: input.level,
            max_students: input.max_students.unwrap_or(DEFAULT_COURSE_CAPACITY),
            price: input.price,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        let course = self.uow.courses().create(course).await?;
        tracing::info!(course_id = %course.id, slug = %course.slug, "created course");
        Ok(course)
    }

    async fn update_course(&self, id: Uuid, update: CourseUpdate) -> AppResult<Course> {
        let mut course = self.uow.courses().find_by_id(id).await?.ok_or_not_found()?;

        if let Some(Some(instructor_id)) = update.instructor_id {
            self.check_instructor(instructor_id).await?;
        }

        if let Some(title) = update.title {
            course.title = title;
        }
        if let Some(slug) = update.slug {
            course.slug = slug;
        }
        if let Some(description) = update.description {
            course.description = description;
        }
        if let Some(duration_hours) = update.duration_hours {
            course.duration_hours = duration_hours;
        }
        if let Some(level) = update.level {
            course.level = level;
        }
        if let Some(max_students) = update.max_students {
            // Lowering below the current enrollment is allowed; the slot
            // count simply goes negative.
            course.max_students = max_students;
        }
        if let Some(price) = update.price {
            course.price = price;
        }
        if let Some(instructor_id) = update.instructor_id {
            course.instructor_id = instructor_id;
        }

        self.uow.courses().update(course).await
    }

    async fn deactivate_course(&self, id: Uuid) -> AppResult<Course> {
        self.uow.courses().deactivate(id).await
    }

    async fn list_instructors(&self) -> AppResult<Vec<InstructorResponse>> {
        let mut rows = self.uow.instructors().list_with_profiles().await?;
        rows.sort_by(|(_, _, a), (_, _, b)| {
            (a.last_name.as_str(), a.first_name.as_str())
                .cmp(&(b.last_name.as_str(), b.first_name.as_str()))
        });
        Ok(rows
            .iter()
            .map(|(instructor, profile, account)| {
                InstructorResponse::new(instructor, profile, account)
            })
            .collect())
    }

    async fn get_instructor(&self, id: Uuid) -> AppResult<InstructorResponse> {
        let (instructor, profile, account) = self
            .uow
            .instructors()
            .find_with_profile(id)
            .await?
            .ok_or_not_found()?;
        Ok(InstructorResponse::new(&instructor, &profile, &account))
    }

    async fn delete_instructor(&self, id: Uuid) -> AppResult<u64> {
        // Existence check up front for a clean 404
        self.uow.instructors().find_by_id(id).await?.ok_or_not_found()?;

        let detached = self
            .uow
            .transaction(move |ctx| {
                Box::pin(async move {
                    let detached = ctx.courses().clear_instructor(id).await?;
                    ctx.instructors().delete(id).await?;
                    Ok(detached)
                })
            })
            .await?;

        tracing::info!(instructor_id = %id, detached, "deleted instructor");
        Ok(detached)
    }
}

/// URL-safe slug from a title: lowercase alphanumerics joined by single
/// hyphens.
pub fn slugify(title: &str) -> String {
    let mut slug = String::with_capacity(title.len());
    let mut last_was_hyphen = true;

    for c in title.chars() {
        if c.is_alphanumeric() {
            slug.extend(c.to_lowercase());
            last_was_hyphen = false;
        } else if !last_was_hyphen {
            slug.push('-');
            last_was_hyphen = true;
        }
    }

    slug.trim_end_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_joins_words_with_hyphens() {
        assert_eq!(slugify("Web Security"), "web-security");
        assert_eq!(slugify("Rust: Advanced Patterns!"), "rust-advanced-patterns");
    }

    #[test]
    fn slugify_collapses_separators() {
        assert_eq!(slugify("  a  --  b  "), "a-b");
        assert_eq!(slugify("---"), "");
    }
}
