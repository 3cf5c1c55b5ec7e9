//! Course repository: catalog reads and writes.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set, SqlErr,
};
use uuid::Uuid;

#[cfg(test)]
use mockall::automock;

use super::entities::course::{ActiveModel, Column, Entity as CourseEntity};
use crate::domain::Course;
use crate::errors::{AppError, AppResult, OptionExt};
use crate::types::PaginationParams;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait CourseRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Course>>;

    async fn find_by_slug(&self, slug: &str) -> AppResult<Option<Course>>;

    /// Active catalog, ordered by title.
    async fn list_active(&self, params: &PaginationParams) -> AppResult<(Vec<Course>, u64)>;

    async fn list_by_instructor(&self, instructor_id: Uuid) -> AppResult<Vec<Course>>;

    async fn create(&self, course: Course) -> AppResult<Course>;

    async fn update(&self, course: Course) -> AppResult<Course>;

    async fn deactivate(&self, id: Uuid) -> AppResult<Course>;
}

/// SeaORM-backed course store
pub struct CourseStore {
    db: DatabaseConnection,
}

impl CourseStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CourseRepository for CourseStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Course>> {
        let model = CourseEntity::find_by_id(id).one(&self.db).await?;
        Ok(model.map(Course::from))
    }

    async fn find_by_slug(&self, slug: &str) -> AppResult<Option<Course>> {
        let model = CourseEntity::find()
            .filter(Column::Slug.eq(slug))
            .one(&self.db)
            .await?;
        Ok(model.map(Course::from))
    }

    async fn list_active(&self, params: &PaginationParams) -> AppResult<(Vec<Course>, u64)> {
        let paginator = CourseEntity::find()
            .filter(Column::IsActive.eq(true))
            .order_by_asc(Column::Title)
            .paginate(&self.db, params.limit());

        let total = paginator.num_items().await?;
        let models = paginator.fetch_page(params.page.saturating_sub(1)).await?;
        Ok((models.into_iter().map(Course::from).collect(), total))
    }

    async fn list_by_instructor(&self, instructor_id: Uuid) -> AppResult<Vec<Course>> {
        let models = CourseEntity::find()
            .filter(Column::InstructorId.eq(instructor_id))
            .order_by_asc(Column::Title)
            .all(&self.db)
            .await?;
        Ok(models.into_iter().map(Course::from).collect())
    }

    async fn create(&self, course: Course) -> AppResult<Course> {
        let active = to_active(course);
        let model = active.insert(&self.db).await.map_err(remap_slug_conflict)?;
        Ok(Course::from(model))
    }

    async fn update(&self, course: Course) -> AppResult<Course> {
        let existing = CourseEntity::find_by_id(course.id)
            .one(&self.db)
            .await?
            .ok_or_not_found()?;

        let mut active: ActiveModel = existing.into();
        active.title = Set(course.title);
        active.slug = Set(course.slug);
        active.description = Set(course.description);
        active.duration_hours = Set(course.duration_hours as i32);
        active.instructor_id = Set(course.instructor_id);
        active.level = Set(course.level.as_str().to_string());
        active.max_students = Set(course.max_students as i32);
        active.price = Set(course.price);
        active.is_active = Set(course.is_active);
        active.updated_at = Set(chrono::Utc::now());

        let model = active.update(&self.db).await.map_err(remap_slug_conflict)?;
        Ok(Course::from(model))
    }

    async fn deactivate(&self, id: Uuid) -> AppResult<Course> {
        let existing = CourseEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_not_found()?;

        let mut active: ActiveModel = existing.into();
        active.is_active = Set(false);
        active.updated_at = Set(chrono::Utc::now());

        let model = active.update(&self.db).await?;
        Ok(Course::from(model))
    }
}

fn to_active(course: Course) -> ActiveModel {
    ActiveModel {
        id: Set(course.id),
        title: Set(course.title),
        slug: Set(course.slug),
        description: Set(course.description),
        duration_hours: Set(course.duration_hours as i32),
        instructor_id: Set(course.instructor_id),
        level: Set(course.level.as_str().to_string()),
        max_students: Set(course.max_students as i32),
        price: Set(course.price),
        is_active: Set(course.is_active),
        created_at: Set(course.created_at),
        updated_at: Set(course.updated_at),
    }
}

/// Slug collisions surface as a field-scoped validation error rather
/// than a bare database error.
fn remap_slug_conflict(e: sea_orm::DbErr) -> AppError {
    if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
        AppError::field("slug", "A course with this slug already exists")
    } else {
        AppError::from(e)
    }
}

/// Detach every course taught by the given instructor. Returns the
/// number of courses touched.
pub(crate) async fn clear_instructor<C: ConnectionTrait>(
    conn: &C,
    instructor_id: Uuid,
) -> AppResult<u64> {
    use sea_orm::sea_query::Expr;

    let result = CourseEntity::update_many()
        .col_expr(Column::InstructorId, Expr::value(Option::<Uuid>::None))
        .col_expr(Column::UpdatedAt, Expr::value(chrono::Utc::now()))
        .filter(Column::InstructorId.eq(instructor_id))
        .exec(conn)
        .await?;

    Ok(result.rows_affected)
}
