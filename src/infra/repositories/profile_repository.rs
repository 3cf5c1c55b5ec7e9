//! Profile repository: role-aware reads and targeted writes.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use uuid::Uuid;

#[cfg(test)]
use mockall::automock;

use super::entities::profile::{ActiveModel, Column, Entity as ProfileEntity, RoleColumns};
use crate::domain::{AdminLevel, ContactUpdate, Profile, Role, RoleDetails};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::types::PaginationParams;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait ProfileRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Profile>>;

    async fn find_by_account(&self, account_id: Uuid) -> AppResult<Option<Profile>>;

    /// Profiles of one role, newest first.
    async fn list_by_role(
        &self,
        role: Role,
        params: &PaginationParams,
    ) -> AppResult<(Vec<Profile>, u64)>;

    /// Update the contact fields shared by every role. `None` fields are
    /// left untouched.
    async fn update_contact(&self, id: Uuid, update: ContactUpdate) -> AppResult<Profile>;

    /// Replace the role-conditional fields. The variant must match the
    /// stored role; role changes go through promotion only.
    async fn update_details(&self, id: Uuid, details: RoleDetails) -> AppResult<Profile>;

    async fn promote_to_admin(&self, id: Uuid, level: AdminLevel) -> AppResult<Profile>;

    async fn deactivate(&self, id: Uuid) -> AppResult<Profile>;
}

/// SeaORM-backed profile store
pub struct ProfileStore {
    db: DatabaseConnection,
}

impl ProfileStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn load(&self, id: Uuid) -> AppResult<super::entities::profile::Model> {
        ProfileEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_not_found()
    }
}

#[async_trait]
impl ProfileRepository for ProfileStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Profile>> {
        find_profile_by_id(&self.db, id).await
    }

    async fn find_by_account(&self, account_id: Uuid) -> AppResult<Option<Profile>> {
        let model = ProfileEntity::find()
            .filter(Column::AccountId.eq(account_id))
            .one(&self.db)
            .await?;
        model.map(Profile::try_from).transpose()
    }

    async fn list_by_role(
        &self,
        role: Role,
        params: &PaginationParams,
    ) -> AppResult<(Vec<Profile>, u64)> {
        let paginator = ProfileEntity::find()
            .filter(Column::Role.eq(role.as_str()))
            .order_by_desc(Column::CreatedAt)
            .paginate(&self.db, params.limit());

        let total = paginator.num_items().await?;
        let models = paginator.fetch_page(params.page.saturating_sub(1)).await?;

        let profiles = models
            .into_iter()
            .map(Profile::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((profiles, total))
    }

    async fn update_contact(&self, id: Uuid, update: ContactUpdate) -> AppResult<Profile> {
        let model = self.load(id).await?;
        let mut active: ActiveModel = model.into();

        if let Some(avatar) = update.avatar {
            active.avatar = Set(Some(avatar));
        }
        if let Some(phone) = update.phone {
            active.phone = Set(Some(phone));
        }
        if let Some(bio) = update.bio {
            active.bio = Set(Some(bio));
        }
        active.updated_at = Set(chrono::Utc::now());

        let model = active.update(&self.db).await?;
        Profile::try_from(model)
    }

    async fn update_details(&self, id: Uuid, details: RoleDetails) -> AppResult<Profile> {
        let model = self.load(id).await?;
        if model.role != details.role().as_str() {
            return Err(AppError::bad_request(
                "Role-specific fields must match the profile's role",
            ));
        }

        let mut active: ActiveModel = model.into();
        set_role_columns(&mut active, RoleColumns::from(&details));
        active.updated_at = Set(chrono::Utc::now());

        let model = active.update(&self.db).await?;
        Profile::try_from(model)
    }

    async fn promote_to_admin(&self, id: Uuid, level: AdminLevel) -> AppResult<Profile> {
        let model = self.load(id).await?;
        let mut active: ActiveModel = model.into();

        let details = RoleDetails::Admin(crate::domain::AdminData { admin_level: level });
        set_role_columns(&mut active, RoleColumns::from(&details));
        active.updated_at = Set(chrono::Utc::now());

        let model = active.update(&self.db).await?;
        Profile::try_from(model)
    }

    async fn deactivate(&self, id: Uuid) -> AppResult<Profile> {
        let model = self.load(id).await?;
        let mut active: ActiveModel = model.into();
        active.is_active = Set(false);
        active.updated_at = Set(chrono::Utc::now());

        let model = active.update(&self.db).await?;
        Profile::try_from(model)
    }
}

pub(crate) async fn find_profile_by_id<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
) -> AppResult<Option<Profile>> {
    let model = ProfileEntity::find_by_id(id).one(conn).await?;
    model.map(Profile::try_from).transpose()
}

pub(crate) async fn insert_profile<C: ConnectionTrait>(
    conn: &C,
    profile: Profile,
) -> AppResult<Profile> {
    let columns = RoleColumns::from(&profile.details);
    let mut active = ActiveModel {
        id: Set(profile.id),
        account_id: Set(profile.account_id),
        avatar: Set(profile.avatar),
        phone: Set(profile.phone),
        bio: Set(profile.bio),
        is_active: Set(profile.is_active),
        created_at: Set(profile.created_at),
        updated_at: Set(profile.updated_at),
        ..Default::default()
    };
    set_role_columns(&mut active, columns);

    let model = active.insert(conn).await?;
    Profile::try_from(model)
}

/// Write every role-conditional column so stale data from a previous
/// role cannot survive a variant change.
fn set_role_columns(active: &mut ActiveModel, columns: RoleColumns) {
    active.role = Set(columns.role);
    active.student_id = Set(columns.student_id);
    active.birth_date = Set(columns.birth_date);
    active.faculty = Set(columns.faculty);
    active.year_of_study = Set(columns.year_of_study);
    active.specialization = Set(columns.specialization);
    active.degree = Set(columns.degree);
    active.academic_rank = Set(columns.academic_rank);
    active.department = Set(columns.department);
    active.office = Set(columns.office);
    active.admin_level = Set(columns.admin_level);
}
