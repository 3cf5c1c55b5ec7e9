//! Instructor repository.
//!
//! Creation and deletion are transactional (they pair with profile and
//! course writes) and live on the transaction context. Reads that serve
//! the instructor endpoints join the backing profile and account so the
//! person's name and email are resolvable.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait,
    QueryFilter, Set,
};
use std::collections::HashMap;
use uuid::Uuid;

#[cfg(test)]
use mockall::automock;

use super::entities::account::{Column as AccountColumn, Entity as AccountEntity};
use super::entities::instructor::{ActiveModel, Entity as InstructorEntity};
use super::entities::profile::Entity as ProfileEntity;
use crate::domain::{Account, Instructor, Profile};
use crate::errors::{AppError, AppResult};

#[cfg_attr(test, automock)]
#[async_trait]
pub trait InstructorRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Instructor>>;

    /// An instructor with its backing profile and account.
    async fn find_with_profile(
        &self,
        id: Uuid,
    ) -> AppResult<Option<(Instructor, Profile, Account)>>;

    /// All instructors with their backing profiles and accounts, in no
    /// particular order.
    async fn list_with_profiles(&self) -> AppResult<Vec<(Instructor, Profile, Account)>>;
}

/// SeaORM-backed instructor store
pub struct InstructorStore {
    db: DatabaseConnection,
}

impl InstructorStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl InstructorRepository for InstructorStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Instructor>> {
        find_instructor_by_id(&self.db, id).await
    }

    async fn find_with_profile(
        &self,
        id: Uuid,
    ) -> AppResult<Option<(Instructor, Profile, Account)>> {
        let Some((instructor, profile)) = InstructorEntity::find_by_id(id)
            .find_also_related(ProfileEntity)
            .one(&self.db)
            .await?
        else {
            return Ok(None);
        };

        let profile = profile.ok_or_else(|| missing_profile(instructor.id))?;
        let account = AccountEntity::find_by_id(profile.account_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| missing_account(profile.id))?;

        Ok(Some((
            Instructor::from(instructor),
            Profile::try_from(profile)?,
            Account::from(account),
        )))
    }

    async fn list_with_profiles(&self) -> AppResult<Vec<(Instructor, Profile, Account)>> {
        let rows = InstructorEntity::find()
            .find_also_related(ProfileEntity)
            .all(&self.db)
            .await?;

        let account_ids: Vec<Uuid> = rows
            .iter()
            .filter_map(|(_, profile)| profile.as_ref().map(|p| p.account_id))
            .collect();
        let mut accounts: HashMap<Uuid, Account> = AccountEntity::find()
            .filter(AccountColumn::Id.is_in(account_ids))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|model| (model.id, Account::from(model)))
            .collect();

        let mut joined = Vec::with_capacity(rows.len());
        for (instructor, profile) in rows {
            let profile = profile.ok_or_else(|| missing_profile(instructor.id))?;
            let account = accounts
                .remove(&profile.account_id)
                .ok_or_else(|| missing_account(profile.id))?;
            joined.push((
                Instructor::from(instructor),
                Profile::try_from(profile)?,
                account,
            ));
        }
        Ok(joined)
    }
}

fn missing_profile(instructor_id: Uuid) -> AppError {
    AppError::internal(format!(
        "Instructor {} has no backing profile",
        instructor_id
    ))
}

fn missing_account(profile_id: Uuid) -> AppError {
    AppError::internal(format!("Profile {} has no backing account", profile_id))
}

pub(crate) async fn find_instructor_by_id<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
) -> AppResult<Option<Instructor>> {
    let model = InstructorEntity::find_by_id(id).one(conn).await?;
    Ok(model.map(Instructor::from))
}

pub(crate) async fn insert_instructor<C: ConnectionTrait>(
    conn: &C,
    instructor: Instructor,
) -> AppResult<Instructor> {
    let active = ActiveModel {
        id: Set(instructor.id),
        profile_id: Set(instructor.profile_id),
        is_active: Set(instructor.is_active),
        created_at: Set(instructor.created_at),
        updated_at: Set(instructor.updated_at),
    };

    let model = active.insert(conn).await?;
    Ok(Instructor::from(model))
}

pub(crate) async fn delete_instructor<C: ConnectionTrait>(conn: &C, id: Uuid) -> AppResult<()> {
    let result = InstructorEntity::delete_by_id(id).exec(conn).await?;
    if result.rows_affected == 0 {
        return Err(AppError::NotFound);
    }
    Ok(())
}
