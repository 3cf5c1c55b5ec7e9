//! Profile service - profile reads, partial updates and promotion.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use crate::domain::{AdminLevel, ContactUpdate, Profile, Role, RoleDetails};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;
use crate::types::PaginationParams;

/// Profile service trait for dependency injection.
///
/// The role discriminant is immutable through this surface; the only
/// role change is the admin-only promotion.
#[async_trait]
pub trait ProfileService: Send + Sync {
    async fn get_profile(&self, id: Uuid) -> AppResult<Profile>;

    async fn get_by_account(&self, account_id: Uuid) -> AppResult<Profile>;

    async fn list_by_role(
        &self,
        role: Role,
        params: PaginationParams,
    ) -> AppResult<(Vec<Profile>, u64)>;

    /// Update the contact fields shared by every role.
    async fn update_contact(&self, id: Uuid, update: ContactUpdate) -> AppResult<Profile>;

    /// Replace the role-specific fields of a profile. Rejects a variant
    /// that does not match the profile's current role.
    async fn update_details(&self, id: Uuid, details: RoleDetails) -> AppResult<Profile>;

    /// Promote an existing profile to admin. Never self-service.
    async fn promote_to_admin(&self, id: Uuid, level: AdminLevel) -> AppResult<Profile>;

    async fn deactivate(&self, id: Uuid) -> AppResult<Profile>;
}

/// Concrete implementation of ProfileService using Unit of Work.
pub struct ProfileManager<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> ProfileManager<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> ProfileService for ProfileManager<U> {
    async fn get_profile(&self, id: Uuid) -> AppResult<Profile> {
        self.uow.profiles().find_by_id(id).await?.ok_or_not_found()
    }

    async fn get_by_account(&self, account_id: Uuid) -> AppResult<Profile> {
        self.uow
            .profiles()
            .find_by_account(account_id)
            .await?
            .ok_or_not_found()
    }

    async fn list_by_role(
        &self,
        role: Role,
        params: PaginationParams,
    ) -> AppResult<(Vec<Profile>, u64)> {
        self.uow.profiles().list_by_role(role, &params).await
    }

    async fn update_contact(&self, id: Uuid, update: ContactUpdate) -> AppResult<Profile> {
        self.uow.profiles().update_contact(id, update).await
    }

    async fn update_details(&self, id: Uuid, details: RoleDetails) -> AppResult<Profile> {
        let profile = self.get_profile(id).await?;
        if profile.role() != details.role() {
            return Err(AppError::bad_request(
                "Role-specific fields must match the profile's role",
            ));
        }
        self.uow.profiles().update_details(id, details).await
    }

    async fn promote_to_admin(&self, id: Uuid, level: AdminLevel) -> AppResult<Profile> {
        // Existence check so a missing profile reads as 404, not 500
        self.get_profile(id).await?;
        let profile = self.uow.profiles().promote_to_admin(id, level).await?;
        tracing::info!(profile_id = %id, level = %level, "promoted profile to admin");
        Ok(profile)
    }

    async fn deactivate(&self, id: Uuid) -> AppResult<Profile> {
        self.uow.profiles().deactivate(id).await
    }
}
