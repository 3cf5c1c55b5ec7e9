//! Account repository: lookups over the login identity table.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, EntityTrait,
    QueryFilter, Set, SqlErr,
};
use uuid::Uuid;

#[cfg(test)]
use mockall::automock;

use super::entities::account::{ActiveModel, Column, Entity as AccountEntity};
use crate::domain::Account;
use crate::errors::{AppError, AppResult};

/// Read-side access to accounts.
///
/// Creation is transactional (it always pairs with a profile insert) and
/// lives on the transaction context instead.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait AccountRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Account>>;

    /// Lookup by username or email, for login forms that accept either.
    async fn find_by_identifier(&self, identifier: &str) -> AppResult<Option<Account>>;

    async fn find_by_username(&self, username: &str) -> AppResult<Option<Account>>;

    async fn find_by_email(&self, email: &str) -> AppResult<Option<Account>>;
}

/// SeaORM-backed account store
pub struct AccountStore {
    db: DatabaseConnection,
}

impl AccountStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AccountRepository for AccountStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Account>> {
        find_account_by_id(&self.db, id).await
    }

    async fn find_by_identifier(&self, identifier: &str) -> AppResult<Option<Account>> {
        let model = AccountEntity::find()
            .filter(
                Condition::any()
                    .add(Column::Username.eq(identifier))
                    .add(Column::Email.eq(identifier)),
            )
            .one(&self.db)
            .await?;
        Ok(model.map(Account::from))
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<Account>> {
        let model = AccountEntity::find()
            .filter(Column::Username.eq(username))
            .one(&self.db)
            .await?;
        Ok(model.map(Account::from))
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<Account>> {
        let model = AccountEntity::find()
            .filter(Column::Email.eq(email))
            .one(&self.db)
            .await?;
        Ok(model.map(Account::from))
    }
}

pub(crate) async fn find_account_by_id<C: ConnectionTrait>(
    conn: &C,
    id: Uuid,
) -> AppResult<Option<Account>> {
    let model = AccountEntity::find_by_id(id).one(conn).await?;
    Ok(model.map(Account::from))
}

/// Insert an account, remapping the unique-violation on username/email
/// to the duplicate-account error so losing racers get the same answer
/// as the pre-check.
pub(crate) async fn insert_account<C: ConnectionTrait>(
    conn: &C,
    account: Account,
) -> AppResult<Account> {
    let active = ActiveModel {
        id: Set(account.id),
        username: Set(account.username),
        email: Set(account.email),
        password_hash: Set(account.password_hash),
        first_name: Set(account.first_name),
        last_name: Set(account.last_name),
        is_active: Set(account.is_active),
        created_at: Set(account.created_at),
        updated_at: Set(account.updated_at),
    };

    let model = active.insert(conn).await.map_err(|e| {
        if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) {
            AppError::DuplicateAccount
        } else {
            AppError::from(e)
        }
    })?;

    Ok(Account::from(model))
}
