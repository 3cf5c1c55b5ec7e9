//! Account domain entity: login identity behind every profile.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// Account domain entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Human-readable name: "first last", falling back to the username
    /// when both name parts are blank.
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name.trim(), self.last_name.trim());
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }
}

/// Account response (safe to return to client)
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct AccountResponse {
    pub id: Uuid,
    #[schema(example = "avasileva")]
    pub username: String,
    #[schema(example = "anna@example.com")]
    pub email: String,
    #[schema(example = "Anna Vasileva")]
    pub display_name: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Account> for AccountResponse {
    fn from(account: &Account) -> Self {
        Self {
            id: account.id,
            username: account.username.clone(),
            email: account.email.clone(),
            display_name: account.display_name(),
            created_at: account.created_at,
        }
    }
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self::from(&account)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn account(first: &str, last: &str) -> Account {
        Account {
            id: Uuid::new_v4(),
            username: "jdoe".to_string(),
            email: "jdoe@example.com".to_string(),
            password_hash: "hashed".to_string(),
            first_name: first.to_string(),
            last_name: last.to_string(),
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn display_name_prefers_full_name() {
        assert_eq!(account("John", "Doe").display_name(), "John Doe");
    }

    #[test]
    fn display_name_falls_back_to_username() {
        assert_eq!(account("", "").display_name(), "jdoe");
        assert_eq!(account("  ", "").display_name(), "jdoe");
    }

    #[test]
    fn display_name_handles_partial_names() {
        assert_eq!(account("John", "").display_name(), "John");
    }
}
