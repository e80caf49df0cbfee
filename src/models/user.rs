use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Customer,
    ShopOwner,
    Admin,
}

#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub role: Role,
    pub email: String,
    pub password_digest: String,
    pub password_salt: String,
    pub name: String,
    pub shop_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Wire projection of a user; credentials never leave the store.
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub id: Uuid,
    pub role: Role,
    pub email: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shop_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            role: self.role,
            email: self.email.clone(),
            name: self.name.clone(),
            shop_name: self.shop_name.clone(),
            created_at: self.created_at,
        }
    }
}
