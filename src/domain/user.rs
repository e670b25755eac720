//! User domain entity and related types.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use crate::config::{USER_ACTIVE, USER_ADMIN_COMMON, USER_ADMIN_SUPER, USER_NOT_ACTIVE};

/// Administrative level stored in the `admin` column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAdmin {
    Common,
    Super,
}

impl UserAdmin {
    pub fn as_i16(self) -> i16 {
        match self {
            UserAdmin::Common => USER_ADMIN_COMMON,
            UserAdmin::Super => USER_ADMIN_SUPER,
        }
    }
}

impl From<i16> for UserAdmin {
    fn from(value: i16) -> Self {
        match value {
            USER_ADMIN_SUPER => UserAdmin::Super,
            _ => UserAdmin::Common,
        }
    }
}

/// Account state stored in the `active` column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserActive {
    Active,
    NotActive,
}

impl UserActive {
    pub fn as_i16(self) -> i16 {
        match self {
            UserActive::Active => USER_ACTIVE,
            UserActive::NotActive => USER_NOT_ACTIVE,
        }
    }
}

impl From<i16> for UserActive {
    fn from(value: i16) -> Self {
        match value {
            USER_ACTIVE => UserActive::Active,
            _ => UserActive::NotActive,
        }
    }
}

/// User domain entity
#[derive(Debug, Clone)]
pub struct User {
    pub id: i32,
    pub nickname: String,
    pub admin: UserAdmin,
    pub active: UserActive,
    pub email: Option<String>,
    pub group_id: Option<i32>,
    pub password_hash: String,
    pub create_time: DateTime<Utc>,
    pub update_time: DateTime<Utc>,
    /// Soft delete timestamp (None = live, Some = deleted)
    pub delete_time: Option<DateTime<Utc>>,
}

impl User {
    /// Check if user is a super administrator
    pub fn is_super(&self) -> bool {
        self.admin == UserAdmin::Super
    }
}

/// Fields an administrator may change on another user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateUserInfo {
    pub group_id: i32,
    pub email: Option<String>,
}

/// User as listed to administrators (no password, no bookkeeping timestamps)
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct UserResponse {
    #[schema(example = 2)]
    pub id: i32,
    #[schema(example = "pedro")]
    pub nickname: String,
    #[schema(example = "pedro@example.com")]
    pub email: Option<String>,
    /// 1 = common user, 2 = super administrator
    #[schema(example = 1)]
    pub admin: i16,
    /// 1 = active, 2 = disabled
    #[schema(example = 1)]
    pub active: i16,
    #[schema(example = 1)]
    pub group_id: Option<i32>,
    #[schema(example = "editors")]
    pub group_name: Option<String>,
    pub create_time: DateTime<Utc>,
}

impl UserResponse {
    pub fn new(user: User, group_name: Option<String>) -> Self {
        Self {
            id: user.id,
            nickname: user.nickname,
            email: user.email,
            admin: user.admin.as_i16(),
            active: user.active.as_i16(),
            group_id: user.group_id,
            group_name,
            create_time: user.create_time,
        }
    }
}
