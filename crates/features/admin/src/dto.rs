use crate::repository::AccountRow;
use serde::Deserialize;
use trai_derive::api_model;
use utoipa::IntoParams;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListUsersQuery {
    /// Case-insensitive substring of email or nickname.
    pub search: Option<String>,
    pub role: Option<String>,
    #[param(minimum = 1)]
    pub page: Option<i64>,
    #[param(minimum = 1, maximum = 100)]
    pub page_size: Option<i64>,
}

#[api_model]
pub struct AdminUser {
    pub id: String,
    pub nickname: String,
    pub email: String,
    pub role: String,
    pub profile_completed: bool,
    pub created_at: String,
}

impl From<AccountRow> for AdminUser {
    fn from(row: AccountRow) -> Self {
        Self {
            id: row.key,
            nickname: row.nickname,
            email: row.email,
            role: row.role,
            profile_completed: row.profile_completed,
            created_at: row.created_at,
        }
    }
}

#[api_model]
pub struct UserPage {
    pub items: Vec<AdminUser>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
    pub pages: i64,
}

#[api_model]
pub struct RoleUpdateRequest {
    /// `user`, `pro` or `admin`.
    pub role: String,
}

#[api_model]
pub struct RoleUpdateResponse {
    pub message: String,
    pub user_id: String,
    pub new_role: String,
}

#[api_model]
pub struct MessageResponse {
    pub message: String,
}
