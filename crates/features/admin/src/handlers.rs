use crate::dto::{
    AdminUser, ListUsersQuery, MessageResponse, RoleUpdateRequest, RoleUpdateResponse, UserPage,
};
use crate::error::AdminError;
use crate::repository::{self, AccountFilter};
use axum::Json;
use axum::extract::{Path, State};
use std::str::FromStr;
use tracing::info;
use trai_derive::api_handler;
use trai_domain::constants::ADMIN_TAG;
use trai_domain::enums::Role;
use trai_domain::events::UserDeleted;
use trai_identity::{RequireAdmin, Users};
use trai_kernel::server::{ApiError, ApiJson, ApiQuery, ApiState};

const DEFAULT_PAGE_SIZE: i64 = 20;
const MAX_PAGE_SIZE: i64 = 100;

#[api_handler(
    get,
    path = "/admin/users",
    params(ListUsersQuery),
    responses(
        (status = OK, description = "One page of accounts", body = UserPage),
        (status = BAD_REQUEST, description = "Unknown role"),
        (status = UNPROCESSABLE_ENTITY, description = "Page out of range"),
    ),
    security(("bearer" = [])),
    tag = ADMIN_TAG,
)]
pub(crate) async fn list_users(
    State(state): State<ApiState>,
    _admin: RequireAdmin,
    ApiQuery(query): ApiQuery<ListUsersQuery>,
) -> Result<Json<UserPage>, ApiError> {
    let page = query.page.unwrap_or(1);
    let page_size = query.page_size.unwrap_or(DEFAULT_PAGE_SIZE);
    if page < 1 {
        return Err(validation("page must be >= 1"));
    }
    if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
        return Err(validation("page_size must be between 1 and 100"));
    }

    let role = query.role.as_deref().map(parse_role).transpose()?;
    let search = query
        .search
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty());
    let filter = AccountFilter { search, role: role.map(|r| r.to_string()) };

    let start = offset(page, page_size).ok_or_else(|| validation("page is out of range"))?;
    let (rows, total) = repository::list_accounts(&state.database, &filter, start, page_size)
        .await
        .map_err(AdminError::from)?;

    Ok(Json(UserPage {
        items: rows.into_iter().map(AdminUser::from).collect(),
        total,
        page,
        page_size,
        pages: pages(total, page_size),
    }))
}

#[api_handler(
    get,
    path = "/admin/users/{id}",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = OK, description = "Account", body = AdminUser),
        (status = NOT_FOUND, description = "No such user"),
    ),
    security(("bearer" = [])),
    tag = ADMIN_TAG,
)]
pub(crate) async fn get_user(
    State(state): State<ApiState>,
    _admin: RequireAdmin,
    Path(id): Path<String>,
) -> Result<Json<AdminUser>, ApiError> {
    let row = repository::find_account(&state.database, &id)
        .await
        .map_err(AdminError::from)?
        .ok_or(AdminError::UserNotFound { context: None })?;
    Ok(Json(row.into()))
}

#[api_handler(
    put,
    path = "/admin/users/{id}/role",
    params(("id" = String, Path, description = "User id")),
    request_body = RoleUpdateRequest,
    responses(
        (status = OK, description = "Role changed", body = RoleUpdateResponse),
        (status = BAD_REQUEST, description = "Own account or unknown role"),
        (status = NOT_FOUND, description = "No such user"),
    ),
    security(("bearer" = [])),
    tag = ADMIN_TAG,
)]
pub(crate) async fn update_role(
    State(state): State<ApiState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<String>,
    ApiJson(body): ApiJson<RoleUpdateRequest>,
) -> Result<Json<RoleUpdateResponse>, ApiError> {
    if id == admin.key {
        return Err(bad_request("You cannot change your own role"));
    }
    let role = parse_role(&body.role)?;

    let user = Users::set_role(&state.database, &id, role)
        .await
        .map_err(AdminError::from)?
        .ok_or(AdminError::UserNotFound { context: None })?;
    info!(admin = %admin.key, user = %user.key, %role, "Role changed");

    Ok(Json(RoleUpdateResponse {
        message: format!("Role of {} changed to {role}", user.email),
        user_id: user.key,
        new_role: role.to_string(),
    }))
}

#[api_handler(
    delete,
    path = "/admin/users/{id}",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = OK, description = "Account and its data removed", body = MessageResponse),
        (status = BAD_REQUEST, description = "Own account"),
        (status = NOT_FOUND, description = "No such user"),
    ),
    security(("bearer" = [])),
    tag = ADMIN_TAG,
)]
pub(crate) async fn delete_user(
    State(state): State<ApiState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    if id == admin.key {
        return Err(bad_request("You cannot delete your own account"));
    }
    let user = repository::find_account(&state.database, &id)
        .await
        .map_err(AdminError::from)?
        .ok_or(AdminError::UserNotFound { context: None })?;

    let object_keys = repository::delete_account(&state.database, &id).await.map_err(AdminError::from)?;
    info!(admin = %admin.key, user = %id, objects = object_keys.len(), "Account deleted");
    state
        .events
        .publish(UserDeleted { user_id: id, object_keys })
        .map_err(AdminError::from)?;

    Ok(Json(MessageResponse { message: format!("User {} deleted", user.email) }))
}

fn parse_role(raw: &str) -> Result<Role, ApiError> {
    Role::from_str(raw.trim())
        .map_err(|_| bad_request(format!("Invalid role: {raw}. Allowed: user, pro, admin")))
}

fn bad_request(message: impl Into<std::borrow::Cow<'static, str>>) -> ApiError {
    AdminError::BadRequest { message: message.into(), context: None }.into()
}

fn validation(message: &'static str) -> ApiError {
    AdminError::Validation { message: message.into(), context: None }.into()
}

/// Rows skipped before `page`; `None` when the offset does not fit in `i64`.
const fn offset(page: i64, page_size: i64) -> Option<i64> {
    match page.checked_sub(1) {
        Some(skipped) => skipped.checked_mul(page_size),
        None => None,
    }
}

const fn pages(total: i64, page_size: i64) -> i64 {
    if total <= 0 { 0 } else { (total + page_size - 1) / page_size }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_count_rounds_up() {
        assert_eq!(pages(0, 20), 0);
        assert_eq!(pages(1, 20), 1);
        assert_eq!(pages(20, 20), 1);
        assert_eq!(pages(21, 20), 2);
    }

    #[test]
    fn offsets_are_checked() {
        assert_eq!(offset(1, 20), Some(0));
        assert_eq!(offset(3, 20), Some(40));
        assert_eq!(offset(i64::MAX, 20), None);
        assert_eq!(offset(i64::MAX / 50, 100), None);
    }

    #[test]
    fn roles_parse_strictly() {
        assert_eq!(parse_role("pro").unwrap(), Role::Pro);
        assert_eq!(parse_role(" admin ").unwrap(), Role::Admin);
        assert_eq!(parse_role("root").unwrap_err().status().as_u16(), 400);
    }
}
