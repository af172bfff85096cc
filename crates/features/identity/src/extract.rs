use crate::Identity;
use crate::model::UserRecord;
use crate::repository::Users;
use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use std::ops::Deref;
use tracing::debug;
use trai_kernel::server::{ApiError, ApiState};

const INVALID_CREDENTIALS: &str = "Could not validate credentials";

/// The account behind a valid `Authorization: Bearer <access token>`.
///
/// * no header, or a scheme other than Bearer: 403 `Not authenticated`
/// * bad or expired token, or a deleted account: 401 with a Bearer challenge
#[derive(Debug, Clone)]
pub struct CurrentUser(pub UserRecord);

impl Deref for CurrentUser {
    type Target = UserRecord;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<ApiState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &ApiState) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(bearer_token)
            .ok_or_else(|| ApiError::forbidden("Not authenticated"))?;

        let identity = state.try_get_slice::<Identity>().map_err(|e| ApiError::from_error(500, &e))?;
        let claims = identity.tokens.verify_access(token).map_err(|e| {
            debug!(error = %e, "Rejected access token");
            ApiError::unauthorized(INVALID_CREDENTIALS)
        })?;

        let user = Users::find(&state.database, &claims.sub)
            .await
            .map_err(|e| ApiError::from_error(500, &e))?
            .ok_or_else(|| ApiError::unauthorized(INVALID_CREDENTIALS))?;

        Ok(Self(user))
    }
}

/// [`CurrentUser`] with the `admin` role, otherwise 403.
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub UserRecord);

impl Deref for RequireAdmin {
    type Target = UserRecord;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<ApiState> for RequireAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &ApiState) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        if !user.role().is_admin() {
            return Err(ApiError::forbidden("Insufficient permissions"));
        }
        Ok(Self(user))
    }
}

/// [`CurrentUser`] with the `pro` or `admin` role, otherwise 403.
#[derive(Debug, Clone)]
pub struct RequirePro(pub UserRecord);

impl Deref for RequirePro {
    type Target = UserRecord;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<ApiState> for RequirePro {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &ApiState) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        if !user.role().is_pro() {
            return Err(ApiError::forbidden("This feature requires a Pro subscription"));
        }
        Ok(Self(user))
    }
}

fn bearer_token(header: &str) -> Option<&str> {
    let (scheme, token) = header.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}
