use crate::dto::{LoginRequest, MeResponse, RefreshRequest, RegisterRequest, TokenResponse};
use crate::error::IdentityError;
use crate::extract::CurrentUser;
use crate::model::UserRecord;
use crate::password::{hash_password, verify_password};
use crate::repository::Users;
use crate::tokens::token_hash;
use crate::Identity;
use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use std::borrow::Cow;
use tracing::{info, warn};
use trai_database::Database;
use trai_derive::api_handler;
use trai_domain::constants::AUTH_TAG;
use trai_kernel::server::{ApiError, ApiJson, ApiState};
use trai_kernel::{safe_nanoid, time};

const BAD_CREDENTIALS: &str = "Incorrect email or password";
const INVALID_REFRESH: &str = "Invalid refresh token";

#[api_handler(
    post,
    path = "/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = OK, description = "Account created", body = TokenResponse),
        (status = BAD_REQUEST, description = "Email already registered"),
        (status = UNPROCESSABLE_ENTITY, description = "Invalid fields"),
    ),
    tag = AUTH_TAG,
)]
pub(crate) async fn register(
    State(state): State<ApiState>,
    ApiJson(body): ApiJson<RegisterRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let identity = state.try_get_slice::<Identity>().map_err(|e| ApiError::from_error(500, &e))?;

    let nickname = body.nickname.trim();
    let email = body.email.trim().to_lowercase();
    validate_registration(nickname, &email, &body.password)?;

    if Users::find_by_email(&state.database, &email).await.map_err(IdentityError::from)?.is_some() {
        return Err(email_taken().into());
    }

    let password_hash = hash_password(body.password, identity.bcrypt_cost).await?;
    let user = UserRecord::new(safe_nanoid!(), nickname.to_owned(), email, password_hash, time::now_stamp());
    if !Users::create_unique(&state.database, user.clone()).await.map_err(IdentityError::from)? {
        return Err(email_taken().into());
    }
    info!(user = %user.key, "Account registered");

    Ok(Json(issue_pair(&state.database, identity, &user).await?))
}

#[api_handler(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = OK, description = "Signed in", body = TokenResponse),
        (status = UNAUTHORIZED, description = "Bad credentials"),
    ),
    tag = AUTH_TAG,
)]
pub(crate) async fn login(
    State(state): State<ApiState>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let identity = state.try_get_slice::<Identity>().map_err(|e| ApiError::from_error(500, &e))?;

    let Some(user) =
        Users::find_by_email(&state.database, &body.email).await.map_err(IdentityError::from)?
    else {
        return Err(ApiError::unauthorized(BAD_CREDENTIALS));
    };
    if !verify_password(body.password, user.password_hash.clone()).await {
        return Err(ApiError::unauthorized(BAD_CREDENTIALS));
    }

    Ok(Json(issue_pair(&state.database, identity, &user).await?))
}

#[api_handler(
    post,
    path = "/auth/refresh",
    request_body = RefreshRequest,
    responses(
        (status = OK, description = "Rotated pair", body = TokenResponse),
        (status = UNAUTHORIZED, description = "Invalid, expired or reused refresh token"),
    ),
    tag = AUTH_TAG,
)]
pub(crate) async fn refresh(
    State(state): State<ApiState>,
    ApiJson(body): ApiJson<RefreshRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let identity = state.try_get_slice::<Identity>().map_err(|e| ApiError::from_error(500, &e))?;
    let db = &state.database;

    let claims = identity
        .tokens
        .verify_refresh(&body.refresh_token)
        .map_err(|_| ApiError::unauthorized(INVALID_REFRESH))?;

    let hash = token_hash(&body.refresh_token);
    let Some(stored) = Users::find_refresh_token(db, &hash).await.map_err(IdentityError::from)? else {
        warn!(user = %claims.sub, "Refresh token reuse detected; revoking all sessions");
        Users::revoke_refresh_tokens(db, &claims.sub).await.map_err(IdentityError::from)?;
        return Err(ApiError::unauthorized("Refresh token reuse detected"));
    };

    Users::delete_refresh_token(db, &hash).await.map_err(IdentityError::from)?;

    let expired = time::parse(&stored.expires_at).is_none_or(|at| at <= time::now());
    if expired {
        return Err(ApiError::unauthorized("Refresh token expired"));
    }

    let user = Users::find(db, &stored.user_id)
        .await
        .map_err(IdentityError::from)?
        .ok_or_else(|| ApiError::unauthorized(INVALID_REFRESH))?;

    Ok(Json(issue_pair(db, identity, &user).await?))
}

#[api_handler(
    post,
    path = "/auth/logout",
    request_body = RefreshRequest,
    responses((status = NO_CONTENT, description = "Refresh token revoked")),
    tag = AUTH_TAG,
)]
pub(crate) async fn logout(
    State(state): State<ApiState>,
    ApiJson(body): ApiJson<RefreshRequest>,
) -> Result<StatusCode, ApiError> {
    Users::delete_refresh_token(&state.database, &token_hash(&body.refresh_token))
        .await
        .map_err(IdentityError::from)?;
    Ok(StatusCode::NO_CONTENT)
}

#[api_handler(
    get,
    path = "/auth/me",
    responses(
        (status = OK, description = "Current account", body = MeResponse),
        (status = UNAUTHORIZED, description = "Invalid token"),
        (status = FORBIDDEN, description = "Not authenticated"),
    ),
    security(("bearer" = [])),
    tag = AUTH_TAG,
)]
pub(crate) async fn me(CurrentUser(user): CurrentUser) -> Json<MeResponse> {
    Json(MeResponse {
        role: user.role(),
        email: user.email,
        nickname: user.nickname,
        profile_completed: user.profile_completed,
    })
}

async fn issue_pair(db: &Database, identity: &Identity, user: &UserRecord) -> Result<TokenResponse, IdentityError> {
    let role = user.role();
    let pair = identity.tokens.issue(&user.key, role)?;
    Users::store_refresh_token(
        db,
        &user.key,
        token_hash(&pair.refresh_token),
        time::stamp(pair.refresh_expires_at),
        time::now_stamp(),
    )
    .await?;

    Ok(TokenResponse {
        access_token: pair.access_token,
        refresh_token: pair.refresh_token,
        token_type: "bearer".to_owned(),
        role,
    })
}

const fn email_taken() -> IdentityError {
    IdentityError::BadRequest { message: Cow::Borrowed("User with this email already exists"), context: None }
}

fn validate_registration(nickname: &str, email: &str, password: &str) -> Result<(), IdentityError> {
    let message = if nickname.is_empty() {
        "Nickname must not be empty"
    } else if !is_email(email) {
        "Invalid email address"
    } else if password.is_empty() {
        "Password must not be empty"
    } else {
        return Ok(());
    };
    Err(IdentityError::Validation { message: message.into(), context: None })
}

/// `local@domain.tld` with no whitespace and a dotted domain.
pub(crate) fn is_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !email.chars().any(char::is_whitespace)
        && !domain.contains('@')
        && domain.split('.').count() >= 2
        && domain.split('.').all(|label| !label.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_shapes() {
        assert!(is_email("anna@example.com"));
        assert!(is_email("a.b+c@mail.co.uk"));
        assert!(!is_email("anna"));
        assert!(!is_email("@example.com"));
        assert!(!is_email("anna@localhost"));
        assert!(!is_email("anna@exa mple.com"));
        assert!(!is_email("anna@@example.com"));
        assert!(!is_email("anna@example."));
    }

    #[test]
    fn registration_requires_every_field() {
        assert!(validate_registration("anna", "anna@example.com", "pw").is_ok());
        assert!(matches!(
            validate_registration(" ".trim(), "anna@example.com", "pw"),
            Err(IdentityError::Validation { .. })
        ));
        assert!(validate_registration("anna", "nope", "pw").is_err());
        assert!(validate_registration("anna", "anna@example.com", "").is_err());
    }
}
