//! Identity slice: accounts, bcrypt passwords, rotating JWT pairs and the
//! bearer extractors every other slice authenticates with.

mod dto;
mod error;
mod extract;
mod handlers;
mod model;
mod password;
mod repository;
mod tokens;

pub use dto::{LoginRequest, MeResponse, RefreshRequest, RegisterRequest, TokenResponse};
pub use error::{IdentityError, IdentityErrorExt};
pub use extract::{CurrentUser, RequireAdmin, RequirePro};
pub use model::{PatchValue, UserPatch, UserRecord};
pub use password::{hash_password, verify_password};
pub use repository::{RefreshTokenRecord, Users};
pub use tokens::{Claims, TokenPair, TokenService, token_hash};

use chrono::Duration;
use trai_database::Migration;
use trai_domain::config::SecurityConfig;
use trai_kernel::domain::registry::InitializedSlice;
use trai_kernel::server::ApiState;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

pub const MIGRATIONS: &[Migration] =
    &[Migration::new("identity", "0001", include_str!("../migrations/0001_accounts.surql"))];

/// Identity feature state.
#[trai_derive::trai_slice]
pub struct Identity {
    pub tokens: TokenService,
    pub bcrypt_cost: u32,
}

/// Builds the slice from the `security` section.
///
/// # Errors
/// [`IdentityError::Config`] for empty or shared secrets, non-positive TTLs or a
/// bcrypt cost outside 4..=31.
pub fn init(security: &SecurityConfig) -> Result<InitializedSlice, IdentityError> {
    if security.access_secret.is_empty() || security.refresh_secret.is_empty() {
        return Err(IdentityError::Config { message: "Token secrets must be set".into(), context: None });
    }
    if security.access_secret == security.refresh_secret {
        return Err(IdentityError::Config {
            message: "Access and refresh secrets must differ".into(),
            context: None,
        });
    }
    if security.access_ttl_minutes <= 0 || security.refresh_ttl_days <= 0 {
        return Err(IdentityError::Config { message: "Token TTLs must be positive".into(), context: None });
    }
    if !(4..=31).contains(&security.bcrypt_cost) {
        return Err(IdentityError::Config {
            message: format!("bcrypt cost {} is outside 4..=31", security.bcrypt_cost).into(),
            context: None,
        });
    }
    if security.access_secret.starts_with("dev-only") {
        tracing::warn!("Using development token secrets; set TRAI__SECURITY__ACCESS_SECRET");
    }

    let tokens = TokenService::new(
        &security.access_secret,
        &security.refresh_secret,
        Duration::minutes(security.access_ttl_minutes),
        Duration::days(security.refresh_ttl_days),
    );

    tracing::info!("Identity slice initialized");
    Ok(InitializedSlice::new(Identity::new(IdentityInner { tokens, bcrypt_cost: security.bcrypt_cost })))
}

/// `/auth/*` routes.
pub fn router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::register))
        .routes(routes!(handlers::login))
        .routes(routes!(handlers::refresh))
        .routes(routes!(handlers::logout))
        .routes(routes!(handlers::me))
}
