use trai_derive::api_model;
use trai_domain::enums::Role;

#[api_model]
pub struct RegisterRequest {
    pub nickname: String,
    pub email: String,
    pub password: String,
}

#[api_model]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[api_model]
pub struct RefreshRequest {
    pub refresh_token: String,
}

#[api_model]
pub struct TokenResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Always `bearer`.
    pub token_type: String,
    pub role: Role,
}

#[api_model]
pub struct MeResponse {
    pub email: String,
    pub nickname: String,
    pub role: Role,
    pub profile_completed: bool,
}
