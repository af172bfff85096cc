//! Facade crate for TrAi features and shared modules.
//! Re-exports domain/kernel primitives, aggregates slice migrations and
//! initialization, and assembles the `/api/v1` router.
//!
//! Keep this crate thin: it composes other crates and holds no business logic.

use std::borrow::Cow;
use std::time::Duration;
use tracing::info;
use trai_ai::{AiClient, AiError, AiSettings};
use trai_attachments::AttachmentsError;
use trai_database::{Database, DatabaseError, Migration};
use trai_domain::config::{AiConfig, ApiConfig};
use trai_domain::constants::API_PREFIX;
use trai_domain::registry::InitializedSlice;
use trai_event_bus::EventBus;
use trai_identity::IdentityError;
use trai_kernel::server::ApiState;
use trai_kernel::server::router::system_router;
use trai_nutrition::NutritionError;
use trai_profile::ProfileError;
use utoipa_axum::router::OpenApiRouter;

pub use trai_domain as domain;
pub use trai_kernel as kernel;

/// Feature slices, for callers that need their types.
pub mod features {
    pub use trai_admin as admin;
    pub use trai_attachments as attachments;
    pub use trai_goals as goals;
    pub use trai_identity as identity;
    pub use trai_nutrition as nutrition;
    pub use trai_profile as profile;
    pub use trai_progress as progress;
    pub use trai_workouts as workouts;

    /// Slices mounted under `/api/v1`.
    pub const ENABLED: &[&str] =
        &["identity", "admin", "goals", "progress", "workouts", "nutrition", "attachments", "profile"];

    #[must_use]
    pub fn is_enabled(name: &str) -> bool {
        ENABLED.contains(&name)
    }
}

#[trai_derive::trai_error]
pub enum BootstrapError {
    #[error("Identity bootstrap failed{}: {source}", format_context(.context))]
    Identity { source: IdentityError, context: Option<Cow<'static, str>> },

    #[error("AI client bootstrap failed{}: {source}", format_context(.context))]
    Ai { source: AiError, context: Option<Cow<'static, str>> },

    #[error("Nutrition bootstrap failed{}: {source}", format_context(.context))]
    Nutrition { source: NutritionError, context: Option<Cow<'static, str>> },

    #[error("Attachments bootstrap failed{}: {source}", format_context(.context))]
    Attachments { source: AttachmentsError, context: Option<Cow<'static, str>> },

    #[error("Profile bootstrap failed{}: {source}", format_context(.context))]
    Profile { source: ProfileError, context: Option<Cow<'static, str>> },

    #[error("Database bootstrap failed{}: {source}", format_context(.context))]
    Database { source: DatabaseError, context: Option<Cow<'static, str>> },
}

/// Every slice's migrations in dependency order.
#[must_use]
pub fn migrations() -> Vec<Migration> {
    [
        trai_identity::MIGRATIONS,
        trai_progress::MIGRATIONS,
        trai_workouts::MIGRATIONS,
        trai_nutrition::MIGRATIONS,
        trai_attachments::MIGRATIONS,
        trai_profile::MIGRATIONS,
    ]
    .concat()
}

/// `None` while no api key is configured; AI-backed endpoints then degrade.
///
/// # Errors
/// [`AiError::Http`] when the HTTP client cannot be built.
pub fn ai_client(cfg: &AiConfig) -> Result<Option<AiClient>, AiError> {
    let Some(api_key) = cfg.api_key.as_deref().map(str::trim).filter(|k| !k.is_empty()) else {
        return Ok(None);
    };
    AiClient::new(AiSettings {
        api_key: api_key.to_owned(),
        base_url: cfg.base_url.clone(),
        model: cfg.model.clone(),
        temperature: cfg.temperature,
        max_tokens: cfg.max_tokens,
        timeout: Duration::from_secs(cfg.timeout_secs),
    })
    .map(Some)
}

/// Migrates, seeds the product catalog and initializes every slice.
///
/// # Errors
/// The first slice that fails to start.
pub async fn init(
    config: &ApiConfig,
    database: &Database,
    events: &EventBus,
) -> Result<Vec<InitializedSlice>, BootstrapError> {
    database.migrate(&migrations()).await?;
    let seeded = trai_nutrition::seed(database).await?;
    info!(products = seeded, "Product catalog checked");

    let ai = ai_client(&config.ai)?;
    info!(ai = ai.is_some(), features = ?features::ENABLED, "Initializing feature slices");

    Ok(vec![
        trai_identity::init(&config.security)?,
        trai_progress::init(ai.clone()),
        trai_workouts::init(ai.clone()),
        trai_nutrition::init(&config.food, ai.clone())?,
        trai_attachments::init(&config.storage, events).await?,
        trai_profile::init(&config.storage, ai).await?,
    ])
}

/// System routes at the root, feature routes under [`API_PREFIX`].
pub fn router() -> OpenApiRouter<ApiState> {
    let api = OpenApiRouter::new()
        .merge(trai_identity::router())
        .merge(trai_admin::router())
        .merge(trai_goals::router())
        .merge(trai_progress::router())
        .merge(trai_workouts::router())
        .merge(trai_nutrition::router())
        .merge(trai_attachments::router())
        .merge(trai_profile::router());

    OpenApiRouter::new().merge(system_router()).nest(API_PREFIX, api)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn migration_keys_are_unique() {
        let all = migrations();
        let keys: HashSet<_> = all.iter().map(|m| (m.slice, m.version)).collect();
        assert_eq!(keys.len(), all.len());
        assert_eq!(all.first().map(|m| m.slice), Some("identity"));
    }

    #[test]
    fn ai_is_off_without_a_key() {
        let cfg = AiConfig { api_key: Some("   ".into()), ..AiConfig::default() };
        assert!(ai_client(&cfg).unwrap().is_none());
        assert!(ai_client(&AiConfig::default()).unwrap().is_none());

        let cfg = AiConfig { api_key: Some("gsk_test".into()), ..AiConfig::default() };
        assert!(ai_client(&cfg).unwrap().is_some());
    }

    #[test]
    fn feature_list() {
        assert!(features::is_enabled("nutrition"));
        assert!(!features::is_enabled("billing"));
    }
}
