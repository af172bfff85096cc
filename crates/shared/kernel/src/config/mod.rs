use config::{Config, Environment, File};
use serde::de::DeserializeOwned;
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use tracing::info;

pub const ENV_PREFIX: &str = "TRAI";

#[trai_derive::trai_error]
pub enum ConfigError {
    #[error("Config error{}: {source}", format_context(.context))]
    Config { source: config::ConfigError, context: Option<Cow<'static, str>> },
}

/// Layered configuration: an optional file, then `TRAI__*` environment overrides.
///
/// 1. **Base file**: `path` (default `server`), any extension the `config` crate
///    understands (`server.toml`). A missing file is not an error.
/// 2. **Environment**: `TRAI__SECTION__KEY`, e.g. `TRAI__DATABASE__URL` maps to
///    `database.url`.
///
/// # Errors
/// [`ConfigError::Config`] when a source is malformed or does not match `T`.
///
/// # Example
/// ```rust
/// use trai_kernel::config::load_config;
///
/// #[derive(Default, serde::Deserialize)]
/// struct AppConfig {
///     port: u16,
/// }
///
/// let cfg: AppConfig = load_config(Some("config/local")).unwrap_or_default();
/// ```
pub fn load_config<T>(path: Option<impl AsRef<Path>>) -> Result<T, ConfigError>
where
    T: DeserializeOwned,
{
    let effective_path = path.map_or_else(|| PathBuf::from("server"), |p| p.as_ref().to_path_buf());

    let builder = Config::builder()
        .add_source(File::from(effective_path.as_path()).required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

    info!(path = %effective_path.display(), "Loading configuration");

    let config = builder
        .build()
        .context("Failed to build config")?
        .try_deserialize::<T>()
        .context("Failed to deserialize config")?;

    Ok(config)
}
