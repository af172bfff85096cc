#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Procedural macros shared by the TrAi workspace: runtime bootstrap, API models
//! and handlers, error enums and feature slices.
//!
//! Examples below are `ignore`d because they need the consuming crates in scope.

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, ItemFn, ItemStruct, parse_macro_input};

/// Bootstraps the tuned Tokio runtime around an `async fn main`.
///
/// # Arguments
///
/// * `server` - multi-thread runtime sized for the HTTP service.
/// * `probe` - single-threaded runtime for short-lived tools.
/// * `default` - worker threads detected from available parallelism.
/// * `worker_threads = N`, `stack_size = N`, `thread_name = "..."` - overrides
///   applied on top of the profile.
///
/// # Examples
///
/// ```rust,ignore
/// #[trai_runtime::main(server, thread_name = "trai-api")]
/// async fn main() -> anyhow::Result<()> {
///     Ok(())
/// }
/// ```
#[proc_macro_attribute]
pub fn main(args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    macros::runtime::expand_main(args.into(), input).into()
}

/// Declares a request or response body.
///
/// Adds `Debug`, `Serialize`, `Deserialize` and `utoipa::ToSchema` when missing,
/// uses `rename_all = "snake_case"` and `deny_unknown_fields` unless told otherwise.
///
/// ```rust,ignore
/// #[api_model(deny_unknown_fields = false)]
/// pub struct LoginRequest {
///     pub email: String,
///     pub password: String,
/// }
/// ```
#[proc_macro_attribute]
pub fn api_model(attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemStruct);
    macros::api::expand_api_model(attr.into(), input).into()
}

/// Registers an axum handler with `utoipa::path`.
///
/// Arguments are passed through unchanged (`get`, `path = "..."`, `responses(...)`, `tag`).
///
/// ```rust,ignore
/// #[api_handler(get, path = "/health", responses((status = OK, body = HealthResponse)), tag = "System")]
/// pub async fn health_handler() -> impl IntoResponse { /* ... */ }
/// ```
#[proc_macro_attribute]
pub fn api_handler(args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    macros::api::expand_api_handler(args.into(), input).into()
}

/// Turns an enum into a crate error type.
///
/// * Injects `#[derive(Debug, thiserror::Error)]`.
/// * Generates `<Name>Ext` with `.context(..)` for `Result<T, Name>` and for
///   `Result<T, Source>` of every variant carrying a `source` field.
/// * Generates `From<Source>` for those variants.
/// * Generates `From<&'static str>` / `From<String>` when an `Internal` variant exists.
/// * Generates `http_status()`; a variant opts into a code with `#[status(404)]`,
///   everything else is 500.
///
/// Variants must use named fields. A variant with a source must also carry
/// `context: Option<Cow<'static, str>>`.
///
/// ```rust,ignore
/// #[trai_error]
/// pub enum WorkoutsError {
///     #[status(404)]
///     #[error("{message}")]
///     NotFound { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
///
///     #[error("Database error{}: {source}", format_context(.context))]
///     Database { #[source] source: DatabaseError, context: Option<Cow<'static, str>> },
/// }
/// ```
#[proc_macro_attribute]
pub fn trai_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand_derive(input).into()
}

/// Turns a struct into a feature slice handle.
///
/// Generates `<Name>Inner` holding the fields, an `Arc` wrapper with `Deref`
/// and `From<<Name>Inner>`, and the `FeatureSlice` impl the kernel registry
/// needs. The registry name is the snake-cased struct name unless given as
/// `#[trai_slice(name = "...")]`.
///
/// ```rust,ignore
/// #[trai_derive::trai_slice]
/// pub struct Workouts {
///     pub ai: Option<AiClient>,
/// }
///
/// let slice = Workouts::new(WorkoutsInner { ai: None });
/// ```
#[proc_macro_attribute]
pub fn trai_slice(attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(item as ItemStruct);
    macros::slice::expand_slice(attr.into(), input).into()
}
