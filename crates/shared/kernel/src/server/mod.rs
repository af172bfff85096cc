//! HTTP building blocks shared by every slice.

mod error;
mod extract;
mod health;
pub mod router;
mod state;

pub use error::ApiError;
pub use extract::{ApiJson, ApiQuery};
pub use health::{HealthResponse, WelcomeResponse};
pub use state::{ApiState, ApiStateBuilder, ApiStateError, ApiStateErrorExt, ApiStateInner};
