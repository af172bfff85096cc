//! Admin slice. Every route requires the `admin` role.
//!
//! Deleting an account removes its rows in one transaction and publishes
//! [`UserDeleted`](trai_domain::events::UserDeleted) so the attachments slice can drop stored objects.

mod dto;
mod error;
mod handlers;
mod repository;

pub use dto::{AdminUser, ListUsersQuery, MessageResponse, RoleUpdateRequest, RoleUpdateResponse, UserPage};
pub use error::{AdminError, AdminErrorExt};

use trai_kernel::server::ApiState;
use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

/// `/admin/*` routes.
pub fn router() -> OpenApiRouter<ApiState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::list_users))
        .routes(routes!(handlers::get_user, handlers::delete_user))
        .routes(routes!(handlers::update_role))
}
