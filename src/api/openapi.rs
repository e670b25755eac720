//! OpenAPI documentation configuration.
//!
//! Provides Swagger UI for API exploration and testing.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::admin_handler;
use crate::domain::{Group, GroupWithPermissions, PermissionView, UserResponse};
use crate::types::{Envelope, GroupPage, UserPage};

/// OpenAPI documentation for the admin routes
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Lin CMS Admin",
        version = "0.1.0",
        description = "User, permission group and permission management for Lin CMS",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:5000", description = "Local development server")
    ),
    paths(
        admin_handler::get_authority,
        admin_handler::get_admin_users,
        admin_handler::change_user_password,
        admin_handler::delete_user,
        admin_handler::update_user,
        admin_handler::get_admin_groups,
        admin_handler::get_all_group,
        admin_handler::get_group,
        admin_handler::create_group,
        admin_handler::update_group,
        admin_handler::delete_group,
        admin_handler::dispatch_auth,
        admin_handler::dispatch_auths,
        admin_handler::remove_auths,
    ),
    components(
        schemas(
            Envelope,
            UserResponse,
            UserPage,
            Group,
            GroupWithPermissions,
            GroupPage,
            PermissionView,
            admin_handler::ResetPasswordRequest,
            admin_handler::UpdateUserInfoRequest,
            admin_handler::NewGroupRequest,
            admin_handler::UpdateGroupRequest,
            admin_handler::DispatchAuthRequest,
            admin_handler::GroupAuthsRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Admin", description = "Super administrator operations")
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for JWT Bearer authentication
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("Access token issued by `admin token`"))
                        .build(),
                ),
            );
        }
    }
}
