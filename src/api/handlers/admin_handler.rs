//! Administrator handlers mounted under `/cms/admin`.
//!
//! Every route here sits behind `admin_required`.

use std::collections::BTreeMap;

use axum::{
    extract::State,
    response::Json,
    Extension,
    routing::{get, post, put},
    Router,
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

use crate::api::extractors::{GroupFilter, Pagination, SafeId, ValidatedJson};
use crate::api::middleware::CurrentUser;
use crate::api::AppState;
use crate::config::{ADMIN_MODULE, PASSWORD_PATTERN};
use crate::domain::{
    Group, GroupWithPermissions, NewGroup, RouteMeta, UpdateUserInfo, UserResponse,
};
use crate::errors::{AppError, AppResult};
use crate::types::{Envelope, GroupPage, Paginated, Success, UserPage};

static PASSWORD_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(PASSWORD_PATTERN).expect("password pattern is a valid regex"));

/// `(route name, permission name)` of every admin route
const ADMIN_ROUTES: [(&str, &str); 14] = [
    ("getAuthority", "Query all assignable permissions"),
    ("getAdminUsers", "Query all users"),
    ("changeUserPassword", "Change user password"),
    ("deleteUser", "Delete user"),
    ("updateUser", "Update user information"),
    ("getAdminGroups", "Query all permission groups and their permissions"),
    ("getAllGroup", "Query all permission groups"),
    ("getGroup", "Query a permission group and its permissions"),
    ("createGroup", "Create permission group"),
    ("updateGroup", "Update a permission group"),
    ("deleteGroup", "Delete a permission group"),
    ("dispatchAuth", "Assign a single permission"),
    ("dispatchAuths", "Assign multiple permissions"),
    ("removeAuths", "Remove multiple permissions"),
];

/// Route metadata of the admin routes. None of them is dispatchable.
pub fn admin_route_metas() -> Vec<RouteMeta> {
    ADMIN_ROUTES
        .iter()
        .map(|(name, auth)| RouteMeta::new(*name, *auth, ADMIN_MODULE, false))
        .collect()
}

/// Reset password request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ResetPasswordRequest {
    #[validate(regex(
        path = *PASSWORD_REGEX,
        message = "Password must be 6 to 22 letters, digits or _*&$#@"
    ))]
    #[schema(example = "123456", min_length = 6, max_length = 22)]
    pub new_password: String,
    #[validate(
        length(min = 1, message = "Please confirm the password"),
        must_match(other = "new_password", message = "The two passwords do not match")
    )]
    #[schema(example = "123456")]
    pub confirm_password: String,
}

/// Update user information request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateUserInfoRequest {
    #[validate(range(min = 1, message = "group_id must be a positive integer"))]
    #[schema(example = 2)]
    pub group_id: i32,
    #[validate(email(message = "Invalid email format"))]
    #[schema(example = "pedro@example.com")]
    pub email: Option<String>,
}

/// New permission group request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct NewGroupRequest {
    #[validate(length(min = 1, message = "Please enter the group name"))]
    #[schema(example = "editors")]
    pub name: String,
    #[schema(example = "Can edit articles")]
    pub info: Option<String>,
    /// Permission names to grant
    #[schema(example = json!(["Search logs"]))]
    pub auths: Vec<String>,
}

/// Update permission group request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateGroupRequest {
    #[validate(length(min = 1, message = "Please enter the group name"))]
    #[schema(example = "editors")]
    pub name: String,
    #[schema(example = "Can edit articles")]
    pub info: Option<String>,
}

/// Assign one permission request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct DispatchAuthRequest {
    #[validate(range(min = 1, message = "group_id must be a positive integer"))]
    #[schema(example = 2)]
    pub group_id: i32,
    #[validate(length(min = 1, message = "Please enter the permission name"))]
    #[schema(example = "Search logs")]
    pub auth: String,
}

/// Assign or remove several permissions request
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct GroupAuthsRequest {
    #[validate(range(min = 1, message = "group_id must be a positive integer"))]
    #[schema(example = 2)]
    pub group_id: i32,
    #[validate(length(min = 1, message = "Please enter at least one permission name"))]
    #[schema(example = json!(["Search logs", "Create book"]))]
    pub auths: Vec<String>,
}

/// Create admin routes
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/authority", get(get_authority))
        .route("/users", get(get_admin_users))
        .route("/password/:id", put(change_user_password))
        .route("/:id", put(update_user).delete(delete_user))
        .route("/groups", get(get_admin_groups))
        .route("/group/all", get(get_all_group))
        .route("/group", post(create_group))
        .route(
            "/group/:id",
            get(get_group).put(update_group).delete(delete_group),
        )
        .route("/dispatch", post(dispatch_auth))
        .route("/dispatch/patch", post(dispatch_auths))
        .route("/remove", post(remove_auths))
}

/// Query all assignable permissions grouped by module
#[utoipa::path(
    get,
    path = "/cms/admin/authority",
    tag = "Admin",
    responses(
        (status = 200, description = "`{module: {permission: [route names]}}`"),
        (status = 401, description = "Not a super administrator", body = Envelope)
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_authority(
    State(state): State<AppState>,
) -> Json<BTreeMap<String, BTreeMap<String, Vec<String>>>> {
    Json(state.admin_service.authorities())
}

/// Query common users, optionally by group
#[utoipa::path(
    get,
    path = "/cms/admin/users",
    tag = "Admin",
    params(
        ("group_id" = Option<i32>, Query, description = "Only users of this group"),
        ("count" = Option<u64>, Query, description = "Page size (default 10, max 50)"),
        ("page" = Option<u64>, Query, description = "Zero based page number")
    ),
    responses(
        (status = 200, description = "Page of users", body = UserPage),
        (status = 400, description = "Invalid query parameters", body = Envelope)
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_admin_users(
    State(state): State<AppState>,
    GroupFilter(group_id): GroupFilter,
    Pagination(page): Pagination,
) -> AppResult<Json<Paginated<UserResponse>>> {
    let users = state.admin_service.get_users(group_id, page).await?;
    Ok(Json(users))
}

/// Change the password of a user
#[utoipa::path(
    put,
    path = "/cms/admin/password/{id}",
    tag = "Admin",
    params(("id" = i32, Path, description = "User id")),
    request_body = ResetPasswordRequest,
    responses(
        (status = 201, description = "Password changed", body = Envelope),
        (status = 400, description = "Validation error", body = Envelope),
        (status = 404, description = "User not found", body = Envelope)
    ),
    security(("bearer_auth" = []))
)]
pub async fn change_user_password(
    State(state): State<AppState>,
    Extension(admin): Extension<CurrentUser>,
    SafeId(id): SafeId,
    ValidatedJson(payload): ValidatedJson<ResetPasswordRequest>,
) -> AppResult<Success> {
    state
        .admin_service
        .change_user_password(id, payload.new_password)
        .await?;
    tracing::info!(admin_id = admin.id, user_id = id, "Password reset by {}", admin.nickname);
    Ok(Success::new("Password changed"))
}

/// Delete a user
#[utoipa::path(
    delete,
    path = "/cms/admin/{id}",
    tag = "Admin",
    params(("id" = i32, Path, description = "User id")),
    responses(
        (status = 201, description = "User deleted", body = Envelope),
        (status = 403, description = "Super administrators cannot be deleted", body = Envelope),
        (status = 404, description = "User not found", body = Envelope)
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(admin): Extension<CurrentUser>,
    SafeId(id): SafeId,
) -> AppResult<Success> {
    state.admin_service.delete_user(id).await?;
    tracing::info!(admin_id = admin.id, user_id = id, "User deleted");
    Ok(Success::new("Operation succeeded"))
}

/// Update the group and email of a user
#[utoipa::path(
    put,
    path = "/cms/admin/{id}",
    tag = "Admin",
    params(("id" = i32, Path, description = "User id")),
    request_body = UpdateUserInfoRequest,
    responses(
        (status = 201, description = "User updated", body = Envelope),
        (status = 403, description = "Email already used", body = Envelope),
        (status = 404, description = "User or group not found", body = Envelope)
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_user(
    State(state): State<AppState>,
    Extension(admin): Extension<CurrentUser>,
    SafeId(id): SafeId,
    ValidatedJson(payload): ValidatedJson<UpdateUserInfoRequest>,
) -> AppResult<Success> {
    let info = UpdateUserInfo {
        group_id: payload.group_id,
        email: payload.email,
    };
    state.admin_service.update_user_info(id, info).await?;
    tracing::info!(admin_id = admin.id, user_id = id, "User updated");
    Ok(Success::new("Operation succeeded"))
}

/// Query permission groups with their permissions
#[utoipa::path(
    get,
    path = "/cms/admin/groups",
    tag = "Admin",
    params(
        ("count" = Option<u64>, Query, description = "Page size (default 10, max 50)"),
        ("page" = Option<u64>, Query, description = "Zero based page number")
    ),
    responses(
        (status = 200, description = "Page of groups", body = GroupPage),
        (status = 404, description = "No groups", body = Envelope)
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_admin_groups(
    State(state): State<AppState>,
    Pagination(page): Pagination,
) -> AppResult<Json<Paginated<GroupWithPermissions>>> {
    let groups = state.admin_service.get_groups(page).await?;
    Ok(Json(groups))
}

/// Query every permission group
#[utoipa::path(
    get,
    path = "/cms/admin/group/all",
    tag = "Admin",
    responses(
        (status = 200, description = "All groups", body = [Group]),
        (status = 404, description = "No groups", body = Envelope)
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_all_group(State(state): State<AppState>) -> AppResult<Json<Vec<Group>>> {
    let groups = state.admin_service.get_all_groups().await?;
    Ok(Json(groups))
}

/// Query one permission group with its permissions
#[utoipa::path(
    get,
    path = "/cms/admin/group/{id}",
    tag = "Admin",
    params(("id" = i32, Path, description = "Group id")),
    responses(
        (status = 200, description = "Group found", body = GroupWithPermissions),
        (status = 404, description = "Group not found", body = Envelope)
    ),
    security(("bearer_auth" = []))
)]
pub async fn get_group(
    State(state): State<AppState>,
    SafeId(id): SafeId,
) -> AppResult<Json<GroupWithPermissions>> {
    let group = state.admin_service.get_group(id).await?;
    Ok(Json(group))
}

/// Create a permission group
#[utoipa::path(
    post,
    path = "/cms/admin/group",
    tag = "Admin",
    request_body = NewGroupRequest,
    responses(
        (status = 201, description = "Group created", body = Envelope),
        (status = 400, description = "Validation error or write failure", body = Envelope),
        (status = 403, description = "Group name taken", body = Envelope),
        (status = 404, description = "Unknown permission", body = Envelope)
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_group(
    State(state): State<AppState>,
    Extension(admin): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<NewGroupRequest>,
) -> AppResult<Success> {
    let group = NewGroup {
        name: payload.name,
        info: payload.info,
        auths: payload.auths,
    };

    if !state.admin_service.create_group(group).await? {
        return Err(AppError::failed("Failed to create group"));
    }
    tracing::debug!(admin_id = admin.id, "Group created");
    Ok(Success::new("Group created"))
}

/// Update a permission group
#[utoipa::path(
    put,
    path = "/cms/admin/group/{id}",
    tag = "Admin",
    params(("id" = i32, Path, description = "Group id")),
    request_body = UpdateGroupRequest,
    responses(
        (status = 201, description = "Group updated", body = Envelope),
        (status = 403, description = "Group name taken", body = Envelope),
        (status = 404, description = "Group not found", body = Envelope)
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_group(
    State(state): State<AppState>,
    Extension(admin): Extension<CurrentUser>,
    SafeId(id): SafeId,
    ValidatedJson(payload): ValidatedJson<UpdateGroupRequest>,
) -> AppResult<Success> {
    state
        .admin_service
        .update_group(id, payload.name, payload.info)
        .await?;
    tracing::info!(admin_id = admin.id, group_id = id, "Group updated");
    Ok(Success::new("Group updated"))
}

/// Delete a permission group
#[utoipa::path(
    delete,
    path = "/cms/admin/group/{id}",
    tag = "Admin",
    params(("id" = i32, Path, description = "Group id")),
    responses(
        (status = 201, description = "Group deleted", body = Envelope),
        (status = 403, description = "Group still has users", body = Envelope),
        (status = 404, description = "Group not found", body = Envelope)
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_group(
    State(state): State<AppState>,
    Extension(admin): Extension<CurrentUser>,
    SafeId(id): SafeId,
) -> AppResult<Success> {
    state.admin_service.delete_group(id).await?;
    tracing::debug!(admin_id = admin.id, group_id = id, "Group deleted");
    Ok(Success::new("Group deleted"))
}

/// Assign one permission to a group
#[utoipa::path(
    post,
    path = "/cms/admin/dispatch",
    tag = "Admin",
    request_body = DispatchAuthRequest,
    responses(
        (status = 201, description = "Permission assigned", body = Envelope),
        (status = 403, description = "Already assigned", body = Envelope),
        (status = 404, description = "Group or permission not found", body = Envelope)
    ),
    security(("bearer_auth" = []))
)]
pub async fn dispatch_auth(
    State(state): State<AppState>,
    Extension(admin): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<DispatchAuthRequest>,
) -> AppResult<Success> {
    let group_id = payload.group_id;
    state
        .admin_service
        .dispatch_permission(group_id, payload.auth)
        .await?;
    tracing::info!(admin_id = admin.id, group_id, "Permission added");
    Ok(Success::new("Permission added"))
}

/// Assign several permissions to a group
#[utoipa::path(
    post,
    path = "/cms/admin/dispatch/patch",
    tag = "Admin",
    request_body = GroupAuthsRequest,
    responses(
        (status = 201, description = "Permissions assigned", body = Envelope),
        (status = 404, description = "Group or permission not found", body = Envelope)
    ),
    security(("bearer_auth" = []))
)]
pub async fn dispatch_auths(
    State(state): State<AppState>,
    Extension(admin): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<GroupAuthsRequest>,
) -> AppResult<Success> {
    let group_id = payload.group_id;
    state
        .admin_service
        .dispatch_permissions(group_id, payload.auths)
        .await?;
    tracing::info!(admin_id = admin.id, group_id, "Permissions added");
    Ok(Success::new("Permissions added"))
}

/// Remove several permissions from a group
#[utoipa::path(
    post,
    path = "/cms/admin/remove",
    tag = "Admin",
    request_body = GroupAuthsRequest,
    responses(
        (status = 201, description = "Permissions removed", body = Envelope),
        (status = 404, description = "Group not found", body = Envelope)
    ),
    security(("bearer_auth" = []))
)]
pub async fn remove_auths(
    State(state): State<AppState>,
    Extension(admin): Extension<CurrentUser>,
    ValidatedJson(payload): ValidatedJson<GroupAuthsRequest>,
) -> AppResult<Success> {
    let group_id = payload.group_id;
    state
        .admin_service
        .remove_permissions(group_id, payload.auths)
        .await?;
    tracing::info!(admin_id = admin.id, group_id, "Permissions removed");
    Ok(Success::new("Permissions removed"))
}
