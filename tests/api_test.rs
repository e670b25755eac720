//! Integration tests for the admin API.
//!
//! These tests drive the full router with mock services, so they need
//! neither a database nor real tokens.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::Utc;
use sea_orm::DatabaseConnection;
use serde_json::{json, Value};
use tower::ServiceExt;

use lin_cms_admin::api::{create_router, AppState};
use lin_cms_admin::domain::{
    Group, GroupWithPermissions, NewGroup, Permission, UpdateUserInfo, User, UserActive,
    UserAdmin, UserResponse,
};
use lin_cms_admin::errors::{AppError, AppResult};
use lin_cms_admin::infra::Database;
use lin_cms_admin::services::{AdminService, AuthService, Claims, TokenResponse};
use lin_cms_admin::types::{Page, Paginated};

// =============================================================================
// Mock Services for Testing
// =============================================================================

const SUPER_TOKEN: &str = "super-token";
const COMMON_TOKEN: &str = "common-token";

fn user(id: i32, admin: UserAdmin) -> User {
    let now = Utc::now();
    User {
        id,
        nickname: format!("user{}", id),
        admin,
        active: UserActive::Active,
        email: None,
        group_id: Some(1),
        password_hash: "hashed".to_string(),
        create_time: now,
        update_time: now,
        delete_time: None,
    }
}

/// Mock auth service that recognises two fixed tokens
struct MockAuthService;

#[async_trait]
impl AuthService for MockAuthService {
    async fn register(
        &self,
        nickname: String,
        _password: String,
        email: Option<String>,
        admin: UserAdmin,
    ) -> AppResult<User> {
        let mut created = user(10, admin);
        created.nickname = nickname;
        created.email = email;
        Ok(created)
    }

    fn issue_token(&self, _user: &User) -> AppResult<TokenResponse> {
        Ok(TokenResponse {
            access_token: SUPER_TOKEN.to_string(),
            token_type: "Bearer".to_string(),
            expires_in: 3600,
        })
    }

    fn verify_token(&self, token: &str) -> AppResult<Claims> {
        let identity = match token {
            SUPER_TOKEN => 1,
            COMMON_TOKEN => 2,
            _ => return Err(AppError::InvalidToken),
        };
        Ok(Claims {
            identity,
            scope: "lin".to_string(),
            token_type: "access".to_string(),
            exp: Utc::now().timestamp() + 3600,
            iat: Utc::now().timestamp(),
        })
    }

    async fn authenticate(&self, token: &str) -> AppResult<User> {
        let claims = self.verify_token(token)?;
        let admin = if claims.identity == 1 {
            UserAdmin::Super
        } else {
            UserAdmin::Common
        };
        Ok(user(claims.identity, admin))
    }
}

/// Mock admin service with switchable failure modes
#[derive(Default)]
struct MockAdminService {
    no_groups: bool,
    create_fails: bool,
    last_user_query: Mutex<Option<(Option<i32>, Page)>>,
}

fn group(id: i32) -> Group {
    Group {
        id,
        name: format!("group{}", id),
        info: None,
    }
}

#[async_trait]
impl AdminService for MockAdminService {
    fn authorities(&self) -> BTreeMap<String, BTreeMap<String, Vec<String>>> {
        BTreeMap::from([(
            "Logs".to_string(),
            BTreeMap::from([("Search logs".to_string(), vec!["searchLog".to_string()])]),
        )])
    }

    async fn get_users(
        &self,
        group_id: Option<i32>,
        page: Page,
    ) -> AppResult<Paginated<UserResponse>> {
        *self.last_user_query.lock().unwrap() = Some((group_id, page));
        let users = vec![UserResponse::new(
            user(2, UserAdmin::Common),
            Some("group1".to_string()),
        )];
        Ok(Paginated::new(users, 1))
    }

    async fn change_user_password(&self, id: i32, _new_password: String) -> AppResult<()> {
        if id == 404 {
            return Err(AppError::not_found("User not found"));
        }
        Ok(())
    }

    async fn delete_user(&self, id: i32) -> AppResult<()> {
        if id == 1 {
            return Err(AppError::forbidden("Super administrators cannot be deleted"));
        }
        Ok(())
    }

    async fn update_user_info(&self, _id: i32, _info: UpdateUserInfo) -> AppResult<()> {
        Ok(())
    }

    async fn get_groups(&self, _page: Page) -> AppResult<Paginated<GroupWithPermissions>> {
        if self.no_groups {
            return Err(AppError::not_found("No permission groups found"));
        }
        let permissions = vec![Permission {
            id: 1,
            group_id: 1,
            auth: "Search logs".to_string(),
            module: "Logs".to_string(),
        }];
        Ok(Paginated::new(
            vec![GroupWithPermissions::new(group(1), &permissions)],
            1,
        ))
    }

    async fn get_all_groups(&self) -> AppResult<Vec<Group>> {
        if self.no_groups {
            return Err(AppError::not_found("No permission groups found"));
        }
        Ok(vec![group(1), group(2)])
    }

    async fn get_group(&self, id: i32) -> AppResult<GroupWithPermissions> {
        Ok(GroupWithPermissions::new(group(id), &[]))
    }

    async fn create_group(&self, _group: NewGroup) -> AppResult<bool> {
        Ok(!self.create_fails)
    }

    async fn update_group(&self, _id: i32, _name: String, _info: Option<String>) -> AppResult<()> {
        Ok(())
    }

    async fn delete_group(&self, _id: i32) -> AppResult<()> {
        Ok(())
    }

    async fn dispatch_permission(&self, _group_id: i32, _auth: String) -> AppResult<()> {
        Ok(())
    }

    async fn dispatch_permissions(&self, _group_id: i32, _auths: Vec<String>) -> AppResult<()> {
        Ok(())
    }

    async fn remove_permissions(&self, _group_id: i32, _auths: Vec<String>) -> AppResult<()> {
        Ok(())
    }
}

// =============================================================================
// Test Helpers
// =============================================================================

fn app_with(admin: Arc<MockAdminService>) -> Router {
    let database = Arc::new(Database::from_connection(DatabaseConnection::default()));
    create_router(AppState::new(Arc::new(MockAuthService), admin, database))
}

fn app() -> Router {
    app_with(Arc::new(MockAdminService::default()))
}

fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

// =============================================================================
// Authentication
// =============================================================================

#[tokio::test]
async fn test_missing_token_is_rejected() {
    let (status, body) = send(app(), request(Method::GET, "/cms/admin/users", None, None)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error_code"], 10000);
    assert_eq!(body["url"], "/cms/admin/users");
}

#[tokio::test]
async fn test_invalid_token_is_rejected() {
    let (status, body) = send(
        app(),
        request(Method::GET, "/cms/admin/users", Some("forged"), None),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error_code"], 10040);
}

#[tokio::test]
async fn test_common_user_is_rejected() {
    let (status, body) = send(
        app(),
        request(Method::GET, "/cms/admin/authority", Some(COMMON_TOKEN), None),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error_code"], 10000);
    assert_eq!(
        body["msg"],
        "Only super administrators may perform this operation"
    );
}

// =============================================================================
// Users
// =============================================================================

#[tokio::test]
async fn test_get_authority() {
    let (status, body) = send(
        app(),
        request(Method::GET, "/cms/admin/authority", Some(SUPER_TOKEN), None),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"Logs": {"Search logs": ["searchLog"]}}));
}

#[tokio::test]
async fn test_get_users_passes_filter_and_window() {
    let admin = Arc::new(MockAdminService::default());
    let (status, body) = send(
        app_with(admin.clone()),
        request(
            Method::GET,
            "/cms/admin/users?group_id=2&count=5&page=1",
            Some(SUPER_TOKEN),
            None,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_nums"], 1);
    assert_eq!(body["collection"][0]["group_name"], "group1");
    assert!(body["collection"][0].get("password_hash").is_none());
    assert_eq!(
        *admin.last_user_query.lock().unwrap(),
        Some((Some(2), Page { start: 5, count: 5 }))
    );
}

#[tokio::test]
async fn test_get_users_caps_page_size() {
    let admin = Arc::new(MockAdminService::default());
    let (status, _) = send(
        app_with(admin.clone()),
        request(Method::GET, "/cms/admin/users?count=500", Some(SUPER_TOKEN), None),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        *admin.last_user_query.lock().unwrap(),
        Some((None, Page { start: 0, count: 50 }))
    );
}

#[tokio::test]
async fn test_get_users_with_invalid_count() {
    let (status, body) = send(
        app(),
        request(Method::GET, "/cms/admin/users?count=abc", Some(SUPER_TOKEN), None),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], 10030);
}

#[tokio::test]
async fn test_get_users_with_page_beyond_offset_range() {
    let admin = Arc::new(MockAdminService::default());
    let (status, body) = send(
        app_with(admin.clone()),
        request(
            Method::GET,
            "/cms/admin/users?count=10&page=1000000000000000000",
            Some(SUPER_TOKEN),
            None,
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], 10030);
    assert_eq!(body["msg"], "page is out of range");
    assert!(admin.last_user_query.lock().unwrap().is_none());
}

#[tokio::test]
async fn test_non_integer_route_id() {
    let (status, body) = send(
        app(),
        request(
            Method::PUT,
            "/cms/admin/password/abc",
            Some(SUPER_TOKEN),
            Some(json!({"new_password": "123456", "confirm_password": "123456"})),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], 10030);
    assert_eq!(body["msg"], "Invalid route parameter");
    assert_eq!(body["url"], "/cms/admin/password/abc");
}

#[tokio::test]
async fn test_zero_route_id() {
    let (status, body) = send(
        app(),
        request(Method::DELETE, "/cms/admin/0", Some(SUPER_TOKEN), None),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["msg"], "Invalid route parameter");
}

#[tokio::test]
async fn test_change_password_mismatch() {
    let (status, body) = send(
        app(),
        request(
            Method::PUT,
            "/cms/admin/password/3",
            Some(SUPER_TOKEN),
            Some(json!({"new_password": "123456", "confirm_password": "654321"})),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], 10030);
    assert_eq!(body["msg"], "The two passwords do not match");
}

#[tokio::test]
async fn test_change_password() {
    let (status, body) = send(
        app(),
        request(
            Method::PUT,
            "/cms/admin/password/3",
            Some(SUPER_TOKEN),
            Some(json!({"new_password": "123456", "confirm_password": "123456"})),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(
        body,
        json!({"error_code": 0, "msg": "Password changed", "url": "/cms/admin/password/3"})
    );
}

#[tokio::test]
async fn test_change_password_of_missing_user() {
    let (status, body) = send(
        app(),
        request(
            Method::PUT,
            "/cms/admin/password/404",
            Some(SUPER_TOKEN),
            Some(json!({"new_password": "123456", "confirm_password": "123456"})),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error_code"], 10020);
}

#[tokio::test]
async fn test_delete_super_admin() {
    let (status, body) = send(
        app(),
        request(Method::DELETE, "/cms/admin/1", Some(SUPER_TOKEN), None),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error_code"], 10070);
}

#[tokio::test]
async fn test_update_user_with_invalid_email() {
    let (status, body) = send(
        app(),
        request(
            Method::PUT,
            "/cms/admin/2",
            Some(SUPER_TOKEN),
            Some(json!({"group_id": 1, "email": "nope"})),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["msg"], "Invalid email format");
}

#[tokio::test]
async fn test_update_user() {
    let (status, body) = send(
        app(),
        request(
            Method::PUT,
            "/cms/admin/2",
            Some(SUPER_TOKEN),
            Some(json!({"group_id": 1})),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["error_code"], 0);
}

// =============================================================================
// Groups
// =============================================================================

#[tokio::test]
async fn test_get_groups_formats_permissions() {
    let (status, body) = send(
        app(),
        request(Method::GET, "/cms/admin/groups", Some(SUPER_TOKEN), None),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_nums"], 1);
    assert_eq!(
        body["collection"][0]["auths"],
        json!([{"Logs": [{"module": "Logs", "auth": "Search logs"}]}])
    );
}

#[tokio::test]
async fn test_get_groups_when_none_exist() {
    let admin = Arc::new(MockAdminService {
        no_groups: true,
        ..Default::default()
    });
    let (status, body) = send(
        app_with(admin),
        request(Method::GET, "/cms/admin/groups", Some(SUPER_TOKEN), None),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error_code"], 10020);
}

#[tokio::test]
async fn test_get_all_groups_is_bare_array() {
    let (status, body) = send(
        app(),
        request(Method::GET, "/cms/admin/group/all", Some(SUPER_TOKEN), None),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn test_get_group() {
    let (status, body) = send(
        app(),
        request(Method::GET, "/cms/admin/group/5", Some(SUPER_TOKEN), None),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], 5);
    assert_eq!(body["auths"], json!([]));
}

#[tokio::test]
async fn test_create_group() {
    let (status, body) = send(
        app(),
        request(
            Method::POST,
            "/cms/admin/group",
            Some(SUPER_TOKEN),
            Some(json!({"name": "editors", "info": "Edit things", "auths": ["Search logs"]})),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["msg"], "Group created");
}

#[tokio::test]
async fn test_create_group_write_failure() {
    let admin = Arc::new(MockAdminService {
        create_fails: true,
        ..Default::default()
    });
    let (status, body) = send(
        app_with(admin),
        request(
            Method::POST,
            "/cms/admin/group",
            Some(SUPER_TOKEN),
            Some(json!({"name": "editors", "auths": []})),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], 9999);
    assert_eq!(body["msg"], "Failed to create group");
}

#[tokio::test]
async fn test_create_group_without_name() {
    let (status, body) = send(
        app(),
        request(
            Method::POST,
            "/cms/admin/group",
            Some(SUPER_TOKEN),
            Some(json!({"name": "", "auths": []})),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], 10030);
}

#[tokio::test]
async fn test_update_and_delete_group() {
    let (status, body) = send(
        app(),
        request(
            Method::PUT,
            "/cms/admin/group/3",
            Some(SUPER_TOKEN),
            Some(json!({"name": "guests"})),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["msg"], "Group updated");

    let (status, body) = send(
        app(),
        request(Method::DELETE, "/cms/admin/group/3", Some(SUPER_TOKEN), None),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["msg"], "Group deleted");
}

// =============================================================================
// Permission dispatch
// =============================================================================

#[tokio::test]
async fn test_dispatch_with_invalid_group_id() {
    let (status, body) = send(
        app(),
        request(
            Method::POST,
            "/cms/admin/dispatch",
            Some(SUPER_TOKEN),
            Some(json!({"group_id": 0, "auth": "Search logs"})),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["msg"], "group_id must be a positive integer");
}

#[tokio::test]
async fn test_dispatch_permissions() {
    let (status, body) = send(
        app(),
        request(
            Method::POST,
            "/cms/admin/dispatch/patch",
            Some(SUPER_TOKEN),
            Some(json!({"group_id": 1, "auths": ["Search logs"]})),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["url"], "/cms/admin/dispatch/patch");
}

#[tokio::test]
async fn test_remove_permissions_with_malformed_body() {
    let request = Request::builder()
        .method(Method::POST)
        .uri("/cms/admin/remove")
        .header(header::AUTHORIZATION, format!("Bearer {}", SUPER_TOKEN))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"group_id\": 1, \"auths\": "))
        .unwrap();
    let (status, body) = send(app(), request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_code"], 10030);
}

// =============================================================================
// Root
// =============================================================================

#[tokio::test]
async fn test_root_endpoint() {
    let response = app()
        .oneshot(request(Method::GET, "/", None, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
