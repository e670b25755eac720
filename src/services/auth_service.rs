//! Authentication service - access tokens and the accounts they identify.
//!
//! Password handling lives in the domain `Password` value object; this
//! service signs and checks access tokens and resolves them to users.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;

use crate::config::{Config, SECONDS_PER_HOUR, TOKEN_SCOPE, TOKEN_TYPE_ACCESS, TOKEN_TYPE_BEARER};
use crate::domain::{Password, User, UserAdmin};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;

/// JWT claims payload
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub identity: i32,
    pub scope: String,
    #[serde(rename = "type")]
    pub token_type: String,
    pub exp: i64,
    pub iat: i64,
}

/// Token response returned when an access token is issued
#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    /// JWT access token
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub access_token: String,
    /// Token type (always "Bearer")
    #[schema(example = "Bearer")]
    pub token_type: String,
    /// Token expiration time in seconds
    #[schema(example = 3600)]
    pub expires_in: i64,
}

/// Authentication service trait for dependency injection.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Create an account; nickname and email must not be taken by a live user
    async fn register(
        &self,
        nickname: String,
        password: String,
        email: Option<String>,
        admin: UserAdmin,
    ) -> AppResult<User>;

    /// Sign an access token for the given user
    fn issue_token(&self, user: &User) -> AppResult<TokenResponse>;

    /// Verify JWT token and extract claims
    fn verify_token(&self, token: &str) -> AppResult<Claims>;

    /// Resolve an access token to the live user it identifies
    async fn authenticate(&self, token: &str) -> AppResult<User>;
}

fn generate_token(user: &User, config: &Config) -> AppResult<TokenResponse> {
    let now = Utc::now();
    let expires_at = now + Duration::hours(config.jwt_expiration_hours);

    let claims = Claims {
        identity: user.id,
        scope: TOKEN_SCOPE.to_string(),
        token_type: TOKEN_TYPE_ACCESS.to_string(),
        exp: expires_at.timestamp(),
        iat: now.timestamp(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret_bytes()),
    )?;

    Ok(TokenResponse {
        access_token: token,
        token_type: TOKEN_TYPE_BEARER.to_string(),
        expires_in: config.jwt_expiration_hours * SECONDS_PER_HOUR,
    })
}

fn verify_token_internal(token: &str, config: &Config) -> AppResult<Claims> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret_bytes()),
        &Validation::default(),
    )?;

    let claims = token_data.claims;
    if claims.scope != TOKEN_SCOPE || claims.token_type != TOKEN_TYPE_ACCESS {
        return Err(AppError::InvalidToken);
    }

    Ok(claims)
}

/// Concrete implementation of AuthService using Unit of Work.
pub struct Authenticator<U: UnitOfWork> {
    uow: Arc<U>,
    config: Config,
}

impl<U: UnitOfWork> Authenticator<U> {
    pub fn new(uow: Arc<U>, config: Config) -> Self {
        Self { uow, config }
    }
}

#[async_trait]
impl<U: UnitOfWork> AuthService for Authenticator<U> {
    async fn register(
        &self,
        nickname: String,
        password: String,
        email: Option<String>,
        admin: UserAdmin,
    ) -> AppResult<User> {
        let users = self.uow.users();

        if users.find_by_nickname(&nickname).await?.is_some() {
            return Err(AppError::forbidden("Nickname already exists"));
        }
        if let Some(email) = &email {
            if users.find_by_email(email).await?.is_some() {
                return Err(AppError::forbidden("Email already exists"));
            }
        }

        let password_hash = Password::new(&password)?.into_string();
        let user = users
            .create(nickname, password_hash, email, admin, None)
            .await
            .map_err(|e| e.on_unique_violation("Nickname already exists"))?;

        tracing::info!(user_id = user.id, "Registered user {}", user.nickname);
        Ok(user)
    }

    fn issue_token(&self, user: &User) -> AppResult<TokenResponse> {
        generate_token(user, &self.config)
    }

    fn verify_token(&self, token: &str) -> AppResult<Claims> {
        verify_token_internal(token, &self.config)
    }

    async fn authenticate(&self, token: &str) -> AppResult<User> {
        let claims = self.verify_token(token)?;

        self.uow
            .users()
            .find_by_id(claims.identity)
            .await?
            .ok_or_not_found("User not found")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::UserActive;
    use crate::infra::{MockUnitOfWork, MockUserRepository, UserRepository};

    const SECRET: &str = "test-secret-key-minimum-32-chars!!";

    fn config() -> Config {
        Config::new("postgres://localhost/test", SECRET)
    }

    fn user(id: i32, admin: UserAdmin) -> User {
        let now = Utc::now();
        User {
            id,
            nickname: "root".to_string(),
            admin,
            active: UserActive::Active,
            email: None,
            group_id: None,
            password_hash: String::new(),
            create_time: now,
            update_time: now,
            delete_time: None,
        }
    }

    fn authenticator(users: MockUserRepository) -> Authenticator<MockUnitOfWork> {
        let users: Arc<dyn UserRepository> = Arc::new(users);
        let mut uow = MockUnitOfWork::new();
        uow.expect_users().returning(move || users.clone());
        Authenticator::new(Arc::new(uow), config())
    }

    fn sign(claims: &Claims) -> String {
        encode(
            &Header::default(),
            claims,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap()
    }

    #[test]
    fn test_issued_token_round_trips() {
        let auth = authenticator(MockUserRepository::new());

        let token = auth.issue_token(&user(5, UserAdmin::Super)).unwrap();
        assert_eq!(token.token_type, "Bearer");
        assert_eq!(token.expires_in, 3600);

        let claims = auth.verify_token(&token.access_token).unwrap();
        assert_eq!(claims.identity, 5);
        assert_eq!(claims.scope, "lin");
        assert_eq!(claims.token_type, "access");
    }

    #[test]
    fn test_rejects_token_with_foreign_scope() {
        let auth = authenticator(MockUserRepository::new());
        let now = Utc::now().timestamp();
        let token = sign(&Claims {
            identity: 1,
            scope: "other".to_string(),
            token_type: "access".to_string(),
            exp: now + 600,
            iat: now,
        });

        assert!(matches!(auth.verify_token(&token), Err(AppError::InvalidToken)));
    }

    #[test]
    fn test_rejects_refresh_token() {
        let auth = authenticator(MockUserRepository::new());
        let now = Utc::now().timestamp();
        let token = sign(&Claims {
            identity: 1,
            scope: "lin".to_string(),
            token_type: "refresh".to_string(),
            exp: now + 600,
            iat: now,
        });

        assert!(matches!(auth.verify_token(&token), Err(AppError::InvalidToken)));
    }

    #[test]
    fn test_expired_token() {
        let auth = authenticator(MockUserRepository::new());
        let now = Utc::now().timestamp();
        let token = sign(&Claims {
            identity: 1,
            scope: "lin".to_string(),
            token_type: "access".to_string(),
            exp: now - 7200,
            iat: now - 10800,
        });

        assert!(matches!(auth.verify_token(&token), Err(AppError::ExpiredToken)));
    }

    #[test]
    fn test_garbage_token() {
        let auth = authenticator(MockUserRepository::new());
        assert!(matches!(auth.verify_token("not-a-jwt"), Err(AppError::InvalidToken)));
    }

    #[tokio::test]
    async fn test_authenticate_resolves_user() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_id()
            .withf(|id| *id == 9)
            .returning(|id| Ok(Some(user(id, UserAdmin::Super))));
        let auth = authenticator(users);

        let token = auth.issue_token(&user(9, UserAdmin::Super)).unwrap();
        let found = auth.authenticate(&token.access_token).await.unwrap();
        assert_eq!(found.id, 9);
        assert!(found.is_super());
    }

    #[tokio::test]
    async fn test_authenticate_missing_user() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().returning(|_| Ok(None));
        let auth = authenticator(users);

        let token = auth.issue_token(&user(9, UserAdmin::Super)).unwrap();
        let err = auth.authenticate(&token.access_token).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_register_rejects_taken_nickname() {
        let mut users = MockUserRepository::new();
        users
            .expect_find_by_nickname()
            .returning(|_| Ok(Some(user(1, UserAdmin::Common))));
        users.expect_create().never();
        let auth = authenticator(users);

        let err = auth
            .register("root".to_string(), "123456".to_string(), None, UserAdmin::Super)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[tokio::test]
    async fn test_register_rejects_nickname_of_deleted_user() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_nickname().returning(|_| {
            let mut deleted = user(4, UserAdmin::Common);
            deleted.delete_time = Some(Utc::now());
            Ok(Some(deleted))
        });
        users.expect_create().never();
        let auth = authenticator(users);

        let err = auth
            .register("root".to_string(), "123456".to_string(), None, UserAdmin::Super)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(ref m) if m == "Nickname already exists"));
    }

    #[tokio::test]
    async fn test_register_hashes_password() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_nickname().returning(|_| Ok(None));
        users.expect_find_by_email().returning(|_| Ok(None));
        users
            .expect_create()
            .withf(|nickname, hash, email, admin, group_id| {
                nickname == "root"
                    && hash.starts_with("$argon2")
                    && email.as_deref() == Some("root@example.com")
                    && *admin == UserAdmin::Super
                    && group_id.is_none()
            })
            .returning(|nickname, hash, email, admin, _| {
                let mut created = user(1, admin);
                created.nickname = nickname;
                created.password_hash = hash;
                created.email = email;
                Ok(created)
            });
        let auth = authenticator(users);

        let created = auth
            .register(
                "root".to_string(),
                "123456".to_string(),
                Some("root@example.com".to_string()),
                UserAdmin::Super,
            )
            .await
            .unwrap();
        assert!(Password::from_hash(created.password_hash).verify("123456"));
    }
}
