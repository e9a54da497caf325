use async_trait::async_trait;
use axum::{
    extract::{FromRequestParts, OptionalFromRequestParts},
    http::{Request, StatusCode, request::Parts},
};
use blog_portal::{
    AppState,
    auth::{AuthUser, Claims},
    config::{AppConfig, Env},
    models::{Category, Comment, CreatePostRequest, Post, PostPage, UpdatePostRequest, User},
    repository::Repository,
};
use jsonwebtoken::{EncodingKey, Header, encode};
use std::sync::Arc;
use uuid::Uuid;

// --- Minimal mock: the extractor only ever calls get_user ---

struct UserOnlyRepo {
    user: Option<User>,
}

#[async_trait]
impl Repository for UserOnlyRepo {
    async fn list_published_posts(&self, _page: i64) -> sqlx::Result<PostPage> {
        Ok(PostPage::default())
    }
    async fn list_category_posts(&self, _category_id: Uuid, _page: i64) -> sqlx::Result<PostPage> {
        Ok(PostPage::default())
    }
    async fn list_author_posts(
        &self,
        _author_id: Uuid,
        _include_hidden: bool,
        _page: i64,
    ) -> sqlx::Result<PostPage> {
        Ok(PostPage::default())
    }
    async fn get_post(&self, _id: Uuid) -> sqlx::Result<Option<Post>> {
        Ok(None)
    }
    async fn get_published_post(&self, _id: Uuid) -> sqlx::Result<Option<Post>> {
        Ok(None)
    }
    async fn create_post(&self, _req: CreatePostRequest, _author_id: Uuid) -> sqlx::Result<Post> {
        Ok(Post::default())
    }
    async fn update_post(&self, _id: Uuid, _req: UpdatePostRequest) -> sqlx::Result<Option<Post>> {
        Ok(None)
    }
    async fn delete_post(&self, _id: Uuid) -> sqlx::Result<bool> {
        Ok(false)
    }
    async fn get_comments(&self, _post_id: Uuid) -> sqlx::Result<Vec<Comment>> {
        Ok(vec![])
    }
    async fn get_comment(&self, _id: i64) -> sqlx::Result<Option<Comment>> {
        Ok(None)
    }
    async fn add_comment(
        &self,
        _post_id: Uuid,
        _author_id: Uuid,
        _text: String,
    ) -> sqlx::Result<Comment> {
        Ok(Comment::default())
    }
    async fn update_comment(&self, _id: i64, _text: String) -> sqlx::Result<Option<Comment>> {
        Ok(None)
    }
    async fn delete_comment(&self, _id: i64) -> sqlx::Result<bool> {
        Ok(false)
    }
    async fn get_published_category(&self, _slug: &str) -> sqlx::Result<Option<Category>> {
        Ok(None)
    }
    async fn get_user(&self, id: Uuid) -> sqlx::Result<Option<User>> {
        Ok(self.user.clone().filter(|u| u.id == id))
    }
    async fn get_user_by_username(&self, _username: &str) -> sqlx::Result<Option<User>> {
        Ok(self.user.clone())
    }
}

// --- Test utilities ---

const USER_ID: Uuid = Uuid::from_u128(42);

fn known_user() -> User {
    User {
        id: USER_ID,
        username: "author".to_string(),
        email: "author@example.com".to_string(),
    }
}

fn state_with(env: Env, user: Option<User>) -> AppState {
    AppState {
        repo: Arc::new(UserOnlyRepo { user }),
        config: AppConfig {
            env,
            ..AppConfig::default()
        },
    }
}

fn parts_with_headers(headers: &[(&str, &str)]) -> Parts {
    let mut builder = Request::builder().uri("/posts/new");
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    let (parts, ()) = builder.body(()).unwrap().into_parts();
    parts
}

fn bearer_token(sub: Uuid, secret: &str, exp_offset: i64) -> String {
    let now = chrono::Utc::now().timestamp();
    let claims = Claims {
        sub,
        exp: (now + exp_offset) as usize,
        iat: now as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

// --- Tests ---

#[tokio::test]
async fn test_missing_credentials_redirect_to_login() {
    let state = state_with(Env::Local, Some(known_user()));
    let mut parts = parts_with_headers(&[]);

    let result = <AuthUser as FromRequestParts<AppState>>::from_request_parts(&mut parts, &state)
        .await;

    let response = result.unwrap_err();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers().get("location").unwrap(), "/login");
}

#[tokio::test]
async fn test_valid_bearer_token_resolves_user() {
    let state = state_with(Env::Production, Some(known_user()));
    let token = bearer_token(USER_ID, &state.config.jwt_secret, 3600);
    let mut parts = parts_with_headers(&[("authorization", &format!("Bearer {token}"))]);

    let user = <AuthUser as FromRequestParts<AppState>>::from_request_parts(&mut parts, &state)
        .await
        .unwrap();

    assert_eq!(user.id, USER_ID);
    assert_eq!(user.username, "author");
}

#[tokio::test]
async fn test_expired_token_redirects_to_login() {
    let state = state_with(Env::Production, Some(known_user()));
    let token = bearer_token(USER_ID, &state.config.jwt_secret, -3600);
    let mut parts = parts_with_headers(&[("authorization", &format!("Bearer {token}"))]);

    let result = <AuthUser as FromRequestParts<AppState>>::from_request_parts(&mut parts, &state)
        .await;

    assert_eq!(result.unwrap_err().status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_token_for_deleted_user_is_rejected() {
    // A signed, unexpired token whose subject no longer exists in the store.
    let state = state_with(Env::Production, None);
    let token = bearer_token(USER_ID, &state.config.jwt_secret, 3600);
    let mut parts = parts_with_headers(&[("authorization", &format!("Bearer {token}"))]);

    let result = <AuthUser as FromRequestParts<AppState>>::from_request_parts(&mut parts, &state)
        .await;

    assert_eq!(result.unwrap_err().status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_local_header_bypass_resolves_known_user() {
    let state = state_with(Env::Local, Some(known_user()));
    let mut parts = parts_with_headers(&[("x-user-id", &USER_ID.to_string())]);

    let user = <AuthUser as FromRequestParts<AppState>>::from_request_parts(&mut parts, &state)
        .await
        .unwrap();

    assert_eq!(user.id, USER_ID);
}

#[tokio::test]
async fn test_header_bypass_inert_in_production() {
    let state = state_with(Env::Production, Some(known_user()));
    let mut parts = parts_with_headers(&[("x-user-id", &USER_ID.to_string())]);

    let result = <AuthUser as FromRequestParts<AppState>>::from_request_parts(&mut parts, &state)
        .await;

    // Without a bearer token the request stays anonymous and is redirected.
    assert_eq!(result.unwrap_err().status(), StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn test_optional_extraction_yields_none_for_anonymous() {
    let state = state_with(Env::Local, Some(known_user()));
    let mut parts = parts_with_headers(&[]);

    let viewer =
        <AuthUser as OptionalFromRequestParts<AppState>>::from_request_parts(&mut parts, &state)
            .await
            .unwrap();

    assert!(viewer.is_none());
}
