use crate::{
    AppState,
    auth::AuthUser,
    models::{
        CategoryPage, Comment, CreateCommentRequest, CreatePostRequest, Post, PostDetail,
        PostPage, ProfilePage, UpdateCommentRequest, UpdatePostRequest,
    },
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use uuid::Uuid;

// --- Query Structs ---

/// PageQuery
///
/// The accepted query parameter for every listing endpoint. Pages are
/// 1-based; anything below 1 is clamped to the first page.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct PageQuery {
    pub page: Option<i64>,
}

impl PageQuery {
    fn page(&self) -> i64 {
        self.page.unwrap_or(1)
    }
}

// --- Response Helpers ---

fn not_found() -> Response {
    StatusCode::NOT_FOUND.into_response()
}

fn db_error(e: sqlx::Error) -> Response {
    tracing::error!("database error: {:?}", e);
    StatusCode::INTERNAL_SERVER_ERROR.into_response()
}

fn post_detail_path(id: Uuid) -> String {
    format!("/posts/{id}")
}

/// Ownership guard: compares the requesting user against an entity's author
/// and, on mismatch, yields a redirect to `fallback` instead of performing
/// the mutation or erroring. Applied independently on both the form-display
/// and the action path of every edit/delete route.
fn guard_author(viewer: &AuthUser, author_id: Uuid, fallback: &str) -> Result<(), Response> {
    if viewer.id != author_id {
        return Err(Redirect::to(fallback).into_response());
    }
    Ok(())
}

/// Loads a comment and verifies it belongs to the post named in the path;
/// a dangling or mismatched id is a 404.
async fn load_comment(
    state: &AppState,
    post_id: Uuid,
    comment_id: i64,
) -> Result<Comment, Response> {
    let comment = state
        .repo
        .get_comment(comment_id)
        .await
        .map_err(db_error)?
        .ok_or_else(not_found)?;
    if comment.post_id != post_id {
        return Err(not_found());
    }
    Ok(comment)
}

// --- Listing Handlers ---

/// index
///
/// [Public Route] Site-wide listing of publicly visible posts: publish flag
/// set, publication date in the past, category published. Annotated with
/// comment counts, 10 per page, newest first.
#[utoipa::path(
    get,
    path = "/",
    params(PageQuery),
    responses((status = 200, description = "Visible posts", body = PostPage))
)]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<PostPage>, Response> {
    let page = state
        .repo
        .list_published_posts(query.page())
        .await
        .map_err(db_error)?;
    Ok(Json(page))
}

/// category_posts
///
/// [Public Route] Listing scoped to one category. The slug must resolve to a
/// *published* category, otherwise the route is a 404; the posts themselves
/// still pass the base visibility filter.
#[utoipa::path(
    get,
    path = "/category/{slug}",
    params(("slug" = String, Path, description = "Category slug"), PageQuery),
    responses(
        (status = 200, description = "Category posts", body = CategoryPage),
        (status = 404, description = "Unknown or unpublished category")
    )
)]
pub async fn category_posts(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Json<CategoryPage>, Response> {
    let category = state
        .repo
        .get_published_category(&slug)
        .await
        .map_err(db_error)?
        .ok_or_else(not_found)?;

    let posts = state
        .repo
        .list_category_posts(category.id, query.page())
        .await
        .map_err(db_error)?;

    Ok(Json(CategoryPage { category, posts }))
}

/// profile
///
/// [Public Route] A user's profile with their posts. Visitors see only
/// publicly visible posts; the owner viewing their own profile also sees
/// unpublished and future-dated ones, which is why the viewer is extracted
/// optionally here.
#[utoipa::path(
    get,
    path = "/profile/{username}",
    params(("username" = String, Path, description = "Profile username"), PageQuery),
    responses(
        (status = 200, description = "Profile and posts", body = ProfilePage),
        (status = 404, description = "Unknown user")
    )
)]
pub async fn profile(
    viewer: Option<AuthUser>,
    State(state): State<AppState>,
    Path(username): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Json<ProfilePage>, Response> {
    let profile = state
        .repo
        .get_user_by_username(&username)
        .await
        .map_err(db_error)?
        .ok_or_else(not_found)?;

    let is_owner = viewer.is_some_and(|v| v.id == profile.id);
    let posts = state
        .repo
        .list_author_posts(profile.id, is_owner, query.page())
        .await
        .map_err(db_error)?;

    Ok(Json(ProfilePage { profile, posts }))
}

/// post_detail
///
/// [Public Route] Single post with its comments. The author sees their post
/// unconditionally; everyone else only if it passes the full visibility
/// filter. Anything else is a 404, so hidden posts are indistinguishable
/// from missing ones.
#[utoipa::path(
    get,
    path = "/posts/{id}",
    params(("id" = Uuid, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Post with comments", body = PostDetail),
        (status = 404, description = "Missing or not visible")
    )
)]
pub async fn post_detail(
    viewer: Option<AuthUser>,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PostDetail>, Response> {
    let post = state
        .repo
        .get_post(id)
        .await
        .map_err(db_error)?
        .ok_or_else(not_found)?;

    let post = if viewer.is_some_and(|v| v.id == post.author_id) {
        post
    } else {
        state
            .repo
            .get_published_post(id)
            .await
            .map_err(db_error)?
            .ok_or_else(not_found)?
    };

    let comments = state.repo.get_comments(id).await.map_err(db_error)?;

    Ok(Json(PostDetail { post, comments }))
}

// --- Post Mutation Handlers ---

/// create_post
///
/// [Authenticated Route] Submits a new post. The author is always the
/// requesting user, never payload-controlled. Success lands on the author's
/// profile, where the fresh post is visible even if scheduled or hidden.
#[utoipa::path(
    post,
    path = "/posts/new",
    request_body = CreatePostRequest,
    responses((status = 303, description = "Created; redirects to the author's profile"))
)]
pub async fn create_post(
    viewer: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreatePostRequest>,
) -> Result<Redirect, Response> {
    state
        .repo
        .create_post(payload, viewer.id)
        .await
        .map_err(db_error)?;

    Ok(Redirect::to(&format!("/profile/{}", viewer.username)))
}

/// edit_post_form
///
/// [Authenticated Route] Fetches a post for the edit form. A non-author is
/// redirected to the post detail page; the same guard runs again on the
/// action path, so neither can be skipped.
#[utoipa::path(
    get,
    path = "/posts/{id}/edit",
    params(("id" = Uuid, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Post for editing", body = Post),
        (status = 303, description = "Not the author; redirects to the post"),
        (status = 404, description = "Missing post")
    )
)]
pub async fn edit_post_form(
    viewer: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Post>, Response> {
    let post = state
        .repo
        .get_post(id)
        .await
        .map_err(db_error)?
        .ok_or_else(not_found)?;
    guard_author(&viewer, post.author_id, &post_detail_path(id))?;

    Ok(Json(post))
}

/// update_post
///
/// [Authenticated Route] Applies a partial update to the viewer's own post.
/// Non-authors are redirected to the post detail without touching the row.
#[utoipa::path(
    post,
    path = "/posts/{id}/edit",
    params(("id" = Uuid, Path, description = "Post ID")),
    request_body = UpdatePostRequest,
    responses(
        (status = 303, description = "Updated or not the author; redirects to the post"),
        (status = 404, description = "Missing post")
    )
)]
pub async fn update_post(
    viewer: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePostRequest>,
) -> Result<Redirect, Response> {
    let post = state
        .repo
        .get_post(id)
        .await
        .map_err(db_error)?
        .ok_or_else(not_found)?;
    guard_author(&viewer, post.author_id, &post_detail_path(id))?;

    state
        .repo
        .update_post(id, payload)
        .await
        .map_err(db_error)?;

    Ok(Redirect::to(&post_detail_path(id)))
}

/// delete_post_form
///
/// [Authenticated Route] Fetches a post for the delete-confirmation page.
/// A non-author is sent to the index instead.
#[utoipa::path(
    get,
    path = "/posts/{id}/delete",
    params(("id" = Uuid, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Post pending deletion", body = Post),
        (status = 303, description = "Not the author; redirects to the index"),
        (status = 404, description = "Missing post")
    )
)]
pub async fn delete_post_form(
    viewer: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Post>, Response> {
    let post = state
        .repo
        .get_post(id)
        .await
        .map_err(db_error)?
        .ok_or_else(not_found)?;
    guard_author(&viewer, post.author_id, "/")?;

    Ok(Json(post))
}

/// delete_post
///
/// [Authenticated Route] Deletes the viewer's own post. Non-authors are
/// redirected to the index and the post survives.
#[utoipa::path(
    post,
    path = "/posts/{id}/delete",
    params(("id" = Uuid, Path, description = "Post ID")),
    responses(
        (status = 303, description = "Deleted or not the author; redirects to the index"),
        (status = 404, description = "Missing post")
    )
)]
pub async fn delete_post(
    viewer: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Redirect, Response> {
    let post = state
        .repo
        .get_post(id)
        .await
        .map_err(db_error)?
        .ok_or_else(not_found)?;
    guard_author(&viewer, post.author_id, "/")?;

    state.repo.delete_post(id).await.map_err(db_error)?;

    Ok(Redirect::to("/"))
}

// --- Comment Mutation Handlers ---

/// add_comment
///
/// [Authenticated Route] Posts a comment. The target post must exist (404
/// otherwise); the comment's author is the requesting user. Success lands
/// back on the post detail.
#[utoipa::path(
    post,
    path = "/posts/{id}/comment",
    params(("id" = Uuid, Path, description = "Post ID")),
    request_body = CreateCommentRequest,
    responses(
        (status = 303, description = "Comment added; redirects to the post"),
        (status = 404, description = "Missing post")
    )
)]
pub async fn add_comment(
    viewer: AuthUser,
    State(state): State<AppState>,
    Path(post_id): Path<Uuid>,
    Json(payload): Json<CreateCommentRequest>,
) -> Result<Redirect, Response> {
    state
        .repo
        .get_post(post_id)
        .await
        .map_err(db_error)?
        .ok_or_else(not_found)?;

    state
        .repo
        .add_comment(post_id, viewer.id, payload.text)
        .await
        .map_err(db_error)?;

    Ok(Redirect::to(&post_detail_path(post_id)))
}

/// edit_comment_form
///
/// [Authenticated Route] Fetches a comment for its edit form. A non-author
/// is redirected to the post detail page.
#[utoipa::path(
    get,
    path = "/posts/{post_id}/comment/{comment_id}/edit",
    params(
        ("post_id" = Uuid, Path, description = "Post ID"),
        ("comment_id" = i64, Path, description = "Comment ID")
    ),
    responses(
        (status = 200, description = "Comment for editing", body = Comment),
        (status = 303, description = "Not the author; redirects to the post"),
        (status = 404, description = "Missing comment")
    )
)]
pub async fn edit_comment_form(
    viewer: AuthUser,
    State(state): State<AppState>,
    Path((post_id, comment_id)): Path<(Uuid, i64)>,
) -> Result<Json<Comment>, Response> {
    let comment = load_comment(&state, post_id, comment_id).await?;
    guard_author(&viewer, comment.author_id, &post_detail_path(post_id))?;

    Ok(Json(comment))
}

/// update_comment
///
/// [Authenticated Route] Replaces the text of the viewer's own comment.
/// Non-authors are redirected to the post detail without a write.
#[utoipa::path(
    post,
    path = "/posts/{post_id}/comment/{comment_id}/edit",
    params(
        ("post_id" = Uuid, Path, description = "Post ID"),
        ("comment_id" = i64, Path, description = "Comment ID")
    ),
    request_body = UpdateCommentRequest,
    responses(
        (status = 303, description = "Updated or not the author; redirects to the post"),
        (status = 404, description = "Missing comment")
    )
)]
pub async fn update_comment(
    viewer: AuthUser,
    State(state): State<AppState>,
    Path((post_id, comment_id)): Path<(Uuid, i64)>,
    Json(payload): Json<UpdateCommentRequest>,
) -> Result<Redirect, Response> {
    let comment = load_comment(&state, post_id, comment_id).await?;
    guard_author(&viewer, comment.author_id, &post_detail_path(post_id))?;

    state
        .repo
        .update_comment(comment_id, payload.text)
        .await
        .map_err(db_error)?;

    Ok(Redirect::to(&post_detail_path(post_id)))
}

/// delete_comment_form
///
/// [Authenticated Route] Fetches a comment for its delete-confirmation page,
/// with the same guard as the destructive path.
#[utoipa::path(
    get,
    path = "/posts/{post_id}/comment/{comment_id}/delete",
    params(
        ("post_id" = Uuid, Path, description = "Post ID"),
        ("comment_id" = i64, Path, description = "Comment ID")
    ),
    responses(
        (status = 200, description = "Comment pending deletion", body = Comment),
        (status = 303, description = "Not the author; redirects to the post"),
        (status = 404, description = "Missing comment")
    )
)]
pub async fn delete_comment_form(
    viewer: AuthUser,
    State(state): State<AppState>,
    Path((post_id, comment_id)): Path<(Uuid, i64)>,
) -> Result<Json<Comment>, Response> {
    let comment = load_comment(&state, post_id, comment_id).await?;
    guard_author(&viewer, comment.author_id, &post_detail_path(post_id))?;

    Ok(Json(comment))
}

/// delete_comment
///
/// [Authenticated Route] Deletes the viewer's own comment; non-authors are
/// redirected to the post detail and the comment survives.
#[utoipa::path(
    post,
    path = "/posts/{post_id}/comment/{comment_id}/delete",
    params(
        ("post_id" = Uuid, Path, description = "Post ID"),
        ("comment_id" = i64, Path, description = "Comment ID")
    ),
    responses(
        (status = 303, description = "Deleted or not the author; redirects to the post"),
        (status = 404, description = "Missing comment")
    )
)]
pub async fn delete_comment(
    viewer: AuthUser,
    State(state): State<AppState>,
    Path((post_id, comment_id)): Path<(Uuid, i64)>,
) -> Result<Redirect, Response> {
    let comment = load_comment(&state, post_id, comment_id).await?;
    guard_author(&viewer, comment.author_id, &post_detail_path(post_id))?;

    state
        .repo
        .delete_comment(comment_id)
        .await
        .map_err(db_error)?;

    Ok(Redirect::to(&post_detail_path(post_id)))
}
