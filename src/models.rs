use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;
use uuid::Uuid;

// --- Core Application Schemas (Mapped to Database) ---

/// User
///
/// Canonical identity record from the `users` table. This carries the minimal
/// data resolved during authentication plus the public profile fields.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct User {
    pub id: Uuid,
    /// Unique handle, also the path segment of the profile page.
    pub username: String,
    pub email: String,
}

/// Category
///
/// A publication category from the `categories` table. Posts in an
/// unpublished category are invisible to the public regardless of their own
/// publication state.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Category {
    pub id: Uuid,
    pub title: String,
    /// URL slug, unique, used by the category listing route.
    pub slug: String,
    pub is_published: bool,
}

/// Location
///
/// Optional place tag attached to a post, from the `locations` table.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Location {
    pub id: Uuid,
    pub name: String,
    pub is_published: bool,
}

/// Post
///
/// A blog post row from the `posts` table. This is the primary data structure
/// of the application.
///
/// A post is publicly visible iff `is_published` is true, `pub_date` is not in
/// the future, and its category is published. That predicate lives in the
/// repository queries, not here.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Post {
    pub id: Uuid,
    // FK to users.id (owner). Only the author may edit or delete the post.
    pub author_id: Uuid,
    pub category_id: Uuid,
    pub location_id: Option<Uuid>,
    pub title: String,
    pub text: String,

    /// Scheduled publication moment. Future-dated posts stay hidden from the
    /// public until the date passes, but remain visible to their author.
    #[ts(type = "string")]
    pub pub_date: DateTime<Utc>,
    pub is_published: bool,

    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
}

/// Comment
///
/// A comment row from the `comments` table, augmented with the author's
/// username (a join performed by the repository when loading for display).
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Comment {
    // BigInt (i64) key; comments are high-volume compared to posts.
    pub id: i64,
    pub post_id: Uuid,
    pub author_id: Uuid,
    pub text: String,
    #[ts(type = "string")]
    pub created_at: DateTime<Utc>,
    // Loaded via a JOIN in the repository query; absent on bare-row loads.
    #[sqlx(default)]
    pub author_username: Option<String>,
}

// --- Listing Schemas (Output) ---

/// PostSummary
///
/// A post as it appears in a listing: the row itself joined with its author's
/// username, category slug, optional location name, and the comment-count
/// annotation.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct PostSummary {
    pub id: Uuid,
    pub author_id: Uuid,
    pub author_username: String,
    pub category_slug: String,
    pub location_name: Option<String>,
    pub title: String,
    pub text: String,
    #[ts(type = "string")]
    pub pub_date: DateTime<Utc>,
    pub is_published: bool,
    /// Number of comments attached to the post, computed per request.
    pub comment_count: i64,
}

/// PostPage
///
/// One page of a listing. `page` is 1-based; `per_page` is fixed at 10 and
/// `total` counts every post matching the listing's scope.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct PostPage {
    pub items: Vec<PostSummary>,
    pub page: i64,
    pub per_page: i64,
    pub total: i64,
}

/// CategoryPage
///
/// Category listing response: the resolved (published) category plus a page
/// of its visible posts.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CategoryPage {
    pub category: Category,
    pub posts: PostPage,
}

/// ProfilePage
///
/// Profile listing response: the profile owner plus a page of their posts.
/// When the viewer is the owner, the page includes unpublished and
/// future-dated posts.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ProfilePage {
    pub profile: User,
    pub posts: PostPage,
}

/// PostDetail
///
/// Detail view response: the full post plus its comments, oldest first.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct PostDetail {
    pub post: Post,
    pub comments: Vec<Comment>,
}

// --- Request Payloads (Input Schemas) ---

/// CreatePostRequest
///
/// Input payload for submitting a new post (POST /posts/new). The author is
/// never part of the payload; it is taken from the authenticated session.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreatePostRequest {
    pub title: String,
    pub text: String,
    #[ts(type = "string")]
    pub pub_date: DateTime<Utc>,
    pub category_id: Uuid,
    pub location_id: Option<Uuid>,
    /// Defaults to true when omitted, matching the form's checkbox default.
    #[serde(default = "default_is_published")]
    pub is_published: bool,
}

fn default_is_published() -> bool {
    true
}

/// UpdatePostRequest
///
/// Partial update payload for the edit route (POST /posts/{id}/edit).
/// Uses `Option<T>` with `skip_serializing_if` so only submitted fields are
/// carried in the JSON payload; unset fields keep their stored values.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdatePostRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(type = "string | null")]
    pub pub_date: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<Uuid>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub location_id: Option<Uuid>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_published: Option<bool>,
}

/// CreateCommentRequest
///
/// Input payload for posting a new comment on a post.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateCommentRequest {
    pub text: String,
}

/// UpdateCommentRequest
///
/// Input payload for editing an existing comment.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateCommentRequest {
    pub text: String,
}
