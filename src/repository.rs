use crate::models::{
    Category, Comment, CreatePostRequest, Post, PostPage, PostSummary, UpdatePostRequest, User,
};
use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;
use uuid::Uuid;

/// Fixed page size for every listing route.
pub const PAGE_SIZE: i64 = 10;

/// Repository Trait
///
/// Abstract contract for all persistence operations. Handlers interact with
/// the data layer through this trait only, which keeps them testable against
/// an in-memory mock.
///
/// **Send + Sync + async_trait** are required to make the trait object
/// (`Arc<dyn Repository>`) shareable across Axum's task boundaries.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Listings (visibility filter + comment-count annotation) ---

    /// Site-wide index: published posts with a past `pub_date` whose category
    /// is itself published.
    async fn list_published_posts(&self, page: i64) -> sqlx::Result<PostPage>;

    /// Posts of one category that pass the base visibility filter. The caller
    /// resolves the category (and its published state) beforehand.
    async fn list_category_posts(&self, category_id: Uuid, page: i64) -> sqlx::Result<PostPage>;

    /// Posts by one author. With `include_hidden` the base visibility filter
    /// is skipped, exposing unpublished and future-dated posts; used only
    /// when the viewer is the profile owner.
    async fn list_author_posts(
        &self,
        author_id: Uuid,
        include_hidden: bool,
        page: i64,
    ) -> sqlx::Result<PostPage>;

    // --- Single posts ---

    /// Bare lookup by id, no visibility check. The caller decides whether the
    /// viewer may see the row.
    async fn get_post(&self, id: Uuid) -> sqlx::Result<Option<Post>>;

    /// Lookup restricted to publicly visible posts (flag, date, and category
    /// published). Used for the non-author detail path.
    async fn get_published_post(&self, id: Uuid) -> sqlx::Result<Option<Post>>;

    async fn create_post(&self, req: CreatePostRequest, author_id: Uuid) -> sqlx::Result<Post>;
    /// Partial update via COALESCE; returns None when the post is missing.
    async fn update_post(&self, id: Uuid, req: UpdatePostRequest) -> sqlx::Result<Option<Post>>;
    /// Returns true when a row was actually removed.
    async fn delete_post(&self, id: Uuid) -> sqlx::Result<bool>;

    // --- Comments ---

    /// All comments of a post, oldest first, with author usernames.
    async fn get_comments(&self, post_id: Uuid) -> sqlx::Result<Vec<Comment>>;
    async fn get_comment(&self, id: i64) -> sqlx::Result<Option<Comment>>;
    async fn add_comment(
        &self,
        post_id: Uuid,
        author_id: Uuid,
        text: String,
    ) -> sqlx::Result<Comment>;
    async fn update_comment(&self, id: i64, text: String) -> sqlx::Result<Option<Comment>>;
    async fn delete_comment(&self, id: i64) -> sqlx::Result<bool>;

    // --- Categories & users ---

    /// Category by slug, restricted to published categories.
    async fn get_published_category(&self, slug: &str) -> sqlx::Result<Option<Category>>;
    async fn get_user(&self, id: Uuid) -> sqlx::Result<Option<User>>;
    async fn get_user_by_username(&self, username: &str) -> sqlx::Result<Option<User>>;
}

/// RepositoryState
///
/// The concrete type used to share the persistence layer across the
/// application state.
pub type RepositoryState = Arc<dyn Repository>;

/// PostgresRepository
///
/// Concrete implementation of the `Repository` trait, backed by PostgreSQL.
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// Shared SELECT head for listing queries: post columns joined with the author
// username, category slug, optional location name, and the comment count.
const SUMMARY_SELECT: &str = r#"
    SELECT p.id, p.author_id, u.username AS author_username,
           c.slug AS category_slug, l.name AS location_name,
           p.title, p.text, p.pub_date, p.is_published,
           (SELECT COUNT(*) FROM comments cm WHERE cm.post_id = p.id) AS comment_count
    FROM posts p
    JOIN users u ON p.author_id = u.id
    JOIN categories c ON p.category_id = c.id
    LEFT JOIN locations l ON p.location_id = l.id
"#;

// Base visibility filter: publish flag set and publication date not in the
// future. The category-published condition is applied only where a view
// requires it.
const VISIBLE: &str = " p.is_published = true AND p.pub_date <= NOW() ";

fn page_offset(page: i64) -> (i64, i64) {
    let page = page.max(1);
    (page, (page - 1) * PAGE_SIZE)
}

impl PostgresRepository {
    /// Runs one listing query plus its matching COUNT and assembles the page
    /// envelope. `filter` must contain the WHERE clause with `$1` reserved
    /// for an optional scope bind.
    async fn fetch_page(
        &self,
        filter: &str,
        scope: Option<Uuid>,
        page: i64,
    ) -> sqlx::Result<PostPage> {
        let (page, offset) = page_offset(page);

        let list_sql = format!(
            "{SUMMARY_SELECT} {filter} ORDER BY p.pub_date DESC LIMIT {PAGE_SIZE} OFFSET {offset}"
        );
        let count_sql = format!(
            "SELECT COUNT(*) FROM posts p \
             JOIN categories c ON p.category_id = c.id {filter}"
        );

        let mut list_query = sqlx::query_as::<_, PostSummary>(&list_sql);
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        if let Some(id) = scope {
            list_query = list_query.bind(id);
            count_query = count_query.bind(id);
        }

        let items = list_query.fetch_all(&self.pool).await?;
        let total = count_query.fetch_one(&self.pool).await?;

        Ok(PostPage {
            items,
            page,
            per_page: PAGE_SIZE,
            total,
        })
    }
}

#[async_trait]
impl Repository for PostgresRepository {
    async fn list_published_posts(&self, page: i64) -> sqlx::Result<PostPage> {
        let filter = format!("WHERE {VISIBLE} AND c.is_published = true");
        self.fetch_page(&filter, None, page).await
    }

    async fn list_category_posts(&self, category_id: Uuid, page: i64) -> sqlx::Result<PostPage> {
        let filter = format!("WHERE p.category_id = $1 AND {VISIBLE}");
        self.fetch_page(&filter, Some(category_id), page).await
    }

    async fn list_author_posts(
        &self,
        author_id: Uuid,
        include_hidden: bool,
        page: i64,
    ) -> sqlx::Result<PostPage> {
        let filter = if include_hidden {
            "WHERE p.author_id = $1".to_string()
        } else {
            format!("WHERE p.author_id = $1 AND {VISIBLE}")
        };
        self.fetch_page(&filter, Some(author_id), page).await
    }

    async fn get_post(&self, id: Uuid) -> sqlx::Result<Option<Post>> {
        sqlx::query_as::<_, Post>(
            "SELECT id, author_id, category_id, location_id, title, text, \
             pub_date, is_published, created_at FROM posts WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_published_post(&self, id: Uuid) -> sqlx::Result<Option<Post>> {
        sqlx::query_as::<_, Post>(
            "SELECT p.id, p.author_id, p.category_id, p.location_id, p.title, p.text, \
             p.pub_date, p.is_published, p.created_at \
             FROM posts p JOIN categories c ON p.category_id = c.id \
             WHERE p.id = $1 AND p.is_published = true AND p.pub_date <= NOW() \
             AND c.is_published = true",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn create_post(&self, req: CreatePostRequest, author_id: Uuid) -> sqlx::Result<Post> {
        sqlx::query_as::<_, Post>(
            "INSERT INTO posts (id, author_id, category_id, location_id, title, text, \
             pub_date, is_published, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, NOW()) \
             RETURNING id, author_id, category_id, location_id, title, text, \
             pub_date, is_published, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(author_id)
        .bind(req.category_id)
        .bind(req.location_id)
        .bind(req.title)
        .bind(req.text)
        .bind(req.pub_date)
        .bind(req.is_published)
        .fetch_one(&self.pool)
        .await
    }

    async fn update_post(&self, id: Uuid, req: UpdatePostRequest) -> sqlx::Result<Option<Post>> {
        // COALESCE keeps the stored value for any field the payload omits.
        sqlx::query_as::<_, Post>(
            "UPDATE posts \
             SET title = COALESCE($2, title), \
                 text = COALESCE($3, text), \
                 pub_date = COALESCE($4, pub_date), \
                 category_id = COALESCE($5, category_id), \
                 location_id = COALESCE($6, location_id), \
                 is_published = COALESCE($7, is_published) \
             WHERE id = $1 \
             RETURNING id, author_id, category_id, location_id, title, text, \
             pub_date, is_published, created_at",
        )
        .bind(id)
        .bind(req.title)
        .bind(req.text)
        .bind(req.pub_date)
        .bind(req.category_id)
        .bind(req.location_id)
        .bind(req.is_published)
        .fetch_optional(&self.pool)
        .await
    }

    async fn delete_post(&self, id: Uuid) -> sqlx::Result<bool> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn get_comments(&self, post_id: Uuid) -> sqlx::Result<Vec<Comment>> {
        sqlx::query_as::<_, Comment>(
            "SELECT cm.id, cm.post_id, cm.author_id, cm.text, cm.created_at, \
             u.username AS author_username \
             FROM comments cm JOIN users u ON cm.author_id = u.id \
             WHERE cm.post_id = $1 ORDER BY cm.created_at ASC",
        )
        .bind(post_id)
        .fetch_all(&self.pool)
        .await
    }

    async fn get_comment(&self, id: i64) -> sqlx::Result<Option<Comment>> {
        sqlx::query_as::<_, Comment>(
            "SELECT cm.id, cm.post_id, cm.author_id, cm.text, cm.created_at, \
             u.username AS author_username \
             FROM comments cm JOIN users u ON cm.author_id = u.id \
             WHERE cm.id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn add_comment(
        &self,
        post_id: Uuid,
        author_id: Uuid,
        text: String,
    ) -> sqlx::Result<Comment> {
        // CTE performs the insert and the username join in one round trip.
        sqlx::query_as::<_, Comment>(
            "WITH inserted AS ( \
                 INSERT INTO comments (post_id, author_id, text, created_at) \
                 VALUES ($1, $2, $3, NOW()) \
                 RETURNING id, post_id, author_id, text, created_at \
             ) \
             SELECT i.id, i.post_id, i.author_id, i.text, i.created_at, \
             u.username AS author_username \
             FROM inserted i JOIN users u ON i.author_id = u.id",
        )
        .bind(post_id)
        .bind(author_id)
        .bind(text)
        .fetch_one(&self.pool)
        .await
    }

    async fn update_comment(&self, id: i64, text: String) -> sqlx::Result<Option<Comment>> {
        sqlx::query_as::<_, Comment>(
            "UPDATE comments SET text = $2 WHERE id = $1 \
             RETURNING id, post_id, author_id, text, created_at",
        )
        .bind(id)
        .bind(text)
        .fetch_optional(&self.pool)
        .await
    }

    async fn delete_comment(&self, id: i64) -> sqlx::Result<bool> {
        let result = sqlx::query("DELETE FROM comments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn get_published_category(&self, slug: &str) -> sqlx::Result<Option<Category>> {
        sqlx::query_as::<_, Category>(
            "SELECT id, title, slug, is_published FROM categories \
             WHERE slug = $1 AND is_published = true",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
    }

    async fn get_user(&self, id: Uuid) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>("SELECT id, username, email FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn get_user_by_username(&self, username: &str) -> sqlx::Result<Option<User>> {
        sqlx::query_as::<_, User>("SELECT id, username, email FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await
    }
}
