use crate::{AppState, handlers};
use axum::{Router, routing::get};

/// Public Router Module
///
/// Endpoints reachable without a session, by anonymous and logged-in clients
/// alike. Every listing and detail handler here enforces the publication
/// visibility rules in its repository query, so unpublished, future-dated,
/// or category-hidden posts never leak to visitors.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Unauthenticated liveness probe for monitoring and load balancers.
        .route("/health", get(|| async { "ok" }))
        // GET /?page=N
        // Site-wide index of publicly visible posts, 10 per page.
        .route("/", get(handlers::index))
        // GET /category/{slug}?page=N
        // Posts of one published category. An unpublished category 404s even
        // if its slug exists.
        .route("/category/{slug}", get(handlers::category_posts))
        // GET /profile/{username}?page=N
        // A user's posts. The owner additionally sees their own hidden and
        // scheduled posts, which is resolved through optional authentication.
        .route("/profile/{username}", get(handlers::profile))
        // GET /posts/{id}
        // Post detail with comments. Authors bypass the visibility filter
        // for their own posts.
        .route("/posts/{id}", get(handlers::post_detail))
}
