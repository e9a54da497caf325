use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Authenticated Router Module
///
/// All mutating routes: post and comment create/edit/delete. The router is
/// mounted behind the authentication layer, so every handler receives a
/// resolved `AuthUser`; unauthenticated requests are redirected to the login
/// page before any handler runs.
///
/// Authorization inside the handlers is author-equality only: each edit and
/// delete route runs the ownership guard on its form path (GET) and again on
/// its action path (POST), and answers a non-author with a redirect instead
/// of an error.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // POST /posts/new
        // Submits a new post authored by the requesting user; redirects to
        // the author's profile where the post is visible regardless of state.
        .route("/posts/new", post(handlers::create_post))
        // GET/POST /posts/{id}/edit
        // Edit form data and the update action. Both paths guard ownership
        // and fall back to the post detail page.
        .route(
            "/posts/{id}/edit",
            get(handlers::edit_post_form).post(handlers::update_post),
        )
        // GET/POST /posts/{id}/delete
        // Delete confirmation data and the destructive action. Non-authors
        // are sent to the index.
        .route(
            "/posts/{id}/delete",
            get(handlers::delete_post_form).post(handlers::delete_post),
        )
        // POST /posts/{id}/comment
        // Adds a comment to an existing post; redirects back to the post.
        .route("/posts/{id}/comment", post(handlers::add_comment))
        // GET/POST /posts/{post_id}/comment/{comment_id}/edit
        // Comment edit form and update action, ownership-guarded on both.
        .route(
            "/posts/{post_id}/comment/{comment_id}/edit",
            get(handlers::edit_comment_form).post(handlers::update_comment),
        )
        // GET/POST /posts/{post_id}/comment/{comment_id}/delete
        // Comment delete confirmation and action, ownership-guarded on both.
        .route(
            "/posts/{post_id}/comment/{comment_id}/delete",
            get(handlers::delete_comment_form).post(handlers::delete_comment),
        )
}
