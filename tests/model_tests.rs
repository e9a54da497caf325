use blog_portal::models::{
    Comment, CreateCommentRequest, CreatePostRequest, PostPage, PostSummary, UpdatePostRequest,
};
use chrono::Utc;
use uuid::Uuid;

#[test]
fn test_update_post_request_omits_unset_fields() {
    // Partial updates must only carry the fields the form submitted.
    let partial_update = UpdatePostRequest {
        title: Some("New Title Only".to_string()),
        ..UpdatePostRequest::default()
    };

    let json_output = serde_json::to_string(&partial_update).unwrap();
    assert!(json_output.contains(r#""title":"New Title Only""#));
    assert!(!json_output.contains("text"));
    assert!(!json_output.contains("pub_date"));
    assert!(!json_output.contains("category_id"));
}

#[test]
fn test_create_post_request_is_published_defaults_true() {
    // The publish checkbox defaults to checked; a payload without the field
    // must deserialize as published.
    let json = format!(
        r#"{{"title":"t","text":"body","pub_date":"{}","category_id":"{}"}}"#,
        Utc::now().to_rfc3339(),
        Uuid::new_v4()
    );

    let req: CreatePostRequest = serde_json::from_str(&json).unwrap();
    assert!(req.is_published);
    assert!(req.location_id.is_none());
}

#[test]
fn test_comment_author_username_optional_on_bare_rows() {
    // Bare-row loads (no users join) leave the username empty; display loads
    // fill it in. Serialization must handle both.
    let bare = Comment::default();
    assert!(bare.author_username.is_none());

    let enriched = Comment {
        author_username: Some("poster".to_string()),
        ..Comment::default()
    };
    let json_output = serde_json::to_string(&enriched).unwrap();
    assert!(json_output.contains(r#""author_username":"poster""#));
}

#[test]
fn test_post_page_envelope_shape() {
    let page = PostPage {
        items: vec![PostSummary::default()],
        page: 1,
        per_page: 10,
        total: 23,
    };

    let json_output = serde_json::to_string(&page).unwrap();
    assert!(json_output.contains(r#""per_page":10"#));
    assert!(json_output.contains(r#""total":23"#));
    assert!(json_output.contains(r#""comment_count":0"#));
}

#[test]
fn test_create_comment_request_roundtrip() {
    let req: CreateCommentRequest = serde_json::from_str(r#"{"text":"nice post"}"#).unwrap();
    assert_eq!(req.text, "nice post");
}
