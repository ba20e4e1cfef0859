use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, app_with, seed_posts, Post, BROKEN_BODY};
use tower::ServiceExt;

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn get(uri: &str) -> Request<String> {
    Request::builder().uri(uri).body(String::new()).unwrap()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

// --- list ---

#[tokio::test]
async fn list_posts_returns_seed_in_order() {
    let resp = app().oneshot(get("/posts")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let posts: Vec<Post> = body_json(resp).await;
    assert_eq!(posts, seed_posts());
}

#[tokio::test]
async fn list_posts_empty() {
    let resp = app_with(Vec::new()).oneshot(get("/posts")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let body = body_bytes(resp).await;
    assert_eq!(&body[..], b"[]");
}

#[tokio::test]
async fn list_uses_camel_case_fields() {
    let resp = app().oneshot(get("/posts")).await.unwrap();
    let posts: serde_json::Value = body_json(resp).await;
    let first = &posts[0];
    assert!(first["userId"].is_u64());
    assert!(first["id"].is_i64());
    assert!(first["title"].is_string());
    assert!(first["body"].is_string());
}

// --- get ---

#[tokio::test]
async fn get_post_found() {
    let resp = app().oneshot(get("/posts/3")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let post: Post = body_json(resp).await;
    assert_eq!(post.id, 3);
    assert_eq!(post.title, "post 3");
}

#[tokio::test]
async fn get_post_not_found() {
    let resp = app().oneshot(get("/posts/999")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn get_post_bad_id_returns_400() {
    let resp = app().oneshot(get("/posts/not-a-number")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- create ---

#[tokio::test]
async fn create_post_returns_201_with_next_id() {
    let resp = app()
        .oneshot(json_request("POST", "/posts", r#"{"userId":4,"title":"New","body":"B"}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let post: Post = body_json(resp).await;
    assert_eq!(post.id, 11);
    assert_eq!(post.user_id, 4);
}

#[tokio::test]
async fn create_post_malformed_json_returns_422() {
    let resp = app()
        .oneshot(json_request("POST", "/posts", r#"{"not_title":1}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn created_post_is_listed_last() {
    use tower::Service;

    let mut app = app_with(Vec::new()).into_service();

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("POST", "/posts", r#"{"userId":1,"title":"first"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request("POST", "/posts", r#"{"userId":1,"title":"second"}"#))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get("/posts"))
        .await
        .unwrap();
    let posts: Vec<Post> = body_json(resp).await;
    let titles: Vec<&str> = posts.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, vec!["first", "second"]);
    assert_eq!(posts[1].id, 2);
}

// --- fault routes ---

#[tokio::test]
async fn broken_returns_non_json_with_200() {
    let resp = app().oneshot(get("/broken")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(&body_bytes(resp).await[..], BROKEN_BODY.as_bytes());
}

#[tokio::test]
async fn fail_returns_500() {
    let resp = app().oneshot(get("/fail")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
}
