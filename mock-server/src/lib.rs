//! Local stand-in for the public posts API, plus fault routes for tests.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub user_id: u32,
    pub id: i64,
    pub title: String,
    pub body: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatePost {
    pub user_id: u32,
    pub title: String,
    #[serde(default)]
    pub body: String,
}

pub type Db = Arc<RwLock<Vec<Post>>>;

/// Body served by `/broken`.
pub const BROKEN_BODY: &str = "not json";

/// Ten posts, two authors, ids 1..=10.
pub fn seed_posts() -> Vec<Post> {
    (1..=10)
        .map(|id| Post {
            user_id: if id <= 5 { 1 } else { 2 },
            id,
            title: format!("post {id}"),
            body: format!("body of post {id}"),
        })
        .collect()
}

pub fn app() -> Router {
    app_with(seed_posts())
}

pub fn app_with(posts: Vec<Post>) -> Router {
    let db: Db = Arc::new(RwLock::new(posts));
    Router::new()
        .route("/posts", get(list_posts).post(create_post))
        .route("/posts/{id}", get(get_post))
        .route("/broken", get(broken))
        .route("/fail", get(fail))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn list_posts(State(db): State<Db>) -> Json<Vec<Post>> {
    let posts = db.read().await;
    tracing::debug!(len = posts.len(), "listing posts");
    Json(posts.clone())
}

async fn create_post(
    State(db): State<Db>,
    Json(input): Json<CreatePost>,
) -> (StatusCode, Json<Post>) {
    let mut posts = db.write().await;
    let id = posts.iter().map(|p| p.id).max().unwrap_or(0) + 1;
    let post = Post {
        user_id: input.user_id,
        id,
        title: input.title,
        body: input.body,
    };
    posts.push(post.clone());
    (StatusCode::CREATED, Json(post))
}

async fn get_post(State(db): State<Db>, Path(id): Path<i64>) -> Result<Json<Post>, StatusCode> {
    let posts = db.read().await;
    posts
        .iter()
        .find(|p| p.id == id)
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn broken() -> &'static str {
    BROKEN_BODY
}

async fn fail() -> (StatusCode, &'static str) {
    (StatusCode::INTERNAL_SERVER_ERROR, "internal error")
}
