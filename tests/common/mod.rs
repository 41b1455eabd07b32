//! A fake Revalio backend for integration tests.
#![allow(dead_code)]

use std::sync::{
    atomic::{AtomicBool, AtomicI64, Ordering},
    Arc,
};

use axum::{
    extract::{Path, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};

use revalio_forum::{config::settings::Settings, router, AppState};

pub const JWT_SECRET: &str = "rahasia";
pub const COMMENT_THREAD: &str = "7";

#[derive(Clone, Default)]
pub struct Upstream {
    likes: Arc<AtomicI64>,
    liked: Arc<AtomicBool>,
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("Bearer ") && v != "Bearer expired")
}

pub fn threads_payload() -> Value {
    json!([
        {
            "id": 1, "title": "Kompos rumahan", "content": "Cara membuat kompos",
            "tags": "Tips, kompos", "comments_count": 3, "likes_count": 2,
            "views_count": 10, "average_rating": "4", "ratings_count": 2,
            "created_at": "2024-05-01 10:00:00",
            "user": { "id": 5, "nama": "Sari", "foto_profil": "profil/sari.png" }
        },
        {
            "id": 2, "title": "Daur ulang botol", "content": "Botol plastik jadi pot",
            "tags": "daur ulang", "comments_count": "1", "likes_count": 0,
            "views_count": "100", "average_rating": "9", "created_at": "2024-05-03 10:00:00"
        },
        {
            "thread_id": 3, "title": "Sampah elektronik", "tags": null,
            "likes_count": 1, "created_at": "bukan tanggal"
        },
        "bukan thread"
    ])
}

fn comments_payload(upstream: &Upstream, authenticated: bool) -> Value {
    let mut root = json!({
        "id": 10, "user_id": 42, "content": "Halo semua",
        "likes_count": upstream.likes.load(Ordering::SeqCst),
        "created_at": "2024-05-01 10:00:00", "updated_at": "2024-05-01 11:00:00",
        "user": { "id": 42, "nama": "Budi", "avatar": "avatars/b.png" },
        "replies": [
            { "id": 101, "user_id": 7, "content": "Hai", "user": { "nama_lengkap": "Rina" } },
            { "id": 102, "content": "tanpa penulis" }
        ]
    });
    if authenticated {
        root["is_liked"] = json!(upstream.liked.load(Ordering::SeqCst));
    }

    json!([
        root,
        { "content": "tanpa id", "user_id": 3 },
        { "id": 12, "user_id": 7, "likes_count": 1, "created_at": "2024-05-02 10:00:00" }
    ])
}

async fn private_threads(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(json!({ "data": threads_payload() })).into_response()
}

async fn public_threads() -> Json<Value> {
    Json(threads_payload())
}

async fn private_comments(
    State(upstream): State<Upstream>,
    headers: HeaderMap,
    Path(thread_id): Path<String>,
) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if thread_id != COMMENT_THREAD {
        return StatusCode::NOT_FOUND.into_response();
    }
    Json(json!({ "data": comments_payload(&upstream, true) })).into_response()
}

async fn public_comments(
    State(upstream): State<Upstream>,
    Path(thread_id): Path<String>,
) -> Response {
    if thread_id != COMMENT_THREAD {
        return StatusCode::NOT_FOUND.into_response();
    }
    Json(comments_payload(&upstream, false)).into_response()
}

async fn like_comment(
    State(upstream): State<Upstream>,
    headers: HeaderMap,
    Path(comment_id): Path<String>,
) -> StatusCode {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED;
    }
    if comment_id != "10" {
        return StatusCode::NOT_FOUND;
    }
    let was_liked = upstream.liked.fetch_xor(true, Ordering::SeqCst);
    let delta = if was_liked { -1 } else { 1 };
    upstream.likes.fetch_add(delta, Ordering::SeqCst);
    StatusCode::OK
}

pub async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// Starts the fake backend and returns its base URL.
pub async fn spawn_upstream() -> String {
    let app = Router::new()
        .route("/forum-threads", get(private_threads))
        .route("/public/forum-threads", get(public_threads))
        .route("/forum-threads/:id/comments", get(private_comments))
        .route("/public/forum-threads/:id/comments", get(public_comments))
        .route("/forum-comments/:id/like", post(like_comment))
        .with_state(Upstream::default());
    serve(app).await
}

/// A base URL nothing listens on.
pub async fn dead_upstream() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}

pub fn settings_for(api_base_url: &str) -> Settings {
    let mut settings = Settings::for_api(api_base_url);
    settings.jwt_secret = Some(JWT_SECRET.to_string());
    settings.comment_page_size = 1;
    settings
}

/// Starts the forum service in front of `api_base_url`.
pub async fn spawn_app(api_base_url: &str) -> String {
    let state = AppState::new(settings_for(api_base_url)).unwrap();
    serve(router(state)).await
}

pub fn viewer_token(sub: Value) -> String {
    let claims = json!({ "sub": sub, "exp": (Utc::now() + Duration::hours(1)).timestamp() });
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(JWT_SECRET.as_ref()),
    )
    .unwrap()
}
