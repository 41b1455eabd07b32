use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    auth::Viewer,
    error::AppError,
    response::ApiResponse,
    threads::{ranking, ThreadFilter, ThreadQuery, ThreadSummary},
    upstream::RevalioClient,
};

pub const THREADS_UNAVAILABLE: &str = "Gagal memuat diskusi. Silakan coba lagi nanti.";

/// List forum threads, filtered and ranked
/// GET /api/threads?sort=popular|latest&category=&search=
pub async fn get_threads(
    State(client): State<RevalioClient>,
    viewer: Viewer,
    Query(filter): Query<ThreadFilter>,
) -> Result<impl IntoResponse, AppError> {
    filter
        .validate()
        .map_err(|e| AppError::UnprocessableEntity(e.to_string()))?;
    let query = ThreadQuery::try_from(filter).map_err(AppError::BadRequest)?;

    let fetched = match client.threads(&viewer).await {
        Ok(fetched) => fetched,
        Err(_) => {
            // Already logged by the client; the UI shows an empty list.
            return Ok(ApiResponse::success_with_message(
                THREADS_UNAVAILABLE.to_string(),
                Vec::new(),
            ));
        }
    };

    let threads = ranking::normalize(&fetched.items);
    let ranked: Vec<ThreadSummary> = ranking::rank(&threads, &query)
        .into_iter()
        .cloned()
        .collect();

    tracing::debug!(
        source = ?fetched.source,
        fetched = threads.len(),
        listed = ranked.len(),
        "thread listing"
    );

    Ok(ApiResponse::success(ranked))
}
