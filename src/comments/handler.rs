use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    auth::Viewer,
    comments::{
        builder,
        listing::{self, CommentPager, CommentSort},
        CommentFilter, CommentNode, CommentTree, CommentView, CommentsListResponse,
        RepliesResponse,
    },
    config::settings::Settings,
    error::AppError,
    payload::EntityId,
    response::ApiResponse,
    upstream::RevalioClient,
};

pub const COMMENTS_UNAVAILABLE: &str = "Gagal memuat komentar. Silakan coba lagi nanti.";

/// Get the visible root comments of a thread
/// GET /api/threads/:id/comments?sort=newest|mostLiked&visible=N
pub async fn get_thread_comments(
    State(client): State<RevalioClient>,
    State(settings): State<Settings>,
    viewer: Viewer,
    Path(thread_id): Path<String>,
    Query(filter): Query<CommentFilter>,
) -> Result<impl IntoResponse, AppError> {
    filter
        .validate()
        .map_err(|e| AppError::UnprocessableEntity(e.to_string()))?;
    let thread_id = parse_id(&thread_id, "thread")?;

    let sort = CommentSort::from_param(filter.sort.as_deref());
    let pager = CommentPager::with_visible(settings.comment_page_size, filter.visible);

    Ok(listing_or_notice(&client, &thread_id, &viewer, sort, pager).await)
}

/// Get replies to a specific root comment
/// GET /api/threads/:id/comments/:comment_id/replies
pub async fn get_comment_replies(
    State(client): State<RevalioClient>,
    viewer: Viewer,
    Path((thread_id, comment_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let thread_id = parse_id(&thread_id, "thread")?;
    let comment_id = parse_id(&comment_id, "comment")?;

    let tree = match fetch_tree(&client, &thread_id, &viewer).await {
        Some(tree) => tree,
        None => {
            return Ok(ApiResponse::success_with_message(
                COMMENTS_UNAVAILABLE.to_string(),
                RepliesResponse::default(),
            ))
        }
    };

    // Replies of a dropped root are still reachable by its id.
    if tree.get(&comment_id).is_none() && tree.reply_count(&comment_id) == 0 {
        return Err(AppError::NotFound("Comment not found".to_string()));
    }

    let replies = tree
        .replies_of(&comment_id)
        .into_iter()
        .map(|node| view(&tree, node))
        .collect();

    Ok(ApiResponse::success(RepliesResponse {
        parent_id: Some(comment_id),
        replies,
    }))
}

/// Toggle the viewer's like on a comment, then return the refreshed listing
/// POST /api/threads/:id/comments/:comment_id/like
pub async fn toggle_comment_like(
    State(client): State<RevalioClient>,
    State(settings): State<Settings>,
    viewer: Viewer,
    Path((thread_id, comment_id)): Path<(String, String)>,
    Query(filter): Query<CommentFilter>,
) -> Result<impl IntoResponse, AppError> {
    filter
        .validate()
        .map_err(|e| AppError::UnprocessableEntity(e.to_string()))?;
    let thread_id = parse_id(&thread_id, "thread")?;
    let comment_id = parse_id(&comment_id, "comment")?;
    let token = viewer.token.as_deref().ok_or(AppError::Unauthorized)?;

    client
        .toggle_comment_like(&comment_id, token)
        .await
        .map_err(|e| {
            tracing::error!("Failed to toggle like on comment {comment_id}: {e:#}");
            AppError::BadGateway("Gagal menyukai komentar".to_string())
        })?;

    // The backend is the source of truth; always refetch instead of patching.
    let sort = CommentSort::from_param(filter.sort.as_deref());
    let pager = CommentPager::with_visible(settings.comment_page_size, filter.visible);

    Ok(listing_or_notice(&client, &thread_id, &viewer, sort, pager).await)
}

async fn listing_or_notice(
    client: &RevalioClient,
    thread_id: &EntityId,
    viewer: &Viewer,
    sort: CommentSort,
    pager: CommentPager,
) -> ApiResponse<CommentsListResponse> {
    match fetch_tree(client, thread_id, viewer).await {
        Some(tree) => ApiResponse::success(listing_response(&tree, sort, pager)),
        None => ApiResponse::success_with_message(
            COMMENTS_UNAVAILABLE.to_string(),
            CommentsListResponse {
                visible: pager.visible(),
                ..CommentsListResponse::default()
            },
        ),
    }
}

/// `None` when neither backend endpoint answered; the client logs why.
async fn fetch_tree(
    client: &RevalioClient,
    thread_id: &EntityId,
    viewer: &Viewer,
) -> Option<CommentTree> {
    let fetched = client.thread_comments(thread_id, viewer).await.ok()?;
    tracing::debug!(%thread_id, source = ?fetched.source, "comments fetched");
    Some(builder::build(&fetched.items, viewer.id.as_ref()))
}

pub fn listing_response(
    tree: &CommentTree,
    sort: CommentSort,
    pager: CommentPager,
) -> CommentsListResponse {
    let roots = listing::sorted_roots(tree, sort);
    let total = roots.len();

    let comments = pager
        .window(&roots)
        .iter()
        .map(|node| view(tree, node))
        .collect();

    let mut liked_ids: Vec<EntityId> = tree.liked_ids.iter().cloned().collect();
    liked_ids.sort();

    CommentsListResponse {
        comments,
        total,
        has_more: pager.has_more(total),
        visible: pager.visible(),
        next_visible: pager.next_visible(total),
        liked_ids,
    }
}

fn view(tree: &CommentTree, node: &CommentNode) -> CommentView {
    CommentView {
        comment: node.clone(),
        replies_count: tree.reply_count(&node.id),
        is_liked: tree.is_liked(&node.id),
    }
}

fn parse_id(raw: &str, what: &str) -> Result<EntityId, AppError> {
    EntityId::from_path_segment(raw).ok_or_else(|| AppError::BadRequest(format!("Invalid {what} id")))
}
