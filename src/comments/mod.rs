use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use crate::{
    authors::{lenient_author, Author, AuthorRef},
    payload::{first_present, lenient_list, EntityId},
};

pub mod builder;
pub mod handler;
pub mod listing;

/// A comment as the backend sends it. Replies nest one level deep.
///
/// The authenticated and public endpoints spell some fields differently and
/// a record may carry both spellings, so each one is its own field and the
/// accessors below pick the first non-null in a fixed order.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawComment {
    #[serde(default)]
    pub id: Value,
    #[serde(default)]
    pub user_id: Value,
    #[serde(default, rename = "userId")]
    pub user_id_camel: Value,
    #[serde(default, deserialize_with = "lenient_author")]
    pub user: Option<AuthorRef>,
    #[serde(default, rename = "userRef", deserialize_with = "lenient_author")]
    pub user_ref: Option<AuthorRef>,
    #[serde(default)]
    pub created_at: Value,
    #[serde(default, rename = "postedAt")]
    pub posted_at: Value,
    #[serde(default)]
    pub updated_at: Value,
    #[serde(default, rename = "updatedAt")]
    pub updated_at_camel: Value,
    #[serde(default)]
    pub content: Value,
    #[serde(default)]
    pub likes_count: Value,
    #[serde(default, rename = "likeCount")]
    pub like_count: Value,
    #[serde(default)]
    pub is_liked: Value,
    #[serde(default, rename = "viewerHasLiked")]
    pub viewer_has_liked: Value,
    #[serde(default)]
    pub liked_by_me: Value,
    #[serde(default, deserialize_with = "lenient_list")]
    pub replies: Vec<RawComment>,
}

impl RawComment {
    pub fn author_id(&self) -> &Value {
        first_present([&self.user_id, &self.user_id_camel])
    }

    pub fn author_ref(&self) -> Option<&AuthorRef> {
        self.user.as_ref().or(self.user_ref.as_ref())
    }

    pub fn created(&self) -> &Value {
        first_present([&self.created_at, &self.posted_at])
    }

    pub fn updated(&self) -> &Value {
        first_present([&self.updated_at, &self.updated_at_camel])
    }

    pub fn likes(&self) -> &Value {
        first_present([&self.likes_count, &self.like_count])
    }

    /// `is_liked`, then `viewerHasLiked`, then `liked_by_me`.
    pub fn liked_flag(&self) -> &Value {
        first_present([&self.is_liked, &self.viewer_has_liked, &self.liked_by_me])
    }
}

/// UI-ready comment. Roots have no `parent_id`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommentNode {
    pub id: EntityId,
    pub author: Author,
    /// `None` when the backend date is missing or unparseable.
    pub posted_at: Option<DateTime<Utc>>,
    pub text: String,
    pub parent_id: Option<EntityId>,
    pub like_count: i64,
    pub is_owned_by_viewer: bool,
    pub is_edited: bool,
}

/// Flat comment list with a reply index built once per fetch.
#[derive(Debug, Clone, Default)]
pub struct CommentTree {
    pub nodes: Vec<CommentNode>,
    pub liked_ids: HashSet<EntityId>,
    children: HashMap<EntityId, Vec<usize>>,
    positions: HashMap<EntityId, usize>,
}

impl CommentTree {
    pub fn new(nodes: Vec<CommentNode>, liked_ids: HashSet<EntityId>) -> Self {
        let mut children: HashMap<EntityId, Vec<usize>> = HashMap::new();
        let mut positions = HashMap::new();

        for (index, node) in nodes.iter().enumerate() {
            positions.entry(node.id.clone()).or_insert(index);
            if let Some(parent) = &node.parent_id {
                children.entry(parent.clone()).or_default().push(index);
            }
        }

        Self {
            nodes,
            liked_ids,
            children,
            positions,
        }
    }

    pub fn roots(&self) -> impl Iterator<Item = &CommentNode> {
        self.nodes.iter().filter(|n| n.parent_id.is_none())
    }

    /// Replies of `parent`, in the order they were received.
    pub fn replies_of(&self, parent: &EntityId) -> Vec<&CommentNode> {
        self.children
            .get(parent)
            .map(|indices| indices.iter().map(|&i| &self.nodes[i]).collect())
            .unwrap_or_default()
    }

    pub fn reply_count(&self, parent: &EntityId) -> usize {
        self.children.get(parent).map_or(0, Vec::len)
    }

    pub fn get(&self, id: &EntityId) -> Option<&CommentNode> {
        self.positions.get(id).map(|&i| &self.nodes[i])
    }

    pub fn is_liked(&self, id: &EntityId) -> bool {
        self.liked_ids.contains(id)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Query parameters for the comment listing
#[derive(Debug, Deserialize, Validate)]
pub struct CommentFilter {
    pub sort: Option<String>, // "newest" or "mostLiked"
    #[validate(range(min = 1, max = 500, message = "visible must be between 1 and 500"))]
    pub visible: Option<usize>,
}

/// A comment plus the per-viewer and per-thread facts the UI needs.
#[derive(Debug, Serialize)]
pub struct CommentView {
    #[serde(flatten)]
    pub comment: CommentNode,
    pub replies_count: usize,
    pub is_liked: bool,
}

/// Response for the paginated root comment listing
#[derive(Debug, Default, Serialize)]
pub struct CommentsListResponse {
    pub comments: Vec<CommentView>,
    pub total: usize,
    pub has_more: bool,
    pub visible: usize,
    pub next_visible: Option<usize>,
    pub liked_ids: Vec<EntityId>,
}

/// Response for the replies of a single root comment
#[derive(Debug, Default, Serialize)]
pub struct RepliesResponse {
    pub parent_id: Option<EntityId>,
    pub replies: Vec<CommentView>,
}
