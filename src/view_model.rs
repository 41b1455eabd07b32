//! Per-page forum state for a front-end.
//!
//! A page owns one [`ForumPage`] and feeds it raw payloads as fetches
//! resolve. Results are always replaced wholesale, and every fetch carries a
//! [`RequestToken`] so that a slow, stale response can never overwrite the
//! answer to a newer request.

use std::collections::HashMap;

use tracing::debug;

use crate::{
    comments::{
        builder,
        listing::{self, CommentPager, CommentSort},
        CommentNode, CommentTree, RawComment,
    },
    payload::EntityId,
    threads::{ranking, RawThread, ThreadQuery, ThreadSummary},
};

/// Identifies one in-flight fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct RequestToken(u64);

/// A value that only accepts the response to the most recent request.
#[derive(Debug, Clone, Default)]
pub struct Latest<T> {
    issued: u64,
    value: T,
    message: Option<String>,
}

impl<T: Default> Latest<T> {
    pub fn begin(&mut self) -> RequestToken {
        self.issued += 1;
        RequestToken(self.issued)
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        token.0 == self.issued
    }

    /// Replaces the value if `token` is still the latest. Returns whether the
    /// value was applied.
    pub fn resolve(&mut self, token: RequestToken, value: T) -> bool {
        if !self.is_current(token) {
            debug!(token = token.0, latest = self.issued, "discarding stale response");
            return false;
        }
        self.value = value;
        self.message = None;
        true
    }

    /// Clears the value and records a user-visible message.
    pub fn fail(&mut self, token: RequestToken, message: impl Into<String>) -> bool {
        if !self.is_current(token) {
            return false;
        }
        self.value = T::default();
        self.message = Some(message.into());
        true
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }
}

/// Local like state shown between a like tap and the refetch that follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct LikePatch {
    liked: bool,
    delta: i64,
}

/// Everything one forum page shows.
#[derive(Debug, Default)]
pub struct ForumPage {
    viewer_id: Option<EntityId>,
    pub query: ThreadQuery,
    threads: Latest<Vec<ThreadSummary>>,
    comments: Latest<CommentTree>,
    comment_sort: CommentSort,
    pager: CommentPager,
    likes: HashMap<EntityId, LikePatch>,
}

impl ForumPage {
    pub fn new(viewer_id: Option<EntityId>, comment_page_size: usize) -> Self {
        Self {
            viewer_id,
            pager: CommentPager::new(comment_page_size),
            ..Self::default()
        }
    }

    pub fn begin_threads_fetch(&mut self) -> RequestToken {
        self.threads.begin()
    }

    pub fn resolve_threads(&mut self, token: RequestToken, raw: &[RawThread]) -> bool {
        self.threads.resolve(token, ranking::normalize(raw))
    }

    pub fn fail_threads(&mut self, token: RequestToken, message: impl Into<String>) -> bool {
        self.threads.fail(token, message)
    }

    /// Threads after the current category/search filter and sort.
    pub fn visible_threads(&self) -> Vec<&ThreadSummary> {
        ranking::rank(self.threads.get(), &self.query)
    }

    pub fn threads_message(&self) -> Option<&str> {
        self.threads.message()
    }

    pub fn begin_comments_fetch(&mut self) -> RequestToken {
        self.comments.begin()
    }

    /// Applies a comment payload. Optimistic like patches are dropped, the
    /// fresh payload already carries the confirmed state.
    pub fn resolve_comments(&mut self, token: RequestToken, raw: &[RawComment]) -> bool {
        let tree = builder::build(raw, self.viewer_id.as_ref());
        let applied = self.comments.resolve(token, tree);
        if applied {
            self.likes.clear();
        }
        applied
    }

    pub fn fail_comments(&mut self, token: RequestToken, message: impl Into<String>) -> bool {
        let applied = self.comments.fail(token, message);
        if applied {
            self.likes.clear();
        }
        applied
    }

    pub fn comments_message(&self) -> Option<&str> {
        self.comments.message()
    }

    pub fn set_comment_sort(&mut self, sort: CommentSort) {
        self.comment_sort = sort;
        self.pager.reset();
    }

    pub fn load_more(&mut self) {
        self.pager.load_more();
    }

    pub fn has_more_comments(&self) -> bool {
        self.pager.has_more(self.comments.get().roots().count())
    }

    /// Root comments currently on screen, sorted by confirmed counts.
    pub fn visible_roots(&self) -> Vec<&CommentNode> {
        let roots = listing::sorted_roots(self.comments.get(), self.comment_sort);
        self.pager.window(&roots).to_vec()
    }

    pub fn replies_of(&self, parent: &EntityId) -> Vec<&CommentNode> {
        self.comments.get().replies_of(parent)
    }

    /// Flips the displayed like state of a comment until the next refetch.
    /// Returns the new displayed state.
    pub fn toggle_like(&mut self, id: &EntityId) -> bool {
        let confirmed = self.comments.get().is_liked(id);
        let current = self.is_liked(id);
        let liked = !current;

        if liked == confirmed {
            self.likes.remove(id);
        } else {
            let delta = if liked { 1 } else { -1 };
            self.likes.insert(id.clone(), LikePatch { liked, delta });
        }
        liked
    }

    pub fn is_liked(&self, id: &EntityId) -> bool {
        self.likes
            .get(id)
            .map_or_else(|| self.comments.get().is_liked(id), |patch| patch.liked)
    }

    /// Like count as displayed, including any optimistic patch.
    pub fn displayed_like_count(&self, node: &CommentNode) -> i64 {
        let delta = self.likes.get(&node.id).map_or(0, |patch| patch.delta);
        (node.like_count + delta).max(0)
    }
}
