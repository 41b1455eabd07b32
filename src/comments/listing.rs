//! Ordering and "load more" pagination of root comments.

use crate::{
    comments::{CommentNode, CommentTree},
    payload::timestamp,
};

pub const DEFAULT_PAGE_SIZE: usize = 5;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CommentSort {
    #[default]
    Newest,
    MostLiked,
}

impl CommentSort {
    /// Unknown values fall back to newest first.
    pub fn from_param(param: Option<&str>) -> Self {
        match param {
            Some("mostLiked") | Some("most_liked") | Some("likes") => CommentSort::MostLiked,
            _ => CommentSort::Newest,
        }
    }
}

/// Root comments in display order. The sort is stable and only ever looks at
/// server-confirmed like counts.
pub fn sorted_roots(tree: &CommentTree, sort: CommentSort) -> Vec<&CommentNode> {
    let mut roots: Vec<&CommentNode> = tree.roots().collect();
    sort_nodes(&mut roots, sort);
    roots
}

pub fn sort_nodes(nodes: &mut [&CommentNode], sort: CommentSort) {
    match sort {
        CommentSort::Newest => nodes.sort_by_key(|n| {
            std::cmp::Reverse(timestamp::sort_key(n.posted_at.as_ref()))
        }),
        CommentSort::MostLiked => nodes.sort_by_key(|n| std::cmp::Reverse(n.like_count)),
    }
}

/// Accumulating pager: each `load_more` reveals one more page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommentPager {
    page_size: usize,
    visible: usize,
}

impl CommentPager {
    pub fn new(page_size: usize) -> Self {
        let page_size = page_size.max(1);
        Self {
            page_size,
            visible: page_size,
        }
    }

    /// Restores a pager from a client-supplied visible count.
    pub fn with_visible(page_size: usize, visible: Option<usize>) -> Self {
        let mut pager = Self::new(page_size);
        if let Some(visible) = visible {
            pager.visible = visible.max(1);
        }
        pager
    }

    pub fn load_more(&mut self) {
        self.visible = self.visible.saturating_add(self.page_size);
    }

    pub fn reset(&mut self) {
        self.visible = self.page_size;
    }

    pub fn visible(&self) -> usize {
        self.visible
    }

    pub fn page_size(&self) -> usize {
        self.page_size
    }

    pub fn has_more(&self, total: usize) -> bool {
        self.visible < total
    }

    /// The visible count after the next `load_more`, if anything is left.
    pub fn next_visible(&self, total: usize) -> Option<usize> {
        self.has_more(total)
            .then(|| self.visible.saturating_add(self.page_size))
    }

    pub fn window<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        &items[..self.visible.min(items.len())]
    }
}

impl Default for CommentPager {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE)
    }
}
