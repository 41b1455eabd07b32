//! Turns the backend comment payload into a flat, UI-ready comment list.

use std::collections::HashSet;

use serde_json::Value;
use tracing::{debug, warn};

use crate::{
    authors,
    comments::{CommentNode, CommentTree, RawComment},
    payload::{coerce, is_truthy, timestamp, EntityId},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rejection {
    MissingId,
    MissingAuthor,
}

/// Builds the comment list for one thread.
///
/// Valid roots come first in input order, followed by replies grouped per
/// parent. Malformed entries are dropped and logged; this never fails.
pub fn build(raw_comments: &[RawComment], viewer_id: Option<&EntityId>) -> CommentTree {
    let mut nodes = Vec::with_capacity(raw_comments.len());
    let mut liked_ids = HashSet::new();
    let mut reply_groups: Vec<(EntityId, &[RawComment])> = Vec::new();

    for (index, comment) in raw_comments.iter().enumerate() {
        match to_node(comment, None, viewer_id) {
            Ok((node, liked)) => {
                if liked {
                    liked_ids.insert(node.id.clone());
                }
                nodes.push(node);
            }
            Err(reason) => warn!(index, ?reason, "dropping malformed comment"),
        }

        if comment.replies.is_empty() {
            continue;
        }
        match EntityId::from_value(&comment.id) {
            Some(parent) => reply_groups.push((parent, comment.replies.as_slice())),
            None => warn!(
                index,
                dropped = comment.replies.len(),
                "dropping replies of a comment without id"
            ),
        }
    }

    for (parent, replies) in reply_groups {
        for (index, reply) in replies.iter().enumerate() {
            match to_node(reply, Some(&parent), viewer_id) {
                Ok((node, liked)) => {
                    if liked {
                        liked_ids.insert(node.id.clone());
                    }
                    nodes.push(node);
                }
                Err(reason) => warn!(%parent, index, ?reason, "dropping malformed reply"),
            }
        }
    }

    debug!(nodes = nodes.len(), liked = liked_ids.len(), "built comment tree");
    CommentTree::new(nodes, liked_ids)
}

fn to_node(
    raw: &RawComment,
    parent_id: Option<&EntityId>,
    viewer_id: Option<&EntityId>,
) -> Result<(CommentNode, bool), Rejection> {
    let id = EntityId::from_value(&raw.id).ok_or(Rejection::MissingId)?;
    if raw.author_id().is_null() && raw.author_ref().is_none() {
        return Err(Rejection::MissingAuthor);
    }

    let author = authors::resolve(raw.author_ref(), raw.author_id());
    let is_owned_by_viewer = match (viewer_id, &author.id) {
        (Some(viewer), Some(author_id)) => viewer == author_id,
        _ => false,
    };

    let node = CommentNode {
        id,
        is_owned_by_viewer,
        is_edited: is_edited(raw.created(), raw.updated()),
        author,
        posted_at: timestamp::parse(Some(raw.created())),
        text: raw.content.as_str().unwrap_or_default().to_string(),
        parent_id: parent_id.cloned(),
        like_count: coerce::count(Some(raw.likes())),
    };

    Ok((node, is_truthy(raw.liked_flag())))
}

fn is_edited(created_at: &Value, updated_at: &Value) -> bool {
    let present = match updated_at {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        _ => true,
    };
    present && updated_at != created_at
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn raw(value: Value) -> Vec<RawComment> {
        serde_json::from_value(value).unwrap()
    }

    fn ids(nodes: &[CommentNode]) -> Vec<&str> {
        nodes.iter().map(|n| n.id.as_str()).collect()
    }

    #[test]
    fn roots_first_then_replies_grouped_by_parent() {
        let comments = raw(json!([
            { "id": 1, "user_id": 10, "replies": [
                { "id": 11, "user_id": 20 },
                { "id": 12, "user_id": 21 }
            ]},
            { "id": 2, "user_id": 11, "replies": [{ "id": 21, "user_id": 22 }] },
            { "id": 3, "user_id": 12 }
        ]));

        let tree = build(&comments, None);

        assert_eq!(ids(&tree.nodes), vec!["1", "2", "3", "11", "12", "21"]);
        assert_eq!(tree.nodes[0].parent_id, None);
        assert_eq!(tree.nodes[3].parent_id, Some(EntityId::new("1")));
        assert_eq!(tree.nodes[5].parent_id, Some(EntityId::new("2")));
    }

    #[test]
    fn drops_comment_without_author_and_keeps_siblings() {
        let comments = raw(json!([
            { "id": 1, "user_id": 10 },
            { "id": 2, "content": "tanpa penulis" },
            { "id": 3, "user": { "id": 12, "nama": "Rina" } }
        ]));

        let tree = build(&comments, None);

        assert_eq!(ids(&tree.nodes), vec!["1", "3"]);
    }

    #[test]
    fn malformed_author_keeps_ids_and_placeholder_name() {
        let comments = raw(json!([
            { "id": 1, "user": { "id": 9, "nama": 123 } },
            { "id": 2, "user_id": 4, "user": "Budi" }
        ]));

        let tree = build(&comments, None);

        assert_eq!(ids(&tree.nodes), vec!["1", "2"]);
        assert_eq!(tree.nodes[0].author.id, Some(EntityId::new("9")));
        assert_eq!(tree.nodes[0].author.name, "Pengguna");
        assert_eq!(tree.nodes[1].author.id, Some(EntityId::new("4")));
    }

    #[test]
    fn non_array_replies_keep_the_root() {
        let comments: Vec<RawComment> = crate::payload::decode_each(vec![
            json!({ "id": 1, "user_id": 5, "replies": {} }),
            json!({ "id": 2, "user_id": 6, "replies": "x" }),
            json!({ "id": 3, "user_id": 7, "replies": 0 }),
        ]);

        let tree = build(&comments, None);

        assert_eq!(ids(&tree.nodes), vec!["1", "2", "3"]);
        assert_eq!(tree.reply_count(&EntityId::new("1")), 0);
    }

    #[test]
    fn both_field_spellings_are_accepted() {
        let comments: Vec<RawComment> = crate::payload::decode_each(vec![json!({
            "id": 1,
            "user_id": 5, "userId": 6,
            "likes_count": 3, "likeCount": 9,
            "created_at": "2024-05-01 10:00:00", "postedAt": "2024-01-01 00:00:00",
            "updated_at": null, "updatedAt": "2024-05-02 10:00:00",
            "is_liked": null, "viewerHasLiked": 0, "liked_by_me": true
        })]);

        let tree = build(&comments, Some(&EntityId::new("5")));

        assert_eq!(ids(&tree.nodes), vec!["1"]);
        let node = &tree.nodes[0];
        assert_eq!(node.author.id, Some(EntityId::new("5")));
        assert!(node.is_owned_by_viewer);
        assert_eq!(node.like_count, 3);
        assert!(node.is_edited);
        // `viewerHasLiked` is present, so it wins over `liked_by_me`.
        assert!(!tree.is_liked(&node.id));
    }

    #[test]
    fn float_author_id_matches_viewer() {
        let comments = raw(json!([{ "id": 1.0, "user_id": 42.0 }]));

        let tree = build(&comments, Some(&EntityId::new("42")));

        assert_eq!(ids(&tree.nodes), vec!["1"]);
        assert!(tree.nodes[0].is_owned_by_viewer);
    }

    #[test]
    fn drops_comment_without_id() {
        let comments = raw(json!([{ "user_id": 10 }, { "id": null, "user_id": 11 }]));
        assert!(build(&comments, None).is_empty());
    }

    #[test]
    fn replies_of_author_less_root_are_orphaned_not_dropped() {
        let comments = raw(json!([
            { "id": 5, "replies": [{ "id": 51, "user_id": 3 }] }
        ]));

        let tree = build(&comments, None);

        assert_eq!(ids(&tree.nodes), vec!["51"]);
        assert_eq!(tree.roots().count(), 0);
        assert_eq!(tree.replies_of(&EntityId::new("5")).len(), 1);
    }

    #[test]
    fn replies_of_id_less_root_are_dropped() {
        let comments = raw(json!([
            { "user_id": 1, "replies": [{ "id": 51, "user_id": 3 }] }
        ]));
        assert!(build(&comments, None).is_empty());
    }

    #[test]
    fn ownership_compares_ids_as_strings() {
        let comments = raw(json!([
            { "id": 1, "user_id": 42 },
            { "id": 2, "user": { "user_id": "42" } },
            { "id": 3, "user_id": 43 }
        ]));

        let viewer = EntityId::new("42");
        let tree = build(&comments, Some(&viewer));

        let owned: Vec<bool> = tree.nodes.iter().map(|n| n.is_owned_by_viewer).collect();
        assert_eq!(owned, vec![true, true, false]);
    }

    #[test]
    fn anonymous_viewer_owns_nothing() {
        let comments = raw(json!([{ "id": 1, "user_id": 42 }]));
        assert!(!build(&comments, None).nodes[0].is_owned_by_viewer);
    }

    #[test]
    fn author_ref_id_wins_over_record_user_id() {
        let comments = raw(json!([{ "id": 1, "user_id": 7, "user": { "id": 42 } }]));
        let viewer = EntityId::new("42");

        let tree = build(&comments, Some(&viewer));

        assert_eq!(tree.nodes[0].author.id, Some(EntityId::new("42")));
        assert!(tree.nodes[0].is_owned_by_viewer);
    }

    #[test]
    fn resolves_author_display_fields() {
        let comments = raw(json!([
            { "id": 1, "user": { "id": 3, "nama_lengkap": "Dewi Lestari", "foto_profil": "profil/d.png" } },
            { "id": 2, "user_id": 4 }
        ]));

        let tree = build(&comments, None);

        assert_eq!(tree.nodes[0].author.name, "Dewi Lestari");
        assert_eq!(tree.nodes[0].author.avatar_url, "/storage/profil/d.png");
        assert_eq!(tree.nodes[1].author.name, "Pengguna");
        assert_eq!(tree.nodes[1].author.avatar_url, "");
    }

    #[test]
    fn edited_only_when_updated_differs() {
        let comments = raw(json!([
            { "id": 1, "user_id": 1, "created_at": "2024-05-01 10:00:00", "updated_at": "2024-05-01 10:00:00" },
            { "id": 2, "user_id": 1, "created_at": "2024-05-01 10:00:00", "updated_at": "2024-05-02 08:00:00" },
            { "id": 3, "user_id": 1, "created_at": "2024-05-01 10:00:00" }
        ]));

        let edited: Vec<bool> = build(&comments, None).nodes.iter().map(|n| n.is_edited).collect();
        assert_eq!(edited, vec![false, true, false]);
    }

    #[test]
    fn collects_liked_ids_from_roots_and_replies() {
        let comments = raw(json!([
            { "id": 1, "user_id": 1, "is_liked": true, "replies": [
                { "id": 11, "user_id": 2, "liked_by_me": 1 },
                { "id": 12, "user_id": 2, "is_liked": false }
            ]},
            { "id": 2, "user_id": 1 }
        ]));

        let tree = build(&comments, None);

        let mut liked: Vec<&str> = tree.liked_ids.iter().map(EntityId::as_str).collect();
        liked.sort();
        assert_eq!(liked, vec!["1", "11"]);
    }

    #[test]
    fn coerces_counts_text_and_dates() {
        let comments = raw(json!([
            { "id": 1, "user_id": 1, "likes_count": "3", "content": "Mantap", "created_at": "bukan tanggal" }
        ]));

        let node = &build(&comments, None).nodes[0];

        assert_eq!(node.like_count, 3);
        assert_eq!(node.text, "Mantap");
        assert_eq!(node.posted_at, None);
    }

    #[test]
    fn junk_reply_elements_are_skipped_while_decoding() {
        let comments = raw(json!([
            { "id": 1, "user_id": 1, "replies": [42, { "id": 11, "user_id": 2 }, null] }
        ]));

        assert_eq!(ids(&build(&comments, None).nodes), vec!["1", "11"]);
    }
}
