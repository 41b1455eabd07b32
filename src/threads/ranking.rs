//! Thread normalization, filtering and popularity ranking.

use serde_json::Value;
use tracing::debug;

use crate::{
    authors,
    payload::{coerce, timestamp, EntityId},
    threads::{Category, RawThread, ThreadQuery, ThreadSort, ThreadSummary},
};

pub const COMMENT_WEIGHT: f64 = 2.0;
pub const LIKE_WEIGHT: f64 = 3.0;
pub const VIEW_WEIGHT: f64 = 0.5;
pub const RATING_WEIGHT: f64 = 5.0;

/// Normalizes every thread in the payload. Pure: the same input always gives
/// the same output, and threads without an id are kept.
pub fn normalize(raw_threads: &[RawThread]) -> Vec<ThreadSummary> {
    raw_threads.iter().map(normalize_one).collect()
}

fn normalize_one(raw: &RawThread) -> ThreadSummary {
    let comment_count = coerce::count(Some(raw.comments()));
    let like_count = coerce::count(Some(raw.likes()));
    let view_count = coerce::count(Some(raw.views()));
    let rating = coerce::rating(Some(raw.rating()));
    let tags = display_tags(&raw.tags);

    let id = EntityId::from_value(raw.resolved_id());
    if id.is_none() {
        debug!(title = ?raw.title, "thread without id");
    }

    ThreadSummary {
        id,
        title: text(&raw.title),
        description: text(raw.body()),
        author: authors::resolve(raw.author(), raw.author_id()),
        category: category_for(&tags),
        popularity_score: popularity_score(comment_count, like_count, view_count, rating),
        tags,
        comment_count,
        like_count,
        view_count,
        rating,
        rating_count: coerce::count(Some(raw.ratings())),
        posted_at: timestamp::parse(Some(raw.created())),
    }
}

pub fn popularity_score(comments: i64, likes: i64, views: i64, rating: f64) -> f64 {
    comments as f64 * COMMENT_WEIGHT
        + likes as f64 * LIKE_WEIGHT
        + views as f64 * VIEW_WEIGHT
        + rating * RATING_WEIGHT
}

/// Comma-split, trimmed, non-empty tags with their original casing. A JSON
/// array of strings is accepted as well.
pub fn display_tags(tags: &Value) -> Vec<String> {
    let pieces: Vec<&str> = match tags {
        Value::String(s) => s.split(',').collect(),
        Value::Array(items) => items.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    };

    pieces
        .into_iter()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}

/// Tips beats recycling; anything else is general.
pub fn category_for(tags: &[String]) -> Category {
    let lowered: Vec<String> = tags.iter().map(|t| t.trim().to_lowercase()).collect();
    let any_contains = |needles: &[&str]| {
        lowered
            .iter()
            .any(|tag| needles.iter().any(|needle| tag.contains(needle)))
    };

    if any_contains(&["tips", "trik"]) {
        Category::TipsTrik
    } else if any_contains(&["daur", "recycling"]) {
        Category::DaurUlang
    } else {
        Category::Umum
    }
}

/// Applies category and search filters, then sorts. The sort is stable, so
/// ties keep their payload order.
pub fn rank<'a>(threads: &'a [ThreadSummary], query: &ThreadQuery) -> Vec<&'a ThreadSummary> {
    let needle = query
        .search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);

    let mut ranked: Vec<&ThreadSummary> = threads
        .iter()
        .filter(|t| query.category.map_or(true, |c| t.category == c))
        .filter(|t| match &needle {
            Some(needle) => {
                t.title.to_lowercase().contains(needle)
                    || t.description.to_lowercase().contains(needle)
            }
            None => true,
        })
        .collect();

    match query.sort {
        ThreadSort::Popular => {
            ranked.sort_by(|a, b| b.popularity_score.total_cmp(&a.popularity_score))
        }
        ThreadSort::Latest => ranked.sort_by_key(|t| {
            std::cmp::Reverse(timestamp::sort_key(t.posted_at.as_ref()))
        }),
    }

    ranked
}

fn text(value: &Value) -> String {
    value.as_str().unwrap_or_default().to_string()
}
