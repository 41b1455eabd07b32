use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use crate::{
    authors::{lenient_author, Author, AuthorRef},
    payload::{first_present, EntityId},
};

pub mod handler;
pub mod ranking;

/// A forum thread summary as the backend sends it.
///
/// Snake and camel case spellings are separate fields since a record may
/// carry both; the accessors prefer the snake case one.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawThread {
    #[serde(default)]
    pub id: Value,
    #[serde(default)]
    pub thread_id: Value,
    #[serde(default)]
    pub title: Value,
    #[serde(default)]
    pub content: Value,
    #[serde(default)]
    pub description: Value,
    #[serde(default, deserialize_with = "lenient_author")]
    pub user: Option<AuthorRef>,
    #[serde(default, rename = "authorRef", deserialize_with = "lenient_author")]
    pub author_ref: Option<AuthorRef>,
    #[serde(default)]
    pub user_id: Value,
    #[serde(default, rename = "userId")]
    pub user_id_camel: Value,
    /// Comma separated, e.g. `"tips, plastik"`.
    #[serde(default)]
    pub tags: Value,
    #[serde(default)]
    pub comments_count: Value,
    #[serde(default, rename = "commentCount")]
    pub comment_count: Value,
    #[serde(default)]
    pub likes_count: Value,
    #[serde(default, rename = "likeCount")]
    pub like_count: Value,
    #[serde(default)]
    pub views_count: Value,
    #[serde(default, rename = "viewCount")]
    pub view_count: Value,
    #[serde(default)]
    pub average_rating: Value,
    #[serde(default, rename = "averageRating")]
    pub average_rating_camel: Value,
    #[serde(default)]
    pub ratings_count: Value,
    #[serde(default, rename = "ratingCount")]
    pub rating_count: Value,
    #[serde(default)]
    pub created_at: Value,
    #[serde(default, rename = "postedAt")]
    pub posted_at: Value,
}

impl RawThread {
    pub fn resolved_id(&self) -> &Value {
        first_present([&self.id, &self.thread_id])
    }

    /// `content`, then `description`.
    pub fn body(&self) -> &Value {
        first_present([&self.content, &self.description])
    }

    pub fn author(&self) -> Option<&AuthorRef> {
        self.user.as_ref().or(self.author_ref.as_ref())
    }

    pub fn author_id(&self) -> &Value {
        first_present([&self.user_id, &self.user_id_camel])
    }

    pub fn comments(&self) -> &Value {
        first_present([&self.comments_count, &self.comment_count])
    }

    pub fn likes(&self) -> &Value {
        first_present([&self.likes_count, &self.like_count])
    }

    pub fn views(&self) -> &Value {
        first_present([&self.views_count, &self.view_count])
    }

    pub fn rating(&self) -> &Value {
        first_present([&self.average_rating, &self.average_rating_camel])
    }

    pub fn ratings(&self) -> &Value {
        first_present([&self.ratings_count, &self.rating_count])
    }

    pub fn created(&self) -> &Value {
        first_present([&self.created_at, &self.posted_at])
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub enum Category {
    #[default]
    Umum,
    #[serde(rename = "Tips & Trik")]
    TipsTrik,
    #[serde(rename = "Daur Ulang")]
    DaurUlang,
}

impl Category {
    pub const ALL: [Category; 3] = [Category::Umum, Category::TipsTrik, Category::DaurUlang];

    pub fn label(self) -> &'static str {
        match self {
            Category::Umum => "Umum",
            Category::TipsTrik => "Tips & Trik",
            Category::DaurUlang => "Daur Ulang",
        }
    }

    fn slug(self) -> &'static str {
        match self {
            Category::Umum => "umum",
            Category::TipsTrik => "tips-trik",
            Category::DaurUlang => "daur-ulang",
        }
    }

    /// Parses a category filter. `None` means "all categories".
    pub fn from_param(param: Option<&str>) -> Result<Option<Self>, String> {
        let Some(raw) = param.map(str::trim).filter(|p| !p.is_empty()) else {
            return Ok(None);
        };
        let wanted = raw.to_lowercase();
        if matches!(wanted.as_str(), "semua" | "all") {
            return Ok(None);
        }

        Category::ALL
            .into_iter()
            .find(|c| c.label().to_lowercase() == wanted || c.slug() == wanted)
            .map(Some)
            .ok_or_else(|| format!("Unknown category '{raw}'"))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Normalized thread, ready for listing and ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ThreadSummary {
    pub id: Option<EntityId>,
    pub title: String,
    pub description: String,
    pub author: Author,
    pub category: Category,
    pub tags: Vec<String>,
    pub comment_count: i64,
    pub like_count: i64,
    pub view_count: i64,
    pub rating: f64,
    pub rating_count: i64,
    pub popularity_score: f64,
    pub posted_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ThreadSort {
    #[default]
    Latest,
    Popular,
}

impl ThreadSort {
    pub fn from_param(param: Option<&str>) -> Self {
        match param {
            Some("popular") | Some("populer") => ThreadSort::Popular,
            _ => ThreadSort::Latest, // Default latest
        }
    }
}

/// What the thread list page is currently asking for.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThreadQuery {
    pub sort: ThreadSort,
    pub category: Option<Category>,
    pub search: Option<String>,
}

/// Query parameters for the thread listing
#[derive(Debug, Default, Deserialize, Validate)]
pub struct ThreadFilter {
    pub sort: Option<String>, // "latest" or "popular"
    pub category: Option<String>,
    #[validate(length(max = 200, message = "Search must be at most 200 characters"))]
    pub search: Option<String>,
}

impl TryFrom<ThreadFilter> for ThreadQuery {
    type Error = String;

    fn try_from(filter: ThreadFilter) -> Result<Self, Self::Error> {
        Ok(ThreadQuery {
            sort: ThreadSort::from_param(filter.sort.as_deref()),
            category: Category::from_param(filter.category.as_deref())?,
            search: filter.search,
        })
    }
}
