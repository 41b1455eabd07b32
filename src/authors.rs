//! Author normalization shared by comments and threads.
//!
//! The authenticated and public backend endpoints embed the author with
//! different field names. `AuthorRef` accepts all of them and resolves each
//! attribute through a fixed priority list.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::payload::EntityId;

pub const PLACEHOLDER_NAME: &str = "Pengguna";
const STORAGE_PREFIX: &str = "/storage/";

/// The author object as the backend sends it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuthorRef {
    #[serde(default)]
    pub id: Value,
    #[serde(default)]
    pub user_id: Value,
    pub nama: Option<String>,
    pub nama_lengkap: Option<String>,
    pub name: Option<String>,
    pub avatar: Option<String>,
    pub foto_profil: Option<String>,
}

/// Normalized author, as served to the front-end.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Author {
    pub id: Option<EntityId>,
    pub name: String,
    pub avatar_url: String,
}

impl AuthorRef {
    /// Author id: `id`, then `user_id`, then the record's own `user_id`.
    pub fn resolve_id(&self, fallback: &Value) -> Option<EntityId> {
        [&self.id, &self.user_id, fallback]
            .into_iter()
            .find(|v| !v.is_null())
            .and_then(EntityId::from_value)
    }

    /// Display name: `nama`, `nama_lengkap`, `name`, then the placeholder.
    pub fn display_name(&self) -> String {
        [&self.nama, &self.nama_lengkap, &self.name]
            .into_iter()
            .flatten()
            .map(|s| s.trim())
            .find(|s| !s.is_empty())
            .unwrap_or(PLACEHOLDER_NAME)
            .to_string()
    }

    /// Avatar path: `avatar`, then `foto_profil`, normalized.
    pub fn avatar_url(&self) -> String {
        let raw = [&self.avatar, &self.foto_profil]
            .into_iter()
            .flatten()
            .map(|s| s.trim())
            .find(|s| !s.is_empty());
        normalize_avatar(raw)
    }
}

/// An embedded author that is not an object counts as absent. An object with
/// badly typed display fields still contributes its ids.
pub fn lenient_author<'de, D>(deserializer: D) -> Result<Option<AuthorRef>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let Some(fields) = value.as_object() else {
        return Ok(None);
    };

    let id_field = |key: &str| fields.get(key).cloned().unwrap_or_default();
    let fallback = AuthorRef {
        id: id_field("id"),
        user_id: id_field("user_id"),
        ..AuthorRef::default()
    };
    Ok(Some(serde_json::from_value(value).unwrap_or(fallback)))
}

/// Resolves an author from an optional embedded ref and the record's own
/// `user_id` field.
pub fn resolve(author: Option<&AuthorRef>, user_id: &Value) -> Author {
    match author {
        Some(author) => Author {
            id: author.resolve_id(user_id),
            name: author.display_name(),
            avatar_url: author.avatar_url(),
        },
        None => Author {
            id: EntityId::from_value(user_id),
            name: PLACEHOLDER_NAME.to_string(),
            avatar_url: String::new(),
        },
    }
}

/// Maps a backend avatar path onto the public storage path.
pub fn normalize_avatar(raw: Option<&str>) -> String {
    let Some(path) = raw.filter(|p| !p.is_empty()) else {
        return String::new();
    };

    if path.starts_with("http") || path.starts_with(STORAGE_PREFIX) {
        return path.to_string();
    }

    let rooted = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    };

    if rooted.starts_with(STORAGE_PREFIX) {
        rooted
    } else {
        format!("/storage{rooted}")
    }
}
