//! Client for the Revalio REST backend.

use anyhow::{Context, Result};
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, error, warn};

use crate::{
    auth::Viewer,
    comments::RawComment,
    config::settings::Settings,
    payload::{EntityId, ListEnvelope},
    threads::RawThread,
};

/// Which backend endpoint a payload came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Authenticated,
    Public,
}

#[derive(Debug)]
pub struct Fetched<T> {
    pub items: Vec<T>,
    pub source: Source,
}

#[derive(Clone)]
pub struct RevalioClient {
    http: Client,
    base_url: String,
}

impl RevalioClient {
    pub fn new(settings: &Settings) -> Result<Self> {
        let http = Client::builder()
            .timeout(settings.upstream_timeout)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            http,
            base_url: settings.api_base_url.clone(),
        })
    }

    /// Thread list, authenticated endpoint first, public one as fallback.
    pub async fn threads(&self, viewer: &Viewer) -> Result<Fetched<RawThread>> {
        self.get_list("/forum-threads", "/public/forum-threads", viewer)
            .await
    }

    /// Root comments (with nested replies) of one thread.
    pub async fn thread_comments(
        &self,
        thread_id: &EntityId,
        viewer: &Viewer,
    ) -> Result<Fetched<RawComment>> {
        let private_path = format!("/forum-threads/{thread_id}/comments");
        let public_path = format!("/public/forum-threads/{thread_id}/comments");
        self.get_list(&private_path, &public_path, viewer).await
    }

    /// Toggles the viewer's like on a comment. There is no public fallback.
    pub async fn toggle_comment_like(&self, comment_id: &EntityId, token: &str) -> Result<()> {
        let url = format!("{}/forum-comments/{comment_id}/like", self.base_url);
        self.http
            .post(&url)
            .bearer_auth(token)
            .send()
            .await
            .with_context(|| format!("POST {url}"))?
            .error_for_status()
            .with_context(|| format!("POST {url}"))?;
        Ok(())
    }

    async fn get_list<T>(
        &self,
        private_path: &str,
        public_path: &str,
        viewer: &Viewer,
    ) -> Result<Fetched<T>>
    where
        T: DeserializeOwned,
    {
        if let Some(token) = viewer.token.as_deref() {
            match self.get_once(private_path, Some(token)).await {
                Ok(items) => {
                    return Ok(Fetched {
                        items,
                        source: Source::Authenticated,
                    })
                }
                Err(e) => warn!("{private_path} failed, falling back to public endpoint: {e:#}"),
            }
        }

        match self.get_once(public_path, None).await {
            Ok(items) => Ok(Fetched {
                items,
                source: Source::Public,
            }),
            Err(e) => {
                error!("{public_path} failed: {e:#}");
                Err(e)
            }
        }
    }

    async fn get_once<T>(&self, path: &str, token: Option<&str>) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
    {
        let url = format!("{}{path}", self.base_url);
        let mut request = self.http.get(&url);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        let envelope = request
            .send()
            .await
            .with_context(|| format!("GET {url}"))?
            .error_for_status()
            .with_context(|| format!("GET {url}"))?
            .json::<ListEnvelope>()
            .await
            .with_context(|| format!("Undecodable payload from {url}"))?;

        let items = envelope.into_items();
        debug!(url = %url, count = items.len(), "fetched list");
        Ok(items)
    }
}
