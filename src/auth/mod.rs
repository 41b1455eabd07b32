use std::convert::Infallible;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
    RequestPartsExt,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};

use crate::{config::settings::Settings, payload::EntityId};

pub mod jwt;

/// Who is looking at the page.
///
/// Extraction never fails: a missing or unverifiable token just makes the
/// viewer anonymous. The raw token is kept so reads can be forwarded to the
/// authenticated backend endpoints.
#[derive(Debug, Clone, Default)]
pub struct Viewer {
    pub id: Option<EntityId>,
    pub token: Option<String>,
}

impl Viewer {
    pub fn anonymous() -> Self {
        Self::default()
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Viewer
where
    S: Send + Sync,
    Settings: FromRef<S>,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Ok(TypedHeader(Authorization(bearer))) =
            parts.extract::<TypedHeader<Authorization<Bearer>>>().await
        else {
            return Ok(Viewer::anonymous());
        };

        let settings = Settings::from_ref(state);
        let token = bearer.token().to_string();

        let id = settings
            .jwt_secret
            .as_deref()
            .and_then(|secret| match jwt::verify(&token, secret) {
                Ok(claims) => Some(claims.sub),
                Err(e) => {
                    tracing::debug!("viewer token not verified: {e}");
                    None
                }
            });

        Ok(Viewer {
            id,
            token: Some(token),
        })
    }
}
