use anyhow::Result;
use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};

use crate::payload::EntityId;

/// Claims issued by the Revalio backend. `sub` is the user id, numeric or
/// string depending on the issuer.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: EntityId,
    pub exp: i64,
    #[serde(default)]
    pub iat: Option<i64>,
}

/// Verifies `token` and returns its claims.
pub fn verify(token: &str, secret: &str) -> Result<Claims> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::default(),
    )?;
    Ok(data.claims)
}
