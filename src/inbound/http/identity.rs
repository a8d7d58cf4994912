//! Bearer-token authentication for HTTP handlers.
//!
//! Tokens are signed JWTs carrying the account identifier. The extractor
//! only pulls the raw credential off the request; verification and the
//! account lookup happen in [`authenticate`] so handlers control which
//! routes require a signed-in user.

use std::future::{ready, Ready};

use actix_web::dev::Payload;
use actix_web::{FromRequest, HttpRequest};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::domain::{Error, User, UserId};
use crate::inbound::http::state::HttpState;

/// JWT claims carried by issued tokens.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    /// Account identifier.
    sub: String,
    /// Expiry, seconds since the epoch.
    exp: i64,
    /// Issued-at, seconds since the epoch.
    iat: i64,
}

/// Issues and verifies signed bearer tokens.
#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenCodec {
    pub fn new(secret: &str, ttl_hours: i64) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl: Duration::hours(ttl_hours),
        }
    }

    /// Sign a token for the given account.
    pub fn issue(&self, user: &UserId) -> Result<String, Error> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.to_string(),
            exp: (now + self.ttl).timestamp(),
            iat: now.timestamp(),
        };
        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|error| Error::internal(format!("failed to sign token: {error}")))
    }

    /// Verify a token's signature and expiry, returning the account it
    /// belongs to.
    pub fn verify(&self, token: &str) -> Result<UserId, Error> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default())
            .map_err(|_| Error::unauthorized("invalid or expired token"))?;
        UserId::parse(&data.claims.sub)
            .map_err(|_| Error::unauthorized("invalid or expired token"))
    }
}

/// Raw bearer credential extracted from the `Authorization` header.
#[derive(Debug, Clone)]
pub struct BearerToken(String);

impl BearerToken {
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl FromRequest for BearerToken {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = req
            .headers()
            .get("Authorization")
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .map(str::to_owned);
        ready(match token {
            Some(token) if !token.is_empty() => Ok(Self(token)),
            _ => Err(Error::unauthorized("authentication required")),
        })
    }
}

/// Resolve a bearer credential to the account it belongs to.
pub async fn authenticate(state: &HttpState, token: &BearerToken) -> Result<User, Error> {
    let user_id = state.tokens.verify(token.as_str())?;
    state
        .users
        .find_by_id(&user_id)
        .await?
        .ok_or_else(|| Error::unauthorized("account no longer exists"))
}
