use std::marker::PhantomData;

use chrono::{serde::ts_seconds, DateTime, Utc};
use jsonwebtoken::{
    errors::Error as JwtError, DecodingKey, EncodingKey, Header, TokenData, Validation,
};
use log::debug;
use rocket::{
    http::{Cookie, SameSite, Status},
    request::{self, FromRequest},
    time, Request,
};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::model::{store::Store, voter::VoterId};

use super::user::{Rights, User};

pub const AUTH_TOKEN_COOKIE: &str = "auth_token";

/// An authentication token representing a specific user with specific rights.
#[derive(Serialize, Deserialize)]
pub struct AuthToken<U> {
    id: VoterId,
    #[serde(rename = "rgt")]
    rights: Rights,
    #[serde(skip)]
    phantom: PhantomData<U>,
}

impl<U> AuthToken<U> {
    /// Get the user ID.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Get the user's rights.
    pub fn rights(&self) -> Rights {
        self.rights
    }

    /// Does this token permit the given rights?
    pub fn permits(&self, target: Rights) -> bool {
        self.rights == target
    }
}

impl<U> AuthToken<U>
where
    U: User,
{
    /// Create a new [`AuthToken`] for the given user, with the correct rights for
    /// that user type.
    pub fn new(user: &U) -> Self {
        Self {
            id: user.id(),
            rights: U::RIGHTS,
            phantom: PhantomData,
        }
    }

    /// Serialize this token into a signed cookie.
    pub fn into_cookie(self, config: &Config) -> Result<Cookie<'static>> {
        let ttl = config.auth_ttl(self.rights);
        let claims = Claims {
            token: self,
            expire_at: Utc::now() + ttl,
        };

        let token = jsonwebtoken::encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(config.jwt_secret()),
        )?;

        Ok(Cookie::build(AUTH_TOKEN_COOKIE, token)
            .max_age(time::Duration::seconds(ttl.num_seconds()))
            .http_only(true)
            .same_site(SameSite::Strict)
            .finish())
    }

    /// Deserialize a token from a cookie.
    pub fn from_cookie(
        cookie: &Cookie<'static>,
        config: &Config,
    ) -> std::result::Result<Self, JwtError> {
        jsonwebtoken::decode(
            cookie.value(),
            &DecodingKey::from_secret(config.jwt_secret()),
            &Validation::default(),
        )
        .map(|claims: TokenData<Claims<U>>| claims.claims.token)
    }
}

/// Cookie claims: the token itself plus an expiry datetime.
#[derive(Serialize, Deserialize)]
struct Claims<U> {
    #[serde(flatten, bound = "")]
    token: AuthToken<U>,
    #[serde(rename = "exp", with = "ts_seconds")]
    expire_at: DateTime<Utc>,
}

/// Why an auth guard rejected the current request.
///
/// Rocket discards a guard's error before calling catchers, so the guard
/// caches the message on the request for the catcher to report.
#[derive(Debug, Default)]
pub struct AuthFailure(Option<String>);

impl AuthFailure {
    pub fn message(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

fn unauthorized<T>(req: &Request<'_>, message: &str) -> request::Outcome<T, Error> {
    req.local_cache(|| AuthFailure(Some(message.to_string())));
    request::Outcome::Failure((Status::Unauthorized, Error::Unauthorized(message.to_string())))
}

#[rocket::async_trait]
impl<'r, U> FromRequest<'r> for AuthToken<U>
where
    U: User,
{
    type Error = Error;

    /// Get an AuthToken from the cookie and verify that it has the correct rights
    /// for this user type. Voter tokens must also refer to a voter that still exists.
    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let (Some(config), Some(store)) = (
            req.rocket().state::<Config>(),
            req.rocket().state::<Store>(),
        ) else {
            return request::Outcome::Failure((
                Status::InternalServerError,
                Error::StateConflict("Server is not configured".to_string()),
            ));
        };

        let Some(cookie) = req.cookies().get(AUTH_TOKEN_COOKIE) else {
            return unauthorized(req, "Please log in first.");
        };
        let token: Self = match Self::from_cookie(cookie, config) {
            Ok(token) => token,
            Err(e) => {
                debug!("Rejected auth token: {e}");
                return unauthorized(
                    req,
                    "Your session is invalid or has expired. Please log in again.",
                );
            }
        };

        if !token.permits(U::RIGHTS) {
            return unauthorized(req, "You are not allowed to do that.");
        }
        if token.rights == Rights::Voter && store.voter(&token.id).is_none() {
            return unauthorized(req, "Voter not found. Please log in again.");
        }
        request::Outcome::Success(token)
    }
}
