use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rocket::http::{Cookie, CookieJar, Status};
use rocket::outcome::Outcome::{Error, Success};
use rocket::request::{self, FromRequest, Request};
use rocket::time::OffsetDateTime;
use serde::{Deserialize, Serialize};

use crate::data::user::User;
use crate::resp::problem::Problem;
use crate::role::Role;
use crate::security::Security;

pub static AUTH_COOKIE_NAME: &str = "jwt_auth";

/// Session claims carried in the auth cookie: who the caller is and which
/// role-scoped menu of operations they may reach.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRoleToken {
    #[serde(with = "jwt_numeric_date")]
    iat: DateTime<Utc>,
    #[serde(with = "jwt_numeric_date")]
    exp: DateTime<Utc>,
    pub user: String,
    pub role: Role,
}

impl UserRoleToken {
    pub fn new(user: &User) -> UserRoleToken {
        let now = Utc::now();
        UserRoleToken {
            iat: now,
            exp: now + Duration::weeks(1),
            user: user.id.clone(),
            role: user.role(),
        }
    }

    pub fn encode_jwt(
        &self,
        secret: impl AsRef<[u8]>,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let header = Header::new(Algorithm::HS256);
        let key = EncodingKey::from_secret(secret.as_ref());

        encode(&header, &self, &key)
    }

    pub fn cookie(
        &self,
        secret: impl AsRef<[u8]>,
    ) -> Result<Cookie<'static>, jsonwebtoken::errors::Error> {
        Ok(Cookie::build((AUTH_COOKIE_NAME, self.encode_jwt(secret)?))
            .expires(OffsetDateTime::from_unix_timestamp(self.exp.timestamp()).ok())
            .path("/")
            .http_only(true)
            .build())
    }
}

pub fn auth_problem(detail: impl ToString) -> Problem {
    Problem::new_untyped(Status::Unauthorized, "Unable to authorize user.")
        .detail(detail)
        .clone()
}

pub fn extract_claims(
    cookies: &CookieJar,
    secret: impl AsRef<[u8]>,
) -> Result<UserRoleToken, Problem> {
    let auth_cookie = cookies.get(AUTH_COOKIE_NAME);
    let token = match auth_cookie {
        Some(jwt) => jwt.value().to_owned(),
        None => {
            return Err(auth_problem("No JWT auth cookie."));
        }
    };
    tracing::debug!("extracted jwt auth from cookie");

    match decode::<UserRoleToken>(
        &token,
        &DecodingKey::from_secret(secret.as_ref()),
        &Validation::new(Algorithm::HS256),
    )
    .map(|data| data.claims)
    {
        Ok(it) => {
            tracing::debug!("decoded user role token for user: {}", it.user);

            Ok(it)
        }
        Err(_) => Err(auth_problem("JWT cookie was malformed.")),
    }
}

#[rocket::async_trait]
impl<'r> FromRequest<'r> for UserRoleToken {
    type Error = Problem;

    async fn from_request(req: &'r Request<'_>) -> request::Outcome<Self, Self::Error> {
        let security: &Security = req
            .rocket()
            .state()
            .expect("Security must be managed by the server");

        tracing::trace!("extracting user role token from request cookies");
        let claims: UserRoleToken = match extract_claims(req.cookies(), &security.jwt_secret) {
            Ok(it) => it,
            Err(e) => {
                tracing::debug!("unable to extract claims from cookies");
                return Error((Status::Unauthorized, e));
            }
        };

        Success(claims)
    }
}

mod jwt_numeric_date {
    //! Custom serialization of DateTime<Utc> to conform to the JWT spec (RFC 7519 section 2, "Numeric Date")
    use chrono::{DateTime, TimeZone, Utc};
    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(date: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let timestamp = date.timestamp();
        serializer.serialize_i64(timestamp)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Utc.timestamp_opt(i64::deserialize(deserializer)?, 0)
            .single() // If there are multiple or no valid DateTimes from timestamp, return None
            .ok_or_else(|| serde::de::Error::custom("Invalid Unix timestamp value."))
    }
}

pub trait HasAuthCookie {
    fn get_auth_cookie(&self, secret: impl AsRef<[u8]>) -> Option<UserRoleToken>;
}

#[cfg(test)]
impl HasAuthCookie for rocket::local::asynchronous::LocalResponse<'_> {
    fn get_auth_cookie(&self, secret: impl AsRef<[u8]>) -> Option<UserRoleToken> {
        extract_claims(self.cookies(), secret).ok()
    }
}
