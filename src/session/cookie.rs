//! Defines the session identifier and how it is read from and written to cookies.

use std::fmt::Display;

use axum_extra::extract::{
    CookieJar,
    cookie::{Cookie, SameSite},
};
use rusqlite::types::{FromSql, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use time::Duration;
use uuid::Uuid;

/// The name of the cookie holding the session identifier.
pub const SESSION_COOKIE: &str = "sessionId";
/// How long a newly issued session cookie stays valid.
pub const DEFAULT_SESSION_DURATION: Duration = Duration::days(7);

/// An opaque token that scopes transactions to one anonymous client.
///
/// New identifiers are random UUIDs, but identifiers presented by clients are
/// passed through unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
    /// Create a fresh, random session identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Wrap an existing identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl ToSql for SessionId {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        self.0.to_sql()
    }
}

impl FromSql for SessionId {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        String::column_result(value).map(SessionId)
    }
}

/// Read the session identifier from `jar`.
///
/// A cookie with an empty value is treated the same as a missing cookie.
pub fn get_session_id(jar: &CookieJar) -> Option<SessionId> {
    jar.get(SESSION_COOKIE)
        .map(|cookie| cookie.value_trimmed())
        .filter(|value| !value.is_empty())
        .map(SessionId::new)
}

/// The session a request to create a transaction runs under.
///
/// Creating a transaction is the only operation that may start a session, so
/// rather than mutating the request, the handler asks for a [Session] and
/// decides whether it needs to hand a new cookie back to the client.
#[derive(Debug, Clone, PartialEq)]
pub enum Session {
    /// The client presented a session cookie.
    Existing(SessionId),
    /// The client had no session cookie so a new identifier was issued.
    Minted(SessionId),
}

impl Session {
    /// Use the session in `jar` if there is one, otherwise issue a new one.
    pub fn from_jar(jar: &CookieJar) -> Self {
        match get_session_id(jar) {
            Some(session_id) => Session::Existing(session_id),
            None => {
                let session_id = SessionId::generate();
                tracing::info!("Issuing new session {session_id}");
                Session::Minted(session_id)
            }
        }
    }

    /// The identifier of the session.
    pub fn id(&self) -> &SessionId {
        match self {
            Session::Existing(session_id) | Session::Minted(session_id) => session_id,
        }
    }

    /// Add the session cookie to `jar` if the session was just issued.
    ///
    /// Existing sessions leave `jar` untouched so that the client's cookie
    /// keeps its original expiry.
    pub fn persist(&self, jar: CookieJar, duration: Duration) -> CookieJar {
        match self {
            Session::Existing(_) => jar,
            Session::Minted(session_id) => jar.add(
                Cookie::build((SESSION_COOKIE, session_id.as_str().to_owned()))
                    .path("/")
                    .max_age(duration)
                    .http_only(true)
                    .same_site(SameSite::Lax),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        http::{
            HeaderMap, HeaderValue,
            header::{COOKIE, SET_COOKIE},
        },
        response::IntoResponse,
    };
    use axum_extra::extract::{
        CookieJar,
        cookie::{Cookie, SameSite},
    };
    use time::Duration;
    use uuid::Uuid;

    use super::{DEFAULT_SESSION_DURATION, SESSION_COOKIE, Session, SessionId, get_session_id};

    #[test]
    fn reads_session_id_from_cookie() {
        let jar = CookieJar::new().add(Cookie::new(SESSION_COOKIE, "abc-123"));

        assert_eq!(get_session_id(&jar), Some(SessionId::new("abc-123")));
    }

    #[test]
    fn empty_cookie_counts_as_missing() {
        let jar = CookieJar::new().add(Cookie::new(SESSION_COOKIE, ""));

        assert_eq!(get_session_id(&jar), None);
    }

    #[test]
    fn generated_ids_are_uuids() {
        let session_id = SessionId::generate();

        assert!(Uuid::parse_str(session_id.as_str()).is_ok());
        assert_ne!(session_id, SessionId::generate());
    }

    #[test]
    fn uses_existing_session() {
        let jar = CookieJar::new().add(Cookie::new(SESSION_COOKIE, "abc-123"));

        let session = Session::from_jar(&jar);

        assert_eq!(session, Session::Existing(SessionId::new("abc-123")));
    }

    #[test]
    fn mints_session_when_cookie_missing() {
        let session = Session::from_jar(&CookieJar::new());

        assert!(matches!(session, Session::Minted(_)));
    }

    #[test]
    fn persisting_minted_session_sets_cookie() {
        let session = Session::from_jar(&CookieJar::new());

        let jar = session.persist(CookieJar::new(), DEFAULT_SESSION_DURATION);

        let cookie = jar.get(SESSION_COOKIE).unwrap();
        assert_eq!(cookie.value(), session.id().as_str());
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(Duration::days(7)));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
    }

    #[test]
    fn persisting_existing_session_leaves_jar_alone() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("sessionId=abc-123"));
        let jar = CookieJar::from_headers(&headers);
        let session = Session::from_jar(&jar);

        let jar = session.persist(jar, DEFAULT_SESSION_DURATION);

        let cookie = jar.get(SESSION_COOKIE).unwrap();
        assert_eq!(cookie.value(), "abc-123");
        assert!(jar.into_response().headers().get(SET_COOKIE).is_none());
    }
}
