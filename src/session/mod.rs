//! Anonymous client sessions carried in a cookie.
//!
//! A session is established the first time a client records a transaction
//! and is required for every read.

mod cookie;
mod middleware;

pub use cookie::{DEFAULT_SESSION_DURATION, SESSION_COOKIE, Session, SessionId};
pub use middleware::session_guard;
