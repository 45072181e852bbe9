//! Server-side sessions keyed by a random cookie.
//!
//! The cookie only carries an id; who is logged in and which flash messages
//! are pending stays in [`SessionStore`], behind the shared state mutex.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use axum::extract::Request;
use axum::http::header::{COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue};
use axum::middleware::Next;
use axum::response::Response;
use uuid::Uuid;

pub const COOKIE_NAME: &str = "righton_session";

/// Id of the session attached to the current request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionId(pub String);

#[derive(Debug, Clone)]
pub struct Viewer {
    pub user_id: i64,
    pub username: String,
}

/// Sessions idle this long are dropped.
pub const DEFAULT_IDLE_TTL: Duration = Duration::from_secs(24 * 60 * 60);
/// Upper bound on live sessions; the least recently seen one is evicted.
pub const DEFAULT_MAX_SESSIONS: usize = 10_000;

#[derive(Debug)]
struct Session {
    viewer: Option<Viewer>,
    flashes: Vec<String>,
    last_seen: Instant,
}

impl Session {
    fn new(now: Instant) -> Self {
        Self {
            viewer: None,
            flashes: Vec::new(),
            last_seen: now,
        }
    }
}

/// Entries are created only by a login or a flash. Anonymous browsing
/// leaves no trace, and a session left with neither is dropped.
#[derive(Debug)]
pub struct SessionStore {
    sessions: HashMap<String, Session>,
    idle_ttl: Duration,
    max_sessions: usize,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_IDLE_TTL, DEFAULT_MAX_SESSIONS)
    }
}

impl SessionStore {
    pub fn new(idle_ttl: Duration, max_sessions: usize) -> Self {
        Self {
            sessions: HashMap::new(),
            idle_ttl,
            max_sessions: max_sessions.max(1),
        }
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn viewer(&self, id: &SessionId) -> Option<&Viewer> {
        let now = Instant::now();
        self.sessions
            .get(&id.0)
            .filter(|s| self.is_live(s, now))
            .and_then(|s| s.viewer.as_ref())
    }

    pub fn log_in(&mut self, id: &SessionId, user_id: i64, username: &str) {
        self.entry(id).viewer = Some(Viewer {
            user_id,
            username: username.to_string(),
        });
    }

    /// Forget everything about the session, pending flashes included.
    pub fn clear(&mut self, id: &SessionId) {
        self.sessions.remove(&id.0);
    }

    pub fn flash(&mut self, id: &SessionId, message: impl Into<String>) {
        self.entry(id).flashes.push(message.into());
    }

    pub fn take_flashes(&mut self, id: &SessionId) -> Vec<String> {
        let now = Instant::now();
        if !self.sessions.get(&id.0).is_some_and(|s| self.is_live(s, now)) {
            self.sessions.remove(&id.0);
            return Vec::new();
        }
        let Some(session) = self.sessions.get_mut(&id.0) else {
            return Vec::new();
        };
        session.last_seen = now;
        let flashes = std::mem::take(&mut session.flashes);
        if session.viewer.is_none() {
            self.sessions.remove(&id.0);
        }
        flashes
    }

    /// Live entry for `id`, created after expiring idle sessions and making
    /// room under the cap.
    fn entry(&mut self, id: &SessionId) -> &mut Session {
        let now = Instant::now();
        if !self.sessions.get(&id.0).is_some_and(|s| self.is_live(s, now)) {
            self.sessions.remove(&id.0);
            self.prune(now);
        }
        let session = self
            .sessions
            .entry(id.0.clone())
            .or_insert_with(|| Session::new(now));
        session.last_seen = now;
        session
    }

    fn is_live(&self, session: &Session, now: Instant) -> bool {
        now.saturating_duration_since(session.last_seen) < self.idle_ttl
    }

    fn prune(&mut self, now: Instant) {
        let ttl = self.idle_ttl;
        self.sessions
            .retain(|_, s| now.saturating_duration_since(s.last_seen) < ttl);

        while self.sessions.len() >= self.max_sessions {
            let oldest = self
                .sessions
                .iter()
                .min_by_key(|(_, s)| s.last_seen)
                .map(|(key, _)| key.clone());
            match oldest {
                Some(key) => {
                    tracing::debug!("evicting idle session to stay under {}", self.max_sessions);
                    self.sessions.remove(&key);
                }
                None => break,
            }
        }
    }
}

/// Session id from the request cookie, if it is one we could have issued.
fn session_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == COOKIE_NAME)
        .and_then(|(_, value)| Uuid::parse_str(value).ok())
        .map(|id| id.to_string())
}

/// Attach a [`SessionId`] to every request, issuing a cookie when the
/// client did not send a usable one.
pub async fn ensure_session(mut req: Request, next: Next) -> Response {
    let (id, fresh) = match session_cookie(req.headers()) {
        Some(id) => (id, false),
        None => (Uuid::new_v4().to_string(), true),
    };
    req.extensions_mut().insert(SessionId(id.clone()));

    let mut response = next.run(req).await;
    if fresh {
        let cookie = format!("{COOKIE_NAME}={id}; Path=/; HttpOnly; SameSite=Lax");
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                response.headers_mut().append(SET_COOKIE, value);
            }
            Err(e) => tracing::warn!("could not set session cookie: {e}"),
        }
    }
    response
}
