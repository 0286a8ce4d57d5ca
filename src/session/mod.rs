//! Credential storage.
//!
//! The bearer token lives in a `token` cookie with a fixed lifetime. The
//! transport reads it on every request; the login and logout flows write and
//! clear it.

use std::path::{Path, PathBuf};
use std::sync::RwLock;

use cookie::Cookie;
use thiserror::Error;
use time::{Duration, OffsetDateTime};
use tracing::{debug, warn};

use crate::cache::lock::{rw_read, rw_write};

pub const TOKEN_COOKIE: &str = "token";
pub const DEFAULT_TOKEN_TTL: Duration = Duration::days(7);

const SOURCE: &str = "session";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to access cookie file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("malformed cookie file {path}: {reason}")]
    Malformed { path: String, reason: String },
}

/// Source of the bearer credential.
pub trait SessionStore: Send + Sync {
    /// Current token, or `None` when absent or expired.
    fn token(&self) -> Option<String>;

    fn store_token(&self, token: &str) -> Result<(), SessionError>;

    fn clear(&self) -> Result<(), SessionError>;
}

/// Cookie-backed session, optionally persisted to a file as a `Set-Cookie` line.
pub struct CookieSession {
    cookie: RwLock<Option<Cookie<'static>>>,
    ttl: Duration,
    file: Option<PathBuf>,
}

impl CookieSession {
    pub fn in_memory() -> Self {
        Self {
            cookie: RwLock::new(None),
            ttl: DEFAULT_TOKEN_TTL,
            file: None,
        }
    }

    /// Open a file-backed session, loading any cookie already stored there.
    pub fn open(path: impl Into<PathBuf>, ttl: Duration) -> Result<Self, SessionError> {
        let path = path.into();
        let cookie = load_cookie(&path)?;
        Ok(Self {
            cookie: RwLock::new(cookie),
            ttl,
            file: Some(path),
        })
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Expiry of the stored cookie.
    pub fn expires_at(&self) -> Option<OffsetDateTime> {
        rw_read(&self.cookie, SOURCE, "expires_at")
            .as_ref()
            .and_then(Cookie::expires_datetime)
    }

    fn build_cookie(&self, token: &str) -> Cookie<'static> {
        Cookie::build((TOKEN_COOKIE, token.to_string()))
            .path("/")
            .max_age(self.ttl)
            .expires(OffsetDateTime::now_utc() + self.ttl)
            .build()
    }

    fn persist(&self, cookie: Option<&Cookie<'static>>) -> Result<(), SessionError> {
        let Some(path) = self.file.as_deref() else {
            return Ok(());
        };
        let result = match cookie {
            Some(cookie) => std::fs::write(path, format!("{cookie}\n")),
            None => match std::fs::remove_file(path) {
                Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
                other => other,
            },
        };
        result.map_err(|source| SessionError::Io {
            path: path.display().to_string(),
            source,
        })
    }
}

impl SessionStore for CookieSession {
    fn token(&self) -> Option<String> {
        let guard = rw_read(&self.cookie, SOURCE, "token");
        let cookie = guard.as_ref()?;
        match cookie.expires_datetime() {
            Some(expires) if expires <= OffsetDateTime::now_utc() => {
                debug!(%expires, "session token expired");
                None
            }
            _ => Some(cookie.value().to_string()),
        }
    }

    fn store_token(&self, token: &str) -> Result<(), SessionError> {
        let cookie = self.build_cookie(token);
        self.persist(Some(&cookie))?;
        *rw_write(&self.cookie, SOURCE, "store_token") = Some(cookie);
        Ok(())
    }

    fn clear(&self) -> Result<(), SessionError> {
        *rw_write(&self.cookie, SOURCE, "clear") = None;
        self.persist(None)
    }
}

fn load_cookie(path: &Path) -> Result<Option<Cookie<'static>>, SessionError> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(SessionError::Io {
                path: path.display().to_string(),
                source,
            });
        }
    };

    let line = raw.trim();
    if line.is_empty() {
        return Ok(None);
    }

    let cookie = Cookie::parse(line.to_string()).map_err(|e| SessionError::Malformed {
        path: path.display().to_string(),
        reason: e.to_string(),
    })?;
    if cookie.name() != TOKEN_COOKIE {
        warn!(name = cookie.name(), "ignoring unexpected cookie in session file");
        return Ok(None);
    }
    Ok(Some(cookie))
}
