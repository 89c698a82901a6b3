use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use std::sync::Mutex;

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::Utc;
use tracing::debug;

use crate::models::auth::{Claims, TokenUser, User};

const TOKEN_KEY: &str = "token";
const USER_KEY: &str = "user.json";

/// Decode the payload segment of a JWT without verifying the signature.
/// The decoded claims drive UI gating only; the server remains the trust
/// boundary for every mutating call. Any malformed token yields `None`.
pub fn decode_claims(token: &str) -> Option<Claims> {
    let payload = token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload).ok()?;
    serde_json::from_slice(&bytes).ok()
}

enum Backend {
    Memory(Mutex<HashMap<String, String>>),
    Dir(PathBuf),
}

/// Persisted session state: the bearer token and the user object cached at
/// login, stored under two well-known keys. The two are always written and
/// purged together so a stale user can never outlive its token.
pub struct SessionStore {
    backend: Backend,
}

impl SessionStore {
    /// Volatile store for tests and one-shot flows.
    pub fn in_memory() -> Self {
        Self {
            backend: Backend::Memory(Mutex::new(HashMap::new())),
        }
    }

    /// Store backed by a directory on disk, one file per key.
    pub fn at_dir(path: impl Into<PathBuf>) -> Self {
        Self {
            backend: Backend::Dir(path.into()),
        }
    }

    fn read(&self, key: &str) -> Option<String> {
        match &self.backend {
            Backend::Memory(map) => map.lock().ok()?.get(key).cloned(),
            Backend::Dir(dir) => fs::read_to_string(dir.join(key)).ok(),
        }
    }

    fn write(&self, key: &str, value: &str) -> anyhow::Result<()> {
        match &self.backend {
            Backend::Memory(map) => {
                map.lock()
                    .map_err(|_| anyhow::anyhow!("session store poisoned"))?
                    .insert(key.to_string(), value.to_string());
            }
            Backend::Dir(dir) => {
                fs::create_dir_all(dir)?;
                fs::write(dir.join(key), value)?;
            }
        }
        Ok(())
    }

    fn remove(&self, key: &str) {
        match &self.backend {
            Backend::Memory(map) => {
                if let Ok(mut map) = map.lock() {
                    map.remove(key);
                }
            }
            Backend::Dir(dir) => {
                let _ = fs::remove_file(dir.join(key));
            }
        }
    }

    /// Persist the token and the server-supplied user, overwriting any prior
    /// session.
    pub fn set_session(&self, token: &str, user: &User) -> anyhow::Result<()> {
        self.write(TOKEN_KEY, token)?;
        self.write(USER_KEY, &serde_json::to_string(user)?)?;
        Ok(())
    }

    pub fn token(&self) -> Option<String> {
        self.read(TOKEN_KEY)
    }

    /// The user object stored at login. Display-only.
    pub fn cached_user(&self) -> Option<User> {
        let raw = self.read(USER_KEY)?;
        serde_json::from_str(&raw).ok()
    }

    /// Purge token and cached user together.
    pub fn clear(&self) {
        self.remove(TOKEN_KEY);
        self.remove(USER_KEY);
    }

    /// Absent or undecodable token means unauthenticated. An expired token is
    /// treated as absent: the session is purged on the first check after
    /// expiry rather than by a timer.
    pub fn is_authenticated(&self) -> bool {
        let Some(token) = self.token() else {
            return false;
        };
        let Some(claims) = decode_claims(&token) else {
            return false;
        };
        if let Some(exp) = claims.exp {
            if exp < Utc::now().timestamp() {
                debug!("session token expired, purging session");
                self.clear();
                return false;
            }
        }
        true
    }

    /// Identity derived from the current token; permissions default to empty.
    pub fn current_user(&self) -> Option<TokenUser> {
        let token = self.token()?;
        decode_claims(&token).map(TokenUser::from)
    }

    pub fn user_role(&self) -> Option<String> {
        self.current_user().map(|u| u.role)
    }

    pub fn user_permissions(&self) -> Vec<String> {
        self.current_user().map(|u| u.permissions).unwrap_or_default()
    }
}
