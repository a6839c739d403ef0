//! Signed-in admin, persisted between runs.
//!
//! Loaded once at start-up and written back once at shutdown. Only the
//! admin's identity and the session flag are stored; never credentials.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::db::{self, DbState};
use crate::models::Admin;

const SESSION_CATEGORY: &str = "auth";
const SESSION_KEY: &str = "admin-auth";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub admin: Option<Admin>,
    pub is_authenticated: bool,
}

impl SessionSnapshot {
    /// A flag without an admin record is treated as logged out.
    fn sanitized(self) -> Self {
        if self.admin.is_none() {
            return SessionSnapshot::default();
        }
        self
    }
}

/// Read the stored snapshot. Missing or unreadable data means logged out.
pub fn load(db: &DbState) -> SessionSnapshot {
    let conn = match db.conn.lock() {
        Ok(c) => c,
        Err(e) => {
            warn!("session load: db lock failed: {e}");
            return SessionSnapshot::default();
        }
    };
    let Some(raw) = db::get_setting(&conn, SESSION_CATEGORY, SESSION_KEY) else {
        return SessionSnapshot::default();
    };
    match serde_json::from_str::<SessionSnapshot>(&raw) {
        Ok(snapshot) => snapshot.sanitized(),
        Err(e) => {
            warn!("session load: discarding unreadable snapshot: {e}");
            SessionSnapshot::default()
        }
    }
}

pub fn save(db: &DbState, snapshot: &SessionSnapshot) -> Result<(), String> {
    let conn = db.conn.lock().map_err(|e| e.to_string())?;
    if !snapshot.is_authenticated && snapshot.admin.is_none() {
        return db::delete_setting(&conn, SESSION_CATEGORY, SESSION_KEY);
    }
    let raw = serde_json::to_string(snapshot).map_err(|e| format!("session encode: {e}"))?;
    db::set_setting(&conn, SESSION_CATEGORY, SESSION_KEY, &raw)
}
