//! State containers that own one remote collection each.
//!
//! Every mutating operation follows the same protocol: mark busy and clear
//! the previous error, call the API, merge the server's record on success or
//! keep the collection untouched on failure, then clear busy.

pub mod auth;
pub mod menu;

pub use auth::AuthStore;
pub use menu::MenuStore;

use crate::api::ApiError;

/// Busy flag plus last error, shared by all stores.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct OpStatus {
    pub is_loading: bool,
    pub error: Option<String>,
}

impl OpStatus {
    pub(crate) fn begin(&mut self) {
        self.is_loading = true;
        self.error = None;
    }

    /// Close an operation. Errors are turned into the message shown to the
    /// user and stored.
    pub(crate) fn finish<T>(
        &mut self,
        result: Result<T, ApiError>,
        fallback: &str,
    ) -> Result<T, String> {
        self.is_loading = false;
        result.map_err(|e| {
            let message = e.user_message(fallback);
            tracing::warn!(error = %e, "{}", fallback);
            self.error = Some(message.clone());
            message
        })
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }
}
