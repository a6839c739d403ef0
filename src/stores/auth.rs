//! Administrator session store.

use std::sync::Arc;
use tracing::{info, warn};

use crate::api::{AdminSession, BackOffice};
use crate::models::Admin;
use crate::session::SessionSnapshot;
use crate::stores::OpStatus;

pub struct AuthStore<B> {
    api: Arc<B>,
    admin: Option<Admin>,
    is_authenticated: bool,
    status: OpStatus,
}

impl<B: BackOffice> AuthStore<B> {
    pub fn new(api: Arc<B>) -> Self {
        Self::restore(api, SessionSnapshot::default())
    }

    /// Rebuild the store from a snapshot persisted by a previous run.
    pub fn restore(api: Arc<B>, snapshot: SessionSnapshot) -> Self {
        let is_authenticated = snapshot.is_authenticated && snapshot.admin.is_some();
        Self {
            api,
            admin: snapshot.admin.filter(|_| is_authenticated),
            is_authenticated,
            status: OpStatus::default(),
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            admin: self.admin.clone(),
            is_authenticated: self.is_authenticated,
        }
    }

    pub fn admin(&self) -> Option<&Admin> {
        self.admin.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.is_authenticated
    }

    pub fn is_loading(&self) -> bool {
        self.status.is_loading
    }

    pub fn error(&self) -> Option<&str> {
        self.status.error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.status.clear_error();
    }

    fn adopt(&mut self, session: AdminSession) -> AdminSession {
        self.admin = Some(session.admin.clone());
        self.is_authenticated = true;
        session
    }

    pub async fn register(
        &mut self,
        name: &str,
        email: &str,
        password: &str,
    ) -> Result<AdminSession, String> {
        self.status.begin();
        let result = self.api.register(name, email, password).await;
        let session = self.status.finish(result, "Registration failed")?;
        Ok(self.adopt(session))
    }

    pub async fn login(&mut self, email: &str, password: &str) -> Result<AdminSession, String> {
        self.status.begin();
        let result = self.api.login(email, password).await;
        let session = self.status.finish(result, "Login failed")?;
        info!(admin = %session.admin.email, "session started");
        Ok(self.adopt(session))
    }

    /// End the session. Local state is cleared whether or not the server
    /// acknowledged the logout.
    pub async fn logout(&mut self) {
        self.status.begin();
        if let Err(e) = self.api.logout().await {
            warn!(error = %e, "logout request failed, clearing local session anyway");
        }
        self.status.is_loading = false;
        self.admin = None;
        self.is_authenticated = false;
    }
}
