//! Command handlers behind the CLI subcommands.
//!
//! Each run opens a [`Context`]: the local database, the persisted session
//! and an API client seeded with the stored token. [`Context::close`] writes
//! the session back so the next run starts where this one ended.

pub mod auth;
pub mod dashboard;
pub mod menu;
pub mod orders;
pub mod tables;

use anyhow::{bail, Context as _};
use std::io::{self, BufRead, Write};
use std::sync::Arc;
use tracing::{debug, warn};
use zeroize::Zeroizing;

use crate::api::ApiClient;
use crate::config::Config;
use crate::db::{self, DbState};
use crate::models::Admin;
use crate::session;
use crate::storage;
use crate::stores::AuthStore;
use crate::views::navbar::{Navbar, Route};
use crate::views::{Notice, NoticeLevel, Prompt};

pub struct Context {
    pub config: Config,
    pub db: DbState,
    pub api: Arc<ApiClient>,
    pub auth: AuthStore<ApiClient>,
    pub prompt: TerminalPrompt,
    initial_token: Option<String>,
}

impl Context {
    pub fn open(config: Config, assume_yes: bool) -> anyhow::Result<Self> {
        let db = db::init(&config.data_dir)
            .map_err(anyhow::Error::msg)
            .with_context(|| format!("opening local database in {}", config.data_dir.display()))?;

        let snapshot = session::load(&db);
        let token = storage::load_token().map(|t| t.as_str().to_string());
        debug!(
            authenticated = snapshot.is_authenticated,
            has_token = token.is_some(),
            "session restored"
        );

        let api = Arc::new(ApiClient::new(&config.api_url)?.with_token(token.clone()));
        let auth = AuthStore::restore(api.clone(), snapshot);
        Ok(Self {
            config,
            db,
            api,
            auth,
            prompt: TerminalPrompt { assume_yes },
            initial_token: token,
        })
    }

    /// The signed-in admin, or an error telling the operator to log in.
    pub fn require_login(&self) -> anyhow::Result<&Admin> {
        match self.auth.admin() {
            Some(admin) if self.auth.is_authenticated() => Ok(admin),
            _ => bail!("Not logged in. Run `dinedesk login --email <email>` first."),
        }
    }

    pub fn navbar(&self, route: Route) -> String {
        Navbar::new(route).render(self.auth.admin())
    }

    /// Persist the session snapshot and, when it changed, the bearer token.
    pub fn close(self) -> anyhow::Result<()> {
        session::save(&self.db, &self.auth.snapshot())
            .map_err(anyhow::Error::msg)
            .context("saving session")?;

        let token = self.api.token();
        if token != self.initial_token {
            if let Err(e) = storage::save_token(token.as_deref()) {
                warn!(error = %e, "could not update the stored API token");
            }
        }
        Ok(())
    }
}

/// Confirmations on stdin, notices on stdout/stderr.
pub struct TerminalPrompt {
    assume_yes: bool,
}

impl Prompt for TerminalPrompt {
    fn confirm(&mut self, question: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        eprint!("{question} [y/N] ");
        let _ = io::stderr().flush();
        let mut answer = String::new();
        if io::stdin().lock().read_line(&mut answer).is_err() {
            return false;
        }
        matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    }

    fn notify(&mut self, notice: Notice) {
        match notice.level {
            NoticeLevel::Success => println!("{notice}"),
            NoticeLevel::Error => eprintln!("{notice}"),
        }
    }
}

/// Read a secret from stdin when it was not passed on the command line.
pub(crate) fn read_password(given: Option<String>) -> anyhow::Result<Zeroizing<String>> {
    if let Some(password) = given {
        return Ok(Zeroizing::new(password));
    }
    eprint!("Password: ");
    io::stderr().flush().ok();
    let mut line = Zeroizing::new(String::new());
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("reading password")?;
    let password = Zeroizing::new(line.trim_end_matches(['\r', '\n']).to_string());
    if password.is_empty() {
        bail!("Password is required");
    }
    Ok(password)
}
