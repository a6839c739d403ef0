//! Top navigation: section links, profile badge, logout.

use crate::api::BackOffice;
use crate::models::Admin;
use crate::stores::AuthStore;

const BRAND: &str = "Admin Panel";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Dashboard,
    Menu,
    Orders,
    Tables,
    Login,
}

impl Route {
    /// Routes shown as navigation links.
    pub const LINKS: [Route; 4] = [Route::Dashboard, Route::Menu, Route::Orders, Route::Tables];

    pub fn label(self) -> &'static str {
        match self {
            Route::Dashboard => "Dashboard",
            Route::Menu => "Menu",
            Route::Orders => "Orders",
            Route::Tables => "Tables",
            Route::Login => "Login",
        }
    }

    pub fn icon(self) -> &'static str {
        match self {
            Route::Dashboard => "📊",
            Route::Menu => "🍽️",
            Route::Orders => "📦",
            Route::Tables => "🪑",
            Route::Login => "🔑",
        }
    }

    pub fn path(self) -> &'static str {
        match self {
            Route::Dashboard => "/dashboard",
            Route::Menu => "/menu",
            Route::Orders => "/orders",
            Route::Tables => "/tables",
            Route::Login => "/login",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navbar {
    active: Route,
    profile_open: bool,
}

impl Navbar {
    pub fn new(active: Route) -> Self {
        Self {
            active,
            profile_open: false,
        }
    }

    pub fn active(&self) -> Route {
        self.active
    }

    pub fn is_active(&self, route: Route) -> bool {
        self.active == route
    }

    pub fn navigate(&mut self, route: Route) {
        self.active = route;
        self.profile_open = false;
    }

    pub fn toggle_profile(&mut self) {
        self.profile_open = !self.profile_open;
    }

    pub fn is_profile_open(&self) -> bool {
        self.profile_open
    }

    /// Log out through the auth store and land on the login screen.
    pub async fn logout<B: BackOffice>(&mut self, auth: &mut AuthStore<B>) -> Route {
        auth.logout().await;
        self.navigate(Route::Login);
        Route::Login
    }

    pub fn render(&self, admin: Option<&Admin>) -> String {
        let links: Vec<String> = Route::LINKS
            .into_iter()
            .map(|r| {
                let text = format!("{} {}", r.icon(), r.label());
                if self.is_active(r) {
                    format!("[{text}]")
                } else {
                    text
                }
            })
            .collect();

        let mut out = format!("🍽️ {BRAND}   {}", links.join("  "));
        if let Some(admin) = admin {
            out.push_str(&format!("   ({}) {}", admin.initial(), admin.name));
        }
        out.push('\n');

        if self.profile_open {
            if let Some(admin) = admin {
                out.push_str(&format!("  {}\n  {}\n", admin.name, admin.email));
            }
            out.push_str("  👤 Profile\n  ⚙️ Settings\n  🚪 Logout\n");
        }
        out
    }
}
