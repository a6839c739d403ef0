use anyhow::anyhow;

use crate::commands::{read_password, Context};
use crate::views::navbar::{Navbar, Route};
use crate::views::{Notice, Prompt};

pub async fn register(
    ctx: &mut Context,
    name: &str,
    email: &str,
    password: Option<String>,
) -> anyhow::Result<()> {
    let password = read_password(password)?;
    let session = ctx
        .auth
        .register(name.trim(), email.trim(), &password)
        .await
        .map_err(|e| anyhow!(e))?;
    ctx.prompt.notify(Notice::success(format!(
        "Welcome, {}! Your administrator account is ready.",
        session.admin.name
    )));
    Ok(())
}

pub async fn login(ctx: &mut Context, email: &str, password: Option<String>) -> anyhow::Result<()> {
    let password = read_password(password)?;
    let session = ctx
        .auth
        .login(email.trim(), &password)
        .await
        .map_err(|e| anyhow!(e))?;
    ctx.prompt.notify(Notice::success(format!(
        "Logged in as {} <{}>",
        session.admin.name, session.admin.email
    )));
    Ok(())
}

pub async fn logout(ctx: &mut Context) -> anyhow::Result<()> {
    let mut navbar = Navbar::new(Route::Dashboard);
    navbar.logout(&mut ctx.auth).await;
    ctx.prompt.notify(Notice::success("Logged out"));
    Ok(())
}

pub fn whoami(ctx: &Context) -> anyhow::Result<()> {
    let admin = ctx.require_login()?;
    println!("{} <{}>", admin.name, admin.email);
    println!("id:  {}", admin.id);
    println!("api: {}", ctx.api.base_url());
    println!("db:  {}", ctx.db.db_path.display());
    println!("log: {}", ctx.config.log_dir().display());
    Ok(())
}

pub fn version() {
    println!(
        "dinedesk {} ({} built {})",
        env!("CARGO_PKG_VERSION"),
        env!("BUILD_GIT_SHA"),
        env!("BUILD_TIMESTAMP")
    );
}
