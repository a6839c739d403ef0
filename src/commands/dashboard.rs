use anyhow::anyhow;
use chrono::Utc;

use crate::commands::Context;
use crate::views::dashboard::DashboardView;
use crate::views::navbar::Route;

pub async fn show(ctx: &mut Context) -> anyhow::Result<()> {
    ctx.require_login()?;
    let mut view = DashboardView::new(ctx.api.clone());
    let result = view.load().await.map(|_| ());
    println!("{}", ctx.navbar(Route::Dashboard));
    print!("{}", view.render(ctx.auth.admin(), Utc::now()));
    result.map_err(|e| anyhow!(e))
}
