use anyhow::{anyhow, Context as _};
use chrono::Utc;

use crate::cli::OrdersCommand;
use crate::commands::Context;
use crate::views::navbar::Route;
use crate::views::orders::OrdersView;

pub async fn run(ctx: &mut Context, action: Option<OrdersCommand>) -> anyhow::Result<()> {
    ctx.require_login()?;
    let mut view = OrdersView::new(ctx.api.clone());

    match action.unwrap_or(OrdersCommand::List {
        status: None,
        order_type: None,
        expand: None,
    }) {
        OrdersCommand::List {
            status,
            order_type,
            expand,
        } => {
            let result = view.load().await;
            view.set_status_filter(status);
            view.set_type_filter(order_type);
            if let Some(id) = expand {
                view.toggle_expanded(&id);
            }
            println!("{}", ctx.navbar(Route::Orders));
            print!("{}", view.render(Utc::now()));
            result.map_err(|e| anyhow!(e))
        }

        OrdersCommand::Status { id, status } => {
            view.load()
                .await
                .map_err(|e| anyhow!(e))
                .context("loading orders")?;
            view.update_status(&id, status, &mut ctx.prompt)
                .await
                .map_err(|e| anyhow!(e))
        }

        OrdersCommand::Delete { id } => {
            view.delete(&id, &mut ctx.prompt)
                .await
                .map(|_| ())
                .map_err(|e| anyhow!(e))
        }
    }
}
