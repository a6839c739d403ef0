use anyhow::{anyhow, Context as _};

use crate::cli::MenuCommand;
use crate::commands::Context;
use crate::format::format_price;
use crate::views::menu::MenuView;
use crate::views::navbar::Route;
use crate::views::{Notice, Prompt};

pub async fn run(ctx: &mut Context, action: Option<MenuCommand>) -> anyhow::Result<()> {
    ctx.require_login()?;
    let mut view = MenuView::new(ctx.api.clone());

    match action.unwrap_or(MenuCommand::List {
        category: None,
        search: None,
    }) {
        MenuCommand::List { category, search } => {
            let result = view.load().await;
            if let Some(filter) = category {
                view.store.set_selected_category(filter);
            }
            if let Some(term) = search {
                view.store.set_search_term(term);
            }
            println!("{}", ctx.navbar(Route::Menu));
            print!("{}", view.render());
            result.map_err(|e| anyhow!(e))
        }

        MenuCommand::Add {
            name,
            price,
            category,
            description,
            unavailable,
            image,
        } => {
            view.open_create();
            view.modal.name = name;
            view.modal.price = price;
            view.modal.category = Some(category);
            view.modal.description = description;
            view.modal.is_available = !unavailable;
            if let Some(path) = image {
                view.modal.attach_image_path(&path)?;
            }
            let item = view.submit_modal().await.map_err(|e| anyhow!(e))?;
            ctx.prompt.notify(Notice::success(format!(
                "Added {} ({}) with id {}",
                item.name,
                format_price(item.price),
                item.id
            )));
            Ok(())
        }

        MenuCommand::Edit {
            id,
            name,
            price,
            category,
            description,
            available,
            image,
            remove_image,
        } => {
            view.load()
                .await
                .map_err(|e| anyhow!(e))
                .context("loading menu")?;
            view.open_edit(&id).map_err(|e| anyhow!(e))?;
            if let Some(name) = name {
                view.modal.name = name;
            }
            if let Some(price) = price {
                view.modal.price = price;
            }
            if let Some(category) = category {
                view.modal.category = Some(category);
            }
            if let Some(description) = description {
                view.modal.description = description;
            }
            if let Some(available) = available {
                view.modal.is_available = available;
            }
            if let Some(path) = image {
                view.modal.attach_image_path(&path)?;
            } else if remove_image {
                view.modal.remove_image();
            }
            let item = view.submit_modal().await.map_err(|e| anyhow!(e))?;
            ctx.prompt
                .notify(Notice::success(format!("Updated {} ({})", item.name, item.id)));
            Ok(())
        }

        MenuCommand::Delete { id } => {
            view.load()
                .await
                .map_err(|e| anyhow!(e))
                .context("loading menu")?;
            view.delete(&id, &mut ctx.prompt)
                .await
                .map_err(|e| anyhow!(e))?;
            Ok(())
        }
    }
}
