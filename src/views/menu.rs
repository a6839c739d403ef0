//! Menu management screen.

use std::sync::Arc;

use crate::api::BackOffice;
use crate::format::format_price;
use crate::models::{CategoryFilter, MenuItem};
use crate::stores::MenuStore;
use crate::views::menu_modal::MenuItemModal;
use crate::views::{Notice, Prompt};

pub struct MenuView<B> {
    pub store: MenuStore<B>,
    pub modal: MenuItemModal,
    /// Item waiting for the second click of a two-step delete.
    delete_confirm: Option<String>,
}

impl<B: BackOffice> MenuView<B> {
    pub fn new(api: Arc<B>) -> Self {
        Self {
            store: MenuStore::new(api),
            modal: MenuItemModal::default(),
            delete_confirm: None,
        }
    }

    pub async fn load(&mut self) -> Result<(), String> {
        self.store.fetch_items().await
    }

    pub fn open_create(&mut self) {
        self.modal.open(None);
    }

    pub fn open_edit(&mut self, id: &str) -> Result<(), String> {
        let item = self
            .store
            .find(id)
            .cloned()
            .ok_or_else(|| format!("No menu item with id {id}"))?;
        self.modal.open(Some(&item));
        Ok(())
    }

    pub async fn submit_modal(&mut self) -> Result<MenuItem, String> {
        self.modal.submit(&mut self.store).await
    }

    pub fn pending_delete(&self) -> Option<&str> {
        self.delete_confirm.as_deref()
    }

    /// First step: mark the item. Nothing is sent yet.
    pub fn request_delete(&mut self, id: &str) {
        self.delete_confirm = Some(id.to_string());
    }

    pub fn cancel_delete(&mut self) {
        self.delete_confirm = None;
    }

    /// Second step: delete the marked item. The mark is kept on failure so
    /// the operator can retry.
    pub async fn confirm_delete(&mut self) -> Result<(), String> {
        let Some(id) = self.delete_confirm.clone() else {
            return Err("No menu item selected for deletion".to_string());
        };
        self.store.delete_item(&id).await?;
        self.delete_confirm = None;
        Ok(())
    }

    /// Both delete steps, with the operator's confirmation in between.
    pub async fn delete(&mut self, id: &str, prompt: &mut impl Prompt) -> Result<bool, String> {
        let name = self
            .store
            .find(id)
            .map(|m| m.name.clone())
            .ok_or_else(|| format!("No menu item with id {id}"))?;
        self.request_delete(id);
        if !prompt.confirm(&format!("Delete \"{name}\"? This cannot be undone.")) {
            self.cancel_delete();
            return Ok(false);
        }
        match self.confirm_delete().await {
            Ok(()) => {
                prompt.notify(Notice::success(format!("{name} deleted")));
                Ok(true)
            }
            Err(message) => {
                prompt.notify(Notice::error(message.clone()));
                Err(message)
            }
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::from("Menu Management 🍽️\n");
        out.push_str("Manage your restaurant menu items\n\n");

        if let Some(err) = self.store.error() {
            out.push_str(&format!("[error] {err}\n\n"));
        }

        let tabs: Vec<String> = CategoryFilter::options()
            .into_iter()
            .map(|f| {
                if f == self.store.selected_category() {
                    format!("[{}]", f.label())
                } else {
                    f.label().to_string()
                }
            })
            .collect();
        out.push_str(&tabs.join("  "));
        out.push('\n');
        if !self.store.search_term().is_empty() {
            out.push_str(&format!("Search: \"{}\"\n", self.store.search_term()));
        }
        out.push('\n');

        if self.store.is_loading() {
            out.push_str("Loading menu items...\n");
            return out;
        }

        let items = self.store.filtered_items();
        if items.is_empty() {
            out.push_str("No menu items found\n");
            return out;
        }

        for item in items {
            out.push_str(&render_item(item));
        }
        out
    }
}

fn render_item(item: &MenuItem) -> String {
    let badge = if item.is_available {
        "Available"
    } else {
        "Unavailable"
    };
    let mut out = format!(
        "{:<28} {:>10}  {:<12} {}\n",
        item.name,
        format_price(item.price),
        item.category.as_str(),
        badge
    );
    if let Some(desc) = &item.description {
        out.push_str(&format!("    {desc}\n"));
    }
    out.push_str(&format!("    id: {}\n", item.id));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;
    use crate::testing::{menu_item, Failure, FakeBackOffice};
    use crate::views::test_prompt::ScriptedPrompt;

    async fn loaded_view() -> (Arc<FakeBackOffice>, MenuView<FakeBackOffice>) {
        let api = Arc::new(FakeBackOffice::with_menu(vec![
            menu_item("m1", "Paneer Tikka", 220.0, Category::Starters),
            menu_item("m2", "Masala Chai", 40.0, Category::Drinks),
        ]));
        let mut view = MenuView::new(api.clone());
        view.load().await.expect("load");
        (api, view)
    }

    #[tokio::test]
    async fn declined_delete_sends_nothing() {
        let (api, mut view) = loaded_view().await;
        let mut prompt = ScriptedPrompt::answering(false);
        let deleted = view.delete("m1", &mut prompt).await.expect("no error");
        assert!(!deleted);
        assert_eq!(view.pending_delete(), None);
        assert!(!api.calls().iter().any(|c| c.starts_with("delete_menu_item")));
        assert_eq!(view.store.items().len(), 2);
    }

    #[tokio::test]
    async fn confirmed_delete_removes_item() {
        let (_, mut view) = loaded_view().await;
        let mut prompt = ScriptedPrompt::answering(true);
        assert!(view.delete("m2", &mut prompt).await.expect("delete"));
        assert!(view.store.find("m2").is_none());
        assert_eq!(prompt.notices, [Notice::success("Masala Chai deleted")]);
    }

    #[tokio::test]
    async fn failed_delete_keeps_mark_for_retry() {
        let (api, mut view) = loaded_view().await;
        view.request_delete("m1");
        api.fail(Failure::Network);
        let err = view.confirm_delete().await.expect_err("should fail");
        assert_eq!(err, "Failed to delete menu item");
        assert_eq!(view.pending_delete(), Some("m1"));

        api.recover();
        view.confirm_delete().await.expect("retry");
        assert_eq!(view.pending_delete(), None);
    }

    #[tokio::test]
    async fn render_shows_banner_and_empty_state() {
        let (api, mut view) = loaded_view().await;
        view.store.set_search_term("biryani");
        assert!(view.render().contains("No menu items found"));

        api.fail(Failure::Network);
        let _ = view.load().await;
        let text = view.render();
        assert!(text.contains("[error] Failed to fetch menu items"));
        assert!(text.contains("[All]"));
    }

    #[tokio::test]
    async fn render_lists_prices_in_rupees() {
        let (_, view) = loaded_view().await;
        let text = view.render();
        assert!(text.contains("₹220.00"));
        assert!(!text.contains("Unavailable"));
    }

    #[tokio::test]
    async fn open_edit_rejects_unknown_id() {
        let (_, mut view) = loaded_view().await;
        assert!(view.open_edit("nope").is_err());
        view.open_edit("m1").expect("known id");
        assert!(view.modal.is_open());
    }
}
