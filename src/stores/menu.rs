//! Menu catalogue store.

use std::sync::Arc;
use tracing::info;

use crate::api::BackOffice;
use crate::models::{CategoryFilter, MenuItem, MenuItemForm};
use crate::stores::OpStatus;

pub struct MenuStore<B> {
    api: Arc<B>,
    items: Vec<MenuItem>,
    status: OpStatus,
    selected_category: CategoryFilter,
    search_term: String,
}

impl<B: BackOffice> MenuStore<B> {
    pub fn new(api: Arc<B>) -> Self {
        Self {
            api,
            items: Vec::new(),
            status: OpStatus::default(),
            selected_category: CategoryFilter::All,
            search_term: String::new(),
        }
    }

    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    pub fn find(&self, id: &str) -> Option<&MenuItem> {
        self.items.iter().find(|m| m.id == id)
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

    pub fn selected_category(&self) -> CategoryFilter {
        self.selected_category
    }

    pub fn set_selected_category(&mut self, filter: CategoryFilter) {
        self.selected_category = filter;
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
    }

    /// Items matching the search term (case-insensitive substring of the
    /// name) and the selected category.
    pub fn filtered_items(&self) -> Vec<&MenuItem> {
        let needle = self.search_term.to_lowercase();
        self.items
            .iter()
            .filter(|item| item.name.to_lowercase().contains(&needle))
            .filter(|item| self.selected_category.matches(item.category))
            .collect()
    }

    pub async fn fetch_items(&mut self) -> Result<(), String> {
        self.status.begin();
        let result = self.api.list_menu_items().await;
        let items = self.status.finish(result, "Failed to fetch menu items")?;
        info!(count = items.len(), "menu loaded");
        self.items = items;
        Ok(())
    }

    pub async fn add_item(&mut self, form: &MenuItemForm) -> Result<MenuItem, String> {
        self.status.begin();
        let result = self.api.create_menu_item(form).await;
        let item = self.status.finish(result, "Failed to add menu item")?;
        self.items.push(item.clone());
        Ok(item)
    }

    pub async fn update_item(&mut self, id: &str, form: &MenuItemForm) -> Result<MenuItem, String> {
        self.status.begin();
        let result = self.api.update_menu_item(id, form).await;
        let item = self.status.finish(result, "Failed to update menu item")?;
        match self.items.iter_mut().find(|m| m.id == id) {
            Some(slot) => *slot = item.clone(),
            None => self.items.push(item.clone()),
        }
        Ok(item)
    }

    pub async fn delete_item(&mut self, id: &str) -> Result<(), String> {
        self.status.begin();
        let result = self.api.delete_menu_item(id).await;
        self.status.finish(result, "Failed to delete menu item")?;
        self.items.retain(|m| m.id != id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Category;
    use crate::testing::{menu_item, Failure, FakeBackOffice};

    fn sample_menu() -> Vec<MenuItem> {
        vec![
            menu_item("m1", "Paneer Tikka", 220.0, Category::Starters),
            menu_item("m2", "Butter Chicken", 340.0, Category::MainCourse),
            menu_item("m3", "Masala Chai", 40.0, Category::Drinks),
            menu_item("m4", "Chicken Soup", 150.0, Category::Starters),
        ]
    }

    fn form(name: &str, price: &str, category: Category) -> MenuItemForm {
        MenuItemForm {
            name: name.into(),
            price: price.into(),
            description: String::new(),
            category,
            unlisted_category: None,
            is_available: true,
            image: None,
            remove_image: false,
        }
    }

    async fn loaded_store() -> (Arc<FakeBackOffice>, MenuStore<FakeBackOffice>) {
        let api = Arc::new(FakeBackOffice::with_menu(sample_menu()));
        let mut store = MenuStore::new(api.clone());
        store.fetch_items().await.expect("fetch");
        (api, store)
    }

    #[tokio::test]
    async fn fetch_replaces_collection() {
        let (_, store) = loaded_store().await;
        assert_eq!(store.items().len(), 4);
        assert!(!store.is_loading());
        assert_eq!(store.error(), None);
    }

    #[tokio::test]
    async fn filtered_items_combines_search_and_category() {
        let (_, mut store) = loaded_store().await;

        store.set_search_term("CHICKEN");
        let names: Vec<_> = store.filtered_items().iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["Butter Chicken", "Chicken Soup"]);

        store.set_selected_category(CategoryFilter::Only(Category::Starters));
        let names: Vec<_> = store.filtered_items().iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["Chicken Soup"]);

        store.set_search_term("");
        assert_eq!(store.filtered_items().len(), 2);

        store.set_selected_category(CategoryFilter::All);
        assert_eq!(store.filtered_items().len(), 4);
    }

    #[tokio::test]
    async fn filtered_items_follow_collection_changes() {
        let (_, mut store) = loaded_store().await;
        store.set_selected_category(CategoryFilter::Only(Category::Drinks));
        assert_eq!(store.filtered_items().len(), 1);

        store
            .add_item(&form("Lassi", "60.00", Category::Drinks))
            .await
            .expect("add");
        assert_eq!(store.filtered_items().len(), 2);
    }

    #[tokio::test]
    async fn add_appends_server_record() {
        let (api, mut store) = loaded_store().await;
        let item = store
            .add_item(&form("Gulab Jamun", "90.00", Category::Desserts))
            .await
            .expect("add");
        assert_eq!(store.items().len(), 5);
        assert_eq!(store.items().last(), Some(&item));
        assert_eq!(item.price, 90.0);
        assert!(api.calls().contains(&"create_menu_item".to_string()));
    }

    #[tokio::test]
    async fn update_replaces_by_id() {
        let (_, mut store) = loaded_store().await;
        store
            .update_item("m3", &form("Ginger Chai", "45.00", Category::Drinks))
            .await
            .expect("update");
        assert_eq!(store.items().len(), 4);
        let chai = store.find("m3").expect("still present");
        assert_eq!(chai.name, "Ginger Chai");
        assert_eq!(chai.price, 45.0);
    }

    #[tokio::test]
    async fn failed_update_leaves_collection_unchanged() {
        let (api, mut store) = loaded_store().await;
        let before = store.items().to_vec();
        api.fail(Failure::Server("Menu item name already exists".into()));

        let err = store
            .update_item("m1", &form("Butter Chicken", "220.00", Category::Starters))
            .await
            .expect_err("update should fail");

        assert_eq!(err, "Menu item name already exists");
        assert_eq!(store.items(), before.as_slice());
        assert_eq!(store.error(), Some("Menu item name already exists"));
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn network_failure_uses_generic_message() {
        let (api, mut store) = loaded_store().await;
        api.fail(Failure::Network);
        let err = store.delete_item("m2").await.expect_err("delete should fail");
        assert_eq!(err, "Failed to delete menu item");
        assert_eq!(store.items().len(), 4);
    }

    #[tokio::test]
    async fn next_operation_clears_previous_error() {
        let (api, mut store) = loaded_store().await;
        api.fail(Failure::Network);
        let _ = store.fetch_items().await;
        assert_eq!(store.error(), Some("Failed to fetch menu items"));

        api.recover();
        store.delete_item("m2").await.expect("delete");
        assert_eq!(store.error(), None);
        assert!(store.find("m2").is_none());
    }

    #[tokio::test]
    async fn clear_error_resets_banner() {
        let (api, mut store) = loaded_store().await;
        api.fail(Failure::Network);
        let _ = store.add_item(&form("X", "1.00", Category::Others)).await;
        assert!(store.error().is_some());
        store.clear_error();
        assert_eq!(store.error(), None);
    }
}
