//! In-memory `BackOffice` used by store and view tests.

use chrono::{TimeZone, Utc};
use std::collections::HashMap;
use std::sync::Mutex;

use crate::api::{AdminSession, ApiError, ApiResult, BackOffice};
use crate::models::{
    Admin, Category, DiningTable, MenuItem, MenuItemForm, Order, OrderLine, OrderStatus,
    OrderType,
};

/// How the next calls should fail.
#[derive(Debug, Clone)]
pub(crate) enum Failure {
    /// Server answered with a message.
    Server(String),
    /// Connection never made it.
    Network,
}

impl Failure {
    fn to_error(&self) -> ApiError {
        match self {
            Failure::Server(message) => ApiError::Status {
                status: 400,
                message: message.clone(),
                from_server: true,
            },
            Failure::Network => ApiError::Network("Cannot reach back-office API".to_string()),
        }
    }
}

#[derive(Default)]
pub(crate) struct FakeBackOffice {
    pub menu: Mutex<Vec<MenuItem>>,
    pub orders: Mutex<Vec<Order>>,
    pub tables: Mutex<Vec<DiningTable>>,
    pub assets: Mutex<HashMap<String, Vec<u8>>>,
    pub admin: Mutex<Option<Admin>>,
    pub failure: Mutex<Option<Failure>>,
    pub calls: Mutex<Vec<String>>,
    next_id: Mutex<u32>,
}

impl FakeBackOffice {
    pub fn with_menu(items: Vec<MenuItem>) -> Self {
        let fake = Self::default();
        *fake.menu.lock().unwrap() = items;
        fake
    }

    pub fn with_orders(orders: Vec<Order>) -> Self {
        let fake = Self::default();
        *fake.orders.lock().unwrap() = orders;
        fake
    }

    pub fn with_tables(tables: Vec<DiningTable>) -> Self {
        let fake = Self::default();
        *fake.tables.lock().unwrap() = tables;
        fake
    }

    pub fn fail(&self, failure: Failure) {
        *self.failure.lock().unwrap() = Some(failure);
    }

    pub fn recover(&self) {
        *self.failure.lock().unwrap() = None;
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: &str) -> ApiResult<()> {
        self.calls.lock().unwrap().push(call.to_string());
        match self.failure.lock().unwrap().as_ref() {
            Some(f) => Err(f.to_error()),
            None => Ok(()),
        }
    }

    fn fresh_id(&self, prefix: &str) -> String {
        let mut n = self.next_id.lock().unwrap();
        *n += 1;
        format!("{prefix}-new-{n}")
    }

    fn item_from_form(id: String, form: &MenuItemForm) -> MenuItem {
        MenuItem {
            id,
            name: form.name.clone(),
            price: form.price.parse().unwrap_or(0.0),
            category: form.category,
            description: Some(form.description.clone()).filter(|d| !d.is_empty()),
            is_available: form.is_available,
            image_url: form
                .image
                .as_ref()
                .map(|img| format!("/uploads/{}", img.file_name)),
            unlisted_category: form.unlisted_category.clone(),
        }
    }
}

impl BackOffice for FakeBackOffice {
    async fn list_menu_items(&self) -> ApiResult<Vec<MenuItem>> {
        self.record("list_menu_items")?;
        Ok(self.menu.lock().unwrap().clone())
    }

    async fn create_menu_item(&self, form: &MenuItemForm) -> ApiResult<MenuItem> {
        self.record("create_menu_item")?;
        let item = Self::item_from_form(self.fresh_id("m"), form);
        self.menu.lock().unwrap().push(item.clone());
        Ok(item)
    }

    async fn update_menu_item(&self, id: &str, form: &MenuItemForm) -> ApiResult<MenuItem> {
        self.record(&format!("update_menu_item:{id}"))?;
        let mut menu = self.menu.lock().unwrap();
        let slot = menu.iter_mut().find(|m| m.id == id).ok_or(ApiError::Status {
            status: 404,
            message: "Menu item not found".into(),
            from_server: true,
        })?;
        let previous_image = slot.image_url.clone();
        let mut updated = Self::item_from_form(id.to_string(), form);
        if updated.image_url.is_none() && !form.remove_image {
            updated.image_url = previous_image;
        }
        *slot = updated.clone();
        Ok(updated)
    }

    async fn delete_menu_item(&self, id: &str) -> ApiResult<()> {
        self.record(&format!("delete_menu_item:{id}"))?;
        self.menu.lock().unwrap().retain(|m| m.id != id);
        Ok(())
    }

    async fn list_orders(&self) -> ApiResult<Vec<Order>> {
        self.record("list_orders")?;
        Ok(self.orders.lock().unwrap().clone())
    }

    async fn update_order_status(&self, id: &str, status: &OrderStatus) -> ApiResult<Order> {
        self.record(&format!("update_order_status:{id}:{}", status.as_str()))?;
        let mut orders = self.orders.lock().unwrap();
        let order = orders.iter_mut().find(|o| o.id == id).ok_or(ApiError::Status {
            status: 404,
            message: "Order not found".into(),
            from_server: true,
        })?;
        order.status = status.clone();
        Ok(order.clone())
    }

    async fn delete_order(&self, id: &str) -> ApiResult<()> {
        self.record(&format!("delete_order:{id}"))?;
        self.orders.lock().unwrap().retain(|o| o.id != id);
        Ok(())
    }

    async fn list_tables(&self) -> ApiResult<Vec<DiningTable>> {
        self.record("list_tables")?;
        Ok(self.tables.lock().unwrap().clone())
    }

    async fn create_table(&self, table_number: &str) -> ApiResult<DiningTable> {
        self.record(&format!("create_table:{table_number}"))?;
        let table = table(&self.fresh_id("t"), table_number);
        self.tables.lock().unwrap().push(table.clone());
        Ok(table)
    }

    async fn delete_table(&self, id: &str) -> ApiResult<()> {
        self.record(&format!("delete_table:{id}"))?;
        self.tables.lock().unwrap().retain(|t| t.id != id);
        Ok(())
    }

    async fn register(
        &self,
        name: &str,
        email: &str,
        _password: &str,
    ) -> ApiResult<AdminSession> {
        self.record("register")?;
        let admin = Admin {
            id: self.fresh_id("a"),
            name: name.to_string(),
            email: email.to_string(),
        };
        *self.admin.lock().unwrap() = Some(admin.clone());
        Ok(AdminSession { admin, token: None })
    }

    async fn login(&self, email: &str, _password: &str) -> ApiResult<AdminSession> {
        self.record("login")?;
        let admin = Admin {
            id: "a-1".to_string(),
            name: "Ravi".to_string(),
            email: email.to_string(),
        };
        *self.admin.lock().unwrap() = Some(admin.clone());
        Ok(AdminSession {
            admin,
            token: Some("token-1".to_string()),
        })
    }

    async fn logout(&self) -> ApiResult<()> {
        self.record("logout")?;
        *self.admin.lock().unwrap() = None;
        Ok(())
    }

    async fn fetch_asset(&self, url: &str) -> ApiResult<Vec<u8>> {
        self.record(&format!("fetch_asset:{url}"))?;
        self.assets
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or(ApiError::Status {
                status: 404,
                message: "Back-office endpoint not found".into(),
                from_server: false,
            })
    }
}

// ---------------------------------------------------------------------------
// Record builders
// ---------------------------------------------------------------------------

pub(crate) fn menu_item(id: &str, name: &str, price: f64, category: Category) -> MenuItem {
    MenuItem {
        id: id.to_string(),
        name: name.to_string(),
        price,
        category,
        description: None,
        is_available: true,
        image_url: None,
        unlisted_category: None,
    }
}

pub(crate) fn line(menu_item_id: &str, name: &str, quantity: u32, unit_price: f64) -> OrderLine {
    OrderLine {
        menu_item_id: Some(menu_item_id.to_string()),
        name: name.to_string(),
        quantity,
        unit_price,
    }
}

pub(crate) fn order(
    id: &str,
    order_type: OrderType,
    status: OrderStatus,
    customer: Option<&str>,
    items: Vec<OrderLine>,
) -> Order {
    let total_amount = items.iter().map(OrderLine::line_total).sum();
    Order {
        id: id.to_string(),
        order_type,
        table_number: match order_type {
            OrderType::DineIn => Some("4".to_string()),
            OrderType::HomeDelivery => None,
        },
        customer_name: customer.map(str::to_string),
        items,
        total_amount,
        status,
        created_at: Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
        delivery: None,
    }
}

pub(crate) fn table(id: &str, table_number: &str) -> DiningTable {
    DiningTable {
        id: id.to_string(),
        table_number: table_number.to_string(),
        qr_code_url: format!("/uploads/qr/{table_number}.png"),
        created_at: Utc.with_ymd_and_hms(2024, 6, 1, 9, 30, 0).unwrap(),
    }
}
