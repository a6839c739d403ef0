//! Dashboard figures derived from the live order and menu collections.

use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::warn;

use crate::api::BackOffice;
use crate::format::{format_price, format_relative_time, status_label};
use crate::models::{Admin, MenuItem, Order, OrderType};

const POPULAR_LIMIT: usize = 5;
const RECENT_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq)]
pub struct PopularItem {
    pub name: String,
    pub count: u32,
    pub revenue: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DashboardMetrics {
    pub total_orders: usize,
    pub menu_items: usize,
    pub available_items: usize,
    pub revenue: f64,
    pub customers: usize,
    pub dine_in_orders: usize,
    pub delivery_orders: usize,
    /// Pending or preparing.
    pub active_orders: usize,
    /// Completed or delivered.
    pub finished_orders: usize,
    pub popular_items: Vec<PopularItem>,
    pub recent_orders: Vec<Order>,
}

impl DashboardMetrics {
    pub fn compute(orders: &[Order], menu: &[MenuItem]) -> Self {
        // Anonymous orders all count as the single customer "Guest".
        let customers: HashSet<&str> = orders.iter().map(Order::customer_display).collect();

        Self {
            total_orders: orders.len(),
            menu_items: menu.len(),
            available_items: menu.iter().filter(|m| m.is_available).count(),
            revenue: orders.iter().map(|o| o.total_amount).sum(),
            customers: customers.len(),
            dine_in_orders: orders
                .iter()
                .filter(|o| o.order_type == OrderType::DineIn)
                .count(),
            delivery_orders: orders
                .iter()
                .filter(|o| o.order_type == OrderType::HomeDelivery)
                .count(),
            active_orders: orders.iter().filter(|o| o.status.is_active()).count(),
            finished_orders: orders.iter().filter(|o| o.status.is_finished()).count(),
            popular_items: popular_items(orders),
            recent_orders: recent_orders(orders),
        }
    }
}

/// Per-item quantity and revenue over all orders, highest quantity first.
/// Ties keep the order in which items were first seen.
pub fn popular_items(orders: &[Order]) -> Vec<PopularItem> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut items: Vec<PopularItem> = Vec::new();

    for line in orders.iter().flat_map(|o| o.items.iter()) {
        let slot = *index.entry(line.item_key()).or_insert_with(|| {
            items.push(PopularItem {
                name: line.name.clone(),
                count: 0,
                revenue: 0.0,
            });
            items.len() - 1
        });
        items[slot].count += line.quantity;
        items[slot].revenue += line.line_total();
    }

    items.sort_by(|a, b| b.count.cmp(&a.count));
    items.truncate(POPULAR_LIMIT);
    items
}

/// The newest orders by creation time.
pub fn recent_orders(orders: &[Order]) -> Vec<Order> {
    let mut sorted = orders.to_vec();
    sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    sorted.truncate(RECENT_LIMIT);
    sorted
}

pub struct DashboardView<B> {
    api: Arc<B>,
    metrics: Option<DashboardMetrics>,
    error: Option<String>,
}

impl<B: BackOffice> DashboardView<B> {
    pub fn new(api: Arc<B>) -> Self {
        Self {
            api,
            metrics: None,
            error: None,
        }
    }

    pub fn metrics(&self) -> Option<&DashboardMetrics> {
        self.metrics.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Fetch orders and menu together, then recompute every figure.
    pub async fn load(&mut self) -> Result<&DashboardMetrics, String> {
        self.error = None;
        let (orders, menu) = tokio::join!(self.api.list_orders(), self.api.list_menu_items());
        let fetched = orders
            .map_err(|e| e.user_message("Failed to fetch orders"))
            .and_then(|o| {
                menu.map(|m| (o, m))
                    .map_err(|e| e.user_message("Failed to fetch menu items"))
            });
        match fetched {
            Ok((orders, menu)) => Ok(&*self
                .metrics
                .insert(DashboardMetrics::compute(&orders, &menu))),
            Err(message) => {
                warn!(error = %message, "dashboard load failed");
                self.error = Some(message.clone());
                Err(message)
            }
        }
    }

    pub fn render(&self, admin: Option<&Admin>, now: DateTime<Utc>) -> String {
        let name = admin.map(|a| a.name.as_str()).unwrap_or("Admin");
        let mut out = format!(
            "Welcome back, {name}! 👋\nHere's what's happening with your restaurant today.\n\n"
        );

        if let Some(err) = &self.error {
            out.push_str(&format!("[error] {err}\n"));
            return out;
        }
        let Some(m) = &self.metrics else {
            out.push_str("Loading dashboard...\n");
            return out;
        };

        out.push_str(&format!(
            "📦 Total Orders: {}   🍽️ Menu Items: {} ({} available)   💰 Revenue: {}   👥 Customers: {}\n",
            m.total_orders,
            m.menu_items,
            m.available_items,
            format_price(m.revenue),
            m.customers
        ));
        out.push_str(&format!(
            "Dine-in: {}   Delivery: {}   Active: {}   Finished: {}\n\n",
            m.dine_in_orders, m.delivery_orders, m.active_orders, m.finished_orders
        ));

        out.push_str("📦 Recent Orders\n");
        if m.recent_orders.is_empty() {
            out.push_str("  No orders yet\n");
        }
        for order in &m.recent_orders {
            out.push_str(&format!(
                "  #{} {:<16} {:<12} {:>10}  {}\n",
                order.id,
                order.customer_display(),
                status_label(&order.status),
                format_price(order.total_amount),
                format_relative_time(order.created_at, now)
            ));
        }

        out.push_str("\n🔥 Popular Items\n");
        if m.popular_items.is_empty() {
            out.push_str("  No sales yet\n");
        }
        for item in &m.popular_items {
            out.push_str(&format!(
                "  {:<24} {:>4} sold  {:>10}\n",
                item.name,
                item.count,
                format_price(item.revenue)
            ));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, OrderStatus};
    use crate::testing::{line, menu_item, order, Failure, FakeBackOffice};
    use chrono::Duration;

    #[test]
    fn popular_items_sum_quantities_and_rank() {
        let orders = vec![
            order(
                "o1",
                OrderType::DineIn,
                OrderStatus::Completed,
                None,
                vec![line("a", "Dosa", 2, 80.0)],
            ),
            order(
                "o2",
                OrderType::DineIn,
                OrderStatus::Completed,
                None,
                vec![line("b", "Idli", 5, 50.0)],
            ),
            order(
                "o3",
                OrderType::DineIn,
                OrderStatus::Completed,
                None,
                vec![line("a", "Dosa", 1, 80.0)],
            ),
        ];
        let popular = popular_items(&orders);
        assert_eq!(popular[0].name, "Idli");
        assert_eq!(popular[0].count, 5);
        assert_eq!(popular[1].name, "Dosa");
        assert_eq!(popular[1].count, 3);
        assert_eq!(popular[1].revenue, 240.0);
    }

    #[test]
    fn ties_keep_first_seen_order_and_cap_at_five() {
        let lines: Vec<_> = ["p", "q", "r", "s", "t", "u"]
            .iter()
            .map(|id| line(id, &id.to_uppercase(), 1, 10.0))
            .collect();
        let orders = vec![order("o1", OrderType::DineIn, OrderStatus::Pending, None, lines)];
        let names: Vec<_> = popular_items(&orders).into_iter().map(|p| p.name).collect();
        assert_eq!(names, ["P", "Q", "R", "S", "T"]);
    }

    #[test]
    fn metrics_group_statuses_and_customers() {
        let orders = vec![
            order("o1", OrderType::DineIn, OrderStatus::Pending, Some("Asha"), vec![line("a", "Dosa", 1, 80.0)]),
            order("o2", OrderType::HomeDelivery, OrderStatus::Delivered, Some("Asha"), vec![line("a", "Dosa", 2, 80.0)]),
            order("o3", OrderType::DineIn, OrderStatus::Served, None, vec![line("b", "Idli", 1, 50.0)]),
            order("o4", OrderType::HomeDelivery, OrderStatus::Preparing, None, vec![]),
            order("o5", OrderType::DineIn, OrderStatus::Other("cancelled".into()), None, vec![]),
        ];
        let mut soup = menu_item("m1", "Soup", 90.0, Category::Starters);
        soup.is_available = false;
        let menu = vec![soup, menu_item("m2", "Tea", 20.0, Category::Drinks)];

        let m = DashboardMetrics::compute(&orders, &menu);
        assert_eq!(m.total_orders, 5);
        assert_eq!(m.menu_items, 2);
        assert_eq!(m.available_items, 1);
        assert_eq!(m.revenue, 290.0);
        assert_eq!(m.customers, 2, "Asha plus the collapsed Guest");
        assert_eq!((m.dine_in_orders, m.delivery_orders), (3, 2));
        assert_eq!(m.active_orders, 2);
        assert_eq!(m.finished_orders, 1);
    }

    #[test]
    fn recent_orders_are_newest_first() {
        let mut orders: Vec<Order> = (0..7)
            .map(|i| {
                order(
                    &format!("o{i}"),
                    OrderType::DineIn,
                    OrderStatus::Pending,
                    None,
                    vec![],
                )
            })
            .collect();
        for (i, o) in orders.iter_mut().enumerate() {
            o.created_at += Duration::minutes(i as i64);
        }
        let ids: Vec<_> = recent_orders(&orders).into_iter().map(|o| o.id).collect();
        assert_eq!(ids, ["o6", "o5", "o4", "o3", "o2"]);
    }

    #[tokio::test]
    async fn load_fetches_both_collections() {
        let api = Arc::new(FakeBackOffice::with_orders(vec![order(
            "o1",
            OrderType::DineIn,
            OrderStatus::Pending,
            Some("Asha"),
            vec![line("a", "Dosa", 2, 80.0)],
        )]));
        api.menu
            .lock()
            .unwrap()
            .push(menu_item("a", "Dosa", 80.0, Category::MainCourse));
        let mut view = DashboardView::new(api.clone());
        let metrics = view.load().await.expect("load").clone();
        assert_eq!(metrics.total_orders, 1);
        assert_eq!(metrics.menu_items, 1);
        let calls = api.calls();
        assert!(calls.contains(&"list_orders".to_string()));
        assert!(calls.contains(&"list_menu_items".to_string()));

        let admin = Admin {
            id: "a1".into(),
            name: "Ravi".into(),
            email: "r@x.in".into(),
        };
        let text = view.render(Some(&admin), Utc::now());
        assert!(text.contains("Welcome back, Ravi!"));
        assert!(text.contains("Dosa"));
    }

    #[tokio::test]
    async fn load_failure_is_reported() {
        let api = Arc::new(FakeBackOffice::default());
        api.fail(Failure::Network);
        let mut view = DashboardView::new(api);
        assert_eq!(view.load().await.err(), Some("Failed to fetch orders".to_string()));
        assert_eq!(view.error(), Some("Failed to fetch orders"));
        assert!(view.metrics().is_none());
    }
}
