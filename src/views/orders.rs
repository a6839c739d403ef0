//! Order tracking screen: filters, status changes, deletion.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{info, warn};

use crate::api::BackOffice;
use crate::format::{format_price, format_relative_time, order_type_label, status_icon, status_label};
use crate::models::{Order, OrderStatus, OrderType};
use crate::views::{Notice, Prompt};

pub struct OrdersView<B> {
    api: Arc<B>,
    orders: Vec<Order>,
    loading: bool,
    error: Option<String>,
    /// Order whose status change is in flight.
    updating: Option<String>,
    /// `None` means "All".
    status_filter: Option<OrderStatus>,
    type_filter: Option<OrderType>,
    expanded: Option<String>,
}

impl<B: BackOffice> OrdersView<B> {
    pub fn new(api: Arc<B>) -> Self {
        Self {
            api,
            orders: Vec::new(),
            loading: false,
            error: None,
            updating: None,
            status_filter: None,
            type_filter: None,
            expanded: None,
        }
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn updating(&self) -> Option<&str> {
        self.updating.as_deref()
    }

    pub async fn load(&mut self) -> Result<(), String> {
        self.loading = true;
        self.error = None;
        let result = self.api.list_orders().await;
        self.loading = false;
        match result {
            Ok(orders) => {
                self.orders = orders;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "fetching orders failed");
                let message = e.user_message("Failed to fetch orders");
                self.error = Some(message.clone());
                Err(message)
            }
        }
    }

    /// Reload after a failed fetch.
    pub async fn retry(&mut self) -> Result<(), String> {
        self.load().await
    }

    pub fn set_status_filter(&mut self, status: Option<OrderStatus>) {
        self.status_filter = status;
    }

    pub fn set_type_filter(&mut self, order_type: Option<OrderType>) {
        self.type_filter = order_type;
    }

    /// Orders passing both filters.
    pub fn filtered(&self) -> Vec<&Order> {
        self.orders
            .iter()
            .filter(|o| self.status_filter.as_ref().map_or(true, |s| &o.status == s))
            .filter(|o| self.type_filter.map_or(true, |t| o.order_type == t))
            .collect()
    }

    pub fn status_options(order: &Order) -> &'static [OrderStatus] {
        order.order_type.statuses()
    }

    /// Count of orders per known status, in display order. Orders in a
    /// status the console does not know are not counted.
    pub fn status_counts(&self) -> Vec<(OrderStatus, usize)> {
        OrderStatus::ALL
            .into_iter()
            .map(|s| {
                let n = self.orders.iter().filter(|o| o.status == s).count();
                (s, n)
            })
            .collect()
    }

    pub fn expanded(&self) -> Option<&str> {
        self.expanded.as_deref()
    }

    /// Expand one order, collapsing any other; toggling the open one closes it.
    pub fn toggle_expanded(&mut self, id: &str) {
        if self.expanded.as_deref() == Some(id) {
            self.expanded = None;
        } else {
            self.expanded = Some(id.to_string());
        }
    }

    pub async fn update_status(
        &mut self,
        id: &str,
        status: OrderStatus,
        prompt: &mut impl Prompt,
    ) -> Result<(), String> {
        let Some(order) = self.orders.iter().find(|o| o.id == id) else {
            let message = format!("No order with id {id}");
            prompt.notify(Notice::error(message.clone()));
            return Err(message);
        };
        if !order.order_type.permits(&status) {
            let message = format!(
                "Status '{}' is not available for {} orders",
                status_label(&status),
                order_type_label(order.order_type)
            );
            prompt.notify(Notice::error(message.clone()));
            return Err(message);
        }

        self.updating = Some(id.to_string());
        let result = self.api.update_order_status(id, &status).await;
        self.updating = None;

        match result {
            Ok(updated) => {
                if let Some(slot) = self.orders.iter_mut().find(|o| o.id == id) {
                    *slot = updated;
                }
                info!(id, status = status.as_str(), "order status changed");
                prompt.notify(Notice::success("Order status updated successfully!"));
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, id, "order status update failed");
                let message = e.user_message("Failed to update order status");
                prompt.notify(Notice::error(message.clone()));
                Err(message)
            }
        }
    }

    /// Returns `Ok(false)` when the operator declines.
    pub async fn delete(&mut self, id: &str, prompt: &mut impl Prompt) -> Result<bool, String> {
        if !prompt.confirm("Are you sure you want to delete this order?") {
            return Ok(false);
        }
        match self.api.delete_order(id).await {
            Ok(()) => {
                self.orders.retain(|o| o.id != id);
                if self.expanded.as_deref() == Some(id) {
                    self.expanded = None;
                }
                prompt.notify(Notice::success("Order deleted successfully!"));
                Ok(true)
            }
            Err(e) => {
                warn!(error = %e, id, "order delete failed");
                let message = e.user_message("Failed to delete order");
                prompt.notify(Notice::error(message.clone()));
                Err(message)
            }
        }
    }

    pub fn render(&self, now: DateTime<Utc>) -> String {
        let mut out = String::from("Orders Management\n\n");

        if self.loading {
            out.push_str("Loading orders...\n");
            return out;
        }
        if let Some(err) = &self.error {
            out.push_str(&format!("{err}\n(run again to retry)\n"));
            return out;
        }

        let cards: Vec<String> = self
            .status_counts()
            .into_iter()
            .map(|(s, n)| format!("{} {}: {n}", status_icon(&s), status_label(&s)))
            .collect();
        out.push_str(&cards.join("   "));
        out.push_str("\n\n");

        out.push_str(&format!(
            "Status: {}   Type: {}\n\n",
            self.status_filter.as_ref().map_or("All", status_label),
            self.type_filter.map_or("All", order_type_label)
        ));

        let orders = self.filtered();
        if orders.is_empty() {
            out.push_str("No orders found\n");
            return out;
        }

        for order in orders {
            out.push_str(&self.render_order(order, now));
        }
        out
    }

    fn render_order(&self, order: &Order, now: DateTime<Utc>) -> String {
        let place = match (order.order_type, order.table_number.as_deref()) {
            (OrderType::DineIn, Some(table)) => format!("Table {table}"),
            (OrderType::DineIn, None) => "Dine-in".to_string(),
            (OrderType::HomeDelivery, _) => "Delivery".to_string(),
        };
        let mut line = format!(
            "#{} {} {:<12} {:<10} {:>10}  {}  {}\n",
            order.id,
            status_icon(&order.status),
            status_label(&order.status),
            place,
            format_price(order.total_amount),
            order.customer_display(),
            format_relative_time(order.created_at, now)
        );
        if self.updating.as_deref() == Some(order.id.as_str()) {
            line.push_str("    updating...\n");
        }
        if self.expanded.as_deref() != Some(order.id.as_str()) {
            return line;
        }

        for item in &order.items {
            line.push_str(&format!(
                "    {} x {:<24} {:>10}\n",
                item.quantity,
                item.name,
                format_price(item.line_total())
            ));
        }
        if let Some(delivery) = &order.delivery {
            if let Some(address) = &delivery.address {
                line.push_str(&format!("    Address: {address}\n"));
            }
            if let Some(phone) = &delivery.phone {
                line.push_str(&format!("    Phone:   {phone}\n"));
            }
            if let Some(method) = &delivery.payment_method {
                line.push_str(&format!("    Payment: {method}\n"));
            }
            if let Some(fee) = delivery.fee {
                line.push_str(&format!("    Delivery fee: {}\n", format_price(fee)));
            }
        }
        let options: Vec<&str> = Self::status_options(order)
            .iter()
            .map(|s| s.as_str())
            .collect();
        line.push_str(&format!("    Move to: {}\n", options.join(" | ")));
        line
    }
}
