//! Display helpers: prices, order statuses, relative times.

use chrono::{DateTime, Utc};

use crate::models::{OrderStatus, OrderType};

/// Currency symbol used for every amount the console prints.
pub const CURRENCY_SYMBOL: &str = "₹";

/// `42.0` -> `₹42.00`.
pub fn format_price(price: f64) -> String {
    format!("{CURRENCY_SYMBOL}{price:.2}")
}

/// Price text as typed into a form, normalised to two decimals for upload.
/// Returns `None` unless the text is a finite number.
pub fn price_for_upload(raw: &str) -> Option<String> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|p| p.is_finite())
        .map(|p| format!("{p:.2}"))
}

/// Human label; statuses the console does not know are shown as sent.
pub fn status_label(status: &OrderStatus) -> &str {
    match status {
        OrderStatus::Pending => "Pending",
        OrderStatus::Preparing => "Preparing",
        OrderStatus::Served => "Served",
        OrderStatus::Completed => "Completed",
        OrderStatus::OutForDelivery => "Out for Delivery",
        OrderStatus::Delivered => "Delivered",
        OrderStatus::Other(raw) => raw,
    }
}

pub fn status_icon(status: &OrderStatus) -> &'static str {
    match status {
        OrderStatus::Pending => "⏳",
        OrderStatus::Preparing => "👨‍🍳",
        OrderStatus::Served => "✅",
        OrderStatus::Completed => "🏁",
        OrderStatus::OutForDelivery => "🛵",
        OrderStatus::Delivered => "📬",
        OrderStatus::Other(_) => "•",
    }
}

pub fn order_type_label(order_type: OrderType) -> &'static str {
    match order_type {
        OrderType::DineIn => "Dine-in",
        OrderType::HomeDelivery => "Home Delivery",
    }
}

fn plural(n: i64) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

/// Coarse "time ago" string: minutes below an hour, hours below a day, days
/// after that. Timestamps in the future read as "0 mins ago".
pub fn format_relative_time(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let minutes = (now - then).num_minutes().max(0);
    let hours = minutes / 60;
    let days = hours / 24;

    if minutes < 60 {
        format!("{minutes} mins ago")
    } else if hours < 24 {
        format!("{hours} hour{} ago", plural(hours))
    } else {
        format!("{days} day{} ago", plural(days))
    }
}

pub fn format_date(at: DateTime<Utc>) -> String {
    at.format("%d/%m/%Y").to_string()
}
