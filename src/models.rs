//! Back-office records as exchanged with the REST API.
//!
//! The API is inconsistent about a few shapes (identifier key, numeric fields
//! sent as strings, table labels sent as numbers). All of that is absorbed
//! here, at deserialization time, so the rest of the crate only ever sees one
//! canonical form per record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use tracing::warn;

/// Largest image accepted for a menu item upload (5 MiB).
pub const MAX_IMAGE_BYTES: u64 = 5 * 1024 * 1024;

// ---------------------------------------------------------------------------
// Wire helpers
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

impl NumberOrText {
    fn as_f64(&self) -> Option<f64> {
        match self {
            NumberOrText::Number(n) => Some(*n),
            NumberOrText::Text(s) => s.trim().parse::<f64>().ok(),
        }
    }

    fn into_label(self) -> String {
        match self {
            NumberOrText::Number(n) if n.fract() == 0.0 => format!("{}", n as i64),
            NumberOrText::Number(n) => n.to_string(),
            NumberOrText::Text(s) => s.trim().to_string(),
        }
    }
}

/// Numeric field that may arrive as `12.5` or `"12.50"`.
fn de_lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = NumberOrText::deserialize(deserializer)?;
    raw.as_f64()
        .ok_or_else(|| serde::de::Error::custom("expected a number"))
}

fn de_lenient_opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<NumberOrText>::deserialize(deserializer)?;
    Ok(raw.and_then(|v| v.as_f64()))
}

/// Count that may arrive as `2`, `2.0` or `"2"`. Rounded, never negative.
fn de_lenient_count<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = NumberOrText::deserialize(deserializer)?;
    let value = raw
        .as_f64()
        .filter(|n| n.is_finite())
        .ok_or_else(|| serde::de::Error::custom("expected a count"))?;
    Ok(value.round().clamp(0.0, f64::from(u32::MAX)) as u32)
}

/// Label field that may arrive as `4` or `"A4"`.
fn de_opt_label<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<NumberOrText>::deserialize(deserializer)?;
    Ok(raw.map(NumberOrText::into_label).filter(|s| !s.is_empty()))
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Pick the canonical identifier out of the `id` / `_id` pair.
fn canonical_id(id: Option<String>, legacy_id: Option<String>, what: &str) -> Result<String, String> {
    non_blank(id)
        .or_else(|| non_blank(legacy_id))
        .ok_or_else(|| format!("{what} record is missing an identifier"))
}

fn default_true() -> bool {
    true
}

// ---------------------------------------------------------------------------
// Menu
// ---------------------------------------------------------------------------

/// Fixed set of menu categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    Starters,
    MainCourse,
    Desserts,
    Drinks,
    Others,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Starters,
        Category::MainCourse,
        Category::Desserts,
        Category::Drinks,
        Category::Others,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Starters => "Starters",
            Category::MainCourse => "Main Course",
            Category::Desserts => "Desserts",
            Category::Drinks => "Drinks",
            Category::Others => "Others",
        }
    }

    /// Case-insensitive lookup; spaces, dashes and underscores are ignored so
    /// `main-course` and `Main Course` resolve to the same value.
    pub fn parse(raw: &str) -> Option<Self> {
        let folded: String = raw
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .collect::<String>()
            .to_ascii_lowercase();
        Category::ALL.into_iter().find(|c| {
            c.as_str()
                .chars()
                .filter(|ch| *ch != ' ')
                .collect::<String>()
                .to_ascii_lowercase()
                == folded
        })
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Category::parse(s).ok_or_else(|| {
            format!(
                "unknown category '{s}' (expected one of: {})",
                Category::ALL.map(Category::as_str).join(", ")
            )
        })
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Category filter used by the menu screen: the "All" sentinel plus one entry
/// per category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    pub fn options() -> [CategoryFilter; 6] {
        [
            CategoryFilter::All,
            CategoryFilter::Only(Category::Starters),
            CategoryFilter::Only(Category::MainCourse),
            CategoryFilter::Only(Category::Desserts),
            CategoryFilter::Only(Category::Drinks),
            CategoryFilter::Only(Category::Others),
        ]
    }

    pub fn matches(self, category: Category) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(wanted) => wanted == category,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CategoryFilter::All => "All",
            CategoryFilter::Only(c) => c.as_str(),
        }
    }
}

impl FromStr for CategoryFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(CategoryFilter::All);
        }
        s.parse::<Category>().map(CategoryFilter::Only)
    }
}

/// A menu entry.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "MenuItemWire")]
pub struct MenuItem {
    pub id: String,
    pub name: String,
    pub price: f64,
    pub category: Category,
    pub description: Option<String>,
    pub is_available: bool,
    pub image_url: Option<String>,
    /// Category text as the server sent it, when it matched none of the known
    /// categories. `category` is `Others` in that case.
    pub unlisted_category: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MenuItemWire {
    #[serde(default)]
    id: Option<String>,
    #[serde(default, rename = "_id")]
    legacy_id: Option<String>,
    name: String,
    #[serde(deserialize_with = "de_lenient_f64")]
    price: f64,
    category: String,
    #[serde(default)]
    description: Option<String>,
    #[serde(default = "default_true")]
    is_available: bool,
    #[serde(default)]
    image_url: Option<String>,
}

impl TryFrom<MenuItemWire> for MenuItem {
    type Error = String;

    fn try_from(wire: MenuItemWire) -> Result<Self, Self::Error> {
        let id = canonical_id(wire.id, wire.legacy_id, "menu item")?;
        // Unknown categories land in Others rather than failing the whole
        // collection; the raw text is kept so an edit can send it back.
        let (category, unlisted_category) = match Category::parse(&wire.category) {
            Some(category) => (category, None),
            None => {
                warn!(id = %id, category = %wire.category, "unknown menu category, shown as Others");
                (Category::Others, non_blank(Some(wire.category)))
            }
        };
        Ok(MenuItem {
            id,
            name: wire.name,
            price: wire.price,
            category,
            description: non_blank(wire.description),
            is_available: wire.is_available,
            image_url: non_blank(wire.image_url),
            unlisted_category,
        })
    }
}

/// Image file staged for upload with a menu item.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageUpload {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Load an image from disk, enforcing the size cap and an `image/*` type.
    pub fn load(path: &Path) -> Result<Self, String> {
        let meta = std::fs::metadata(path)
            .map_err(|e| format!("Cannot read image {}: {e}", path.display()))?;
        if meta.len() > MAX_IMAGE_BYTES {
            return Err("Image size should be less than 5MB".to_string());
        }
        let mime = mime_guess::from_path(path).first_or_octet_stream();
        if mime.type_() != mime_guess::mime::IMAGE {
            return Err("Please select a valid image file".to_string());
        }
        let bytes = std::fs::read(path)
            .map_err(|e| format!("Cannot read image {}: {e}", path.display()))?;
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("image")
            .to_string();
        Ok(ImageUpload {
            file_name,
            mime: mime.essence_str().to_string(),
            bytes,
        })
    }
}

/// Multipart payload for creating or updating a menu item.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuItemForm {
    pub name: String,
    /// Already formatted to two decimals.
    pub price: String,
    pub description: String,
    pub category: Category,
    /// Sent instead of `category` to keep a server category this console
    /// does not know about.
    pub unlisted_category: Option<String>,
    pub is_available: bool,
    pub image: Option<ImageUpload>,
    pub remove_image: bool,
}

impl MenuItemForm {
    /// Text parts in the order they are sent.
    pub fn text_fields(&self) -> Vec<(&'static str, String)> {
        let mut fields = vec![
            ("name", self.name.clone()),
            ("price", self.price.clone()),
            ("description", self.description.clone()),
            (
                "category",
                self.unlisted_category
                    .clone()
                    .unwrap_or_else(|| self.category.as_str().to_string()),
            ),
            ("isAvailable", self.is_available.to_string()),
        ];
        if self.image.is_none() && self.remove_image {
            fields.push(("removeImage", "true".to_string()));
        }
        fields
    }
}

// ---------------------------------------------------------------------------
// Orders
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderType {
    #[default]
    DineIn,
    #[serde(alias = "delivery")]
    HomeDelivery,
}

impl OrderType {
    pub const ALL: [OrderType; 2] = [OrderType::DineIn, OrderType::HomeDelivery];

    /// Statuses an order of this type may be moved to.
    pub fn statuses(self) -> &'static [OrderStatus] {
        match self {
            OrderType::DineIn => &DINE_IN_FLOW,
            OrderType::HomeDelivery => &DELIVERY_FLOW,
        }
    }

    pub fn permits(self, status: &OrderStatus) -> bool {
        self.statuses().contains(status)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderType::DineIn => "dine-in",
            OrderType::HomeDelivery => "home-delivery",
        }
    }
}

impl FromStr for OrderType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dine-in" | "dinein" | "dine_in" => Ok(OrderType::DineIn),
            "home-delivery" | "delivery" | "home_delivery" => Ok(OrderType::HomeDelivery),
            other => Err(format!(
                "unknown order type '{other}' (expected dine-in or home-delivery)"
            )),
        }
    }
}

static DINE_IN_FLOW: [OrderStatus; 4] = [
    OrderStatus::Pending,
    OrderStatus::Preparing,
    OrderStatus::Served,
    OrderStatus::Completed,
];

static DELIVERY_FLOW: [OrderStatus; 4] = [
    OrderStatus::Pending,
    OrderStatus::Preparing,
    OrderStatus::OutForDelivery,
    OrderStatus::Delivered,
];

/// Order status on the wire (kebab-case). `Other` holds any status the server
/// reports that this console does not know; it can be shown but never set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OrderStatus {
    Pending,
    Preparing,
    Served,
    Completed,
    OutForDelivery,
    Delivered,
    Other(String),
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 6] = [
        OrderStatus::Pending,
        OrderStatus::Preparing,
        OrderStatus::Served,
        OrderStatus::Completed,
        OrderStatus::OutForDelivery,
        OrderStatus::Delivered,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Served => "served",
            OrderStatus::Completed => "completed",
            OrderStatus::OutForDelivery => "out-for-delivery",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Other(raw) => raw,
        }
    }

    /// Pending and preparing orders still need kitchen attention.
    pub fn is_active(&self) -> bool {
        matches!(self, OrderStatus::Pending | OrderStatus::Preparing)
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Delivered)
    }

    /// Known status for `raw`, else `Other` carrying the text unchanged.
    pub fn from_wire(raw: &str) -> Self {
        raw.parse()
            .unwrap_or_else(|_| OrderStatus::Other(raw.trim().to_string()))
    }
}

impl Serialize for OrderStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for OrderStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(OrderStatus::from_wire(&raw))
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let folded = s.trim().to_ascii_lowercase().replace(['_', ' '], "-");
        OrderStatus::ALL
            .into_iter()
            .find(|st| st.as_str() == folded)
            .ok_or_else(|| format!("unknown order status '{s}'"))
    }
}

/// One line of an order.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "OrderLineWire")]
pub struct OrderLine {
    /// Referenced menu item, when the server sent one.
    pub menu_item_id: Option<String>,
    pub name: String,
    pub quantity: u32,
    pub unit_price: f64,
}

impl OrderLine {
    pub fn line_total(&self) -> f64 {
        self.unit_price * f64::from(self.quantity)
    }

    /// Key used to group lines belonging to the same menu item.
    pub fn item_key(&self) -> &str {
        self.menu_item_id.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MenuItemRefWire {
    Id(String),
    Record {
        #[serde(default)]
        id: Option<String>,
        #[serde(default, rename = "_id")]
        legacy_id: Option<String>,
        #[serde(default)]
        name: Option<String>,
        #[serde(default, deserialize_with = "de_lenient_opt_f64")]
        price: Option<f64>,
    },
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderLineWire {
    #[serde(default)]
    menu_item: Option<MenuItemRefWire>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default = "default_quantity", deserialize_with = "de_lenient_count")]
    quantity: u32,
    #[serde(default, deserialize_with = "de_lenient_opt_f64")]
    price: Option<f64>,
}

fn default_quantity() -> u32 {
    1
}

impl TryFrom<OrderLineWire> for OrderLine {
    type Error = String;

    fn try_from(wire: OrderLineWire) -> Result<Self, Self::Error> {
        let (ref_id, ref_name, ref_price) = match wire.menu_item {
            Some(MenuItemRefWire::Id(id)) => (non_blank(Some(id)), None, None),
            Some(MenuItemRefWire::Record {
                id,
                legacy_id,
                name,
                price,
            }) => (non_blank(id).or_else(|| non_blank(legacy_id)), name, price),
            None => (None, None, None),
        };
        let name = non_blank(wire.name)
            .or_else(|| non_blank(ref_name))
            .unwrap_or_else(|| "Unknown item".to_string());
        Ok(OrderLine {
            menu_item_id: ref_id,
            name,
            quantity: wire.quantity,
            unit_price: wire.price.or(ref_price).unwrap_or(0.0),
        })
    }
}

/// Delivery details carried by home-delivery orders.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DeliveryInfo {
    pub address: Option<String>,
    pub phone: Option<String>,
    pub payment_method: Option<String>,
    pub fee: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "OrderWire")]
pub struct Order {
    pub id: String,
    pub order_type: OrderType,
    pub table_number: Option<String>,
    pub customer_name: Option<String>,
    pub items: Vec<OrderLine>,
    pub total_amount: f64,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub delivery: Option<DeliveryInfo>,
}

impl Order {
    /// Display name; anonymous orders all read as "Guest".
    pub fn customer_display(&self) -> &str {
        self.customer_name.as_deref().unwrap_or("Guest")
    }

    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|l| l.quantity).sum()
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrderWire {
    #[serde(default)]
    id: Option<String>,
    #[serde(default, rename = "_id")]
    legacy_id: Option<String>,
    #[serde(default, alias = "type")]
    order_type: Option<OrderType>,
    #[serde(default, deserialize_with = "de_opt_label")]
    table_number: Option<String>,
    #[serde(default)]
    customer_name: Option<String>,
    #[serde(default)]
    items: Vec<OrderLine>,
    #[serde(default, deserialize_with = "de_lenient_opt_f64")]
    total_amount: Option<f64>,
    status: OrderStatus,
    created_at: DateTime<Utc>,
    #[serde(default)]
    delivery_address: Option<String>,
    #[serde(default, alias = "phone")]
    customer_phone: Option<String>,
    #[serde(default)]
    payment_method: Option<String>,
    #[serde(default, deserialize_with = "de_lenient_opt_f64")]
    delivery_fee: Option<f64>,
}

impl TryFrom<OrderWire> for Order {
    type Error = String;

    fn try_from(wire: OrderWire) -> Result<Self, Self::Error> {
        let order_type = wire.order_type.unwrap_or_default();
        let total_amount = wire
            .total_amount
            .unwrap_or_else(|| wire.items.iter().map(OrderLine::line_total).sum());
        let delivery = match order_type {
            OrderType::HomeDelivery => Some(DeliveryInfo {
                address: non_blank(wire.delivery_address),
                phone: non_blank(wire.customer_phone),
                payment_method: non_blank(wire.payment_method),
                fee: wire.delivery_fee,
            }),
            OrderType::DineIn => None,
        };
        Ok(Order {
            id: canonical_id(wire.id, wire.legacy_id, "order")?,
            order_type,
            table_number: match order_type {
                OrderType::DineIn => wire.table_number,
                OrderType::HomeDelivery => None,
            },
            customer_name: non_blank(wire.customer_name),
            items: wire.items,
            total_amount,
            status: wire.status,
            created_at: wire.created_at,
            delivery,
        })
    }
}

// ---------------------------------------------------------------------------
// Tables
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "DiningTableWire")]
pub struct DiningTable {
    pub id: String,
    pub table_number: String,
    /// `data:` URL or http(s) URL of the generated QR image.
    pub qr_code_url: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct DiningTableWire {
    #[serde(default)]
    id: Option<String>,
    #[serde(default, rename = "_id")]
    legacy_id: Option<String>,
    #[serde(default, deserialize_with = "de_opt_label")]
    table_number: Option<String>,
    #[serde(default)]
    qr_code_url: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<DiningTableWire> for DiningTable {
    type Error = String;

    fn try_from(wire: DiningTableWire) -> Result<Self, Self::Error> {
        Ok(DiningTable {
            id: canonical_id(wire.id, wire.legacy_id, "table")?,
            table_number: wire
                .table_number
                .ok_or_else(|| "table record is missing its table number".to_string())?,
            qr_code_url: wire.qr_code_url.unwrap_or_default(),
            created_at: wire.created_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Admin
// ---------------------------------------------------------------------------

/// Signed-in administrator. Serialized form is what gets persisted locally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "AdminWire")]
pub struct Admin {
    pub id: String,
    pub name: String,
    pub email: String,
}

impl Admin {
    /// Upper-cased first letter of the name, for the profile badge.
    pub fn initial(&self) -> String {
        self.name
            .trim()
            .chars()
            .next()
            .map(|c| c.to_uppercase().collect())
            .unwrap_or_default()
    }
}

#[derive(Deserialize)]
struct AdminWire {
    #[serde(default)]
    id: Option<String>,
    #[serde(default, rename = "_id")]
    legacy_id: Option<String>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
}

impl TryFrom<AdminWire> for Admin {
    type Error = String;

    fn try_from(wire: AdminWire) -> Result<Self, Self::Error> {
        Ok(Admin {
            id: canonical_id(wire.id, wire.legacy_id, "admin")?,
            name: wire.name,
            email: wire.email,
        })
    }
}
