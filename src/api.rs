//! Back-office REST API client.
//!
//! Every endpoint answers with a `{ success, data, message }` envelope (auth
//! endpoints put the admin record under `admin`). Session credentials are
//! carried two ways: a cookie jar for same-origin session cookies, and a
//! bearer token whenever the server has handed one out.

use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Mutex;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use crate::models::{Admin, DiningTable, MenuItem, MenuItemForm, Order, OrderStatus};

/// Base URL used when nothing is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";

/// Default timeout for API requests (30 seconds).
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never got an HTTP answer.
    #[error("{0}")]
    Network(String),

    /// Non-2xx answer. `from_server` is true when `message` came from the
    /// response body rather than from the status code.
    #[error("{message}")]
    Status {
        status: u16,
        message: String,
        from_server: bool,
    },

    /// 2xx answer whose envelope said `success: false`.
    #[error("{0}")]
    Rejected(String),

    #[error("Invalid response from back-office API: {0}")]
    InvalidResponse(String),

    #[error("Failed to build request: {0}")]
    Request(String),
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    /// Message supplied by the server, if the server supplied one.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            ApiError::Status {
                message,
                from_server: true,
                ..
            } => Some(message),
            ApiError::Rejected(message) => Some(message),
            _ => None,
        }
    }

    /// What the user sees: the server's own message, else `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        self.server_message()
            .map(str::to_string)
            .unwrap_or_else(|| fallback.to_string())
    }
}

/// Convert a `reqwest::Error` into a user-friendly message.
fn friendly_error(url: &str, err: &reqwest::Error) -> String {
    if err.is_connect() {
        return format!("Cannot reach back-office API at {url}");
    }
    if err.is_timeout() {
        return format!("Connection to {url} timed out");
    }
    if err.is_builder() {
        return format!("Invalid back-office API URL: {url}");
    }
    format!("Network error communicating with {url}: {err}")
}

/// Convert an HTTP status code into a user-friendly message.
fn status_error(status: StatusCode) -> String {
    match status.as_u16() {
        401 => "Not logged in or session expired".to_string(),
        403 => "Not authorized for this action".to_string(),
        404 => "Back-office endpoint not found".to_string(),
        s if s >= 500 => format!("Back-office server error (HTTP {s})"),
        s => format!("Unexpected response from back-office API (HTTP {s})"),
    }
}

/// Build the error for a non-2xx answer, preferring the body's `message`.
fn status_failure(status: StatusCode, body: &str) -> ApiError {
    let server_message = serde_json::from_str::<Value>(body).ok().and_then(|json| {
        json.get("message")
            .or_else(|| json.get("error"))
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .map(str::to_string)
    });
    match server_message {
        Some(message) => ApiError::Status {
            status: status.as_u16(),
            message,
            from_server: true,
        },
        None => ApiError::Status {
            status: status.as_u16(),
            message: status_error(status),
            from_server: false,
        },
    }
}

// ---------------------------------------------------------------------------
// URL normalisation
// ---------------------------------------------------------------------------

/// Normalise the API base URL:
/// - ensure a scheme is present (http for localhost, https otherwise)
/// - strip trailing slashes
///
/// The path (usually `/api`) is kept; endpoints are appended to it.
pub fn normalize_api_url(url: &str) -> String {
    let mut url = url.trim().to_string();
    if url.is_empty() {
        return DEFAULT_API_URL.to_string();
    }

    if !url.starts_with("http://") && !url.starts_with("https://") {
        if url.starts_with("localhost") || url.starts_with("127.0.0.1") {
            url = format!("http://{url}");
        } else {
            url = format!("https://{url}");
        }
    }

    while url.ends_with('/') {
        url.pop();
    }

    url
}

/// `scheme://host[:port]` part of a URL, used to resolve root-relative asset
/// paths such as `/uploads/qr/4.png` and to keep the bearer token on the API's
/// own origin.
fn origin_of(url: &str) -> &str {
    let after_scheme = url.find("://").map(|i| i + 3).unwrap_or(0);
    match url[after_scheme..].find('/') {
        Some(i) => &url[..after_scheme + i],
        None => url,
    }
}

// ---------------------------------------------------------------------------
// Envelopes
// ---------------------------------------------------------------------------

fn default_success() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default = "default_success")]
    success: bool,
    data: Option<T>,
    message: Option<String>,
}

impl<T> Envelope<T> {
    fn into_data(self, what: &str) -> ApiResult<T> {
        if !self.success {
            return Err(ApiError::Rejected(
                self.message
                    .unwrap_or_else(|| "Request was rejected".to_string()),
            ));
        }
        self.data
            .ok_or_else(|| ApiError::InvalidResponse(format!("missing {what} in response")))
    }

    fn into_ack(self) -> ApiResult<()> {
        if !self.success {
            return Err(ApiError::Rejected(
                self.message
                    .unwrap_or_else(|| "Request was rejected".to_string()),
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct AuthData {
    admin: Admin,
    #[serde(default)]
    token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AuthEnvelope {
    #[serde(default = "default_success")]
    success: bool,
    #[serde(default)]
    admin: Option<Admin>,
    #[serde(default)]
    token: Option<String>,
    #[serde(default)]
    data: Option<AuthData>,
    #[serde(default)]
    message: Option<String>,
}

impl AuthEnvelope {
    fn into_session(self) -> ApiResult<AdminSession> {
        if !self.success {
            return Err(ApiError::Rejected(
                self.message
                    .unwrap_or_else(|| "Request was rejected".to_string()),
            ));
        }
        match (self.admin, self.data) {
            (Some(admin), data) => Ok(AdminSession {
                admin,
                token: self.token.or(data.and_then(|d| d.token)),
            }),
            (None, Some(data)) => Ok(AdminSession {
                admin: data.admin,
                token: self.token.or(data.token),
            }),
            (None, None) => Err(ApiError::InvalidResponse(
                "missing admin in response".to_string(),
            )),
        }
    }
}

/// Result of a successful login or registration.
#[derive(Debug, Clone, PartialEq)]
pub struct AdminSession {
    pub admin: Admin,
    /// Bearer token, when the server issues one in addition to its cookie.
    pub token: Option<String>,
}

// ---------------------------------------------------------------------------
// Remote seam
// ---------------------------------------------------------------------------

/// Operations the console needs from the back-office API. Stores and views
/// are generic over this so they can run against a fake in tests.
#[allow(async_fn_in_trait)]
pub trait BackOffice {
    async fn list_menu_items(&self) -> ApiResult<Vec<MenuItem>>;
    async fn create_menu_item(&self, form: &MenuItemForm) -> ApiResult<MenuItem>;
    async fn update_menu_item(&self, id: &str, form: &MenuItemForm) -> ApiResult<MenuItem>;
    async fn delete_menu_item(&self, id: &str) -> ApiResult<()>;

    async fn list_orders(&self) -> ApiResult<Vec<Order>>;
    async fn update_order_status(&self, id: &str, status: &OrderStatus) -> ApiResult<Order>;
    async fn delete_order(&self, id: &str) -> ApiResult<()>;

    async fn list_tables(&self) -> ApiResult<Vec<DiningTable>>;
    async fn create_table(&self, table_number: &str) -> ApiResult<DiningTable>;
    async fn delete_table(&self, id: &str) -> ApiResult<()>;

    async fn register(&self, name: &str, email: &str, password: &str)
        -> ApiResult<AdminSession>;
    async fn login(&self, email: &str, password: &str) -> ApiResult<AdminSession>;
    async fn logout(&self) -> ApiResult<()>;

    /// Raw bytes of an asset (e.g. a QR image) referenced by the API.
    async fn fetch_asset(&self, url: &str) -> ApiResult<Vec<u8>>;
}

// ---------------------------------------------------------------------------
// HTTP implementation
// ---------------------------------------------------------------------------

pub struct ApiClient {
    http: Client,
    base_url: String,
    token: Mutex<Option<Zeroizing<String>>>,
}

impl ApiClient {
    pub fn new(base_url: &str) -> ApiResult<Self> {
        let http = Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .cookie_store(true)
            .build()
            .map_err(|e| ApiError::Request(format!("Failed to create HTTP client: {e}")))?;
        Ok(Self {
            http,
            base_url: normalize_api_url(base_url),
            token: Mutex::new(None),
        })
    }

    /// Seed the bearer token (e.g. one restored from the credential store).
    pub fn with_token(self, token: Option<String>) -> Self {
        self.set_token(token);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Current bearer token, if any.
    pub fn token(&self) -> Option<String> {
        self.token
            .lock()
            .ok()
            .and_then(|t| t.as_ref().map(|z| z.as_str().to_string()))
    }

    fn set_token(&self, token: Option<String>) {
        if let Ok(mut slot) = self.token.lock() {
            *slot = token.filter(|t| !t.trim().is_empty()).map(Zeroizing::new);
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{path}", self.base_url);
        debug!(method = method.as_str(), url = url.as_str(), "api request");
        let req = self.http.request(method, url);
        match self.token() {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn send_raw(&self, req: RequestBuilder) -> ApiResult<(StatusCode, String)> {
        let resp = req
            .send()
            .await
            .map_err(|e| ApiError::Network(friendly_error(&self.base_url, &e)))?;
        let status = resp.status();
        let body = resp
            .text()
            .await
            .map_err(|e| ApiError::Network(friendly_error(&self.base_url, &e)))?;
        Ok((status, body))
    }

    async fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> ApiResult<T> {
        let (status, body) = self.send_raw(req).await?;
        if !status.is_success() {
            let err = status_failure(status, &body);
            warn!(status = status.as_u16(), error = %err, "api request failed");
            return Err(err);
        }
        let body = if body.trim().is_empty() { "{}" } else { body.as_str() };
        serde_json::from_str(body).map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }

    fn multipart(form: &MenuItemForm) -> ApiResult<Form> {
        let mut multipart = Form::new();
        for (key, value) in form.text_fields() {
            multipart = multipart.text(key, value);
        }
        if let Some(image) = &form.image {
            let part = Part::bytes(image.bytes.clone())
                .file_name(image.file_name.clone())
                .mime_str(&image.mime)
                .map_err(|e| ApiError::Request(format!("Failed to attach image: {e}")))?;
            multipart = multipart.part("image", part);
        }
        Ok(multipart)
    }

    fn asset_url(&self, url: &str) -> String {
        if url.starts_with("http://") || url.starts_with("https://") {
            url.to_string()
        } else if url.starts_with('/') {
            format!("{}{url}", origin_of(&self.base_url))
        } else {
            format!("{}/{url}", self.base_url)
        }
    }
}

impl BackOffice for ApiClient {
    async fn list_menu_items(&self) -> ApiResult<Vec<MenuItem>> {
        let env: Envelope<Vec<MenuItem>> = self.send(self.request(Method::GET, "/menu")).await?;
        env.into_data("menu items")
    }

    async fn create_menu_item(&self, form: &MenuItemForm) -> ApiResult<MenuItem> {
        let req = self
            .request(Method::POST, "/menu")
            .multipart(Self::multipart(form)?);
        let env: Envelope<MenuItem> = self.send(req).await?;
        let item = env.into_data("menu item")?;
        info!(id = %item.id, name = %item.name, "menu item created");
        Ok(item)
    }

    async fn update_menu_item(&self, id: &str, form: &MenuItemForm) -> ApiResult<MenuItem> {
        let req = self
            .request(Method::PATCH, &format!("/menu/{id}"))
            .multipart(Self::multipart(form)?);
        let env: Envelope<MenuItem> = self.send(req).await?;
        let item = env.into_data("menu item")?;
        info!(id = %item.id, "menu item updated");
        Ok(item)
    }

    async fn delete_menu_item(&self, id: &str) -> ApiResult<()> {
        let env: Envelope<Value> = self
            .send(self.request(Method::DELETE, &format!("/menu/{id}")))
            .await?;
        env.into_ack()?;
        info!(id, "menu item deleted");
        Ok(())
    }

    async fn list_orders(&self) -> ApiResult<Vec<Order>> {
        let env: Envelope<Vec<Order>> = self.send(self.request(Method::GET, "/orders")).await?;
        env.into_data("orders")
    }

    async fn update_order_status(&self, id: &str, status: &OrderStatus) -> ApiResult<Order> {
        let req = self
            .request(Method::PUT, &format!("/orders/{id}/status"))
            .json(&json!({ "status": status }));
        let env: Envelope<Order> = self.send(req).await?;
        let order = env.into_data("order")?;
        info!(id, status = status.as_str(), "order status updated");
        Ok(order)
    }

    async fn delete_order(&self, id: &str) -> ApiResult<()> {
        let env: Envelope<Value> = self
            .send(self.request(Method::DELETE, &format!("/orders/{id}")))
            .await?;
        env.into_ack()?;
        info!(id, "order deleted");
        Ok(())
    }

    async fn list_tables(&self) -> ApiResult<Vec<DiningTable>> {
        let env: Envelope<Vec<DiningTable>> =
            self.send(self.request(Method::GET, "/tables")).await?;
        env.into_data("tables")
    }

    async fn create_table(&self, table_number: &str) -> ApiResult<DiningTable> {
        let req = self
            .request(Method::POST, "/tables")
            .json(&json!({ "tableNumber": table_number }));
        let env: Envelope<DiningTable> = self.send(req).await?;
        let table = env.into_data("table")?;
        info!(id = %table.id, table_number = %table.table_number, "table created");
        Ok(table)
    }

    async fn delete_table(&self, id: &str) -> ApiResult<()> {
        let env: Envelope<Value> = self
            .send(self.request(Method::DELETE, &format!("/tables/{id}")))
            .await?;
        env.into_ack()?;
        info!(id, "table deleted");
        Ok(())
    }

    async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
    ) -> ApiResult<AdminSession> {
        let req = self
            .request(Method::POST, "/admin/register")
            .json(&json!({ "name": name, "email": email, "password": password }));
        let env: AuthEnvelope = self.send(req).await?;
        let session = env.into_session()?;
        self.set_token(session.token.clone());
        info!(admin_id = %session.admin.id, "admin registered");
        Ok(session)
    }

    async fn login(&self, email: &str, password: &str) -> ApiResult<AdminSession> {
        let req = self
            .request(Method::POST, "/admin/login")
            .json(&json!({ "email": email, "password": password }));
        let env: AuthEnvelope = self.send(req).await?;
        let session = env.into_session()?;
        self.set_token(session.token.clone());
        info!(admin_id = %session.admin.id, "admin logged in");
        Ok(session)
    }

    async fn logout(&self) -> ApiResult<()> {
        let result = self
            .send::<Envelope<Value>>(self.request(Method::POST, "/admin/logout"))
            .await
            .and_then(Envelope::into_ack);
        // The local token is dropped whatever the server said.
        self.set_token(None);
        result
    }

    async fn fetch_asset(&self, url: &str) -> ApiResult<Vec<u8>> {
        let full_url = self.asset_url(url);
        let mut req = self.http.get(&full_url);
        // The token only ever goes to the API's own origin.
        if origin_of(&full_url) == origin_of(&self.base_url) {
            if let Some(token) = self.token() {
                req = req.bearer_auth(token);
            }
        } else {
            debug!(url = full_url.as_str(), "fetching foreign asset without credentials");
        }
        let resp = req
            .send()
            .await
            .map_err(|e| ApiError::Network(friendly_error(&full_url, &e)))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: status_error(status),
                from_server: false,
            });
        }
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| ApiError::Network(friendly_error(&full_url, &e)))?;
        Ok(bytes.to_vec())
    }
}
