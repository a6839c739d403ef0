//! Dining tables and their QR codes.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};

use crate::api::BackOffice;
use crate::format::format_date;
use crate::models::DiningTable;
use crate::views::{Notice, Prompt};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableSummary {
    pub total: usize,
    pub qr_codes: usize,
    pub active: usize,
}

pub struct TablesView<B> {
    api: Arc<B>,
    tables: Vec<DiningTable>,
    loading: bool,
    submitting: bool,
    /// Table whose QR code is shown full size.
    selected_qr: Option<String>,
}

impl<B: BackOffice> TablesView<B> {
    pub fn new(api: Arc<B>) -> Self {
        Self {
            api,
            tables: Vec::new(),
            loading: false,
            submitting: false,
            selected_qr: None,
        }
    }

    pub fn tables(&self) -> &[DiningTable] {
        &self.tables
    }

    pub fn find(&self, id: &str) -> Option<&DiningTable> {
        self.tables.iter().find(|t| t.id == id)
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub async fn load(&mut self, prompt: &mut impl Prompt) -> Result<(), String> {
        self.loading = true;
        let result = self.api.list_tables().await;
        self.loading = false;
        match result {
            Ok(tables) => {
                self.tables = tables;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "fetching tables failed");
                let message = "Failed to fetch tables".to_string();
                prompt.notify(Notice::error(message.clone()));
                Err(message)
            }
        }
    }

    pub async fn create(
        &mut self,
        table_number: &str,
        prompt: &mut impl Prompt,
    ) -> Result<DiningTable, String> {
        let label = table_number.trim();
        if label.is_empty() {
            let message = "Please enter a table number".to_string();
            prompt.notify(Notice::error(message.clone()));
            return Err(message);
        }

        self.submitting = true;
        let result = self.api.create_table(label).await;
        self.submitting = false;

        match result {
            Ok(table) => {
                prompt.notify(Notice::success(format!(
                    "Table {label} created successfully!"
                )));
                self.tables.push(table.clone());
                Ok(table)
            }
            Err(e) => {
                warn!(error = %e, "table create failed");
                let message = e.user_message("Failed to create table");
                prompt.notify(Notice::error(message.clone()));
                Err(message)
            }
        }
    }

    /// Returns `Ok(false)` when the operator declines.
    pub async fn delete(&mut self, id: &str, prompt: &mut impl Prompt) -> Result<bool, String> {
        let Some(label) = self.find(id).map(|t| t.table_number.clone()) else {
            let message = format!("No table with id {id}");
            prompt.notify(Notice::error(message.clone()));
            return Err(message);
        };
        if !prompt.confirm(&format!("Are you sure you want to delete Table {label}?")) {
            return Ok(false);
        }
        match self.api.delete_table(id).await {
            Ok(()) => {
                self.tables.retain(|t| t.id != id);
                if self.selected_qr.as_deref() == Some(id) {
                    self.selected_qr = None;
                }
                prompt.notify(Notice::success("Table deleted successfully"));
                Ok(true)
            }
            Err(e) => {
                warn!(error = %e, id, "table delete failed");
                let message = "Failed to delete table".to_string();
                prompt.notify(Notice::error(message.clone()));
                Err(message)
            }
        }
    }

    pub fn open_qr(&mut self, id: &str) -> Result<&DiningTable, String> {
        if self.find(id).is_none() {
            return Err(format!("No table with id {id}"));
        }
        self.selected_qr = Some(id.to_string());
        self.selected_table()
            .ok_or_else(|| format!("No table with id {id}"))
    }

    pub fn close_qr(&mut self) {
        self.selected_qr = None;
    }

    pub fn selected_table(&self) -> Option<&DiningTable> {
        self.selected_qr.as_deref().and_then(|id| self.find(id))
    }

    /// Save a table's QR image as `table-<label>-qr.png` under `dir`.
    pub async fn download_qr(
        &self,
        id: &str,
        dir: &Path,
        prompt: &mut impl Prompt,
    ) -> Result<PathBuf, String> {
        let table = self
            .find(id)
            .ok_or_else(|| format!("No table with id {id}"))?;
        let result = self.write_qr(table, dir).await;
        match &result {
            Ok(path) => {
                info!(path = %path.display(), "qr code saved");
                prompt.notify(Notice::success(format!(
                    "QR code for Table {} downloaded!",
                    table.table_number
                )));
            }
            Err(message) => prompt.notify(Notice::error(message.clone())),
        }
        result
    }

    async fn write_qr(&self, table: &DiningTable, dir: &Path) -> Result<PathBuf, String> {
        if table.qr_code_url.is_empty() {
            return Err(format!("Table {} has no QR code", table.table_number));
        }
        let bytes = match decode_data_url(&table.qr_code_url) {
            Some(decoded) => decoded?,
            None => self
                .api
                .fetch_asset(&table.qr_code_url)
                .await
                .map_err(|e| e.user_message("Failed to download QR code"))?,
        };
        std::fs::create_dir_all(dir)
            .map_err(|e| format!("Cannot create {}: {e}", dir.display()))?;
        let path = dir.join(qr_file_name(&table.table_number));
        std::fs::write(&path, bytes)
            .map_err(|e| format!("Cannot write {}: {e}", path.display()))?;
        Ok(path)
    }

    pub fn summary(&self) -> TableSummary {
        let total = self.tables.len();
        TableSummary {
            total,
            qr_codes: self
                .tables
                .iter()
                .filter(|t| !t.qr_code_url.is_empty())
                .count(),
            active: total,
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::from("Tables Management\nManage restaurant tables and QR codes\n\n");
        let summary = self.summary();
        out.push_str(&format!(
            "🪑 Total Tables: {}   📱 QR Codes: {}   ✅ Active: {}\n\n",
            summary.total, summary.qr_codes, summary.active
        ));

        if self.loading {
            out.push_str("Loading tables...\n");
            return out;
        }
        if self.tables.is_empty() {
            out.push_str("No Tables Yet\nCreate your first table to get started\n");
            return out;
        }

        for table in &self.tables {
            out.push_str(&format!(
                "Table {:<8} id: {:<26} Created: {}\n",
                table.table_number,
                table.id,
                format_date(table.created_at)
            ));
        }

        if let Some(table) = self.selected_table() {
            out.push_str(&format!(
                "\nTable {} QR Code\n  {}\n",
                table.table_number,
                qr_source_label(&table.qr_code_url)
            ));
        }
        out
    }
}

/// `table-<label>-qr.png`, with anything unsafe in a file name replaced.
pub fn qr_file_name(table_number: &str) -> String {
    let label: String = table_number
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    format!("table-{label}-qr.png")
}

/// Decode a base64 `data:` URL. `None` when `url` is not a data URL.
fn decode_data_url(url: &str) -> Option<Result<Vec<u8>, String>> {
    let rest = url.strip_prefix("data:")?;
    let Some((meta, payload)) = rest.split_once(',') else {
        return Some(Err("Malformed QR code data".to_string()));
    };
    if !meta.ends_with(";base64") {
        return Some(Err("Unsupported QR code encoding".to_string()));
    }
    Some(
        STANDARD
            .decode(payload.trim())
            .map_err(|e| format!("Malformed QR code data: {e}")),
    )
}

fn qr_source_label(url: &str) -> String {
    if url.starts_with("data:") {
        format!("(embedded image, {} bytes encoded)", url.len())
    } else {
        url.to_string()
    }
}
