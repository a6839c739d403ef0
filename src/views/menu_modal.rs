//! Create/edit form for a single menu item.

use std::path::Path;
use thiserror::Error;
use tracing::debug;

use crate::api::BackOffice;
use crate::format::price_for_upload;
use crate::models::{Category, ImageUpload, MenuItem, MenuItemForm};
use crate::stores::MenuStore;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormError {
    #[error("Name is required")]
    NameRequired,

    #[error("Please enter a valid price")]
    InvalidPrice,

    #[error("Please select a category")]
    CategoryRequired,

    /// Image rejected on attach (size, type, unreadable file).
    #[error("{0}")]
    Image(String),
}

/// Which record the form targets. The id is captured when the form opens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalMode {
    Create,
    Edit { id: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ImageSelection {
    Unchanged,
    Attach(ImageUpload),
    Remove,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MenuItemModal {
    is_open: bool,
    mode: ModalMode,
    pub name: String,
    /// Raw price text, parsed only on validation.
    pub price: String,
    pub description: String,
    pub category: Option<Category>,
    /// Server category text the item arrived with when it is not one of ours.
    /// Sent back unchanged as long as the category is left on Others.
    unlisted_category: Option<String>,
    pub is_available: bool,
    image: ImageSelection,
    /// What the image slot currently shows: the stored URL or the attached
    /// file name.
    preview: Option<String>,
    error: Option<String>,
}

impl Default for MenuItemModal {
    fn default() -> Self {
        Self {
            is_open: false,
            mode: ModalMode::Create,
            name: String::new(),
            price: String::new(),
            description: String::new(),
            category: Some(Category::MainCourse),
            unlisted_category: None,
            is_available: true,
            image: ImageSelection::Unchanged,
            preview: None,
            error: None,
        }
    }
}

impl MenuItemModal {
    /// Open empty for a new item, or pre-filled from `item` for an edit.
    pub fn open(&mut self, item: Option<&MenuItem>) {
        self.reset();
        if let Some(item) = item {
            self.mode = ModalMode::Edit {
                id: item.id.clone(),
            };
            self.name = item.name.clone();
            self.price = item.price.to_string();
            self.description = item.description.clone().unwrap_or_default();
            self.category = Some(item.category);
            self.unlisted_category = item.unlisted_category.clone();
            self.is_available = item.is_available;
            self.preview = item.image_url.clone();
        }
        self.is_open = true;
    }

    pub fn close(&mut self) {
        self.reset();
    }

    /// Back to an empty, closed form.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_open(&self) -> bool {
        self.is_open
    }

    pub fn mode(&self) -> &ModalMode {
        &self.mode
    }

    pub fn image(&self) -> &ImageSelection {
        &self.image
    }

    pub fn preview(&self) -> Option<&str> {
        self.preview.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Stage a new image. Attaching cancels a pending removal; a rejected
    /// file leaves the previous selection in place.
    pub fn attach_image_path(&mut self, path: &Path) -> Result<(), FormError> {
        match ImageUpload::load(path) {
            Ok(upload) => {
                self.preview = Some(upload.file_name.clone());
                self.image = ImageSelection::Attach(upload);
                self.error = None;
                Ok(())
            }
            Err(message) => {
                let err = FormError::Image(message);
                self.error = Some(err.to_string());
                Err(err)
            }
        }
    }

    pub fn remove_image(&mut self) {
        self.image = ImageSelection::Remove;
        self.preview = None;
    }

    /// First failing rule wins: name, then price, then category.
    pub fn validate(&self) -> Result<(), FormError> {
        if self.name.trim().is_empty() {
            return Err(FormError::NameRequired);
        }
        let price_ok = self
            .price
            .trim()
            .parse::<f64>()
            .is_ok_and(|p| p.is_finite() && p > 0.0);
        if !price_ok {
            return Err(FormError::InvalidPrice);
        }
        if self.category.is_none() {
            return Err(FormError::CategoryRequired);
        }
        Ok(())
    }

    /// Validated multipart payload for the current form state.
    pub fn build_form(&self) -> Result<MenuItemForm, FormError> {
        self.validate()?;
        let price = price_for_upload(&self.price).ok_or(FormError::InvalidPrice)?;
        let category = self.category.ok_or(FormError::CategoryRequired)?;
        let (image, remove_image) = match &self.image {
            ImageSelection::Attach(upload) => (Some(upload.clone()), false),
            ImageSelection::Remove => (None, matches!(self.mode, ModalMode::Edit { .. })),
            ImageSelection::Unchanged => (None, false),
        };
        let unlisted_category = match category {
            Category::Others => self.unlisted_category.clone(),
            _ => None,
        };
        Ok(MenuItemForm {
            name: self.name.trim().to_string(),
            price,
            description: self.description.trim().to_string(),
            category,
            unlisted_category,
            is_available: self.is_available,
            image,
            remove_image,
        })
    }

    /// Validate and send. On success the form resets and closes; on failure
    /// the message stays on the form and it remains open.
    pub async fn submit<B: BackOffice>(
        &mut self,
        store: &mut MenuStore<B>,
    ) -> Result<MenuItem, String> {
        self.error = None;
        store.clear_error();

        let form = match self.build_form() {
            Ok(form) => form,
            Err(e) => {
                self.error = Some(e.to_string());
                return Err(e.to_string());
            }
        };

        let result = match &self.mode {
            ModalMode::Create => store.add_item(&form).await,
            ModalMode::Edit { id } => {
                debug!(id = id.as_str(), "submitting menu item edit");
                store.update_item(id, &form).await
            }
        };

        match result {
            Ok(item) => {
                self.reset();
                Ok(item)
            }
            Err(message) => {
                self.error = Some(message.clone());
                Err(message)
            }
        }
    }

    pub fn render(&self) -> String {
        let title = match self.mode {
            ModalMode::Create => "Add New Menu Item",
            ModalMode::Edit { .. } => "Edit Menu Item",
        };
        let mut out = format!("{title}\n");
        if let Some(err) = &self.error {
            out.push_str(&format!("  ! {err}\n"));
        }
        out.push_str(&format!("  Name:        {}\n", self.name));
        out.push_str(&format!("  Price:       {}\n", self.price));
        out.push_str(&format!(
            "  Category:    {}\n",
            self.category.map(Category::as_str).unwrap_or("-")
        ));
        out.push_str(&format!("  Description: {}\n", self.description));
        out.push_str(&format!(
            "  Available:   {}\n",
            if self.is_available { "yes" } else { "no" }
        ));
        out.push_str(&format!(
            "  Image:       {}\n",
            self.preview.as_deref().unwrap_or("(none)")
        ));
        out
    }
}
