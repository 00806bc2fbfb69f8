use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::bulk::BulkPatch;
use crate::database::Product;
use crate::schemas::ProductPatch;

/// Metadata of the most recent bulk import, as shown next to the table
#[derive(Debug, Clone, PartialEq)]
pub struct UploadFileMeta {
    pub file_name: String,
    pub upload_date: DateTime<Utc>,
}

/// Canonical client-side product list plus selection and in-flight state.
/// Constructed explicitly and passed by `&mut`; there is no global context.
///
/// Row addressing is positional: operations take the row's index into
/// `products`, matching how the table widget addresses rows.
#[derive(Debug, Default)]
pub struct ProductListState {
    products: Vec<Product>,
    last_upload: Option<UploadFileMeta>,
    selected: BTreeSet<usize>,
    pending: bool,
}

impl ProductListState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn products(&self) -> &[Product] {
        &self.products
    }

    pub fn last_upload(&self) -> Option<&UploadFileMeta> {
        self.last_upload.as_ref()
    }

    /// Bulk replace on load; any stale selection is dropped with the rows it
    /// pointed at.
    pub fn replace_all(&mut self, products: Vec<Product>) {
        self.products = products;
        self.selected.clear();
    }

    pub fn set_upload_meta(&mut self, file_name: impl Into<String>, upload_date: DateTime<Utc>) {
        self.last_upload = Some(UploadFileMeta {
            file_name: file_name.into(),
            upload_date,
        });
    }

    /// Stage an inline edit on one row. Returns false if the row is out of
    /// range. Nothing is persisted until `row_for_save` is sent.
    pub fn patch_row(&mut self, row: usize, patch: &ProductPatch) -> bool {
        let Some(product) = self.products.get_mut(row) else {
            return false;
        };

        if let Some(name) = &patch.name {
            product.name = name.clone();
        }
        if let Some(description) = &patch.description {
            product.description = Some(description.clone());
        }
        if let Some(price) = patch.price {
            product.price = price;
        }
        if let Some(stock) = patch.stock {
            product.stock = stock;
        }
        if let Some(merchant_id) = &patch.merchant_id {
            product.merchant_id = Some(merchant_id.clone());
        }
        if let Some(variant_id) = &patch.variant_id {
            product.variant_id = Some(variant_id.clone());
        }
        if let Some(supplier_model_number) = &patch.supplier_model_number {
            product.supplier_model_number = Some(supplier_model_number.clone());
        }
        if let Some(size) = &patch.size {
            product.size = Some(size.clone());
        }
        if let Some(vendor) = &patch.vendor {
            product.vendor = Some(vendor.clone());
        }
        if let Some(ean) = &patch.ean {
            product.ean = ean.clone();
        }
        if let Some(product_type) = &patch.product_type {
            product.product_type = product_type.clone();
        }
        if let Some(product_group) = &patch.product_group {
            product.product_group = product_group.clone();
        }
        if let Some(department) = &patch.department {
            product.department = department.clone();
        }
        if let Some(image_url) = &patch.image_url {
            product.image_url = Some(image_url.clone());
        }
        if let Some(msc) = patch.msc {
            product.msc = msc;
        }
        if let Some(variant_created) = patch.variant_created {
            product.variant_created = Some(variant_created);
        }
        if let Some(variant_updated) = patch.variant_updated {
            product.variant_updated = Some(variant_updated);
        }
        if let Some(inventory_level_created) = patch.inventory_level_created {
            product.inventory_level_created = Some(inventory_level_created);
        }
        if let Some(inventory_level_updated) = patch.inventory_level_updated {
            product.inventory_level_updated = Some(inventory_level_updated);
        }

        true
    }

    /// The full current (edited) state of one row, as sent to the single
    /// update endpoint on an explicit save - not a diff.
    pub fn row_for_save(&self, row: usize) -> Option<&Product> {
        self.products.get(row)
    }

    pub fn toggle_selected(&mut self, row: usize) {
        if row >= self.products.len() {
            return;
        }
        if !self.selected.remove(&row) {
            self.selected.insert(row);
        }
    }

    pub fn is_selected(&self, row: usize) -> bool {
        self.selected.contains(&row)
    }

    pub fn selection_is_empty(&self) -> bool {
        self.selected.is_empty()
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    /// Ids of the selected rows, in row order
    pub fn selected_ids(&self) -> Vec<Uuid> {
        self.selected
            .iter()
            .filter_map(|&row| self.products.get(row).map(|p| p.id))
            .collect()
    }

    /// Optimistically apply a bulk patch to every selected row
    pub fn apply_patch_to_selected(&mut self, patch: &BulkPatch) {
        for &row in &self.selected {
            if let Some(product) = self.products.get_mut(row) {
                if let Some(price) = patch.price {
                    product.price = price;
                }
                if let Some(msc) = patch.msc {
                    product.msc = msc;
                }
            }
        }
    }

    pub fn pending(&self) -> bool {
        self.pending
    }

    pub(crate) fn set_pending(&mut self, pending: bool) {
        self.pending = pending;
    }
}
