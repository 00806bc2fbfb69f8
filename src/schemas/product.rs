use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;

use super::{
    coerce_decimal, coerce_integer, opt_datetime, opt_string, push_error, string_array, FieldErrors,
};

/// Validated product-creation payload. Serializes with the wire field names
/// so the typed client can send it back out unchanged.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProduct {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: Decimal,
    pub stock: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merchant_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplier_model_number: Option<String>,
    pub ean: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
    pub product_type: Vec<String>,
    pub product_group: Vec<String>,
    pub department: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub msc: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant_created: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant_updated: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inventory_level_created: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inventory_level_updated: Option<DateTime<Utc>>,
}

/// Partial-update payload: every field optional, same constraints when present
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merchant_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplier_model_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ean: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vendor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_type: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_group: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msc: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant_created: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant_updated: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inventory_level_created: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inventory_level_updated: Option<DateTime<Utc>>,
}

impl ProductPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.stock.is_none()
            && self.merchant_id.is_none()
            && self.variant_id.is_none()
            && self.supplier_model_number.is_none()
            && self.ean.is_none()
            && self.size.is_none()
            && self.vendor.is_none()
            && self.product_type.is_none()
            && self.product_group.is_none()
            && self.department.is_none()
            && self.image_url.is_none()
            && self.msc.is_none()
            && self.variant_created.is_none()
            && self.variant_updated.is_none()
            && self.inventory_level_created.is_none()
            && self.inventory_level_updated.is_none()
    }
}

/// Validate a product-creation payload.
pub fn validate_new_product(value: &Value) -> Result<NewProduct, FieldErrors> {
    let mut errors = FieldErrors::new();

    let obj = match value.as_object() {
        Some(obj) => obj,
        None => {
            push_error(&mut errors, "body", "Expected an object");
            return Err(errors);
        }
    };

    let name = match obj.get("name").and_then(Value::as_str) {
        Some(name) if name.chars().count() >= 3 => Some(name.to_string()),
        Some(_) => {
            push_error(&mut errors, "name", "Name must have at least 3 characters");
            None
        }
        None => {
            push_error(&mut errors, "name", "Name is required");
            None
        }
    };

    let price = match obj.get("price") {
        Some(raw) if !raw.is_null() => match coerce_decimal(raw) {
            Some(price) if price > Decimal::ZERO => Some(price),
            Some(_) => {
                push_error(&mut errors, "price", "Price must be greater than zero");
                None
            }
            None => {
                push_error(&mut errors, "price", "Price must be a number");
                None
            }
        },
        _ => {
            push_error(&mut errors, "price", "Price is required");
            None
        }
    };

    let stock = match obj.get("stock") {
        Some(raw) if !raw.is_null() => match coerce_integer(raw) {
            Some(stock) if stock < 0 => {
                push_error(&mut errors, "stock", "Stock cannot be negative");
                None
            }
            Some(stock) if stock > i32::MAX as i64 => {
                push_error(&mut errors, "stock", "Stock is out of range");
                None
            }
            Some(stock) => Some(stock as i32),
            None => {
                push_error(&mut errors, "stock", "Stock must be an integer");
                None
            }
        },
        _ => {
            push_error(&mut errors, "stock", "Stock is required");
            None
        }
    };

    let description = field_opt_string(obj, "description", &mut errors);
    let merchant_id = field_opt_string(obj, "merchantId", &mut errors);
    let variant_id = field_opt_string(obj, "variantId", &mut errors);
    let supplier_model_number = field_opt_string(obj, "supplierModelNumber", &mut errors);
    let size = field_opt_string(obj, "size", &mut errors);
    let vendor = field_opt_string(obj, "vendor", &mut errors);

    let ean = field_string_array(obj, "ean", &mut errors);
    let product_type = field_string_array(obj, "productType", &mut errors);
    let product_group = field_string_array(obj, "productGroup", &mut errors);
    let department = field_string_array(obj, "department", &mut errors);

    let image_url = field_url(obj, "imageUrl", &mut errors);

    let msc = match obj.get("msc") {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(_) => {
            push_error(&mut errors, "msc", "Must be a boolean");
            false
        }
    };

    let variant_created = field_datetime(obj, "variantCreated", &mut errors);
    let variant_updated = field_datetime(obj, "variantUpdated", &mut errors);
    let inventory_level_created = field_datetime(obj, "inventoryLevelCreated", &mut errors);
    let inventory_level_updated = field_datetime(obj, "inventoryLevelUpdated", &mut errors);

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(NewProduct {
        // Unwraps cannot fire here: a None for any required field always
        // records an error, and the error path returned above.
        name: name.unwrap(),
        description,
        price: price.unwrap(),
        stock: stock.unwrap(),
        merchant_id,
        variant_id,
        supplier_model_number,
        ean,
        size,
        vendor,
        product_type,
        product_group,
        department,
        image_url,
        msc,
        variant_created,
        variant_updated,
        inventory_level_created,
        inventory_level_updated,
    })
}

/// Validate a partial product update. Fields absent from the payload stay
/// `None`; fields present are held to the creation constraints.
pub fn validate_product_patch(value: &Value) -> Result<ProductPatch, FieldErrors> {
    let mut errors = FieldErrors::new();

    let obj = match value.as_object() {
        Some(obj) => obj,
        None => {
            push_error(&mut errors, "body", "Expected an object");
            return Err(errors);
        }
    };

    let mut patch = ProductPatch::default();

    match obj.get("name") {
        None | Some(Value::Null) => {}
        Some(Value::String(name)) if name.chars().count() >= 3 => {
            patch.name = Some(name.clone());
        }
        Some(_) => push_error(&mut errors, "name", "Name must have at least 3 characters"),
    }

    if let Some(raw) = obj.get("price").filter(|v| !v.is_null()) {
        match coerce_decimal(raw) {
            Some(price) if price > Decimal::ZERO => patch.price = Some(price),
            Some(_) => push_error(&mut errors, "price", "Price must be greater than zero"),
            None => push_error(&mut errors, "price", "Price must be a number"),
        }
    }

    if let Some(raw) = obj.get("stock").filter(|v| !v.is_null()) {
        match coerce_integer(raw) {
            Some(stock) if stock < 0 => push_error(&mut errors, "stock", "Stock cannot be negative"),
            Some(stock) if stock > i32::MAX as i64 => {
                push_error(&mut errors, "stock", "Stock is out of range")
            }
            Some(stock) => patch.stock = Some(stock as i32),
            None => push_error(&mut errors, "stock", "Stock must be an integer"),
        }
    }

    patch.description = field_opt_string(obj, "description", &mut errors);
    patch.merchant_id = field_opt_string(obj, "merchantId", &mut errors);
    patch.variant_id = field_opt_string(obj, "variantId", &mut errors);
    patch.supplier_model_number = field_opt_string(obj, "supplierModelNumber", &mut errors);
    patch.size = field_opt_string(obj, "size", &mut errors);
    patch.vendor = field_opt_string(obj, "vendor", &mut errors);

    for (key, slot) in [
        ("ean", &mut patch.ean),
        ("productType", &mut patch.product_type),
        ("productGroup", &mut patch.product_group),
        ("department", &mut patch.department),
    ] {
        if obj.contains_key(key) && !obj[key].is_null() {
            match string_array(obj, key) {
                Ok(items) => *slot = Some(items),
                Err(()) => push_error(&mut errors, key, "Must be an array of strings"),
            }
        }
    }

    patch.image_url = field_url(obj, "imageUrl", &mut errors);

    match obj.get("msc") {
        None | Some(Value::Null) => {}
        Some(Value::Bool(b)) => patch.msc = Some(*b),
        Some(_) => push_error(&mut errors, "msc", "Must be a boolean"),
    }

    patch.variant_created = field_datetime(obj, "variantCreated", &mut errors);
    patch.variant_updated = field_datetime(obj, "variantUpdated", &mut errors);
    patch.inventory_level_created = field_datetime(obj, "inventoryLevelCreated", &mut errors);
    patch.inventory_level_updated = field_datetime(obj, "inventoryLevelUpdated", &mut errors);

    if errors.is_empty() {
        Ok(patch)
    } else {
        Err(errors)
    }
}

/// Validate an array of product-creation payloads (bulk import).
/// Field errors are keyed `<index>.<field>` so a caller can locate the
/// offending element.
pub fn validate_product_array(value: &Value) -> Result<Vec<NewProduct>, FieldErrors> {
    let mut errors = FieldErrors::new();

    let items = match value.as_array() {
        Some(items) => items,
        None => {
            push_error(&mut errors, "products", "Expected an array of products");
            return Err(errors);
        }
    };

    let mut products = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        match validate_new_product(item) {
            Ok(product) => products.push(product),
            Err(item_errors) => {
                for (field, messages) in item_errors {
                    errors.insert(format!("{}.{}", index, field), messages);
                }
            }
        }
    }

    if errors.is_empty() {
        Ok(products)
    } else {
        Err(errors)
    }
}

fn field_opt_string(
    obj: &serde_json::Map<String, Value>,
    key: &str,
    errors: &mut FieldErrors,
) -> Option<String> {
    match opt_string(obj, key) {
        Ok(value) => value,
        Err(()) => {
            push_error(errors, key, "Must be a string");
            None
        }
    }
}

fn field_string_array(
    obj: &serde_json::Map<String, Value>,
    key: &str,
    errors: &mut FieldErrors,
) -> Vec<String> {
    match string_array(obj, key) {
        Ok(items) => items,
        Err(()) => {
            push_error(errors, key, "Must be an array of strings");
            Vec::new()
        }
    }
}

fn field_url(
    obj: &serde_json::Map<String, Value>,
    key: &str,
    errors: &mut FieldErrors,
) -> Option<String> {
    match opt_string(obj, key) {
        Ok(Some(raw)) => {
            if url::Url::parse(&raw).is_ok() {
                Some(raw)
            } else {
                push_error(errors, key, "Invalid url");
                None
            }
        }
        Ok(None) => None,
        Err(()) => {
            push_error(errors, key, "Invalid url");
            None
        }
    }
}

fn field_datetime(
    obj: &serde_json::Map<String, Value>,
    key: &str,
    errors: &mut FieldErrors,
) -> Option<DateTime<Utc>> {
    match opt_datetime(obj, key) {
        Ok(value) => value,
        Err(()) => {
            push_error(errors, key, "Invalid date");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_payload() -> Value {
        json!({
            "name": "Product 1",
            "description": "Test product 1",
            "price": 10,
            "stock": 100,
        })
    }

    #[test]
    fn accepts_minimal_product() {
        let product = validate_new_product(&valid_payload()).unwrap();
        assert_eq!(product.name, "Product 1");
        assert_eq!(product.price, Decimal::from(10));
        assert_eq!(product.stock, 100);
        assert!(product.ean.is_empty());
        assert!(!product.msc);
    }

    #[test]
    fn coerces_numeric_string_price_before_range_check() {
        let mut payload = valid_payload();
        payload["price"] = json!("19.99");
        let product = validate_new_product(&payload).unwrap();
        assert_eq!(product.price, "19.99".parse().unwrap());
    }

    #[test]
    fn zero_price_fails_with_constraint_message() {
        let mut payload = valid_payload();
        payload["price"] = json!(0);
        let errors = validate_new_product(&payload).unwrap_err();
        assert_eq!(
            errors["price"],
            vec!["Price must be greater than zero".to_string()]
        );
    }

    #[test]
    fn negative_stock_fails_with_constraint_message() {
        let mut payload = valid_payload();
        payload["stock"] = json!(-1);
        let errors = validate_new_product(&payload).unwrap_err();
        assert_eq!(errors["stock"], vec!["Stock cannot be negative".to_string()]);
    }

    #[test]
    fn short_name_fails() {
        let mut payload = valid_payload();
        payload["name"] = json!("");
        let errors = validate_new_product(&payload).unwrap_err();
        assert_eq!(
            errors["name"],
            vec!["Name must have at least 3 characters".to_string()]
        );
    }

    #[test]
    fn missing_required_fields_are_enumerated_exactly() {
        let errors = validate_new_product(&json!({"description": "no name"})).unwrap_err();
        assert_eq!(errors["name"], vec!["Name is required".to_string()]);
        assert_eq!(errors["price"], vec!["Price is required".to_string()]);
        assert_eq!(errors["stock"], vec!["Stock is required".to_string()]);
        assert_eq!(errors.len(), 3);
    }

    #[test]
    fn array_fields_default_to_empty_sequences() {
        let product = validate_new_product(&valid_payload()).unwrap();
        assert!(product.product_type.is_empty());
        assert!(product.product_group.is_empty());
        assert!(product.department.is_empty());
    }

    #[test]
    fn rejects_malformed_image_url() {
        let mut payload = valid_payload();
        payload["imageUrl"] = json!("not a url");
        let errors = validate_new_product(&payload).unwrap_err();
        assert_eq!(errors["imageUrl"], vec!["Invalid url".to_string()]);
    }

    #[test]
    fn accepts_merchant_metadata() {
        let payload = json!({
            "name": "Product 1",
            "price": "10",
            "stock": "5",
            "merchantId": "m-1",
            "ean": ["1234567890123"],
            "productType": ["shoes"],
            "imageUrl": "https://example.com/p.jpg",
            "variantCreated": "2024-01-15T10:00:00Z",
            "msc": true,
        });
        let product = validate_new_product(&payload).unwrap();
        assert_eq!(product.merchant_id.as_deref(), Some("m-1"));
        assert_eq!(product.ean, vec!["1234567890123"]);
        assert!(product.msc);
        assert!(product.variant_created.is_some());
    }

    #[test]
    fn patch_allows_sparse_fields_with_same_constraints() {
        let patch = validate_product_patch(&json!({"price": "15"})).unwrap();
        assert_eq!(patch.price, Some(Decimal::from(15)));
        assert!(patch.name.is_none());
        assert!(patch.stock.is_none());

        let errors = validate_product_patch(&json!({"price": 0})).unwrap_err();
        assert_eq!(
            errors["price"],
            vec!["Price must be greater than zero".to_string()]
        );
    }

    #[test]
    fn empty_patch_is_valid_and_empty() {
        let patch = validate_product_patch(&json!({})).unwrap();
        assert!(patch.is_empty());
    }

    #[test]
    fn array_validation_keys_errors_by_index() {
        let payload = json!([
            {"name": "Product 1", "price": 10, "stock": 1},
            {"name": "Pr", "price": 0, "stock": 1},
        ]);
        let errors = validate_product_array(&payload).unwrap_err();
        assert_eq!(
            errors["1.name"],
            vec!["Name must have at least 3 characters".to_string()]
        );
        assert_eq!(
            errors["1.price"],
            vec!["Price must be greater than zero".to_string()]
        );
        assert!(errors.get("0.name").is_none());
    }

    #[test]
    fn array_validation_accepts_all_valid() {
        let payload = json!([
            {"name": "Product 1", "price": 10, "stock": 1},
            {"name": "Product 2", "price": "2.50", "stock": "7"},
        ]);
        let products = validate_product_array(&payload).unwrap();
        assert_eq!(products.len(), 2);
        assert_eq!(products[1].stock, 7);
    }
}
