use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Product row. Serializes with the wire field names; the same struct is
/// what the typed client deserializes from API responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    pub user_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub stock: i32,
    pub merchant_id: Option<String>,
    pub variant_id: Option<String>,
    pub supplier_model_number: Option<String>,
    pub size: Option<String>,
    pub vendor: Option<String>,
    pub ean: Vec<String>,
    pub product_type: Vec<String>,
    pub product_group: Vec<String>,
    pub department: Vec<String>,
    pub image_url: Option<String>,
    pub msc: bool,
    pub variant_created: Option<DateTime<Utc>>,
    pub variant_updated: Option<DateTime<Utc>>,
    pub inventory_level_created: Option<DateTime<Utc>>,
    pub inventory_level_updated: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_wire_field_names() {
        let product = Product {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            name: "Product 1".to_string(),
            description: None,
            price: Decimal::new(1999, 2),
            stock: 5,
            merchant_id: Some("m-1".to_string()),
            variant_id: None,
            supplier_model_number: None,
            size: None,
            vendor: None,
            ean: vec!["1234567890123".to_string()],
            product_type: Vec::new(),
            product_group: Vec::new(),
            department: Vec::new(),
            image_url: None,
            msc: true,
            variant_created: None,
            variant_updated: None,
            inventory_level_created: None,
            inventory_level_updated: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let value = serde_json::to_value(&product).unwrap();
        assert_eq!(value["userId"], serde_json::json!(product.user_id));
        assert_eq!(value["merchantId"], "m-1");
        assert_eq!(value["msc"], true);

        let back: Product = serde_json::from_value(value).unwrap();
        assert_eq!(back, product);
    }
}
