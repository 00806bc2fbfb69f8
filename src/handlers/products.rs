use axum::{extract::Path, http::StatusCode, response::IntoResponse, Extension, Json};
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::Role;
use crate::bulk;
use crate::database::imports::ImportLogRepository;
use crate::database::products::ProductRepository;
use crate::database::{is_candidate_id, DatabaseManager, Product};
use crate::error::ApiError;
use crate::middleware::AuthUser;
use crate::schemas::{self, validate_new_product, validate_product_array, validate_product_patch};

/// GET /api/products
pub async fn list_products(
    Extension(_user): Extension<AuthUser>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = ProductRepository::new(DatabaseManager::pool().await?);
    let products = repo.list().await?;
    Ok(Json(products))
}

/// GET /api/products/:id
pub async fn get_product(
    Extension(_user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = ProductRepository::new(DatabaseManager::pool().await?);
    let product = find_product(&repo, &id).await?;
    Ok(Json(product))
}

/// POST /api/products - sellers only
pub async fn create_product(
    Extension(user): Extension<AuthUser>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, ApiError> {
    if user.role != Role::Seller {
        return Err(ApiError::forbidden(
            "Unauthorized - Only sellers can create products",
        ));
    }

    let new_product =
        validate_new_product(&body).map_err(|errors| ApiError::validation("Invalid data", errors))?;

    let repo = ProductRepository::new(DatabaseManager::pool().await?);
    let product = repo.create(user.user_id, &new_product).await?;

    Ok((StatusCode::CREATED, Json(product)))
}

/// PUT /api/products/:id - owner or admin
pub async fn update_product(
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = ProductRepository::new(DatabaseManager::pool().await?);
    let product = find_product(&repo, &id).await?;

    // Not-found is reported before the ownership check, so a missing product
    // is 404 even for non-owners.
    if product.user_id != user.user_id && user.role != Role::Admin {
        return Err(ApiError::forbidden(
            "Unauthorized - You can only update your own products",
        ));
    }

    let patch =
        validate_product_patch(&body).map_err(|errors| ApiError::validation("Invalid data", errors))?;

    let updated = repo.update(product.id, &patch).await?;
    Ok(Json(updated))
}

/// DELETE /api/products/:id - owner or admin
pub async fn delete_product(
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let repo = ProductRepository::new(DatabaseManager::pool().await?);
    let product = find_product(&repo, &id).await?;

    if product.user_id != user.user_id && user.role != Role::Admin {
        return Err(ApiError::forbidden(
            "Unauthorized - You can only delete your own products",
        ));
    }

    repo.delete(product.id).await?;
    Ok(Json(json!({ "message": "Product deleted successfully" })))
}

/// POST /api/products/import - body {fileName, uploadDate, products: [...]}
pub async fn import_products(
    Extension(user): Extension<AuthUser>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, ApiError> {
    let mut errors = schemas::FieldErrors::new();

    let file_name = match body.get("fileName").and_then(Value::as_str) {
        Some(name) if !name.is_empty() => Some(name.to_string()),
        _ => {
            errors
                .entry("fileName".to_string())
                .or_default()
                .push("File name is required".to_string());
            None
        }
    };

    let upload_date = match body.get("uploadDate") {
        None | Some(Value::Null) => Some(Utc::now()),
        Some(Value::String(raw)) => match DateTime::parse_from_rfc3339(raw) {
            Ok(date) => Some(date.with_timezone(&Utc)),
            Err(_) => {
                errors
                    .entry("uploadDate".to_string())
                    .or_default()
                    .push("Invalid date".to_string());
                None
            }
        },
        Some(_) => {
            errors
                .entry("uploadDate".to_string())
                .or_default()
                .push("Invalid date".to_string());
            None
        }
    };

    let products = match validate_product_array(body.get("products").unwrap_or(&Value::Null)) {
        Ok(products) => Some(products),
        Err(item_errors) => {
            for (field, messages) in item_errors {
                errors.insert(format!("products.{}", field), messages);
            }
            None
        }
    };

    let (Some(file_name), Some(upload_date), Some(products)) = (file_name, upload_date, products)
    else {
        return Err(ApiError::validation("Validation failed", errors));
    };

    let pool = DatabaseManager::pool().await?;
    let repo = ProductRepository::new(pool.clone());
    let count = repo.create_many(user.user_id, &products).await?;

    let imports = ImportLogRepository::new(pool);
    imports
        .record(user.user_id, &file_name, upload_date, count as i32)
        .await?;

    tracing::info!(count, file_name = %file_name, "imported products");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Products imported", "count": count })),
    ))
}

/// GET /api/products/imports - newest first
pub async fn list_imports(
    Extension(_user): Extension<AuthUser>,
) -> Result<impl IntoResponse, ApiError> {
    let imports = ImportLogRepository::new(DatabaseManager::pool().await?);
    let logs = imports.list().await?;
    Ok(Json(logs))
}

/// PUT /api/products/bulk-update
///
/// Applies one shared patch across the caller's selected rows in a single
/// batched write. Rows owned by someone else are silently excluded; the
/// count reports exactly the rows that changed.
pub async fn bulk_update(
    Extension(user): Extension<AuthUser>,
    Json(body): Json<Value>,
) -> Result<impl IntoResponse, ApiError> {
    let (ids, patch) = bulk::normalize_batch(&body)?;

    let repo = ProductRepository::new(DatabaseManager::pool().await?);
    let count = repo.bulk_update(&ids, &patch, user.user_id).await?;

    tracing::info!(
        requested = ids.len(),
        updated = count,
        "bulk product update"
    );

    Ok(Json(json!({
        "message": "Products updated successfully",
        "count": count,
    })))
}

/// Shared id-gate + lookup: malformed id -> 400 before any store round-trip,
/// charset-valid but nonexistent -> 404.
async fn find_product(repo: &ProductRepository, id: &str) -> Result<Product, ApiError> {
    if !is_candidate_id(id) {
        return Err(ApiError::bad_request("Invalid product ID"));
    }

    let Ok(uuid) = Uuid::parse_str(id) else {
        return Err(ApiError::not_found("Product not found"));
    };

    repo.get(uuid)
        .await?
        .ok_or_else(|| ApiError::not_found("Product not found"))
}
