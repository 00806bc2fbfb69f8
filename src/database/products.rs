use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::bulk::BulkPatch;
use crate::database::manager::DatabaseError;
use crate::database::models::Product;
use crate::schemas::{NewProduct, ProductPatch};

const PRODUCT_COLUMNS: &str = "id, user_id, name, description, price, stock, \
     merchant_id, variant_id, supplier_model_number, size, vendor, \
     ean, product_type, product_group, department, image_url, msc, \
     variant_created, variant_updated, inventory_level_created, inventory_level_updated, \
     created_at, updated_at";

pub struct ProductRepository {
    pool: PgPool,
}

impl ProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new product owned by `owner_id`. Id and timestamps are
    /// server-generated.
    pub async fn create(
        &self,
        owner_id: Uuid,
        product: &NewProduct,
    ) -> Result<Product, DatabaseError> {
        let sql = format!(
            "INSERT INTO products (id, user_id, name, description, price, stock, \
             merchant_id, variant_id, supplier_model_number, size, vendor, \
             ean, product_type, product_group, department, image_url, msc, \
             variant_created, variant_updated, inventory_level_created, inventory_level_updated) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, \
             $18, $19, $20, $21) \
             RETURNING {PRODUCT_COLUMNS}"
        );

        let created = sqlx::query_as::<_, Product>(&sql)
            .bind(Uuid::new_v4())
            .bind(owner_id)
            .bind(&product.name)
            .bind(&product.description)
            .bind(product.price)
            .bind(product.stock)
            .bind(&product.merchant_id)
            .bind(&product.variant_id)
            .bind(&product.supplier_model_number)
            .bind(&product.size)
            .bind(&product.vendor)
            .bind(&product.ean)
            .bind(&product.product_type)
            .bind(&product.product_group)
            .bind(&product.department)
            .bind(&product.image_url)
            .bind(product.msc)
            .bind(product.variant_created)
            .bind(product.variant_updated)
            .bind(product.inventory_level_created)
            .bind(product.inventory_level_updated)
            .fetch_one(&self.pool)
            .await?;

        Ok(created)
    }

    pub async fn list(&self) -> Result<Vec<Product>, DatabaseError> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products ORDER BY created_at");
        let products = sqlx::query_as::<_, Product>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(products)
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<Product>, DatabaseError> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = $1");
        let product = sqlx::query_as::<_, Product>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(product)
    }

    /// Apply a sparse patch to one product. Only fields present in the patch
    /// are written; `updated_at` is always restamped.
    pub async fn update(&self, id: Uuid, patch: &ProductPatch) -> Result<Product, DatabaseError> {
        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new("UPDATE products SET updated_at = now()");

        if let Some(name) = &patch.name {
            qb.push(", name = ").push_bind(name);
        }
        if let Some(description) = &patch.description {
            qb.push(", description = ").push_bind(description);
        }
        if let Some(price) = patch.price {
            qb.push(", price = ").push_bind(price);
        }
        if let Some(stock) = patch.stock {
            qb.push(", stock = ").push_bind(stock);
        }
        if let Some(merchant_id) = &patch.merchant_id {
            qb.push(", merchant_id = ").push_bind(merchant_id);
        }
        if let Some(variant_id) = &patch.variant_id {
            qb.push(", variant_id = ").push_bind(variant_id);
        }
        if let Some(supplier_model_number) = &patch.supplier_model_number {
            qb.push(", supplier_model_number = ")
                .push_bind(supplier_model_number);
        }
        if let Some(size) = &patch.size {
            qb.push(", size = ").push_bind(size);
        }
        if let Some(vendor) = &patch.vendor {
            qb.push(", vendor = ").push_bind(vendor);
        }
        if let Some(ean) = &patch.ean {
            qb.push(", ean = ").push_bind(ean);
        }
        if let Some(product_type) = &patch.product_type {
            qb.push(", product_type = ").push_bind(product_type);
        }
        if let Some(product_group) = &patch.product_group {
            qb.push(", product_group = ").push_bind(product_group);
        }
        if let Some(department) = &patch.department {
            qb.push(", department = ").push_bind(department);
        }
        if let Some(image_url) = &patch.image_url {
            qb.push(", image_url = ").push_bind(image_url);
        }
        if let Some(msc) = patch.msc {
            qb.push(", msc = ").push_bind(msc);
        }
        if let Some(variant_created) = patch.variant_created {
            qb.push(", variant_created = ").push_bind(variant_created);
        }
        if let Some(variant_updated) = patch.variant_updated {
            qb.push(", variant_updated = ").push_bind(variant_updated);
        }
        if let Some(inventory_level_created) = patch.inventory_level_created {
            qb.push(", inventory_level_created = ")
                .push_bind(inventory_level_created);
        }
        if let Some(inventory_level_updated) = patch.inventory_level_updated {
            qb.push(", inventory_level_updated = ")
                .push_bind(inventory_level_updated);
        }

        qb.push(" WHERE id = ").push_bind(id);
        qb.push(format!(" RETURNING {PRODUCT_COLUMNS}"));

        qb.build_query_as::<Product>()
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::NotFound("Product not found".to_string()))
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), DatabaseError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound("Product not found".to_string()));
        }
        Ok(())
    }

    /// Batched insert for imports; all rows land in one transaction.
    pub async fn create_many(
        &self,
        owner_id: Uuid,
        products: &[NewProduct],
    ) -> Result<u64, DatabaseError> {
        let mut tx = self.pool.begin().await?;
        let mut count = 0u64;

        for product in products {
            sqlx::query(
                "INSERT INTO products (id, user_id, name, description, price, stock, \
                 merchant_id, variant_id, supplier_model_number, size, vendor, \
                 ean, product_type, product_group, department, image_url, msc, \
                 variant_created, variant_updated, inventory_level_created, inventory_level_updated) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, \
                 $18, $19, $20, $21)",
            )
            .bind(Uuid::new_v4())
            .bind(owner_id)
            .bind(&product.name)
            .bind(&product.description)
            .bind(product.price)
            .bind(product.stock)
            .bind(&product.merchant_id)
            .bind(&product.variant_id)
            .bind(&product.supplier_model_number)
            .bind(&product.size)
            .bind(&product.vendor)
            .bind(&product.ean)
            .bind(&product.product_type)
            .bind(&product.product_group)
            .bind(&product.department)
            .bind(&product.image_url)
            .bind(product.msc)
            .bind(product.variant_created)
            .bind(product.variant_updated)
            .bind(product.inventory_level_created)
            .bind(product.inventory_level_updated)
            .execute(&mut *tx)
            .await?;
            count += 1;
        }

        tx.commit().await?;
        Ok(count)
    }

    /// One batched write scoped to the caller's own rows. Rows in the id set
    /// that belong to other owners are silently excluded; the returned count
    /// is exactly the caller-owned subset that matched.
    pub async fn bulk_update(
        &self,
        ids: &[Uuid],
        patch: &BulkPatch,
        owner_id: Uuid,
    ) -> Result<u64, DatabaseError> {
        if ids.is_empty() || patch.is_empty() {
            return Ok(0);
        }

        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new("UPDATE products SET updated_at = now()");

        if let Some(price) = patch.price {
            qb.push(", price = ").push_bind(price);
        }
        if let Some(msc) = patch.msc {
            qb.push(", msc = ").push_bind(msc);
        }

        qb.push(" WHERE id = ANY(").push_bind(ids);
        qb.push(") AND user_id = ").push_bind(owner_id);

        let result = qb.build().execute(&self.pool).await?;
        Ok(result.rows_affected())
    }
}
