//! Typed API client and the client half of the bulk sync pipeline.
//!
//! Replaces the original single-page app's service/context layer with an
//! explicit async pipeline over [`ProductListState`]: optimistic local
//! mutation, one network round trip, then selection/form reset once the
//! request settles.

pub mod state;

pub use state::{ProductListState, UploadFileMeta};

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::bulk::BulkPatch;
use crate::database::{ImportLog, Product};
use crate::schemas::NewProduct;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// Server answered with an error status; message is the server-provided one
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("not authenticated")]
    MissingToken,

    #[error("a bulk update is already in flight")]
    RequestInFlight,

    #[error("{0}")]
    Form(String),
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserSummary {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub role: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserSummary,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BulkUpdateOutcome {
    pub message: String,
    pub count: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ImportOutcome {
    pub message: String,
    pub count: u64,
}

/// Bulk-update form state: either field may be independently blank. The
/// price arrives as the raw text-input string and is validated before use.
#[derive(Debug, Clone, Default)]
pub struct BulkForm {
    pub price: Option<String>,
    pub msc: Option<bool>,
}

impl BulkForm {
    pub fn is_empty(&self) -> bool {
        self.price.is_none() && self.msc.is_none()
    }

    fn to_patch(&self) -> Result<BulkPatch, ClientError> {
        let price = match &self.price {
            None => None,
            Some(raw) => {
                let price: rust_decimal::Decimal = raw
                    .trim()
                    .parse()
                    .map_err(|_| ClientError::Form("Price must be a number".to_string()))?;
                if price <= rust_decimal::Decimal::ZERO {
                    return Err(ClientError::Form(
                        "Price must be greater than zero".to_string(),
                    ));
                }
                Some(price)
            }
        };

        Ok(BulkPatch {
            price,
            msc: self.msc,
        })
    }
}

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
            token: None,
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn set_token(&mut self, token: impl Into<String>) {
        self.token = Some(token.into());
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn bearer(&self) -> Result<&str, ClientError> {
        self.token.as_deref().ok_or(ClientError::MissingToken)
    }

    /// Map a non-success response into the server-provided `{message}`
    async fn check(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let message = response
            .json::<Value>()
            .await
            .ok()
            .and_then(|body| body.get("message").and_then(Value::as_str).map(String::from))
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .map(String::from)
                    .unwrap_or_else(|| status.to_string())
            });

        Err(ClientError::Api {
            status: status.as_u16(),
            message,
        })
    }

    /// POST /api/auth/register; stores the returned token for later calls
    pub async fn register(
        &mut self,
        name: &str,
        email: &str,
        password: &str,
        role: &str,
    ) -> Result<AuthResponse, ClientError> {
        let response = self
            .http
            .post(self.url("/api/auth/register"))
            .json(&json!({
                "name": name,
                "email": email,
                "password": password,
                "role": role,
            }))
            .send()
            .await?;

        let auth: AuthResponse = Self::check(response).await?.json().await?;
        self.token = Some(auth.token.clone());
        Ok(auth)
    }

    /// POST /api/auth/login; stores the returned token for later calls
    pub async fn login(&mut self, email: &str, password: &str) -> Result<AuthResponse, ClientError> {
        let response = self
            .http
            .post(self.url("/api/auth/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        let auth: AuthResponse = Self::check(response).await?.json().await?;
        self.token = Some(auth.token.clone());
        Ok(auth)
    }

    pub async fn products(&self) -> Result<Vec<Product>, ClientError> {
        let response = self
            .http
            .get(self.url("/api/products"))
            .bearer_auth(self.bearer()?)
            .send()
            .await?;

        Ok(Self::check(response).await?.json().await?)
    }

    pub async fn product(&self, id: Uuid) -> Result<Product, ClientError> {
        let response = self
            .http
            .get(self.url(&format!("/api/products/{id}")))
            .bearer_auth(self.bearer()?)
            .send()
            .await?;

        Ok(Self::check(response).await?.json().await?)
    }

    pub async fn create_product(&self, product: &NewProduct) -> Result<Product, ClientError> {
        let response = self
            .http
            .post(self.url("/api/products"))
            .bearer_auth(self.bearer()?)
            .json(product)
            .send()
            .await?;

        Ok(Self::check(response).await?.json().await?)
    }

    /// Send one row's full current state to the single-update endpoint
    pub async fn update_product(&self, product: &Product) -> Result<Product, ClientError> {
        let response = self
            .http
            .put(self.url(&format!("/api/products/{}", product.id)))
            .bearer_auth(self.bearer()?)
            .json(product)
            .send()
            .await?;

        Ok(Self::check(response).await?.json().await?)
    }

    pub async fn delete_product(&self, id: Uuid) -> Result<(), ClientError> {
        let response = self
            .http
            .delete(self.url(&format!("/api/products/{id}")))
            .bearer_auth(self.bearer()?)
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }

    pub async fn import_products(
        &self,
        file_name: &str,
        upload_date: DateTime<Utc>,
        products: &[NewProduct],
    ) -> Result<ImportOutcome, ClientError> {
        let response = self
            .http
            .post(self.url("/api/products/import"))
            .bearer_auth(self.bearer()?)
            .json(&json!({
                "fileName": file_name,
                "uploadDate": upload_date,
                "products": products,
            }))
            .send()
            .await?;

        Ok(Self::check(response).await?.json().await?)
    }

    pub async fn imports(&self) -> Result<Vec<ImportLog>, ClientError> {
        let response = self
            .http
            .get(self.url("/api/products/imports"))
            .bearer_auth(self.bearer()?)
            .send()
            .await?;

        Ok(Self::check(response).await?.json().await?)
    }

    /// PUT /api/products/bulk-update with a pre-expanded record list
    pub async fn bulk_update_records(
        &self,
        records: &[Value],
    ) -> Result<BulkUpdateOutcome, ClientError> {
        let response = self
            .http
            .put(self.url("/api/products/bulk-update"))
            .bearer_auth(self.bearer()?)
            .json(&json!({ "products": records }))
            .send()
            .await?;

        Ok(Self::check(response).await?.json().await?)
    }
}

/// The client half of the bulk sync pipeline.
///
/// Expands the shared form patch into one `{id, ...patch}` record per
/// selected row, applies the patch optimistically to the local list, then
/// issues the request. Selection and pending state are cleared after the
/// request settles regardless of outcome; a failed server write is logged
/// and returned but the optimistic local state is not rolled back.
///
/// Returns `Ok(None)` when the form or selection is empty (the UI disables
/// the trigger in that state; the server independently rejects such
/// requests). A second call while one is in flight fails with
/// [`ClientError::RequestInFlight`] before touching any state.
pub async fn bulk_update(
    state: &mut ProductListState,
    api: &ApiClient,
    form: &BulkForm,
) -> Result<Option<BulkUpdateOutcome>, ClientError> {
    if form.is_empty() || state.selection_is_empty() {
        return Ok(None);
    }
    if state.pending() {
        return Err(ClientError::RequestInFlight);
    }

    let patch = form.to_patch()?;

    let records: Vec<Value> = state
        .selected_ids()
        .into_iter()
        .map(|id| {
            let mut record = json!({ "id": id });
            if let Some(price) = &form.price {
                record["price"] = json!(price);
            }
            if let Some(msc) = form.msc {
                record["msc"] = json!(msc);
            }
            record
        })
        .collect();

    state.set_pending(true);
    state.apply_patch_to_selected(&patch);

    let result = api.bulk_update_records(&records).await;

    state.set_pending(false);
    state.clear_selection();

    match result {
        Ok(outcome) => Ok(Some(outcome)),
        Err(err) => {
            tracing::warn!("bulk update failed: {}", err);
            Err(err)
        }
    }
}
