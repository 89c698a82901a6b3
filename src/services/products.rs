use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use serde_json::Value;

use super::api::{ApiClient, ApiError, ApiResult};
use crate::models::import::BulkImportResult;
use crate::models::product::{Product, ProductPage, ProductPayload, ProductQuery, ProductResponse};

/// Typed wrappers over the product and bulk-import endpoints.
pub struct ProductService;

impl ProductService {
    pub async fn list(api: &ApiClient, query: &ProductQuery) -> ApiResult<ProductPage> {
        api.get_with_query("/api/products", &query.to_params()).await
    }

    pub async fn get(api: &ApiClient, id: &str) -> ApiResult<Product> {
        let response: ProductResponse = api.get(&format!("/api/products/{id}")).await?;
        Ok(response.product)
    }

    pub async fn create(api: &ApiClient, payload: &ProductPayload) -> ApiResult<Value> {
        api.post("/api/products", payload).await
    }

    pub async fn update(api: &ApiClient, id: &str, payload: &ProductPayload) -> ApiResult<Value> {
        api.put(&format!("/api/products/{id}"), payload).await
    }

    /// DELETE is a soft-deactivation server-side; the record survives with
    /// `is_active = false`.
    pub async fn deactivate(api: &ApiClient, id: &str) -> ApiResult<Value> {
        api.delete(&format!("/api/products/{id}")).await
    }

    pub async fn bulk_upload(
        api: &ApiClient,
        filename: &str,
        bytes: Vec<u8>,
    ) -> ApiResult<BulkImportResult> {
        let mut part = Part::bytes(bytes).file_name(filename.to_string());
        if let Some(mime) = mime_guess::from_path(filename).first_raw() {
            part = part
                .mime_str(mime)
                .map_err(|_| ApiError::Validation("Tipo de archivo inválido".into()))?;
        }
        let form = Form::new().part("file", part);
        api.post_multipart("/api/excel/products/upload", form).await
    }

    pub async fn download_template(api: &ApiClient) -> ApiResult<Bytes> {
        api.get_bytes("/api/excel/products/template").await
    }
}
