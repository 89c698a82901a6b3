use crate::models::product::{Product, ProductPayload};
use crate::services::api::{ApiClient, ApiError, ApiResult};
use crate::services::products::ProductService;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(String),
}

/// Numeric coercion for form fields: invalid or empty input becomes 0.
fn coerce_decimal(input: &str) -> f64 {
    input
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(0.0)
}

/// Editable field set for the create/edit flows. Every field is held as
/// entered text and only coerced on submit, mirroring what the user typed.
pub struct ProductForm {
    pub mode: FormMode,
    pub name: String,
    pub description: String,
    pub barcode: String,
    pub sku: String,
    pub category: String,
    pub brand: String,
    pub size: String,
    pub unit: String,
    pub price: String,
    pub stock: String,
    pub min_stock: String,
    pub supplier_id: String,
    pub image_url: String,
    pub is_active: bool,
    pub error: Option<String>,
}

impl ProductForm {
    pub fn create() -> Self {
        Self {
            mode: FormMode::Create,
            name: String::new(),
            description: String::new(),
            barcode: String::new(),
            sku: String::new(),
            category: String::new(),
            brand: String::new(),
            size: String::new(),
            unit: "unidad".into(),
            price: String::new(),
            stock: String::new(),
            min_stock: String::new(),
            supplier_id: String::new(),
            image_url: String::new(),
            is_active: true,
            error: None,
        }
    }

    /// Hydrate the form from a loaded product, substituting defaults for any
    /// absent optional field.
    pub fn edit(product: &Product) -> Self {
        Self {
            mode: FormMode::Edit(product.id.clone()),
            name: product.name.clone(),
            description: product.description.clone().unwrap_or_default(),
            barcode: product.barcode.clone().unwrap_or_default(),
            sku: product.sku.clone().unwrap_or_default(),
            category: product.category.clone().unwrap_or_default(),
            brand: product.brand.clone().unwrap_or_default(),
            size: product.size.clone().unwrap_or_default(),
            unit: product.unit.clone(),
            price: product.price.to_string(),
            stock: product.stock.to_string(),
            min_stock: product.min_stock.to_string(),
            supplier_id: product.supplier_id.clone().unwrap_or_default(),
            image_url: product.image_url.clone().unwrap_or_default(),
            is_active: product.is_active,
            error: None,
        }
    }

    /// Coerce the numeric fields and map an empty supplier to an explicit
    /// null so the server clears the association.
    pub fn payload(&self) -> ProductPayload {
        ProductPayload {
            name: self.name.clone(),
            description: self.description.clone(),
            barcode: self.barcode.clone(),
            sku: self.sku.clone(),
            category: self.category.clone(),
            brand: self.brand.clone(),
            size: self.size.clone(),
            unit: self.unit.clone(),
            price: coerce_decimal(&self.price),
            stock: coerce_decimal(&self.stock),
            min_stock: coerce_decimal(&self.min_stock),
            supplier_id: if self.supplier_id.trim().is_empty() {
                None
            } else {
                Some(self.supplier_id.clone())
            },
            image_url: self.image_url.clone(),
            is_active: self.is_active,
        }
    }

    /// Submit create or update. On failure the form stays open with the error
    /// recorded, and the error is re-signaled to the caller so a parent list
    /// never assumes success.
    pub async fn submit(&mut self, api: &ApiClient) -> ApiResult<()> {
        if self.name.trim().is_empty() {
            let err = ApiError::Validation("El nombre es obligatorio".into());
            self.error = Some(err.to_string());
            return Err(err);
        }

        let payload = self.payload();
        let result = match &self.mode {
            FormMode::Create => ProductService::create(api, &payload).await,
            FormMode::Edit(id) => ProductService::update(api, id, &payload).await,
        };
        match result {
            Ok(_) => {
                self.error = None;
                Ok(())
            }
            Err(err) => {
                self.error = Some(err.to_string());
                Err(err)
            }
        }
    }
}
