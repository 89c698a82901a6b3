use serde::{Deserialize, Serialize};

fn default_unit() -> String {
    "unidad".into()
}

fn default_true() -> bool {
    true
}

/// Product record as served by the inventory API. "Deleting" a product is a
/// soft-deactivation on the server side; this client never hard-deletes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub barcode: Option<String>,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub size: Option<String>,
    #[serde(default = "default_unit")]
    pub unit: String,
    pub price: f64,
    pub stock: f64,
    #[serde(default)]
    pub min_stock: f64,
    #[serde(default)]
    pub supplier_id: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

/// One page of the product listing.
#[derive(Debug, Clone, Deserialize)]
pub struct ProductPage {
    #[serde(default)]
    pub products: Vec<Product>,
    #[serde(default)]
    pub total: u64,
}

/// Envelope of GET /api/products/:id.
#[derive(Debug, Deserialize)]
pub struct ProductResponse {
    pub product: Product,
}

/// Body for create and update. Optional text fields travel as empty strings;
/// `supplier_id` is an explicit null when unset so the server clears it.
#[derive(Debug, Clone, Serialize)]
pub struct ProductPayload {
    pub name: String,
    pub description: String,
    pub barcode: String,
    pub sku: String,
    pub category: String,
    pub brand: String,
    pub size: String,
    pub unit: String,
    pub price: f64,
    pub stock: f64,
    pub min_stock: f64,
    pub supplier_id: Option<String>,
    pub image_url: String,
    pub is_active: bool,
}

/// Query parameters for GET /api/products. A parameter whose value is empty
/// or false is omitted entirely so the server defaults apply.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductQuery {
    pub search: String,
    pub category: String,
    pub brand: String,
    pub low_stock: bool,
    pub show_inactive: bool,
    pub limit: u32,
    pub offset: u32,
}

impl ProductQuery {
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if !self.search.is_empty() {
            params.push(("search", self.search.clone()));
        }
        if !self.category.is_empty() {
            params.push(("category", self.category.clone()));
        }
        if !self.brand.is_empty() {
            params.push(("brand", self.brand.clone()));
        }
        if self.low_stock {
            params.push(("low_stock", "true".into()));
        }
        if self.show_inactive {
            params.push(("is_active", "false".into()));
        }
        params.push(("limit", self.limit.to_string()));
        params.push(("offset", self.offset.to_string()));
        params
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falsy_filters_are_omitted() {
        let query = ProductQuery {
            limit: 10,
            offset: 0,
            ..Default::default()
        };
        let params = query.to_params();
        assert_eq!(
            params,
            vec![("limit", "10".to_string()), ("offset", "0".to_string())]
        );
    }

    #[test]
    fn active_filters_are_included() {
        let query = ProductQuery {
            search: "aceite".into(),
            category: "Aceites".into(),
            brand: String::new(),
            low_stock: true,
            show_inactive: true,
            limit: 20,
            offset: 40,
        };
        let params = query.to_params();
        assert!(params.contains(&("search", "aceite".to_string())));
        assert!(params.contains(&("category", "Aceites".to_string())));
        assert!(!params.iter().any(|(k, _)| *k == "brand"));
        assert!(params.contains(&("low_stock", "true".to_string())));
        // Showing inactive products means asking the server for is_active=false.
        assert!(params.contains(&("is_active", "false".to_string())));
        assert!(params.contains(&("limit", "20".to_string())));
        assert!(params.contains(&("offset", "40".to_string())));
    }

    #[test]
    fn payload_serializes_unset_supplier_as_null() {
        let payload = ProductPayload {
            name: "Aceite".into(),
            description: String::new(),
            barcode: String::new(),
            sku: String::new(),
            category: String::new(),
            brand: String::new(),
            size: String::new(),
            unit: "unidad".into(),
            price: 10.0,
            stock: 5.0,
            min_stock: 1.0,
            supplier_id: None,
            image_url: String::new(),
            is_active: true,
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert!(value["supplier_id"].is_null());
    }
}
