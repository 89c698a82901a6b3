use tracing::debug;

use crate::models::product::{Product, ProductPage, ProductQuery};
use crate::services::api::{ApiClient, ApiResult};
use crate::services::products::ProductService;

/// Row-level stock state, derived purely from `(stock, min_stock)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockStatus {
    Out,
    Low,
    Ok,
}

pub fn stock_status(stock: f64, min_stock: f64) -> StockStatus {
    if stock <= 0.0 {
        StockStatus::Out
    } else if stock <= min_stock {
        StockStatus::Low
    } else {
        StockStatus::Ok
    }
}

impl StockStatus {
    pub fn label(self) -> &'static str {
        match self {
            StockStatus::Out => "Sin stock",
            StockStatus::Low => "Stock bajo",
            StockStatus::Ok => "En stock",
        }
    }
}

/// A deactivation staged behind an explicit confirmation step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingDeactivate {
    pub id: String,
    pub name: String,
}

/// State machine behind the product table: search text, filter set, page
/// size/offset and the derived pagination metadata. Changing anything but the
/// page itself snaps back to page 1 so results always start from a consistent
/// first page.
pub struct ProductListController {
    pub search_term: String,
    pub category: String,
    pub brand: String,
    pub low_stock: bool,
    pub show_inactive: bool,
    pub page_size: u32,
    pub current_page: u32,
    pub total: u64,
    pub products: Vec<Product>,
    pub error: Option<String>,
    pending_deactivate: Option<PendingDeactivate>,
    load_seq: u64,
}

impl Default for ProductListController {
    fn default() -> Self {
        Self::new()
    }
}

impl ProductListController {
    pub fn new() -> Self {
        Self {
            search_term: String::new(),
            category: String::new(),
            brand: String::new(),
            low_stock: false,
            show_inactive: false,
            page_size: 10,
            current_page: 1,
            total: 0,
            products: Vec::new(),
            error: None,
            pending_deactivate: None,
            load_seq: 0,
        }
    }

    pub fn set_search(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
        self.current_page = 1;
    }

    pub fn set_category(&mut self, category: impl Into<String>) {
        self.category = category.into();
        self.current_page = 1;
    }

    pub fn set_brand(&mut self, brand: impl Into<String>) {
        self.brand = brand.into();
        self.current_page = 1;
    }

    pub fn set_low_stock(&mut self, low_stock: bool) {
        self.low_stock = low_stock;
        self.current_page = 1;
    }

    pub fn set_show_inactive(&mut self, show_inactive: bool) {
        self.show_inactive = show_inactive;
        self.current_page = 1;
    }

    pub fn set_page_size(&mut self, page_size: u32) {
        self.page_size = page_size.max(1);
        self.current_page = 1;
    }

    /// Moving between pages keeps the rest of the state intact.
    pub fn set_page(&mut self, page: u32) {
        self.current_page = page.max(1);
    }

    pub fn query(&self) -> ProductQuery {
        ProductQuery {
            search: self.search_term.clone(),
            category: self.category.clone(),
            brand: self.brand.clone(),
            low_stock: self.low_stock,
            show_inactive: self.show_inactive,
            limit: self.page_size,
            offset: (self.current_page - 1) * self.page_size,
        }
    }

    /// Stamp a load. Responses are paired with the stamp they were issued
    /// under and only the latest stamp is allowed to land, so a slow response
    /// can never overwrite the results of a fresher filter state.
    pub fn begin_load(&mut self) -> (u64, ProductQuery) {
        self.load_seq += 1;
        (self.load_seq, self.query())
    }

    /// Apply a finished load. Returns false when the response was stale and
    /// got discarded. A failed load records the message without clearing the
    /// rows already on screen.
    pub fn apply_load(&mut self, seq: u64, result: ApiResult<ProductPage>) -> bool {
        if seq != self.load_seq {
            debug!(seq, latest = self.load_seq, "discarding stale product page");
            return false;
        }
        match result {
            Ok(page) => {
                self.products = page.products;
                self.total = page.total;
                self.error = None;
            }
            Err(err) => {
                self.error = Some(err.to_string());
            }
        }
        true
    }

    /// Issue the list request for the current state. Failures land in
    /// `self.error`, never out of this method.
    pub async fn load(&mut self, api: &ApiClient) {
        let (seq, query) = self.begin_load();
        let result = ProductService::list(api, &query).await;
        self.apply_load(seq, result);
    }

    pub fn total_pages(&self) -> u32 {
        (self.total as u32).div_ceil(self.page_size)
    }

    /// First row number of the "showing X - Y of N" label; 0 when empty.
    pub fn start_item(&self) -> u64 {
        if self.total == 0 {
            0
        } else {
            (self.current_page as u64 - 1) * self.page_size as u64 + 1
        }
    }

    /// Last row number of the label, clamped to the total.
    pub fn end_item(&self) -> u64 {
        (self.current_page as u64 * self.page_size as u64).min(self.total)
    }

    /// At most 5 page buttons: all of them when they fit, otherwise a 5-wide
    /// window around the current page clamped to the first and last pages.
    pub fn page_window(&self) -> Vec<u32> {
        let total_pages = self.total_pages();
        let current = self.current_page;
        let count = total_pages.min(5);
        (0..count)
            .map(|i| {
                if total_pages <= 5 {
                    i + 1
                } else if current <= 3 {
                    i + 1
                } else if current >= total_pages - 2 {
                    total_pages - 4 + i
                } else {
                    current - 2 + i
                }
            })
            .collect()
    }

    /// Stage a deactivation; nothing is sent until it is confirmed.
    pub fn begin_deactivate(&mut self, id: impl Into<String>, name: impl Into<String>) {
        self.pending_deactivate = Some(PendingDeactivate {
            id: id.into(),
            name: name.into(),
        });
    }

    pub fn pending_deactivate(&self) -> Option<&PendingDeactivate> {
        self.pending_deactivate.as_ref()
    }

    pub fn cancel_deactivate(&mut self) {
        self.pending_deactivate = None;
    }

    /// Issue the staged deactivation. On success the current page is reloaded
    /// in place; on failure the server error is returned without touching the
    /// local rows.
    pub async fn confirm_deactivate(&mut self, api: &ApiClient) -> ApiResult<()> {
        let Some(pending) = self.pending_deactivate.take() else {
            return Ok(());
        };
        ProductService::deactivate(api, &pending.id).await?;
        self.load(api).await;
        Ok(())
    }

    /// Reload after an external change (e.g. a finished bulk import).
    pub async fn refresh(&mut self, api: &ApiClient) {
        self.load(api).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::api::ApiError;

    fn controller_with(total: u64, page_size: u32, current_page: u32) -> ProductListController {
        let mut c = ProductListController::new();
        c.page_size = page_size;
        c.current_page = current_page;
        c.total = total;
        c
    }

    #[test]
    fn stock_status_thresholds() {
        assert_eq!(stock_status(0.0, 5.0), StockStatus::Out);
        assert_eq!(stock_status(-1.0, 5.0), StockStatus::Out);
        assert_eq!(stock_status(3.0, 5.0), StockStatus::Low);
        assert_eq!(stock_status(5.0, 5.0), StockStatus::Low);
        assert_eq!(stock_status(10.0, 5.0), StockStatus::Ok);
    }

    #[test]
    fn filters_reset_page_to_first() {
        let mut c = controller_with(100, 10, 7);
        c.set_search("aceite");
        assert_eq!(c.current_page, 1);

        c.current_page = 7;
        c.set_category("Aceites");
        assert_eq!(c.current_page, 1);

        c.current_page = 7;
        c.set_brand("La Española");
        assert_eq!(c.current_page, 1);

        c.current_page = 7;
        c.set_low_stock(true);
        assert_eq!(c.current_page, 1);

        c.current_page = 7;
        c.set_show_inactive(true);
        assert_eq!(c.current_page, 1);

        c.current_page = 7;
        c.set_page_size(20);
        assert_eq!(c.current_page, 1);
    }

    #[test]
    fn page_change_does_not_reset() {
        let mut c = controller_with(100, 10, 1);
        c.set_page(4);
        assert_eq!(c.current_page, 4);
        assert_eq!(c.query().offset, 30);
    }

    #[test]
    fn showing_label_bounds() {
        let c = controller_with(42, 10, 3);
        assert_eq!(c.start_item(), 21);
        assert_eq!(c.end_item(), 30);

        let c = controller_with(42, 10, 5);
        assert_eq!(c.start_item(), 41);
        assert_eq!(c.end_item(), 42);

        let c = controller_with(0, 10, 1);
        assert_eq!(c.start_item(), 0);
        assert_eq!(c.end_item(), 0);
    }

    #[test]
    fn total_pages_rounds_up() {
        assert_eq!(controller_with(42, 10, 1).total_pages(), 5);
        assert_eq!(controller_with(40, 10, 1).total_pages(), 4);
        assert_eq!(controller_with(0, 10, 1).total_pages(), 0);
    }

    #[test]
    fn page_window_small_totals_show_everything() {
        let c = controller_with(30, 10, 2);
        assert_eq!(c.page_window(), vec![1, 2, 3]);
    }

    #[test]
    fn page_window_clamps_at_both_ends() {
        let c = controller_with(120, 10, 1);
        assert_eq!(c.page_window(), vec![1, 2, 3, 4, 5]);

        let c = controller_with(120, 10, 12);
        assert_eq!(c.page_window(), vec![8, 9, 10, 11, 12]);

        let c = controller_with(120, 10, 6);
        assert_eq!(c.page_window(), vec![4, 5, 6, 7, 8]);
    }

    #[test]
    fn query_assembles_pagination_parameters() {
        let mut c = ProductListController::new();
        c.set_search("harina");
        c.set_page_size(20);
        c.set_page(3);
        let query = c.query();
        assert_eq!(query.search, "harina");
        assert_eq!(query.limit, 20);
        assert_eq!(query.offset, 40);
    }

    #[test]
    fn stale_response_is_discarded() {
        let mut c = ProductListController::new();
        let (old_seq, _) = c.begin_load();
        let (new_seq, _) = c.begin_load();

        let stale = ProductPage {
            products: Vec::new(),
            total: 999,
        };
        assert!(!c.apply_load(old_seq, Ok(stale)));
        assert_eq!(c.total, 0);

        let fresh = ProductPage {
            products: Vec::new(),
            total: 7,
        };
        assert!(c.apply_load(new_seq, Ok(fresh)));
        assert_eq!(c.total, 7);
    }

    #[test]
    fn failed_load_keeps_rows_and_records_error() {
        let mut c = ProductListController::new();
        c.total = 5;
        let (seq, _) = c.begin_load();
        c.apply_load(
            seq,
            Err(ApiError::Api {
                status: reqwest::StatusCode::INTERNAL_SERVER_ERROR,
                message: "se rompió".into(),
            }),
        );
        assert_eq!(c.error.as_deref(), Some("se rompió"));
        assert_eq!(c.total, 5);
    }

    #[test]
    fn deactivate_is_staged_until_confirmed() {
        let mut c = ProductListController::new();
        c.begin_deactivate("p-1", "Aceite");
        assert_eq!(c.pending_deactivate().unwrap().name, "Aceite");
        c.cancel_deactivate();
        assert!(c.pending_deactivate().is_none());
    }
}
