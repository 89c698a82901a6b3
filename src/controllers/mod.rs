pub mod bulk_import;
pub mod navigation;
pub mod password_reset;
pub mod product_form;
pub mod product_list;
