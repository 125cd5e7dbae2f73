pub mod error_banner;
pub mod explanation_panel;
pub mod header;
pub mod result_panel;
pub mod spinner;
pub mod upload_area;
