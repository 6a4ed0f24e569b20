//! Common utility functions

pub mod phone;

pub use phone::{is_valid_mobile, mask_phone_number, normalize_mobile, phone_variants};
