//! Phone number utilities

use once_cell::sync::Lazy;
use regex::Regex;

/// National subscriber number: exactly 10 digits
static MOBILE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{10}$").unwrap());

/// Strip everything except ASCII digits
///
/// `"+91 98765-43210"` becomes `"919876543210"`, `"(987) 654 3210"` becomes
/// `"9876543210"`.
pub fn normalize_mobile(phone: &str) -> String {
    phone.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Check that a phone number normalizes to exactly 10 digits
pub fn is_valid_mobile(phone: &str) -> bool {
    MOBILE_REGEX.is_match(&normalize_mobile(phone))
}

/// Mask a phone number for logs, keeping the last four digits (`******3210`)
pub fn mask_phone_number(phone: &str) -> String {
    let normalized = normalize_mobile(phone);
    let len = normalized.len();
    if len > 4 {
        format!("{}{}", "*".repeat(len - 4), &normalized[len - 4..])
    } else {
        "****".to_string()
    }
}

/// Stored representations that identify the same subscriber
///
/// User records may hold either the bare number or the number prefixed with
/// the default country code.
pub fn phone_variants(mobile: &str, country_code: &str) -> Vec<String> {
    let bare = normalize_mobile(mobile);
    let mut variants = vec![bare.clone()];
    if !country_code.is_empty() {
        variants.push(format!("{}{}", country_code, bare));
    }
    variants
}
