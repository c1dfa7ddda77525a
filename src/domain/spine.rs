//! Spine Derivations
//!
//! Pure rendering parameters derived from item data: the fallback tint
//! and the spine box dimensions. No I/O, no randomness; the same input
//! always renders the same way.

/// Saturation/lightness are fixed; only the hue varies with the key.
const HUE_SATURATION: u32 = 65;
const HUE_LIGHTNESS: u32 = 52;

const MIN_PAGES: f64 = 120.0;
const MAX_PAGES: f64 = 900.0;
const PAGED_MIN_WIDTH_REM: f64 = 1.2;
const PAGED_MAX_WIDTH_REM: f64 = 2.6;

const LABEL_WIDTH_CHARS: f64 = 28.0;
const LABEL_MIN_WIDTH_REM: f64 = 1.0;
const LABEL_MAX_WIDTH_REM: f64 = 2.0;

const LABEL_HEIGHT_CHARS: f64 = 40.0;
const MIN_HEIGHT_REM: f64 = 5.8;
const MAX_HEIGHT_REM: f64 = 9.0;

/// Spine box dimensions in rem units
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpineMetrics {
    pub width_rem: f64,
    pub height_rem: f64,
}

/// Deterministic tint for a stable string key (catalog id, else title).
///
/// Multiply-by-31 rolling hash over the key's bytes with u32 wraparound,
/// mapped to a hue. Same key, same color; no external randomness.
pub fn color_for_key(key: &str) -> String {
    let key = if key.is_empty() { "book" } else { key };
    let mut hash: u32 = 0;
    for byte in key.bytes() {
        hash = hash.wrapping_mul(31).wrapping_add(byte as u32);
    }
    let hue = hash % 360;
    format!("hsl({}, {}%, {}%)", hue, HUE_SATURATION, HUE_LIGHTNESS)
}

/// Spine geometry for a book.
///
/// Thickness comes from the page count when one is known (clamped to
/// `[120, 900]` pages), otherwise from the label length. Height always
/// comes from the label length, independent of page count.
pub fn spine_metrics(label: &str, page_count: Option<u32>) -> SpineMetrics {
    let label_len = label.chars().count() as f64;

    let width_rem = match page_count {
        Some(pages) if pages > 0 => {
            let clamped = (pages as f64).clamp(MIN_PAGES, MAX_PAGES);
            let t = (clamped - MIN_PAGES) / (MAX_PAGES - MIN_PAGES);
            PAGED_MIN_WIDTH_REM + t * (PAGED_MAX_WIDTH_REM - PAGED_MIN_WIDTH_REM)
        }
        _ => {
            let t = label_len.min(LABEL_WIDTH_CHARS) / LABEL_WIDTH_CHARS;
            LABEL_MIN_WIDTH_REM + t * (LABEL_MAX_WIDTH_REM - LABEL_MIN_WIDTH_REM)
        }
    };

    let t = label_len.min(LABEL_HEIGHT_CHARS) / LABEL_HEIGHT_CHARS;
    let height_rem = MIN_HEIGHT_REM + t * (MAX_HEIGHT_REM - MIN_HEIGHT_REM);

    SpineMetrics {
        width_rem,
        height_rem,
    }
}
