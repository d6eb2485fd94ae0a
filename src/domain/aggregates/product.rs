//! Product display fields
//!
//! Values shown next to a product in listings. None of them are persisted.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;

/// Markup applied to the current price to show a "was" price.
const OLD_PRICE_MARKUP: Decimal = Decimal::from_parts(105, 0, 0, false, 2);
pub const MAX_STARS: u8 = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Badge { Newest, Discount }

impl Badge {
    /// Picks the badge from a stable hash of the product id so a product keeps its badge across requests.
    pub fn for_product(product_id: i64) -> Self {
        // splitmix64 finalizer
        let mut z = (product_id as u64).wrapping_add(0x9E37_79B9_7F4A_7C15);
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^= z >> 31;
        if z & 1 == 1 { Self::Newest } else { Self::Discount }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct DisplayFields {
    pub price_old: Decimal,
    pub rating_stars: u8,
    pub is_newest: bool,
    pub is_discount: bool,
}

impl DisplayFields {
    pub fn derive(product_id: i64, price: Decimal, total_rating: i32, top_rating: i32) -> Self {
        let badge = Badge::for_product(product_id);
        Self {
            price_old: price_old(price),
            rating_stars: rating_stars(total_rating, top_rating),
            is_newest: badge == Badge::Newest,
            is_discount: badge == Badge::Discount,
        }
    }
}

pub fn price_old(price: Decimal) -> Decimal { price * OLD_PRICE_MARKUP }

/// `rating` relative to `top`, as a whole percentage in `0..=100`. Zero when `top` is not positive.
pub fn rating_percentage(rating: i32, top: i32) -> u8 {
    if top <= 0 || rating <= 0 { return 0; }
    let pct = (i64::from(rating) * 100 / i64::from(top)).min(100);
    pct.to_u8().unwrap_or(100)
}

/// Star rating on a `0..=5` scale relative to the best rated product.
pub fn rating_stars(rating: i32, top: i32) -> u8 {
    (rating_percentage(rating, top) / 20).min(MAX_STARS)
}
