mod price;

pub mod helpers;
pub mod op;
mod secret;

pub use price::{Price, PriceConversionError, MICROS_PER_UNIT};
pub use secret::Secret;
