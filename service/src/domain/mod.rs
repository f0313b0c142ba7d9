//! Domain definitions.

pub mod admin;
pub mod listing;

pub use self::listing::Listing;
