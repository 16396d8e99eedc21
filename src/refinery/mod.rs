// * The Refinery (extraction pipeline)
// * Goal: turn irregular listings markup into structured raw rows.
// * Cell positions are trusted only for university/program/date; badge data
// * is matched by vocabulary over concatenated row text.

pub mod badges;
pub mod listing_rows;

// * Re-exports for convenient access
pub use badges::{scan, BadgeFacts};
pub use listing_rows::ListingExtractor;
