//! Domain value types shared across the gateway.
//!
//! Everything here is request-scoped and read-only from the gateway's point
//! of view: the downstream services own these records, the gateway only
//! deserializes, combines and re-serializes them.

pub mod category;
pub mod coordinate;
pub mod errors;
pub mod experience;
pub mod review;

pub use category::Category;
pub use coordinate::Coordinate;
pub use errors::ModelError;
pub use experience::Experience;
pub use review::{RatingDistribution, Review, ReviewStats};
