//! Composite-read services layered on top of the downstream entity stores.
//! - Proximity resolution (distance, radius, attribute filters, ordering).
//! - Cross-service aggregation with a strict primary and degrading sides.
//! - Unified search with degrade-to-empty semantics.
//! - Entity store abstraction with an HTTP implementation and a test mock.

pub mod aggregate;
pub mod errors;
pub mod geo;
pub mod proximity;
pub mod search;
pub mod store;
