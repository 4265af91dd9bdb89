//! Starting the "Use AgeKey" and "Create AgeKey" journeys.

pub mod routes;
pub mod service;

pub use routes::routes;
pub use service::{FlowError, age_threshold_claims, start_create, start_use};
