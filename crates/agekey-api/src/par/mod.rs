//! Server-side relay for AgeKey pushed authorization requests.
//!
//! The create flow registers its authorization parameters with the provider
//! out-of-band. The request carries the client secret, so it is sent from here
//! and never from the browser.

pub mod models;
pub mod relay;
pub mod routes;

pub use models::{ParRequest, ParResponse};
pub use relay::ParRelay;
pub use routes::routes;
