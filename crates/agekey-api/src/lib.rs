pub mod callback;
pub mod config;
pub mod cookies;
pub mod error;
pub mod flows;
pub mod metrics;
pub mod middleware;
pub mod oidc;
pub mod pages;
pub mod par;
pub mod router;
pub mod state;
pub mod tracing;

pub use config::ApiConfig;
pub use state::ApiState;
