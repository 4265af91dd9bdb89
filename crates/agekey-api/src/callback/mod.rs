//! The redirect target shared by both flows.

pub mod interpret;
pub mod routes;
pub mod view;

pub use interpret::{CallbackQuery, CallbackResult, MissingCreatedFlag, Outcome, interpret};
pub use routes::routes;
pub use view::CallbackView;
