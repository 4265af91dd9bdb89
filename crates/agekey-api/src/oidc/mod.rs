//! OpenID Connect plumbing shared by the flow initiators and the callback.

pub mod client;
pub mod flow;
pub mod signin;
pub mod validator;

pub use client::{AgeKeyClient, FlowClients, build_client, discover_client};
pub use flow::{Flow, FlowConfig, FlowConfigs};
pub use signin::{PendingSignin, SigninRequest};
pub use validator::{
    AgeKeyClaims, AgeThresholds, IdTokenValidator, OidcTokenValidator, TokenValidationError,
};
