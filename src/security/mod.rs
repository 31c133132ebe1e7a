//! Cross-origin and version-skew protection layers.

pub mod origin;
pub mod skew;

pub use origin::{effective_allow_origins, origin_middleware, OriginPolicy};
pub use skew::{server_token, skew_middleware, SERVER_TOKEN_HEADER};
