//! Dynamic reverse-proxying of URL prefixes to auxiliary local servers.
//!
//! # Data Flow
//! ```text
//! request ──▶ proxy middleware
//!                │ prefix miss          ──▶ next layer / app routes
//!                │ prefix hit
//!                ▼
//!            ProxyRule::resolve(path) ──▶ target authority + rewritten path
//!                ▼
//!            hyper-util client ──▶ http://localhost:<port> (trusted peer)
//!                ▼
//!            streamed response back to the caller
//! ```

pub mod forward;
pub mod rule;

pub use forward::{proxy_client, proxy_middleware, ProxyClient, ProxyState};
pub use rule::{ProxyRule, ResolvedTarget, FIGURE_PREFIX};
