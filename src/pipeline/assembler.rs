//! Chain assembly from configuration.
//!
//! # Responsibilities
//! - Turn a [`PipelineConfig`] into the ordered layer list
//! - Derive the effective origin allow-list
//! - Reject ambiguous or malformed configuration before anything listens
//!
//! # Design Decisions
//! - Assembly is pure: no sockets, no global registration, no side effect
//!   beyond the returned list (and a couple of startup log lines)
//! - The fixed relative order is load-bearing; see `LayerSpec` docs

use axum::Router;

use crate::config::validation::{ensure_unique_lsp_ids, normalize_base_url};
use crate::config::PipelineConfig;
use crate::error::GatewayError;
use crate::pipeline::LayerSpec;
use crate::proxy::{ProxyClient, ProxyRule, FIGURE_PREFIX};
use crate::security::{effective_allow_origins, OriginPolicy};

/// Build the ordered middleware chain, outermost first.
///
/// Order: [session] → observability → auth → cors → skew → figure proxy →
/// one proxy per LSP descriptor → caller extras. Observability must see
/// every request including rejected ones; auth runs before CORS so auth
/// failures are attributed correctly; proxy layers are evaluated before
/// the chain falls through to the application's routes.
pub fn assemble(config: PipelineConfig) -> Result<Vec<LayerSpec>, GatewayError> {
    let PipelineConfig {
        base_url,
        host,
        enable_auth,
        allow_origins,
        lsp_servers,
        extra_layers,
    } = config;

    normalize_base_url(&base_url)?;
    ensure_unique_lsp_ids(&lsp_servers)?;

    let allow = effective_allow_origins(allow_origins, host.as_deref());
    tracing::info!(
        enable_auth,
        allow_origins = ?allow,
        lsp_servers = lsp_servers.len(),
        "assembling middleware chain"
    );

    let mut chain = Vec::new();

    if enable_auth {
        chain.push(LayerSpec::Session);
    }
    chain.push(LayerSpec::Observability);
    chain.push(LayerSpec::Auth {
        required: enable_auth,
    });
    chain.push(LayerSpec::Cors {
        policy: OriginPolicy::new(allow),
    });
    chain.push(LayerSpec::Skew);
    chain.push(LayerSpec::Proxy {
        rule: ProxyRule::figure(FIGURE_PREFIX),
    });
    for server in &lsp_servers {
        chain.push(LayerSpec::Proxy {
            rule: ProxyRule::lsp(server),
        });
    }
    chain.extend(extra_layers);

    Ok(chain)
}

/// Install a chain onto the application's router. The first spec becomes
/// the outermost layer, so installation folds in reverse.
pub fn install(chain: Vec<LayerSpec>, app: Router, client: &ProxyClient) -> Router {
    chain
        .into_iter()
        .rev()
        .fold(app, |app, spec| spec.install(app, client))
}
