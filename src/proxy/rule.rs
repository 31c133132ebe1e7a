//! Proxy rules: pairing a path prefix with a target/path resolver.
//!
//! # Design Decisions
//! - Resolution is a pure function of the path: no side effects, no
//!   blocking, deterministic. Anything per-request stays out of here.
//! - Rules are plain values built once at assembly time; each LSP server
//!   gets its own rule holding its own copied fields, so no rule can
//!   observe another descriptor's state.

use crate::config::LspServerDescriptor;
use crate::error::GatewayError;

/// Prefix the interactive-figure proxy listens under. The figure backend's
/// port is carried in the path itself, not in configuration.
pub const FIGURE_PREFIX: &str = "/mpl";

/// Where one request is forwarded: upstream authority plus the rewritten
/// downstream path (query string not included).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTarget {
    pub authority: String,
    pub path: String,
}

/// One reverse-proxy rule.
#[derive(Debug, Clone)]
pub struct ProxyRule {
    prefix: String,
    resolver: TargetResolver,
}

#[derive(Debug, Clone)]
enum TargetResolver {
    /// The path encodes its own destination: `/<prefix>/<port>/<rest...>`.
    PathDerived,
    /// Target and downstream path fixed at assembly time; the incoming
    /// sub-path is discarded entirely.
    Static {
        authority: String,
        rewrite_to: String,
    },
}

impl ProxyRule {
    /// Rule for the figure proxy: port and remaining path are read out of
    /// the request path on every request.
    pub fn figure(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            resolver: TargetResolver::PathDerived,
        }
    }

    /// Rule for one LSP-like server. The downstream path is always the
    /// same fixed value (`/copilot` for the copilot server, `/lsp/<id>`
    /// otherwise); any sub-path under the prefix collapses onto it. That
    /// mirrors the behavior of the processes being proxied and is
    /// deliberate, not a shortcut.
    pub fn lsp(server: &LspServerDescriptor) -> Self {
        let rewrite_to = if server.id == "copilot" {
            "/copilot".to_string()
        } else {
            format!("/lsp/{}", server.id)
        };
        Self {
            prefix: format!("/lsp/{}", server.id),
            resolver: TargetResolver::Static {
                authority: format!("localhost:{}", server.port),
                rewrite_to,
            },
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Whether this rule intercepts the given path. Non-matching requests
    /// fall through to the next layer unaffected.
    pub fn matches(&self, path: &str) -> bool {
        path.starts_with(&self.prefix)
    }

    /// Compute the forwarding target. Only called on matching paths.
    pub fn resolve(&self, path: &str) -> Result<ResolvedTarget, GatewayError> {
        debug_assert!(self.matches(path));
        match &self.resolver {
            TargetResolver::Static {
                authority,
                rewrite_to,
            } => Ok(ResolvedTarget {
                authority: authority.clone(),
                path: rewrite_to.clone(),
            }),
            TargetResolver::PathDerived => {
                // "/mpl/8080/figures/1.png" -> ["", "mpl", "8080", "figures/1.png"]
                let segments: Vec<&str> = path.splitn(4, '/').collect();
                if segments.len() < 4 {
                    return Err(GatewayError::ProxyTargetMalformed(format!(
                        "{path:?} should look like {}/<port>/<path>",
                        self.prefix
                    )));
                }
                let port: u16 = segments[2].parse().map_err(|_| {
                    GatewayError::ProxyTargetMalformed(format!(
                        "{:?} is not a valid port in {path:?}",
                        segments[2]
                    ))
                })?;
                Ok(ResolvedTarget {
                    authority: format!("localhost:{port}"),
                    path: format!("/{}", segments[3]),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_figure_resolver_splits_port_and_path() {
        let rule = ProxyRule::figure(FIGURE_PREFIX);
        let target = rule.resolve("/mpl/8080/figures/1.png").unwrap();
        assert_eq!(target.authority, "localhost:8080");
        assert_eq!(target.path, "/figures/1.png");
    }

    #[test]
    fn test_figure_resolver_keeps_nested_slashes() {
        let rule = ProxyRule::figure(FIGURE_PREFIX);
        let target = rule.resolve("/mpl/9999/deep/nested/path").unwrap();
        assert_eq!(target.authority, "localhost:9999");
        assert_eq!(target.path, "/deep/nested/path");
    }

    #[test]
    fn test_figure_resolver_trailing_slash_yields_root() {
        let rule = ProxyRule::figure(FIGURE_PREFIX);
        let target = rule.resolve("/mpl/8080/").unwrap();
        assert_eq!(target.path, "/");
    }

    #[test]
    fn test_figure_resolver_too_few_segments() {
        let rule = ProxyRule::figure(FIGURE_PREFIX);
        let err = rule.resolve("/mpl/8080").unwrap_err();
        assert!(matches!(err, GatewayError::ProxyTargetMalformed(_)));
    }

    #[test]
    fn test_figure_resolver_bad_port() {
        let rule = ProxyRule::figure(FIGURE_PREFIX);
        let err = rule.resolve("/mpl/eighty/figures").unwrap_err();
        assert!(matches!(err, GatewayError::ProxyTargetMalformed(_)));

        let err = rule.resolve("/mpl/99999999/figures").unwrap_err();
        assert!(matches!(err, GatewayError::ProxyTargetMalformed(_)));
    }

    #[test]
    fn test_lsp_rule_collapses_subpath() {
        let rule = ProxyRule::lsp(&LspServerDescriptor {
            id: "pylsp".into(),
            port: 9000,
        });
        assert_eq!(rule.prefix(), "/lsp/pylsp");
        for path in ["/lsp/pylsp", "/lsp/pylsp/", "/lsp/pylsp/deeply/nested"] {
            let target = rule.resolve(path).unwrap();
            assert_eq!(target.authority, "localhost:9000");
            assert_eq!(target.path, "/lsp/pylsp");
        }
    }

    #[test]
    fn test_copilot_rule_rewrites_to_copilot() {
        let rule = ProxyRule::lsp(&LspServerDescriptor {
            id: "copilot".into(),
            port: 9001,
        });
        assert_eq!(rule.prefix(), "/lsp/copilot");
        let target = rule.resolve("/lsp/copilot/anything/here").unwrap();
        assert_eq!(target.authority, "localhost:9001");
        assert_eq!(target.path, "/copilot");
    }

    #[test]
    fn test_match_is_prefix_based() {
        let rule = ProxyRule::figure(FIGURE_PREFIX);
        assert!(rule.matches("/mpl/8080/x"));
        assert!(!rule.matches("/other"));
        assert!(!rule.matches("/"));
    }
}
