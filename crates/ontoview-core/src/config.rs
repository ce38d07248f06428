//! Server configuration and sampling defaults.

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Defaults applied when a query leaves a parameter unspecified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleDefaults {
    /// Neighborhood radius for graph and hypergraph samples.
    pub hops: usize,
    /// Page size for the paginated listings.
    pub page_size: usize,
    /// Number of items shown by a list sample with no explicit ids.
    pub list_window: usize,
    /// Target size of a node-only sample.
    pub node_sample_size: usize,
}

impl SampleDefaults {
    pub const HOPS: usize = 2;
    pub const PAGE_SIZE: usize = 30;
    pub const LIST_WINDOW: usize = 50;
    pub const NODE_SAMPLE_SIZE: usize = 10;
}

impl Default for SampleDefaults {
    fn default() -> Self {
        Self {
            hops: Self::HOPS,
            page_size: Self::PAGE_SIZE,
            list_window: Self::LIST_WINDOW,
            node_sample_size: Self::NODE_SAMPLE_SIZE,
        }
    }
}

/// Top-level OntoView server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Interface the HTTP server binds to.
    pub host: String,
    /// HTTP server port.
    pub port: u16,
    pub defaults: SampleDefaults,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8000,
            defaults: SampleDefaults::default(),
        }
    }
}

impl ServerConfig {
    /// Create configuration from environment and defaults.
    ///
    /// Reads `ONTOVIEW_HOST`, `ONTOVIEW_PORT`, `ONTOVIEW_HOPS` and
    /// `ONTOVIEW_PAGE_SIZE`. Unparseable values fall back to the default.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let base = Self::default();

        let host = lookup("ONTOVIEW_HOST").unwrap_or(base.host);
        let port = parse_or("ONTOVIEW_PORT", &lookup, base.port);
        let hops = parse_or("ONTOVIEW_HOPS", &lookup, base.defaults.hops);
        let page_size = parse_or("ONTOVIEW_PAGE_SIZE", &lookup, base.defaults.page_size);

        Self {
            host,
            port,
            defaults: SampleDefaults {
                hops,
                page_size,
                ..base.defaults
            },
        }
    }

    /// `host:port` string suitable for binding.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_or<T: std::str::FromStr>(
    key: &str,
    lookup: &impl Fn(&str) -> Option<String>,
    default: T,
) -> T {
    match lookup(key) {
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            warn!("Ignoring unparseable {}={:?}", key, raw);
            default
        }),
        None => default,
    }
}
