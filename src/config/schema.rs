//! Server configuration schema.
//!
//! All types derive Serde traits so the configuration can be deserialized
//! from config files by an embedding application. The configuration is
//! immutable for the lifetime of one `start`/`shutdown` cycle.

use serde::{Deserialize, Serialize};

/// Per-start configuration for the API server.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address (e.g., "127.0.0.1:9090"). Port 0 asks the kernel for
    /// an ephemeral port; the bound address is reported by `local_addr`.
    pub endpoint: String,

    /// Optional TLS configuration.
    pub tls: Option<TlsConfig>,

    /// Optional CORS policy. When absent, no CORS headers are emitted.
    pub cors: Option<CorsConfig>,

    /// Per-request read timeout in seconds. `None` disables the timeout.
    pub read_timeout_secs: Option<u64>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            endpoint: "127.0.0.1:9090".to_string(),
            tls: None,
            cors: None,
            read_timeout_secs: None,
        }
    }
}

/// TLS configuration for the listener.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TlsConfig {
    /// Path to certificate file (PEM).
    pub cert_path: String,

    /// Path to private key file (PEM).
    pub key_path: String,
}

/// CORS policy: a list of allowed-origin patterns.
///
/// Each entry is a regular expression fragment; all entries are compiled
/// into one combined matcher at `start` time. A pattern that does not
/// compile aborts startup before any listener is bound.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}
