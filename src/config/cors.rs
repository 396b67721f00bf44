//! CORS policy compilation.
//!
//! All allowed-origin patterns are joined into one combined regex and
//! compiled once at `start` time. Compilation failure aborts startup
//! before any listener is bound.

use axum::http::request::Parts;
use axum::http::HeaderValue;
use regex::Regex;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::config::CorsConfig;
use crate::error::EndpointError;

/// Compile the allowed-origin patterns into a [`CorsLayer`] backed by a
/// single combined matcher.
pub fn compile_allowed_origins(cfg: &CorsConfig) -> Result<CorsLayer, EndpointError> {
    let combined = format!("^(?:{})$", cfg.allowed_origins.join("|"));
    let matcher =
        Regex::new(&combined).map_err(|source| EndpointError::CorsCompile { source })?;

    tracing::debug!(pattern = %combined, "compiled combined CORS origin matcher");

    let layer = CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(
            move |origin: &HeaderValue, _parts: &Parts| {
                origin.to_str().map(|o| matcher.is_match(o)).unwrap_or(false)
            },
        ))
        .allow_methods(Any)
        .allow_headers(Any);
    Ok(layer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_patterns_compile() {
        let cfg = CorsConfig {
            allowed_origins: vec![
                "https://example\\.com".to_string(),
                "https://.*\\.test\\.com".to_string(),
            ],
        };
        assert!(compile_allowed_origins(&cfg).is_ok());
    }

    #[test]
    fn invalid_pattern_reports_canonical_error() {
        let cfg = CorsConfig {
            allowed_origins: vec!["(invalid[regex".to_string()],
        };
        let err = compile_allowed_origins(&cfg).unwrap_err();
        assert!(err
            .to_string()
            .contains("failed to compile combined CORS allowed origins into regex"));
    }
}
