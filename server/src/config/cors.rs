use axum::http::{header, HeaderName, HeaderValue, Method};
use std::env;
use tower_http::cors::{AllowOrigin, CorsLayer};

const PREFLIGHT_MAX_AGE_SECS: u64 = 86400;

/// The mobile client sends no `Origin`, so an unset list means "any origin".
/// Credentials are only allowed for an explicit list; tower-http rejects
/// credentials combined with a wildcard origin.
pub fn create_cors_layer() -> CorsLayer {
    let origins = env::var("CORS_ALLOWED_ORIGINS").unwrap_or_default();
    cors_layer_for(&origins)
}

pub fn cors_layer_for(origins: &str) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
            header::ORIGIN,
            HeaderName::from_static("x-requested-with"),
        ])
        .expose_headers([header::CONTENT_LENGTH, header::CONTENT_TYPE])
        .max_age(std::time::Duration::from_secs(PREFLIGHT_MAX_AGE_SECS));

    let origins = parse_origins(origins);
    if origins.is_empty() {
        tracing::info!("CORS: No origins configured, allowing any origin");
        base.allow_origin(AllowOrigin::any())
    } else {
        tracing::info!("CORS: Configured with {} allowed origin(s)", origins.len());
        base.allow_origin(AllowOrigin::list(origins))
            .allow_credentials(true)
    }
}

fn parse_origins(origins: &str) -> Vec<HeaderValue> {
    origins
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => {
                tracing::debug!("CORS: Allowing origin: {}", origin);
                Some(value)
            }
            Err(e) => {
                tracing::warn!("CORS: Invalid origin '{}': {}", origin, e);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_origins_skips_blanks() {
        let origins = parse_origins(" https://vsf.example , ,http://localhost:8080");
        assert_eq!(origins.len(), 2);
        assert_eq!(origins[0], "https://vsf.example");
    }

    #[test]
    fn test_layers_build_for_both_modes() {
        // Building must not panic for the wildcard or the explicit list.
        let _any = cors_layer_for("");
        let _listed = cors_layer_for("https://vsf.example");
    }
}
