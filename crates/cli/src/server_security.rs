use anyhow::{Context as AnyhowContext, Result};
use axum::http::{HeaderMap, HeaderValue};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

pub(crate) const API_KEY_HEADER: &str = "x-api-key";

/// Shared secret callers must send in `x-api-key`.
#[derive(Clone, Debug)]
pub(crate) struct ApiKey {
    key: String,
}

impl ApiKey {
    pub(crate) fn parse(raw: Option<&str>) -> Result<Option<Self>> {
        let Some(raw) = raw else {
            return Ok(None);
        };

        let key = raw.trim();
        if key.is_empty() {
            anyhow::bail!("API key must be non-empty")
        }

        Ok(Some(Self {
            key: key.to_string(),
        }))
    }

    pub(crate) fn matches(&self, presented: &str) -> bool {
        constant_time_eq(presented.trim(), &self.key)
    }
}

/// No key configured means every request is accepted.
pub(crate) fn is_authorized(headers: &HeaderMap, key: Option<&ApiKey>) -> bool {
    let Some(key) = key else {
        return true;
    };
    headers
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| key.matches(value))
}

/// Browser access policy. `*` anywhere in `origins` allows every origin;
/// otherwise only the listed ones are echoed back.
pub(crate) fn cors_layer(origins: &[String]) -> Result<CorsLayer> {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if origins.iter().any(|origin| origin == "*") {
        return Ok(layer.allow_origin(Any));
    }
    let origins = origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin).with_context(|| format!("Invalid CORS origin '{origin}'"))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(layer.allow_origin(AllowOrigin::list(origins)))
}

fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut diff: u8 = 0;
    for (x, y) in a.as_bytes().iter().zip(b.as_bytes()) {
        diff |= x ^ y;
    }
    diff == 0
}
