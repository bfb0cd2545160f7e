use crate::utils::auth::{Identity, resolve_identity};
use crate::{AppState, entities::prelude::Users};
use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use sea_orm::EntityTrait;
use serde::Deserialize;

#[derive(Deserialize)]
struct AuthQuery {
    token: Option<String>,
}

/// Pulls the session credential from the `token` cookie, the
/// `Authorization: Bearer` header, or a `?token=` query parameter.
pub fn extract_token(headers: &HeaderMap, query: Option<&str>) -> Option<String> {
    if let Some(cookie_header) = headers.get("Cookie").and_then(|h| h.to_str().ok()) {
        for pair in cookie_header.split(';') {
            if let Some((name, value)) = pair.trim().split_once('=')
                && name == "token"
                && !value.is_empty()
            {
                return Some(value.to_string());
            }
        }
    }

    if let Some(bearer) = headers
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
    {
        return Some(bearer.to_string());
    }

    serde_urlencoded::from_str::<AuthQuery>(query.unwrap_or_default())
        .ok()
        .and_then(|q| q.token)
}

/// Resolve the request's identity; fails closed to `Anonymous`.
pub fn request_identity(headers: &HeaderMap, query: Option<&str>, secret: &str) -> Identity {
    resolve_identity(extract_token(headers, query).as_deref(), secret)
}

/// Required-auth middleware: rejects anonymous requests and requests whose
/// user no longer exists, otherwise inserts `Claims` for the handler.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let identity = request_identity(
        req.headers(),
        req.uri().query(),
        &state.config.jwt_secret,
    );

    if let Identity::Known(claims) = identity {
        let user_exists = Users::find_by_id(&claims.sub)
            .one(&state.db)
            .await
            .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
            .is_some();

        if user_exists {
            req.extensions_mut().insert(claims);
            return Ok(next.run(req).await);
        }
    }

    Err(StatusCode::UNAUTHORIZED)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_extract_token_sources() {
        let mut headers = HeaderMap::new();
        assert_eq!(extract_token(&headers, None), None);

        headers.insert("Authorization", HeaderValue::from_static("Bearer abc123"));
        assert_eq!(extract_token(&headers, None), Some("abc123".to_string()));

        // Cookie wins over the header
        headers.insert(
            "Cookie",
            HeaderValue::from_static("theme=dark; token=cookie-token"),
        );
        assert_eq!(
            extract_token(&headers, None),
            Some("cookie-token".to_string())
        );

        let headers = HeaderMap::new();
        assert_eq!(
            extract_token(&headers, Some("token=query-token")),
            Some("query-token".to_string())
        );
    }
}
