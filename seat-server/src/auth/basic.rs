//! HTTP Basic authentication for non-API routes

use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::Engine;

use crate::state::AppState;
use crate::util::verify_password;

/// Asset extensions served without credentials
const PUBLIC_ASSET_EXTENSIONS: &[&str] = &[
    "ico", "png", "jpg", "jpeg", "gif", "svg", "css", "js", "woff", "woff2", "ttf", "eot",
];

/// Configured site login; the password is kept as an argon2 PHC string
#[derive(Clone)]
pub struct BasicCredentials {
    pub username: String,
    pub password_hash: String,
}

impl std::fmt::Debug for BasicCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicCredentials")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

impl BasicCredentials {
    pub fn from_parts(username: Option<String>, password_hash: Option<String>) -> Option<Self> {
        Some(Self {
            username: username?,
            password_hash: password_hash?,
        })
    }

    pub fn verify(&self, username: &str, password: &str) -> bool {
        username == self.username && verify_password(password, &self.password_hash)
    }
}

#[derive(Debug, PartialEq, Eq)]
enum BasicError {
    Missing,
    Malformed,
}

/// Decode `Authorization: Basic <base64(user:pass)>`
fn parse_basic(headers: &HeaderMap) -> Result<(String, String), BasicError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(BasicError::Missing)?;
    let encoded = value.strip_prefix("Basic ").ok_or(BasicError::Missing)?.trim();
    if encoded.is_empty() {
        return Err(BasicError::Malformed);
    }

    let decoded = base64::engine::general_purpose::STANDARD
        .decode(encoded)
        .map_err(|_| BasicError::Malformed)?;
    let text = String::from_utf8(decoded).map_err(|_| BasicError::Malformed)?;
    let (user, pass) = text.split_once(':').ok_or(BasicError::Malformed)?;
    if user.is_empty() || pass.is_empty() {
        return Err(BasicError::Malformed);
    }
    Ok((user.to_owned(), pass.to_owned()))
}

/// API routes and static assets skip the site login
fn is_public_path(path: &str) -> bool {
    path.starts_with("/api/")
        || path
            .rsplit_once('.')
            .is_some_and(|(_, ext)| PUBLIC_ASSET_EXTENSIONS.contains(&ext))
}

fn unauthorized(message: &'static str) -> Response {
    (
        StatusCode::UNAUTHORIZED,
        [
            (header::WWW_AUTHENTICATE, "Basic realm=\"Secure Area\""),
            (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
        ],
        message,
    )
        .into_response()
}

/// Middleware guarding the static site
pub async fn basic_auth(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, Response> {
    if is_public_path(request.uri().path()) {
        return Ok(next.run(request).await);
    }

    let (username, password) = match parse_basic(request.headers()) {
        Ok(pair) => pair,
        Err(BasicError::Missing) => return Err(unauthorized("Authentication required")),
        Err(BasicError::Malformed) => return Err(unauthorized("Invalid credentials format")),
    };

    let Some(credentials) = state.basic_auth.as_ref() else {
        tracing::warn!("Basic auth requested but AUTH_USERNAME/AUTH_PASSWORD_HASH are not set");
        return Err(unauthorized("Authentication error"));
    };

    if !credentials.verify(&username, &password) {
        tracing::info!(username = %username, "Basic auth rejected");
        return Err(unauthorized("Invalid credentials"));
    }

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    fn encode(raw: &str) -> String {
        format!(
            "Basic {}",
            base64::engine::general_purpose::STANDARD.encode(raw)
        )
    }

    #[test]
    fn parses_valid_header() {
        let headers = headers_with(&encode("admin:s3cret"));
        assert_eq!(
            parse_basic(&headers),
            Ok(("admin".to_string(), "s3cret".to_string()))
        );
    }

    #[test]
    fn password_may_contain_colons() {
        let headers = headers_with(&encode("admin:a:b"));
        assert_eq!(parse_basic(&headers).unwrap().1, "a:b");
    }

    #[test]
    fn rejects_missing_and_malformed() {
        assert_eq!(parse_basic(&HeaderMap::new()), Err(BasicError::Missing));
        assert_eq!(
            parse_basic(&headers_with("Bearer abc")),
            Err(BasicError::Missing)
        );
        assert_eq!(
            parse_basic(&headers_with("Basic !!!")),
            Err(BasicError::Malformed)
        );
        assert_eq!(
            parse_basic(&headers_with(&encode("no-colon"))),
            Err(BasicError::Malformed)
        );
        assert_eq!(
            parse_basic(&headers_with(&encode("admin:"))),
            Err(BasicError::Malformed)
        );
    }

    #[test]
    fn api_and_assets_skip_auth() {
        assert!(is_public_path("/favicon.ico"));
        assert!(is_public_path("/assets/app.js"));
        assert!(is_public_path("/api/unknown"));
        assert!(!is_public_path("/"));
        assert!(!is_public_path("/index.html"));
    }

    #[test]
    fn credentials_verify_against_argon2_hash() {
        let hash = crate::util::hash_password("open sesame").unwrap();
        let creds =
            BasicCredentials::from_parts(Some("admin".into()), Some(hash)).unwrap();
        assert!(creds.verify("admin", "open sesame"));
        assert!(!creds.verify("admin", "wrong"));
        assert!(!creds.verify("root", "open sesame"));

        assert!(BasicCredentials::from_parts(Some("admin".into()), None).is_none());
    }
}
