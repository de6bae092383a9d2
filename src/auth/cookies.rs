//! Cookie Delivery Adapter
//!
//! Carries the token pair to the client as http-only, secure cookies and
//! reads the refresh token back from incoming requests. The refresh token
//! is also accepted from a JSON body field as a fallback channel for
//! non-cookie clients.

use crate::models::RefreshRequest;

use axum_extra::extract::cookie::{Cookie, CookieJar};

/// Cookie name for the access token
pub const ACCESS_TOKEN_COOKIE: &str = "accessToken";

/// Cookie name for the refresh token
pub const REFRESH_TOKEN_COOKIE: &str = "refreshToken";

fn auth_cookie(name: &'static str, value: String) -> Cookie<'static> {
    Cookie::build((name, value))
        .http_only(true)
        .secure(true)
        .path("/")
        .build()
}

/// Set both auth cookies on the outgoing response
pub fn set_auth_cookies(jar: CookieJar, access_token: &str, refresh_token: &str) -> CookieJar {
    jar.add(auth_cookie(ACCESS_TOKEN_COOKIE, access_token.to_string()))
        .add(auth_cookie(REFRESH_TOKEN_COOKIE, refresh_token.to_string()))
}

/// Expire both auth cookies on the outgoing response
pub fn clear_auth_cookies(jar: CookieJar) -> CookieJar {
    jar.remove(auth_cookie(ACCESS_TOKEN_COOKIE, String::new()))
        .remove(auth_cookie(REFRESH_TOKEN_COOKIE, String::new()))
}

/// Read the incoming refresh token: cookie first, then body field
pub fn incoming_refresh_token(jar: &CookieJar, body: Option<&RefreshRequest>) -> Option<String> {
    jar.get(REFRESH_TOKEN_COOKIE)
        .map(|c| c.value().to_string())
        .or_else(|| body.and_then(|b| b.refresh_token.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_cookies_are_http_only_and_secure() {
        let jar = set_auth_cookies(CookieJar::new(), "acc", "ref");

        let access = jar.get(ACCESS_TOKEN_COOKIE).unwrap();
        assert_eq!(access.value(), "acc");
        assert_eq!(access.http_only(), Some(true));
        assert_eq!(access.secure(), Some(true));
        assert_eq!(access.path(), Some("/"));

        let refresh = jar.get(REFRESH_TOKEN_COOKIE).unwrap();
        assert_eq!(refresh.value(), "ref");
        assert_eq!(refresh.http_only(), Some(true));
        assert_eq!(refresh.secure(), Some(true));
    }

    #[test]
    fn clearing_removes_both_cookies() {
        let jar = set_auth_cookies(CookieJar::new(), "acc", "ref");
        let jar = clear_auth_cookies(jar);

        assert!(jar.get(ACCESS_TOKEN_COOKIE).is_none());
        assert!(jar.get(REFRESH_TOKEN_COOKIE).is_none());
    }

    #[test]
    fn incoming_token_prefers_cookie_over_body() {
        let jar = CookieJar::new().add(auth_cookie(REFRESH_TOKEN_COOKIE, "from-cookie".into()));
        let body = RefreshRequest {
            refresh_token: Some("from-body".to_string()),
        };

        assert_eq!(
            incoming_refresh_token(&jar, Some(&body)).as_deref(),
            Some("from-cookie")
        );
    }

    #[test]
    fn incoming_token_falls_back_to_body() {
        let jar = CookieJar::new();
        let body = RefreshRequest {
            refresh_token: Some("from-body".to_string()),
        };

        assert_eq!(
            incoming_refresh_token(&jar, Some(&body)).as_deref(),
            Some("from-body")
        );
        assert!(incoming_refresh_token(&jar, None).is_none());
    }
}
