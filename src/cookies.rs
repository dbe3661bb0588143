// Session cookie names and Set-Cookie construction

use axum::http::HeaderMap;

/// Cookie carrying the short-lived access credential
pub const ACCESS_COOKIE: &str = "accessToken";

/// Cookie carrying the long-lived refresh credential
pub const REFRESH_COOKIE: &str = "refreshToken";

/// Access cookie lifetime: 15 minutes
pub const ACCESS_MAX_AGE: i64 = 60 * 15;

/// Refresh cookie lifetime: 7 days
pub const REFRESH_MAX_AGE: i64 = 60 * 60 * 24 * 7;

/// Retrieve the value of a named cookie from the request headers.
///
/// Handles multiple `Cookie` headers and multiple pairs per header.
pub fn get_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    for header in headers.get_all(axum::http::header::COOKIE) {
        let Ok(raw) = header.to_str() else {
            continue;
        };
        for pair in raw.split(';') {
            let pair = pair.trim();
            if let Some((key, value)) = pair.split_once('=') {
                if key == name {
                    return Some(value.to_string());
                }
            }
        }
    }
    None
}

/// Build a `Set-Cookie` value for a session cookie.
///
/// `HttpOnly` and `Secure` are applied only when `production` is set, so
/// local development against plain HTTP keeps working.
pub fn session_cookie(name: &str, value: &str, max_age: i64, production: bool) -> String {
    let mut cookie = format!("{}={}; Max-Age={}; Path=/; SameSite=Lax", name, value, max_age);
    if production {
        cookie.push_str("; HttpOnly; Secure");
    }
    cookie
}

/// Build a `Set-Cookie` value that deletes the named cookie.
pub fn expired_cookie(name: &str) -> String {
    format!(
        "{}=; Expires=Thu, 01 Jan 1970 00:00:00 GMT; Max-Age=0; Path=/; SameSite=Lax",
        name
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::COOKIE;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, value.parse().unwrap());
        headers
    }

    #[test]
    fn test_get_cookie_single_pair() {
        let headers = headers_with("accessToken=abc123");
        assert_eq!(get_cookie(&headers, ACCESS_COOKIE), Some("abc123".to_string()));
        assert_eq!(get_cookie(&headers, REFRESH_COOKIE), None);
    }

    #[test]
    fn test_get_cookie_multiple_pairs() {
        let headers = headers_with("theme=dark; accessToken=abc123; refreshToken=xyz789");
        assert_eq!(get_cookie(&headers, ACCESS_COOKIE), Some("abc123".to_string()));
        assert_eq!(get_cookie(&headers, REFRESH_COOKIE), Some("xyz789".to_string()));
    }

    #[test]
    fn test_get_cookie_multiple_headers() {
        let mut headers = HeaderMap::new();
        headers.append(COOKIE, "theme=dark".parse().unwrap());
        headers.append(COOKIE, "accessToken=abc123".parse().unwrap());
        assert_eq!(get_cookie(&headers, ACCESS_COOKIE), Some("abc123".to_string()));
    }

    #[test]
    fn test_get_cookie_name_is_exact() {
        // "accessToken" must not match a "xaccessToken" pair
        let headers = headers_with("xaccessToken=wrong; accessToken=right");
        assert_eq!(get_cookie(&headers, ACCESS_COOKIE), Some("right".to_string()));
    }

    #[test]
    fn test_get_cookie_missing() {
        let headers = HeaderMap::new();
        assert_eq!(get_cookie(&headers, ACCESS_COOKIE), None);
    }

    #[test]
    fn test_session_cookie_development() {
        let cookie = session_cookie(ACCESS_COOKIE, "tok", ACCESS_MAX_AGE, false);
        assert_eq!(cookie, "accessToken=tok; Max-Age=900; Path=/; SameSite=Lax");
        assert!(!cookie.contains("HttpOnly"));
        assert!(!cookie.contains("Secure"));
    }

    #[test]
    fn test_session_cookie_production() {
        let cookie = session_cookie(REFRESH_COOKIE, "tok", REFRESH_MAX_AGE, true);
        assert!(cookie.starts_with("refreshToken=tok; Max-Age=604800"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Secure"));
    }

    #[test]
    fn test_expired_cookie() {
        let cookie = expired_cookie(ACCESS_COOKIE);
        assert!(cookie.starts_with("accessToken=;"));
        assert!(cookie.contains("Max-Age=0"));
        assert!(cookie.contains("Expires=Thu, 01 Jan 1970"));
    }
}
