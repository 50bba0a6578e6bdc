//! Navigation responses that work for both plain and HTMX requests.

use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};

pub const LOGIN_PATH: &str = "/login";

/// Whether the request was issued by HTMX.
pub fn is_htmx(headers: &HeaderMap) -> bool {
    headers
        .get("HX-Request")
        .is_some_and(|v| v.as_bytes().eq_ignore_ascii_case(b"true"))
}

/// Send the browser to `location`.
///
/// HTMX requests get `HX-Redirect` so the whole page navigates instead of a
/// fragment being swapped in; everything else gets a `303 See Other`.
pub fn navigate(headers: &HeaderMap, location: &str) -> Response {
    if is_htmx(headers) {
        match HeaderValue::from_str(location) {
            Ok(value) => {
                let mut response = StatusCode::OK.into_response();
                response.headers_mut().insert("HX-Redirect", value);
                response
            }
            Err(_) => Redirect::to(LOGIN_PATH).into_response(),
        }
    } else {
        Redirect::to(location).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::header::LOCATION;

    #[test]
    fn test_plain_request_gets_see_other() {
        let response = navigate(&HeaderMap::new(), "/client/dashboard");
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(response.headers()[LOCATION], "/client/dashboard");
    }

    #[test]
    fn test_htmx_request_gets_hx_redirect() {
        let mut headers = HeaderMap::new();
        headers.insert("HX-Request", HeaderValue::from_static("true"));

        let response = navigate(&headers, "/login");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["HX-Redirect"], "/login");
        assert!(response.headers().get(LOCATION).is_none());
    }
}
