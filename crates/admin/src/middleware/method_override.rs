//! HTTP method override for HTML forms.
//!
//! Browsers only submit forms as GET or POST. The edit and delete forms post
//! to `...?_method=PUT` / `...?_method=DELETE`; this request-mapping layer
//! rewrites the method before routing so the router sees the real verb.
//! Applied via `axum::middleware::map_request`.

use axum::extract::Request;
use axum::http::Method;

/// Rewrite `POST` requests carrying a `_method` query parameter.
///
/// Only `PUT` and `DELETE` can be reached this way; anything else is left
/// untouched. Non-POST requests are never rewritten.
pub async fn method_override(mut req: Request) -> Request {
    if req.method() != Method::POST {
        return req;
    }

    let Some(query) = req.uri().query() else {
        return req;
    };

    let target = query
        .split('&')
        .find_map(|pair| pair.strip_prefix("_method="));

    match target {
        Some(m) if m.eq_ignore_ascii_case("put") => *req.method_mut() = Method::PUT,
        Some(m) if m.eq_ignore_ascii_case("delete") => *req.method_mut() = Method::DELETE,
        _ => {}
    }

    req
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn post(uri: &str) -> Request {
        Request::builder()
            .method(Method::POST)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    #[tokio::test]
    async fn test_rewrites_put() {
        let req = method_override(post("/products/1?_method=PUT")).await;
        assert_eq!(req.method(), Method::PUT);
    }

    #[tokio::test]
    async fn test_rewrites_delete_case_insensitive() {
        let req = method_override(post("/products/1?_method=delete")).await;
        assert_eq!(req.method(), Method::DELETE);
    }

    #[tokio::test]
    async fn test_ignores_other_methods_in_query() {
        let req = method_override(post("/products/1?_method=PATCH")).await;
        assert_eq!(req.method(), Method::POST);
    }

    #[tokio::test]
    async fn test_ignores_get_requests() {
        let req = Request::builder()
            .method(Method::GET)
            .uri("/products?_method=DELETE")
            .body(Body::empty())
            .unwrap();
        let req = method_override(req).await;
        assert_eq!(req.method(), Method::GET);
    }

    #[tokio::test]
    async fn test_no_query_is_untouched() {
        let req = method_override(post("/products")).await;
        assert_eq!(req.method(), Method::POST);
    }
}
