//! Target URL resolution.
//!
//! # Addressing modes
//! - Parameterized: `GET /proxy?url=http%3A%2F%2Forigin%2Fx` names the target
//!   explicitly in the `url` query parameter.
//! - Pass-through: the request itself names the target. An absolute-form
//!   request line (`GET http://origin/x HTTP/1.1`, as sent to a forward proxy)
//!   is used as-is; an origin-form one (`GET /x`) is appended to the path of
//!   the configured upstream base URL and never leaves its authority.

use axum::http::request::Parts;
use axum::http::Uri;
use url::Url;

use crate::proxy::error::ProxyError;

/// Name of the query parameter carrying the target in parameterized mode.
pub const TARGET_PARAM: &str = "url";

/// How the inbound request identifies its origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressingMode {
    PassThrough,
    Parameterized,
}

/// Resolve the outbound target for a request.
pub fn resolve_target(
    mode: AddressingMode,
    parts: &Parts,
    upstream: Option<&Url>,
) -> Result<Url, ProxyError> {
    let url = match mode {
        AddressingMode::Parameterized => {
            let raw = query_param(parts.uri.query(), TARGET_PARAM).ok_or_else(|| {
                ProxyError::BadRequest(format!("Missing '{TARGET_PARAM}' query parameter"))
            })?;
            Url::parse(&raw)
                .map_err(|e| ProxyError::BadRequest(format!("Invalid target URL '{raw}': {e}")))?
        }
        AddressingMode::PassThrough => {
            if is_absolute_form(&parts.uri) {
                let raw = parts.uri.to_string();
                Url::parse(&raw)
                    .map_err(|e| ProxyError::BadRequest(format!("Invalid target URL '{raw}': {e}")))?
            } else {
                let base = upstream.ok_or_else(|| {
                    ProxyError::BadRequest(
                        "Request target must be an absolute URL when no upstream is configured"
                            .to_string(),
                    )
                })?;
                upstream_target(base, &parts.uri)
            }
        }
    };

    check_supported(url)
}

/// Whether `uri` is an absolute-form request target, as sent to a forward proxy.
pub fn is_absolute_form(uri: &Uri) -> bool {
    uri.scheme().is_some() && uri.authority().is_some()
}

/// `base` with the inbound path appended to its own path and the inbound query.
///
/// Only the path and query are taken from `uri`, so a path such as
/// `//other-host/x` stays on the upstream.
fn upstream_target(base: &Url, uri: &Uri) -> Url {
    let mut url = base.clone();
    let prefix = base.path().trim_end_matches('/');
    url.set_path(&format!("{prefix}{}", uri.path()));
    url.set_query(uri.query());
    url.set_fragment(None);
    url
}

/// First value of `name` in a query string, if it is non-empty.
fn query_param(query: Option<&str>, name: &str) -> Option<String> {
    url::form_urlencoded::parse(query?.as_bytes())
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}

fn check_supported(url: Url) -> Result<Url, ProxyError> {
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ProxyError::BadRequest(format!(
            "Unsupported target scheme '{}'",
            url.scheme()
        )));
    }
    if url.host().is_none() {
        return Err(ProxyError::BadRequest(format!("Target URL '{url}' has no host")));
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(uri: &str) -> Parts {
        Request::builder().uri(uri).body(()).unwrap().into_parts().0
    }

    fn bad_request(result: Result<Url, ProxyError>) -> String {
        match result {
            Err(ProxyError::BadRequest(msg)) => msg,
            other => panic!("expected BadRequest, got {other:?}"),
        }
    }

    #[test]
    fn test_parameterized_target() {
        let url = resolve_target(
            AddressingMode::Parameterized,
            &parts("/proxy?url=http%3A%2F%2Forigin%2Fx%3Fa%3D1"),
            None,
        )
        .unwrap();
        assert_eq!(url.as_str(), "http://origin/x?a=1");
    }

    #[test]
    fn test_parameterized_missing_or_empty() {
        for uri in ["/proxy", "/proxy?other=1", "/proxy?url=", "/proxy?url"] {
            let msg = bad_request(resolve_target(AddressingMode::Parameterized, &parts(uri), None));
            assert!(msg.contains("url"), "{uri}: {msg}");
        }
    }

    #[test]
    fn test_parameterized_malformed() {
        bad_request(resolve_target(
            AddressingMode::Parameterized,
            &parts("/proxy?url=not-a-url"),
            None,
        ));
    }

    #[test]
    fn test_unsupported_scheme() {
        let msg = bad_request(resolve_target(
            AddressingMode::Parameterized,
            &parts("/proxy?url=ftp%3A%2F%2Forigin%2Ffile"),
            None,
        ));
        assert!(msg.contains("ftp"));
    }

    #[test]
    fn test_pass_through_absolute_form() {
        let url = resolve_target(
            AddressingMode::PassThrough,
            &parts("http://origin:8080/a/b?c=d"),
            None,
        )
        .unwrap();
        assert_eq!(url.as_str(), "http://origin:8080/a/b?c=d");
    }

    #[test]
    fn test_pass_through_absolute_form_ignores_upstream() {
        let upstream = Url::parse("http://upstream/").unwrap();
        let url = resolve_target(
            AddressingMode::PassThrough,
            &parts("http://origin/x"),
            Some(&upstream),
        )
        .unwrap();
        assert_eq!(url.as_str(), "http://origin/x");
    }

    #[test]
    fn test_pass_through_origin_form_uses_upstream() {
        let upstream = Url::parse("http://127.0.0.1:3000").unwrap();
        let url = resolve_target(
            AddressingMode::PassThrough,
            &parts("/items/7?full=1"),
            Some(&upstream),
        )
        .unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:3000/items/7?full=1");
    }

    #[test]
    fn test_https_target_is_accepted() {
        let url = resolve_target(
            AddressingMode::Parameterized,
            &parts("/proxy?url=https%3A%2F%2Fexample.com%2F"),
            None,
        )
        .unwrap();
        assert_eq!(url.as_str(), "https://example.com/");
    }

    #[test]
    fn test_pass_through_keeps_upstream_path_prefix() {
        for base in ["http://backend:3000/api/", "http://backend:3000/api"] {
            let upstream = Url::parse(base).unwrap();
            let url = resolve_target(
                AddressingMode::PassThrough,
                &parts("/items?x=1"),
                Some(&upstream),
            )
            .unwrap();
            assert_eq!(url.as_str(), "http://backend:3000/api/items?x=1", "base {base}");
        }
    }

    #[test]
    fn test_pass_through_double_slash_stays_on_upstream() {
        let upstream = Url::parse("http://backend:3000/").unwrap();
        let url = resolve_target(
            AddressingMode::PassThrough,
            &parts("//evil.example/steal"),
            Some(&upstream),
        )
        .unwrap();
        assert_eq!(url.host_str(), Some("backend"));
        assert_eq!(url.port(), Some(3000));
        assert_eq!(url.path(), "//evil.example/steal");
    }

    #[test]
    fn test_absolute_form_detection() {
        assert!(is_absolute_form(&"http://origin/proxy".parse().unwrap()));
        assert!(!is_absolute_form(&"/proxy?url=x".parse().unwrap()));
    }

    #[test]
    fn test_pass_through_origin_form_without_upstream() {
        bad_request(resolve_target(AddressingMode::PassThrough, &parts("/items"), None));
    }
}
