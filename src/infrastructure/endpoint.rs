use crate::types::constants::{DEFAULT_API_PREFIX, WS_PATH_SUFFIX};
use crate::types::{ClientError, Result};
use url::Url;

/// Derives the live-update socket URL from an API base URL.
///
/// `https` becomes `wss` and `http` becomes `ws`; the query is dropped and
/// `/ws` is appended to the path.
pub fn websocket_endpoint(api_base: &str) -> Result<Url> {
    let mut url = Url::parse(api_base.trim())?;

    let scheme = match url.scheme() {
        "https" | "wss" => "wss",
        "http" | "ws" => "ws",
        other => {
            return Err(ClientError::Config(format!(
                "unsupported API base scheme '{}'",
                other
            )));
        }
    };
    url.set_scheme(scheme)
        .map_err(|_| ClientError::Config(format!("cannot derive socket URL from {}", api_base)))?;

    let path = format!("{}{}", url.path().trim_end_matches('/'), WS_PATH_SUFFIX);
    url.set_path(&path);
    url.set_query(None);
    url.set_fragment(None);

    Ok(url)
}

/// Fallback used when no API base is configured: the socket lives under the
/// default API prefix on the page's own host.
pub fn endpoint_from_host(host: &str, secure: bool) -> Result<Url> {
    let scheme = if secure { "wss" } else { "ws" };
    let host = host.trim().trim_end_matches('/');
    if host.is_empty() {
        return Err(ClientError::Config("page host is empty".to_string()));
    }

    Ok(Url::parse(&format!(
        "{}://{}{}{}",
        scheme, host, DEFAULT_API_PREFIX, WS_PATH_SUFFIX
    ))?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_base_maps_to_ws() {
        let url = websocket_endpoint("http://localhost:8000/api/v1").unwrap();
        assert_eq!(url.as_str(), "ws://localhost:8000/api/v1/ws");
    }

    #[test]
    fn test_https_base_maps_to_wss() {
        let url = websocket_endpoint("https://inventory.example.com/api/v1/?debug=1").unwrap();
        assert_eq!(url.as_str(), "wss://inventory.example.com/api/v1/ws");
    }

    #[test]
    fn test_unsupported_scheme_is_rejected() {
        assert!(matches!(
            websocket_endpoint("ftp://example.com/api"),
            Err(ClientError::Config(_))
        ));
        assert!(matches!(
            websocket_endpoint("not a url"),
            Err(ClientError::UrlParse(_))
        ));
    }

    #[test]
    fn test_host_fallback() {
        let url = endpoint_from_host("dashboard.example.com", true).unwrap();
        assert_eq!(url.as_str(), "wss://dashboard.example.com/api/v1/ws");

        let url = endpoint_from_host("localhost:5173", false).unwrap();
        assert_eq!(url.as_str(), "ws://localhost:5173/api/v1/ws");

        assert!(endpoint_from_host("  ", false).is_err());
    }
}
