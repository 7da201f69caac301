//! DevTools endpoint discovery for already-running browsers

use serde::Deserialize;

use crate::error::{Result, ScrapeError};

#[derive(Debug, Deserialize)]
struct VersionInfo {
    #[serde(rename = "webSocketDebuggerUrl")]
    web_socket_debugger_url: Option<String>,
}

/// Turns a configured remote endpoint into a browser WebSocket URL
///
/// `ws://…/devtools/browser/…` URLs are used as-is. Anything else is treated
/// as the DevTools HTTP root and `GET /json/version` is asked for
/// `webSocketDebuggerUrl`.
///
/// # Errors
/// - `Http` if the version endpoint cannot be reached or answers non-2xx
/// - `Launch` if the answer carries no WebSocket URL
pub async fn resolve_websocket_url(client: &reqwest::Client, endpoint: &str) -> Result<String> {
    let endpoint = endpoint.trim();
    if (endpoint.starts_with("ws://") || endpoint.starts_with("wss://"))
        && endpoint.contains("/devtools/")
    {
        return Ok(endpoint.to_string());
    }

    let http_root = if let Some(rest) = endpoint.strip_prefix("wss://") {
        format!("https://{}", rest)
    } else if let Some(rest) = endpoint.strip_prefix("ws://") {
        format!("http://{}", rest)
    } else {
        endpoint.to_string()
    };
    let version_url = format!("{}/json/version", http_root.trim_end_matches('/'));

    let info: VersionInfo = client
        .get(&version_url)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    info.web_socket_debugger_url
        .filter(|url| !url.is_empty())
        .ok_or_else(|| {
            ScrapeError::Launch(format!("No webSocketDebuggerUrl returned by {}", version_url))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_websocket_url_used_directly() {
        let client = reqwest::Client::new();
        let url = "ws://127.0.0.1:9222/devtools/browser/abc";
        assert_eq!(resolve_websocket_url(&client, url).await.unwrap(), url);
    }

    #[tokio::test]
    async fn test_resolves_via_version_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/json/version"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "Browser": "HeadlessChrome/120.0.0.0",
                "webSocketDebuggerUrl": "ws://127.0.0.1:9222/devtools/browser/xyz"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let endpoint = format!("{}/", server.uri());
        let ws = resolve_websocket_url(&client, &endpoint).await.unwrap();
        assert_eq!(ws, "ws://127.0.0.1:9222/devtools/browser/xyz");
    }

    #[tokio::test]
    async fn test_ws_root_rewritten_to_http() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/json/version"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "webSocketDebuggerUrl": "ws://remote/devtools/browser/1"
            })))
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let endpoint = server.uri().replacen("http://", "ws://", 1);
        let ws = resolve_websocket_url(&client, &endpoint).await.unwrap();
        assert_eq!(ws, "ws://remote/devtools/browser/1");
    }

    #[tokio::test]
    async fn test_missing_debugger_url() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/json/version"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        match resolve_websocket_url(&client, &server.uri()).await {
            Err(ScrapeError::Launch(msg)) => assert!(msg.contains("webSocketDebuggerUrl")),
            other => panic!("Expected Launch error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_version_endpoint_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/json/version"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let result = resolve_websocket_url(&client, &server.uri()).await;
        assert!(matches!(result, Err(ScrapeError::Http(_))));
    }
}
