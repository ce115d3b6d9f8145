//! RedGIFs API HTTP client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use url::Url;

use crate::api::token::TokenProvider;
use crate::api::types::{SearchResponse, TokenResponse};
use crate::crawl::failure::{FailureKind, TransportFailure, BODY_EXCERPT_LEN};
use crate::crawl::page::{PageCursor, PageFetcher, PageResult};
use crate::error::{Error, Result};

/// RedGIFs API base URL.
pub const API_BASE: &str = "https://api.redgifs.com";

/// Site the requests claim to originate from.
pub const SITE_URL: &str = "https://www.redgifs.com";

/// Accept header sent with every request.
pub const ACCEPT: &str = "application/json, text/plain, */*";

/// Default request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Connection settings for [`RedgifsApi`].
#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    /// Used for the `Referer` and `Origin` headers.
    pub site_url: String,
    pub user_agent: String,
    pub timeout: Duration,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: API_BASE.to_string(),
            site_url: SITE_URL.to_string(),
            user_agent: crate::config::loader::default_user_agent(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// RedGIFs API client.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct RedgifsApi {
    client: Client,
    base_url: Url,
}

impl RedgifsApi {
    /// Create a client with the descriptive headers preset.
    pub fn new(settings: &ApiSettings) -> Result<Self> {
        let base_url = Url::parse(&settings.base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(Error::ConfigValidation {
                field: "base_url".to_string(),
                message: format!("'{}' cannot be used as a base URL", settings.base_url),
            });
        }

        let client = Client::builder()
            .default_headers(build_headers(settings)?)
            .timeout(settings.timeout)
            .build()?;

        Ok(Self { client, base_url })
    }

    /// URL of `<base>/<segments...>`.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // Checked in `new`.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn search_url(&self, user: &str, cursor: PageCursor) -> Url {
        let mut url = self.endpoint(&["v2", "users", user, "search"]);
        url.query_pairs_mut()
            .append_pair("order", "new")
            .append_pair("count", &cursor.size.to_string())
            .append_pair("page", &cursor.number.to_string());
        url
    }
}

/// Build the headers sent with every request.
fn build_headers(settings: &ApiSettings) -> Result<header::HeaderMap> {
    let value = |field: &str, raw: &str| {
        header::HeaderValue::from_str(raw).map_err(|e| Error::ConfigValidation {
            field: field.to_string(),
            message: format!("not a valid header value: {}", e),
        })
    };

    let site = settings.site_url.trim_end_matches('/');
    let mut headers = header::HeaderMap::new();
    headers.insert(header::USER_AGENT, value("user_agent", &settings.user_agent)?);
    headers.insert(header::REFERER, value("site_url", &format!("{}/", site))?);
    headers.insert(header::ORIGIN, value("site_url", site)?);
    headers.insert(header::ACCEPT, header::HeaderValue::from_static(ACCEPT));
    Ok(headers)
}

#[async_trait]
impl TokenProvider for RedgifsApi {
    async fn acquire(&self) -> Result<String> {
        let url = self.endpoint(&["v2", "auth", "temporary"]);
        tracing::debug!("GET {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        let text = response.text().await?;
        tracing::debug!("Token response status: {}", status);

        if !status.is_success() {
            return Err(Error::AuthRequestFailed {
                status: Some(status.as_u16()),
                message: excerpt(&text),
            });
        }

        let parsed: TokenResponse =
            serde_json::from_str(&text).map_err(|e| Error::AuthRequestFailed {
                status: Some(status.as_u16()),
                message: format!("unparseable token response: {}", e),
            })?;

        parsed
            .token
            .filter(|token| !token.is_empty())
            .ok_or_else(|| Error::AuthRequestFailed {
                status: Some(status.as_u16()),
                message: "response carries no token".to_string(),
            })
    }
}

#[async_trait]
impl PageFetcher for RedgifsApi {
    async fn fetch_page(&self, user: &str, cursor: PageCursor, token: Option<&str>) -> PageResult {
        let url = self.search_url(user, cursor);
        tracing::debug!("GET {}", url);

        let mut request = self.client.get(url.clone());
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => return PageResult::TransportFailure(transport_failure(&e, &url)),
        };

        let status = response.status();
        tracing::debug!("Response status: {}", status);

        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return PageResult::AuthExpired {
                status: status.as_u16(),
            };
        }

        let text = match response.text().await {
            Ok(text) => text,
            Err(e) => return PageResult::TransportFailure(transport_failure(&e, &url)),
        };

        if !status.is_success() {
            return PageResult::TransportFailure(TransportFailure::http(
                status.as_u16(),
                url.as_str(),
                text,
            ));
        }

        tracing::debug!("Search response: {}", excerpt_of(&text, 200));

        match serde_json::from_str::<SearchResponse>(&text) {
            Ok(parsed) => PageResult::Success { items: parsed.gifs },
            Err(e) => {
                // The API answers past-the-end pages with an unexpected shape.
                tracing::debug!("Unexpected search response ({}); treating as end of data", e);
                PageResult::Success { items: Vec::new() }
            }
        }
    }
}

/// Classify a reqwest error raised while talking to `url`.
fn transport_failure(err: &reqwest::Error, url: &Url) -> TransportFailure {
    let kind = if err.is_timeout() {
        FailureKind::Timeout
    } else if err.is_connect() && mentions_dns(err) {
        FailureKind::Dns
    } else {
        FailureKind::Unknown
    };
    TransportFailure::new(kind, format!("{} ({})", url, root_cause(err)))
}

/// Whether any error in the source chain reports a failed name lookup.
fn mentions_dns(err: &(dyn std::error::Error + 'static)) -> bool {
    let mut source = Some(err);
    while let Some(e) = source {
        let text = e.to_string().to_lowercase();
        if text.contains("dns error")
            || text.contains("failed to lookup address")
            || text.contains("name or service not known")
            || text.contains("no such host")
        {
            return true;
        }
        source = e.source();
    }
    false
}

fn root_cause(err: &(dyn std::error::Error + 'static)) -> String {
    let mut current = err;
    while let Some(next) = current.source() {
        current = next;
    }
    current.to_string()
}

fn excerpt(text: &str) -> String {
    excerpt_of(text, BODY_EXCERPT_LEN)
}

fn excerpt_of(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header as header_eq, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn settings_for(server: &MockServer) -> ApiSettings {
        ApiSettings {
            base_url: server.uri(),
            ..ApiSettings::default()
        }
    }

    fn api_for(server: &MockServer) -> RedgifsApi {
        RedgifsApi::new(&settings_for(server)).unwrap()
    }

    fn cursor(number: u32) -> PageCursor {
        PageCursor { number, size: 40 }
    }

    #[test]
    fn test_search_url_escapes_user() {
        let api = RedgifsApi::new(&ApiSettings::default()).unwrap();
        let url = api.search_url("some user", cursor(3));
        assert_eq!(
            url.as_str(),
            "https://api.redgifs.com/v2/users/some%20user/search?order=new&count=40&page=3"
        );
    }

    #[test]
    fn test_rejects_header_breaking_user_agent() {
        let settings = ApiSettings {
            user_agent: "bad\nagent".into(),
            ..ApiSettings::default()
        };
        assert!(matches!(
            RedgifsApi::new(&settings),
            Err(Error::ConfigValidation { .. })
        ));
    }

    #[tokio::test]
    async fn test_fetch_page_sends_query_and_headers() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/users/alice/search"))
            .and(query_param("order", "new"))
            .and(query_param("count", "40"))
            .and(query_param("page", "2"))
            .and(header_eq("authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"page":2,"gifs":[{"id":"a","urls":{"hd":"https://x/a.mp4"}}]}"#,
            ))
            .expect(1)
            .mount(&server)
            .await;

        let result = api_for(&server).fetch_page("alice", cursor(2), Some("tok")).await;

        match result {
            PageResult::Success { items } => {
                assert_eq!(items.len(), 1);
                assert_eq!(items[0].id.as_deref(), Some("a"));
            }
            other => panic!("expected success, got {:?}", other),
        }

        let requests = server.received_requests().await.unwrap();
        let headers = &requests[0].headers;
        assert_eq!(headers.get("accept").unwrap().to_str().unwrap(), ACCEPT);
        assert_eq!(
            headers.get("referer").unwrap().to_str().unwrap(),
            "https://www.redgifs.com/"
        );
        assert_eq!(
            headers.get("origin").unwrap().to_str().unwrap(),
            "https://www.redgifs.com"
        );
        assert!(headers
            .get("user-agent")
            .unwrap()
            .to_str()
            .unwrap()
            .starts_with("Mozilla/5.0"));
    }

    #[tokio::test]
    async fn test_fetch_page_without_token_omits_authorization() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"gifs":[]}"#))
            .mount(&server)
            .await;

        let result = api_for(&server).fetch_page("alice", cursor(1), None).await;

        assert!(matches!(result, PageResult::Success { ref items } if items.is_empty()));
        let requests = server.received_requests().await.unwrap();
        assert!(requests[0].headers.get("authorization").is_none());
    }

    #[tokio::test]
    async fn test_fetch_page_auth_statuses() {
        for status in [401u16, 403] {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .respond_with(
                    ResponseTemplate::new(status).set_body_string(r#"{"gifs":[{"id":"a"}]}"#),
                )
                .mount(&server)
                .await;

            let result = api_for(&server).fetch_page("alice", cursor(1), Some("t")).await;
            assert!(
                matches!(result, PageResult::AuthExpired { status: s } if s == status),
                "status {} was not treated as auth expiry",
                status
            );
        }
    }

    #[tokio::test]
    async fn test_fetch_page_server_error_keeps_body() {
        let server = MockServer::start().await;
        let body = r#"{"error":{"message":"internal"}}"#;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string(body))
            .mount(&server)
            .await;

        let result = api_for(&server).fetch_page("alice", cursor(1), Some("t")).await;

        match result {
            PageResult::TransportFailure(failure) => {
                assert_eq!(failure.kind, FailureKind::HttpError(500));
                assert_eq!(failure.body.as_deref(), Some(body));
                assert!(failure.detail.contains("/v2/users/alice/search"));
            }
            other => panic!("expected failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_page_malformed_body_is_end_of_data() {
        for body in ["<html>nope</html>", r#"{"gifs":"none"}"#, ""] {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .respond_with(ResponseTemplate::new(200).set_body_string(body))
                .mount(&server)
                .await;

            let result = api_for(&server).fetch_page("alice", cursor(5), Some("t")).await;
            assert!(
                matches!(result, PageResult::Success { ref items } if items.is_empty()),
                "body {:?} was not treated as end of data",
                body
            );
        }
    }

    #[tokio::test]
    async fn test_fetch_page_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"gifs":[]}"#)
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let settings = ApiSettings {
            timeout: Duration::from_millis(100),
            ..settings_for(&server)
        };
        let api = RedgifsApi::new(&settings).unwrap();

        match api.fetch_page("alice", cursor(1), None).await {
            PageResult::TransportFailure(failure) => {
                assert_eq!(failure.kind, FailureKind::Timeout)
            }
            other => panic!("expected timeout, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_page_dns_failure() {
        let settings = ApiSettings {
            base_url: "http://no-such-host.invalid".into(),
            timeout: Duration::from_secs(5),
            ..ApiSettings::default()
        };
        let api = RedgifsApi::new(&settings).unwrap();

        match api.fetch_page("alice", cursor(1), None).await {
            PageResult::TransportFailure(failure) => assert_eq!(failure.kind, FailureKind::Dns),
            other => panic!("expected DNS failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_page_refused_connection_is_unknown() {
        // Bind then drop a listener to get a port nobody listens on.
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let settings = ApiSettings {
            base_url: format!("http://127.0.0.1:{}", port),
            timeout: Duration::from_secs(5),
            ..ApiSettings::default()
        };
        let api = RedgifsApi::new(&settings).unwrap();

        match api.fetch_page("alice", cursor(1), None).await {
            PageResult::TransportFailure(failure) => {
                assert_eq!(failure.kind, FailureKind::Unknown)
            }
            other => panic!("expected unknown failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_acquire_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/auth/temporary"))
            .and(header_eq("origin", "https://www.redgifs.com"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"token":"abc","addr":"1.2.3.4","agent":"x"}"#),
            )
            .expect(1)
            .mount(&server)
            .await;

        assert_eq!(api_for(&server).acquire().await.unwrap(), "abc");
    }

    #[tokio::test]
    async fn test_acquire_token_http_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/auth/temporary"))
            .respond_with(ResponseTemplate::new(503).set_body_string("down"))
            .mount(&server)
            .await;

        match api_for(&server).acquire().await {
            Err(Error::AuthRequestFailed { status, message }) => {
                assert_eq!(status, Some(503));
                assert_eq!(message, "down");
            }
            other => panic!("expected auth failure, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_acquire_token_missing_field() {
        for body in [r#"{"addr":"1.2.3.4"}"#, r#"{"token":""}"#, "not json"] {
            let server = MockServer::start().await;
            Mock::given(method("GET"))
                .and(path("/v2/auth/temporary"))
                .respond_with(ResponseTemplate::new(200).set_body_string(body))
                .mount(&server)
                .await;

            assert!(
                matches!(
                    api_for(&server).acquire().await,
                    Err(Error::AuthRequestFailed { status: Some(200), .. })
                ),
                "body {:?} should not yield a token",
                body
            );
        }
    }
}
