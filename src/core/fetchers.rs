use crate::config::FetcherConfig;
use crate::core::compression::gzip_json;
use crate::domain::model::UploadFile;
use crate::domain::ports::Fetcher;
use crate::utils::error::{FetchError, Result};
use crate::utils::validation::{unsupported_scheme, Validate};
use async_trait::async_trait;
use hyper::ext::ReasonPhrase;
use reqwest::header::{CONTENT_ENCODING, CONTENT_TYPE};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::{ParseError, Url};

pub const OCTET_STREAM: &str = "application/octet-stream";
pub const APPLICATION_JSON: &str = "application/json";
pub const GZIP: &str = "gzip";

/// reqwest-backed `Fetcher`.
///
/// Cloning is cheap; clones share the underlying connection pool.
#[derive(Debug, Clone, Default)]
pub struct HttpFetcher {
    client: Client,
    base_url: Option<Url>,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self {
            client,
            base_url: None,
        }
    }

    pub fn from_config(config: &FetcherConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::builder().user_agent(config.user_agent()).build()?;
        let base_url = match &config.base_url {
            Some(base_url) => Some(Url::parse(base_url).map_err(|e| FetchError::InvalidUrl {
                url: base_url.clone(),
                reason: e.to_string(),
            })?),
            None => None,
        };

        Ok(Self { client, base_url })
    }

    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = Some(base_url);
        self
    }

    pub fn base_url(&self) -> Option<&Url> {
        self.base_url.as_ref()
    }

    /// Absolute URLs pass through; relative ones are joined onto the base URL.
    pub fn resolve_url(&self, url: &str) -> Result<Url> {
        let resolved = match Url::parse(url) {
            Ok(resolved) => resolved,
            Err(ParseError::RelativeUrlWithoutBase) => match &self.base_url {
                Some(base) => base.join(url).map_err(|e| FetchError::InvalidUrl {
                    url: url.to_string(),
                    reason: e.to_string(),
                })?,
                None => {
                    return Err(FetchError::InvalidUrl {
                        url: url.to_string(),
                        reason: "relative URL without a base URL".to_string(),
                    })
                }
            },
            Err(e) => {
                return Err(FetchError::InvalidUrl {
                    url: url.to_string(),
                    reason: e.to_string(),
                })
            }
        };

        match unsupported_scheme(&resolved) {
            None => Ok(resolved),
            Some(reason) => Err(FetchError::InvalidUrl {
                url: url.to_string(),
                reason,
            }),
        }
    }
}

fn ensure_ok(response: Response) -> Result<Response> {
    let status = response.status();
    tracing::debug!("Response status {} from {}", status, response.url());

    if !status.is_success() {
        tracing::warn!("Request to {} failed with status {}", response.url(), status);
        // hyper only records the phrase when it differs from the canonical one
        let reason = response
            .extensions()
            .get::<ReasonPhrase>()
            .map(|phrase| String::from_utf8_lossy(phrase.as_bytes()).into_owned());
        return Err(FetchError::from_status(status, reason.as_deref()));
    }
    Ok(response)
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch_binary(&self, url: &str) -> Result<Vec<u8>> {
        let url = self.resolve_url(url)?;
        tracing::debug!("GET {}", url);

        let response = ensure_ok(self.client.get(url).send().await?)?;
        let bytes = response.bytes().await?;

        tracing::debug!("Received {} bytes", bytes.len());
        Ok(bytes.to_vec())
    }

    async fn fetch_json<T>(&self, url: &str) -> Result<T>
    where
        T: DeserializeOwned + Send,
    {
        let url = self.resolve_url(url)?;
        tracing::debug!("GET {} (json)", url);

        let response = ensure_ok(self.client.get(url).send().await?)?;
        Ok(response.json::<T>().await?)
    }

    async fn send_file<T>(&self, url: &str, file: UploadFile) -> Result<T>
    where
        T: DeserializeOwned + Send,
    {
        let url = self.resolve_url(url)?;
        tracing::debug!(
            "POST {} ({} bytes, file: {})",
            url,
            file.len(),
            file.name.as_deref().unwrap_or("<unnamed>")
        );

        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, OCTET_STREAM)
            .body(file.data)
            .send()
            .await?;

        Ok(ensure_ok(response)?.json::<T>().await?)
    }

    async fn send_json<D, T>(&self, url: &str, data: &D) -> Result<T>
    where
        D: Serialize + Sync + ?Sized,
        T: DeserializeOwned + Send,
    {
        let url = self.resolve_url(url)?;
        let body = gzip_json(data)?;
        tracing::debug!("POST {} ({} bytes gzipped json)", url, body.len());

        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, APPLICATION_JSON)
            .header(CONTENT_ENCODING, GZIP)
            .body(body)
            .send()
            .await?;

        Ok(ensure_ok(response)?.json::<T>().await?)
    }
}

/// GETs `url` and returns the raw body.
pub async fn fetch_binary(url: &str) -> Result<Vec<u8>> {
    HttpFetcher::default().fetch_binary(url).await
}

/// GETs `url` and decodes the body as JSON.
pub async fn fetch_json<T>(url: &str) -> Result<T>
where
    T: DeserializeOwned + Send,
{
    HttpFetcher::default().fetch_json(url).await
}

/// POSTs the file bytes as `application/octet-stream` and decodes the JSON reply.
pub async fn send_file<T>(url: &str, file: impl Into<UploadFile>) -> Result<T>
where
    T: DeserializeOwned + Send,
{
    HttpFetcher::default().send_file(url, file.into()).await
}

/// POSTs `data` as gzip-compressed JSON and decodes the JSON reply.
pub async fn send_json<D, T>(url: &str, data: &D) -> Result<T>
where
    D: Serialize + Sync + ?Sized,
    T: DeserializeOwned + Send,
{
    HttpFetcher::default().send_json(url, data).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::{json, Value};

    fn fetcher_for(server: &MockServer) -> HttpFetcher {
        let config = FetcherConfig::default().with_base_url(server.base_url());
        HttpFetcher::from_config(&config).unwrap()
    }

    #[test]
    fn test_resolve_absolute_url() {
        let fetcher = HttpFetcher::default();
        let url = fetcher.resolve_url("https://example.com/a/b?c=1").unwrap();
        assert_eq!(url.as_str(), "https://example.com/a/b?c=1");
    }

    #[test]
    fn test_resolve_relative_url_against_base() {
        let base = Url::parse("http://localhost:8080/app/").unwrap();
        let fetcher = HttpFetcher::default().with_base_url(base);

        assert_eq!(
            fetcher.resolve_url("/x").unwrap().as_str(),
            "http://localhost:8080/x"
        );
        assert_eq!(
            fetcher.resolve_url("models/a.glb").unwrap().as_str(),
            "http://localhost:8080/app/models/a.glb"
        );
    }

    #[test]
    fn test_resolve_relative_url_without_base() {
        let err = HttpFetcher::default().resolve_url("/x").unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl { .. }));
    }

    #[test]
    fn test_resolve_rejects_non_http_scheme() {
        let err = HttpFetcher::default()
            .resolve_url("file:///etc/passwd")
            .unwrap_err();
        assert!(err.to_string().contains("Unsupported URL scheme"));
    }

    #[test]
    fn test_from_config_rejects_invalid_base_url() {
        let config = FetcherConfig::default().with_base_url("not a url");
        assert!(HttpFetcher::from_config(&config).is_err());
    }

    #[tokio::test]
    async fn test_fetch_binary_returns_exact_bytes() {
        let server = MockServer::start();
        let payload: Vec<u8> = (0..=255u8).collect();

        let mock = server.mock(|when, then| {
            when.method(GET).path("/blob");
            then.status(200)
                .header("content-type", OCTET_STREAM)
                .body(&payload);
        });

        let bytes = fetcher_for(&server).fetch_binary("/blob").await.unwrap();

        mock.assert();
        assert_eq!(bytes, payload);
    }

    #[tokio::test]
    async fn test_fetch_json_decodes_body() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/scene.json");
            then.status(200)
                .json_body(json!({"objects": [{"id": 1, "name": "cube"}], "version": 3}));
        });

        let value: Value = fetcher_for(&server)
            .fetch_json("/scene.json")
            .await
            .unwrap();

        mock.assert();
        assert_eq!(
            value,
            json!({"objects": [{"id": 1, "name": "cube"}], "version": 3})
        );
    }

    #[tokio::test]
    async fn test_fetch_json_invalid_body_is_transport_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/broken");
            then.status(200).body("{not json");
        });

        let result: Result<Value> = fetcher_for(&server).fetch_json("/broken").await;
        assert!(matches!(result, Err(FetchError::Transport(_))));
    }

    #[tokio::test]
    async fn test_non_success_status_becomes_http_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/missing");
            then.status(404);
        });

        let err = fetcher_for(&server)
            .fetch_binary("/missing")
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(404));
        let message = err.to_string();
        assert!(message.contains("404"));
        assert!(message.contains("Not Found"));
    }

    #[tokio::test]
    async fn test_server_reason_phrase_is_kept() {
        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        use tokio::net::TcpListener;

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            socket
                .write_all(
                    b"HTTP/1.1 404 Custom Gone\r\ncontent-length: 0\r\nconnection: close\r\n\r\n",
                )
                .await
                .unwrap();
            socket.shutdown().await.unwrap();
        });

        let err = fetch_binary(&format!("http://{}/asset.bin", addr))
            .await
            .unwrap_err();
        server.await.unwrap();

        assert_eq!(err.status(), Some(404));
        assert_eq!(err.to_string(), "Failed to fetch(404): Custom Gone");
    }

    #[tokio::test]
    async fn test_redirect_is_followed() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/old");
            then.status(302).header("location", "/new");
        });
        let target = server.mock(|when, then| {
            when.method(GET).path("/new");
            then.status(200).body("moved");
        });

        let bytes = fetcher_for(&server).fetch_binary("/old").await.unwrap();

        target.assert();
        assert_eq!(bytes, b"moved".to_vec());
    }

    #[tokio::test]
    async fn test_user_agent_from_config() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/ua")
                .header("user-agent", "viewer-tests/1.0");
            then.status(200).json_body(json!(true));
        });

        let config = FetcherConfig {
            base_url: Some(server.base_url()),
            user_agent: Some("viewer-tests/1.0".to_string()),
        };
        let fetcher = HttpFetcher::from_config(&config).unwrap();
        let ok: bool = fetcher.fetch_json("/ua").await.unwrap();

        mock.assert();
        assert!(ok);
    }

    #[tokio::test]
    async fn test_connection_refused_is_passed_through() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);

        let err = fetch_binary(&format!("http://127.0.0.1:{}/gone", port))
            .await
            .unwrap_err();

        match err {
            FetchError::Transport(inner) => assert!(inner.is_connect()),
            other => panic!("expected transport error, got {:?}", other),
        }
    }
}
