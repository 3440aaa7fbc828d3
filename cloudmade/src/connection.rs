//! Connection to CloudMade's servers: credentials, host, and the HTTP transport.

use std::{fmt, sync::Arc, time::Duration};

use bytes::Bytes;
use futures::future::BoxFuture;

use crate::error::{Error, Result};

pub use reqwest::header::HeaderValue;

pub const DEFAULT_HOST: &str = "cloudmade.com";
pub const DEFAULT_PORT: u16 = 80;

const API_KEY_VAR: &str = "CLOUDMADE_API_KEY";
const HOST_VAR: &str = "CLOUDMADE_HOST";
const PORT_VAR: &str = "CLOUDMADE_PORT";

/// Controls how [`HttpTransport`] uses the HTTP protocol.
pub struct HttpOptions {
    /// User agent to be sent to the servers.
    pub user_agent: Option<HeaderValue>,

    /// Timeout of the whole request, including reading the body. No timeout by default.
    pub timeout: Option<Duration>,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            user_agent: Some(HeaderValue::from_static(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION"),
            ))),
            timeout: None,
        }
    }
}

/// Performs a single HTTP GET and hands back the raw body.
pub trait Transport: Send + Sync {
    fn get<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Bytes>>;
}

/// [`Transport`] backed by [`reqwest`].
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self> {
        Self::with_options(HttpOptions::default())
    }

    pub fn with_options(options: HttpOptions) -> Result<Self> {
        let mut builder = reqwest::Client::builder();

        if let Some(user_agent) = options.user_agent {
            builder = builder.user_agent(user_agent);
        }

        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
        })
    }
}

async fn download(client: &reqwest::Client, url: &str) -> Result<Bytes> {
    let response = client.get(url).send().await?;
    let status = response.status();

    log::debug!("Got {status:?} from '{url}'.");

    if !status.is_success() {
        return Err(Error::Status {
            status,
            url: url.to_owned(),
        });
    }

    Ok(response.bytes().await?)
}

impl Transport for HttpTransport {
    fn get<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<Bytes>> {
        Box::pin(download(&self.client, url))
    }
}

/// Credentials and address of CloudMade's services, shared by all of them.
#[derive(Clone)]
pub struct Connection {
    api_key: String,
    host: String,
    port: u16,
    transport: Arc<dyn Transport>,
}

impl Connection {
    /// Connect to `cloudmade.com`, port 80.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_host(api_key, DEFAULT_HOST, DEFAULT_PORT)
    }

    pub fn with_host(
        api_key: impl Into<String>,
        host: impl Into<String>,
        port: u16,
    ) -> Result<Self> {
        Self::with_transport(api_key, host, port, HttpTransport::new()?)
    }

    /// Use custom [`Transport`] instead of the default [`HttpTransport`].
    pub fn with_transport(
        api_key: impl Into<String>,
        host: impl Into<String>,
        port: u16,
        transport: impl Transport + 'static,
    ) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.is_empty() {
            return Err(Error::invalid_argument("API key is not specified"));
        }

        Ok(Self {
            api_key,
            host: host.into(),
            port,
            transport: Arc::new(transport),
        })
    }

    /// Configure the connection from `CLOUDMADE_API_KEY` and optional `CLOUDMADE_HOST` and
    /// `CLOUDMADE_PORT` environment variables.
    pub fn from_env() -> Result<Self> {
        let (api_key, host, port) = settings_from(|name| std::env::var(name).ok())?;
        Self::with_host(api_key, host, port)
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Full URL of a request, e.g. `http://tile.cloudmade.com/KEY/1/256/15/19524/15367.png`.
    pub fn url(&self, request: &str, subdomain: Option<&str>) -> String {
        let mut domain = match subdomain {
            Some(subdomain) => format!("{subdomain}.{}", self.host),
            None => self.host.clone(),
        };

        if self.port != DEFAULT_PORT {
            domain = format!("{domain}:{}", self.port);
        }

        format!("http://{domain}/{}{request}", self.api_key)
    }

    /// Call CloudMade's service and return the raw response body.
    pub async fn call_service(&self, request: &str, subdomain: Option<&str>) -> Result<Bytes> {
        let url = self.url(request, subdomain);
        log::debug!("Requesting '{url}'.");
        self.transport.get(&url).await
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("host", &self.host)
            .field("port", &self.port)
            .finish_non_exhaustive()
    }
}

fn settings_from(var: impl Fn(&str) -> Option<String>) -> Result<(String, String, u16)> {
    let api_key =
        var(API_KEY_VAR).ok_or_else(|| Error::Config(format!("{API_KEY_VAR} is not set")))?;
    let host = var(HOST_VAR).unwrap_or_else(|| DEFAULT_HOST.to_owned());
    let port = match var(PORT_VAR) {
        Some(port) => port
            .parse()
            .map_err(|e| Error::Config(format!("{PORT_VAR}='{port}': {e}")))?,
        None => DEFAULT_PORT,
    };

    Ok((api_key, host, port))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingTransport;
    use hypermocker::{StatusCode, hyper::header};
    use std::collections::HashMap;

    fn connection(host: &str, port: u16) -> Connection {
        Connection::with_transport("FAKE_API_KEY", host, port, RecordingTransport::default())
            .unwrap()
    }

    #[test]
    fn url_with_subdomain() {
        assert_eq!(
            connection("fake.url", 80).url("/1/256/15/19524/15367.png", Some("tile")),
            "http://tile.fake.url/FAKE_API_KEY/1/256/15/19524/15367.png"
        );
    }

    #[test]
    fn url_without_subdomain_and_with_custom_port() {
        assert_eq!(
            connection("fake.url", 8080).url("/foo", None),
            "http://fake.url:8080/FAKE_API_KEY/foo"
        );
    }

    #[test]
    fn api_key_is_required() {
        assert!(matches!(
            Connection::with_transport("", "fake.url", 80, RecordingTransport::default()),
            Err(Error::InvalidArgument(_))
        ));
    }

    #[test]
    fn settings_from_variables() {
        let vars = HashMap::from([
            (API_KEY_VAR, "KEY"),
            (HOST_VAR, "example.com"),
            (PORT_VAR, "8080"),
        ]);
        let settings = settings_from(|name| vars.get(name).map(|v| v.to_string())).unwrap();
        assert_eq!(settings, ("KEY".to_owned(), "example.com".to_owned(), 8080));

        let vars = HashMap::from([(API_KEY_VAR, "KEY")]);
        let settings = settings_from(|name| vars.get(name).map(|v| v.to_string())).unwrap();
        assert_eq!(settings, ("KEY".to_owned(), DEFAULT_HOST.to_owned(), DEFAULT_PORT));
    }

    #[test]
    fn settings_need_api_key_and_valid_port() {
        assert!(matches!(settings_from(|_| None), Err(Error::Config(_))));

        let vars = HashMap::from([(API_KEY_VAR, "KEY"), (PORT_VAR, "eighty")]);
        assert!(matches!(
            settings_from(|name| vars.get(name).map(|v| v.to_string())),
            Err(Error::Config(_))
        ));
    }

    #[tokio::test]
    async fn http_transport_passes_body_through() {
        let _ = env_logger::try_init();

        let server = hypermocker::Server::bind().await;
        let mut anticipated = server.anticipate("/tile.png").await;
        let transport = HttpTransport::new().unwrap();
        let url = format!("{}/tile.png", server.url());

        let (body, _) = futures::future::join(transport.get(&url), async {
            let request = anticipated.expect().await;
            assert_eq!(
                request.headers().get(header::USER_AGENT),
                Some(&header::HeaderValue::from_static(concat!(
                    "cloudmade",
                    "/",
                    env!("CARGO_PKG_VERSION"),
                )))
            );
            anticipated.respond(&b"\x89PNG\r\n\x1a\n"[..]).await;
        })
        .await;

        assert_eq!(&body.unwrap()[..], b"\x89PNG\r\n\x1a\n");
    }

    #[tokio::test]
    async fn custom_user_agent_header() {
        let _ = env_logger::try_init();

        let server = hypermocker::Server::bind().await;
        let mut anticipated = server.anticipate("/foo").await;
        let transport = HttpTransport::with_options(HttpOptions {
            user_agent: Some(HeaderValue::from_static("MyApp")),
            ..Default::default()
        })
        .unwrap();
        let url = format!("{}/foo", server.url());

        let (body, _) = futures::future::join(transport.get(&url), async {
            let request = anticipated.expect().await;
            assert_eq!(
                request.headers().get(header::USER_AGENT),
                Some(&header::HeaderValue::from_static("MyApp"))
            );
            anticipated.respond("bar").await;
        })
        .await;

        assert_eq!(&body.unwrap()[..], b"bar");
    }

    #[tokio::test]
    async fn http_error_status_is_an_error() {
        let _ = env_logger::try_init();

        let server = hypermocker::Server::bind().await;
        server
            .anticipate("/missing.png")
            .await
            .respond_with_status(StatusCode::NOT_FOUND)
            .await;

        let transport = HttpTransport::new().unwrap();
        let url = format!("{}/missing.png", server.url());

        match transport.get(&url).await {
            Err(Error::Status { status, url: failed }) => {
                assert_eq!(status, reqwest::StatusCode::NOT_FOUND);
                assert_eq!(failed, url);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[tokio::test]
    async fn request_timeout() {
        let _ = env_logger::try_init();

        let server = hypermocker::Server::bind().await;
        // Never answered.
        let _anticipated = server.anticipate("/slow").await;
        let transport = HttpTransport::with_options(HttpOptions {
            timeout: Some(Duration::from_millis(100)),
            ..Default::default()
        })
        .unwrap();
        let url = format!("{}/slow", server.url());

        assert!(matches!(transport.get(&url).await, Err(Error::Request(_))));
    }

    #[tokio::test]
    async fn unreachable_server_is_an_error() {
        let _ = env_logger::try_init();

        let transport = HttpTransport::new().unwrap();
        assert!(matches!(
            transport.get("totally invalid url").await,
            Err(Error::Request(_))
        ));
    }
}
