//! Remote configuration client.
//!
//! This module contains `HttpFetcher`, which retrieves a single remote
//! configuration document from a configuration server.
//! The document describes one rclone remote:
//!
//! ```json
//! { "name": "myremote", "config": { "type": "s3", "chunk_size": 42 } }
//! ```

use failure::Fail;
use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// Remote configuration document, as served by the configuration server.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub(crate) struct RemoteConfig {
    /// Name of the described remote.
    pub(crate) name: String,
    /// Remote parameters, by key. Missing or `null` means none.
    #[serde(rename = "config", default, deserialize_with = "null_as_empty")]
    pub(crate) parameters: Map<String, Value>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    let params = Option::<Map<String, Value>>::deserialize(deserializer)?;
    Ok(params.unwrap_or_default())
}

/// Errors from fetching a remote configuration document.
#[derive(Debug, Fail)]
pub(crate) enum FetchError {
    #[fail(display = "failed to get config: {}", _0)]
    Transport(#[cause] reqwest::Error),
    #[fail(display = "config server returned error status: {}", _0)]
    Status(String),
    #[fail(display = "failed to parse json config: {}", _0)]
    Decode(#[cause] serde_json::Error),
}

/// Source of remote configuration documents.
pub(crate) trait ConfigFetcher {
    fn fetch(&self, url: &str) -> Result<RemoteConfig, FetchError>;
}

/// Blocking HTTP client for the configuration server.
#[derive(Clone, Debug)]
pub(crate) struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub(crate) fn new() -> Result<Self, FetchError> {
        let client = Client::builder().build().map_err(FetchError::Transport)?;
        Ok(Self { client })
    }
}

impl ConfigFetcher for HttpFetcher {
    /// Fetch and decode the configuration document at `url`.
    ///
    /// Only `200 OK` is accepted. The response is dropped, and its
    /// connection released, on every return path.
    fn fetch(&self, url: &str) -> Result<RemoteConfig, FetchError> {
        trace!("GET to remote config endpoint: {:?}", url);
        let resp = self.client.get(url).send().map_err(FetchError::Transport)?;

        let status = resp.status();
        if status != StatusCode::OK {
            return Err(FetchError::Status(status.to_string()));
        }

        let body = resp.bytes().map_err(FetchError::Transport)?;
        let cfg: RemoteConfig = serde_json::from_slice(&body).map_err(FetchError::Decode)?;

        info!("using remote '{}' config", cfg.name);
        Ok(cfg)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    /// Serve a single canned HTTP response on a local port.
    ///
    /// Returns the URL to request.
    pub(crate) fn serve_once(status_line: &str, body: &str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status_line,
            body.len(),
            body
        );

        thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            stream.write_all(response.as_bytes()).unwrap();
        });

        format!("http://{}/v1/remote", addr)
    }

    /// Client ignoring any proxy configured in the test environment.
    pub(crate) fn fetcher() -> HttpFetcher {
        let client = Client::builder().no_proxy().build().unwrap();
        HttpFetcher { client }
    }

    #[test]
    fn fetch_ok() {
        let url = serve_once(
            "200 OK",
            r#"{"name":"myremote","config":{"type":"s3","chunk_size":42}}"#,
        );
        let cfg = fetcher().fetch(&url).unwrap();
        assert_eq!(cfg.name, "myremote");
        assert_eq!(cfg.parameters.len(), 2);
        assert_eq!(cfg.parameters["chunk_size"], 42);
    }

    #[test]
    fn fetch_not_found() {
        let url = serve_once("404 Not Found", "not found");
        let err = fetcher().fetch(&url).unwrap_err();
        match err {
            FetchError::Status(s) => assert_eq!(s, "404 Not Found"),
            e => panic!("unexpected error: {}", e),
        }
    }

    #[test]
    fn fetch_other_success_status_is_rejected() {
        let url = serve_once("204 No Content", "");
        let err = fetcher().fetch(&url).unwrap_err();
        assert!(matches!(err, FetchError::Status(_)));
    }

    #[test]
    fn fetch_malformed_json() {
        let url = serve_once("200 OK", "{not json");
        let err = fetcher().fetch(&url).unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
        assert!(err.to_string().starts_with("failed to parse json config"));
    }

    #[test]
    fn fetch_connection_refused() {
        let addr = TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap();
        let url = format!("http://{}/", addr);
        let err = fetcher().fetch(&url).unwrap_err();
        assert!(matches!(err, FetchError::Transport(_)));
    }

    #[test]
    fn decode_shape() {
        let cfg: RemoteConfig = serde_json::from_str(r#"{"name":"empty"}"#).unwrap();
        assert!(cfg.parameters.is_empty());

        let cfg: RemoteConfig = serde_json::from_str(r#"{"name":"r","config":null}"#).unwrap();
        assert_eq!(cfg.name, "r");
        assert!(cfg.parameters.is_empty());

        assert!(serde_json::from_str::<RemoteConfig>(r#"{"config":{}}"#).is_err());
        assert!(serde_json::from_str::<RemoteConfig>(r#"{"name":"x","config":[1]}"#).is_err());
    }
}
