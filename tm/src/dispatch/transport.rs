//! Transport trait and the HTTP implementation

use async_trait::async_trait;
use reqwest::Url;
use tracing::debug;

use super::DispatchError;

/// Delivers one payload to the mail endpoint
#[async_trait]
pub trait Transport: Send + Sync {
    /// POST the payload as the request body
    async fn post(&self, body: String) -> Result<(), DispatchError>;

    /// Where payloads are delivered, for display and logging
    fn endpoint(&self) -> &str;
}

/// Plain HTTP POST via reqwest
///
/// No custom headers, no authentication, no request timeout.
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpTransport {
    /// Create a transport for the given endpoint URL
    pub fn new(endpoint: &str) -> Result<Self, DispatchError> {
        debug!(%endpoint, "HttpTransport::new: called");
        let url = Url::parse(endpoint).map_err(|e| DispatchError::InvalidEndpoint {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })?;

        if !matches!(url.scheme(), "http" | "https") {
            debug!(scheme = url.scheme(), "HttpTransport::new: unsupported scheme");
            return Err(DispatchError::InvalidEndpoint {
                endpoint: endpoint.to_string(),
                reason: "URL must start with http:// or https://".to_string(),
            });
        }

        let client = reqwest::Client::builder().build()?;
        Ok(Self { client, endpoint: url })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post(&self, body: String) -> Result<(), DispatchError> {
        debug!(endpoint = %self.endpoint, body_len = body.len(), "HttpTransport::post: called");
        let response = self.client.post(self.endpoint.clone()).body(body).send().await?;

        let status = response.status();
        debug!(%status, "HttpTransport::post: response received");
        if !status.is_success() {
            return Err(DispatchError::Status(status.as_u16()));
        }
        Ok(())
    }

    fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_transport_accepts_default_endpoint() {
        let transport = HttpTransport::new("http://localhost:8192/").unwrap();
        assert_eq!(transport.endpoint(), "http://localhost:8192/");
    }

    #[test]
    fn test_http_transport_rejects_non_http() {
        let err = HttpTransport::new("ftp://localhost/").err().unwrap();
        assert!(matches!(err, DispatchError::InvalidEndpoint { .. }));
    }

    #[test]
    fn test_http_transport_rejects_garbage() {
        assert!(HttpTransport::new("not a url").is_err());
    }

    #[tokio::test]
    async fn test_http_transport_unreachable_is_error() {
        // Port 9 (discard) on localhost is almost never listening
        let transport = HttpTransport::new("http://127.0.0.1:9/").unwrap();
        assert!(transport.post("x".to_string()).await.is_err());
    }
}
