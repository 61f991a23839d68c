//! Shared GET-and-decode plumbing for the provider clients.

use crate::resolver::ServiceResolver;
use catalog_types::{CatalogError, Result};
use reqwest::{StatusCode, Url};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Network settings shared by every provider client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientOptions {
    /// Upper bound for establishing a TCP connection
    pub connect_timeout: Duration,
    /// Upper bound for one whole request, body included
    pub request_timeout: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_millis(1000),
            request_timeout: Duration::from_millis(2000),
        }
    }
}

/// Build the connection-pooling HTTP client shared by all provider clients.
pub fn build_http_client(options: &ClientOptions) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .connect_timeout(options.connect_timeout)
        .build()
        .map_err(|e| CatalogError::unavailable("http-client", e.to_string()))
}

/// One provider, addressed by logical name.
#[derive(Clone)]
pub(crate) struct ProviderHttp {
    client: reqwest::Client,
    resolver: Arc<dyn ServiceResolver>,
    service: &'static str,
    request_timeout: Duration,
}

impl ProviderHttp {
    pub(crate) fn new(
        client: reqwest::Client,
        resolver: Arc<dyn ServiceResolver>,
        service: &'static str,
        request_timeout: Duration,
    ) -> Self {
        Self {
            client,
            resolver,
            service,
            request_timeout,
        }
    }

    pub(crate) fn service(&self) -> &'static str {
        self.service
    }

    /// Single GET against `segments` below the provider's base URL.
    ///
    /// `resource` only names the thing being fetched in a `NotFound` error.
    pub(crate) async fn get_json<T: DeserializeOwned>(
        &self,
        segments: &[&str],
        resource: &str,
    ) -> Result<T> {
        let base = self.resolver.resolve(self.service).await?;
        let url = self.endpoint(&base, segments)?;
        debug!(service = self.service, %url, "GET");

        let response = self
            .client
            .get(url)
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(CatalogError::not_found(self.service, resource));
        }
        if !status.is_success() {
            return Err(CatalogError::unavailable(
                self.service,
                format!("HTTP {status}"),
            ));
        }

        let body = response.bytes().await.map_err(|e| self.transport_error(e))?;
        serde_json::from_slice(&body).map_err(|e| CatalogError::decode(self.service, e.to_string()))
    }

    fn endpoint(&self, base: &str, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(base).map_err(|e| {
            CatalogError::unavailable(self.service, format!("invalid address {base}: {e}"))
        })?;
        url.path_segments_mut()
            .map_err(|_| {
                CatalogError::unavailable(self.service, format!("address {base} cannot carry a path"))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn transport_error(&self, err: reqwest::Error) -> CatalogError {
        let reason = if err.is_timeout() {
            format!("request timed out after {:?}", self.request_timeout)
        } else if err.is_connect() {
            format!("connection failed: {err}")
        } else {
            err.to_string()
        };
        CatalogError::unavailable(self.service, reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::StaticResolver;

    fn provider(base: &str) -> ProviderHttp {
        let resolver = StaticResolver::new().with_service("TEST-SERVICE", base);
        ProviderHttp::new(
            reqwest::Client::new(),
            Arc::new(resolver),
            "TEST-SERVICE",
            Duration::from_millis(100),
        )
    }

    #[test]
    fn test_endpoint_appends_encoded_segments() {
        let http = provider("http://127.0.0.1:8083/");
        let url = http
            .endpoint("http://127.0.0.1:8083/", &["rating", "users", "a b/c"])
            .unwrap();

        assert_eq!(url.as_str(), "http://127.0.0.1:8083/rating/users/a%20b%2Fc");
    }

    #[test]
    fn test_endpoint_keeps_base_path_prefix() {
        let http = provider("http://gateway.local/ratings-api");
        let url = http
            .endpoint("http://gateway.local/ratings-api", &["rating", "m1"])
            .unwrap();

        assert_eq!(url.as_str(), "http://gateway.local/ratings-api/rating/m1");
    }

    #[test]
    fn test_endpoint_rejects_garbage_address() {
        let http = provider("not a url");
        let err = http.endpoint("not a url", &["movie", "m1"]).unwrap_err();

        assert_eq!(err.kind(), catalog_types::ErrorKind::UpstreamUnavailable);
    }
}
