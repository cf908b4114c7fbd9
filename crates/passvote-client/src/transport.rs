use std::time::Duration;

use alloy_primitives::Address;
use async_trait::async_trait;
use serde_json::Value;

use passvote_core::ProposalRestriction;

use crate::error::TransportError;
use crate::requests::{NonceResponse, SignedEndpoint, SignedRequest, VoteRequest};

/// The network boundary of the protocol. Implementations never retry; a
/// retry is a fresh signed action.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Obtain a single-use nonce for `address`.
    async fn fetch_nonce(&self, address: &Address) -> Result<String, TransportError>;

    /// Eligibility restriction of a proposal.
    async fn fetch_restriction(
        &self,
        proposal_id: &str,
    ) -> Result<ProposalRestriction, TransportError>;

    async fn submit_vote(&self, post_id: &str, request: &VoteRequest)
        -> Result<Value, TransportError>;

    async fn submit_signed(
        &self,
        endpoint: SignedEndpoint,
        request: &SignedRequest,
    ) -> Result<Value, TransportError>;
}

/// JSON-over-HTTP transport for the platform API.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, TransportError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn read_json(response: reqwest::Response) -> Result<Value, TransportError> {
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(TransportError::NotFound(response.url().path().to_string()));
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                status: status.as_u16(),
                message,
            });
        }
        response
            .json::<Value>()
            .await
            .map_err(|e| TransportError::InvalidResponse(e.to_string()))
    }

    async fn get(&self, path: &str) -> Result<Value, TransportError> {
        let url = self.url(path);
        tracing::debug!(url = %url, "GET");
        let response = self.client.get(&url).send().await?;
        Self::read_json(response).await
    }

    async fn post<T: serde::Serialize + Sync>(
        &self,
        path: &str,
        body: &T,
    ) -> Result<Value, TransportError> {
        let url = self.url(path);
        tracing::debug!(url = %url, "POST");
        let response = self.client.post(&url).json(body).send().await?;
        Self::read_json(response).await
    }
}

/// Accept both bare bodies and `{ "data": ... }` wrappers.
fn unwrap_data(body: Value) -> Value {
    match body {
        Value::Object(mut map) if map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn fetch_nonce(&self, address: &Address) -> Result<String, TransportError> {
        let body = self.get(&format!("/api/signed/nonce/{}", address)).await?;
        let parsed: NonceResponse = serde_json::from_value(unwrap_data(body))
            .map_err(|e| TransportError::InvalidResponse(format!("nonce: {}", e)))?;
        Ok(parsed.nonce)
    }

    async fn fetch_restriction(
        &self,
        proposal_id: &str,
    ) -> Result<ProposalRestriction, TransportError> {
        let body = self
            .get(&format!("/api/proposal/{}/eligibility", proposal_id))
            .await?;
        serde_json::from_value(unwrap_data(body))
            .map_err(|e| TransportError::InvalidResponse(format!("eligibility: {}", e)))
    }

    async fn submit_vote(
        &self,
        post_id: &str,
        request: &VoteRequest,
    ) -> Result<Value, TransportError> {
        self.post(&format!("/api/posts/{}/vote", post_id), request)
            .await
    }

    async fn submit_signed(
        &self,
        endpoint: SignedEndpoint,
        request: &SignedRequest,
    ) -> Result<Value, TransportError> {
        self.post(&endpoint.to_string(), request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unwrap_data() {
        assert_eq!(unwrap_data(json!({ "data": { "nonce": "x" } })), json!({ "nonce": "x" }));
        assert_eq!(unwrap_data(json!({ "nonce": "x" })), json!({ "nonce": "x" }));
        assert_eq!(unwrap_data(json!([1, 2])), json!([1, 2]));
    }

    #[test]
    fn test_base_url_trailing_slash() {
        let transport = HttpTransport::new("http://localhost:3000/", Duration::from_secs(5)).unwrap();
        assert_eq!(transport.base_url(), "http://localhost:3000");
        assert_eq!(
            transport.url("/api/signed/nonce/0xabc"),
            "http://localhost:3000/api/signed/nonce/0xabc"
        );
    }

    #[tokio::test]
    async fn test_unreachable_server() {
        let transport = HttpTransport::new("http://127.0.0.1:1", Duration::from_millis(500)).unwrap();
        let result = transport.fetch_nonce(&Address::ZERO).await;
        assert!(matches!(result, Err(TransportError::Request(_))));
    }
}
