//! HTTP client for the certificate REST endpoints.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use certdesk_core::{Certificate, CertificateId, CertificateStatus, CustomerId, OwnerId, Page};

use crate::error::StoreError;
use crate::store::{CertificateExporter, CertificateStore, ExportSummary};

/// HTTP store configuration.
#[derive(Debug, Clone)]
pub struct HttpStoreConfig {
    /// API root, e.g. `https://api.example.com/v1`.
    pub base_url: String,

    /// Bearer token for the signed-in owner.
    pub token: Option<String>,

    /// Per-request timeout (seconds).
    pub timeout_secs: u64,
}

impl Default for HttpStoreConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".to_string(),
            token: None,
            timeout_secs: 30,
        }
    }
}

/// Certificate store backed by the REST API.
pub struct HttpStore {
    inner: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

#[derive(Deserialize)]
struct FetchResponse {
    items: Vec<Certificate>,
    total_count: usize,
    has_more: bool,
}

/// `{success, error?}` acknowledgement.
#[derive(Deserialize)]
struct AckResponse {
    success: bool,
    #[serde(default)]
    error: Option<String>,
}

impl AckResponse {
    fn into_result(self) -> Result<(), StoreError> {
        if self.success {
            Ok(())
        } else {
            Err(StoreError::Rejected(self.error))
        }
    }
}

#[derive(Deserialize)]
struct StatusResponse {
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    #[serde(alias = "message")]
    error: String,
}

#[derive(Serialize)]
struct DeleteRequest<'a> {
    owner_id: &'a OwnerId,
}

#[derive(Serialize)]
struct StatusRequest<'a> {
    ids: &'a [CertificateId],
    owner_id: &'a OwnerId,
    status: CertificateStatus,
}

#[derive(Serialize)]
struct LinkRequest<'a> {
    customer_id: Option<&'a CustomerId>,
}

#[derive(Serialize)]
struct ExportRequest<'a> {
    ids: &'a [CertificateId],
    owner_id: &'a OwnerId,
}

impl HttpStore {
    /// Create a new HTTP store.
    pub fn new(config: HttpStoreConfig) -> Result<Self, StoreError> {
        let inner = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            inner,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send<B, T>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, StoreError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = self.url(path);
        let request_id = Uuid::new_v4().to_string();
        debug!(method = %method, url = %url, request_id = %request_id, "Store request");

        let mut request = self
            .inner
            .request(method, &url)
            .header("x-request-id", request_id.as_str());
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(classify_status(status, &text));
        }

        response
            .json()
            .await
            .map_err(|e| StoreError::Serialization(e.to_string()))
    }
}

/// Map a non-success HTTP status and its body onto the store taxonomy.
fn classify_status(status: StatusCode, body: &str) -> StoreError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.error)
        .unwrap_or_else(|_| body.trim().to_string());
    let message = if message.is_empty() {
        status.canonical_reason().unwrap_or("request failed").to_string()
    } else {
        message
    };

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => StoreError::Auth(message),
        _ => StoreError::Server {
            status: status.as_u16(),
            message,
        },
    }
}

#[async_trait]
impl CertificateStore for HttpStore {
    async fn fetch_page(
        &self,
        owner: &OwnerId,
        page: u32,
        page_size: u32,
    ) -> Result<Page, StoreError> {
        let path = format!(
            "/owners/{}/certificates?page={}&page_size={}",
            owner, page, page_size
        );
        let response: FetchResponse = self.send::<(), _>(Method::GET, &path, None).await?;

        Ok(Page {
            items: response.items,
            total_count: response.total_count,
            has_more: response.has_more,
            page,
        })
    }

    async fn soft_delete(&self, id: &CertificateId, owner: &OwnerId) -> Result<(), StoreError> {
        let path = format!("/certificates/{}/delete", id);
        let body = DeleteRequest { owner_id: owner };
        let ack: AckResponse = self.send(Method::POST, &path, Some(&body)).await?;
        ack.into_result()
    }

    async fn update_status(
        &self,
        ids: &[CertificateId],
        owner: &OwnerId,
        status: CertificateStatus,
    ) -> Result<(), StoreError> {
        let body = StatusRequest {
            ids,
            owner_id: owner,
            status,
        };
        let response: StatusResponse = self
            .send(Method::POST, "/certificates/status", Some(&body))
            .await?;

        match response.error {
            Some(error) => Err(StoreError::Rejected(Some(error))),
            None => Ok(()),
        }
    }

    async fn update_link(
        &self,
        id: &CertificateId,
        customer: Option<&CustomerId>,
    ) -> Result<(), StoreError> {
        let path = format!("/certificates/{}/link", id);
        let body = LinkRequest {
            customer_id: customer,
        };
        let ack: AckResponse = self.send(Method::POST, &path, Some(&body)).await?;
        ack.into_result()
    }
}

#[async_trait]
impl CertificateExporter for HttpStore {
    async fn export_batch(
        &self,
        ids: &[CertificateId],
        owner: &OwnerId,
    ) -> Result<ExportSummary, StoreError> {
        let body = ExportRequest {
            ids,
            owner_id: owner,
        };
        self.send(Method::POST, "/certificates/export", Some(&body))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let store = HttpStore::new(HttpStoreConfig {
            base_url: "https://api.example.com/v1/".to_string(),
            ..Default::default()
        })
        .unwrap();

        assert_eq!(
            store.url("/certificates/export"),
            "https://api.example.com/v1/certificates/export"
        );
    }

    #[test]
    fn test_classify_auth_status() {
        let err = classify_status(StatusCode::UNAUTHORIZED, r#"{"error":"session expired"}"#);
        assert!(matches!(err, StoreError::Auth(ref m) if m == "session expired"));
    }

    #[test]
    fn test_classify_server_status_plain_body() {
        let err = classify_status(StatusCode::BAD_GATEWAY, "upstream down\n");
        match err {
            StoreError::Server { status, message } => {
                assert_eq!(status, 502);
                assert_eq!(message, "upstream down");
            }
            other => panic!("Expected Server, got {:?}", other),
        }
    }

    #[test]
    fn test_classify_empty_body_uses_reason() {
        let err = classify_status(StatusCode::INTERNAL_SERVER_ERROR, "");
        assert_eq!(err.remote_message(), Some("Internal Server Error"));
    }

    #[test]
    fn test_ack_response_failure_carries_error() {
        let ack: AckResponse =
            serde_json::from_str(r#"{"success":false,"error":"already deleted"}"#).unwrap();
        match ack.into_result() {
            Err(StoreError::Rejected(Some(message))) => assert_eq!(message, "already deleted"),
            other => panic!("Expected Rejected, got {:?}", other),
        }

        let ack: AckResponse = serde_json::from_str(r#"{"success":true}"#).unwrap();
        assert!(ack.into_result().is_ok());
    }

    #[test]
    fn test_link_request_serializes_null_for_unlink() {
        let body = LinkRequest { customer_id: None };
        assert_eq!(serde_json::to_string(&body).unwrap(), r#"{"customer_id":null}"#);
    }
}
