//! HTTP gateway for the monitoring REST API.
//!
//! # Responsibilities
//! - Issue list / create / update / delete requests
//! - Inject bearer token and JSON headers on every request
//! - Map HTTP outcomes onto `GatewayError`

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Response, StatusCode};

use crate::config::RemoteConfig;
use crate::remote::types::{CheckList, CheckPayload, CreatedCheck, RemoteCheckRecord};
use crate::remote::{GatewayError, RemoteGateway};

const MAX_ERROR_BODY: usize = 512;

/// reqwest-backed `RemoteGateway`.
#[derive(Clone)]
pub struct HttpGateway {
    client: Client,
    collection_url: String,
}

impl HttpGateway {
    /// Build the client once; settings are not re-read afterwards.
    pub fn new(config: &RemoteConfig) -> Result<Self, GatewayError> {
        let mut headers = HeaderMap::new();
        let bearer = HeaderValue::from_str(&format!("Bearer {}", config.token))
            .map_err(|e| GatewayError::Transport(format!("invalid token: {}", e)))?;
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            collection_url: config.collection_url(),
        })
    }

    fn item_url(&self, id: &str) -> String {
        format!("{}/{}", self.collection_url, id)
    }

    /// Fetch the full collection of checks.
    pub async fn list(&self) -> Result<Vec<RemoteCheckRecord>, GatewayError> {
        let resp = self.client.get(&self.collection_url).send().await?;
        let status = resp.status();
        if status != StatusCode::OK {
            return Err(status_error(resp).await);
        }

        let is_json = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.starts_with("application/json"))
            .unwrap_or(false);
        if !is_json {
            return Err(GatewayError::Decode(
                "list response is not application/json".to_string(),
            ));
        }

        let bytes = resp.bytes().await?;
        let list: CheckList = serde_json::from_slice(&bytes)
            .map_err(|e| GatewayError::Decode(e.to_string()))?;

        tracing::debug!(count = list.http_checks.len(), "Listed remote health checks");
        Ok(list.http_checks)
    }
}

impl RemoteGateway for HttpGateway {
    async fn find(&self, name: &str) -> Result<Option<RemoteCheckRecord>, GatewayError> {
        let mut matches = self
            .list()
            .await?
            .into_iter()
            .filter(|check| check.name == name);

        let first = matches.next();
        let extra = matches.count();
        if extra > 0 {
            tracing::warn!(name = %name, duplicates = extra, "Multiple remote checks share one name, using the first");
        }
        Ok(first)
    }

    async fn create(&self, payload: &CheckPayload) -> Result<Option<String>, GatewayError> {
        let resp = self
            .client
            .post(&self.collection_url)
            .json(payload)
            .send()
            .await?;
        if resp.status() != StatusCode::CREATED {
            return Err(status_error(resp).await);
        }

        // Some deployments answer 201 with an empty body.
        let text = resp.text().await?;
        let id = serde_json::from_str::<CreatedCheck>(&text)
            .ok()
            .and_then(|created| created.id);
        Ok(id)
    }

    async fn update(&self, id: &str, payload: &CheckPayload) -> Result<(), GatewayError> {
        let resp = self
            .client
            .put(self.item_url(id))
            .json(payload)
            .send()
            .await?;
        expect_no_content(resp).await
    }

    async fn delete(&self, id: &str) -> Result<(), GatewayError> {
        let resp = self.client.delete(self.item_url(id)).send().await?;
        expect_no_content(resp).await
    }
}

impl std::fmt::Debug for HttpGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpGateway")
            .field("collection_url", &self.collection_url)
            .finish()
    }
}

async fn expect_no_content(resp: Response) -> Result<(), GatewayError> {
    match resp.status() {
        StatusCode::NO_CONTENT => Ok(()),
        _ => Err(status_error(resp).await),
    }
}

async fn status_error(resp: Response) -> GatewayError {
    let status = resp.status();
    if status == StatusCode::NOT_FOUND {
        return GatewayError::NotFound;
    }
    let mut body = resp.text().await.unwrap_or_default();
    if body.len() > MAX_ERROR_BODY {
        let mut cut = MAX_ERROR_BODY;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
    }
    GatewayError::Status {
        status: status.as_u16(),
        body,
    }
}
