// HTTP data service
//
// GET  {base}/reference-data -> {"sites": [...], "equipments": [...]}
// POST {base}/records        <- {"fieldName": "value", ...}

use async_trait::async_trait;
use log::{info, warn};
use reqwest::Client;
use std::time::Duration;
use url::Url;

use super::{DataService, ServiceError};
use crate::models::form::FormRecord;
use crate::models::reference::ReferenceData;

const REFERENCE_PATH: &str = "reference-data";
const RECORDS_PATH: &str = "records";

pub struct HttpDataService {
    client: Client,
    reference_url: Url,
    records_url: Url,
}

impl HttpDataService {
    pub fn new(base_url: &str, request_timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(request_timeout)
            .user_agent(concat!("site-entry-wizard/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {}", e))?;
        Self::with_client(client, base_url)
    }

    pub fn with_client(client: Client, base_url: &str) -> anyhow::Result<Self> {
        let base = normalize_base(base_url)?;
        Ok(Self {
            client,
            reference_url: base.join(REFERENCE_PATH)?,
            records_url: base.join(RECORDS_PATH)?,
        })
    }

    pub fn reference_url(&self) -> &Url {
        &self.reference_url
    }

    pub fn records_url(&self) -> &Url {
        &self.records_url
    }
}

/// Parse the base URL and make sure it ends with '/' so `join` appends instead of replacing the
/// last path segment.
fn normalize_base(base_url: &str) -> anyhow::Result<Url> {
    let trimmed = base_url.trim();
    if trimmed.is_empty() {
        return Err(anyhow::anyhow!("service.base_url is required in http mode"));
    }
    let mut url = Url::parse(trimmed)
        .map_err(|e| anyhow::anyhow!("Invalid service.base_url '{}': {}", trimmed, e))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(anyhow::anyhow!(
            "service.base_url must be http or https, got '{}'",
            url.scheme()
        ));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn transport_error(e: reqwest::Error) -> ServiceError {
    // Nothing was sent on a connect failure; anything later may have reached the server.
    if e.is_connect() {
        return ServiceError::unreachable(
            "Unable to reach the data service. Check network connectivity.",
            format!("HTTP connect error: {}", e),
        );
    }
    let user_message = if e.is_timeout() {
        "The data service timed out. Check network connectivity."
    } else {
        "The connection to the data service failed mid-request."
    };
    ServiceError::transport(user_message, format!("HTTP error: {}", e))
}

#[async_trait]
impl DataService for HttpDataService {
    async fn fetch_reference_data(&self) -> Result<ReferenceData, ServiceError> {
        info!(
            "[PHASE: service] [STEP: fetch_reference] GET {}",
            self.reference_url
        );
        let resp = self
            .client
            .get(self.reference_url.clone())
            .send()
            .await
            .map_err(transport_error)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(
                "[PHASE: service] [STEP: fetch_reference] Rejected with status {}",
                status
            );
            return Err(ServiceError::rejected(status.as_u16(), body));
        }

        resp.json::<ReferenceData>()
            .await
            .map_err(|e| ServiceError::decode(format!("reference data: {}", e)))
    }

    async fn save_record(&self, record: &FormRecord) -> Result<(), ServiceError> {
        info!(
            "[PHASE: service] [STEP: save] POST {} ({} fields)",
            self.records_url,
            record.len()
        );
        let resp = self
            .client
            .post(self.records_url.clone())
            .json(record)
            .send()
            .await
            .map_err(transport_error)?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!("[PHASE: service] [STEP: save] Rejected with status {}", status);
            return Err(ServiceError::rejected(status.as_u16(), body));
        }
        Ok(())
    }
}
