use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use serde_json::{json, Value};
use tracing::{debug, instrument};

use crate::{introspection::INTROSPECTION_QUERY, schema_store::Endpoint};

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("Failed to create HTTP client: {0}")]
    ClientCreation(reqwest::Error),
    #[error("Failed to fetch introspection from network: {0}")]
    Network(#[from] reqwest_middleware::Error),
    #[error("Failed to read introspection response: {0}")]
    NetworkResponse(#[from] reqwest::Error),
    #[error("Introspection response is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
    #[error("Introspection failed: {0}")]
    IntrospectionErrors(String),
}

/// Obtains a schema from a live endpoint by introspection.
#[async_trait]
pub trait SchemaFetcher: Send + Sync {
    /// Returns the `data` member of the introspection response.
    async fn fetch_introspection(&self, endpoint: &Endpoint) -> Result<Value, FetchError>;
}

pub struct HttpSchemaFetcher {
    client: ClientWithMiddleware,
}

impl HttpSchemaFetcher {
    pub fn try_new(timeout: Duration, retry_count: u32) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(FetchError::ClientCreation)?;
        let retry_policy = ExponentialBackoff::builder().build_with_max_retries(retry_count);
        let client = ClientBuilder::new(client)
            .with(RetryTransientMiddleware::new_with_policy(retry_policy))
            .build();

        Ok(Self { client })
    }
}

#[async_trait]
impl SchemaFetcher for HttpSchemaFetcher {
    #[instrument(level = "debug", skip_all, fields(endpoint = %endpoint))]
    async fn fetch_introspection(&self, endpoint: &Endpoint) -> Result<Value, FetchError> {
        let body = json!({ "query": INTROSPECTION_QUERY });
        let response = self
            .client
            .post(endpoint.url().clone())
            .header(CONTENT_TYPE, "application/json")
            .body(body.to_string())
            .send()
            .await?
            .error_for_status()?;
        let bytes = response.bytes().await?;
        let mut payload: Value = serde_json::from_slice(&bytes)?;

        if let Some(errors) = payload.get("errors").filter(|errors| !errors.is_null()) {
            return Err(FetchError::IntrospectionErrors(errors.to_string()));
        }

        match payload.get_mut("data").map(Value::take) {
            Some(data) if !data.is_null() => {
                debug!("introspection response received");
                Ok(data)
            }
            _ => Err(FetchError::IntrospectionErrors(
                "response does not contain data".to_string(),
            )),
        }
    }
}
