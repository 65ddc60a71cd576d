use rand::Rng;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, instrument, warn};

use crate::{
    catalog::{SchemaMalformedError, TypeCatalog},
    data_set::DataSet,
    fetcher::{FetchError, SchemaFetcher},
    introspection::{sdl_from_introspection, IntrospectionError},
    parsing::{parse_operation, OperationDocument},
    schema_store::{Endpoint, SchemaStore},
    synthesizer::{synthesize, SynthesisOutcome},
    validator::validate,
};

#[derive(Debug, Clone)]
pub struct MockRequest {
    pub endpoint: Endpoint,
    /// Operation text; empty when the mock payload should be returned untouched.
    pub document: String,
    /// User supplied response text, a JSON object with a `data` member.
    pub mock_response: String,
    /// Synthesize a random payload instead of validating `mock_response`.
    pub should_randomize: bool,
    pub data_set: DataSet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MockMessage {
    Success,
    FieldNotFound,
    ValidResponse,
    InvalidMockResponse,
    InvalidJson,
    SchemaIntrospectionError,
    ErrorGeneratingRandomResponse,
    InternalServerError,
}

impl MockMessage {
    pub fn as_str(&self) -> &'static str {
        match self {
            MockMessage::Success => "SUCCESS",
            MockMessage::FieldNotFound => "FIELD_NOT_FOUND",
            MockMessage::ValidResponse => "VALID_RESPONSE",
            MockMessage::InvalidMockResponse => "INVALID_MOCK_RESPONSE",
            MockMessage::InvalidJson => "INVALID_JSON",
            MockMessage::SchemaIntrospectionError => "SCHEMA_INTROSPECTION_ERROR",
            MockMessage::ErrorGeneratingRandomResponse => "ERROR_GENERATING_RANDOM_RESPONSE",
            MockMessage::InternalServerError => "INTERNAL_SERVER_ERROR",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MockResponse {
    pub data: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<MockMessage>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub non_matching_fields: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub field_not_found: Vec<String>,
}

impl MockResponse {
    fn with_data(data: Value, message: Option<MockMessage>) -> Self {
        Self {
            data,
            message,
            non_matching_fields: vec![],
            field_not_found: vec![],
        }
    }

    fn failure(message: MockMessage) -> Self {
        Self::with_data(Value::Object(Map::new()), Some(message))
    }
}

#[derive(Debug, thiserror::Error)]
enum SchemaLoadError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Introspection(#[from] IntrospectionError),
}

#[derive(Debug, thiserror::Error)]
enum PrepareError {
    #[error(transparent)]
    Schema(#[from] SchemaMalformedError),
    #[error("Failed to parse document: {0}")]
    Document(String),
}

/// Answers mock requests for an endpoint, loading its schema from the store or,
/// on a miss, by introspecting the endpoint and storing the result.
pub struct Mocker {
    store: Box<dyn SchemaStore>,
    fetcher: Box<dyn SchemaFetcher>,
}

impl Mocker {
    pub fn new(store: Box<dyn SchemaStore>, fetcher: Box<dyn SchemaFetcher>) -> Self {
        Self { store, fetcher }
    }

    #[instrument(level = "debug", skip_all, fields(endpoint = %request.endpoint))]
    pub async fn respond<R: Rng + ?Sized>(&self, request: &MockRequest, rng: &mut R) -> MockResponse {
        if request.document.trim().is_empty() {
            return echo_mock_response(&request.mock_response);
        }

        let sdl = match self.load_schema(&request.endpoint).await {
            Ok(sdl) => sdl,
            Err(err) => {
                warn!(error = %err, "failed to obtain schema");
                return MockResponse::failure(MockMessage::SchemaIntrospectionError);
            }
        };

        let (catalog, document) = match prepare(&sdl, &request.document) {
            Ok(prepared) => prepared,
            Err(err) => {
                warn!(error = %err, "failed to prepare schema or document");
                return MockResponse::failure(MockMessage::InternalServerError);
            }
        };

        if !request.should_randomize {
            return validate_mock_response(&request.mock_response, &catalog);
        }

        match synthesize(&document, &catalog, &request.data_set, rng) {
            Ok(SynthesisOutcome::Data(data)) => {
                MockResponse::with_data(data, Some(MockMessage::Success))
            }
            Ok(SynthesisOutcome::FieldNotFound(path)) => MockResponse {
                field_not_found: vec![path],
                ..MockResponse::failure(MockMessage::FieldNotFound)
            },
            Err(err) => {
                warn!(error = %err, "failed to generate random response");
                MockResponse::failure(MockMessage::ErrorGeneratingRandomResponse)
            }
        }
    }

    async fn load_schema(&self, endpoint: &Endpoint) -> Result<String, SchemaLoadError> {
        match self.store.get(endpoint).await {
            Ok(Some(sdl)) => return Ok(sdl),
            Ok(None) => debug!("schema not cached, introspecting endpoint"),
            Err(err) => warn!(error = %err, "failed to read schema store, introspecting endpoint"),
        }

        let introspection = self.fetcher.fetch_introspection(endpoint).await?;
        let sdl = sdl_from_introspection(&introspection)?;

        if let Err(err) = self.store.put(endpoint, &sdl).await {
            warn!(error = %err, "failed to store introspected schema");
        }

        Ok(sdl)
    }
}

fn prepare(sdl: &str, document: &str) -> Result<(TypeCatalog, OperationDocument), PrepareError> {
    let catalog = TypeCatalog::from_sdl(sdl)?;
    let document = parse_operation(document).map_err(|err| PrepareError::Document(err.to_string()))?;

    Ok((catalog, document))
}

fn echo_mock_response(mock_response: &str) -> MockResponse {
    match serde_json::from_str::<Value>(mock_response) {
        Ok(mut parsed) => {
            let data = parsed.get_mut("data").map(Value::take).unwrap_or(Value::Null);
            MockResponse::with_data(data, None)
        }
        Err(_) => MockResponse::failure(MockMessage::InvalidJson),
    }
}

fn validate_mock_response(mock_response: &str, catalog: &TypeCatalog) -> MockResponse {
    let Ok(mut parsed) = serde_json::from_str::<Value>(mock_response) else {
        return MockResponse::failure(MockMessage::InvalidJson);
    };
    let data = parsed.get_mut("data").map(Value::take).unwrap_or(Value::Null);
    let report = validate(&data, catalog);
    let message = if report.is_valid() {
        MockMessage::ValidResponse
    } else {
        MockMessage::InvalidMockResponse
    };

    MockResponse {
        data,
        message: Some(message),
        non_matching_fields: report.errors,
        field_not_found: report.field_not_found,
    }
}
