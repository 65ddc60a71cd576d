use std::path::PathBuf;

use graphql_mock_config::MockConfigError;
use graphql_mock_engine::{
    fetcher::FetchError, parsing::OperationParseError, GenerationError, SchemaMalformedError,
};

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Failed to read \"{path}\": {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Config(#[from] MockConfigError),
    #[error("Invalid log filter: {0}")]
    LogFilter(#[from] tracing_subscriber::filter::ParseError),
    #[error(transparent)]
    Schema(#[from] SchemaMalformedError),
    #[error("Failed to parse document: {0}")]
    Document(#[from] OperationParseError),
    #[error(transparent)]
    Generation(#[from] GenerationError),
    #[error("Invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Invalid endpoint URL: {0}")]
    Endpoint(#[from] url::ParseError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
}
