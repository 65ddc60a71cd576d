use std::path::Path;

use graphql_mock_config::MockConfig;
use graphql_mock_engine::{
    fetcher::HttpSchemaFetcher,
    mocker::{MockRequest, Mocker},
    parsing::parse_operation,
    schema_store::{Endpoint, FileSchemaStore, InMemorySchemaStore, SchemaStore},
    synthesize, validate, SynthesisOutcome, TypeCatalog,
};
use rand::{rngs::StdRng, SeedableRng};
use serde_json::{json, Value};
use tracing::{debug, info};

use crate::{
    cli::{GenerateArgs, MockArgs, ValidateArgs},
    error::CliError,
};

pub fn generate(args: &GenerateArgs, config: &MockConfig) -> Result<Value, CliError> {
    let catalog = TypeCatalog::from_sdl(&read_file(&args.schema)?)?;
    let document = parse_operation(&read_file(&args.document)?)?;
    let data_set = args.data_set.apply(config.data_set.clone());
    let mut rng = rng_from_seed(args.seed);

    let output = match synthesize(&document, &catalog, &data_set, &mut rng)? {
        SynthesisOutcome::Data(data) => json!({ "data": data }),
        SynthesisOutcome::FieldNotFound(path) => {
            info!(path, "operation selects a field the schema does not declare");
            json!({ "data": {}, "fieldNotFound": [path] })
        }
    };

    Ok(output)
}

pub fn validate_payload(args: &ValidateArgs) -> Result<Value, CliError> {
    let catalog = TypeCatalog::from_sdl(&read_file(&args.schema)?)?;
    let mut payload: Value = serde_json::from_str(&read_file(&args.payload)?)?;
    let data = match payload.get_mut("data").map(Value::take) {
        Some(data) => data,
        None => payload,
    };

    let report = validate(&data, &catalog);
    if !report.is_valid() {
        info!(
            errors = report.errors.len(),
            field_not_found = report.field_not_found.len(),
            "payload does not match the schema"
        );
    }

    Ok(serde_json::to_value(report)?)
}

pub async fn mock(args: &MockArgs, config: &MockConfig) -> Result<Value, CliError> {
    let endpoint = Endpoint::parse(&args.endpoint)?;
    let document = match &args.document {
        Some(path) => read_file(path)?,
        None => String::new(),
    };
    let mock_response = match &args.mock_response {
        Some(path) => read_file(path)?,
        None => String::new(),
    };

    let fetcher = HttpSchemaFetcher::try_new(
        config.introspection.timeout,
        config.introspection.retry_count,
    )?;
    let mocker = Mocker::new(schema_store(config), Box::new(fetcher));
    let request = MockRequest {
        endpoint,
        document,
        mock_response,
        should_randomize: !args.validate,
        data_set: args.data_set.apply(config.data_set.clone()),
    };

    let mut rng = rng_from_seed(args.seed);
    let response = mocker.respond(&request, &mut rng).await;
    if let Some(message) = response.message {
        debug!(message = message.as_str(), "mock request answered");
    }

    Ok(serde_json::to_value(response)?)
}

fn schema_store(config: &MockConfig) -> Box<dyn SchemaStore> {
    match config.schema_store_directory() {
        Some(directory) => {
            debug!(directory = %directory.display(), "using file schema store");
            Box::new(FileSchemaStore::new(directory))
        }
        None => {
            debug!("using in-memory schema store");
            Box::new(InMemorySchemaStore::new())
        }
    }
}

fn rng_from_seed(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

fn read_file(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|source| CliError::ReadFile {
        path: path.to_path_buf(),
        source,
    })
}
